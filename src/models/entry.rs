use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::parsers::deserializers::{deserialize_lenient, deserialize_lenient_timestamp};

pub const ENTRY_TYPE_USER: &str = "user";
pub const ENTRY_TYPE_ASSISTANT: &str = "assistant";
pub const ENTRY_TYPE_THINKING: &str = "thinking";
pub const ENTRY_TYPE_SUMMARY: &str = "summary";

/// One line of a conversation log.
///
/// Every field is optional and deserialized leniently: a field with an unexpected
/// shape becomes `None` instead of rejecting the whole line.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogEntry {
    #[serde(rename = "type", default, deserialize_with = "deserialize_lenient")]
    pub entry_type: Option<String>,
    #[serde(rename = "sessionId", default, deserialize_with = "deserialize_lenient")]
    pub session_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(rename = "isMeta", default, deserialize_with = "deserialize_lenient")]
    pub is_meta: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub message: Option<EntryMessage>,
    #[serde(rename = "thinkingBlock", default, deserialize_with = "deserialize_lenient")]
    pub thinking_block: Option<ThinkingBlock>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryMessage {
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub content: Option<MessageContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThinkingBlock {
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub content: Option<String>,
}

/// Message payload: plain text or a sequence of content items
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Items(Vec<ContentItem>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ContentItem {
    Text(String),
    Block(ContentBlock),
    Other(serde_json::Value),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        #[serde(default)]
        text: Option<String>,
    },
    Image {},
    ToolUse {
        #[serde(default)]
        name: Option<String>,
    },
    ToolResult {},
    #[serde(other)]
    Unknown,
}

/// How non-text content items are rendered when flattening
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholders {
    /// Text only: images and tool blocks contribute nothing
    None,
    /// Images become `[Image]`, tool blocks are dropped
    Images,
    /// Images and tool blocks become short bracketed markers
    All,
}

impl LogEntry {
    pub fn kind(&self) -> &str {
        self.entry_type.as_deref().unwrap_or("")
    }

    pub fn is_user(&self) -> bool {
        self.kind() == ENTRY_TYPE_USER
    }

    pub fn is_assistant(&self) -> bool {
        self.kind() == ENTRY_TYPE_ASSISTANT
    }

    /// Summary lines and meta entries never count as conversation content
    pub fn is_administrative(&self) -> bool {
        self.kind() == ENTRY_TYPE_SUMMARY || self.is_meta == Some(true)
    }

    pub fn content(&self) -> Option<&MessageContent> {
        self.message.as_ref().and_then(|m| m.content.as_ref())
    }

    /// Flatten the entry into display text.
    ///
    /// User and assistant entries read `message.content`; thinking entries read
    /// `message.content` (string form) or `thinkingBlock.content`. Everything else is empty.
    pub fn text(&self, placeholders: Placeholders) -> String {
        match self.kind() {
            ENTRY_TYPE_USER | ENTRY_TYPE_ASSISTANT => {
                self.content().map(|c| c.flatten(placeholders, " ")).unwrap_or_default()
            }
            ENTRY_TYPE_THINKING => match self.content() {
                Some(MessageContent::Text(text)) if !text.is_empty() => text.clone(),
                _ => self
                    .thinking_block
                    .as_ref()
                    .and_then(|b| b.content.clone())
                    .unwrap_or_default(),
            },
            _ => String::new(),
        }
    }

    /// True when the content holds a `tool_use` or `tool_result` block
    pub fn has_tool_blocks(&self) -> bool {
        match self.content() {
            Some(MessageContent::Items(items)) => items.iter().any(|item| {
                matches!(
                    item,
                    ContentItem::Block(ContentBlock::ToolUse { .. } | ContentBlock::ToolResult {})
                )
            }),
            _ => false,
        }
    }
}

impl MessageContent {
    /// Join the textual parts of the content, skipping empty pieces
    pub fn flatten(&self, placeholders: Placeholders, separator: &str) -> String {
        match self {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Items(items) => items
                .iter()
                .filter_map(|item| item.render(placeholders))
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(separator),
        }
    }
}

impl ContentItem {
    fn render(&self, placeholders: Placeholders) -> Option<String> {
        match self {
            ContentItem::Text(text) => Some(text.clone()),
            ContentItem::Block(ContentBlock::Text { text }) => text.clone(),
            ContentItem::Block(ContentBlock::Image {}) => match placeholders {
                Placeholders::None => None,
                Placeholders::Images | Placeholders::All => Some("[Image]".to_string()),
            },
            ContentItem::Block(ContentBlock::ToolUse { name }) => match placeholders {
                Placeholders::All => {
                    Some(format!("[Tool: {}]", name.as_deref().unwrap_or("unknown")))
                }
                _ => None,
            },
            ContentItem::Block(ContentBlock::ToolResult {}) => match placeholders {
                Placeholders::All => Some("[Tool result]".to_string()),
                _ => None,
            },
            ContentItem::Block(ContentBlock::Unknown) | ContentItem::Other(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(json: &str) -> LogEntry {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_string_content() {
        let e = entry(r#"{"type":"user","message":{"role":"user","content":"Hello"}}"#);
        assert!(e.is_user());
        assert_eq!(e.text(Placeholders::All), "Hello");
    }

    #[test]
    fn test_block_content_with_placeholders() {
        let e = entry(
            r#"{"type":"assistant","message":{"content":[
                {"type":"text","text":"Look"},
                {"type":"image","source":{"data":"abc"}},
                {"type":"tool_use","id":"t1","name":"Read","input":{}},
                {"type":"tool_result","tool_use_id":"t1","content":"ok"}
            ]}}"#,
        );
        assert_eq!(e.text(Placeholders::None), "Look");
        assert_eq!(e.text(Placeholders::Images), "Look [Image]");
        assert_eq!(e.text(Placeholders::All), "Look [Image] [Tool: Read] [Tool result]");
        assert!(e.has_tool_blocks());
    }

    #[test]
    fn test_bare_strings_inside_content_array() {
        let e = entry(r#"{"type":"user","message":{"content":["one",{"type":"text","text":"two"}]}}"#);
        assert_eq!(e.text(Placeholders::None), "one two");
    }

    #[test]
    fn test_thinking_block_fallback() {
        let e = entry(r#"{"type":"thinking","thinkingBlock":{"content":"pondering"}}"#);
        assert_eq!(e.text(Placeholders::All), "pondering");
    }

    #[test]
    fn test_malformed_fields_become_none() {
        let e = entry(r#"{"type":"user","sessionId":42,"timestamp":{"bad":true},"isMeta":"yes"}"#);
        assert!(e.is_user());
        assert!(e.session_id.is_none());
        assert!(e.timestamp.is_none());
        assert!(e.is_meta.is_none());
    }

    #[test]
    fn test_administrative_entries() {
        assert!(entry(r#"{"type":"summary","summary":"x"}"#).is_administrative());
        assert!(entry(r#"{"type":"user","isMeta":true}"#).is_administrative());
        assert!(!entry(r#"{"type":"user","isMeta":false}"#).is_administrative());
    }

    #[test]
    fn test_other_types_have_no_text() {
        let e = entry(r#"{"type":"system","message":{"content":"ignored"}}"#);
        assert_eq!(e.text(Placeholders::All), "");
    }
}
