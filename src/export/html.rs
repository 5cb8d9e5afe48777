//! Standalone HTML rendering of a conversation.

use std::sync::LazyLock;

use chrono::{DateTime, Local, Utc};
use regex::{Captures, Regex};
use tracing::debug;

use crate::models::{
    ContentBlock, ContentItem, ConversationRecord, ENTRY_TYPE_ASSISTANT, ENTRY_TYPE_THINKING,
    ENTRY_TYPE_USER, LogEntry, MessageContent,
};

const IMAGE_REMOVED: &str = "[Image Content Removed]";

/// Markers of slash-command bookkeeping that never belongs in an export
const INTERNAL_COMMAND_MARKERS: [&str; 4] =
    ["<command-name>", "<local-command-stdout>", "<command-message>", "<command-args>"];

static CODE_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(\w+)?\n([\s\S]*?)```").expect("valid code block regex"));
static INLINE_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("valid inline code regex"));
static BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid bold regex"));
static ITALIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*(.*?)\*").expect("valid italic regex"));

const STYLE: &str = r#"
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif;
            line-height: 1.6;
            color: #333;
            background-color: #f8f9fa;
        }
        .container { max-width: 900px; margin: 0 auto; background: white; min-height: 100vh; box-shadow: 0 0 20px rgba(0,0,0,0.1); }
        .header { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 2rem; text-align: center; }
        .header h1 { font-size: 2rem; margin-bottom: 0.5rem; font-weight: 700; }
        .header .subtitle { font-size: 1.1rem; opacity: 0.9; margin-bottom: 1rem; }
        .header .meta { display: flex; justify-content: center; gap: 2rem; flex-wrap: wrap; font-size: 0.9rem; opacity: 0.8; }
        .messages { padding: 2rem; max-width: 100%; }
        .message { margin-bottom: 1.5rem; max-width: 100%; overflow-wrap: break-word; }
        .message-content { padding: 1rem 1.25rem; border-radius: 12px; max-width: 85%; overflow-wrap: break-word; }
        .message.user { text-align: right; }
        .message.user .message-content { background: #007bff; color: white; margin-left: auto; border-bottom-right-radius: 4px; text-align: left; }
        .message.assistant .message-content { background: #f1f3f5; border: 1px solid #e9ecef; border-bottom-left-radius: 4px; }
        .message.thinking .message-content { background: #fff3cd; border: 1px solid #ffeaa7; border-left: 4px solid #fdcb6e; margin-left: 1rem; max-width: 80%; }
        .message-meta { font-size: 0.75rem; color: #6c757d; margin-bottom: 0.5rem; display: flex; align-items: center; gap: 0.5rem; }
        .message.user .message-meta { justify-content: flex-end; }
        .role-badge { background: #6c757d; color: white; padding: 0.15rem 0.5rem; border-radius: 12px; font-size: 0.7rem; font-weight: 600; text-transform: uppercase; }
        .role-badge.user { background: #007bff; }
        .role-badge.assistant { background: #28a745; }
        .role-badge.thinking { background: #ffc107; color: #212529; }
        .message-text { word-break: break-word; }
        pre { background: #f8f9fa; border: 1px solid #e9ecef; border-radius: 6px; padding: 1rem; overflow-x: auto; margin: 0.5rem 0; font-size: 0.9rem; line-height: 1.4; }
        code { font-family: 'SF Mono', Monaco, 'Cascadia Code', 'Roboto Mono', Consolas, 'Courier New', monospace; }
        .message-text code { background: #f8f9fa; padding: 0.15rem 0.3rem; border-radius: 3px; font-size: 0.9em; }
        .message.user pre { background: rgba(255,255,255,0.1); border-color: rgba(255,255,255,0.2); color: white; }
        .message.user .message-text code { background: rgba(255,255,255,0.2); }
        .timestamp { color: #868e96; font-size: 0.7rem; }
        .footer { padding: 2rem; text-align: center; color: #6c757d; border-top: 1px solid #e9ecef; background: #f8f9fa; font-size: 0.8rem; }
        @media (max-width: 768px) {
            .header { padding: 1.5rem 1rem; }
            .messages { padding: 1rem; }
            .message-content { max-width: 95%; padding: 0.75rem 1rem; }
        }
"#;

/// Entries worth exporting from raw log content
///
/// Keeps user, assistant and thinking lines that carry message content. Summaries,
/// meta entries, slash-command bookkeeping and tool traffic are dropped, as are
/// lines that fail to parse.
pub fn parse_export_entries(content: &str) -> Vec<LogEntry> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('{'))
        .filter_map(|line| match serde_json::from_str::<LogEntry>(line) {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!(error = %e, "skipping malformed line in export");
                None
            }
        })
        .filter(|entry| !entry.is_administrative())
        .filter(has_exportable_content)
        .filter(|entry| !is_internal_command(entry))
        .filter(|entry| !entry.has_tool_blocks())
        .collect()
}

fn has_exportable_content(entry: &LogEntry) -> bool {
    match entry.content() {
        Some(MessageContent::Text(text)) => !text.is_empty(),
        Some(MessageContent::Items(_)) => true,
        None => false,
    }
}

fn is_internal_command(entry: &LogEntry) -> bool {
    match entry.content() {
        Some(MessageContent::Text(text)) => {
            INTERNAL_COMMAND_MARKERS.iter().any(|marker| text.contains(marker))
        }
        _ => false,
    }
}

/// Render a complete HTML page for `record`
pub fn render_html(
    record: &ConversationRecord,
    entries: &[LogEntry],
    exported_at: DateTime<Utc>,
) -> String {
    let messages: Vec<String> = entries.iter().filter_map(render_entry).collect();

    let date = record
        .last_event_time
        .map(|t| t.with_timezone(&Local).format("%B %-d, %Y at %I:%M %p").to_string())
        .unwrap_or_else(|| "Unknown date".to_string());

    let active = match record.active_duration {
        Some(ms) if ms > 0 => format_active_time(ms),
        _ => "Unknown".to_string(),
    };

    let project = escape_html(&record.project_label);
    let exported = exported_at.with_timezone(&Local).format("%-m/%-d/%Y");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Claude Code Conversation - {project}</title>
    <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.9.0/styles/github.min.css">
    <script src="https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.9.0/highlight.min.js"></script>
    <style>{STYLE}    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>Claude Code Conversation</h1>
            <div class="subtitle">{project}</div>
            <div class="meta">
                <span>📅 {date}</span>
                <span>💬 {count} messages</span>
                <span>⏱️ {active}</span>
            </div>
        </div>

        <div class="messages">
{messages}
        </div>

        <div class="footer">
            Exported from Claude Code • {exported}
        </div>
    </div>
    <script>document.addEventListener('DOMContentLoaded', function () {{ hljs.highlightAll(); }});</script>
</body>
</html>
"#,
        count = record.message_count,
        messages = messages.join("\n"),
    )
}

fn render_entry(entry: &LogEntry) -> Option<String> {
    let (role, text) = match entry.kind() {
        ENTRY_TYPE_USER | ENTRY_TYPE_ASSISTANT => {
            let role = entry
                .message
                .as_ref()
                .and_then(|m| m.role.clone())
                .unwrap_or_else(|| entry.kind().to_string());
            (role, export_text(entry.content()?))
        }
        ENTRY_TYPE_THINKING => {
            let text = match entry.content() {
                Some(MessageContent::Text(text)) if !text.is_empty() => text.clone(),
                _ => entry.thinking_block.as_ref().and_then(|b| b.content.clone())?,
            };
            (ENTRY_TYPE_THINKING.to_string(), text)
        }
        _ => return None,
    };

    let role = escape_html(&role);
    let time = entry
        .timestamp
        .map(|t| t.with_timezone(&Local).format("%H:%M").to_string())
        .unwrap_or_default();

    Some(format!(
        r#"            <div class="message {role}">
                <div class="message-meta">
                    <span class="role-badge {role}">{role}</span>
                    <span class="timestamp">{time}</span>
                </div>
                <div class="message-content">{body}</div>
            </div>"#,
        body = process_message_content(&text),
    ))
}

/// Text of a message for export: text parts joined by blank lines, images marked
fn export_text(content: &MessageContent) -> String {
    match content {
        MessageContent::Text(text) => text.clone(),
        MessageContent::Items(items) => items
            .iter()
            .filter_map(|item| match item {
                ContentItem::Text(text) => Some(text.as_str()),
                ContentItem::Block(ContentBlock::Text { text }) => text.as_deref(),
                ContentItem::Block(ContentBlock::Image {}) => Some(IMAGE_REMOVED),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n"),
    }
}

/// Escape text and apply the small markdown subset used in conversations
///
/// Fenced code blocks become `<pre><code>` and are left verbatim. The surrounding
/// text gets inline code, bold, italics and line breaks.
pub fn process_message_content(content: &str) -> String {
    if content.is_empty() {
        return String::new();
    }

    let escaped = escape_html(content);
    let mut html = String::with_capacity(escaped.len());
    let mut last = 0;

    for caps in CODE_BLOCK_RE.captures_iter(&escaped) {
        let Some(whole) = caps.get(0) else { continue };
        push_text_segment(&mut html, &escaped[last..whole.start()]);

        let language = caps.get(1).map_or("", |m| m.as_str());
        let code = caps.get(2).map_or("", |m| m.as_str()).trim();
        html.push_str(&format!(r#"<pre><code class="language-{}">{}</code></pre>"#, language, code));
        last = whole.end();
    }
    push_text_segment(&mut html, &escaped[last..]);

    html
}

fn push_text_segment(html: &mut String, segment: &str) {
    if segment.trim().is_empty() {
        return;
    }

    let text = INLINE_CODE_RE.replace_all(segment, "<code>$1</code>");
    let text = BOLD_RE.replace_all(&text, |caps: &Captures| format!("<strong>{}</strong>", &caps[1]));
    let text = ITALIC_RE.replace_all(&text, |caps: &Captures| format!("<em>{}</em>", &caps[1]));
    let text = text.replace('\n', "<br>");

    html.push_str(r#"<div class="message-text">"#);
    html.push_str(&text);
    html.push_str("</div>");
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Active time for the export header: "0 minutes", "2h 5m" or "45m"
pub fn format_active_time(millis: i64) -> String {
    if millis == 0 {
        return "0 minutes".to_string();
    }

    let minutes = millis / (1000 * 60);
    let hours = minutes / 60;
    if hours > 0 { format!("{}h {}m", hours, minutes % 60) } else { format!("{}m", minutes) }
}

/// File name for an export, from the user's choice or derived from the record
///
/// A user-supplied name gets `.html` appended when missing.
pub fn export_filename(
    requested: Option<&str>,
    record: &ConversationRecord,
    now: DateTime<Utc>,
) -> String {
    if let Some(name) = requested {
        return if name.ends_with(".html") { name.to_string() } else { format!("{}.html", name) };
    }

    let label: String = record
        .project_label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("claude-conversation-{}-{}.html", label, now.format("%Y-%m-%dT%H-%M-%S"))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::TimeZone;

    use super::*;

    fn record() -> ConversationRecord {
        ConversationRecord {
            location: PathBuf::from("/p/s.jsonl"),
            project_label: "code/<app>".to_string(),
            session_id: "s".to_string(),
            message_count: 2,
            first_event_time: None,
            last_event_time: Some(Utc.with_ymd_and_hms(2025, 6, 24, 10, 0, 0).unwrap()),
            active_duration: Some(5 * 60_000),
            summary_text: None,
            match_count: None,
        }
    }

    #[test]
    fn test_parse_export_entries_filters() {
        let content = r#"{"type":"summary","summary":"x"}
{"type":"user","isMeta":true,"message":{"content":"meta"}}
{"type":"user","message":{"content":"<command-name>/clear</command-name>"}}
{"type":"assistant","message":{"content":[{"type":"tool_use","name":"Bash","input":{}}]}}
{"type":"user","message":{"content":[{"type":"tool_result","content":"ok"}]}}
{"type":"user"}
{"type":"user","message":{"content":""}}
not json
{"type":"user","message":{"content":"Hello"}}
{"type":"assistant","message":{"content":[{"type":"text","text":"Hi"}]}}"#;

        let entries = parse_export_entries(content);
        assert_eq!(entries.len(), 2);
        assert!(entries[0].is_user());
        assert!(entries[1].is_assistant());
    }

    #[test]
    fn test_process_code_blocks() {
        let html = process_message_content("Run this:\n```rust\nfn main() {}\n```\nDone **now**");
        assert_eq!(
            html,
            concat!(
                r#"<div class="message-text">Run this:<br></div>"#,
                r#"<pre><code class="language-rust">fn main() {}</code></pre>"#,
                r#"<div class="message-text"><br>Done <strong>now</strong></div>"#,
            )
        );
    }

    #[test]
    fn test_process_inline_formatting() {
        let html = process_message_content("use `x < y` and *care*\nnext");
        assert_eq!(
            html,
            r#"<div class="message-text">use <code>x &lt; y</code> and <em>care</em><br>next</div>"#
        );
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    }

    #[test]
    fn test_format_active_time() {
        assert_eq!(format_active_time(0), "0 minutes");
        assert_eq!(format_active_time(45 * 60_000), "45m");
        assert_eq!(format_active_time(125 * 60_000), "2h 5m");
    }

    #[test]
    fn test_export_filename() {
        let now = Utc.with_ymd_and_hms(2025, 6, 24, 10, 30, 15).unwrap();
        assert_eq!(export_filename(Some("out"), &record(), now), "out.html");
        assert_eq!(export_filename(Some("out.html"), &record(), now), "out.html");
        assert_eq!(
            export_filename(None, &record(), now),
            "claude-conversation-code__app_-2025-06-24T10-30-15.html"
        );
    }

    #[test]
    fn test_render_html() {
        let content = r#"{"type":"user","message":{"role":"user","content":"Hello <b>"},"timestamp":"2025-06-24T10:00:00Z"}
{"type":"assistant","message":{"role":"assistant","content":[{"type":"text","text":"Hi"},{"type":"image","source":{}}]}}
{"type":"thinking","message":{"content":"pondering"}}"#;
        let entries = parse_export_entries(content);
        let html = render_html(&record(), &entries, Utc::now());

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Claude Code Conversation - code/&lt;app&gt;</title>"));
        assert!(html.contains("💬 2 messages"));
        assert!(html.contains("⏱️ 5m"));
        assert!(html.contains(r#"<span class="role-badge user">user</span>"#));
        assert!(html.contains("Hello &lt;b&gt;"));
        assert!(html.contains("Hi<br><br>[Image Content Removed]"));
        assert!(html.contains(r#"<div class="message thinking">"#));
        assert!(html.contains("pondering"));
    }

    #[test]
    fn test_render_html_unknown_metadata() {
        let mut record = record();
        record.last_event_time = None;
        record.active_duration = Some(0);

        let html = render_html(&record, &[], Utc::now());
        assert!(html.contains("📅 Unknown date"));
        assert!(html.contains("⏱️ Unknown"));
    }
}
