//! Strip embedded image payloads from raw log content before upload.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Value, json};

pub const IMAGE_UPLOADED: &str = "[Image uploaded]";
pub const TOOL_RESULT_IMAGE: &str = "[Tool result: Image received]";
pub const IMAGE_DATA_URI: &str = "[Image]";

static DATA_URI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"data:image/[^;]+;base64,[A-Za-z0-9+/=]+").expect("valid data URI regex")
});

/// Rewrite every line of `content`, replacing image payloads with placeholders
///
/// Blank lines and lines that are not JSON are passed through untouched.
pub fn sanitize_images(content: &str) -> String {
    content.split('\n').map(sanitize_line).collect::<Vec<_>>().join("\n")
}

fn sanitize_line(line: &str) -> String {
    if line.trim().is_empty() {
        return line.to_string();
    }

    let Ok(mut data) = serde_json::from_str::<Value>(line) else {
        return line.to_string();
    };

    let is_user = data.get("type").and_then(Value::as_str) == Some("user");
    if is_user
        && let Some(items) = data.pointer_mut("/message/content").and_then(Value::as_array_mut)
    {
        for item in items.iter_mut() {
            sanitize_content_item(item);
        }
    }

    if let Some(output) = data.pointer_mut("/toolUseResult/output")
        && let Some(text) = output.as_str()
        && text.contains("data:image/")
    {
        *output = Value::String(DATA_URI_RE.replace_all(text, IMAGE_DATA_URI).into_owned());
    }

    serde_json::to_string(&data).unwrap_or_else(|_| line.to_string())
}

fn sanitize_content_item(item: &mut Value) {
    match item.get("type").and_then(Value::as_str) {
        Some("image") => *item = text_block(IMAGE_UPLOADED),
        Some("tool_result") => {
            let Some(parts) = item.get("content").and_then(Value::as_array) else {
                return;
            };
            if !parts.iter().any(|p| p.get("type").and_then(Value::as_str) == Some("image")) {
                return;
            }

            let texts: Vec<&str> = parts
                .iter()
                .filter(|p| p.get("type").and_then(Value::as_str) == Some("text"))
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect();

            let mut replacement = Vec::with_capacity(2);
            if !texts.is_empty() {
                replacement.push(text_block(&texts.join("\n")));
            }
            replacement.push(text_block(TOOL_RESULT_IMAGE));
            item["content"] = Value::Array(replacement);
        }
        _ => {}
    }
}

fn text_block(text: &str) -> Value {
    json!({ "type": "text", "text": text })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Value {
        serde_json::from_str(line).unwrap()
    }

    #[test]
    fn test_user_image_replaced() {
        let line = r#"{"type":"user","message":{"content":[{"type":"text","text":"look"},{"type":"image","source":{"data":"AAAA"}}]}}"#;
        let out = parse(&sanitize_images(line));
        assert_eq!(out["message"]["content"][0]["text"], "look");
        assert_eq!(out["message"]["content"][1], json!({"type":"text","text":IMAGE_UPLOADED}));
    }

    #[test]
    fn test_assistant_image_untouched() {
        let line = r#"{"type":"assistant","message":{"content":[{"type":"image","source":{}}]}}"#;
        let out = parse(&sanitize_images(line));
        assert_eq!(out["message"]["content"][0]["type"], "image");
    }

    #[test]
    fn test_tool_result_with_image() {
        let line = r#"{"type":"user","message":{"content":[{"type":"tool_result","tool_use_id":"t1","content":[{"type":"text","text":"a"},{"type":"image","source":{}},{"type":"text","text":"b"}]}]}}"#;
        let out = parse(&sanitize_images(line));
        let item = &out["message"]["content"][0];
        assert_eq!(item["tool_use_id"], "t1");
        assert_eq!(
            item["content"],
            json!([{"type":"text","text":"a\nb"},{"type":"text","text":TOOL_RESULT_IMAGE}])
        );
    }

    #[test]
    fn test_tool_result_image_only() {
        let line = r#"{"type":"user","message":{"content":[{"type":"tool_result","content":[{"type":"image","source":{}}]}]}}"#;
        let out = parse(&sanitize_images(line));
        assert_eq!(
            out["message"]["content"][0]["content"],
            json!([{"type":"text","text":TOOL_RESULT_IMAGE}])
        );
    }

    #[test]
    fn test_tool_result_without_image_unchanged() {
        let line = r#"{"type":"user","message":{"content":[{"type":"tool_result","content":[{"type":"text","text":"ok"}]}]}}"#;
        let out = parse(&sanitize_images(line));
        assert_eq!(out["message"]["content"][0]["content"], json!([{"type":"text","text":"ok"}]));
    }

    #[test]
    fn test_data_uri_in_tool_output() {
        let line = r#"{"type":"assistant","toolUseResult":{"output":"see data:image/png;base64,iVBORw0KGgo= here"}}"#;
        let out = parse(&sanitize_images(line));
        assert_eq!(out["toolUseResult"]["output"], "see [Image] here");
    }

    #[test]
    fn test_invalid_and_blank_lines_preserved() {
        let content = "not json\n\n   \n{\"type\":\"user\"}";
        let out = sanitize_images(content);
        let lines: Vec<_> = out.split('\n').collect();
        assert_eq!(lines[0], "not json");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "   ");
        assert_eq!(lines[3], r#"{"type":"user"}"#);
    }

    #[test]
    fn test_key_order_preserved() {
        let line = r#"{"type":"user","sessionId":"s","message":{"role":"user","content":[{"type":"image","source":{}}]}}"#;
        let out = sanitize_images(line);
        assert_eq!(
            out,
            r#"{"type":"user","sessionId":"s","message":{"role":"user","content":[{"type":"text","text":"[Image uploaded]"}]}}"#
        );
    }
}
