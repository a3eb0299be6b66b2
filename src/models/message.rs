use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Decode an optional sub-structure, degrading to `None` when its shape is wrong
/// instead of rejecting the whole line.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<u64> = lenient(deserializer)?;
    Ok(value.unwrap_or(0))
}

/// Token counters reported on an assistant message.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    #[serde(default, deserialize_with = "count")]
    pub input_tokens: u64,
    #[serde(default, deserialize_with = "count")]
    pub output_tokens: u64,
    #[serde(
        rename = "cache_creation_input_tokens",
        default,
        deserialize_with = "count"
    )]
    pub cache_creation: u64,
    #[serde(rename = "cache_read_input_tokens", default, deserialize_with = "count")]
    pub cache_read: u64,
}

/// One typed block inside a message's content list.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ContentItem {
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: Option<String>,
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_error: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub text: Option<String>,
}

impl ContentItem {
    pub fn is_tool_result(&self) -> bool {
        self.kind.as_deref() == Some("tool_result")
    }

    /// Text carried by a tool result: the string itself, or the `text` fields of
    /// a block list joined with newlines.
    pub fn result_text(&self) -> Option<String> {
        match self.content.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Array(blocks) => {
                let parts: Vec<&str> = blocks
                    .iter()
                    .filter_map(|b| b.get("text").and_then(|t| t.as_str()))
                    .collect();
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join("\n"))
                }
            }
            _ => None,
        }
    }
}

/// Message body: plain text or a list of typed blocks. Blocks that are not
/// objects are dropped individually; the rest of the list is kept.
#[derive(Debug, Clone)]
pub enum MessageContent {
    Text(String),
    Items(Vec<ContentItem>),
}

impl<'de> Deserialize<'de> for MessageContent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(text) => Ok(MessageContent::Text(text)),
            Value::Array(blocks) => Ok(MessageContent::Items(
                blocks
                    .into_iter()
                    .filter_map(|b| serde_json::from_value(b).ok())
                    .collect(),
            )),
            other => Err(D::Error::custom(format!(
                "expected text or a list of content blocks, got {other}"
            ))),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Message {
    #[serde(default, deserialize_with = "lenient")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub content: Option<MessageContent>,
    #[serde(default, deserialize_with = "lenient")]
    pub usage: Option<Usage>,
    #[serde(default, deserialize_with = "lenient")]
    pub model: Option<String>,
}

impl Message {
    pub fn items(&self) -> &[ContentItem] {
        match &self.content {
            Some(MessageContent::Items(items)) => items,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_counters_default_to_zero() {
        let u: Usage = serde_json::from_str(r#"{"input_tokens": 12}"#).unwrap();
        assert_eq!(u.input_tokens, 12);
        assert_eq!(u.output_tokens, 0);
        assert_eq!(u.cache_creation, 0);
        assert_eq!(u.cache_read, 0);
    }

    #[test]
    fn bad_counter_degrades_to_zero() {
        let u: Usage = serde_json::from_str(
            r#"{"input_tokens": -5, "output_tokens": null, "cache_read_input_tokens": 7, "service_tier": "standard"}"#,
        )
        .unwrap();
        assert_eq!(u.input_tokens, 0);
        assert_eq!(u.output_tokens, 0);
        assert_eq!(u.cache_read, 7);
    }

    #[test]
    fn content_accepts_text_or_items() {
        let m: Message = serde_json::from_str(r#"{"role":"user","content":"hello"}"#).unwrap();
        assert!(matches!(m.content, Some(MessageContent::Text(_))));
        assert!(m.items().is_empty());

        let m: Message = serde_json::from_str(
            r#"{"role":"user","content":[{"type":"tool_result","tool_use_id":"t1","content":"ok"}]}"#,
        )
        .unwrap();
        assert_eq!(m.items().len(), 1);
        assert!(m.items()[0].is_tool_result());
        assert_eq!(m.items()[0].result_text().as_deref(), Some("ok"));
    }

    #[test]
    fn stray_blocks_do_not_drop_the_list() {
        let m: Message = serde_json::from_str(
            r#"{"role":"user","content":["stray",7,null,{"type":"tool_result","content":"ok"}]}"#,
        )
        .unwrap();
        assert_eq!(m.items().len(), 1);
        assert!(m.items()[0].is_tool_result());
    }

    #[test]
    fn result_text_joins_text_blocks() {
        let item: ContentItem = serde_json::from_str(
            r#"{"type":"tool_result","content":[{"type":"text","text":"a"},{"type":"image"},{"type":"text","text":"b"}]}"#,
        )
        .unwrap();
        assert_eq!(item.result_text().as_deref(), Some("a\nb"));
    }

    #[test]
    fn malformed_content_is_dropped_not_fatal() {
        let m: Message =
            serde_json::from_str(r#"{"role":"assistant","content":42,"model":"x"}"#).unwrap();
        assert!(m.content.is_none());
        assert_eq!(m.model.as_deref(), Some("x"));
    }
}
