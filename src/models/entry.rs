use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::message::{lenient, ContentItem, Message, Usage};
use crate::models::timestamp::Timestamp;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    User,
    Assistant,
    #[default]
    #[serde(other)]
    Other,
}

/// One decoded line of a session log.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    #[serde(rename = "type", default)]
    pub kind: EntryKind,
    #[serde(default, deserialize_with = "lenient")]
    pub timestamp: Option<Timestamp>,
    #[serde(rename = "uuid", default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(rename = "parentUuid", default, deserialize_with = "lenient")]
    pub parent_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub message: Option<Message>,
    /// Structured outcome attached to tool results; only an object counts as present.
    #[serde(default)]
    pub tool_use_result: Option<Value>,
    /// Pre-computed cost written by older clients.
    #[serde(rename = "costUSD", default, deserialize_with = "lenient")]
    pub cost_usd: Option<f64>,
}

impl LogEntry {
    pub fn is_user(&self) -> bool {
        self.kind == EntryKind::User
    }

    pub fn is_assistant(&self) -> bool {
        self.kind == EntryKind::Assistant
    }

    pub fn usage(&self) -> Option<&Usage> {
        self.message.as_ref()?.usage.as_ref()
    }

    pub fn model(&self) -> Option<&str> {
        self.message.as_ref()?.model.as_deref()
    }

    pub fn tool_results(&self) -> impl Iterator<Item = &ContentItem> {
        self.message
            .as_ref()
            .map(|m| m.items())
            .unwrap_or(&[])
            .iter()
            .filter(|item| item.is_tool_result())
    }

    /// `Some(interrupted)` when a structured outcome object is attached.
    pub fn structured_interrupted(&self) -> Option<bool> {
        let obj = self.tool_use_result.as_ref()?.as_object()?;
        Some(
            obj.get("interrupted")
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
        )
    }
}
