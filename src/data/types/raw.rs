//! Raw export types: the as-decoded shape of a Skype export archive.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// The root document decoded from a Skype export JSON payload.
///
/// Field names mirror the export format exactly (`camelCase` on the wire)
/// rather than Rust convention, so `#[serde(rename = "...")]` carries the
/// mapping instead of a manual `Deserialize` impl.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawExport {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "exportDate")]
    pub export_date: String,
    #[serde(default)]
    pub conversations: Vec<RawConversation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawConversation {
    pub id: String,
    /// Absent/null is a signal to elide this conversation during transform;
    /// an empty string is kept (see DESIGN.md open question).
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    #[serde(rename = "MessageList", alias = "messageList", default)]
    pub message_list: Vec<RawMessage>,
    #[serde(default)]
    pub properties: JsonValue,
    #[serde(rename = "threadProperties", default)]
    pub thread_properties: JsonValue,
    #[serde(default)]
    pub members: JsonValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMessage {
    pub id: String,
    pub originalarrivaltime: String,
    pub from: String,
    #[serde(default)]
    pub content: String,
    pub messagetype: String,
    #[serde(default)]
    pub edittime: Option<String>,
    #[serde(default)]
    pub properties: JsonValue,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
}

impl RawMessage {
    pub fn is_edited(&self) -> bool {
        self.edittime.as_deref().is_some_and(|s| !s.is_empty())
    }
}

impl RawExport {
    /// Some exports arrive in one of two non-canonical shapes: wrapped as
    /// `{"messages": [{userId, exportDate, conversations}, ...]}` (the
    /// first element is the export), or as a bare `{"messages": [...]}`
    /// array of messages with no conversation structure at all. Tries the
    /// direct shape first, then the wrapped shape, then treats a bare
    /// message array as a single pseudo-conversation — keeping the first
    /// of these that yields a non-empty `conversations` sequence.
    pub fn normalize(document: &[u8]) -> Result<Self, serde_json::Error> {
        let root: JsonValue = serde_json::from_slice(document)?;

        if let Ok(direct) = serde_json::from_value::<RawExport>(root.clone()) {
            if !direct.conversations.is_empty() {
                return Ok(direct);
            }
        }

        if let Some(messages) = root.get("messages").and_then(|v| v.as_array()) {
            if let Some(wrapped) = messages.first().and_then(|first| serde_json::from_value::<RawExport>(first.clone()).ok()) {
                if !wrapped.conversations.is_empty() {
                    return Ok(wrapped);
                }
            }

            let message_list: Vec<RawMessage> =
                messages.iter().cloned().filter_map(|m| serde_json::from_value(m).ok()).collect();
            if !message_list.is_empty() {
                return Ok(RawExport {
                    user_id: root.get("userId").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
                    export_date: root.get("exportDate").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
                    conversations: vec![RawConversation {
                        id: "messages".to_string(),
                        display_name: Some("Messages".to_string()),
                        message_list,
                        properties: JsonValue::Null,
                        thread_properties: JsonValue::Null,
                        members: JsonValue::Null,
                    }],
                });
            }
        }

        // No shape produced a non-empty conversations sequence; re-parse the
        // direct shape so the caller sees the precise missing-field error.
        serde_json::from_value(root)
    }
}
