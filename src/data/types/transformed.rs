//! Transformed export types: the normalized, queryable projection produced
//! by the Transform phase and consumed by the Load phase.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attachment {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub url: String,
    pub content_type: String,
    pub size: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformedMessage {
    pub id: String,
    pub conversation_id: String,
    pub timestamp: String,
    pub sender_id: String,
    pub sender_display_name: Option<String>,
    pub raw_content: String,
    pub cleaned_content: String,
    pub message_type: String,
    pub is_edited: bool,
    pub structured_data: JsonMap<String, JsonValue>,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub display_name: Option<String>,
    pub is_self: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformedConversation {
    pub id: String,
    pub display_name: String,
    pub message_count: usize,
    pub first_message_time: Option<String>,
    pub last_message_time: Option<String>,
    pub messages: Vec<TransformedMessage>,
    pub participants: BTreeMap<String, Participant>,
}

impl TransformedConversation {
    pub fn participant_ids(&self) -> impl Iterator<Item = &str> {
        self.participants.keys().map(String::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub user_id: String,
    pub user_display_name: Option<String>,
    pub export_date: String,
    pub total_conversations: usize,
    pub total_messages: usize,
    pub elided_conversations: usize,
}

/// Insertion-ordered map so iteration order matches input conversation order
/// (I-TESTABLE-2 in SPEC_FULL.md §8).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformedExport {
    pub metadata: ExportMetadata,
    pub conversations: IndexMap<String, TransformedConversation>,
}

impl TransformedExport {
    pub fn total_messages(&self) -> usize {
        self.conversations.values().map(|c| c.messages.len()).sum()
    }
}
