//! Shape validation for raw input, database config, and transformed
//! output (C3). Every failure is fatal for the phase that invoked it.

use thiserror::Error;

use crate::core::config::DatabaseConfig;
use crate::data::types::{RawExport, TransformedExport};

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("shape mismatch at {path}: {reason}")]
    ShapeMismatch { path: String, reason: String },
}

pub fn validate_raw_export(raw: &RawExport) -> Result<(), ValidationError> {
    if raw.user_id.trim().is_empty() {
        return Err(ValidationError::MissingField("user_id"));
    }
    if raw.export_date.trim().is_empty() {
        return Err(ValidationError::MissingField("export_date"));
    }
    for (i, conv) in raw.conversations.iter().enumerate() {
        if conv.id.trim().is_empty() {
            return Err(ValidationError::ShapeMismatch {
                path: format!("conversations[{i}].id"),
                reason: "must not be empty".into(),
            });
        }
    }
    Ok(())
}

pub fn validate_database_config(config: &DatabaseConfig) -> Result<(), ValidationError> {
    if config.url.trim().is_empty() {
        return Err(ValidationError::MissingField("database.url"));
    }
    if config.url.parse::<sqlx::postgres::PgConnectOptions>().is_err() {
        return Err(ValidationError::InvalidField {
            field: "database.url",
            reason: "not a valid PostgreSQL connection string".into(),
        });
    }
    if config.resolved_max_connections() == 0 {
        return Err(ValidationError::InvalidField {
            field: "database.max_connections",
            reason: "must resolve to a positive pool size".into(),
        });
    }
    Ok(())
}

pub fn validate_transformed_export(export: &TransformedExport) -> Result<(), ValidationError> {
    let computed_total: usize = export.conversations.values().map(|c| c.messages.len()).sum();
    if computed_total != export.metadata.total_messages {
        return Err(ValidationError::ShapeMismatch {
            path: "metadata.total_messages".into(),
            reason: format!(
                "declared {} but conversations carry {}",
                export.metadata.total_messages, computed_total
            ),
        });
    }

    for (key, conv) in &export.conversations {
        for msg in &conv.messages {
            if &msg.conversation_id != key {
                return Err(ValidationError::ShapeMismatch {
                    path: format!("conversations[{key}].messages[{}].conversation_id", msg.id),
                    reason: format!("references conversation {} instead of {key}", msg.conversation_id),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::{ExportMetadata, RawConversation, TransformedConversation};
    use indexmap::IndexMap;

    #[test]
    fn raw_export_requires_user_id() {
        let raw = RawExport {
            user_id: String::new(),
            export_date: "2023-01-01T00:00:00Z".into(),
            conversations: vec![],
        };
        assert!(validate_raw_export(&raw).is_err());
    }

    #[test]
    fn raw_export_requires_conversation_id() {
        let raw = RawExport {
            user_id: "u1".into(),
            export_date: "2023-01-01T00:00:00Z".into(),
            conversations: vec![RawConversation {
                id: String::new(),
                display_name: Some("Chat".into()),
                message_list: vec![],
                properties: serde_json::Value::Null,
                thread_properties: serde_json::Value::Null,
                members: serde_json::Value::Null,
            }],
        };
        assert!(validate_raw_export(&raw).is_err());
    }

    #[test]
    fn database_config_rejects_empty_url() {
        let config = DatabaseConfig {
            url: String::new(),
            max_connections: 0,
            min_connections: 0,
            acquire_timeout_secs: 0,
            idle_timeout_secs: 0,
            max_lifetime_secs: 0,
            statement_timeout_secs: 0,
        };
        assert!(validate_database_config(&config).is_err());
    }

    #[test]
    fn transformed_export_total_messages_must_match() {
        let mut conversations = IndexMap::new();
        conversations.insert(
            "c1".to_string(),
            TransformedConversation {
                id: "c1".into(),
                display_name: "Chat".into(),
                message_count: 1,
                first_message_time: None,
                last_message_time: None,
                messages: vec![],
                participants: Default::default(),
            },
        );
        let export = TransformedExport {
            metadata: ExportMetadata {
                user_id: "u1".into(),
                user_display_name: None,
                export_date: "2023-01-01T00:00:00Z".into(),
                total_conversations: 1,
                total_messages: 1,
                elided_conversations: 0,
            },
            conversations,
        };
        assert!(validate_transformed_export(&export).is_err());
    }
}
