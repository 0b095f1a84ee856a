//! Load phase: a single transaction that upserts the raw export (deduped
//! by content hash), inserts the export row, then batch-inserts
//! conversations, messages, attachments, and participants in order.
//! Any failure rolls back the whole transaction.

use std::collections::HashMap;

use sqlx::{Postgres, Transaction};

use crate::data::error::{EtlError, LoadError};
use crate::data::postgres::{repositories, PostgresService};
use crate::data::types::{Phase, TransformedExport};
use crate::domain::progress::PhaseStatus;
use crate::utils::crypto::sha256_hex;

use super::super::context::EtlContext;

pub async fn run(ctx: &mut EtlContext, postgres: &PostgresService) -> Result<(), EtlError> {
    let export = ctx
        .transformed_data
        .take()
        .ok_or_else(|| EtlError::extraction("load phase started with no transformed data"))?;

    let total: usize = export.conversations.len();
    ctx.start_phase(Phase::Load, total, "conversations");

    match load_export(ctx, postgres, &export).await {
        Ok(export_id) => {
            ctx.export_id = Some(export_id);
            ctx.transformed_data = Some(export);
            ctx.end_phase(PhaseStatus::Completed);
            Ok(())
        }
        Err(e) => {
            ctx.transformed_data = Some(export);
            ctx.record_error(Phase::Load, e.to_string(), None, true);
            Err(e)
        }
    }
}

async fn load_export(
    ctx: &mut EtlContext,
    postgres: &PostgresService,
    export: &TransformedExport,
) -> Result<i32, EtlError> {
    let batch_size = ctx.config.pipeline.batch_size;
    let file_name = ctx
        .file_source
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let now = chrono::Utc::now().timestamp();
    let raw_json = serde_json::to_value(ctx.raw_data.as_ref()).unwrap_or(serde_json::Value::Null);
    let raw_bytes = serde_json::to_string(&raw_json).unwrap_or_default();
    let file_hash = sha256_hex(&raw_bytes);

    let mut tx = postgres.pool().begin().await.map_err(LoadError::from)?;

    let outcome = insert_all(&mut tx, ctx, export, &raw_json, &file_hash, &file_name, now, batch_size).await;

    match outcome {
        Ok(export_id) => {
            tx.commit().await.map_err(LoadError::from)?;
            Ok(export_id)
        }
        Err(e) => {
            let _ = tx.rollback().await;
            Err(EtlError::Loading(e))
        }
    }
}

async fn insert_all(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &mut EtlContext,
    export: &TransformedExport,
    raw_json: &serde_json::Value,
    file_hash: &str,
    file_name: &str,
    now: i64,
    batch_size: usize,
) -> Result<i32, LoadError> {
    let raw_export_id =
        repositories::raw_exports::upsert(tx, file_hash, file_name, &export.metadata.export_date, raw_json, now).await?;

    let metadata_json = serde_json::to_value(&export.metadata).unwrap_or(serde_json::Value::Null);
    let export_id = repositories::exports::insert(
        tx,
        raw_export_id,
        &export.metadata.user_id,
        export.metadata.user_display_name.as_deref(),
        &export.metadata.export_date,
        &metadata_json,
        now,
    )
    .await?;

    let conversations: Vec<_> = export.conversations.values().collect();
    let conversation_ids = repositories::conversations::insert_batch(tx, export_id, &conversations, batch_size).await?;
    let conversation_db_id: HashMap<String, i32> = conversation_ids.into_iter().collect();

    let mut processed = 0usize;
    for conversation in conversations {
        let db_id = *conversation_db_id
            .get(&conversation.id)
            .ok_or_else(|| LoadError::RolledBack(format!("conversation {} missing its inserted id", conversation.id)))?;

        let message_ids = repositories::messages::insert_batch(tx, db_id, &conversation.messages, batch_size).await?;
        let message_db_id: HashMap<&str, i32> = message_ids.iter().map(|(id, db_id)| (id.as_str(), *db_id)).collect();

        for message in &conversation.messages {
            if message.attachments.is_empty() {
                continue;
            }
            let Some(&msg_db_id) = message_db_id.get(message.id.as_str()) else {
                continue;
            };
            repositories::attachments::insert_batch(tx, msg_db_id, &message.attachments, batch_size).await?;
        }

        let participants: Vec<(String, Option<String>, bool)> = conversation
            .participants
            .iter()
            .map(|(id, p)| (id.clone(), p.display_name.clone(), p.is_self))
            .collect();
        repositories::participants::insert_batch(tx, db_id, &participants, batch_size).await?;

        processed += 1;
        ctx.update_progress(processed);
    }

    Ok(export_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::{Attachment, ExportMetadata, Participant, TransformedConversation, TransformedMessage};
    use indexmap::IndexMap;

    fn sample_export() -> TransformedExport {
        let mut conversations = IndexMap::new();
        let mut participants = std::collections::BTreeMap::new();
        participants.insert(
            "owner".to_string(),
            Participant { display_name: Some("Owner".into()), is_self: true },
        );
        conversations.insert(
            "c1".to_string(),
            TransformedConversation {
                id: "c1".into(),
                display_name: "Chat".into(),
                message_count: 1,
                first_message_time: Some("2023-01-01T00:00:00Z".into()),
                last_message_time: Some("2023-01-01T00:00:00Z".into()),
                messages: vec![TransformedMessage {
                    id: "m1".into(),
                    conversation_id: "c1".into(),
                    timestamp: "2023-01-01T00:00:00Z".into(),
                    sender_id: "owner".into(),
                    sender_display_name: Some("Owner".into()),
                    raw_content: "hi".into(),
                    cleaned_content: "hi".into(),
                    message_type: "RichText".into(),
                    is_edited: false,
                    structured_data: serde_json::Map::new(),
                    attachments: vec![],
                }],
                participants,
            },
        );
        TransformedExport {
            metadata: ExportMetadata {
                user_id: "owner".into(),
                user_display_name: Some("Owner".into()),
                export_date: "2023-01-01T00:00:00Z".into(),
                total_conversations: 1,
                total_messages: 1,
                elided_conversations: 0,
            },
            conversations,
        }
    }

    #[test]
    fn sample_export_participants_carry_display_name() {
        let export = sample_export();
        let conv = &export.conversations["c1"];
        assert!(conv.participants["owner"].is_self);
        assert_eq!(conv.participants["owner"].display_name.as_deref(), Some("Owner"));
    }

    #[test]
    fn attachment_shape_is_preserved_through_sample() {
        let attachment = Attachment {
            kind: "image".into(),
            name: "photo.jpg".into(),
            url: "https://example.test/photo.jpg".into(),
            content_type: "jpg".into(),
            size: 1024,
        };
        assert_eq!(attachment.kind, "image");
    }

    // Transactional insert/rollback behavior is exercised as integration
    // tests against a running PostgreSQL instance, matching the rest of
    // the repository layer.
}
