//! Transform phase: chunked, memory-gated, worker-pool processing of each
//! conversation's messages into the normalized `TransformedExport` shape.
//! Cross-conversation and within-conversation order is preserved; chunks
//! of one conversation may run in parallel but are reassembled in order.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::core::cancel::CancellationToken;
use crate::data::error::EtlError;
use crate::data::types::{
    Attachment, ExportMetadata, Participant, Phase, RawMessage, TransformedConversation,
    TransformedExport, TransformedMessage,
};
use crate::domain::content::{extract_structured, format_markup};
use crate::domain::handlers::HandlerRegistry;
use crate::domain::progress::PhaseStatus;
use crate::domain::validate::validate_transformed_export;
use crate::utils::string::sanitize_conversation_id;

use super::super::context::EtlContext;

pub async fn run(
    ctx: &mut EtlContext,
    registry: Arc<HandlerRegistry>,
    cancel: &CancellationToken,
) -> Result<(), EtlError> {
    let raw = ctx
        .raw_data
        .take()
        .ok_or_else(|| EtlError::extraction("transform phase started with no extracted data"))?;

    let total_messages: usize = raw.conversations.iter().map(|c| c.message_list.len()).sum();
    ctx.start_phase(Phase::Transform, total_messages, "messages");

    let chunk_size = ctx.config.pipeline.chunk_size.max(1);
    let max_workers = if ctx.config.pipeline.parallel_processing {
        ctx.config.pipeline.max_workers.max(1)
    } else {
        1
    };
    let semaphore = Arc::new(tokio::sync::Semaphore::new(max_workers));

    let mut conversations: IndexMap<String, TransformedConversation> = IndexMap::new();
    let mut elided = 0usize;
    let mut processed = 0usize;
    let mut had_non_fatal_error = false;

    for raw_conv in raw.conversations {
        let Some(display_name) = raw_conv.display_name.clone() else {
            elided += 1;
            continue;
        };

        if cancel.is_cancelled() {
            return Err(EtlError::Cancelled);
        }

        let sanitized_id = sanitize_conversation_id(&raw_conv.id);
        let messages = match transform_conversation(
            &sanitized_id,
            raw_conv.message_list,
            &registry,
            &semaphore,
            ctx,
            cancel,
        )
        .await
        {
            Ok(messages) => messages,
            Err(EtlError::Cancelled) => return Err(EtlError::Cancelled),
            Err(e) => {
                ctx.record_error(Phase::Transform, e.to_string(), None, false);
                had_non_fatal_error = true;
                Vec::new()
            }
        };

        processed += messages.len();
        ctx.update_progress(processed);

        let first_message_time = messages.first().map(|m| m.timestamp.clone());
        let last_message_time = messages.last().map(|m| m.timestamp.clone());
        let participants = derive_participants(&messages, &raw.user_id);

        conversations.insert(
            sanitized_id.clone(),
            TransformedConversation {
                id: sanitized_id,
                display_name,
                message_count: messages.len(),
                first_message_time,
                last_message_time,
                messages,
                participants,
            },
        );
    }

    let total_messages_out: usize = conversations.values().map(|c| c.messages.len()).sum();
    let export = TransformedExport {
        metadata: ExportMetadata {
            user_id: raw.user_id.clone(),
            user_display_name: ctx.user_display_name.clone(),
            export_date: raw.export_date.clone(),
            total_conversations: conversations.len(),
            total_messages: total_messages_out,
            elided_conversations: elided,
        },
        conversations,
    };

    if let Err(e) = validate_transformed_export(&export) {
        ctx.record_error(Phase::Transform, e.to_string(), None, true);
        return Err(EtlError::validation(e.to_string()));
    }

    ctx.transformed_data = Some(export);
    let _ = had_non_fatal_error; // surfaced through ctx's pending-warning downgrade
    ctx.end_phase(PhaseStatus::Completed);
    Ok(())
}

async fn transform_conversation(
    conversation_id: &str,
    message_list: Vec<RawMessage>,
    registry: &Arc<HandlerRegistry>,
    semaphore: &Arc<tokio::sync::Semaphore>,
    ctx: &mut EtlContext,
    cancel: &CancellationToken,
) -> Result<Vec<TransformedMessage>, EtlError> {
    let mut handles = Vec::new();

    for chunk in message_list.chunks(ctx.config.pipeline.chunk_size.max(1)) {
        if cancel.is_cancelled() {
            return Err(EtlError::Cancelled);
        }

        while ctx.memory_monitor().should_backpressure() {
            tokio::time::sleep(Duration::from_millis(25)).await;
        }

        let chunk = chunk.to_vec();
        let approx_bytes: u64 = chunk.iter().map(|m| m.content.len() as u64 + 256).sum();
        ctx.memory_monitor_mut().reserve(approx_bytes);

        let registry = Arc::clone(registry);
        let conversation_id = conversation_id.to_string();
        let permit = Arc::clone(semaphore).acquire_owned().await.expect("semaphore never closes");

        let handle = tokio::spawn(async move {
            let _permit = permit;
            transform_chunk(chunk, &conversation_id, &registry)
        });
        handles.push((handle, approx_bytes));
    }

    let mut messages = Vec::new();
    for (handle, approx_bytes) in handles {
        let chunk_results = handle
            .await
            .map_err(|e| EtlError::extraction(format!("transform worker panicked: {e}")))?;
        for (message, extraction_error) in chunk_results {
            if let Some(reason) = extraction_error {
                ctx.record_error(Phase::Transform, reason, None, false);
            }
            messages.push(message);
        }
        ctx.memory_monitor_mut().release(approx_bytes);
    }

    Ok(messages)
}

fn transform_chunk(
    chunk: Vec<RawMessage>,
    conversation_id: &str,
    registry: &HandlerRegistry,
) -> Vec<(TransformedMessage, Option<String>)> {
    chunk.into_iter().map(|msg| transform_message(msg, conversation_id, registry)).collect()
}

/// Runs the message handler and the Content Extractor's structured index
/// over one message. A handler that rejects a malformed body still
/// produces a message (raw properties plus `extraction_error`) so a single
/// bad message never drops its neighbors; the caller records the failure
/// as a non-fatal phase error.
fn transform_message(
    msg: RawMessage,
    conversation_id: &str,
    registry: &HandlerRegistry,
) -> (TransformedMessage, Option<String>) {
    let cleaned_content = format_markup(&msg.content);
    let (mut structured_data, extraction_error) = registry.extract(&msg);

    let structured_index = extract_structured(&msg.content);
    if let Ok(JsonValue::Object(indexed)) = serde_json::to_value(&structured_index) {
        structured_data.extend(indexed);
    }

    let attachments = derive_attachments(&structured_data);
    let is_edited = msg.is_edited();
    let message_id = msg.id.clone();

    let transformed = TransformedMessage {
        id: msg.id,
        conversation_id: conversation_id.to_string(),
        timestamp: msg.originalarrivaltime,
        sender_id: msg.from,
        sender_display_name: msg.display_name,
        raw_content: msg.content,
        cleaned_content,
        message_type: msg.messagetype,
        is_edited,
        structured_data,
        attachments,
    };

    let error = extraction_error.map(|reason| format!("message {message_id}: {reason}"));
    (transformed, error)
}

fn derive_attachments(structured_data: &JsonMap<String, JsonValue>) -> Vec<Attachment> {
    let mut out = Vec::new();

    if let Some(url) = structured_data.get("media_url").and_then(|v| v.as_str()).filter(|s| !s.is_empty()) {
        let filetype = structured_data.get("media_filetype").and_then(|v| v.as_str()).unwrap_or_default();
        out.push(Attachment {
            kind: if filetype.is_empty() { "file".to_string() } else { filetype.to_string() },
            name: structured_data.get("media_filename").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
            url: url.to_string(),
            content_type: filetype.to_string(),
            size: structured_data.get("media_filesize").and_then(|v| v.as_i64()).unwrap_or(0),
        });
    }

    if let Some(items) = structured_data.get("media_album_items").and_then(|v| v.as_array()) {
        for item in items {
            if let Some(url) = item.get("url").and_then(|v| v.as_str()).filter(|s| !s.is_empty()) {
                out.push(Attachment {
                    kind: "album_item".to_string(),
                    name: String::new(),
                    url: url.to_string(),
                    content_type: String::new(),
                    size: 0,
                });
            }
        }
    }

    out
}

fn derive_participants(messages: &[TransformedMessage], user_id: &str) -> BTreeMap<String, Participant> {
    let mut participants = BTreeMap::new();
    for msg in messages {
        participants.entry(msg.sender_id.clone()).or_insert_with(|| Participant {
            display_name: msg.sender_display_name.clone(),
            is_self: msg.sender_id == user_id,
        });
    }
    participants
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value as JsonValue;

    fn message(id: &str, from: &str, content: &str, message_type: &str) -> RawMessage {
        RawMessage {
            id: id.into(),
            originalarrivaltime: "2023-01-01T00:00:00Z".into(),
            from: from.into(),
            content: content.into(),
            messagetype: message_type.into(),
            edittime: None,
            properties: JsonValue::Null,
            display_name: None,
        }
    }

    #[test]
    fn transform_message_cleans_content_and_dispatches_handler() {
        let registry = HandlerRegistry::new();
        let (transformed, error) = transform_message(message("m1", "u1", "<b>hi</b>", "RichText"), "c1", &registry);
        assert_eq!(transformed.cleaned_content, "*hi*");
        assert_eq!(transformed.structured_data["has_mentions"], JsonValue::Bool(false));
        assert!(error.is_none());
    }

    #[test]
    fn structured_index_merges_at_top_level() {
        let registry = HandlerRegistry::new();
        let (transformed, _) = transform_message(
            message("m1", "u1", r#"<at id="u2">Bob</at> see <a href="https://x.y">here</a>"#, "RichText"),
            "c1",
            &registry,
        );
        assert_eq!(transformed.structured_data["mentions"][0]["id"], JsonValue::String("u2".into()));
        assert_eq!(transformed.structured_data["links"][0]["url"], JsonValue::String("https://x.y".into()));
    }

    #[test]
    fn derive_participants_flags_export_owner() {
        let registry = HandlerRegistry::new();
        let messages = vec![
            transform_message(message("m1", "owner", "hi", "RichText"), "c1", &registry).0,
            transform_message(message("m2", "friend", "hey", "RichText"), "c1", &registry).0,
        ];
        let participants = derive_participants(&messages, "owner");
        assert!(participants["owner"].is_self);
        assert!(!participants["friend"].is_self);
    }
}
