use sqlx::{Postgres, QueryBuilder, Transaction};

use crate::data::postgres::PostgresError;
use crate::data::types::TransformedMessage;

/// Batched multi-row insert for one conversation's messages. Returns
/// `(message_id, db_id)` pairs so attachments can be linked afterward.
pub async fn insert_batch(
    tx: &mut Transaction<'_, Postgres>,
    conversation_db_id: i32,
    messages: &[TransformedMessage],
    batch_size: usize,
) -> Result<Vec<(String, i32)>, PostgresError> {
    let mut result = Vec::with_capacity(messages.len());

    for chunk in messages.chunks(batch_size.max(1)) {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO messages (conversation_id, message_id, timestamp, sender_id, sender_display_name, raw_content, cleaned_content, message_type, is_edited, structured_data) ",
        );

        qb.push_values(chunk.iter(), |mut b, msg| {
            let timestamp = msg
                .timestamp
                .parse::<chrono::DateTime<chrono::Utc>>()
                .unwrap_or_else(|_| chrono::Utc::now());
            b.push_bind(conversation_db_id)
                .push_bind(&msg.id)
                .push_bind(timestamp)
                .push_bind(&msg.sender_id)
                .push_bind(&msg.sender_display_name)
                .push_bind(&msg.raw_content)
                .push_bind(&msg.cleaned_content)
                .push_bind(&msg.message_type)
                .push_bind(msg.is_edited)
                .push_bind(serde_json::Value::Object(msg.structured_data.clone()));
        });

        qb.push(" RETURNING id, message_id");

        let rows: Vec<(i32, String)> = qb
            .build_query_as()
            .fetch_all(&mut **tx)
            .await?;

        result.extend(rows);
    }

    Ok(result)
}
