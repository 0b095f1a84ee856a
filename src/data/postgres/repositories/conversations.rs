use sqlx::{Postgres, QueryBuilder, Transaction};

use crate::data::postgres::PostgresError;
use crate::data::types::TransformedConversation;

/// Batched multi-row insert. Returns `(conversation_id, db_id)` pairs in
/// insertion order so callers can key subsequent message/participant
/// inserts off the returned primary key.
pub async fn insert_batch(
    tx: &mut Transaction<'_, Postgres>,
    export_id: i32,
    conversations: &[&TransformedConversation],
    batch_size: usize,
) -> Result<Vec<(String, i32)>, PostgresError> {
    let mut result = Vec::with_capacity(conversations.len());

    for chunk in conversations.chunks(batch_size.max(1)) {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO conversations (export_id, conversation_id, display_name, first_message_time, last_message_time, message_count) ",
        );

        qb.push_values(chunk.iter(), |mut b, conv| {
            b.push_bind(export_id)
                .push_bind(&conv.id)
                .push_bind(&conv.display_name)
                .push_bind(conv.first_message_time.as_ref().and_then(|t| t.parse::<chrono::DateTime<chrono::Utc>>().ok()))
                .push_bind(conv.last_message_time.as_ref().and_then(|t| t.parse::<chrono::DateTime<chrono::Utc>>().ok()))
                .push_bind(conv.message_count as i32);
        });

        qb.push(" RETURNING id, conversation_id");

        let rows: Vec<(i32, String)> = qb
            .build_query_as()
            .fetch_all(&mut **tx)
            .await?;

        result.extend(rows.into_iter().map(|(id, conversation_id)| (conversation_id, id)));
    }

    Ok(result)
}
