use sqlx::{Postgres, QueryBuilder, Transaction};

use crate::data::postgres::PostgresError;
use crate::data::types::Attachment;

/// Batched multi-row insert for one message's attachments.
pub async fn insert_batch(
    tx: &mut Transaction<'_, Postgres>,
    message_db_id: i32,
    attachments: &[Attachment],
    batch_size: usize,
) -> Result<(), PostgresError> {
    if attachments.is_empty() {
        return Ok(());
    }

    for chunk in attachments.chunks(batch_size.max(1)) {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO attachments (message_id, type, name, url, content_type, size, metadata) ",
        );

        qb.push_values(chunk.iter(), |mut b, att| {
            b.push_bind(message_db_id)
                .push_bind(&att.kind)
                .push_bind(&att.name)
                .push_bind(&att.url)
                .push_bind(&att.content_type)
                .push_bind(att.size)
                .push_bind(serde_json::Value::Object(serde_json::Map::new()));
        });

        qb.build().execute(&mut **tx).await?;
    }

    Ok(())
}
