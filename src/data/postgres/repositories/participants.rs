use sqlx::{Postgres, QueryBuilder, Transaction};

use crate::data::postgres::PostgresError;

/// Batched multi-row insert for one conversation's participant roster.
/// `is_self` is determined by the caller against the export's `user_id`.
pub async fn insert_batch(
    tx: &mut Transaction<'_, Postgres>,
    conversation_db_id: i32,
    participants: &[(String, Option<String>, bool)],
    batch_size: usize,
) -> Result<(), PostgresError> {
    if participants.is_empty() {
        return Ok(());
    }

    for chunk in participants.chunks(batch_size.max(1)) {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO participants (conversation_id, sender_id, display_name, is_self) ",
        );

        qb.push_values(chunk.iter(), |mut b, (sender_id, display_name, is_self)| {
            b.push_bind(conversation_db_id)
                .push_bind(sender_id)
                .push_bind(display_name)
                .push_bind(is_self);
        });

        qb.push(" ON CONFLICT (conversation_id, sender_id) DO NOTHING");

        qb.build().execute(&mut **tx).await?;
    }

    Ok(())
}
