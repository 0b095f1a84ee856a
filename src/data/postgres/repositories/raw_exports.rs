use sqlx::{Postgres, Transaction};

use crate::data::postgres::PostgresError;

/// Insert the raw export payload, deduplicated by `file_hash`. If a row
/// with the same hash already exists its id is reused and the payload is
/// not rewritten.
pub async fn upsert(
    tx: &mut Transaction<'_, Postgres>,
    file_hash: &str,
    file_name: &str,
    export_date: &str,
    raw_data: &serde_json::Value,
    created_at: i64,
) -> Result<i32, PostgresError> {
    let existing: Option<i32> = sqlx::query_scalar("SELECT id FROM raw_exports WHERE file_hash = $1")
        .bind(file_hash)
        .fetch_optional(&mut **tx)
        .await?;

    if let Some(id) = existing {
        tracing::debug!(file_hash, id, "raw export already stored, reusing row");
        return Ok(id);
    }

    let id: i32 = sqlx::query_scalar(
        "INSERT INTO raw_exports (file_hash, file_name, export_date, raw_data, created_at)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id",
    )
    .bind(file_hash)
    .bind(file_name)
    .bind(export_date)
    .bind(raw_data)
    .bind(created_at)
    .fetch_one(&mut **tx)
    .await?;

    Ok(id)
}
