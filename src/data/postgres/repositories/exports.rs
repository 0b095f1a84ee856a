use sqlx::{Postgres, Transaction};

use crate::data::postgres::PostgresError;

#[allow(clippy::too_many_arguments)]
pub async fn insert(
    tx: &mut Transaction<'_, Postgres>,
    raw_export_id: i32,
    user_id: &str,
    user_display_name: Option<&str>,
    export_date: &str,
    metadata: &serde_json::Value,
    created_at: i64,
) -> Result<i32, PostgresError> {
    let id: i32 = sqlx::query_scalar(
        "INSERT INTO exports (raw_export_id, user_id, user_display_name, export_date, metadata, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING id",
    )
    .bind(raw_export_id)
    .bind(user_id)
    .bind(user_display_name)
    .bind(export_date)
    .bind(metadata)
    .bind(created_at)
    .fetch_one(&mut **tx)
    .await?;

    Ok(id)
}
