//! PostgreSQL-specific error type, folded into `EtlError::Loading` at the
//! repository boundary.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PostgresError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration {version} ({name}) failed: {error}")]
    MigrationFailed {
        version: i32,
        name: String,
        error: String,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migration_failed_display() {
        let err = PostgresError::MigrationFailed {
            version: 2,
            name: "add_attachments_table".to_string(),
            error: "syntax error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "migration 2 (add_attachments_table) failed: syntax error"
        );
    }

    #[test]
    fn config_error_display() {
        let err = PostgresError::Config("missing URL".to_string());
        assert_eq!(err.to_string(), "configuration error: missing URL");
    }
}
