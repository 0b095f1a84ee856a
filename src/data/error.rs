//! Unified error taxonomy for the pipeline: validation, extraction,
//! transformation, loading, checkpointing, and cancellation.

use thiserror::Error;

/// Top-level pipeline error. Each variant corresponds to one phase or
/// cross-cutting concern; `Transformation` additionally carries the
/// message id it failed on since per-message transform failures are
/// non-fatal and get collected rather than aborting the run.
#[derive(Error, Debug)]
pub enum EtlError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("failed to transform message {message_id}: {reason}")]
    Transformation { message_id: String, reason: String },

    #[error("load failed: {0}")]
    Loading(#[from] LoadError),

    #[error("checkpoint error: {0}")]
    Checkpoint(String),

    #[error("run was cancelled")]
    Cancelled,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EtlError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction(msg.into())
    }

    pub fn transformation(message_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Transformation {
            message_id: message_id.into(),
            reason: reason.into(),
        }
    }

    pub fn checkpoint(msg: impl Into<String>) -> Self {
        Self::Checkpoint(msg.into())
    }

    /// Whether this error should abort the entire run versus just being
    /// recorded against the affected message/conversation.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Transformation { .. })
    }
}

/// Errors specific to the Load phase's transactional bulk-insert.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Repository(#[from] crate::data::postgres::PostgresError),

    #[error("migration {version} ({name}) failed: {error}")]
    MigrationFailed {
        version: i32,
        name: String,
        error: String,
    },

    #[error("database unavailable: {0}")]
    Unavailable(String),

    #[error("transaction rolled back: {0}")]
    RolledBack(String),
}

impl LoadError {
    pub fn migration_failed(version: i32, name: impl Into<String>, error: impl Into<String>) -> Self {
        Self::MigrationFailed {
            version,
            name: name.into(),
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transformation_is_non_fatal() {
        let err = EtlError::transformation("msg-1", "unsupported messagetype");
        assert!(!err.is_fatal());
    }

    #[test]
    fn validation_is_fatal() {
        let err = EtlError::validation("missing source file");
        assert!(err.is_fatal());
    }

    #[test]
    fn load_error_is_fatal() {
        let err = EtlError::from(LoadError::Unavailable("connection refused".into()));
        assert!(err.is_fatal());
    }

    #[test]
    fn migration_failed_display() {
        let err = LoadError::migration_failed(2, "add_messages_table", "syntax error");
        assert_eq!(
            err.to_string(),
            "migration 2 (add_messages_table) failed: syntax error"
        );
    }
}
