//! PostgreSQL schema definitions for the Load phase's target tables.

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 1;

/// Complete schema SQL.
pub const SCHEMA: &str = r#"
-- =============================================================================
-- Infrastructure: Schema version tracking
-- =============================================================================
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    applied_at BIGINT NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at BIGINT NOT NULL,
    checksum TEXT NOT NULL,
    execution_time_ms INTEGER,
    success BOOLEAN NOT NULL DEFAULT TRUE
);

-- =============================================================================
-- 1. Raw exports: the untouched payload, deduplicated by content hash
-- =============================================================================
CREATE TABLE IF NOT EXISTS raw_exports (
    id SERIAL PRIMARY KEY,
    file_hash TEXT NOT NULL UNIQUE,
    file_name TEXT NOT NULL,
    export_date TEXT NOT NULL,
    raw_data JSONB NOT NULL,
    created_at BIGINT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_raw_exports_raw_data ON raw_exports USING GIN (raw_data);

-- =============================================================================
-- 2. Exports: one normalized export per raw upload
-- =============================================================================
CREATE TABLE IF NOT EXISTS exports (
    id SERIAL PRIMARY KEY,
    raw_export_id INTEGER NOT NULL REFERENCES raw_exports(id) ON DELETE CASCADE,
    user_id TEXT NOT NULL,
    user_display_name TEXT,
    export_date TEXT NOT NULL,
    metadata JSONB NOT NULL,
    created_at BIGINT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_exports_raw_export ON exports(raw_export_id);

-- =============================================================================
-- 3. Conversations
-- =============================================================================
CREATE TABLE IF NOT EXISTS conversations (
    id SERIAL PRIMARY KEY,
    export_id INTEGER NOT NULL REFERENCES exports(id) ON DELETE CASCADE,
    conversation_id TEXT NOT NULL,
    display_name TEXT NOT NULL,
    first_message_time TIMESTAMPTZ,
    last_message_time TIMESTAMPTZ,
    message_count INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_conversations_export_conversation
    ON conversations(export_id, conversation_id);

-- =============================================================================
-- 4. Messages
-- =============================================================================
CREATE TABLE IF NOT EXISTS messages (
    id SERIAL PRIMARY KEY,
    conversation_id INTEGER NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
    message_id TEXT NOT NULL,
    timestamp TIMESTAMPTZ NOT NULL,
    sender_id TEXT NOT NULL,
    sender_display_name TEXT,
    raw_content TEXT NOT NULL,
    cleaned_content TEXT NOT NULL,
    message_type TEXT NOT NULL,
    is_edited BOOLEAN NOT NULL DEFAULT FALSE,
    structured_data JSONB NOT NULL DEFAULT '{}'::jsonb
);

CREATE INDEX IF NOT EXISTS idx_messages_conversation_timestamp
    ON messages(conversation_id, timestamp);
CREATE INDEX IF NOT EXISTS idx_messages_structured_data ON messages USING GIN (structured_data);

-- =============================================================================
-- 5. Attachments
-- =============================================================================
CREATE TABLE IF NOT EXISTS attachments (
    id SERIAL PRIMARY KEY,
    message_id INTEGER NOT NULL REFERENCES messages(id) ON DELETE CASCADE,
    type TEXT NOT NULL,
    name TEXT NOT NULL,
    url TEXT NOT NULL,
    content_type TEXT NOT NULL,
    size BIGINT NOT NULL DEFAULT 0,
    metadata JSONB NOT NULL DEFAULT '{}'::jsonb
);

CREATE INDEX IF NOT EXISTS idx_attachments_message ON attachments(message_id);

-- =============================================================================
-- 6. Participants
-- =============================================================================
CREATE TABLE IF NOT EXISTS participants (
    id SERIAL PRIMARY KEY,
    conversation_id INTEGER NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
    sender_id TEXT NOT NULL,
    display_name TEXT,
    is_self BOOLEAN NOT NULL DEFAULT FALSE,
    UNIQUE(conversation_id, sender_id)
);

CREATE INDEX IF NOT EXISTS idx_participants_conversation ON participants(conversation_id);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::assertions_on_constants)]
    fn schema_version_is_positive() {
        assert!(SCHEMA_VERSION > 0);
    }

    #[test]
    fn schema_contains_required_tables() {
        let required_tables = [
            "schema_version",
            "schema_migrations",
            "raw_exports",
            "exports",
            "conversations",
            "messages",
            "attachments",
            "participants",
        ];

        for table in required_tables {
            assert!(
                SCHEMA.contains(&format!("CREATE TABLE IF NOT EXISTS {}", table)),
                "schema missing table: {}",
                table
            );
        }
    }

    #[test]
    fn schema_has_required_indexes() {
        assert!(SCHEMA.contains("USING GIN (raw_data)"));
        assert!(SCHEMA.contains("USING GIN (structured_data)"));
        assert!(SCHEMA.contains("idx_conversations_export_conversation"));
        assert!(SCHEMA.contains("idx_messages_conversation_timestamp"));
    }
}
