// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display and log output)
pub const APP_NAME: &str = "SkypeEtl";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "skype-etl";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name (TOML)
pub const CONFIG_FILE_NAME: &str = "skype-etl.toml";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "SKYPE_ETL_CONFIG";

// =============================================================================
// Environment Variables - Debug / Logging
// =============================================================================

pub const ENV_DEBUG: &str = "SKYPE_ETL_DEBUG";
pub const ENV_LOG: &str = "SKYPE_ETL_LOG";

// =============================================================================
// Environment Variables - Pipeline
// =============================================================================

pub const ENV_SOURCE_PATH: &str = "SKYPE_ETL_SOURCE";
pub const ENV_OUTPUT_DIR: &str = "SKYPE_ETL_OUTPUT_DIR";
pub const ENV_TASK_ID: &str = "SKYPE_ETL_TASK_ID";
pub const ENV_USER_DISPLAY_NAME: &str = "SKYPE_ETL_USER_DISPLAY_NAME";
pub const ENV_CHUNK_SIZE: &str = "SKYPE_ETL_CHUNK_SIZE";
pub const ENV_BATCH_SIZE: &str = "SKYPE_ETL_BATCH_SIZE";
pub const ENV_MAX_WORKERS: &str = "SKYPE_ETL_MAX_WORKERS";
pub const ENV_PARALLEL_PROCESSING: &str = "SKYPE_ETL_PARALLEL";
pub const ENV_MEMORY_LIMIT_MB: &str = "SKYPE_ETL_MEMORY_LIMIT_MB";
pub const ENV_EXTRACT_TIMEOUT_SECS: &str = "SKYPE_ETL_EXTRACT_TIMEOUT_SECS";
pub const ENV_TRANSFORM_TIMEOUT_SECS: &str = "SKYPE_ETL_TRANSFORM_TIMEOUT_SECS";
pub const ENV_LOAD_TIMEOUT_SECS: &str = "SKYPE_ETL_LOAD_TIMEOUT_SECS";
pub const ENV_ARCHIVE_MEMBER: &str = "SKYPE_ETL_ARCHIVE_MEMBER";
pub const ENV_ARCHIVE_INDEX: &str = "SKYPE_ETL_ARCHIVE_INDEX";

// =============================================================================
// Pipeline Defaults
// =============================================================================

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_MAX_WORKERS: usize = 0; // 0 => CPU count
pub const DEFAULT_PARALLEL_PROCESSING: bool = true;
pub const DEFAULT_MEMORY_LIMIT_MB: u64 = 2048;
pub const MEMORY_BACKPRESSURE_RATIO: f64 = 0.8;

pub const DEFAULT_EXTRACT_TIMEOUT_SECS: u64 = 600;
pub const DEFAULT_TRANSFORM_TIMEOUT_SECS: u64 = 3600;
pub const DEFAULT_LOAD_TIMEOUT_SECS: u64 = 1800;

// =============================================================================
// Environment Variables - Database
// =============================================================================

pub const ENV_DATABASE_URL: &str = "SKYPE_ETL_DATABASE_URL";
pub const ENV_DATABASE_MAX_CONNECTIONS: &str = "SKYPE_ETL_DATABASE_MAX_CONNECTIONS";
pub const ENV_DATABASE_MIN_CONNECTIONS: &str = "SKYPE_ETL_DATABASE_MIN_CONNECTIONS";
pub const ENV_DATABASE_ACQUIRE_TIMEOUT_SECS: &str = "SKYPE_ETL_DATABASE_ACQUIRE_TIMEOUT_SECS";
pub const ENV_DATABASE_IDLE_TIMEOUT_SECS: &str = "SKYPE_ETL_DATABASE_IDLE_TIMEOUT_SECS";
pub const ENV_DATABASE_MAX_LIFETIME_SECS: &str = "SKYPE_ETL_DATABASE_MAX_LIFETIME_SECS";
pub const ENV_DATABASE_STATEMENT_TIMEOUT_SECS: &str = "SKYPE_ETL_DATABASE_STATEMENT_TIMEOUT_SECS";

// =============================================================================
// PostgreSQL Defaults
// =============================================================================

pub const POSTGRES_DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const POSTGRES_DEFAULT_MIN_CONNECTIONS: u32 = 1;
pub const POSTGRES_DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;
pub const POSTGRES_DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;
pub const POSTGRES_DEFAULT_MAX_LIFETIME_SECS: u64 = 1800;
pub const POSTGRES_DEFAULT_STATEMENT_TIMEOUT_SECS: u64 = 60;

// =============================================================================
// Checkpoint / Output Layout
// =============================================================================

pub const CHECKPOINTS_DIR_NAME: &str = "checkpoints";
pub const SUMMARY_FILE_PREFIX: &str = "summary_";
pub const RAW_SPILL_FILE_NAME: &str = "raw.json";
pub const TRANSFORMED_SPILL_FILE_NAME: &str = "transformed.json";

// =============================================================================
// Message Handling
// =============================================================================

/// Default maximum length for content preview text (in characters)
pub const PREVIEW_MAX_LENGTH: usize = 200;

// =============================================================================
// Shutdown
// =============================================================================

/// Grace period for in-flight chunk drain on cancellation (seconds)
pub const CANCELLATION_DRAIN_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Exit Codes
// =============================================================================

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FATAL_ERROR: i32 = 1;
pub const EXIT_VALIDATION_FAILURE: i32 = 2;
pub const EXIT_DATABASE_UNAVAILABLE: i32 = 3;
pub const EXIT_CANCELLED: i32 = 4;
