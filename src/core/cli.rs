use clap::Parser;

use std::path::PathBuf;

use super::constants::{
    ENV_ARCHIVE_INDEX, ENV_ARCHIVE_MEMBER, ENV_BATCH_SIZE, ENV_CHUNK_SIZE, ENV_CONFIG,
    ENV_DATABASE_ACQUIRE_TIMEOUT_SECS, ENV_DATABASE_IDLE_TIMEOUT_SECS,
    ENV_DATABASE_MAX_CONNECTIONS, ENV_DATABASE_MAX_LIFETIME_SECS, ENV_DATABASE_MIN_CONNECTIONS,
    ENV_DATABASE_STATEMENT_TIMEOUT_SECS, ENV_DATABASE_URL, ENV_DEBUG, ENV_EXTRACT_TIMEOUT_SECS,
    ENV_LOAD_TIMEOUT_SECS, ENV_MAX_WORKERS, ENV_MEMORY_LIMIT_MB, ENV_OUTPUT_DIR,
    ENV_PARALLEL_PROCESSING, ENV_SOURCE_PATH, ENV_TASK_ID, ENV_TRANSFORM_TIMEOUT_SECS,
    ENV_USER_DISPLAY_NAME,
};

#[derive(Parser)]
#[command(name = "skype-etl")]
#[command(version, about = "Skype chat export ETL engine", long_about = None)]
pub struct Cli {
    /// Path to a Skype export (JSON or TAR/TAR.GZ archive)
    #[arg(long, short = 's', env = ENV_SOURCE_PATH)]
    pub source: Option<PathBuf>,

    /// Directory for checkpoints and the run summary
    #[arg(long, short = 'o', env = ENV_OUTPUT_DIR)]
    pub output_dir: Option<PathBuf>,

    /// Resume an existing task from its last completed phase
    #[arg(long)]
    pub resume: bool,

    /// Explicit task id (generated if omitted)
    #[arg(long, env = ENV_TASK_ID)]
    pub task_id: Option<String>,

    /// Display name to attribute the export to
    #[arg(long, env = ENV_USER_DISPLAY_NAME)]
    pub user_display_name: Option<String>,

    /// Path to a TOML config file
    #[arg(long, short = 'c', env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Enable debug mode (verbose tracing, intermediate files kept)
    #[arg(long, env = ENV_DEBUG)]
    pub debug: bool,

    /// Messages per transform chunk
    #[arg(long, env = ENV_CHUNK_SIZE)]
    pub chunk_size: Option<usize>,

    /// Rows per bulk insert batch
    #[arg(long, env = ENV_BATCH_SIZE)]
    pub batch_size: Option<usize>,

    /// Worker thread count for the Transform phase (0 = CPU count)
    #[arg(long, env = ENV_MAX_WORKERS)]
    pub max_workers: Option<usize>,

    /// Enable parallel chunk processing in the Transform phase
    #[arg(long, env = ENV_PARALLEL_PROCESSING)]
    pub parallel_processing: Option<bool>,

    /// Soft memory ceiling for the Transform phase, in MB
    #[arg(long, env = ENV_MEMORY_LIMIT_MB)]
    pub memory_limit_mb: Option<u64>,

    /// Extract phase timeout in seconds
    #[arg(long, env = ENV_EXTRACT_TIMEOUT_SECS)]
    pub extract_timeout_secs: Option<u64>,

    /// Transform phase timeout in seconds
    #[arg(long, env = ENV_TRANSFORM_TIMEOUT_SECS)]
    pub transform_timeout_secs: Option<u64>,

    /// Load phase timeout in seconds
    #[arg(long, env = ENV_LOAD_TIMEOUT_SECS)]
    pub load_timeout_secs: Option<u64>,

    /// Archive member name to extract (TAR sources with multiple JSON entries)
    #[arg(long, env = ENV_ARCHIVE_MEMBER)]
    pub archive_member: Option<String>,

    /// Archive member index to extract (alternative to `--archive-member`)
    #[arg(long, env = ENV_ARCHIVE_INDEX)]
    pub archive_index: Option<usize>,

    /// PostgreSQL connection URL
    #[arg(long, env = ENV_DATABASE_URL)]
    pub database_url: Option<String>,

    /// Maximum number of connections in the pool
    #[arg(long, env = ENV_DATABASE_MAX_CONNECTIONS)]
    pub database_max_connections: Option<u32>,

    /// Minimum number of connections to keep warm
    #[arg(long, env = ENV_DATABASE_MIN_CONNECTIONS)]
    pub database_min_connections: Option<u32>,

    /// Connection acquire timeout in seconds
    #[arg(long, env = ENV_DATABASE_ACQUIRE_TIMEOUT_SECS)]
    pub database_acquire_timeout_secs: Option<u64>,

    /// Idle connection timeout in seconds
    #[arg(long, env = ENV_DATABASE_IDLE_TIMEOUT_SECS)]
    pub database_idle_timeout_secs: Option<u64>,

    /// Max connection lifetime in seconds
    #[arg(long, env = ENV_DATABASE_MAX_LIFETIME_SECS)]
    pub database_max_lifetime_secs: Option<u64>,

    /// Statement timeout in seconds (0 = disabled)
    #[arg(long, env = ENV_DATABASE_STATEMENT_TIMEOUT_SECS)]
    pub database_statement_timeout_secs: Option<u64>,
}

/// Configuration derived from CLI arguments.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub source_path: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub resume: bool,
    pub task_id: Option<String>,
    pub user_display_name: Option<String>,
    pub config: Option<PathBuf>,
    pub debug: bool,
    pub chunk_size: Option<usize>,
    pub batch_size: Option<usize>,
    pub max_workers: Option<usize>,
    pub parallel_processing: Option<bool>,
    pub memory_limit_mb: Option<u64>,
    pub extract_timeout_secs: Option<u64>,
    pub transform_timeout_secs: Option<u64>,
    pub load_timeout_secs: Option<u64>,
    pub archive_member: Option<String>,
    pub archive_index: Option<usize>,
    pub database_url: Option<String>,
    pub database_max_connections: Option<u32>,
    pub database_min_connections: Option<u32>,
    pub database_acquire_timeout_secs: Option<u64>,
    pub database_idle_timeout_secs: Option<u64>,
    pub database_max_lifetime_secs: Option<u64>,
    pub database_statement_timeout_secs: Option<u64>,
}

/// Parse CLI arguments into a `CliConfig`.
pub fn parse() -> CliConfig {
    let cli = Cli::parse();
    CliConfig {
        source_path: cli.source,
        output_dir: cli.output_dir,
        resume: cli.resume,
        task_id: cli.task_id,
        user_display_name: cli.user_display_name,
        config: cli.config,
        debug: cli.debug,
        chunk_size: cli.chunk_size,
        batch_size: cli.batch_size,
        max_workers: cli.max_workers,
        parallel_processing: cli.parallel_processing,
        memory_limit_mb: cli.memory_limit_mb,
        extract_timeout_secs: cli.extract_timeout_secs,
        transform_timeout_secs: cli.transform_timeout_secs,
        load_timeout_secs: cli.load_timeout_secs,
        archive_member: cli.archive_member,
        archive_index: cli.archive_index,
        database_url: cli.database_url,
        database_max_connections: cli.database_max_connections,
        database_min_connections: cli.database_min_connections,
        database_acquire_timeout_secs: cli.database_acquire_timeout_secs,
        database_idle_timeout_secs: cli.database_idle_timeout_secs,
        database_max_lifetime_secs: cli.database_max_lifetime_secs,
        database_statement_timeout_secs: cli.database_statement_timeout_secs,
    }
}
