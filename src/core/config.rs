//! Layered application configuration.
//!
//! Precedence (lowest to highest): struct defaults -> TOML config file ->
//! CLI arguments (which include env var fallbacks via clap), mirroring the
//! three-tier `AppConfig::load` pattern this project grew from.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{
    CONFIG_FILE_NAME, DEFAULT_BATCH_SIZE, DEFAULT_CHUNK_SIZE, DEFAULT_EXTRACT_TIMEOUT_SECS,
    DEFAULT_LOAD_TIMEOUT_SECS, DEFAULT_MAX_WORKERS, DEFAULT_MEMORY_LIMIT_MB,
    DEFAULT_PARALLEL_PROCESSING, DEFAULT_TRANSFORM_TIMEOUT_SECS, POSTGRES_DEFAULT_ACQUIRE_TIMEOUT_SECS,
    POSTGRES_DEFAULT_IDLE_TIMEOUT_SECS, POSTGRES_DEFAULT_MAX_CONNECTIONS,
    POSTGRES_DEFAULT_MAX_LIFETIME_SECS, POSTGRES_DEFAULT_MIN_CONNECTIONS,
    POSTGRES_DEFAULT_STATEMENT_TIMEOUT_SECS,
};

// =============================================================================
// File Config Structs (TOML deserialization)
// =============================================================================

#[derive(Debug, Default, Clone, Deserialize)]
pub struct DatabaseFileConfig {
    pub url: Option<String>,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
    pub max_lifetime_secs: Option<u64>,
    pub statement_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct PipelineFileConfig {
    pub output_dir: Option<String>,
    pub chunk_size: Option<usize>,
    pub batch_size: Option<usize>,
    pub max_workers: Option<usize>,
    pub parallel_processing: Option<bool>,
    pub memory_limit_mb: Option<u64>,
    pub extract_timeout_secs: Option<u64>,
    pub transform_timeout_secs: Option<u64>,
    pub load_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub database: Option<DatabaseFileConfig>,
    pub pipeline: Option<PipelineFileConfig>,
    pub debug: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map.keys().map(|k| k.as_str()).collect::<Vec<_>>().join(", ");
            tracing::warn!(fields = %keys_str, "Unknown fields in config file (possible typos)");
        }
    }
}

// =============================================================================
// Runtime Config Structs (final merged configuration)
// =============================================================================

/// PostgreSQL configuration (final/runtime).
///
/// Same field shape and default-if-zero pattern as the host's connection
/// pool configuration: a value of 0 means "use the documented default"
/// rather than literally zero.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    pub statement_timeout_secs: u64,
}

impl DatabaseConfig {
    pub fn resolved_max_connections(&self) -> u32 {
        if self.max_connections > 0 {
            self.max_connections
        } else {
            POSTGRES_DEFAULT_MAX_CONNECTIONS
        }
    }

    pub fn resolved_min_connections(&self) -> u32 {
        if self.min_connections > 0 {
            self.min_connections
        } else {
            POSTGRES_DEFAULT_MIN_CONNECTIONS
        }
    }

    pub fn resolved_acquire_timeout_secs(&self) -> u64 {
        if self.acquire_timeout_secs > 0 {
            self.acquire_timeout_secs
        } else {
            POSTGRES_DEFAULT_ACQUIRE_TIMEOUT_SECS
        }
    }

    pub fn resolved_idle_timeout_secs(&self) -> u64 {
        if self.idle_timeout_secs > 0 {
            self.idle_timeout_secs
        } else {
            POSTGRES_DEFAULT_IDLE_TIMEOUT_SECS
        }
    }

    pub fn resolved_max_lifetime_secs(&self) -> u64 {
        if self.max_lifetime_secs > 0 {
            self.max_lifetime_secs
        } else {
            POSTGRES_DEFAULT_MAX_LIFETIME_SECS
        }
    }

    pub fn resolved_statement_timeout_secs(&self) -> u64 {
        if self.statement_timeout_secs > 0 {
            self.statement_timeout_secs
        } else {
            POSTGRES_DEFAULT_STATEMENT_TIMEOUT_SECS
        }
    }
}

/// Pipeline execution configuration (final/runtime).
#[derive(Debug, Clone, Serialize)]
pub struct PipelineConfig {
    pub output_dir: PathBuf,
    pub chunk_size: usize,
    pub batch_size: usize,
    /// Resolved worker count: 0 in the file/CLI means "use CPU count", but
    /// this field always holds the resolved positive value.
    pub max_workers: usize,
    pub parallel_processing: bool,
    pub memory_limit_mb: u64,
    pub extract_timeout_secs: u64,
    pub transform_timeout_secs: u64,
    pub load_timeout_secs: u64,
    pub task_id: String,
}

/// Final merged application configuration.
#[derive(Debug, Clone)]
pub struct EtlConfig {
    pub database: DatabaseConfig,
    pub pipeline: PipelineConfig,
    pub source_path: PathBuf,
    pub user_display_name: Option<String>,
    pub archive_member: Option<String>,
    pub archive_index: Option<usize>,
    pub debug: bool,
}

impl EtlConfig {
    /// Load configuration from all sources.
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Local directory config OR CLI-specified config path
    /// 3. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");

        let mut file_config = FileConfig::default();

        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config = overlay_config;
        }

        let file_database = file_config.database.unwrap_or_default();
        let file_pipeline = file_config.pipeline.unwrap_or_default();

        let source_path = cli
            .source_path
            .clone()
            .map(|p| expand_path(&p.to_string_lossy()))
            .ok_or_else(|| anyhow::anyhow!("source path is required"))?;

        let database = DatabaseConfig {
            url: cli
                .database_url
                .clone()
                .or(file_database.url)
                .unwrap_or_default(),
            max_connections: cli.database_max_connections.or(file_database.max_connections).unwrap_or(0),
            min_connections: cli.database_min_connections.or(file_database.min_connections).unwrap_or(0),
            acquire_timeout_secs: cli
                .database_acquire_timeout_secs
                .or(file_database.acquire_timeout_secs)
                .unwrap_or(0),
            idle_timeout_secs: cli.database_idle_timeout_secs.or(file_database.idle_timeout_secs).unwrap_or(0),
            max_lifetime_secs: cli.database_max_lifetime_secs.or(file_database.max_lifetime_secs).unwrap_or(0),
            statement_timeout_secs: cli
                .database_statement_timeout_secs
                .or(file_database.statement_timeout_secs)
                .unwrap_or(0),
        };

        let output_dir = cli
            .output_dir
            .clone()
            .map(|p| expand_path(&p.to_string_lossy()))
            .or_else(|| file_pipeline.output_dir.as_ref().map(|p| expand_path(p)))
            .unwrap_or_else(|| expand_path("./output"));

        let max_workers_raw = cli.max_workers.or(file_pipeline.max_workers).unwrap_or(DEFAULT_MAX_WORKERS);
        let max_workers = if max_workers_raw == 0 {
            std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
        } else {
            max_workers_raw
        };

        let task_id = cli.task_id.clone().unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let pipeline = PipelineConfig {
            output_dir,
            chunk_size: cli.chunk_size.or(file_pipeline.chunk_size).unwrap_or(DEFAULT_CHUNK_SIZE),
            batch_size: cli.batch_size.or(file_pipeline.batch_size).unwrap_or(DEFAULT_BATCH_SIZE),
            max_workers,
            parallel_processing: cli
                .parallel_processing
                .or(file_pipeline.parallel_processing)
                .unwrap_or(DEFAULT_PARALLEL_PROCESSING),
            memory_limit_mb: cli.memory_limit_mb.or(file_pipeline.memory_limit_mb).unwrap_or(DEFAULT_MEMORY_LIMIT_MB),
            extract_timeout_secs: cli
                .extract_timeout_secs
                .or(file_pipeline.extract_timeout_secs)
                .unwrap_or(DEFAULT_EXTRACT_TIMEOUT_SECS),
            transform_timeout_secs: cli
                .transform_timeout_secs
                .or(file_pipeline.transform_timeout_secs)
                .unwrap_or(DEFAULT_TRANSFORM_TIMEOUT_SECS),
            load_timeout_secs: cli
                .load_timeout_secs
                .or(file_pipeline.load_timeout_secs)
                .unwrap_or(DEFAULT_LOAD_TIMEOUT_SECS),
            task_id,
        };

        let config = Self {
            database,
            pipeline,
            source_path,
            user_display_name: cli.user_display_name.clone(),
            archive_member: cli.archive_member.clone(),
            archive_index: cli.archive_index,
            debug: cli.debug || file_config.debug.unwrap_or(false),
        };

        config.validate()?;

        tracing::debug!(
            source_path = %config.source_path.display(),
            output_dir = %config.pipeline.output_dir.display(),
            task_id = %config.pipeline.task_id,
            chunk_size = config.pipeline.chunk_size,
            batch_size = config.pipeline.batch_size,
            max_workers = config.pipeline.max_workers,
            parallel_processing = config.pipeline.parallel_processing,
            "Configuration loaded"
        );

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.pipeline.chunk_size == 0 {
            anyhow::bail!("Configuration error: pipeline.chunk_size must be greater than 0");
        }
        if self.pipeline.batch_size == 0 {
            anyhow::bail!("Configuration error: pipeline.batch_size must be greater than 0");
        }
        if self.pipeline.memory_limit_mb == 0 {
            anyhow::bail!("Configuration error: pipeline.memory_limit_mb must be greater than 0");
        }
        Ok(())
    }
}
