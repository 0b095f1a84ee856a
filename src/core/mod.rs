//! Core application infrastructure: CLI parsing, layered configuration,
//! constants, and the cancellation signal shared across pipeline phases.

pub mod cancel;
pub mod cli;
pub mod config;
pub mod constants;

pub use cancel::CancellationToken;
pub use cli::{Cli, CliConfig};
pub use config::{DatabaseConfig, EtlConfig, PipelineConfig};
