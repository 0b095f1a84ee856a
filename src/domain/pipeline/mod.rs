//! Extract/Transform/Load orchestration (C7): wires the three phase
//! executors to a shared `EtlContext`, checkpointing after each phase and
//! writing the run summary on exit.

mod extract;
mod load;
mod transform;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use crate::core::cancel::CancellationToken;
use crate::core::cli::CliConfig;
use crate::core::config::EtlConfig;
use crate::core::constants::SUMMARY_FILE_PREFIX;
use crate::data::error::{EtlError, LoadError};
use crate::data::postgres::PostgresService;
use crate::data::types::Phase;
use crate::domain::handlers::HandlerRegistry;

use super::context::EtlContext;

pub async fn run(cli_config: CliConfig) -> anyhow::Result<()> {
    let resume = cli_config.resume;
    let config = EtlConfig::load(&cli_config)?;
    std::fs::create_dir_all(&config.pipeline.output_dir)
        .with_context(|| format!("failed to create output dir {}", config.pipeline.output_dir.display()))?;

    let source_path = config.source_path.clone();
    let task_id = config.pipeline.task_id.clone();
    let output_dir = config.pipeline.output_dir.clone();

    let cancel = CancellationToken::new();
    cancel.install_signal_handlers();

    let postgres = PostgresService::init(&config.database)
        .await
        .map_err(|e| EtlError::Loading(LoadError::from(e)))?;

    let mut ctx = EtlContext::new(config, source_path);

    let outcome = run_phases(&mut ctx, &postgres, resume, &cancel).await;

    write_summary(&ctx, &output_dir, &task_id)?;
    postgres.close().await;

    outcome.map_err(anyhow::Error::from)
}

async fn run_phases(
    ctx: &mut EtlContext,
    postgres: &PostgresService,
    resume: bool,
    cancel: &CancellationToken,
) -> Result<(), EtlError> {
    let registry = Arc::new(HandlerRegistry::new());

    if resume && ctx.can_resume_from_phase(Phase::Transform) && ctx.restore(Phase::Extract.as_str()) {
        tracing::info!("resumed extract checkpoint");
    } else {
        extract::run(ctx).await?;
        ctx.checkpoint(Phase::Extract).map_err(|e| EtlError::checkpoint(e.to_string()))?;
    }

    if cancel.is_cancelled() {
        return Err(EtlError::Cancelled);
    }

    if resume && ctx.can_resume_from_phase(Phase::Load) && ctx.restore(Phase::Transform.as_str()) {
        tracing::info!("resumed transform checkpoint");
    } else {
        transform::run(ctx, Arc::clone(&registry), cancel).await?;
        ctx.checkpoint(Phase::Transform).map_err(|e| EtlError::checkpoint(e.to_string()))?;
    }

    if cancel.is_cancelled() {
        return Err(EtlError::Cancelled);
    }

    load::run(ctx, postgres).await?;
    ctx.checkpoint(Phase::Load).map_err(|e| EtlError::checkpoint(e.to_string()))?;

    Ok(())
}

fn write_summary(ctx: &EtlContext, output_dir: &PathBuf, task_id: &str) -> anyhow::Result<()> {
    let path = output_dir.join(format!("{SUMMARY_FILE_PREFIX}{task_id}.json"));
    let summary = ctx.summary();
    std::fs::write(&path, serde_json::to_vec_pretty(&summary)?)
        .with_context(|| format!("failed to write summary to {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote run summary");
    Ok(())
}
