//! ETL Context (C6): the composition root and only mutable rendezvous
//! between phases. Owns configuration, the C1-C5 managers, and the data
//! references passed from Extract to Transform to Load.

use std::path::PathBuf;

use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::core::config::EtlConfig;
use crate::data::types::{CheckpointDescriptor, Phase, RawExport, TransformedExport};

use super::checkpoint::CheckpointManager;
use super::errors::ErrorLogger;
use super::memory::{MemoryMonitor, MemorySnapshot};
use super::progress::{PhaseStatus, ProgressTracker};

pub struct EtlContext {
    pub config: EtlConfig,
    progress: ProgressTracker,
    memory: MemoryMonitor,
    errors: ErrorLogger,
    checkpoints: CheckpointManager,

    pub raw_data: Option<RawExport>,
    pub transformed_data: Option<TransformedExport>,
    pub file_source: PathBuf,
    pub export_id: Option<i32>,
    pub user_id: Option<String>,
    pub user_display_name: Option<String>,
    pub export_date: Option<String>,
    pub custom_metadata: JsonMap<String, JsonValue>,

    aborted: bool,
    pending_warning: bool,
}

impl EtlContext {
    pub fn new(config: EtlConfig, file_source: PathBuf) -> Self {
        let memory = MemoryMonitor::new(config.pipeline.memory_limit_mb);
        let checkpoints = CheckpointManager::new(&config.pipeline.output_dir, &config.pipeline.task_id);
        Self {
            config,
            progress: ProgressTracker::new(),
            memory,
            errors: ErrorLogger::new(),
            checkpoints,
            raw_data: None,
            transformed_data: None,
            file_source,
            export_id: None,
            user_id: None,
            user_display_name: None,
            export_date: None,
            custom_metadata: JsonMap::new(),
            aborted: false,
            pending_warning: false,
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    pub fn errors(&self) -> &ErrorLogger {
        &self.errors
    }

    pub fn memory_monitor(&self) -> &MemoryMonitor {
        &self.memory
    }

    pub fn memory_monitor_mut(&mut self) -> &mut MemoryMonitor {
        &mut self.memory
    }

    pub fn start_phase(&mut self, phase: Phase, total: usize, item_type: impl Into<String>) {
        self.progress.start_phase(phase, total, item_type);
        self.pending_warning = false;
    }

    pub fn update_progress(&mut self, current: usize) {
        self.progress.update(current);
    }

    pub fn end_phase(&mut self, status: PhaseStatus) {
        let status = if status == PhaseStatus::Completed && self.pending_warning {
            PhaseStatus::Warning
        } else {
            status
        };
        self.progress.end_phase(status);
        self.pending_warning = false;
    }

    /// `fatal=true` fails the current phase and aborts the pipeline;
    /// `fatal=false` is recorded but only downgrades the phase to
    /// `warning` when it otherwise would have completed.
    pub fn record_error(&mut self, phase: Phase, message: impl Into<String>, details: Option<JsonValue>, fatal: bool) {
        self.errors.record(phase, message, details, fatal);
        if fatal {
            self.progress.end_phase(PhaseStatus::Failed);
            self.aborted = true;
        } else {
            self.pending_warning = true;
        }
    }

    pub fn check_memory(&self) -> MemorySnapshot {
        self.memory.snapshot()
    }

    /// Writes a checkpoint for the phase that just completed. Spills
    /// whichever of `raw_data`/`transformed_data` is populated.
    pub fn checkpoint(&self, phase: Phase) -> std::io::Result<String> {
        let mut descriptor = CheckpointDescriptor::new(&self.config.pipeline.task_id, phase, now_rfc3339());
        descriptor.completed = self.progress.status(phase) == PhaseStatus::Completed
            || self.progress.status(phase) == PhaseStatus::Warning;
        if let Some(conversations) = self.transformed_data.as_ref().map(|t| t.conversations.len()) {
            descriptor.total_conversations = conversations;
            descriptor.processed_conversations = conversations;
        } else if let Some(conversations) = self.raw_data.as_ref().map(|r| r.conversations.len()) {
            descriptor.total_conversations = conversations;
        }

        self.checkpoints.create(descriptor, self.raw_data.as_ref(), self.transformed_data.as_ref())
    }

    /// Restores state for `checkpoint_id`, reloading whichever payload was
    /// spilled. Returns `false` if the checkpoint or a referenced spill is
    /// missing.
    pub fn restore(&mut self, checkpoint_id: &str) -> bool {
        let descriptor = match self.checkpoints.get(checkpoint_id) {
            Ok(d) => d,
            Err(_) => return false,
        };

        if let Some(spill) = &descriptor.raw_data {
            match self.checkpoints.restore_spill(spill) {
                Ok(json) => match serde_json::from_value(json) {
                    Ok(raw) => self.raw_data = Some(raw),
                    Err(_) => return false,
                },
                Err(_) => return false,
            }
        }

        if let Some(spill) = &descriptor.transformed_data {
            match self.checkpoints.restore_spill(spill) {
                Ok(json) => match serde_json::from_value(json) {
                    Ok(transformed) => self.transformed_data = Some(transformed),
                    Err(_) => return false,
                },
                Err(_) => return false,
            }
        }

        if descriptor.completed {
            self.progress.mark_completed(descriptor.phase);
        }

        true
    }

    /// True iff every phase preceding `phase` has a completed checkpoint on
    /// disk.
    pub fn can_resume_from_phase(&self, phase: Phase) -> bool {
        [Phase::Extract, Phase::Transform, Phase::Load]
            .into_iter()
            .take_while(|&p| p != phase)
            .all(|p| self.checkpoints.is_phase_complete(p))
    }

    /// The run summary written to `<output_dir>/summary_<task_id>.json`.
    pub fn summary(&self) -> JsonValue {
        serde_json::json!({
            "task_id": self.config.pipeline.task_id,
            "source": self.file_source,
            "user_id": self.user_id,
            "user_display_name": self.user_display_name,
            "export_date": self.export_date,
            "phases": {
                "extract": self.progress.status(Phase::Extract),
                "transform": self.progress.status(Phase::Transform),
                "load": self.progress.status(Phase::Load),
            },
            "fatal_errors": self.errors.fatal_count(),
            "non_fatal_errors": self.errors.non_fatal_count(),
            "aborted": self.aborted,
            "total_messages": self.transformed_data.as_ref().map(|t| t.total_messages()),
        })
    }
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{DatabaseConfig, PipelineConfig};

    fn test_config(output_dir: PathBuf) -> EtlConfig {
        EtlConfig {
            database: DatabaseConfig {
                url: "postgres://localhost/test".into(),
                max_connections: 1,
                min_connections: 1,
                acquire_timeout_secs: 1,
                idle_timeout_secs: 1,
                max_lifetime_secs: 1,
                statement_timeout_secs: 1,
            },
            pipeline: PipelineConfig {
                output_dir,
                chunk_size: 10,
                batch_size: 10,
                max_workers: 1,
                parallel_processing: false,
                memory_limit_mb: 128,
                extract_timeout_secs: 1,
                transform_timeout_secs: 1,
                load_timeout_secs: 1,
                task_id: "task-1".into(),
            },
            source_path: PathBuf::from("export.json"),
            user_display_name: None,
            archive_member: None,
            archive_index: None,
            debug: false,
        }
    }

    #[test]
    fn fatal_error_aborts_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = EtlContext::new(test_config(dir.path().to_path_buf()), PathBuf::from("export.json"));
        ctx.start_phase(Phase::Extract, 10, "conversations");
        ctx.record_error(Phase::Extract, "boom", None, true);
        assert!(ctx.is_aborted());
    }

    #[test]
    fn non_fatal_error_downgrades_to_warning() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = EtlContext::new(test_config(dir.path().to_path_buf()), PathBuf::from("export.json"));
        ctx.start_phase(Phase::Transform, 10, "messages");
        ctx.record_error(Phase::Transform, "skip one", None, false);
        ctx.end_phase(PhaseStatus::Completed);
        assert!(!ctx.is_aborted());
    }

    #[test]
    fn checkpoint_and_resume_gate() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = EtlContext::new(test_config(dir.path().to_path_buf()), PathBuf::from("export.json"));
        ctx.start_phase(Phase::Extract, 0, "conversations");
        ctx.end_phase(PhaseStatus::Completed);
        let id = ctx.checkpoint(Phase::Extract).unwrap();
        assert_eq!(id, "extract");
        assert!(ctx.can_resume_from_phase(Phase::Transform));
        assert!(!ctx.can_resume_from_phase(Phase::Load));
    }
}
