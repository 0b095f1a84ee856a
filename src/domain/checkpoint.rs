//! Checkpoint Manager (C4): persists a small descriptor plus spilled
//! payloads after each phase so a run can resume without redoing work.
//!
//! Layout under `<output_dir>/checkpoints/<task_id>/`:
//!   <checkpoint_id>.json       - the `CheckpointDescriptor`
//!   <checkpoint_id>/raw.json           - spilled raw export (if present)
//!   <checkpoint_id>/transformed.json   - spilled transformed export (if present)

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::core::constants::{CHECKPOINTS_DIR_NAME, RAW_SPILL_FILE_NAME, TRANSFORMED_SPILL_FILE_NAME};
use crate::data::types::{CheckpointDescriptor, Phase, SpillRef};
use crate::utils::crypto::sha256_hex;

pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    pub fn new(output_dir: &Path, task_id: &str) -> Self {
        Self { dir: output_dir.join(CHECKPOINTS_DIR_NAME).join(task_id) }
    }

    fn descriptor_path(&self, checkpoint_id: &str) -> PathBuf {
        self.dir.join(format!("{checkpoint_id}.json"))
    }

    fn payload_dir(&self, checkpoint_id: &str) -> PathBuf {
        self.dir.join(checkpoint_id)
    }

    /// Writes a checkpoint descriptor, spilling `raw`/`transformed` payloads
    /// to sibling files when provided. Returns the checkpoint id, which is
    /// `<phase>` — one checkpoint slot per phase, overwritten on each save.
    pub fn create(
        &self,
        mut descriptor: CheckpointDescriptor,
        raw: Option<&impl Serialize>,
        transformed: Option<&impl Serialize>,
    ) -> std::io::Result<String> {
        let checkpoint_id = descriptor.phase.as_str().to_string();
        std::fs::create_dir_all(&self.dir)?;
        let payload_dir = self.payload_dir(&checkpoint_id);

        if let Some(raw) = raw {
            std::fs::create_dir_all(&payload_dir)?;
            let path = payload_dir.join(RAW_SPILL_FILE_NAME);
            let json = serde_json::to_string(raw)?;
            let sha256 = sha256_hex(&json);
            std::fs::write(&path, &json)?;
            descriptor.raw_data = Some(SpillRef { path, sha256 });
        }

        if let Some(transformed) = transformed {
            std::fs::create_dir_all(&payload_dir)?;
            let path = payload_dir.join(TRANSFORMED_SPILL_FILE_NAME);
            let json = serde_json::to_string(transformed)?;
            let sha256 = sha256_hex(&json);
            std::fs::write(&path, &json)?;
            descriptor.transformed_data = Some(SpillRef { path, sha256 });
        }

        let descriptor_json = serde_json::to_string_pretty(&descriptor)?;
        std::fs::write(self.descriptor_path(&checkpoint_id), descriptor_json)?;

        Ok(checkpoint_id)
    }

    pub fn get(&self, checkpoint_id: &str) -> std::io::Result<CheckpointDescriptor> {
        let content = std::fs::read_to_string(self.descriptor_path(checkpoint_id))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Lists checkpoint ids present on disk, most recently created first.
    pub fn list(&self) -> std::io::Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries: Vec<(String, CheckpointDescriptor)> = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let id = path.file_stem().unwrap().to_string_lossy().to_string();
            if let Ok(descriptor) = self.get(&id) {
                entries.push((id, descriptor));
            }
        }
        entries.sort_by(|a, b| b.1.created_at.cmp(&a.1.created_at));
        Ok(entries.into_iter().map(|(id, _)| id).collect())
    }

    /// Restores a spilled payload as raw JSON, verifying its checksum.
    pub fn restore_spill(&self, spill: &SpillRef) -> std::io::Result<JsonValue> {
        let content = std::fs::read_to_string(&spill.path)?;
        if sha256_hex(&content) != spill.sha256 {
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, "checkpoint spill checksum mismatch"));
        }
        Ok(serde_json::from_str(&content)?)
    }

    /// True if a completed checkpoint exists for `phase` or any phase after
    /// it, meaning a resumed run can skip straight past it.
    pub fn is_phase_complete(&self, phase: Phase) -> bool {
        self.get(phase.as_str()).map(|d| d.completed).unwrap_or(false)
    }
}
