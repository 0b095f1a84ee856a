//! Checkpoint descriptor types: the small JSON-serializable record written
//! to disk after each phase, with large payloads spilled to sibling files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Extract,
    Transform,
    Load,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Extract => "extract",
            Phase::Transform => "transform",
            Phase::Load => "load",
        }
    }
}

/// A pointer to a spilled payload file rather than the payload itself.
///
/// `raw_data` and `transformed_data` are spilled because they can be large
/// enough that inlining them in the checkpoint JSON would make the
/// checkpoint itself slow to write and parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpillRef {
    pub path: PathBuf,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointDescriptor {
    pub run_id: String,
    pub phase: Phase,
    pub completed: bool,
    pub processed_conversations: usize,
    pub total_conversations: usize,
    pub raw_data: Option<SpillRef>,
    pub transformed_data: Option<SpillRef>,
    pub error: Option<String>,
    pub created_at: String,
}

impl CheckpointDescriptor {
    pub fn new(run_id: impl Into<String>, phase: Phase, created_at: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            phase,
            completed: false,
            processed_conversations: 0,
            total_conversations: 0,
            raw_data: None,
            transformed_data: None,
            error: None,
            created_at: created_at.into(),
        }
    }

    pub fn is_resumable(&self) -> bool {
        !self.completed && self.error.is_none()
    }
}
