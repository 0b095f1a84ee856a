//! Domain logic for the Skype export ETL pipeline.
//!
//! - `content` - tolerant markup rendering and structured-index extraction
//! - `handlers` - the message handler registry (C1)
//! - `errors` - non-fatal error accumulation (C5)
//! - `progress` - per-phase progress tracking (C5)
//! - `memory` - memory-bounded back-pressure accounting (C5)
//! - `validate` - input/config/output shape validation (C3)
//! - `checkpoint` - checkpoint persistence and resume (C4)
//! - `context` - the composition root tying the above together (C6)
//! - `pipeline` - Extract/Transform/Load orchestration (C7)

pub mod checkpoint;
pub mod content;
pub mod context;
pub mod errors;
pub mod handlers;
pub mod memory;
pub mod pipeline;
pub mod progress;
pub mod validate;

pub use content::{format_markup, extract_structured, StructuredIndex};
pub use context::EtlContext;
pub use errors::{ErrorLogger, ErrorRecord};
pub use handlers::HandlerRegistry;
pub use memory::{MemoryMonitor, MemorySnapshot};
pub use progress::{PhaseStatus, ProgressSnapshot, ProgressTracker};
