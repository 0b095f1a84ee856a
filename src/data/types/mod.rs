//! Data transfer types shared between the pipeline phases and the
//! Postgres repositories.

pub mod checkpoint;
pub mod raw;
pub mod transformed;

pub use checkpoint::{CheckpointDescriptor, Phase, SpillRef};
pub use raw::{RawConversation, RawExport, RawMessage};
pub use transformed::{Attachment, ExportMetadata, Participant, TransformedConversation, TransformedExport, TransformedMessage};
