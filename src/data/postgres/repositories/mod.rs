//! One module per target table, each exposing the batched insert the Load
//! phase issues against a single open transaction.

pub mod attachments;
pub mod conversations;
pub mod exports;
pub mod messages;
pub mod participants;
pub mod raw_exports;
