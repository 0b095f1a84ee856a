//! Data storage layer.
//!
//! - `postgres` - PostgreSQL persistence: schema, migrations, repositories
//! - `types` - shared data transfer types (raw export shapes, the
//!   transformed projection, checkpoint descriptors)
//! - `error` - unified pipeline error taxonomy

pub mod error;
pub mod postgres;
pub mod types;

pub use error::{EtlError, LoadError};
pub use postgres::PostgresService;
