pub mod blob;
pub mod error;
pub mod sql;

pub use blob::{sanitize_key_component, BlobMeta, BlobStore, FsBlobStore};
pub use error::{BlobError, SqlError};
pub use sql::{Row, SqlStore, SqliteStore, Value};
