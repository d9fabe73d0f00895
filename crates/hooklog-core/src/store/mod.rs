//! Storage backends for received webhooks.
//!
//! The `LogStore` trait is the only seam between the HTTP handlers and a
//! storage medium. Both implementations must behave identically as seen
//! through it: same descending listing order, same not-found semantics,
//! same structural round-trip of headers, body, and query.
//!
//! All persistence MUST go through this trait. Handlers never open files
//! or run SQL themselves.

use async_trait::async_trait;

pub mod file;
pub mod postgres;

pub use file::FileStore;
pub use postgres::PostgresStore;

use crate::{
    error::Result,
    models::{Record, RecordId},
};

/// Persists received webhooks and reads them back by identifier.
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Short backend name for acknowledgments and logs, e.g. `"file"`.
    fn backend_name(&self) -> &'static str;

    /// Persists a record under its identifier.
    ///
    /// Once this returns the record is visible to subsequent `list` and
    /// `get` calls.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::WriteFailed` if the medium rejects the write,
    /// including an identifier collision on the database backend.
    async fn save(&self, record: &Record) -> Result<RecordId>;

    /// Returns all known identifiers, descending (newest first).
    ///
    /// An empty store yields an empty vector, not an error.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ReadFailed` if the medium cannot be enumerated.
    async fn list(&self) -> Result<Vec<RecordId>>;

    /// Retrieves the full record stored under `id`, with headers, body,
    /// and query reconstituted to their original structured form.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no record exists under `id`, or
    /// `StoreError::ReadFailed` if the stored data is unreadable.
    async fn get(&self, id: &RecordId) -> Result<Record>;
}
