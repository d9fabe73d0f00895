//! Error taxonomy for storage operations.
//!
//! Every failure a storage backend can surface maps onto one of these
//! variants, so handlers can translate them to HTTP statuses without
//! knowing which backend is active. Read failures (corrupt persisted
//! data) are deliberately distinct from `NotFound`.

use thiserror::Error;

/// Result type alias using `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Storage-layer error type shared by all backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record exists under the requested identifier.
    #[error("no record found for '{0}'")]
    NotFound(String),

    /// The underlying medium rejected a write (disk full, connection
    /// failure, constraint violation).
    #[error("storage write failed: {0}")]
    WriteFailed(String),

    /// A persisted record exists but could not be read back or parsed.
    #[error("stored record unreadable: {0}")]
    ReadFailed(String),

    /// Request payload exceeds the configured ceiling. Enforced at the
    /// handler boundary, before any backend is reached.
    #[error("payload too large: {size_bytes} bytes exceeds {limit_bytes} byte limit")]
    PayloadTooLarge {
        /// Size of the offending payload in bytes.
        size_bytes: usize,
        /// The configured ceiling in bytes.
        limit_bytes: usize,
    },
}

impl StoreError {
    /// Wraps an underlying error as a write failure.
    pub fn write(err: impl std::fmt::Display) -> Self {
        Self::WriteFailed(err.to_string())
    }

    /// Wraps an underlying error as a read failure.
    pub fn read(err: impl std::fmt::Display) -> Self {
        Self::ReadFailed(err.to_string())
    }

    /// Returns true for failures the client caused (missing record,
    /// oversized payload) rather than infrastructure faults.
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::PayloadTooLarge { .. })
    }
}
