//! Core domain models and storage backends.
//!
//! Provides the `Record` domain type, the error taxonomy shared by both
//! storage backends, and the `LogStore` abstraction with its file and
//! PostgreSQL implementations. The API crate depends on these types and
//! never touches a storage medium directly.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod models;
pub mod store;

pub use error::{Result, StoreError};
pub use models::{Record, RecordId};
pub use store::{FileStore, LogStore, PostgresStore};
