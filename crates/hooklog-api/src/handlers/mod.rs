//! HTTP request handlers for the hooklog API.
//!
//! Handlers are grouped by functionality:
//! - `receive` - webhook intake (`POST /webhook`)
//! - `logs` - log browsing (`GET /logs`, `GET /logs/{id}`)
//! - `health` - liveness probe
//! - `index` - informational landing page
//!
//! Every handler converts storage failures into an HTTP status plus a
//! human-readable message; no internal error ever reaches a client raw.

pub mod health;
pub mod index;
pub mod logs;
pub mod receive;

// Re-export handlers for convenient access
pub use health::health_check;
pub use index::index;
pub use logs::{list_logs, show_log};
pub use receive::receive_webhook;
