//! Domain models for received webhooks.

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Newtype for record identifiers.
///
/// An identifier is the receipt time rendered as UTC ISO-8601 with colons
/// replaced by hyphens and millisecond precision, e.g.
/// `2024-05-01T09-30-12.481Z`. That makes it safe as a filename and keeps
/// lexicographic order identical to chronological order, which is what the
/// descending `list` guarantee relies on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Derives an identifier from a receipt timestamp.
    pub fn from_timestamp(at: DateTime<Utc>) -> Self {
        let iso = at.to_rfc3339_opts(SecondsFormat::Millis, true);
        Self(iso.replace(':', "-"))
    }

    /// Wraps an identifier string taken from a request path or a stored
    /// filename. No validation happens here; backends reject identifiers
    /// that cannot name one of their records.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A single received webhook.
///
/// Created once by the receive handler, persisted synchronously within the
/// same request, and never mutated afterwards. The browsing handlers only
/// ever read records back.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Unique identifier, derived from `received_at`. Assigned exactly
    /// once at creation.
    pub id: RecordId,
    /// Receipt timestamp.
    pub received_at: DateTime<Utc>,
    /// Request headers as received, in deterministic order.
    pub headers: BTreeMap<String, String>,
    /// Request body as a structured JSON-compatible value.
    pub body: serde_json::Value,
    /// Decoded query parameters.
    pub query: BTreeMap<String, String>,
}

impl Record {
    /// Builds a record for a webhook received at `received_at`, deriving
    /// its identifier from that timestamp.
    pub fn new(
        received_at: DateTime<Utc>,
        headers: BTreeMap<String, String>,
        body: serde_json::Value,
        query: BTreeMap<String, String>,
    ) -> Self {
        Self { id: RecordId::from_timestamp(received_at), received_at, headers, body, query }
    }
}
