//! Webhook intake handler.
//!
//! Accepts an arbitrary JSON or form-encoded payload, builds a timestamped
//! record, and persists it synchronously through the active storage
//! backend before acknowledging.

use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use chrono::{SecondsFormat, Utc};
use hooklog_core::Record;
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::server::{AppState, MAX_PAYLOAD_BYTES};

/// Acknowledgment for a stored webhook.
#[derive(Debug, Serialize)]
pub struct ReceiveResponse {
    /// Always `"success"`.
    pub status: &'static str,
    /// Human-readable confirmation.
    pub message: &'static str,
    /// Receipt timestamp the identifier was derived from.
    pub timestamp: String,
    /// Which backend handled the write (`"file"` or `"postgres"`).
    pub storage: &'static str,
}

/// Error acknowledgment when the webhook could not be stored or parsed.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Always `"error"`.
    pub status: &'static str,
    /// Human-readable description of what failed.
    pub message: String,
    /// Underlying error message, sanitized of internal detail.
    pub error: String,
}

/// Handles `POST /webhook`.
///
/// # Errors
///
/// Returns appropriate HTTP status codes:
/// - 400: body declared as JSON or form-encoded but unparseable
/// - 413: payload exceeds the 10 MB ceiling
/// - 500: storage write failed
#[instrument(
    name = "receive_webhook",
    skip(state, query, headers, body),
    fields(
        storage = state.store.backend_name(),
        content_length = body.len(),
    )
)]
pub async fn receive_webhook(
    State(state): State<AppState>,
    Query(query): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if body.len() > MAX_PAYLOAD_BYTES {
        warn!(payload_size = body.len(), limit = MAX_PAYLOAD_BYTES, "payload exceeds size limit");
        return error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            "Payload too large",
            format!("payload of {} bytes exceeds {MAX_PAYLOAD_BYTES} byte limit", body.len()),
        );
    }

    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream");

    let payload = match parse_body(content_type, &body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(content_type, error = %e, "unparseable webhook body");
            return error_response(StatusCode::BAD_REQUEST, "Malformed payload", e);
        },
    };

    let record = Record::new(Utc::now(), extract_headers(&headers), payload, query);

    match state.store.save(&record).await {
        Ok(id) => {
            info!(identifier = %id, "webhook received and logged");
            (
                StatusCode::OK,
                Json(ReceiveResponse {
                    status: "success",
                    message: "Webhook received and logged",
                    timestamp: record.received_at.to_rfc3339_opts(SecondsFormat::Millis, true),
                    storage: state.store.backend_name(),
                }),
            )
                .into_response()
        },
        Err(e) => {
            error!(error = %e, "failed to persist webhook");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to store webhook",
                e.to_string(),
            )
        },
    }
}

/// Decodes the request body into a structured value.
///
/// JSON content types must parse as JSON; form-encoded bodies become a
/// string map. Anything else is tried as JSON first and otherwise kept
/// verbatim as a string, so no payload is ever dropped.
fn parse_body(content_type: &str, body: &[u8]) -> Result<serde_json::Value, String> {
    if body.is_empty() {
        return Ok(serde_json::Value::Null);
    }

    if content_type.contains("json") {
        return serde_json::from_slice(body).map_err(|e| format!("invalid JSON body: {e}"));
    }

    if content_type.contains("x-www-form-urlencoded") {
        let form: BTreeMap<String, String> = serde_urlencoded::from_bytes(body)
            .map_err(|e| format!("invalid form-encoded body: {e}"))?;
        return serde_json::to_value(form).map_err(|e| e.to_string());
    }

    match serde_json::from_slice(body) {
        Ok(value) => Ok(value),
        Err(_) => Ok(serde_json::Value::String(String::from_utf8_lossy(body).into_owned())),
    }
}

/// Extracts headers into an ordered map for storage.
fn extract_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for (name, value) in headers {
        if let Ok(value_str) = value.to_str() {
            map.insert(name.as_str().to_string(), value_str.to_string());
        }
    }
    map
}

fn error_response(status: StatusCode, message: &str, error: String) -> Response {
    (status, Json(ErrorResponse { status: "error", message: message.to_string(), error }))
        .into_response()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn json_body_is_parsed() {
        let value = parse_body("application/json", br#"{"a": 1}"#).unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = parse_body("application/json; charset=utf-8", b"{ nope").unwrap_err();
        assert!(err.contains("invalid JSON body"));
    }

    #[test]
    fn form_body_becomes_string_map() {
        let value =
            parse_body("application/x-www-form-urlencoded", b"a=1&b=two%20words").unwrap();
        assert_eq!(value, json!({"a": "1", "b": "two words"}));
    }

    #[test]
    fn empty_body_is_null() {
        assert_eq!(parse_body("application/json", b"").unwrap(), serde_json::Value::Null);
    }

    #[test]
    fn unknown_content_type_falls_back_to_string() {
        let value = parse_body("text/plain", b"hello webhook").unwrap();
        assert_eq!(value, json!("hello webhook"));
    }

    #[test]
    fn headers_extraction_preserves_all_values() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", "application/json".parse().unwrap());
        headers.insert("x-custom-header", "test-value".parse().unwrap());

        let extracted = extract_headers(&headers);

        assert_eq!(extracted.get("content-type").unwrap(), "application/json");
        assert_eq!(extracted.get("x-custom-header").unwrap(), "test-value");
    }
}
