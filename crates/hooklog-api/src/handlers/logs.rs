//! Log browsing handlers.
//!
//! Renders the stored record list and individual records as minimal HTML.
//! Both handlers only ever read through the storage backend; there is no
//! write path here.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use hooklog_core::{RecordId, StoreError};
use tracing::{error, instrument};

use crate::server::AppState;

/// Handles `GET /logs`: all known identifiers, newest first, each
/// linking to its detail page. An empty store renders a distinct empty
/// state, not an error.
#[instrument(name = "list_logs", skip(state))]
pub async fn list_logs(State(state): State<AppState>) -> Response {
    let ids = match state.store.list().await {
        Ok(ids) => ids,
        Err(e) => {
            error!(error = %e, "failed to list webhook records");
            return error_page(StatusCode::INTERNAL_SERVER_ERROR, "Failed to list webhook logs");
        },
    };

    let body = if ids.is_empty() {
        "<p class=\"empty\">No webhooks received yet.</p>".to_string()
    } else {
        let items: String = ids
            .iter()
            .map(|id| {
                let escaped = escape_html(id.as_str());
                format!("<li><a href=\"/logs/{escaped}\">{escaped}</a></li>\n")
            })
            .collect();
        format!("<ul>\n{items}</ul>")
    };

    page(
        "Webhook logs",
        &format!("<h1>Webhook logs</h1>\n<p>{} recorded</p>\n{body}", ids.len()),
    )
    .into_response()
}

/// Handles `GET /logs/{id}`: one record with headers, body, and query as
/// distinct sections, or 404 if the identifier is unknown.
#[instrument(name = "show_log", skip(state), fields(identifier = %id))]
pub async fn show_log(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let id = RecordId::new(id);

    let record = match state.store.get(&id).await {
        Ok(record) => record,
        Err(StoreError::NotFound(_)) => {
            return error_page(
                StatusCode::NOT_FOUND,
                &format!("No webhook log found for '{}'", escape_html(id.as_str())),
            );
        },
        Err(e) => {
            error!(error = %e, "failed to read webhook record");
            return error_page(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read webhook log");
        },
    };

    let headers = render_map(&record.headers);
    let query = if record.query.is_empty() {
        "<p class=\"empty\">none</p>".to_string()
    } else {
        render_map(&record.query)
    };
    let body_json =
        serde_json::to_string_pretty(&record.body).unwrap_or_else(|_| record.body.to_string());

    let content = format!(
        "<h1>{id}</h1>\n\
         <p>received at {ts}</p>\n\
         <h2>Headers</h2>\n{headers}\n\
         <h2>Body</h2>\n<pre>{body}</pre>\n\
         <h2>Query</h2>\n{query}\n\
         <p><a href=\"/logs\">&larr; back to all logs</a></p>",
        id = escape_html(id.as_str()),
        ts = record.received_at.to_rfc3339(),
        body = escape_html(&body_json),
    );

    page(&format!("Webhook {id}"), &content).into_response()
}

fn render_map(map: &std::collections::BTreeMap<String, String>) -> String {
    let rows: String = map
        .iter()
        .map(|(k, v)| {
            format!("<tr><th>{}</th><td>{}</td></tr>\n", escape_html(k), escape_html(v))
        })
        .collect();
    format!("<table>\n{rows}</table>")
}

fn page(title: &str, content: &str) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n\
         <body>\n{content}\n</body>\n</html>",
        escape_html(title),
    ))
}

fn error_page(status: StatusCode, message: &str) -> Response {
    (status, page("Error", &format!("<h1>{message}</h1>"))).into_response()
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_neutralizes_markup() {
        assert_eq!(escape_html("<script>\"&'"), "&lt;script&gt;&quot;&amp;&#39;");
    }

    #[test]
    fn map_renders_as_table_rows() {
        let mut map = std::collections::BTreeMap::new();
        map.insert("x-sender".to_string(), "a & b".to_string());
        let html = render_map(&map);
        assert!(html.contains("<th>x-sender</th>"));
        assert!(html.contains("a &amp; b"));
    }
}
