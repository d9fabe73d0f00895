//! Informational landing page.

use axum::{extract::State, response::Html};
use tracing::instrument;

use crate::server::AppState;

/// Handles `GET /`: a static page describing the service endpoints.
#[instrument(name = "index", skip(state))]
pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html>\n<head><meta charset=\"utf-8\"><title>hooklog</title></head>\n\
         <body>\n\
         <h1>hooklog</h1>\n\
         <p>Webhook receiver, currently storing to the <strong>{}</strong> backend.</p>\n\
         <ul>\n\
         <li><code>POST /webhook</code> &mdash; submit a JSON or form-encoded payload (&le;10&nbsp;MB)</li>\n\
         <li><a href=\"/logs\"><code>GET /logs</code></a> &mdash; browse recorded webhooks</li>\n\
         <li><code>GET /logs/&lt;identifier&gt;</code> &mdash; inspect one recorded webhook</li>\n\
         <li><a href=\"/health\"><code>GET /health</code></a> &mdash; liveness probe</li>\n\
         </ul>\n\
         </body>\n</html>",
        state.store.backend_name(),
    ))
}
