//! Audit trigger: one ledger block per finalized API response.

use std::time::Instant;

use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};

use crate::state::AppState;

/// Action label for request/response audit blocks.
pub const ACTION_API_CALL: &str = "API_CALL";
/// Action label recorded on successful admin login.
pub const ACTION_ADMIN_LOGIN: &str = "ADMIN_LOGIN";
/// Action label recorded when an application changes status.
pub const ACTION_STATUS_CHANGED: &str = "STATUS_CHANGED";

/// Response bodies above this size are not embedded in the chain; the block
/// records their length and SHA-256 instead, so the digest still commits to
/// the exact bytes.
const MAX_RECORDED_BODY_BYTES: usize = 8 * 1024;

/// Middleware appending an `API_CALL` block after every `/api` response.
///
/// Runs after the handler so the recorded payload reflects the final status
/// code, duration, and body. The response body is buffered once and replayed
/// to the client unchanged.
pub async fn record_api_call(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;
    if !path.starts_with("/api") {
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!("failed to buffer response body for audit: {e}");
            Bytes::new()
        }
    };

    let payload = json!({
        "method": method.as_str(),
        "path": path,
        "status": parts.status.as_u16(),
        "duration_ms": started.elapsed().as_millis() as u64,
        "response": response_snapshot(&bytes),
    });
    if let Err(e) = state.ledger.append(ACTION_API_CALL, payload).await {
        tracing::error!("failed to append audit block: {e}");
    }

    Response::from_parts(parts, Body::from(bytes))
}

/// Snapshot of a response body for inclusion in an audit payload.
fn response_snapshot(bytes: &Bytes) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    if bytes.len() > MAX_RECORDED_BODY_BYTES {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        return json!({
            "omitted": true,
            "bytes": bytes.len(),
            "sha256": hex::encode(hasher.finalize()),
        });
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
