use std::panic::AssertUnwindSafe;

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::FutureExt;
use serde_json::json;
use tracing::error;

/// Catches panics inside handler futures and converts them into the same
/// `{"success": false, "error": ...}` envelope every other failure path
/// uses (SPEC_FULL §7), instead of letting the connection drop with no body.
pub async fn catch_panics(req: Request, next: Next) -> Response {
    match AssertUnwindSafe(next.run(req)).catch_unwind().await {
        Ok(response) => response,
        Err(panic) => {
            let message = panic_message(&panic);
            error!(panic = %message, "handler panicked");
            (
                StatusCode::OK,
                Json(json!({ "success": false, "error": "internal error" })),
            )
                .into_response()
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
