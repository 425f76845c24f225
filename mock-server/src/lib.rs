//! Echo-style HTTP server used by the pipeline's integration tests.
//!
//! Every route reflects something about the incoming request back to the
//! caller, so tests can observe exactly what the pipeline put on the wire:
//! `/echo` returns the JSON body, `/cookies` turns request cookies into
//! `Set-Cookie` headers (plus one server-set cookie), `/gated` succeeds only
//! for JSON content, `/text` echoes a plain-text body, `/status/{code}`
//! answers with the requested status, and `/method` answers with the verb.

use axum::{
    extract::Path,
    http::{header, HeaderMap, Method, StatusCode},
    response::{AppendHeaders, IntoResponse},
    routing::{any, get, post},
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;

/// Reply from the content-type-gated route.
#[derive(Debug, Serialize)]
pub struct GatedReply {
    pub accepted: bool,
}

pub fn app() -> Router {
    Router::new()
        .route("/echo", post(echo))
        .route("/cookies", get(echo_cookies))
        .route("/gated", any(gated))
        .route("/text", post(echo_text))
        .route("/status/{code}", get(fixed_status))
        .route("/method", any(method_name))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(Json(value): Json<serde_json::Value>) -> Json<serde_json::Value> {
    Json(value)
}

/// Echo every request cookie back as a `Set-Cookie` header and add one
/// server-set cookie on top.
async fn echo_cookies(headers: HeaderMap) -> impl IntoResponse {
    let mut pairs: Vec<(header::HeaderName, String)> = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .split(';')
        .map(str::trim)
        .filter(|pair| pair.contains('='))
        .map(|pair| (header::SET_COOKIE, pair.to_string()))
        .collect();
    pairs.push((header::SET_COOKIE, "flavor=oatmeal".to_string()));
    (AppendHeaders(pairs), "ok")
}

/// 200 only when the request declares `Content-Type: application/json`,
/// 415 otherwise.
async fn gated(headers: HeaderMap) -> (StatusCode, Json<GatedReply>) {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if is_json {
        (StatusCode::OK, Json(GatedReply { accepted: true }))
    } else {
        (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Json(GatedReply { accepted: false }),
        )
    }
}

async fn echo_text(body: String) -> String {
    body
}

async fn fixed_status(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}

async fn method_name(method: Method) -> String {
    method.to_string()
}
