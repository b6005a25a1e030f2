use crate::app_state::AppState;
use crate::credential::extract_api_key;
use crate::response::{JSON_CONTENT_TYPE, NO_STORE, error_response};
use axum::body::Body;
use axum::http::{HeaderMap, Response, StatusCode, header};
use tracing::{debug, error};

pub const MISSING_KEY_MESSAGE: &str =
    "Missing OpenAI API key. Provide X-OpenAI-Api-Key (recommended) or Authorization: Bearer <key>.";

/// The only upstream response headers the streaming proxy relays. Everything
/// else the provider sends is dropped.
const STREAM_HEADER_ALLOWLIST: [&str; 3] = ["content-type", "content-disposition", "content-length"];

/// Outbound payload for a JSON-proxied call.
pub enum UpstreamBody {
    Empty,
    Json(String),
    Multipart(reqwest::multipart::Form),
}

pub fn missing_key_response() -> Response<Body> {
    error_response(StatusCode::BAD_REQUEST, MISSING_KEY_MESSAGE)
}

/// Forward a request whose response is a bounded JSON-shaped body.
///
/// The upstream body is relayed verbatim as text, so provider error payloads
/// reach the caller untouched. Exactly one upstream call, never retried.
pub async fn proxy_json(
    state: &AppState,
    headers: &HeaderMap,
    method: reqwest::Method,
    path: &str,
    body: UpstreamBody,
) -> Response<Body> {
    let Some(api_key) = extract_api_key(headers) else {
        return missing_key_response();
    };

    let url = state.upstream_url(path);
    debug!(%method, path, "Forwarding request upstream");

    let mut request = state.client.request(method, &url).bearer_auth(&api_key);
    request = match body {
        UpstreamBody::Empty => request,
        UpstreamBody::Json(json) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(json),
        UpstreamBody::Multipart(form) => request.multipart(form),
    };

    let upstream = match request.send().await {
        Ok(upstream) => upstream,
        Err(err) => return upstream_failed(path, err),
    };

    let status = relay_status(upstream.status());
    let content_type = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(JSON_CONTENT_TYPE)
        .to_string();

    let text = match upstream.text().await {
        Ok(text) => text,
        Err(err) => return upstream_failed(path, err),
    };

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CACHE_CONTROL, NO_STORE)
        .body(Body::from(text))
        .unwrap()
}

/// Forward a request whose response body may be large binary content.
///
/// The body is relayed chunk by chunk straight off the upstream connection,
/// never collected. Only the allow-listed headers pass through. If the caller
/// disconnects mid-transfer the response future is dropped, which aborts the
/// upstream read with it.
pub async fn proxy_stream(
    state: &AppState,
    headers: &HeaderMap,
    method: reqwest::Method,
    path: &str,
) -> Response<Body> {
    let Some(api_key) = extract_api_key(headers) else {
        return missing_key_response();
    };

    let url = state.upstream_url(path);
    debug!(%method, path, "Forwarding streaming request upstream");

    let upstream = match state
        .client
        .request(method, &url)
        .bearer_auth(&api_key)
        .send()
        .await
    {
        Ok(upstream) => upstream,
        Err(err) => return upstream_failed(path, err),
    };

    let mut builder = Response::builder().status(relay_status(upstream.status()));
    for name in STREAM_HEADER_ALLOWLIST {
        if let Some(value) = upstream.headers().get(name).and_then(|v| v.to_str().ok()) {
            builder = builder.header(name, value);
        }
    }

    builder
        .header(header::CACHE_CONTROL, NO_STORE)
        .body(Body::from_stream(upstream.bytes_stream()))
        .unwrap()
}

fn relay_status(status: reqwest::StatusCode) -> StatusCode {
    StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY)
}

fn upstream_failed(path: &str, err: reqwest::Error) -> Response<Body> {
    error!(path, %err, "Upstream request failed");
    error_response(
        StatusCode::BAD_GATEWAY,
        &format!("upstream request failed: {err}"),
    )
}
