use axum::body::Body;
use axum::http::{Response, StatusCode, header};
use serde_json::{Value, json};

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
pub const NO_STORE: &str = "no-store";

/// Serialize `value` with the JSON content type and `cache-control: no-store`.
pub fn json_response(status: StatusCode, value: &Value) -> Response<Body> {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, JSON_CONTENT_TYPE)
        .header(header::CACHE_CONTROL, NO_STORE)
        .body(Body::from(value.to_string()))
        .unwrap()
}

/// Caller-facing error envelope: `{"error":{"message":...}}`.
pub fn error_response(status: StatusCode, message: &str) -> Response<Body> {
    json_response(status, &json!({ "error": { "message": message } }))
}

/// 405 with an `Allow` header naming the route's declared method set.
pub fn method_not_allowed(allowed: &[&str]) -> Response<Body> {
    let body = json!({
        "error": {
            "message": "Method Not Allowed",
            "allowed": allowed,
        }
    });

    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header(header::ALLOW, allowed.join(", "))
        .header(header::CONTENT_TYPE, JSON_CONTENT_TYPE)
        .header(header::CACHE_CONTROL, NO_STORE)
        .body(Body::from(body.to_string()))
        .unwrap()
}
