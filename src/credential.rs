use axum::http::{HeaderMap, header};

/// Custom header carrying the raw provider key, checked before `Authorization`.
pub const API_KEY_HEADER: &str = "x-openai-api-key";

const BEARER_PREFIX: &str = "bearer ";

/// Pull the caller's API key out of the inbound headers.
///
/// Precedence: `X-OpenAI-Api-Key` (raw key, trimmed), then
/// `Authorization: Bearer <token>` with a case-insensitive scheme. The key is
/// held only for the duration of one proxied call and is never logged.
pub fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()) {
        let key = value.trim();
        if !key.is_empty() {
            return Some(key.to_string());
        }
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_bearer_token)
}

fn parse_bearer_token(value: &str) -> Option<String> {
    let value = value.trim();
    let scheme = value.get(..BEARER_PREFIX.len())?;
    if !scheme.eq_ignore_ascii_case(BEARER_PREFIX) {
        return None;
    }

    let token = value[BEARER_PREFIX.len()..].trim();
    (!token.is_empty()).then(|| token.to_string())
}
