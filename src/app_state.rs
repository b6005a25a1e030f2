use std::sync::Arc;

/// Shared handles for request handlers. No mutable state lives here: every
/// invocation is independent, the provider owns all job state.
#[derive(Clone)]
pub struct AppState {
    pub client: reqwest::Client,
    upstream_base_url: Arc<str>,
}

impl AppState {
    pub fn new(upstream_base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            upstream_base_url: upstream_base_url.trim_end_matches('/').into(),
        }
    }

    /// Join the fixed upstream origin with an already-encoded path.
    pub fn upstream_url(&self, path: &str) -> String {
        format!("{}{path}", self.upstream_base_url)
    }
}
