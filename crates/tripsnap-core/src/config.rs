//! Client configuration model.
//!
//! Loading (file + environment) lives in `tripsnap-infrastructure`; this is
//! only the shape and its defaults.

use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_CSRF_COOKIE: &str = "csrftoken";
pub const DEFAULT_CSRF_HEADER: &str = "X-CSRFToken";
pub const DEFAULT_OAUTH_PROVIDER: &str = "kakao";
pub const DEFAULT_OAUTH_RETURN_PATH: &str = "/oauth/callback";
pub const DEFAULT_BAKERY_CACHE_CAPACITY: usize = 128;

/// Root of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Origin every request path is resolved against.
    pub base_url: String,
    pub csrf_cookie_name: String,
    pub csrf_header_name: String,
    /// Token used when the cookie jar has none (the SPA read it from a meta tag).
    pub csrf_fallback_token: Option<String>,
    pub oauth_provider: String,
    /// Where the backend sends the browser after the OAuth callback.
    pub oauth_return_path: String,
    /// Upper bound of the bakery detail cache.
    pub bakery_cache_capacity: usize,
    /// Operator allowed to trigger the keyword rebuild.
    pub admin_email: Option<String>,
    /// Unset means no client-side timeout.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            csrf_cookie_name: DEFAULT_CSRF_COOKIE.to_string(),
            csrf_header_name: DEFAULT_CSRF_HEADER.to_string(),
            csrf_fallback_token: None,
            oauth_provider: DEFAULT_OAUTH_PROVIDER.to_string(),
            oauth_return_path: DEFAULT_OAUTH_RETURN_PATH.to_string(),
            bakery_cache_capacity: DEFAULT_BAKERY_CACHE_CAPACITY,
            admin_email: None,
            request_timeout_secs: None,
        }
    }
}

impl ClientConfig {
    /// Base URL without a trailing slash.
    pub fn origin(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Cache capacity, never below one entry.
    pub fn effective_cache_capacity(&self) -> usize {
        self.bakery_cache_capacity.max(1)
    }
}
