//! Transport seam between the stores and the REST backend.
//!
//! The stores only ever see [`ApiTransport`]; the reqwest implementation
//! lives in `tripsnap-infrastructure`, tests plug in scripted transports.

use crate::error::{Result, TripsnapError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use strum::{AsRefStr, Display};

/// HTTP verbs used against the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Verbs that change server state and therefore need the anti-forgery header.
    pub fn is_mutating(self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch | Self::Delete)
    }
}

/// One part of a multipart form body.
#[derive(Debug, Clone, PartialEq)]
pub enum MultipartPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        mime: String,
        bytes: Vec<u8>,
    },
}

/// Request body variants.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    /// Multipart bodies keep the transport's own content type (with boundary).
    Multipart(Vec<MultipartPart>),
}

impl RequestBody {
    pub fn is_multipart(&self) -> bool {
        matches!(self, Self::Multipart(_))
    }
}

/// A request relative to the configured base origin.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path beginning with `/`, or an absolute URL.
    pub path: String,
    pub query: Vec<(String, String)>,
    /// Caller-supplied headers; these take precedence over defaults.
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Sets a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    /// Sets a multipart body.
    pub fn multipart(mut self, parts: Vec<MultipartPart>) -> Self {
        self.body = RequestBody::Multipart(parts);
        self
    }

    /// Appends a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Adds a header. Header names compare case-insensitively downstream.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Whether the caller already supplied `name` (case-insensitive).
    pub fn has_header(&self, name: &str) -> bool {
        self.headers
            .iter()
            .any(|(existing, _)| existing.eq_ignore_ascii_case(name))
    }
}

/// Raw response: status plus the body parsed as JSON.
///
/// `body` is `None` when the response was empty or not valid JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl ApiResponse {
    pub fn new(status: u16, body: Option<Value>) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 401 or 403.
    pub fn is_auth_denied(&self) -> bool {
        matches!(self.status, 401 | 403)
    }

    /// Looks up a top-level field of the JSON body.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.body.as_ref().and_then(|body| body.get(name))
    }

    /// Human-readable error message for a failed response.
    ///
    /// Uses the first string among `error`, `detail`, `message`; otherwise
    /// `"(status) request failed"`.
    pub fn error_message(&self) -> String {
        ["error", "detail", "message"]
            .iter()
            .find_map(|key| self.field(key).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| format!("({}) request failed", self.status))
    }

    /// Converts a non-2xx response into an error, keeping 2xx responses.
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        let message = self.error_message();
        Err(TripsnapError::api(self.status, message))
    }

    /// Deserializes the body (a missing body is treated as JSON `null`).
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T> {
        let body = self.body.unwrap_or(Value::Null);
        Ok(serde_json::from_value(body)?)
    }

    /// First validation message of a form-style error body.
    ///
    /// Registration endpoints answer `{"email": ["..."], "non_field_errors": ["..."]}`;
    /// `non_field_errors` wins, then the first field carrying a message, then
    /// the generic [`error_message`](Self::error_message) rule.
    pub fn first_validation_error(&self) -> String {
        let Some(Value::Object(map)) = &self.body else {
            return self.error_message();
        };

        fn first_text(value: &Value) -> Option<String> {
            match value {
                Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
                Value::Array(items) => items.iter().find_map(first_text),
                _ => None,
            }
        }

        if let Some(message) = map.get("non_field_errors").and_then(first_text) {
            return message;
        }
        for key in ["error", "detail", "message"] {
            if let Some(message) = map.get(key).and_then(first_text) {
                return message;
            }
        }
        map.values()
            .find_map(first_text)
            .unwrap_or_else(|| self.error_message())
    }
}

/// The `request` half of the HTTP wrapper.
///
/// Implementations resolve the path against the base origin, send
/// credentials, attach the anti-forgery header on mutating verbs and parse
/// the body leniently. Transport failures surface as
/// [`TripsnapError::Network`]; any HTTP status is returned as a response.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    async fn request(&self, request: ApiRequest) -> Result<ApiResponse>;

    /// Makes sure an anti-forgery token is available before mutating calls.
    ///
    /// Transports without a cookie jar have nothing to do.
    async fn prime_csrf(&self) -> Result<()> {
        Ok(())
    }
}

/// The `requestJson` half of the HTTP wrapper.
///
/// Every non-2xx status becomes [`TripsnapError::Api`] with the body's message.
pub async fn request_json<T: DeserializeOwned>(
    transport: &dyn ApiTransport,
    request: ApiRequest,
) -> Result<T> {
    transport.request(request).await?.error_for_status()?.into_json()
}

/// Like [`request_json`], but 401/403 map to [`TripsnapError::Unauthorized`]
/// so callers can treat them as "nobody is logged in" instead of a failure.
pub async fn request_json_or_absent<T: DeserializeOwned>(
    transport: &dyn ApiTransport,
    request: ApiRequest,
) -> Result<T> {
    let response = transport.request(request).await?;
    if response.is_auth_denied() {
        return Err(TripsnapError::Unauthorized {
            status: response.status,
        });
    }
    response.error_for_status()?.into_json()
}
