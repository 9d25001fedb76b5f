//! HttpClient - reqwest implementation of [`ApiTransport`].
//!
//! Every request carries the session cookies held in the client's jar.
//! Mutating verbs get the Django anti-forgery header, read from the
//! `csrftoken` cookie or, failing that, from the configured fallback token.

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Url};
use std::sync::Arc;
use std::time::Duration;
use tripsnap_core::endpoints;
use tripsnap_core::{
    ApiRequest, ApiResponse, ApiTransport, ClientConfig, Method, MultipartPart, RequestBody,
    Result, TripsnapError,
};

const CONTENT_TYPE: &str = "Content-Type";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Cookie-aware HTTP transport for the tripsnap backend.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    jar: Arc<Jar>,
    origin: String,
    origin_url: Url,
    csrf_cookie_name: String,
    csrf_header_name: String,
    csrf_fallback_token: Option<String>,
}

impl HttpClient {
    /// Creates a client for the configured origin.
    ///
    /// No timeout is applied unless `request_timeout_secs` is set.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let origin = config.origin().to_string();
        let origin_url = Url::parse(&origin)
            .map_err(|e| TripsnapError::config(format!("Invalid base_url '{}': {}", origin, e)))?;

        let jar = Arc::new(Jar::default());
        let mut builder = Client::builder().cookie_provider(jar.clone());
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| TripsnapError::config(format!("Failed to build HTTP client: {}", e)))?;

        tracing::debug!("[HttpClient] Initialized for origin {}", origin);

        Ok(Self {
            client,
            jar,
            origin,
            origin_url,
            csrf_cookie_name: config.csrf_cookie_name.clone(),
            csrf_header_name: config.csrf_header_name.clone(),
            csrf_fallback_token: config.csrf_fallback_token.clone(),
        })
    }

    /// Resolves a request path against the origin; absolute URLs pass through.
    pub fn resolve_url(&self, path: &str) -> Result<Url> {
        resolve_url(&self.origin, path)
    }

    /// Current anti-forgery token: cookie first, configured fallback second.
    pub fn csrf_token(&self) -> Option<String> {
        self.jar
            .cookies(&self.origin_url)
            .and_then(|header| {
                header
                    .to_str()
                    .ok()
                    .and_then(|cookies| cookie_value(cookies, &self.csrf_cookie_name))
            })
            .or_else(|| self.csrf_fallback_token.clone())
    }

    fn build(&self, request: ApiRequest) -> Result<RequestBuilder> {
        let mut url = self.resolve_url(&request.path)?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }

        let headers = plan_headers(
            &request,
            &self.csrf_header_name,
            self.csrf_token().as_deref(),
        );

        let mut builder = self.client.request(to_reqwest_method(request.method), url);
        for (name, value) in headers {
            builder = builder.header(name, value);
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.body(serde_json::to_vec(&body)?),
            RequestBody::Multipart(parts) => builder.multipart(build_form(parts)?),
        };

        Ok(builder)
    }
}

#[async_trait]
impl ApiTransport for HttpClient {
    async fn request(&self, request: ApiRequest) -> Result<ApiResponse> {
        let method = request.method;
        let path = request.path.clone();
        let builder = self.build(request)?;

        let response = builder.send().await.map_err(|e| {
            tracing::warn!("[HttpClient] {} {} failed: {}", method, path, e);
            TripsnapError::network(e.to_string())
        })?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TripsnapError::network(format!("Failed to read response body: {}", e)))?;

        tracing::debug!("[HttpClient] {} {} -> {}", method, path, status);

        Ok(ApiResponse::new(status, parse_body(&bytes)))
    }

    async fn prime_csrf(&self) -> Result<()> {
        let response = self.request(ApiRequest::get(endpoints::CSRF)).await?;
        if !response.is_success() {
            tracing::warn!(
                "[HttpClient] CSRF cookie endpoint answered {}; mutating calls may be rejected",
                response.status
            );
        }
        Ok(())
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn resolve_url(origin: &str, path: &str) -> Result<Url> {
    let raw = if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else if path.starts_with('/') {
        format!("{}{}", origin, path)
    } else {
        format!("{}/{}", origin, path)
    };
    Url::parse(&raw).map_err(|e| TripsnapError::config(format!("Invalid URL '{}': {}", raw, e)))
}

/// Headers actually sent: caller headers, then the anti-forgery header on
/// mutating verbs and the JSON content type, each only if not already set.
fn plan_headers(
    request: &ApiRequest,
    csrf_header: &str,
    csrf_token: Option<&str>,
) -> Vec<(String, String)> {
    let mut headers = request.headers.clone();

    if request.method.is_mutating() && !request.has_header(csrf_header) {
        match csrf_token {
            Some(token) => headers.push((csrf_header.to_string(), token.to_string())),
            None => tracing::debug!(
                "[HttpClient] No CSRF token available for {} {}",
                request.method,
                request.path
            ),
        }
    }

    if !request.body.is_multipart() && !request.has_header(CONTENT_TYPE) {
        headers.push((CONTENT_TYPE.to_string(), JSON_CONTENT_TYPE.to_string()));
    }

    headers
}

/// Extracts `name` from a `Cookie` header value (`a=1; b=2`).
fn cookie_value(cookies: &str, name: &str) -> Option<String> {
    cookies.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name && !value.is_empty()).then(|| value.to_string())
    })
}

/// Empty or non-JSON bodies become `None`.
fn parse_body(bytes: &[u8]) -> Option<serde_json::Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    serde_json::from_slice(bytes).ok()
}

fn build_form(parts: Vec<MultipartPart>) -> Result<Form> {
    let mut form = Form::new();
    for part in parts {
        form = match part {
            MultipartPart::Text { name, value } => form.text(name, value),
            MultipartPart::File {
                name,
                file_name,
                mime,
                bytes,
            } => {
                let part = Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str(&mime)
                    .map_err(|e| TripsnapError::validation(format!("Invalid MIME type '{}': {}", mime, e)))?;
                form.part(name, part)
            }
        };
    }
    Ok(form)
}
