//! HTTP transport capability used by the authentication flow
//!
//! The flow only needs a handful of HTTP features: GET/POST with query
//! parameters, custom headers, form-encoded bodies and per-request control
//! over redirect following. [`HttpTransport`] captures exactly that, so the
//! protocol logic can run over [`ReqwestTransport`] in production and over a
//! scripted transport in tests.

pub mod http;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

use crate::error::{AuthError, Result};

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET request
    Get,
    /// POST request
    Post,
}

/// Request handed to an [`HttpTransport`]
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,
    /// Target URL without the query string
    pub url: String,
    /// Query parameters, appended in order
    pub query: Vec<(String, String)>,
    /// Request headers
    pub headers: Vec<(String, String)>,
    /// Form-encoded body, if any
    pub form: Option<Vec<(String, String)>>,
    /// Whether the transport should follow 3xx responses
    pub follow_redirects: bool,
}

impl HttpRequest {
    fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            form: None,
            follow_redirects: true,
        }
    }

    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    /// Create a POST request
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    /// Append a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set a form-encoded body
    #[must_use]
    pub fn form<K, V>(mut self, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.form = Some(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Return 3xx responses as-is instead of following them
    #[must_use]
    pub fn no_redirects(mut self) -> Self {
        self.follow_redirects = false;
        self
    }

    /// Look up a query parameter by name
    #[must_use]
    pub fn query_param(&self, key: &str) -> Option<&str> {
        find_pair(&self.query, key)
    }

    /// Look up a form field by name
    #[must_use]
    pub fn form_field(&self, key: &str) -> Option<&str> {
        self.form.as_deref().and_then(|form| find_pair(form, key))
    }

    /// Look up a header by name (case-insensitive)
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

fn find_pair<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Response returned by an [`HttpTransport`]
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Final URL of the request
    pub url: String,
    /// Status code
    pub status: u16,
    /// Headers keyed by lower-cased name
    pub headers: HashMap<String, String>,
    /// Body decoded as text
    pub body: String,
}

impl HttpResponse {
    /// Create a response with no headers
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// Add a header (name is lower-cased)
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Look up a header by name (case-insensitive)
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Body as text
    #[must_use]
    pub fn text(&self) -> &str {
        &self.body
    }

    /// Decode the body as JSON
    ///
    /// # Errors
    /// Returns `AuthError::InvalidResponse` if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| {
            AuthError::invalid_response(format!("Unable to decode JSON from {}: {e}", self.url))
        })
    }

    /// Whether the status is 2xx
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into an error
    ///
    /// # Errors
    /// Returns `AuthError::Status` if the status is not 2xx.
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(AuthError::status(self.status, self.url))
        }
    }
}

/// HTTP capability the authentication flow runs over
///
/// Implementations must not treat non-2xx statuses as errors; the flow
/// decides per step which statuses are acceptable.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send a request and return the response
    ///
    /// # Errors
    /// Returns an error if the request could not be completed.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

pub use http::ReqwestTransport;


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = HttpRequest::post("https://example.com/token")
            .query("tab_id", "t1")
            .header("User-Agent", "ua")
            .form([("grant_type", "refresh_token")])
            .no_redirects();

        assert_eq!(request.method, Method::Post);
        assert!(!request.follow_redirects);
        assert_eq!(request.query_param("tab_id"), Some("t1"));
        assert_eq!(request.header_value("user-agent"), Some("ua"));
        assert_eq!(request.form_field("grant_type"), Some("refresh_token"));
        assert_eq!(request.form_field("missing"), None);
    }

    #[test]
    fn test_response_headers_case_insensitive() {
        let response = HttpResponse::new("https://example.com", 302, "")
            .with_header("Location", "hubspace-app://loginredirect?code=x");
        assert_eq!(
            response.header("location"),
            Some("hubspace-app://loginredirect?code=x")
        );
        assert_eq!(response.header("LOCATION"), response.header("location"));
    }

    #[test]
    fn test_error_for_status() {
        assert!(
            HttpResponse::new("https://example.com", 204, "")
                .error_for_status()
                .is_ok()
        );
        let err = HttpResponse::new("https://example.com", 401, "")
            .error_for_status()
            .unwrap_err();
        assert!(matches!(err, AuthError::Status { status: 401, .. }));
    }

    #[test]
    fn test_json_invalid_body() {
        let response = HttpResponse::new("https://example.com", 200, "<html>");
        let err = response.json::<serde_json::Value>().unwrap_err();
        assert!(err.is_invalid_response());
    }
}
