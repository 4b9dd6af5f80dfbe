//! reqwest-backed [`HttpTransport`]

use async_trait::async_trait;
use std::time::Duration;

use super::{HttpRequest, HttpResponse, HttpTransport, Method};
use crate::error::Result;

/// Transport over `reqwest`
///
/// reqwest fixes the redirect policy per client, so two clients are kept:
/// one following redirects and one returning 3xx responses untouched.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    no_redirect_client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with reqwest's default settings
    ///
    /// # Errors
    /// Returns an error if the underlying clients cannot be built.
    pub fn new() -> Result<Self> {
        Self::build(None)
    }

    /// Create a transport that aborts requests after `timeout`
    ///
    /// # Errors
    /// Returns an error if the underlying clients cannot be built.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Self::build(Some(timeout))
    }

    fn build(timeout: Option<Duration>) -> Result<Self> {
        let configure = |builder: reqwest::ClientBuilder| match timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        };

        Ok(Self {
            client: configure(reqwest::Client::builder()).build()?,
            no_redirect_client: configure(
                reqwest::Client::builder().redirect(reqwest::redirect::Policy::none()),
            )
            .build()?,
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let client = if request.follow_redirects {
            &self.client
        } else {
            &self.no_redirect_client
        };
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };

        let mut builder = client.request(method, &request.url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(form) = &request.form {
            builder = builder.form(form);
        }

        let response = builder.send().await?;

        let url = response.url().to_string();
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_ascii_lowercase(), value.to_string()))
            })
            .collect();
        let body = response.text().await?;

        tracing::trace!(%url, status, "HTTP response received");

        Ok(HttpResponse {
            url,
            status,
            headers,
            body,
        })
    }
}
