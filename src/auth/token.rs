//! Token endpoint exchanges and the cached bearer token

use serde::Deserialize;
use std::time::{Duration, SystemTime};

use super::pkce::PkceChallenge;
use crate::config::{HubSpaceConfig, REFRESH_SCOPE};
use crate::error::{AuthError, Result};
use crate::transport::{HttpRequest, HttpTransport};
use crate::utils::redact;

/// Bearer token with the moment it stops being used
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    /// Value for the `Authorization: Bearer` header
    pub bearer_token: String,
    /// When the token must be regenerated
    pub expires_at: SystemTime,
}

impl Token {
    /// Create a token that expires `ttl` from now
    #[must_use]
    pub fn new(bearer_token: impl Into<String>, ttl: Duration) -> Self {
        Self {
            bearer_token: bearer_token.into(),
            expires_at: SystemTime::now() + ttl,
        }
    }

    /// Whether the expiration is at or before the current time
    #[must_use]
    pub fn is_expired(&self) -> bool {
        SystemTime::now() >= self.expires_at
    }

    /// Get the Authorization header value
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.bearer_token)
    }

    /// Remaining validity, or `None` once expired
    #[must_use]
    pub fn remaining_validity(&self) -> Option<Duration> {
        self.expires_at
            .duration_since(SystemTime::now())
            .ok()
            .filter(|remaining| !remaining.is_zero())
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("bearer_token", &redact(&self.bearer_token))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Fields of the token endpoint response this client reads
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
}

fn token_request(config: &HubSpaceConfig) -> HttpRequest {
    HttpRequest::post(&config.token_url)
        .header("Content-Type", "application/x-www-form-urlencoded")
        .header("user-agent", &config.user_agent)
        .header("host", &config.host)
}

async fn post_token_request<T>(transport: &T, request: HttpRequest) -> Result<TokenResponse>
where
    T: HttpTransport + ?Sized,
{
    tracing::trace!(
        url = %request.url,
        grant_type = ?request.form_field("grant_type"),
        "Token request"
    );
    let response = transport.send(request).await?;
    tracing::trace!(status = response.status, "Token response");
    response.error_for_status()?.json()
}

/// Exchange an authorization code for a refresh token
///
/// # Errors
/// Returns `AuthError::Status` on a non-success response and
/// `AuthError::InvalidResponse` if the response has no `refresh_token`.
pub async fn exchange_code<T>(
    transport: &T,
    config: &HubSpaceConfig,
    code: &str,
    challenge: &PkceChallenge,
) -> Result<String>
where
    T: HttpTransport + ?Sized,
{
    tracing::trace!("Generating refresh token");
    let request = token_request(config).form([
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", config.redirect_uri.as_str()),
        ("code_verifier", challenge.verifier.as_str()),
        ("client_id", config.client_id.as_str()),
    ]);

    let refresh_token = post_token_request(transport, request)
        .await?
        .refresh_token
        .ok_or_else(|| AuthError::invalid_response("Unable to extract refresh token"))?;

    tracing::trace!(refresh_token = %redact(&refresh_token), "Received refresh token");
    Ok(refresh_token)
}

/// Exchange a refresh token for a bearer token valid for `config.token_ttl`
///
/// The provider's own expiry fields are ignored; the fixed lifetime keeps the
/// refresh cadence predictable.
///
/// # Errors
/// Returns `AuthError::Status` on a non-success response and
/// `AuthError::InvalidResponse` if the response has no `id_token`.
pub async fn exchange_refresh_token<T>(
    transport: &T,
    config: &HubSpaceConfig,
    refresh_token: &str,
) -> Result<Token>
where
    T: HttpTransport + ?Sized,
{
    tracing::trace!("Generating token");
    let request = token_request(config).form([
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
        ("scope", REFRESH_SCOPE),
        ("client_id", config.client_id.as_str()),
    ]);

    let id_token = post_token_request(transport, request)
        .await?
        .id_token
        .ok_or_else(|| AuthError::invalid_response("Unable to extract the token"))?;

    let token = Token::new(id_token, config.token_ttl);
    tracing::trace!(token = ?token, "Received bearer token");
    Ok(token)
}
