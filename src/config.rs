//! HubSpace identity provider configuration
//!
//! The defaults reproduce the provider's fixed endpoints and client
//! identifiers exactly. Overriding them is only useful for test servers
//! or proxies sitting in front of the real provider.

use std::time::Duration;
use typed_builder::TypedBuilder;

/// Origin of the HubSpace identity provider
pub const DEFAULT_ORIGIN: &str = "https://accounts.hubspaceconnect.com";
/// Host header sent to the token endpoint
pub const DEFAULT_HOST: &str = "accounts.hubspaceconnect.com";
/// OpenID authorization endpoint path
pub const AUTH_PATH: &str = "/auth/realms/thd/protocol/openid-connect/auth";
/// Login form action endpoint path
pub const LOGIN_PATH: &str = "/auth/realms/thd/login-actions/authenticate";
/// Token endpoint path
pub const TOKEN_PATH: &str = "/auth/realms/thd/protocol/openid-connect/token";
/// OAuth client id registered for the Android app
pub const DEFAULT_CLIENT_ID: &str = "hubspace_android";
/// Redirect URI registered for the Android app
pub const DEFAULT_REDIRECT_URI: &str = "hubspace-app://loginredirect";
/// User agent the provider expects from the app
pub const DEFAULT_USER_AGENT: &str = "Dart/3.1 (dart:io)";
/// Scope requested during the initial authorization
pub const LOGIN_SCOPE: &str = "openid offline_access";
/// Scope requested when refreshing
pub const REFRESH_SCOPE: &str = "openid email offline_access profile";
/// Lifetime assigned to a freshly issued bearer token, in seconds.
///
/// Shorter than the provider's real lifetime so the token is refreshed
/// before the server expires it.
pub const TOKEN_TIMEOUT_SECS: u64 = 118;

/// Endpoints and client identity used by the authentication flow
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
#[builder(
    builder_method(doc = "Create a new builder for HubSpaceConfig"),
    builder_type(doc = "Builder for HubSpaceConfig", vis = "pub"),
    build_method(doc = "Build the HubSpaceConfig")
)]
pub struct HubSpaceConfig {
    /// OpenID authorization endpoint serving the login page
    #[builder(default = format!("{DEFAULT_ORIGIN}{AUTH_PATH}"), setter(into))]
    pub auth_url: String,

    /// Endpoint the login form posts credentials to
    #[builder(default = format!("{DEFAULT_ORIGIN}{LOGIN_PATH}"), setter(into))]
    pub login_url: String,

    /// Token endpoint for code and refresh grants
    #[builder(default = format!("{DEFAULT_ORIGIN}{TOKEN_PATH}"), setter(into))]
    pub token_url: String,

    /// Value of the `host` header sent to the token endpoint
    #[builder(default = DEFAULT_HOST.to_string(), setter(into))]
    pub host: String,

    /// OAuth client id
    #[builder(default = DEFAULT_CLIENT_ID.to_string(), setter(into))]
    pub client_id: String,

    /// Redirect URI carrying the authorization code
    #[builder(default = DEFAULT_REDIRECT_URI.to_string(), setter(into))]
    pub redirect_uri: String,

    /// User agent sent with login and token requests
    #[builder(default = DEFAULT_USER_AGENT.to_string(), setter(into))]
    pub user_agent: String,

    /// Lifetime assigned to each bearer token
    #[builder(default = Duration::from_secs(TOKEN_TIMEOUT_SECS))]
    pub token_ttl: Duration,
}

impl Default for HubSpaceConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl HubSpaceConfig {
    /// Point every endpoint at `base` while keeping the provider's paths.
    ///
    /// The `host` header follows the new origin (including a non-default port).
    #[must_use]
    pub fn with_base_url(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        let host = url::Url::parse(base)
            .ok()
            .and_then(|parsed| {
                parsed.host_str().map(|host| match parsed.port() {
                    Some(port) => format!("{host}:{port}"),
                    None => host.to_string(),
                })
            })
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        Self::builder()
            .auth_url(format!("{base}{AUTH_PATH}"))
            .login_url(format!("{base}{LOGIN_PATH}"))
            .token_url(format!("{base}{TOKEN_PATH}"))
            .host(host)
            .build()
    }
}
