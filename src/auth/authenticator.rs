//! Cached, lock-guarded access to a HubSpace bearer token

use std::sync::Arc;
use tokio::sync::Mutex;

use super::login::{start_web_login, submit_credentials};
use super::pkce::PkceChallenge;
use super::token::{Token, exchange_code, exchange_refresh_token};
use crate::config::HubSpaceConfig;
use crate::error::Result;
use crate::html::{HtmlParser, ScraperHtmlParser};
use crate::transport::HttpTransport;

/// Credential state guarded by the authenticator's lock
#[derive(Debug, Default)]
struct AuthState {
    refresh_token: Option<String>,
    token: Option<Token>,
}

/// Builder for [`Authenticator`]
pub struct AuthenticatorBuilder {
    username: String,
    password: String,
    config: Option<HubSpaceConfig>,
    html_parser: Option<Arc<dyn HtmlParser>>,
    refresh_token: Option<String>,
}

impl AuthenticatorBuilder {
    /// Create a new builder
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            config: None,
            html_parser: None,
            refresh_token: None,
        }
    }

    /// Set custom endpoint configuration
    #[must_use]
    pub fn config(mut self, config: HubSpaceConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the HTML parser used on the login page
    #[must_use]
    pub fn html_parser(mut self, parser: Arc<dyn HtmlParser>) -> Self {
        self.html_parser = Some(parser);
        self
    }

    /// Seed a refresh token persisted from an earlier session
    #[must_use]
    pub fn refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Build the authenticator
    #[must_use]
    pub fn build(self) -> Authenticator {
        Authenticator {
            username: self.username,
            password: self.password,
            config: self.config.unwrap_or_default(),
            html_parser: self
                .html_parser
                .unwrap_or_else(|| Arc::new(ScraperHtmlParser)),
            state: Mutex::new(AuthState {
                refresh_token: self.refresh_token,
                token: None,
            }),
        }
    }
}

impl std::fmt::Debug for AuthenticatorBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatorBuilder")
            .field("username", &self.username)
            .field("config", &self.config)
            .field("refresh_token", &self.refresh_token.is_some())
            .finish_non_exhaustive()
    }
}

/// Authentication against the HubSpace API
///
/// Logs in once through the provider's login page to obtain a refresh token,
/// then hands out bearer tokens regenerated from it whenever the cached one
/// expires. The whole check-and-refresh sequence runs under one lock, so
/// concurrent callers share a single in-flight exchange.
pub struct Authenticator {
    username: String,
    password: String,
    config: HubSpaceConfig,
    html_parser: Arc<dyn HtmlParser>,
    state: Mutex<AuthState>,
}

impl Authenticator {
    /// Create an authenticator with the default HubSpace configuration
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        AuthenticatorBuilder::new(username, password).build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder(
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> AuthenticatorBuilder {
        AuthenticatorBuilder::new(username, password)
    }

    /// Get the endpoint configuration
    #[must_use]
    pub fn config(&self) -> &HubSpaceConfig {
        &self.config
    }

    /// Get the username this authenticator logs in with
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Return a bearer token that is valid right now
    ///
    /// Runs the full login chain on first use, then only refreshes when the
    /// cached token has expired. Caches are only overwritten after the
    /// corresponding exchange succeeds.
    ///
    /// # Errors
    /// Returns `AuthError::InvalidAuth` if the credentials are rejected,
    /// `AuthError::InvalidResponse` if the provider answers with an
    /// unexpected shape, and transport or status errors unchanged.
    pub async fn get_token<T>(&self, transport: &T) -> Result<String>
    where
        T: HttpTransport + ?Sized,
    {
        let mut state = self.state.lock().await;

        let refresh_token = match state.refresh_token.clone() {
            Some(refresh_token) => refresh_token,
            None => {
                let refresh_token = self.perform_initial_login(transport).await?;
                state.refresh_token = Some(refresh_token.clone());
                refresh_token
            }
        };

        let cached = state.token.clone().filter(|token| !token.is_expired());
        let token = match cached {
            Some(token) => token,
            None => {
                tracing::debug!("Token has not been generated or is expired");
                let token = exchange_refresh_token(transport, &self.config, &refresh_token).await?;
                tracing::debug!("Token has been successfully generated");
                state.token = Some(token.clone());
                token
            }
        };

        Ok(token.bearer_token)
    }

    /// Run the full login chain and return a new refresh token
    ///
    /// The result is not cached; [`get_token`](Self::get_token) does that.
    ///
    /// # Errors
    /// Returns any error from the login page, credential submission or code
    /// exchange steps.
    pub async fn perform_initial_login<T>(&self, transport: &T) -> Result<String>
    where
        T: HttpTransport + ?Sized,
    {
        tracing::debug!("Refresh token not present. Generating a new refresh token");
        let challenge = PkceChallenge::generate();
        let session =
            start_web_login(transport, &self.config, self.html_parser.as_ref(), &challenge).await?;
        let code = submit_credentials(
            transport,
            &self.config,
            &session,
            &self.username,
            &self.password,
        )
        .await?;
        tracing::debug!("Successfully generated an auth code");

        let refresh_token = exchange_code(transport, &self.config, &code, &challenge).await?;
        tracing::debug!("Successfully generated a refresh token");
        Ok(refresh_token)
    }

    /// Whether no token is cached or the cached one has expired
    pub async fn is_expired(&self) -> bool {
        self.state
            .lock()
            .await
            .token
            .as_ref()
            .is_none_or(Token::is_expired)
    }

    /// Current refresh token, for callers that persist it between runs
    pub async fn refresh_token(&self) -> Option<String> {
        self.state.lock().await.refresh_token.clone()
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("username", &self.username)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthError;
    use crate::html::HtmlElement;
    use crate::transport::HttpResponse;
    use crate::transport::mock::MockTransport;
    use std::collections::HashMap;
    use std::time::Duration;

    const LOGIN_PAGE: &str = r#"<html><body><form id="kc-form-login" action="/authenticate?session_code=s&amp;execution=e&amp;tab_id=t"></form></body></html>"#;

    fn login_responses(config: &HubSpaceConfig) -> Vec<HttpResponse> {
        vec![
            HttpResponse::new(&config.auth_url, 200, LOGIN_PAGE),
            HttpResponse::new(&config.login_url, 302, "")
                .with_header("location", "hubspace-app://loginredirect?code=ABC123"),
            HttpResponse::new(&config.token_url, 200, r#"{"refresh_token":"refresh-1"}"#),
        ]
    }

    fn id_token(config: &HubSpaceConfig, token: &str) -> HttpResponse {
        HttpResponse::new(&config.token_url, 200, format!(r#"{{"id_token":"{token}"}}"#))
    }

    #[tokio::test]
    async fn test_first_call_runs_full_chain_once() {
        let auth = Authenticator::new("user", "pass");
        let config = auth.config().clone();
        let transport = MockTransport::new(login_responses(&config));
        transport.push(id_token(&config, "tok-1"));

        assert!(auth.is_expired().await);
        assert_eq!(auth.get_token(&transport).await.unwrap(), "tok-1");
        assert_eq!(auth.get_token(&transport).await.unwrap(), "tok-1");

        assert_eq!(transport.requests().len(), 4);
        assert!(!auth.is_expired().await);
        assert_eq!(auth.refresh_token().await.as_deref(), Some("refresh-1"));
    }

    #[tokio::test]
    async fn test_expired_token_only_refreshes() {
        let config = HubSpaceConfig::builder().token_ttl(Duration::ZERO).build();
        let auth = Authenticator::builder("user", "pass")
            .config(config.clone())
            .build();
        let transport = MockTransport::new(login_responses(&config));
        transport.push(id_token(&config, "tok-1"));
        transport.push(id_token(&config, "tok-2"));

        assert_eq!(auth.get_token(&transport).await.unwrap(), "tok-1");
        assert_eq!(auth.get_token(&transport).await.unwrap(), "tok-2");

        let requests = transport.requests();
        assert_eq!(requests.len(), 5);
        assert_eq!(requests[4].form_field("grant_type"), Some("refresh_token"));
        assert_eq!(requests[4].form_field("refresh_token"), Some("refresh-1"));
    }

    #[tokio::test]
    async fn test_seeded_refresh_token_skips_login() {
        let auth = Authenticator::builder("user", "pass")
            .refresh_token("persisted")
            .build();
        let transport = MockTransport::new([id_token(auth.config(), "tok")]);

        assert_eq!(auth.get_token(&transport).await.unwrap(), "tok");
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].form_field("refresh_token"), Some("persisted"));
    }

    #[tokio::test]
    async fn test_bad_credentials_leave_state_untouched() {
        let auth = Authenticator::new("user", "wrong");
        let config = auth.config().clone();
        let transport = MockTransport::new([
            HttpResponse::new(&config.auth_url, 200, LOGIN_PAGE),
            HttpResponse::new(&config.login_url, 302, "")
                .with_header("location", "https://accounts.hubspaceconnect.com/login"),
        ]);

        let err = auth.get_token(&transport).await.unwrap_err();
        assert!(err.is_invalid_auth());
        assert!(auth.refresh_token().await.is_none());
        assert!(auth.is_expired().await);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_refresh_token_and_retries() {
        let auth = Authenticator::new("user", "pass");
        let config = auth.config().clone();
        let transport = MockTransport::new(login_responses(&config));
        transport.push(HttpResponse::new(&config.token_url, 503, ""));
        transport.push(id_token(&config, "tok-1"));

        let err = auth.get_token(&transport).await.unwrap_err();
        assert!(matches!(err, AuthError::Status { status: 503, .. }));
        assert_eq!(auth.refresh_token().await.as_deref(), Some("refresh-1"));

        // Retry skips the login chain
        assert_eq!(auth.get_token(&transport).await.unwrap(), "tok-1");
        assert_eq!(transport.requests().len(), 5);
    }

    struct FixedParser;

    impl HtmlParser for FixedParser {
        fn find_by_id(&self, _page: &str, _id: &str) -> Option<HtmlElement> {
            Some(HtmlElement {
                name: "form".to_string(),
                attributes: HashMap::from([(
                    "action".to_string(),
                    "/x?session_code=S&execution=E&tab_id=T".to_string(),
                )]),
            })
        }
    }

    #[tokio::test]
    async fn test_custom_html_parser() {
        let auth = Authenticator::builder("user", "pass")
            .html_parser(Arc::new(FixedParser))
            .build();
        let config = auth.config().clone();
        let transport = MockTransport::new([
            HttpResponse::new(&config.auth_url, 200, "not html at all"),
            HttpResponse::new(&config.login_url, 302, "")
                .with_header("location", "hubspace-app://loginredirect?code=C"),
            HttpResponse::new(&config.token_url, 200, r#"{"refresh_token":"r"}"#),
        ]);

        assert_eq!(auth.perform_initial_login(&transport).await.unwrap(), "r");
        let requests = transport.requests();
        assert_eq!(requests[1].query_param("session_code"), Some("S"));
        // Not cached by perform_initial_login
        assert!(auth.refresh_token().await.is_none());
    }

    #[test]
    fn test_debug_hides_password() {
        let auth = Authenticator::new("user@example.com", "hunter2");
        let debug = format!("{auth:?}");
        assert!(debug.contains("user@example.com"));
        assert!(!debug.contains("hunter2"));

        let builder = Authenticator::builder("user", "hunter2");
        assert!(!format!("{builder:?}").contains("hunter2"));
    }
}
