//! Headless login against the provider's HTML login page
//!
//! Two exchanges: fetch the login page to scrape the session correlation
//! fields out of the form's action URL, then post the credentials to that
//! session and capture the authorization code from the redirect.

use super::pkce::PkceChallenge;
use crate::config::{HubSpaceConfig, LOGIN_SCOPE};
use crate::error::{AuthError, Result};
use crate::html::HtmlParser;
use crate::transport::{HttpRequest, HttpTransport};
use crate::utils::{query_value, redact};

/// DOM id of the provider's login form
pub const LOGIN_FORM_ID: &str = "kc-form-login";

/// Status the login action answers with when it issues a code
const REDIRECT_STATUS: u16 = 302;

/// Session correlation fields embedded in the login form's action URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSessionData {
    /// `session_code` query parameter
    pub session_code: String,
    /// `execution` query parameter
    pub execution: String,
    /// `tab_id` query parameter
    pub tab_id: String,
}

/// Extract the session correlation fields from a login page
///
/// # Errors
/// Returns `AuthError::InvalidResponse` if the form, its `action` attribute
/// or any of the three fields is missing.
pub fn extract_login_data(parser: &dyn HtmlParser, page: &str) -> Result<LoginSessionData> {
    let form = parser
        .find_by_id(page, LOGIN_FORM_ID)
        .ok_or_else(|| AuthError::invalid_response("Unable to parse login page"))?;
    let action = form
        .attr("action")
        .ok_or_else(|| AuthError::invalid_response("Unable to extract login url"))?;

    let field = |key: &str| {
        query_value(action, key).ok_or_else(|| {
            AuthError::invalid_response(format!("Unable to parse login url: missing {key}"))
        })
    };

    Ok(LoginSessionData {
        session_code: field("session_code")?,
        execution: field("execution")?,
        tab_id: field("tab_id")?,
    })
}

/// Request the login page for `challenge` and scrape its session fields
///
/// # Errors
/// Returns `AuthError::Status` on a non-success response and
/// `AuthError::InvalidResponse` if the page does not contain the login form.
pub async fn start_web_login<T>(
    transport: &T,
    config: &HubSpaceConfig,
    parser: &dyn HtmlParser,
    challenge: &PkceChallenge,
) -> Result<LoginSessionData>
where
    T: HttpTransport + ?Sized,
{
    let request = HttpRequest::get(&config.auth_url)
        .query("response_type", "code")
        .query("client_id", &config.client_id)
        .query("redirect_uri", &config.redirect_uri)
        .query("code_challenge", &challenge.challenge)
        .query("code_challenge_method", "S256")
        .query("scope", LOGIN_SCOPE);

    tracing::trace!(url = %config.auth_url, params = ?request.query, "Requesting login page");
    let response = transport.send(request).await?;
    tracing::trace!(status = response.status, "Login page response");
    let response = response.error_for_status()?;

    let login_data = extract_login_data(parser, response.text())?;
    tracing::trace!(
        session_code = %redact(&login_data.session_code),
        execution = %login_data.execution,
        tab_id = %login_data.tab_id,
        "WebApp login"
    );
    Ok(login_data)
}

/// Submit credentials to the login session and return the authorization code
///
/// # Errors
/// Returns `AuthError::InvalidResponse` if the provider does not answer with
/// a redirect, and `AuthError::InvalidAuth` if the redirect carries no code
/// (the provider's way of rejecting the credentials).
pub async fn submit_credentials<T>(
    transport: &T,
    config: &HubSpaceConfig,
    session: &LoginSessionData,
    username: &str,
    password: &str,
) -> Result<String>
where
    T: HttpTransport + ?Sized,
{
    tracing::trace!("Generating code");
    let request = HttpRequest::post(&config.login_url)
        .query("session_code", &session.session_code)
        .query("execution", &session.execution)
        .query("client_id", &config.client_id)
        .query("tab_id", &session.tab_id)
        .header("Content-Type", "application/x-www-form-urlencoded")
        .header("user-agent", &config.user_agent)
        .form([
            ("username", username),
            ("password", password),
            ("credentialId", ""),
        ])
        .no_redirects();

    tracing::trace!(url = %config.login_url, %username, "Submitting credentials");
    let response = transport.send(request).await?;
    tracing::trace!(status = response.status, "Login action response");

    if response.status != REDIRECT_STATUS {
        return Err(AuthError::invalid_response(format!(
            "Unable to process the result from {}: {}",
            response.url, response.status
        )));
    }

    let location = response.header("location").unwrap_or_default();
    // The query carries the code; only the redirect target is logged
    let target = location.split_once('?').map_or(location, |(head, _)| head);
    tracing::trace!(location = %target, "Login redirect");
    let code = query_value(location, "code").ok_or_else(|| {
        AuthError::invalid_auth("Unable to authenticate with the supplied username / password")
    })?;

    tracing::trace!(code = %redact(&code), "Received authorization code");
    Ok(code)
}
