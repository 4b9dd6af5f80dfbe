//! HubSpace authentication flow
//!
//! Implements the Authorization Code flow with PKCE against the provider's
//! browser-oriented OpenID login page, without a browser engine.
//!
//! # Overview
//!
//! 1. Generate a code verifier and challenge ([`PkceChallenge`])
//! 2. Request the login page and scrape the session fields from the form's
//!    action URL ([`start_web_login`])
//! 3. Post username / password to that session and read the authorization
//!    code from the redirect ([`submit_credentials`])
//! 4. Exchange the code for a refresh token ([`exchange_code`]), and the
//!    refresh token for bearer tokens ([`exchange_refresh_token`])
//!
//! [`Authenticator`] runs steps 1-4 on first use and afterwards only step 4's
//! refresh exchange when the cached bearer token has expired.
//!
//! # Example
//!
//! ```no_run
//! use hubspace_auth::Authenticator;
//! use hubspace_auth::transport::ReqwestTransport;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = ReqwestTransport::new()?;
//!     let auth = Authenticator::new("user@example.com", "password");
//!
//!     let token = auth.get_token(&transport).await?;
//!     println!("Authorization: Bearer {token}");
//!     Ok(())
//! }
//! ```
//!
//! # Security
//!
//! - PKCE prevents authorization code interception attacks
//! - Passwords never appear in logs or `Debug` output; tokens are redacted
//! - The refresh token lives in memory only; persisting it is up to the caller

mod authenticator;
mod login;
mod pkce;
mod token;

pub use authenticator::{Authenticator, AuthenticatorBuilder};
pub use login::{
    LOGIN_FORM_ID, LoginSessionData, extract_login_data, start_web_login, submit_credentials,
};
pub use pkce::PkceChallenge;
pub use token::{Token, exchange_code, exchange_refresh_token};
