//! # HubSpace Authentication for Rust
//!
//! Client-side authentication against the HubSpace device-control API.
//! Async/await, strong typing, tokio-based.
//!
//! The provider only offers a login page meant for humans, so this crate
//! drives it headlessly: fetch the HTML login form, scrape its session
//! fields, post credentials, harvest the authorization code from the
//! redirect and exchange it (with PKCE) for a refresh token. Bearer tokens
//! are then regenerated from the refresh token and cached for 118 seconds.
//!
//! ## Quick Start
//!
//! ```no_run
//! use hubspace_auth::{Authenticator, ReqwestTransport};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = ReqwestTransport::new()?;
//!     let auth = Authenticator::new("user@example.com", "password");
//!
//!     // First call logs in; later calls reuse the cached token or refresh it
//!     let token = auth.get_token(&transport).await?;
//!     println!("Authorization: Bearer {token}");
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`auth`]: PKCE, login page scraping, token exchanges and the
//!   [`Authenticator`] cache
//! - [`transport`]: HTTP capability trait and the reqwest implementation
//! - [`html`]: HTML lookup capability used on the login page
//! - [`config`]: provider endpoints and client identity
//! - [`error`]: error types
//!
//! ## Logging
//!
//! This crate uses [`tracing`](https://crates.io/crates/tracing) for structured logging.
//! Lifecycle events are emitted at `debug`, request details at `trace`.
//! To see logs, attach a tracing subscriber in your application:
//!
//! ```rust,ignore
//! tracing_subscriber::fmt::init();
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, AuthError>`](Result):
//!
//! ```no_run
//! # use hubspace_auth::{AuthError, Authenticator, ReqwestTransport};
//! # async fn example(auth: Authenticator, transport: ReqwestTransport) {
//! match auth.get_token(&transport).await {
//!     Ok(token) => { /* ... */ }
//!     Err(AuthError::InvalidAuth(msg)) => {
//!         eprintln!("Wrong username or password: {msg}");
//!     }
//!     Err(AuthError::InvalidResponse(msg)) => {
//!         eprintln!("Provider login flow changed: {msg}");
//!     }
//!     Err(e) => {
//!         eprintln!("Error: {e}");
//!     }
//! }
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod config;
pub mod error;
pub mod html;
pub mod transport;
pub mod utils;

// Re-export commonly used types
pub use auth::{Authenticator, AuthenticatorBuilder, PkceChallenge, Token};
pub use config::HubSpaceConfig;
pub use error::{AuthError, Result};
pub use html::{HtmlElement, HtmlParser, ScraperHtmlParser};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport};

/// Version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
