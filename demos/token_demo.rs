//! HubSpace Token Demo
//!
//! Logs in with the credentials from `HUBSPACE_USERNAME` / `HUBSPACE_PASSWORD`,
//! fetches a bearer token, then fetches again to show the cached value is
//! reused.
//!
//! Run with: cargo run --example token_demo
//! Verbose:  RUST_LOG=hubspace_auth=trace cargo run --example token_demo

use hubspace_auth::{AuthError, Authenticator, ReqwestTransport};
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hubspace_auth=debug".parse().unwrap()),
        )
        .init();

    let (Ok(username), Ok(password)) = (
        std::env::var("HUBSPACE_USERNAME"),
        std::env::var("HUBSPACE_PASSWORD"),
    ) else {
        eprintln!("Set HUBSPACE_USERNAME and HUBSPACE_PASSWORD first.");
        return Ok(());
    };

    let transport = ReqwestTransport::with_timeout(Duration::from_secs(30))?;
    let auth = Authenticator::new(username, password);

    println!("Authenticating as {}...", auth.username());
    let token = match auth.get_token(&transport).await {
        Ok(token) => token,
        Err(AuthError::InvalidAuth(msg)) => {
            eprintln!("✗ Login rejected: {msg}");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    println!("✓ Bearer token: {}", hubspace_auth::utils::redact(&token));

    let again = auth.get_token(&transport).await?;
    println!(
        "✓ Second call reused cached token: {}",
        if again == token { "yes" } else { "no" }
    );

    if let Some(refresh) = auth.refresh_token().await {
        println!(
            "  Refresh token (persist it to skip the login next time): {}",
            hubspace_auth::utils::redact(&refresh)
        );
    }

    Ok(())
}
