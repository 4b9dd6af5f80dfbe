//! PKCE verifier / challenge generation (S256)

use base64::{
    Engine,
    engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD},
};
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

use crate::utils::redact;

/// Number of random bytes behind each verifier
const VERIFIER_ENTROPY_BYTES: usize = 40;

/// PKCE code challenge data for one login attempt
#[derive(Clone, PartialEq, Eq)]
pub struct PkceChallenge {
    /// Code challenge: unpadded base64url SHA-256 of the verifier
    pub challenge: String,
    /// Code verifier: alphanumeric random string
    pub verifier: String,
}

impl PkceChallenge {
    /// Generate a fresh challenge from OS randomness.
    ///
    /// The provider only accepts alphanumeric verifiers, so the `-`, `_`
    /// and `=` characters of the base64url encoding are dropped.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; VERIFIER_ENTROPY_BYTES];
        OsRng.fill_bytes(&mut bytes);

        let verifier: String = URL_SAFE
            .encode(bytes)
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect();

        let challenge = Self::from_verifier(verifier);
        tracing::trace!(challenge = ?challenge, "Generated PKCE challenge");
        challenge
    }

    /// Derive the challenge for an existing verifier
    #[must_use]
    pub fn from_verifier(verifier: impl Into<String>) -> Self {
        let verifier = verifier.into();
        let challenge = URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()));
        Self {
            challenge,
            verifier,
        }
    }
}

impl std::fmt::Debug for PkceChallenge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PkceChallenge")
            .field("challenge", &self.challenge)
            .field("verifier", &redact(&self.verifier))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verifier_is_alphanumeric() {
        let pkce = PkceChallenge::generate();
        assert!(!pkce.verifier.is_empty());
        assert!(pkce.verifier.chars().all(|c| c.is_ascii_alphanumeric()));
        // 40 bytes encode to 56 base64 chars, at most all of them survive
        assert!(pkce.verifier.len() <= 56);
    }

    #[test]
    fn test_challenge_is_unpadded_base64url() {
        let pkce = PkceChallenge::generate();
        assert_eq!(pkce.challenge.len(), 43);
        assert!(!pkce.challenge.contains('='));
        assert!(
            pkce.challenge
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_challenge_is_deterministic() {
        let first = PkceChallenge::from_verifier("abc123");
        let second = PkceChallenge::from_verifier("abc123");
        assert_eq!(first, second);
    }

    #[test]
    fn test_rfc7636_vector() {
        let pkce = PkceChallenge::from_verifier("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk");
        assert_eq!(pkce.challenge, "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");
    }

    #[test]
    fn test_generated_challenges_differ() {
        assert_ne!(
            PkceChallenge::generate().verifier,
            PkceChallenge::generate().verifier
        );
    }

    #[test]
    fn test_debug_redacts_verifier() {
        let pkce = PkceChallenge::from_verifier("supersecretverifier");
        let debug = format!("{pkce:?}");
        assert!(!debug.contains("supersecretverifier"));
    }
}
