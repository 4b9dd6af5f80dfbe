//! Small helpers shared by the login and token steps
//!
//! Secrets are shortened before they reach a log line, and query strings
//! are read the way the provider's redirects and form actions encode them.

/// Number of leading bytes of a secret kept in log output
const REDACT_KEEP: usize = 6;

/// Truncate a string at a UTF-8 character boundary.
#[inline]
#[must_use]
fn safe_truncate(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }

    let mut boundary = max_bytes;
    while boundary > 0 && !s.is_char_boundary(boundary) {
        boundary -= 1;
    }

    &s[..boundary]
}

/// Shorten a secret for logging.
///
/// # Example
/// ```
/// use hubspace_auth::utils::redact;
///
/// assert_eq!(redact("eyJhbGciOiJSUzI1NiJ9"), "eyJhbG...(20 bytes)");
/// assert_eq!(redact("abc"), "***");
/// ```
#[must_use]
pub fn redact(secret: &str) -> String {
    if secret.len() <= REDACT_KEEP {
        return "***".to_string();
    }
    format!(
        "{}...({} bytes)",
        safe_truncate(secret, REDACT_KEEP),
        secret.len()
    )
}

/// Read the first non-empty value of `key` from the query string of `url`.
///
/// `url` may be absolute (any scheme, including app redirect schemes) or a
/// bare path; the fragment is ignored. Keys present with an empty value are
/// treated as absent.
///
/// # Example
/// ```
/// use hubspace_auth::utils::query_value;
///
/// let location = "hubspace-app://loginredirect?state=x&code=ABC123";
/// assert_eq!(query_value(location, "code").as_deref(), Some("ABC123"));
/// assert_eq!(query_value(location, "missing"), None);
/// ```
#[must_use]
pub fn query_value(url: &str, key: &str) -> Option<String> {
    let without_fragment = url.split_once('#').map_or(url, |(head, _)| head);
    let (_, query) = without_fragment.split_once('?')?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(name, value)| name == key && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}
