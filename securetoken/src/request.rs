//! Locating the ID token on an incoming request
use http::HeaderMap;

/// Request header carrying the raw ID token
pub const TOKEN_HEADER: &str = "x-firebase-token";

/// Raw token from the `x-firebase-token` header.
///
/// Surrounding whitespace is trimmed. A missing header, a value that is not
/// visible ASCII, and an empty value all yield [`None`].
#[must_use]
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(TOKEN_HEADER)?
        .to_str()
        .ok()
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
