use base64_simd::URL_SAFE_NO_PAD as b64;
use serde::{
    Deserialize,
    Deserializer,
    de::DeserializeOwned,
};
use serde_json::Value;

use crate::error::TokenError;

/// Decodes a single base64url section.
///
/// Sections are normally unpadded; up to two trailing `=` are tolerated.
#[must_use]
pub fn decode_section(section: &[u8]) -> Option<Vec<u8>> {
    b64.decode_to_vec(strip_padding(section)).ok()
}

/// Decodes a base64url section and deserializes its JSON content, mapping any
/// failure (encoding or JSON) to `err`.
pub(crate) fn decode_json<T>(section: &[u8], err: TokenError) -> Result<T, TokenError>
where
    T: DeserializeOwned,
{
    match decode_section(section) {
        Some(decoded) => serde_json::from_slice(&decoded).map_err(|_| err),
        None => Err(err),
    }
}

/// Field deserializer keeping a value only when it is a JSON string
///
/// Any other JSON value, `null` included, reads as absent. Used with
/// `#[serde(default)]` on fields whose wrong type must fail a later check
/// rather than the section decode.
pub(crate) fn string_or_absent<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn strip_padding(section: &[u8]) -> &[u8] {
    let mut end = section.len();
    while end > 0 && section.len() - end < 2 && section[end - 1] == b'=' {
        end -= 1;
    }
    &section[..end]
}
