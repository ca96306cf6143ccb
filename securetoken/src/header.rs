//! JOSE header of an ID token
use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    Algorithm,
    error::TokenError,
};

/// Decoded token header
///
/// Every parameter is read leniently: a value that is not a JSON string is
/// treated as absent, so a numeric `alg` surfaces as
/// [`TokenError::UnsupportedAlgorithm`], a non-string `kid` as
/// [`TokenError::KeyNotFound`], and `typ` never rejects a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHeader {
    /// `alg` (Algorithm) Header Parameter
    #[serde(
        default,
        deserialize_with = "crate::decoding::string_or_absent",
        skip_serializing_if = "Option::is_none"
    )]
    pub alg: Option<String>,

    /// `kid` (Key ID) Header Parameter naming the signing certificate
    #[serde(
        default,
        deserialize_with = "crate::decoding::string_or_absent",
        skip_serializing_if = "Option::is_none"
    )]
    pub kid: Option<String>,

    /// `typ` (Type) Header Parameter
    #[serde(
        default,
        deserialize_with = "crate::decoding::string_or_absent",
        skip_serializing_if = "Option::is_none"
    )]
    pub typ: Option<String>,
}

impl TokenHeader {
    /// Checks `alg` against [`Algorithm::RS256`].
    ///
    /// # Errors
    ///
    /// [`TokenError::UnsupportedAlgorithm`] for any value other than the
    /// string `RS256`, including a missing or non-string `alg` and registered
    /// names such as `none` or `HS256`.
    pub fn supported_algorithm(&self) -> Result<Algorithm, TokenError> {
        self.alg
            .as_deref()
            .ok_or(TokenError::UnsupportedAlgorithm)?
            .parse()
    }
}
