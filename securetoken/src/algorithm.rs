use std::{
    fmt::Display,
    str::FromStr,
};

use crate::error::TokenError;

/// JWS Signature Algorithm accepted in ID token headers
///
/// Firebase signs ID tokens with `RSASSA-PKCS1-v1_5` using `SHA-256` only;
/// every other `alg` value is rejected while parsing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// `RSASSA-PKCS1-v1_5` using `SHA-256`
    #[default]
    RS256,
}

impl Algorithm {
    /// Registered JWS name of the algorithm
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RS256 => "RS256",
        }
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = TokenError;

    // names are case-sensitive per RFC 7515 4.1.1
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RS256" => Ok(Self::RS256),
            _ => Err(TokenError::UnsupportedAlgorithm),
        }
    }
}
