//! Provides ID token verification
pub mod cache;
pub mod fetch;
pub mod keystore;

pub(crate) mod validator;

pub use cache::{
    CachingKeySetProvider,
    InMemoryKeySetCache,
    KeySetCache,
};
pub use fetch::{
    HttpKeySetFetcher,
    KeySetFetcher,
};
pub use keystore::{
    KeySetProvider,
    PublicKeySet,
    StaticKeySet,
};
pub use validator::TokenValidator;
pub use verifier::{
    TokenVerifier,
    TokenVerifierBuilder,
    VerifiedToken,
};

mod verifier;

use crate::error::TokenError;

/// A [`VerificationKey`] used to check token signatures.
pub trait VerificationKey {
    /// Verify a token's signature.
    ///
    /// # Parameters
    ///
    /// - `message` is the dot-delimited base-64-url encoded message section of
    ///   the token, including the header and payload, but not the signature.
    ///   Ref: <https://datatracker.ietf.org/doc/html/rfc7515#section-7.1>
    /// - `signature` is the decoded signature component of the token.
    ///
    /// # Errors
    ///
    /// This method MUST return [`TokenError::InvalidSignature`] when the
    /// signature is invalid or cannot be checked.
    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), TokenError>;
}
