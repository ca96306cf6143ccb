#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![doc = include_str!("../README.md")]

/// Claim accessor traits and the Firebase ID token payload.
pub mod claims;

/// Error enums
pub mod error;

/// Functions and traits supporting token verification.
pub mod validation;

/// Crypto backend implementations
pub mod crypto;

/// Injectable time sources.
pub mod clock;

/// Verifier configuration.
pub mod config;

/// HTTP request helpers.
pub mod request;

/// X.509 certificate to SubjectPublicKeyInfo extraction.
pub mod x509;

// WARNING: The decoding module is not considered part of the public API
// and is subject to breaking changes outside SemVer restrictions. It is
// marked `pub` purely for benchmarking purposes.
#[doc(hidden)]
pub mod decoding;

pub use algorithm::Algorithm;
pub use config::VerifierConfig;
pub use error::TokenError;
pub use header::TokenHeader;
pub use request::token_from_headers;
pub use validation::{
    TokenVerifier,
    VerifiedToken,
};

mod algorithm;
mod header;
