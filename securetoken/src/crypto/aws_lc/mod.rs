//! [`aws-lc-rs`] crypto backend implementation
//!
//! Implements [`VerificationKey`] over an [`aws-lc-rs`] parsed RSA public key
//! imported from certificate SubjectPublicKeyInfo.
//!
//! [`VerificationKey`]: crate::validation::VerificationKey
//! [`aws-lc-rs`]: aws_lc_rs

mod verify;

pub use verify::AwsLcVerificationKey;
