//! Accessor traits for the RFC 7519 registered claims the verifier checks

/// `iss` (Issuer) Claim
///
/// Ref: [RFC 7519 4.1.1](<https://datatracker.ietf.org/doc/html/rfc7519#section-4.1.1>)
pub trait Iss {
    /// Return `iss` (Issuer) claim, if present
    fn iss(&self) -> Option<&str>;
}

/// `sub` (Subject) Claim
///
/// Ref: [RFC 7519 4.1.2](<https://datatracker.ietf.org/doc/html/rfc7519#section-4.1.2>)
pub trait Sub {
    /// Return `sub` (Subject) claim, if present
    fn sub(&self) -> Option<&str>;
}

/// `aud` (Audience) Claim
///
/// Ref: [RFC 7519 4.1.3](<https://datatracker.ietf.org/doc/html/rfc7519#section-4.1.3>)
pub trait Aud {
    /// Return `aud` (Audience) claim values
    fn aud(&self) -> impl Iterator<Item = impl AsRef<str>>;
}

/// `exp` (Expiration Time) Claim
///
/// Ref: [RFC 7519 4.1.4](<https://datatracker.ietf.org/doc/html/rfc7519#section-4.1.4>)
pub trait Exp {
    /// Return `exp` (Expiration Time) claim as unix seconds
    fn exp(&self) -> i64;
}

/// `iat` (Issued At) Claim
///
/// Ref: [RFC 7519 4.1.6](<https://datatracker.ietf.org/doc/html/rfc7519#section-4.1.6>)
pub trait Iat {
    /// Return `iat` (Issued At) claim as unix seconds
    fn iat(&self) -> i64;
}
