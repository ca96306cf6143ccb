use std::fmt::Display;

use thiserror::Error;

/// Errors raised while verifying an ID token
///
/// Every variant is terminal: verification stops at the first failing check.
/// Use [`TokenError::code`] when a stable, transport-friendly identifier is
/// needed (e.g. in a `401` response body).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// Raw token is larger than the size limit configured on the verifier
    #[error("token was above set size threshold")]
    OverSizeThreshold,

    /// Token does not contain exactly three dot-delimited sections
    #[error("token contained wrong number of dot-delimited sections")]
    MalformedToken(#[from] SplitError),

    /// Header section is not base64url or does not deserialize from JSON
    #[error("token header could not be decoded")]
    MalformedHeader,

    /// Payload section is not base64url or does not deserialize from JSON
    #[error("token payload could not be decoded")]
    MalformedPayload,

    /// Header `alg` is anything other than `RS256`
    #[error("token 'alg' header is not supported")]
    UnsupportedAlgorithm,

    /// `exp` claim is at or before the current time
    #[error("token 'exp' claim indicates token is expired")]
    TokenExpired,

    /// `iat` claim is after the current time
    #[error("token 'iat' claim indicates token was issued in the future")]
    TokenNotYetValid,

    /// `iss` claim does not match the expected issuer
    #[error("token 'iss' claim did not match expected issuer")]
    InvalidIssuer,

    /// `aud` claim does not match the expected audience
    #[error("token 'aud' claim did not match expected audience")]
    InvalidAudience,

    /// Raised by a caller-supplied [`TokenValidator`]
    ///
    /// [`TokenValidator`]: crate::validation::TokenValidator
    #[error("custom claim validation error: {0}")]
    CustomValidationError(&'static str),

    /// Header `kid` is missing or not present in the current key set
    #[error("signing key not found in key set")]
    KeyNotFound,

    /// Key set could not be retrieved
    #[error("public key set could not be fetched: {0}")]
    KeyFetchFailed(#[from] KeyFetchError),

    /// Signing certificate could not be parsed into a public key
    #[error("signing certificate could not be parsed: {0}")]
    CertificateParse(#[from] CertificateError),

    /// Signature does not verify against the signing key
    #[error("invalid signature")]
    InvalidSignature,

    /// Neither `user_id` nor `sub` claim is present
    #[error("token carries no subject")]
    NoSubject,
}

impl TokenError {
    /// Stable upper-snake-case identifier for the error kind
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::OverSizeThreshold => "TOKEN_TOO_LARGE",
            Self::MalformedToken(_) => "MALFORMED_TOKEN",
            Self::MalformedHeader => "MALFORMED_HEADER",
            Self::MalformedPayload => "MALFORMED_PAYLOAD",
            Self::UnsupportedAlgorithm => "UNSUPPORTED_ALGORITHM",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenNotYetValid => "TOKEN_NOT_YET_VALID",
            Self::InvalidIssuer => "INVALID_ISSUER",
            Self::InvalidAudience => "INVALID_AUDIENCE",
            Self::CustomValidationError(_) => "CUSTOM_VALIDATION_FAILED",
            Self::KeyNotFound => "KEY_NOT_FOUND",
            Self::KeyFetchFailed(_) => "KEY_FETCH_FAILED",
            Self::CertificateParse(_) => "CERTIFICATE_PARSE_ERROR",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::NoSubject => "NO_SUBJECT",
        }
    }
}

/// Errors raised during the compact-token split
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SplitError {
    /// Token contains less than three sections
    #[error("token contained less than three sections")]
    Undersized,

    /// Token contains more than three sections
    #[error("token contained more than three sections")]
    Oversized,
}

/// Errors raised while retrieving the public key set
#[derive(Error, Debug, PartialEq, Eq)]
pub enum KeyFetchError {
    /// Request could not be sent or the connection failed
    #[error("request failed: {0}")]
    Transport(String),

    /// Endpoint answered with a non-2xx status
    #[error("endpoint returned status {0}")]
    Status(u16),

    /// Response body is not a JSON object of PEM certificates
    #[error("response body could not be decoded: {0}")]
    Body(String),
}

/// Fields of an X.509 certificate visited on the way to its public key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificateField {
    Certificate,
    TbsCertificate,
    SerialNumber,
    SignatureAlgorithm,
    Issuer,
    Validity,
    Subject,
    SubjectPublicKeyInfo,
}

impl Display for CertificateField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Certificate => write!(f, "Certificate"),
            Self::TbsCertificate => write!(f, "TBSCertificate"),
            Self::SerialNumber => write!(f, "serialNumber"),
            Self::SignatureAlgorithm => write!(f, "signature"),
            Self::Issuer => write!(f, "issuer"),
            Self::Validity => write!(f, "validity"),
            Self::Subject => write!(f, "subject"),
            Self::SubjectPublicKeyInfo => write!(f, "subjectPublicKeyInfo"),
        }
    }
}

/// Errors raised while extracting a public key from a PEM/DER certificate
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CertificateError {
    /// Missing `BEGIN`/`END CERTIFICATE` markers or invalid base64 body
    #[error("certificate is not valid PEM")]
    Pem,

    /// Structure ends before a tag, length, or value is complete
    #[error("certificate DER is truncated")]
    Truncated,

    /// Indefinite or oversized length encoding
    #[error("certificate DER has an unsupported length encoding")]
    InvalidLength,

    /// Tag at an expected position is not the tag required there
    #[error("expected tag 0x{expected:02x} for {field}, found 0x{found:02x}")]
    UnexpectedTag {
        /// Field being read
        field: CertificateField,
        /// Tag required at this position
        expected: u8,
        /// Tag actually present
        found: u8,
    },

    /// Crypto backend rejected the extracted SubjectPublicKeyInfo
    #[error("subject public key was rejected by the crypto backend")]
    RejectedKey,
}

/// Errors raised while building a verifier from configuration
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Required variable is not set
    #[error("required configuration variable {0} is not set")]
    MissingVar(&'static str),

    /// Variable is set but cannot be parsed
    #[error("configuration variable {name} is invalid: {reason}")]
    InvalidVar {
        /// Variable name
        name: &'static str,
        /// Parse failure
        reason: String,
    },

    /// Key endpoint URL cannot be parsed
    #[error("key set url is invalid: {0}")]
    InvalidKeysUrl(String),

    /// Key endpoint URL is not https and not a loopback address
    #[error("key set url must use https: {0}")]
    InsecureKeysUrl(String),

    /// HTTP client could not be constructed
    #[error("http client could not be built: {0}")]
    HttpClient(String),
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::{
        CertificateError,
        CertificateField,
        KeyFetchError,
        SplitError,
        TokenError,
    };

    #[test]
    fn codes_match_error_kinds() {
        assert_eq!(
            TokenError::from(SplitError::Oversized).code(),
            "MALFORMED_TOKEN"
        );
        assert_eq!(TokenError::TokenExpired.code(), "TOKEN_EXPIRED");
        assert_eq!(
            TokenError::from(KeyFetchError::Status(503)).code(),
            "KEY_FETCH_FAILED"
        );
        assert_eq!(
            TokenError::from(CertificateError::Truncated).code(),
            "CERTIFICATE_PARSE_ERROR"
        );
        assert_eq!(TokenError::NoSubject.code(), "NO_SUBJECT");
    }

    #[test]
    fn unexpected_tag_message_names_field() {
        let err = CertificateError::UnexpectedTag {
            field: CertificateField::SubjectPublicKeyInfo,
            expected: 0x30,
            found: 0xa3,
        };
        assert_eq!(
            err.to_string(),
            "expected tag 0x30 for subjectPublicKeyInfo, found 0xa3"
        );
    }
}
