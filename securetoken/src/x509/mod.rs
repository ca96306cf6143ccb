//! Locates the SubjectPublicKeyInfo inside an X.509 certificate.
//!
//! ```text
//! Certificate ::= SEQUENCE {
//!   tbsCertificate       TBSCertificate,
//!   signatureAlgorithm   AlgorithmIdentifier,
//!   signatureValue       BIT STRING }
//!
//! TBSCertificate ::= SEQUENCE {
//!   version         [0]  EXPLICIT Version DEFAULT v1,
//!   serialNumber         CertificateSerialNumber,
//!   signature            AlgorithmIdentifier,
//!   issuer               Name,
//!   validity             Validity,
//!   subject              Name,
//!   subjectPublicKeyInfo SubjectPublicKeyInfo,
//!   ... }
//! ```
//!
//! Only the fields up to `subjectPublicKeyInfo` are visited. Their tags are
//! checked, their contents are not interpreted.
mod der;
mod pem;

use der::{
    CONTEXT_0,
    DerReader,
    INTEGER,
    SEQUENCE,
};
pub use pem::pem_to_der;

use crate::error::{
    CertificateError,
    CertificateField,
};

/// Returns the complete DER encoding (tag, length and value) of the
/// certificate's `subjectPublicKeyInfo`, borrowed from `der`.
///
/// # Errors
///
/// - [`CertificateError::UnexpectedTag`] when a field is not encoded with the
///   tag X.509 requires at that position
/// - [`CertificateError::Truncated`] when any element runs past the end of its
///   enclosing structure
/// - [`CertificateError::InvalidLength`] for indefinite or oversized lengths
pub fn extract_spki(der: &[u8]) -> Result<&[u8], CertificateError> {
    let certificate =
        DerReader::new(der).expect(SEQUENCE, CertificateField::Certificate)?;
    let tbs = DerReader::new(certificate.value)
        .expect(SEQUENCE, CertificateField::TbsCertificate)?;

    let mut fields = DerReader::new(tbs.value);
    if fields.peek_tag() == Some(CONTEXT_0) {
        fields.read()?;
    }
    fields.expect(INTEGER, CertificateField::SerialNumber)?;
    fields.expect(SEQUENCE, CertificateField::SignatureAlgorithm)?;
    fields.expect(SEQUENCE, CertificateField::Issuer)?;
    fields.expect(SEQUENCE, CertificateField::Validity)?;
    fields.expect(SEQUENCE, CertificateField::Subject)?;
    let spki = fields.expect(SEQUENCE, CertificateField::SubjectPublicKeyInfo)?;

    Ok(spki.raw)
}

/// PEM certificate straight to owned SubjectPublicKeyInfo DER.
///
/// # Errors
///
/// Any [`CertificateError`] from [`pem_to_der`] or [`extract_spki`].
pub fn spki_from_pem(pem: &str) -> Result<Vec<u8>, CertificateError> {
    let der = pem_to_der(pem)?;
    extract_spki(&der).map(<[u8]>::to_vec)
}
