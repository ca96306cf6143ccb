use base64_simd::STANDARD as b64;

use crate::error::CertificateError;

const BEGIN: &str = "-----BEGIN CERTIFICATE-----";
const END: &str = "-----END CERTIFICATE-----";

/// Decodes the first `CERTIFICATE` block of a PEM document to DER.
///
/// # Errors
///
/// [`CertificateError::Pem`] when either marker is missing or the body is not
/// standard base64.
pub fn pem_to_der(pem: &str) -> Result<Vec<u8>, CertificateError> {
    let (_, rest) = pem.split_once(BEGIN).ok_or(CertificateError::Pem)?;
    let (body, _) = rest.split_once(END).ok_or(CertificateError::Pem)?;
    let body: Vec<u8> = body
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    b64.decode_to_vec(body).map_err(|_| CertificateError::Pem)
}
