use aws_lc_rs::signature::{
    ParsedPublicKey,
    RSA_PKCS1_2048_8192_SHA256,
};

use crate::{
    error::{
        CertificateError,
        TokenError,
    },
    validation::VerificationKey,
};

/// RSASSA-PKCS1-v1_5 / SHA-256 public key
///
/// Built fresh from a certificate for every verification and dropped
/// afterwards; nothing derived from a certificate is cached.
#[derive(Debug)]
pub struct AwsLcVerificationKey {
    key: ParsedPublicKey,
}

impl AwsLcVerificationKey {
    /// Imports DER-encoded SubjectPublicKeyInfo as an RS256 verification key.
    ///
    /// # Errors
    ///
    /// [`TokenError::CertificateParse`] when the key is not a 2048 to 8192 bit
    /// RSA key
    pub fn from_spki(spki: &[u8]) -> Result<Self, TokenError> {
        let key = ParsedPublicKey::new(&RSA_PKCS1_2048_8192_SHA256, spki)
            .map_err(|_| CertificateError::RejectedKey)?;
        Ok(Self { key })
    }
}

impl VerificationKey for AwsLcVerificationKey {
    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), TokenError> {
        self.key
            .verify_sig(message, signature)
            .map_err(|_| TokenError::InvalidSignature)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use aws_lc_rs::{
        encoding::{
            AsDer,
            Pkcs8V1Der,
        },
        rand::SystemRandom,
        rsa::KeySize,
        signature::{
            RSA_PKCS1_SHA256,
            RSA_PKCS1_SHA512,
            RsaKeyPair,
        },
    };

    use super::AwsLcVerificationKey;
    use crate::{
        error::{
            CertificateError,
            TokenError,
        },
        validation::VerificationKey,
        x509,
    };

    // SPKI as it arrives in practice: cut out of a certificate over the key
    fn public_key_der(key: &RsaKeyPair) -> Vec<u8> {
        let pkcs8: Pkcs8V1Der = AsDer::<Pkcs8V1Der>::as_der(key).unwrap();
        let cert_key = rcgen::KeyPair::try_from(pkcs8.as_ref()).unwrap();
        let cert = rcgen::CertificateParams::new(vec!["securetoken.test".to_owned()])
            .unwrap()
            .self_signed(&cert_key)
            .unwrap();
        x509::spki_from_pem(&cert.pem()).unwrap()
    }

    #[test]
    fn verifies_rs256_signature() {
        let key = RsaKeyPair::generate(KeySize::Rsa2048).unwrap();
        let mut sig = vec![0; key.public_modulus_len()];
        key.sign(&RSA_PKCS1_SHA256, &SystemRandom::new(), b"header.payload", &mut sig)
            .unwrap();

        let vkey = AwsLcVerificationKey::from_spki(&public_key_der(&key)).unwrap();
        vkey.verify(b"header.payload", &sig).unwrap();

        let err = vkey.verify(b"header.payload2", &sig).unwrap_err();
        assert_eq!(err, TokenError::InvalidSignature);
    }

    #[test]
    fn sha512_signature_rejected() {
        let key = RsaKeyPair::generate(KeySize::Rsa2048).unwrap();
        let mut sig = vec![0; key.public_modulus_len()];
        key.sign(&RSA_PKCS1_SHA512, &SystemRandom::new(), b"header.payload", &mut sig)
            .unwrap();

        let vkey = AwsLcVerificationKey::from_spki(&public_key_der(&key)).unwrap();
        assert_eq!(
            vkey.verify(b"header.payload", &sig).unwrap_err(),
            TokenError::InvalidSignature
        );
    }

    #[test]
    fn garbage_key_rejected() {
        let err = AwsLcVerificationKey::from_spki(&[0x30, 0x03, 0x02, 0x01, 0x01]).unwrap_err();
        assert_eq!(err, TokenError::CertificateParse(CertificateError::RejectedKey));
    }
}
