#![allow(dead_code, clippy::unwrap_used)]
use aws_lc_rs::{
    encoding::{
        AsDer,
        Pkcs8V1Der,
    },
    rand::SystemRandom,
    rsa::KeySize,
    signature::{
        RSA_PKCS1_SHA256,
        RsaKeyPair,
    },
};
use base64_simd::URL_SAFE_NO_PAD as b64;
use rcgen::CertificateParams;
use serde_json::{
    Value,
    json,
};

pub const NOW: i64 = 1_700_000_000;
pub const PROJECT: &str = "proj";
pub const KID: &str = "k1";

/// RSA signing key paired with a self-signed certificate over its public half
pub struct SigningKey {
    pub key: RsaKeyPair,
    pub pem: String,
}

impl SigningKey {
    pub fn generate() -> Self {
        let key = RsaKeyPair::generate(KeySize::Rsa2048).unwrap();
        let pkcs8: Pkcs8V1Der = AsDer::<Pkcs8V1Der>::as_der(&key).unwrap();
        let cert_key = rcgen::KeyPair::try_from(pkcs8.as_ref()).unwrap();
        let cert = CertificateParams::new(vec!["securetoken.test".to_owned()])
            .unwrap()
            .self_signed(&cert_key)
            .unwrap();
        Self {
            key,
            pem: cert.pem(),
        }
    }

    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        let mut signature = vec![0; self.key.public_modulus_len()];
        self.key
            .sign(&RSA_PKCS1_SHA256, &SystemRandom::new(), message, &mut signature)
            .unwrap();
        signature
    }

    /// Compact token over the JSON `header` and `claims`, signed by this key
    pub fn token(&self, header: &Value, claims: &Value) -> String {
        let message = format!("{}.{}", section(header), section(claims));
        let signature = b64.encode_to_string(self.sign(message.as_bytes()));
        format!("{message}.{signature}")
    }
}

pub fn section(value: &Value) -> String {
    b64.encode_to_string(value.to_string())
}

pub fn header() -> Value {
    json!({"alg": "RS256", "kid": KID, "typ": "JWT"})
}

pub fn claims() -> Value {
    json!({
        "iss": format!("https://securetoken.google.com/{PROJECT}"),
        "aud": PROJECT,
        "auth_time": NOW - 600,
        "iat": NOW - 10,
        "exp": NOW + 3590,
        "user_id": "user-42",
        "sub": "user-42",
        "email": "patient@example.org",
        "email_verified": true,
        "firebase": {
            "identities": {"email": ["patient@example.org"]},
            "sign_in_provider": "password"
        }
    })
}

/// Copy of `value` with `overrides` merged over its top-level keys; a `null`
/// override removes the key
pub fn with(value: &Value, overrides: &Value) -> Value {
    let mut value = value.clone();
    let object = value.as_object_mut().unwrap();
    for (k, v) in overrides.as_object().unwrap() {
        if v.is_null() {
            object.remove(k);
        } else {
            object.insert(k.clone(), v.clone());
        }
    }
    value
}
