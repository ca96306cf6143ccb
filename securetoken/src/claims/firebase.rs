use serde::{
    Deserialize,
    Serialize,
};
use serde_json::{
    Map,
    Value,
};

use crate::claims::{
    Aud,
    Exp,
    Iat,
    Iss,
    Sub,
};

/// Payload of a Firebase Authentication ID token
///
/// `iat` and `exp` are required; a payload missing either fails to
/// deserialize. `iss`, `aud`, `sub` and `user_id` that are missing or not
/// strings read as `None` and are rejected by the issuer, audience and
/// subject checks instead. Claims not modelled here (custom claims set through
/// the Admin SDK, `name`, `picture`, ...) are kept in [`FirebaseClaims::extra`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirebaseClaims {
    #[serde(
        default,
        deserialize_with = "crate::decoding::string_or_absent",
        skip_serializing_if = "Option::is_none"
    )]
    pub iss: Option<String>,

    #[serde(
        default,
        deserialize_with = "crate::decoding::string_or_absent",
        skip_serializing_if = "Option::is_none"
    )]
    pub aud: Option<String>,

    pub iat: i64,
    pub exp: i64,

    /// Legacy subject claim; same value as `user_id` on current tokens
    #[serde(
        default,
        deserialize_with = "crate::decoding::string_or_absent",
        skip_serializing_if = "Option::is_none"
    )]
    pub sub: Option<String>,

    /// Firebase uid
    #[serde(
        default,
        deserialize_with = "crate::decoding::string_or_absent",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_id: Option<String>,

    /// Time the user authenticated, which can predate `iat` on refreshed tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_time: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firebase: Option<FirebaseInfo>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `firebase` claim: sign-in provider and linked identities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirebaseInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign_in_provider: Option<String>,

    #[serde(default)]
    pub identities: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,
}

impl FirebaseClaims {
    /// Resolves the subject: `user_id` first, then the legacy `sub` alias.
    /// Empty values count as absent.
    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        self.user_id
            .as_deref()
            .filter(|uid| !uid.is_empty())
            .or_else(|| self.sub().filter(|sub| !sub.is_empty()))
    }
}

impl Iss for FirebaseClaims {
    fn iss(&self) -> Option<&str> {
        self.iss.as_deref()
    }
}

impl Sub for FirebaseClaims {
    fn sub(&self) -> Option<&str> {
        self.sub.as_deref()
    }
}

impl Aud for FirebaseClaims {
    fn aud(&self) -> impl Iterator<Item = impl AsRef<str>> {
        self.aud.as_deref().into_iter()
    }
}

impl Exp for FirebaseClaims {
    fn exp(&self) -> i64 {
        self.exp
    }
}

impl Iat for FirebaseClaims {
    fn iat(&self) -> i64 {
        self.iat
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use serde_json::json;

    use super::FirebaseClaims;

    fn claims(value: serde_json::Value) -> FirebaseClaims {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn full_firebase_payload() {
        let claims = claims(json!({
            "iss": "https://securetoken.google.com/clinic-prod",
            "aud": "clinic-prod",
            "auth_time": 1_700_000_000,
            "user_id": "Yq3hVZ2b",
            "sub": "Yq3hVZ2b",
            "iat": 1_700_000_100,
            "exp": 1_700_003_700,
            "email": "patient@example.org",
            "email_verified": true,
            "firebase": {
                "identities": { "email": ["patient@example.org"] },
                "sign_in_provider": "password"
            },
            "role": "patient"
        }));
        assert_eq!(claims.uid(), Some("Yq3hVZ2b"));
        assert_eq!(claims.email.as_deref(), Some("patient@example.org"));
        assert_eq!(
            claims.firebase.unwrap().sign_in_provider.as_deref(),
            Some("password")
        );
        assert_eq!(claims.extra["role"], "patient");
    }

    #[test]
    fn user_id_preferred_over_sub() {
        let claims = claims(json!({
            "iss": "i", "aud": "a", "iat": 0, "exp": 1,
            "user_id": "primary", "sub": "legacy"
        }));
        assert_eq!(claims.uid(), Some("primary"));
    }

    #[test]
    fn sub_used_when_user_id_absent_or_empty() {
        let only_sub = claims(json!({ "iss": "i", "aud": "a", "iat": 0, "exp": 1, "sub": "user-42" }));
        assert_eq!(only_sub.uid(), Some("user-42"));

        let empty_uid = claims(json!({
            "iss": "i", "aud": "a", "iat": 0, "exp": 1,
            "user_id": "", "sub": "user-42"
        }));
        assert_eq!(empty_uid.uid(), Some("user-42"));
    }

    #[test]
    fn no_subject() {
        let claims = claims(json!({ "iss": "i", "aud": "a", "iat": 0, "exp": 1, "sub": "" }));
        assert_eq!(claims.uid(), None);
    }

    #[test]
    fn time_claims_required() {
        let missing_exp = json!({ "iss": "i", "aud": "a", "iat": 0 });
        assert!(serde_json::from_value::<FirebaseClaims>(missing_exp).is_err());
    }

    #[test]
    fn wrongly_typed_identity_claims_read_as_absent() {
        let claims = claims(json!({
            "aud": ["a"], "iat": 0, "exp": 1,
            "user_id": 42, "sub": "user-42"
        }));
        assert_eq!(claims.iss, None);
        assert_eq!(claims.aud, None);
        assert_eq!(claims.uid(), Some("user-42"));
    }

    #[test]
    fn firebase_claim_without_provider() {
        let claims = claims(json!({
            "iss": "i", "aud": "a", "iat": 0, "exp": 1,
            "firebase": { "identities": {} }
        }));
        assert_eq!(claims.firebase.unwrap().sign_in_provider, None);
    }
}
