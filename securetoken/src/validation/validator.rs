// JUSTIFICATION: using `pub(crate)` makes it immediately obvious that an item
// is not exposed via the public API.
#![allow(clippy::redundant_pub_crate)]
use crate::{
    claims::{
        Aud,
        Exp,
        Iat,
        Iss,
    },
    error::TokenError,
};

/// Trait for implementing custom claim checks
///
/// Custom validators run after the built-in `exp`, `iat`, `iss` and `aud`
/// checks and before any key material is fetched, in the order they were
/// registered.
///
/// # Example Implementation
///
/// ```rust
/// use securetoken::{
///     TokenHeader,
///     claims::FirebaseClaims,
///     error::TokenError,
///     validation::{
///         PublicKeySet,
///         StaticKeySet,
///         TokenValidator,
///         TokenVerifier,
///     },
/// };
///
/// pub struct RequireVerifiedEmail;
///
/// impl TokenValidator<TokenHeader, FirebaseClaims> for RequireVerifiedEmail {
///     fn validate(
///         &self,
///         _: &TokenHeader,
///         claims: &FirebaseClaims,
///         _now: i64,
///     ) -> Result<(), TokenError> {
///         if claims.email_verified == Some(true) {
///             Ok(())
///         } else {
///             Err(TokenError::CustomValidationError("email is not verified"))
///         }
///     }
/// }
///
/// fn main() {
///     let verifier = TokenVerifier::builder("clinic-prod", StaticKeySet::new(PublicKeySet::empty()))
///         .with(RequireVerifiedEmail)
///         // additional `.with(...)` calls can be chained here
///         // all validators are ran in-order
///         .build();
///     # let _ = verifier;
/// }
/// ```
pub trait TokenValidator<H: ?Sized, C: ?Sized> {
    /// Given the `header` and `claims` of a token and the current time in
    /// unix seconds, perform some validation step.
    ///
    /// # Errors
    ///
    /// This method MUST return a [`TokenError`] if the token `header` and/or
    /// `claims` do not pass the validation step performed by this
    /// [`TokenValidator`] implementation.
    fn validate(&self, header: &H, claims: &C, now: i64) -> Result<(), TokenError>;
}

/// Rejects tokens whose `exp` is at or before `now`
pub(crate) struct ExpirationValidator;
impl<H, C> TokenValidator<H, C> for ExpirationValidator
where
    C: Exp,
{
    fn validate(&self, _: &H, claims: &C, now: i64) -> Result<(), TokenError> {
        if claims.exp() > now {
            Ok(())
        } else {
            Err(TokenError::TokenExpired)
        }
    }
}

/// Rejects tokens whose `iat` is after `now`; `iat == now` passes
pub(crate) struct IssuedAtValidator;
impl<H, C> TokenValidator<H, C> for IssuedAtValidator
where
    C: Iat,
{
    fn validate(&self, _: &H, claims: &C, now: i64) -> Result<(), TokenError> {
        if claims.iat() <= now {
            Ok(())
        } else {
            Err(TokenError::TokenNotYetValid)
        }
    }
}

pub(crate) struct IssuerValidator {
    expected_issuer: String,
}
impl IssuerValidator {
    pub(crate) const fn new(iss: String) -> Self {
        Self {
            expected_issuer: iss,
        }
    }
}
impl<H, C> TokenValidator<H, C> for IssuerValidator
where
    C: Iss,
{
    fn validate(&self, _: &H, claims: &C, _: i64) -> Result<(), TokenError> {
        if claims.iss() == Some(self.expected_issuer.as_str()) {
            Ok(())
        } else {
            Err(TokenError::InvalidIssuer)
        }
    }
}

pub(crate) struct AudienceValidator {
    expected_audience: String,
}
impl AudienceValidator {
    pub(crate) const fn new(aud: String) -> Self {
        Self {
            expected_audience: aud,
        }
    }
}
impl<H, C> TokenValidator<H, C> for AudienceValidator
where
    C: Aud,
{
    fn validate(&self, _: &H, claims: &C, _: i64) -> Result<(), TokenError> {
        if claims.aud().any(|e| e.as_ref() == self.expected_audience) {
            Ok(())
        } else {
            Err(TokenError::InvalidAudience)
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::{
        AudienceValidator,
        ExpirationValidator,
        IssuedAtValidator,
        IssuerValidator,
        TokenValidator,
    };
    use crate::{
        claims::{
            Aud,
            Exp,
            Iat,
            Iss,
        },
        error::TokenError,
    };

    const NOW: i64 = 1_700_000_000;

    struct Claims {
        iss: Option<&'static str>,
        aud: Vec<&'static str>,
        iat: i64,
        exp: i64,
    }
    impl Default for Claims {
        fn default() -> Self {
            Self {
                iss: Some("https://securetoken.google.com/proj"),
                aud: vec!["proj"],
                iat: NOW - 60,
                exp: NOW + 3600,
            }
        }
    }
    impl Iss for Claims {
        fn iss(&self) -> Option<&str> {
            self.iss
        }
    }
    impl Aud for Claims {
        fn aud(&self) -> impl Iterator<Item = impl AsRef<str>> {
            self.aud.iter()
        }
    }
    impl Exp for Claims {
        fn exp(&self) -> i64 {
            self.exp
        }
    }
    impl Iat for Claims {
        fn iat(&self) -> i64 {
            self.iat
        }
    }

    #[test]
    fn expiration_is_exclusive() {
        let check = |exp| {
            TokenValidator::<(), _>::validate(
                &ExpirationValidator,
                &(),
                &Claims {
                    exp,
                    ..Default::default()
                },
                NOW,
            )
        };
        assert_eq!(check(NOW + 1), Ok(()));
        assert_eq!(check(NOW), Err(TokenError::TokenExpired));
        assert_eq!(check(NOW - 1), Err(TokenError::TokenExpired));
    }

    #[test]
    fn issued_at_is_inclusive() {
        let check = |iat| {
            TokenValidator::<(), _>::validate(
                &IssuedAtValidator,
                &(),
                &Claims {
                    iat,
                    ..Default::default()
                },
                NOW,
            )
        };
        assert_eq!(check(NOW - 1), Ok(()));
        assert_eq!(check(NOW), Ok(()));
        assert_eq!(check(NOW + 1), Err(TokenError::TokenNotYetValid));
    }

    #[test]
    fn issuer_must_match_exactly() {
        let validator = IssuerValidator::new("https://securetoken.google.com/proj".into());
        let claims = Claims::default();
        assert_eq!(validator.validate(&(), &claims, NOW), Ok(()));

        for iss in [Some("https://securetoken.google.com/proj/"), None] {
            let claims = Claims {
                iss,
                ..Default::default()
            };
            assert_eq!(
                validator.validate(&(), &claims, NOW),
                Err(TokenError::InvalidIssuer)
            );
        }
    }

    #[test]
    fn audience_matches_any_entry() {
        let validator = AudienceValidator::new("proj".into());
        let claims = Claims {
            aud: vec!["other", "proj"],
            ..Default::default()
        };
        assert_eq!(validator.validate(&(), &claims, NOW), Ok(()));

        let claims = Claims {
            aud: vec!["proj2"],
            ..Default::default()
        };
        assert_eq!(
            validator.validate(&(), &claims, NOW),
            Err(TokenError::InvalidAudience)
        );

        let claims = Claims {
            aud: vec![],
            ..Default::default()
        };
        assert_eq!(
            validator.validate(&(), &claims, NOW),
            Err(TokenError::InvalidAudience)
        );
    }
}
