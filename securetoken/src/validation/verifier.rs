use std::{
    fmt,
    sync::Arc,
};

use tracing::debug;

use crate::{
    TokenHeader,
    claims::FirebaseClaims,
    clock::{
        Clock,
        SystemClock,
    },
    config::{
        DEFAULT_ISSUER_PREFIX,
        VerifierConfig,
    },
    crypto::aws_lc::AwsLcVerificationKey,
    decoding::{
        SplitToken,
        decode_json,
        decode_section,
    },
    error::{
        ConfigError,
        TokenError,
    },
    validation::{
        CachingKeySetProvider,
        HttpKeySetFetcher,
        KeySetProvider,
        VerificationKey,
        validator::{
            AudienceValidator,
            ExpirationValidator,
            IssuedAtValidator,
            IssuerValidator,
            TokenValidator,
        },
    },
    x509,
};

type BoxedValidator = Box<dyn TokenValidator<TokenHeader, FirebaseClaims> + Send + Sync>;

pub struct TokenVerifierBuilder<KP> {
    project_id: String,
    issuer_prefix: String,
    key_provider: KP,
    clock: Arc<dyn Clock>,
    size_limit: Option<usize>,
    validators: Vec<BoxedValidator>,
}

impl<KP> TokenVerifierBuilder<KP>
where
    KP: KeySetProvider + Send + Sync,
{
    pub(crate) fn new(project_id: impl Into<String>, key_provider: KP) -> Self {
        Self {
            project_id: project_id.into(),
            issuer_prefix: DEFAULT_ISSUER_PREFIX.to_owned(),
            key_provider,
            clock: Arc::new(SystemClock),
            size_limit: None,
            validators: Vec::new(),
        }
    }

    /// Replaces [`DEFAULT_ISSUER_PREFIX`]; the expected `iss` becomes
    /// `issuer_prefix + project_id`.
    #[must_use]
    pub fn with_issuer_prefix(mut self, issuer_prefix: impl Into<String>) -> Self {
        self.issuer_prefix = issuer_prefix.into();
        self
    }

    /// Sets the clock `exp` and `iat` are checked against
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Caps accepted token size to `size_limit` bytes
    ///
    /// Tokens above this size will return a [`TokenError::OverSizeThreshold`]
    #[must_use]
    pub const fn with_max_size(mut self, size_limit: usize) -> Self {
        self.size_limit = Some(size_limit);
        self
    }

    /// Adds a custom validator to the verifier.
    /// This method may be chained to add multiple custom validators.
    #[must_use]
    pub fn with(
        mut self,
        validator: impl TokenValidator<TokenHeader, FirebaseClaims> + Send + Sync + 'static,
    ) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    /// Finalizes the verifier construction.
    pub fn build(self) -> TokenVerifier<KP> {
        let issuer = format!("{}{}", self.issuer_prefix, self.project_id);
        debug!(%issuer, audience = %self.project_id, "building token verifier");

        let mut validators: Vec<BoxedValidator> = vec![
            Box::new(ExpirationValidator),
            Box::new(IssuedAtValidator),
            Box::new(IssuerValidator::new(issuer)),
            Box::new(AudienceValidator::new(self.project_id)),
        ];
        validators.extend(self.validators);

        TokenVerifier {
            validators,
            key_provider: self.key_provider,
            clock: self.clock,
            size_limit: self.size_limit,
        }
    }
}

/// Verifies Firebase ID tokens against the project they were issued for
///
/// Checks run in a fixed order and stop at the first failure: size, shape,
/// header, algorithm, payload, `exp`, `iat`, `iss`, `aud`, custom validators,
/// signing certificate lookup, signature, subject. Nothing touches the network
/// until every claim check has passed.
///
/// Build once and share; the key set cache lives inside the key provider.
pub struct TokenVerifier<KP> {
    validators: Vec<BoxedValidator>,
    key_provider: KP,
    clock: Arc<dyn Clock>,
    size_limit: Option<usize>,
}

impl TokenVerifier<CachingKeySetProvider<HttpKeySetFetcher>> {
    /// Verifier fetching certificates over HTTPS with an in-memory cache, as
    /// described by `config`.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] when the key endpoint is invalid or the HTTP client
    /// cannot be built.
    pub fn from_config(config: &VerifierConfig) -> Result<Self, ConfigError> {
        let fetcher = HttpKeySetFetcher::new(&config.keys_url, config.fetch_timeout)?;
        let provider = CachingKeySetProvider::new(fetcher).with_ttl(config.cache_ttl);

        let mut builder = Self::builder(config.project_id.clone(), provider)
            .with_issuer_prefix(config.issuer_prefix.clone());
        if let Some(max) = config.max_token_size {
            builder = builder.with_max_size(max);
        }
        Ok(builder.build())
    }
}

impl<KP> TokenVerifier<KP>
where
    KP: KeySetProvider + Send + Sync,
{
    /// Returns a new [`TokenVerifierBuilder`] for tokens issued to `project_id`.
    pub fn builder(project_id: impl Into<String>, key_provider: KP) -> TokenVerifierBuilder<KP> {
        TokenVerifierBuilder::new(project_id, key_provider)
    }

    /// Verifies a compact-encoded ID token.
    ///
    /// # Errors
    ///
    /// - [`TokenError::OverSizeThreshold`] when a size limit is set and the
    ///   raw token is longer
    /// - [`TokenError::MalformedToken`] when the token does not have exactly
    ///   three dot-delimited sections
    /// - [`TokenError::MalformedHeader`] / [`TokenError::MalformedPayload`]
    ///   when a section is not base64url-encoded JSON of the expected shape
    /// - [`TokenError::UnsupportedAlgorithm`] when `alg` is anything but the
    ///   string `RS256`, missing included
    /// - [`TokenError::TokenExpired`], [`TokenError::TokenNotYetValid`],
    ///   [`TokenError::InvalidIssuer`], [`TokenError::InvalidAudience`] from
    ///   the claim checks, or any error raised by a custom [`TokenValidator`]
    /// - [`TokenError::KeyFetchFailed`] when the key set cannot be retrieved
    /// - [`TokenError::KeyNotFound`] when `kid` is missing or unknown
    /// - [`TokenError::CertificateParse`] when the signing certificate does
    ///   not yield an RSA public key
    /// - [`TokenError::InvalidSignature`] when the signature does not decode
    ///   or does not verify
    /// - [`TokenError::NoSubject`] when neither `user_id` nor `sub` is set
    pub async fn verify(&self, token: &str) -> Result<VerifiedToken, TokenError> {
        match self.verify_inner(token).await {
            Ok(verified) => {
                debug!(uid = %verified.uid, "token verified");
                Ok(verified)
            }
            Err(e) => {
                debug!(code = e.code(), error = %e, "token rejected");
                Err(e)
            }
        }
    }

    async fn verify_inner(&self, token: &str) -> Result<VerifiedToken, TokenError> {
        if let Some(size_limit) = self.size_limit
            && token.len() > size_limit
        {
            return Err(TokenError::OverSizeThreshold);
        }
        let split = SplitToken::try_from(token)?;

        // alg is settled before the payload is even decoded
        let header: TokenHeader = decode_json(split.b64_header(), TokenError::MalformedHeader)?;
        header.supported_algorithm()?;
        let claims: FirebaseClaims =
            decode_json(split.b64_payload(), TokenError::MalformedPayload)?;

        let now = self.clock.now();
        self.run_validators(&header, &claims, now)?;
        debug!(now, "claims accepted");

        let keys = self.key_provider.key_set().await?;
        let kid = header.kid.as_deref().ok_or(TokenError::KeyNotFound)?;
        let pem = keys.get(kid).ok_or(TokenError::KeyNotFound)?;
        debug!(kid, "signing certificate resolved");

        let key = Self::import_key(pem)?;
        let signature =
            decode_section(split.b64_signature()).ok_or(TokenError::InvalidSignature)?;
        key.verify(split.b64_message(), &signature)?;

        let uid = claims.uid().ok_or(TokenError::NoSubject)?.to_owned();
        Ok(VerifiedToken {
            uid,
            header,
            claims,
        })
    }

    fn import_key(pem: &str) -> Result<AwsLcVerificationKey, TokenError> {
        let spki = x509::spki_from_pem(pem)?;
        AwsLcVerificationKey::from_spki(&spki)
    }

    fn run_validators(
        &self,
        header: &TokenHeader,
        claims: &FirebaseClaims,
        now: i64,
    ) -> Result<(), TokenError> {
        for v in &self.validators {
            v.validate(header, claims, now)?;
        }
        Ok(())
    }

    /// Key provider the verifier resolves certificates through
    pub const fn key_provider(&self) -> &KP {
        &self.key_provider
    }
}

impl<KP: fmt::Debug> fmt::Debug for TokenVerifier<KP> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("validators", &self.validators.len())
            .field("key_provider", &self.key_provider)
            .field("size_limit", &self.size_limit)
            .finish_non_exhaustive()
    }
}

/// Claims of a token that passed every check, with its resolved subject
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedToken {
    uid: String,
    header: TokenHeader,
    claims: FirebaseClaims,
}

impl VerifiedToken {
    /// Firebase uid: `user_id`, or `sub` when `user_id` is absent
    #[must_use]
    pub fn uid(&self) -> &str {
        &self.uid
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.claims.email.as_deref()
    }

    #[must_use]
    pub const fn header(&self) -> &TokenHeader {
        &self.header
    }

    #[must_use]
    pub const fn claims(&self) -> &FirebaseClaims {
        &self.claims
    }

    #[must_use]
    pub fn into_claims(self) -> FirebaseClaims {
        self.claims
    }
}
