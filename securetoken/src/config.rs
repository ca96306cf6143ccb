//! Verifier configuration and its environment loader
use std::{
    str::FromStr,
    time::Duration,
};

use crate::{
    error::ConfigError,
    validation::{
        cache::DEFAULT_CACHE_TTL,
        fetch::DEFAULT_KEYS_URL,
    },
};

/// Issuer prefix of Firebase ID tokens; the project id completes the issuer
pub const DEFAULT_ISSUER_PREFIX: &str = "https://securetoken.google.com/";

/// Firebase ID tokens are around 1 KiB; anything near this is not one
pub const DEFAULT_MAX_TOKEN_SIZE: usize = 16 * 1024;

pub const ENV_PROJECT_ID: &str = "FIREBASE_PROJECT_ID";
pub const ENV_ISSUER_PREFIX: &str = "SECURETOKEN_ISSUER_PREFIX";
pub const ENV_KEYS_URL: &str = "SECURETOKEN_KEYS_URL";
pub const ENV_CACHE_SECS: &str = "SECURETOKEN_KEYS_CACHE_SECS";
pub const ENV_MAX_TOKEN_BYTES: &str = "SECURETOKEN_MAX_TOKEN_BYTES";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "SECURETOKEN_FETCH_TIMEOUT_SECS";

/// Everything needed to build a [`TokenVerifier`] that fetches its own keys
///
/// [`TokenVerifier`]: crate::validation::TokenVerifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierConfig {
    /// Firebase project id; the expected `aud` and the issuer suffix
    pub project_id: String,
    pub issuer_prefix: String,
    /// Endpoint serving `{ kid: PEM }`
    pub keys_url: String,
    /// How long a fetched key set is served before refetching
    pub cache_ttl: Duration,
    /// Tokens longer than this are rejected unparsed; `None` disables the cap
    pub max_token_size: Option<usize>,
    /// Request timeout for the key fetch; `None` waits indefinitely
    pub fetch_timeout: Option<Duration>,
}

impl VerifierConfig {
    /// Configuration for `project_id` with production defaults
    #[must_use]
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            issuer_prefix: DEFAULT_ISSUER_PREFIX.to_owned(),
            keys_url: DEFAULT_KEYS_URL.to_owned(),
            cache_ttl: DEFAULT_CACHE_TTL,
            max_token_size: Some(DEFAULT_MAX_TOKEN_SIZE),
            fetch_timeout: None,
        }
    }

    /// Loads configuration from process environment variables.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `FIREBASE_PROJECT_ID` | required |
    /// | `SECURETOKEN_ISSUER_PREFIX` | `https://securetoken.google.com/` |
    /// | `SECURETOKEN_KEYS_URL` | Google's `securetoken` certificate endpoint |
    /// | `SECURETOKEN_KEYS_CACHE_SECS` | `3600` |
    /// | `SECURETOKEN_MAX_TOKEN_BYTES` | `16384`, `0` disables the cap |
    /// | `SECURETOKEN_FETCH_TIMEOUT_SECS` | unset, no timeout |
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingVar`] when `FIREBASE_PROJECT_ID` is unset or blank
    /// - [`ConfigError::InvalidVar`] when a numeric variable does not parse
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`VerifierConfig::from_env`], reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`VerifierConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let project_id = var(ENV_PROJECT_ID).ok_or(ConfigError::MissingVar(ENV_PROJECT_ID))?;
        let mut config = Self::new(project_id);

        if let Some(prefix) = var(ENV_ISSUER_PREFIX) {
            config.issuer_prefix = prefix;
        }
        if let Some(url) = var(ENV_KEYS_URL) {
            config.keys_url = url;
        }
        if let Some(secs) = var(ENV_CACHE_SECS) {
            config.cache_ttl = Duration::from_secs(parse::<u64>(ENV_CACHE_SECS, &secs)?);
        }
        if let Some(bytes) = var(ENV_MAX_TOKEN_BYTES) {
            config.max_token_size = match parse::<usize>(ENV_MAX_TOKEN_BYTES, &bytes)? {
                0 => None,
                max => Some(max),
            };
        }
        if let Some(secs) = var(ENV_FETCH_TIMEOUT_SECS) {
            config.fetch_timeout = Some(Duration::from_secs(parse::<u64>(
                ENV_FETCH_TIMEOUT_SECS,
                &secs,
            )?));
        }

        Ok(config)
    }
}

fn parse<T>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::InvalidVar {
        name,
        reason: e.to_string(),
    })
}
