//! Retrieval of the published signing certificates
use std::{
    future::Future,
    net::IpAddr,
    time::Duration,
};

use tracing::{
    debug,
    warn,
};
use url::{
    Host,
    Url,
};

use crate::{
    error::{
        ConfigError,
        KeyFetchError,
    },
    validation::PublicKeySet,
};

/// Endpoint publishing the certificates that sign Firebase ID tokens
pub const DEFAULT_KEYS_URL: &str =
    "https://www.googleapis.com/robot/v1/metadata/x509/securetoken@system.gserviceaccount.com";

/// Source of a fresh [`PublicKeySet`]
///
/// Implementations perform exactly one retrieval per call; caching and
/// single-flight are layered on top by [`CachingKeySetProvider`].
///
/// [`CachingKeySetProvider`]: crate::validation::CachingKeySetProvider
pub trait KeySetFetcher {
    /// Retrieve the current key set.
    ///
    /// # Errors
    ///
    /// [`KeyFetchError`] when the request fails, the endpoint answers with a
    /// non-2xx status, or the body is not a JSON object of strings.
    fn fetch(&self) -> impl Future<Output = Result<PublicKeySet, KeyFetchError>> + Send;
}

/// [`KeySetFetcher`] issuing an HTTPS `GET` against the key endpoint
#[derive(Debug, Clone)]
pub struct HttpKeySetFetcher {
    url: Url,
    client: reqwest::Client,
}

impl HttpKeySetFetcher {
    /// Fetcher for [`DEFAULT_KEYS_URL`] without a request timeout.
    ///
    /// # Errors
    ///
    /// [`ConfigError::HttpClient`] when the TLS backend cannot be initialized.
    pub fn google() -> Result<Self, ConfigError> {
        Self::new(DEFAULT_KEYS_URL, None)
    }

    /// Fetcher for `url`. The URL must use `https` unless its host is a
    /// loopback address (`localhost`, `127.0.0.0/8`, `::1`), which is
    /// accepted over plain `http` for emulators.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidKeysUrl`] when `url` does not parse
    /// - [`ConfigError::InsecureKeysUrl`] when `url` is neither `https` nor
    ///   loopback `http`
    /// - [`ConfigError::HttpClient`] when the client cannot be built
    pub fn new(url: &str, timeout: Option<Duration>) -> Result<Self, ConfigError> {
        let url = Url::parse(url).map_err(|e| ConfigError::InvalidKeysUrl(e.to_string()))?;
        match url.scheme() {
            "https" => {}
            "http" if is_loopback(&url) => {}
            _ => return Err(ConfigError::InsecureKeysUrl(url.to_string())),
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self { url, client })
    }

    /// Endpoint this fetcher reads from
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }
}

fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(ip)) => IpAddr::V4(ip).is_loopback(),
        Some(Host::Ipv6(ip)) => IpAddr::V6(ip).is_loopback(),
        None => false,
    }
}

impl KeySetFetcher for HttpKeySetFetcher {
    async fn fetch(&self) -> Result<PublicKeySet, KeyFetchError> {
        debug!(url = %self.url, "requesting public key set");
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| {
                warn!(url = %self.url, error = %e, "public key set request failed");
                KeyFetchError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %self.url, %status, "public key endpoint returned error status");
            return Err(KeyFetchError::Status(status.as_u16()));
        }

        response.json::<PublicKeySet>().await.map_err(|e| {
            warn!(url = %self.url, error = %e, "public key set body could not be decoded");
            KeyFetchError::Body(e.to_string())
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::time::Duration;

    use super::{
        DEFAULT_KEYS_URL,
        HttpKeySetFetcher,
    };
    use crate::error::ConfigError;

    #[test]
    fn default_endpoint_is_https() {
        let fetcher = HttpKeySetFetcher::google().unwrap();
        assert_eq!(fetcher.url().as_str(), DEFAULT_KEYS_URL);
    }

    #[test]
    fn loopback_http_is_accepted() {
        for url in [
            "http://localhost:9099/keys",
            "http://127.0.0.1:8080/keys",
            "http://[::1]/keys",
        ] {
            HttpKeySetFetcher::new(url, Some(Duration::from_secs(2))).unwrap();
        }
    }

    #[test]
    fn remote_http_is_rejected() {
        let err = HttpKeySetFetcher::new("http://www.googleapis.com/keys", None).unwrap_err();
        assert!(matches!(err, ConfigError::InsecureKeysUrl(_)));

        let err = HttpKeySetFetcher::new("ftp://localhost/keys", None).unwrap_err();
        assert!(matches!(err, ConfigError::InsecureKeysUrl(_)));
    }

    #[test]
    fn unparsable_url_is_rejected() {
        let err = HttpKeySetFetcher::new("not a url", None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidKeysUrl(_)));
    }
}
