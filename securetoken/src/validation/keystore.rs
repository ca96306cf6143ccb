//! Provides [`PublicKeySet`] and the [`KeySetProvider`] seam the verifier
//! resolves signing certificates through
use std::{
    collections::BTreeMap,
    future::Future,
    sync::Arc,
};

use serde::{
    Deserialize,
    Serialize,
};

use crate::error::TokenError;

/// Mapping of `kid` to PEM-encoded X.509 certificate
///
/// Deserializes directly from the key endpoint's response body
/// (`{ "<kid>": "-----BEGIN CERTIFICATE-----\n...", ... }`). A set is never
/// mutated once published to a cache; refreshes replace it wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicKeySet {
    certificates: BTreeMap<String, String>,
}

impl PublicKeySet {
    /// Instantiates a new, empty [`PublicKeySet`]
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            certificates: BTreeMap::new(),
        }
    }

    /// PEM certificate for `kid`
    #[must_use]
    pub fn get(&self, kid: &str) -> Option<&str> {
        self.certificates.get(kid).map(String::as_str)
    }

    /// Key IDs in ascending order
    pub fn kids(&self) -> impl Iterator<Item = &str> {
        self.certificates.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }
}

impl From<BTreeMap<String, String>> for PublicKeySet {
    fn from(certificates: BTreeMap<String, String>) -> Self {
        Self { certificates }
    }
}

impl<K, V> FromIterator<(K, V)> for PublicKeySet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            certificates: iter
                .into_iter()
                .map(|(kid, pem)| (kid.into(), pem.into()))
                .collect(),
        }
    }
}

/// A [`KeySetProvider`] hands the verifier the key set current at the time
/// of the call.
pub trait KeySetProvider {
    /// Resolve the current [`PublicKeySet`].
    ///
    /// # Errors
    ///
    /// - [`TokenError::KeyFetchFailed`] when the set is not cached and cannot
    ///   be retrieved.
    fn key_set(&self) -> impl Future<Output = Result<Arc<PublicKeySet>, TokenError>> + Send;
}

/// Static provider that unconditionally returns a single [`PublicKeySet`]
#[derive(Debug, Clone)]
pub struct StaticKeySet {
    keys: Arc<PublicKeySet>,
}

impl StaticKeySet {
    /// Instantiate a new [`StaticKeySet`] wrapping the given [`PublicKeySet`].
    #[must_use]
    pub fn new(keys: PublicKeySet) -> Self {
        Self {
            keys: Arc::new(keys),
        }
    }
}

impl From<PublicKeySet> for StaticKeySet {
    fn from(value: PublicKeySet) -> Self {
        Self::new(value)
    }
}

impl KeySetProvider for StaticKeySet {
    async fn key_set(&self) -> Result<Arc<PublicKeySet>, TokenError> {
        Ok(Arc::clone(&self.keys))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::{
        collections::BTreeMap,
        sync::Arc,
    };

    use super::{
        KeySetProvider,
        PublicKeySet,
        StaticKeySet,
    };

    #[test]
    fn built_from_pairs() {
        assert!(PublicKeySet::empty().is_empty());

        // later pairs win on a repeated kid
        let keys = PublicKeySet::from_iter([
            ("key_b", "pem-b"),
            ("key_a", "pem-a"),
            ("key_a", "pem-a2"),
        ]);
        assert_eq!(keys.len(), 2);
        assert_eq!(keys.get("key_a"), Some("pem-a2"));
        assert_eq!(keys.get("key_c"), None);
        assert_eq!(keys.kids().collect::<Vec<_>>(), ["key_a", "key_b"]);

        let map = BTreeMap::from([
            ("key_a".to_owned(), "pem-a2".to_owned()),
            ("key_b".to_owned(), "pem-b".to_owned()),
        ]);
        assert_eq!(PublicKeySet::from(map), keys);
    }

    #[test]
    fn deserializes_endpoint_body() {
        let body = r#"{
            "a1b2": "-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----\n",
            "c3d4": "-----BEGIN CERTIFICATE-----\nBBBB\n-----END CERTIFICATE-----\n"
        }"#;
        let keys: PublicKeySet = serde_json::from_str(body).unwrap();
        assert_eq!(keys.kids().collect::<Vec<_>>(), ["a1b2", "c3d4"]);
        assert!(keys.get("c3d4").unwrap().contains("BBBB"));
    }

    #[test]
    fn rejects_non_string_certificates() {
        assert!(serde_json::from_str::<PublicKeySet>(r#"{"a1b2": 7}"#).is_err());
        assert!(serde_json::from_str::<PublicKeySet>(r#"["a1b2"]"#).is_err());
    }

    #[tokio::test]
    async fn static_provider_shares_one_set() {
        let provider = StaticKeySet::from(PublicKeySet::from_iter([("k", "pem")]));
        let first = provider.key_set().await.unwrap();
        let second = provider.key_set().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.get("k"), Some("pem"));
    }
}
