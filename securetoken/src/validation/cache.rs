//! Time-bounded caching of the public key set
use std::{
    fmt,
    sync::{
        Arc,
        RwLock,
    },
    time::Duration,
};

use tokio::sync::Mutex;
use tracing::{
    debug,
    info,
    warn,
};

use crate::{
    clock::{
        Clock,
        SystemClock,
    },
    error::TokenError,
    validation::{
        KeySetFetcher,
        KeySetProvider,
        PublicKeySet,
    },
};

/// Certificates rotate roughly daily; one hour keeps a fetch off the hot path
/// while picking up a new signing key well before it is used.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Storage for one generation of the key set
///
/// Injected into [`CachingKeySetProvider`] so the process decides where the
/// set lives (in memory by default).
pub trait KeySetCache: Send + Sync {
    /// Cached set, if one is stored and `expires_at > now`
    fn get(&self, now: i64) -> Option<Arc<PublicKeySet>>;

    /// Replaces the stored set
    fn set(&self, keys: Arc<PublicKeySet>, expires_at: i64);

    /// Expiry of the stored set in unix seconds, if one is stored
    fn expires_at(&self) -> Option<i64>;
}

struct Entry {
    keys: Arc<PublicKeySet>,
    expires_at: i64,
}

/// Process-local [`KeySetCache`]
#[derive(Default)]
pub struct InMemoryKeySetCache {
    entry: RwLock<Option<Entry>>,
}

impl InMemoryKeySetCache {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entry: RwLock::new(None),
        }
    }
}

impl fmt::Debug for InMemoryKeySetCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryKeySetCache")
            .field("expires_at", &self.expires_at())
            .finish_non_exhaustive()
    }
}

// a writer never panics mid-update, so a poisoned lock still holds a whole entry
impl KeySetCache for InMemoryKeySetCache {
    fn get(&self, now: i64) -> Option<Arc<PublicKeySet>> {
        let entry = self
            .entry
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entry
            .as_ref()
            .filter(|entry| entry.expires_at > now)
            .map(|entry| Arc::clone(&entry.keys))
    }

    fn set(&self, keys: Arc<PublicKeySet>, expires_at: i64) {
        let mut entry = self
            .entry
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *entry = Some(Entry { keys, expires_at });
    }

    fn expires_at(&self) -> Option<i64> {
        self.entry
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .as_ref()
            .map(|entry| entry.expires_at)
    }
}

/// [`KeySetProvider`] serving a cached key set and refreshing it through a
/// [`KeySetFetcher`] once it expires
///
/// Refreshes are single-flight: concurrent callers that find the cache
/// expired queue on one lock, the first performs the fetch and the rest read
/// its result. A failed refresh is returned to the caller that attempted it;
/// the expired set is never served.
pub struct CachingKeySetProvider<F, S = InMemoryKeySetCache> {
    fetcher: F,
    cache: S,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    refresh: Mutex<()>,
}

impl<F: KeySetFetcher> CachingKeySetProvider<F> {
    /// Provider with an in-memory cache, [`DEFAULT_CACHE_TTL`] and the system clock
    pub fn new(fetcher: F) -> Self {
        Self::with_cache(fetcher, InMemoryKeySetCache::new())
    }
}

impl<F, S> CachingKeySetProvider<F, S>
where
    F: KeySetFetcher,
    S: KeySetCache,
{
    /// Provider storing its key set in `cache`
    pub fn with_cache(fetcher: F, cache: S) -> Self {
        Self {
            fetcher,
            cache,
            ttl: DEFAULT_CACHE_TTL,
            clock: Arc::new(SystemClock),
            refresh: Mutex::new(()),
        }
    }

    /// Sets how long a fetched set is served before the next fetch
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the clock cache expiry is measured against
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub const fn fetcher(&self) -> &F {
        &self.fetcher
    }

    #[must_use]
    pub const fn cache(&self) -> &S {
        &self.cache
    }

    fn ttl_secs(&self) -> i64 {
        i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX)
    }
}

impl<F, S> KeySetProvider for CachingKeySetProvider<F, S>
where
    F: KeySetFetcher + Send + Sync,
    S: KeySetCache,
{
    async fn key_set(&self) -> Result<Arc<PublicKeySet>, TokenError> {
        if let Some(keys) = self.cache.get(self.clock.now()) {
            debug!("using cached public key set");
            return Ok(keys);
        }

        let _guard = self.refresh.lock().await;

        // another caller may have refreshed while this one waited
        let now = self.clock.now();
        if let Some(keys) = self.cache.get(now) {
            debug!("using public key set refreshed by concurrent caller");
            return Ok(keys);
        }

        info!("public key set expired or absent, fetching");
        let keys = match self.fetcher.fetch().await {
            Ok(keys) => Arc::new(keys),
            Err(e) => {
                warn!(error = %e, "public key set refresh failed");
                return Err(e.into());
            }
        };

        let expires_at = now.saturating_add(self.ttl_secs());
        self.cache.set(Arc::clone(&keys), expires_at);
        info!(key_count = keys.len(), expires_at, "public key set refreshed");

        Ok(keys)
    }
}

impl<F: fmt::Debug, S: fmt::Debug> fmt::Debug for CachingKeySetProvider<F, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachingKeySetProvider")
            .field("fetcher", &self.fetcher)
            .field("cache", &self.cache)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
