//! Generic cache-aside (read-through) component.
//!
//! Every cached port in panochart goes through [`CacheAside::read_through`], so the
//! fail-open contract is implemented exactly once:
//!
//! 1. build the key from the query;
//! 2. read the store; a hit is decoded as a whole or discarded as a whole;
//! 3. on miss, read failure or undecodable entry, call the loader;
//! 4. on loader success, encode and write back with the TTL (empty values included);
//! 5. on loader failure, return the error untouched and write nothing.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::{CacheError, TtlCache};

type KeyFn<Q> = Box<dyn Fn(&Q) -> String + Send + Sync>;
type EncodeFn<T> = Box<dyn Fn(&T) -> Result<Vec<u8>, CacheError> + Send + Sync>;
type DecodeFn<Q, T> = Box<dyn Fn(&Q, &[u8]) -> Result<T, CacheError> + Send + Sync>;

/// Key shape and payload codec for one cached call site.
///
/// The decoder receives the query as well as the bytes so payloads can omit
/// whatever the key already determines.
pub struct CachePolicy<Q: ?Sized, T> {
    key: KeyFn<Q>,
    encode: EncodeFn<T>,
    decode: DecodeFn<Q, T>,
}

impl<Q: ?Sized, T> CachePolicy<Q, T> {
    pub fn new(
        key: impl Fn(&Q) -> String + Send + Sync + 'static,
        encode: impl Fn(&T) -> Result<Vec<u8>, CacheError> + Send + Sync + 'static,
        decode: impl Fn(&Q, &[u8]) -> Result<T, CacheError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            key: Box::new(key),
            encode: Box::new(encode),
            decode: Box::new(decode),
        }
    }

    pub fn key(&self, query: &Q) -> String {
        (self.key)(query)
    }
}

impl<Q, T> CachePolicy<Q, T>
where
    Q: ?Sized + 'static,
    T: Serialize + DeserializeOwned + 'static,
{
    /// Policy whose payload is the JSON form of `T`.
    pub fn json(key: impl Fn(&Q) -> String + Send + Sync + 'static) -> Self {
        Self::new(
            key,
            |value: &T| serde_json::to_vec(value).map_err(CacheError::encode),
            |_: &Q, bytes: &[u8]| serde_json::from_slice(bytes).map_err(CacheError::decode),
        )
    }
}

/// Read-through wrapper shared by all cached ports.
pub struct CacheAside<Q: ?Sized, T> {
    name: &'static str,
    store: Arc<dyn TtlCache>,
    ttl: Duration,
    policy: CachePolicy<Q, T>,
}

impl<Q: ?Sized, T> fmt::Debug for CacheAside<Q, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheAside")
            .field("name", &self.name)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl<Q: ?Sized, T> CacheAside<Q, T> {
    pub fn new(
        name: &'static str,
        store: Arc<dyn TtlCache>,
        ttl: Duration,
        policy: CachePolicy<Q, T>,
    ) -> Self {
        Self {
            name,
            store,
            ttl,
            policy,
        }
    }

    pub fn key_for(&self, query: &Q) -> String {
        self.policy.key(query)
    }

    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached value for `query`, or runs `load` and caches its result.
    ///
    /// Only `load`'s own error can be returned; cache failures are logged and skipped.
    pub async fn read_through<E, F, Fut>(&self, query: &Q, load: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = self.policy.key(query);

        match self.store.get(&key).await {
            Ok(Some(bytes)) => match (self.policy.decode)(query, &bytes) {
                Ok(value) => {
                    debug!(cache = self.name, key = %key, "cache hit");
                    return Ok(value);
                }
                Err(error) => {
                    warn!(cache = self.name, key = %key, %error, "discarding undecodable cache entry");
                }
            },
            Ok(None) => debug!(cache = self.name, key = %key, "cache miss"),
            Err(error) => {
                warn!(cache = self.name, key = %key, %error, "cache read failed, loading from source");
            }
        }

        let value = load().await?;

        match (self.policy.encode)(&value) {
            Ok(bytes) => {
                if let Err(error) = self.store.set(&key, bytes, self.ttl).await {
                    warn!(cache = self.name, key = %key, %error, "cache write failed");
                }
            }
            Err(error) => warn!(cache = self.name, key = %key, %error, "cache encode failed"),
        }

        Ok(value)
    }
}
