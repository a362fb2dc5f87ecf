use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::CacheError;

/// Boxed future returned by [`TtlCache`] operations.
pub type CacheFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CacheError>> + Send + 'a>>;

/// Key-value store with per-entry expiry.
///
/// `get` resolves to `Ok(None)` on a miss or an expired entry. Implementations
/// must be `Send + Sync`; one instance is shared by every cached component.
pub trait TtlCache: Send + Sync {
    fn get<'a>(&'a self, key: &'a str) -> CacheFuture<'a, Option<Vec<u8>>>;

    fn set<'a>(&'a self, key: &'a str, value: Vec<u8>, ttl: Duration) -> CacheFuture<'a, ()>;
}
