//! Redis-backed TTL store.

use std::time::Duration;

use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tokio::sync::OnceCell;

use crate::store::{CacheFuture, TtlCache};
use crate::CacheError;

/// [`TtlCache`] over a lazily opened multiplexed Redis connection.
///
/// Construct once at startup and share by `Arc`; the connection is opened on
/// first use so an unreachable server only surfaces as cache errors.
pub struct RedisCache {
    client: redis::Client,
    connection: OnceCell<MultiplexedConnection>,
}

impl RedisCache {
    pub fn open(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)?;
        Ok(Self {
            client,
            connection: OnceCell::new(),
        })
    }

    async fn connection(&self) -> Result<MultiplexedConnection, CacheError> {
        let connection = self
            .connection
            .get_or_try_init(|| async {
                self.client
                    .get_multiplexed_async_connection()
                    .await
                    .map_err(CacheError::from)
            })
            .await?;
        Ok(connection.clone())
    }
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache")
            .field("connected", &self.connection.initialized())
            .finish()
    }
}

impl TtlCache for RedisCache {
    fn get<'a>(&'a self, key: &'a str) -> CacheFuture<'a, Option<Vec<u8>>> {
        Box::pin(async move {
            let mut connection = self.connection().await?;
            let value: Option<Vec<u8>> = connection.get(key).await?;
            Ok(value)
        })
    }

    fn set<'a>(&'a self, key: &'a str, value: Vec<u8>, ttl: Duration) -> CacheFuture<'a, ()> {
        Box::pin(async move {
            // SETEX rejects a zero expiry.
            let seconds = ttl.as_secs().max(1);
            let mut connection = self.connection().await?;
            connection.set_ex::<_, _, ()>(key, value, seconds).await?;
            Ok(())
        })
    }
}
