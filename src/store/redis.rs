//! RedisStore - Adapter Redis per il [`KeyValueStore`]

use super::{KeyValueStore, StoreError};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

/// Redis-backed store. Connections are multiplexed through a
/// [`ConnectionManager`], which reconnects on its own after network failures.
///
/// Every command is bounded by `op_timeout`; an elapsed timeout is reported
/// as [`StoreError::Timeout`] so that callers can fail closed instead of
/// hanging on a dead backend.
#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
    op_timeout: Duration,
}

impl RedisStore {
    pub async fn connect(url: &str, op_timeout: Duration) -> Result<Self, StoreError> {
        let client =
            redis::Client::open(url).map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        info!("Connected to Redis key-value store");

        Ok(Self {
            manager,
            op_timeout,
        })
    }

    async fn bounded<T>(
        &self,
        fut: impl Future<Output = redis::RedisResult<T>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(StoreError::Unavailable(e.to_string())),
            Err(_) => Err(StoreError::Timeout),
        }
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let mut conn = self.manager.clone();
        let ttl_secs = ttl.as_secs().max(1);

        // SET key value NX EX ttl: risponde OK se ha scritto, nil altrimenti
        let reply: Option<String> = self
            .bounded(async move {
                redis::cmd("SET")
                    .arg(key)
                    .arg(value)
                    .arg("NX")
                    .arg("EX")
                    .arg(ttl_secs)
                    .query_async(&mut conn)
                    .await
            })
            .await?;

        debug!(key, written = reply.is_some(), "set_if_absent");
        Ok(reply.is_some())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.manager.clone();

        let value: Option<String> = self
            .bounded(async move { redis::cmd("GET").arg(key).query_async(&mut conn).await })
            .await?;

        Ok(value)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.manager.clone();

        let deleted: u64 = self
            .bounded(async move { redis::cmd("DEL").arg(key).query_async(&mut conn).await })
            .await?;

        debug!(key, deleted, "delete");
        Ok(())
    }
}
