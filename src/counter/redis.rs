//! Redis-backed shared counter.

use std::future::Future;
use std::time::Duration;

use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use url::Url;

use crate::counter::{CounterError, RequestCounter};

/// Key namespace shared by every worker process.
const NAMESPACE: &str = "shared-counter";

/// Counter over a single Redis key, safe for concurrent writers.
///
/// Increment uses Redis's native `INCR`; a read-modify-write against the
/// shared key would lose updates between workers.
pub struct RedisCounter {
    connection: ConnectionManager,
    key: String,
    op_timeout: Duration,
}

impl RedisCounter {
    /// Connect to the counter backend.
    ///
    /// The connection attempt itself is bounded by `op_timeout`; an
    /// unreachable backend fails startup rather than degrading silently.
    pub async fn connect(url: &Url, name: &str, op_timeout: Duration) -> Result<Self, CounterError> {
        let client = redis::Client::open(url.as_str())?;
        let connection = tokio::time::timeout(op_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| CounterError::Timeout(op_timeout))??;

        Ok(Self {
            connection,
            key: format!("{NAMESPACE}:{name}"),
            op_timeout,
        })
    }

    /// The fully namespaced Redis key this counter lives under.
    pub fn key(&self) -> &str {
        &self.key
    }

    async fn bounded<T, F>(&self, operation: F) -> Result<T, CounterError>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        tokio::time::timeout(self.op_timeout, operation)
            .await
            .map_err(|_| CounterError::Timeout(self.op_timeout))?
            .map_err(CounterError::from)
    }
}

#[async_trait::async_trait]
impl RequestCounter for RedisCounter {
    async fn get(&self) -> Result<u64, CounterError> {
        let mut connection = self.connection.clone();
        let key = self.key.clone();
        let value: Option<u64> = self.bounded(async move { connection.get(&key).await }).await?;
        Ok(value.unwrap_or(0))
    }

    async fn increment(&self) -> Result<(), CounterError> {
        let mut connection = self.connection.clone();
        let key = self.key.clone();
        let _: u64 = self
            .bounded(async move { connection.incr(&key, 1u64).await })
            .await?;
        Ok(())
    }

    async fn reset(&self) -> Result<(), CounterError> {
        let mut connection = self.connection.clone();
        let key = self.key.clone();
        let _: () = self.bounded(async move { connection.del(&key).await }).await?;
        Ok(())
    }

    async fn fetch_increment(&self) -> Result<u64, CounterError> {
        let mut connection = self.connection.clone();
        let key = self.key.clone();
        let after: u64 = self
            .bounded(async move { connection.incr(&key, 1u64).await })
            .await?;
        Ok(after - 1)
    }
}
