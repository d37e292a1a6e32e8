use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use redis::Client;
use tokio::sync::OnceCell;

use crate::db::store::{KeyValueStore, StoreKey};
use crate::error::AppResult;

/// Creates a Redis client for persisted state
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

const BACKOFF_BASE: u64 = 2;
const BACKOFF_FACTOR_MS: u64 = 100;
const CONNECT_RETRIES: usize = 2;

/// Redis-backed key-value store.
///
/// Every write is awaited before it returns, so a read issued after a
/// successful write sees it and a failed write surfaces as
/// [`AppError::Store`](crate::error::AppError::Store). The connection is opened on
/// first use and shared afterwards.
pub struct RedisStore {
    redis_client: Client,
    connection: OnceCell<ConnectionManager>,
}

impl RedisStore {
    pub fn new(redis_client: Client) -> Self {
        Self {
            redis_client,
            connection: OnceCell::new(),
        }
    }

    async fn connection(&self) -> AppResult<ConnectionManager> {
        let manager = self
            .connection
            .get_or_try_init(|| async {
                let manager = ConnectionManager::new_with_backoff(
                    self.redis_client.clone(),
                    BACKOFF_BASE,
                    BACKOFF_FACTOR_MS,
                    CONNECT_RETRIES,
                )
                .await?;
                tracing::info!("Connected to Redis");
                Ok::<_, redis::RedisError>(manager)
            })
            .await?;
        Ok(manager.clone())
    }
}

#[async_trait::async_trait]
impl KeyValueStore for RedisStore {
    async fn get_raw(&self, key: &StoreKey) -> AppResult<Option<String>> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.get(key.to_string()).await?;
        Ok(value)
    }

    async fn put_raw(&self, key: &StoreKey, value: String) -> AppResult<()> {
        let mut conn = self.connection().await?;
        let _: () = conn.set(key.to_string(), value).await.map_err(|e| {
            tracing::error!(error = %e, key = %key, "Failed to persist value to Redis");
            e
        })?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_create_redis_client_rejects_bad_url() {
        assert!(create_redis_client("not a redis url").is_err());
    }

    #[test]
    fn test_create_redis_client_accepts_url_without_connecting() {
        assert!(create_redis_client("redis://localhost:6379").is_ok());
    }

    #[tokio::test]
    async fn test_write_failure_is_reported() {
        let client = create_redis_client("redis://127.0.0.1:9").unwrap();
        let store = RedisStore::new(client);

        let result = store.put_raw(&StoreKey::Theme, "\"dark\"".to_string()).await;

        assert!(matches!(result, Err(AppError::Store(_))));
    }
}
