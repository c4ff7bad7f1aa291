//! Redis service for session state

use async_trait::async_trait;
use redis::Client;

use super::sessions::SessionStore;
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct RedisService {
    client: Client,
    ttl_seconds: u64,
}

impl RedisService {
    /// Create a new Redis service
    pub async fn new(url: &str, ttl_seconds: u64) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Session(format!("Failed to create Redis client: {}", e)))?;

        // Test connection
        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Session(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Session(format!("Redis connection test failed: {}", e)))?;

        Ok(Self { client, ttl_seconds })
    }

    fn visits_key(session_id: &str) -> String {
        format!("session:{}:num_visits", session_id)
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Session(format!("Failed to get Redis connection: {}", e)))
    }
}

#[async_trait]
impl SessionStore for RedisService {
    async fn record_visit(&self, session_id: &str) -> AppResult<i64> {
        let mut conn = self.connection().await?;
        let key = Self::visits_key(session_id);

        // INCR and the expiry refresh run as one MULTI/EXEC block
        let (count, _): (i64, bool) = redis::pipe()
            .atomic()
            .incr(&key, 1)
            .expire(&key, self.ttl_seconds as i64)
            .query_async(&mut conn)
            .await
            .map_err(|e| AppError::Session(format!("Failed to count visit in Redis: {}", e)))?;

        Ok(count - 1)
    }
}
