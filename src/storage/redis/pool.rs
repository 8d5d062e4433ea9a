//! Redis connection management

use crate::config::RedisConfig;
use crate::utils::error::{GatewayError, Result};
use redis::{Client, aio::MultiplexedConnection};
use std::time::Duration;
use tracing::{debug, info};

/// Shared multiplexed Redis connection
#[derive(Clone)]
pub struct RedisPool {
    pub(crate) connection: MultiplexedConnection,
    pub(crate) config: RedisConfig,
}

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisPool")
            .field("url", &Self::sanitize_url(&self.config.url))
            .finish()
    }
}

impl RedisPool {
    /// Connect and verify the server answers
    pub async fn new(config: &RedisConfig) -> Result<Self> {
        info!("Connecting to Redis");
        debug!("Redis URL: {}", Self::sanitize_url(&config.url));

        let client = Client::open(config.url.as_str()).map_err(GatewayError::Redis)?;
        let timeout = Duration::from_secs(config.connection_timeout);

        let connection = tokio::time::timeout(timeout, client.get_multiplexed_async_connection())
            .await
            .map_err(|_| {
                GatewayError::storage(format!(
                    "Redis connection timed out after {}s",
                    config.connection_timeout
                ))
            })?
            .map_err(GatewayError::Redis)?;

        let pool = Self {
            connection,
            config: config.clone(),
        };
        tokio::time::timeout(timeout, pool.health_check())
            .await
            .map_err(|_| GatewayError::storage("Redis did not answer PING in time"))??;

        info!("Redis connection established");
        Ok(pool)
    }

    /// Handle to the shared connection
    pub fn connection(&self) -> MultiplexedConnection {
        self.connection.clone()
    }

    /// Health check
    pub async fn health_check(&self) -> Result<()> {
        debug!("Performing Redis health check");
        let mut conn = self.connection();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(GatewayError::Redis)?;

        debug!("Redis health check passed");
        Ok(())
    }

    /// Sanitize Redis URL for logging (hide password)
    pub(crate) fn sanitize_url(url: &str) -> String {
        if let Ok(parsed) = url::Url::parse(url) {
            let mut sanitized = parsed.clone();
            if sanitized.password().is_some() {
                let _ = sanitized.set_password(Some("***"));
            }
            sanitized.to_string()
        } else {
            "invalid_url".to_string()
        }
    }
}
