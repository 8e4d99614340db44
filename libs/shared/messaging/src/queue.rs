use std::collections::{HashMap, VecDeque};
use std::num::NonZeroUsize;

use async_trait::async_trait;
use deadpool_redis::{Config, Pool, Runtime};
use redis::AsyncCommands;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::MessagingError;

/// Transport port for the queueing platform. Delivery is at-least-once;
/// redelivery and visibility timeouts belong to the platform, not to the
/// consumers built on top of this trait.
#[async_trait]
pub trait MessageQueue: Send + Sync {
    async fn push(&self, channel: &str, payload: String) -> Result<(), MessagingError>;

    /// Pops up to `max` messages in delivery order. Returns an empty batch
    /// when the channel is idle.
    async fn pop_batch(&self, channel: &str, max: usize) -> Result<Vec<String>, MessagingError>;
}

fn channel_key(channel: &str) -> String {
    format!("queue:{}", channel)
}

/// Redis-backed queue transport.
pub struct RedisMessageQueue {
    pool: Pool,
}

impl RedisMessageQueue {
    pub async fn new(redis_url: &str) -> Result<Self, MessagingError> {
        let cfg = Config::from_url(redis_url);
        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| MessagingError::Queue(format!("Failed to create Redis pool: {}", e)))?;

        // Probe the connection up front so a bad URL fails at startup.
        let mut conn = pool
            .get()
            .await
            .map_err(|e| MessagingError::Queue(format!("Failed to connect to Redis: {}", e)))?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;

        info!("Redis message queue initialized");
        Ok(Self { pool })
    }
}

#[async_trait]
impl MessageQueue for RedisMessageQueue {
    async fn push(&self, channel: &str, payload: String) -> Result<(), MessagingError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| MessagingError::Queue(format!("Failed to get Redis connection: {}", e)))?;

        let _: () = conn.lpush(channel_key(channel), payload).await?;
        debug!("Message pushed to channel {}", channel);
        Ok(())
    }

    async fn pop_batch(&self, channel: &str, max: usize) -> Result<Vec<String>, MessagingError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| MessagingError::Queue(format!("Failed to get Redis connection: {}", e)))?;

        let payloads: Vec<String> = conn
            .rpop(channel_key(channel), NonZeroUsize::new(max))
            .await?;
        Ok(payloads)
    }
}

/// In-process queue transport for local mode and tests.
#[derive(Debug, Default)]
pub struct InMemoryMessageQueue {
    channels: Mutex<HashMap<String, VecDeque<String>>>,
}

impl InMemoryMessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self, channel: &str) -> usize {
        let channels = self.channels.lock().await;
        channels.get(channel).map(VecDeque::len).unwrap_or(0)
    }
}

#[async_trait]
impl MessageQueue for InMemoryMessageQueue {
    async fn push(&self, channel: &str, payload: String) -> Result<(), MessagingError> {
        let mut channels = self.channels.lock().await;
        channels.entry(channel.to_string()).or_default().push_back(payload);
        Ok(())
    }

    async fn pop_batch(&self, channel: &str, max: usize) -> Result<Vec<String>, MessagingError> {
        let mut channels = self.channels.lock().await;
        let Some(pending) = channels.get_mut(channel) else {
            return Ok(Vec::new());
        };

        let take = max.min(pending.len());
        Ok(pending.drain(..take).collect())
    }
}
