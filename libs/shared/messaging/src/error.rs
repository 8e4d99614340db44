use thiserror::Error;

#[derive(Error, Debug)]
pub enum MessagingError {
    #[error("Queue operation failed: {0}")]
    Queue(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Redis connection error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Event publish failed: {0}")]
    Publish(String),
}
