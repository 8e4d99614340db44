use std::env;
use tracing::warn;

/// Environment-driven application configuration. Missing variables fall
/// back to local-development defaults with a warning.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_port: u16,
    /// When unset, the in-memory queue transport is used instead of Redis.
    pub redis_url: Option<String>,
    pub peru_queue_channel: String,
    pub chile_queue_channel: String,
    pub completion_queue_channel: String,
    pub consumer_batch_size: usize,
    pub consumer_poll_interval_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_port: 3000,
            redis_url: None,
            peru_queue_channel: "appointments.pe".to_string(),
            chile_queue_channel: "appointments.cl".to_string(),
            completion_queue_channel: "appointments.completed".to_string(),
            consumer_batch_size: 10,
            consumer_poll_interval_ms: 250,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let http_port = match env::var("HTTP_PORT") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("HTTP_PORT is not a valid port, using {}", defaults.http_port);
                defaults.http_port
            }),
            Err(_) => defaults.http_port,
        };

        let redis_url = env::var("REDIS_URL").ok();
        if redis_url.is_none() {
            warn!("REDIS_URL not set, falling back to the in-memory queue");
        }

        let consumer_batch_size = env::var("CONSUMER_BATCH_SIZE")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(defaults.consumer_batch_size);

        let consumer_poll_interval_ms = env::var("CONSUMER_POLL_INTERVAL_MS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(defaults.consumer_poll_interval_ms);

        Self {
            http_port,
            redis_url,
            peru_queue_channel: env::var("PERU_QUEUE_CHANNEL")
                .unwrap_or(defaults.peru_queue_channel),
            chile_queue_channel: env::var("CHILE_QUEUE_CHANNEL")
                .unwrap_or(defaults.chile_queue_channel),
            completion_queue_channel: env::var("COMPLETION_QUEUE_CHANNEL")
                .unwrap_or(defaults.completion_queue_channel),
            consumer_batch_size,
            consumer_poll_interval_ms,
        }
    }

    pub fn is_redis_configured(&self) -> bool {
        self.redis_url.is_some()
    }
}
