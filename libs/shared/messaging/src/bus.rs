use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_models::{DomainEvent, EventType};

use crate::error::MessagingError;
use crate::queue::MessageQueue;

/// Event bus port. Publishing returns the id of the published event.
#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, event: DomainEvent) -> Result<String, MessagingError>;
}

/// Event bus that routes `appointment.completed` events onto the
/// completion queue as confirmation envelopes, mirroring a bus rule that
/// targets the confirmation consumer. All other events are logged and
/// dropped at this boundary.
pub struct QueueEventBus {
    queue: Arc<dyn MessageQueue>,
    completion_channel: String,
}

impl QueueEventBus {
    pub fn new(queue: Arc<dyn MessageQueue>, config: &AppConfig) -> Self {
        Self {
            queue,
            completion_channel: config.completion_queue_channel.clone(),
        }
    }
}

#[async_trait]
impl EventBus for QueueEventBus {
    async fn publish(&self, event: DomainEvent) -> Result<String, MessagingError> {
        let event_id = event.id.clone();

        if event.event_type == EventType::AppointmentCompleted {
            let envelope = serde_json::json!({
                "id": event.id,
                "detail-type": event.event_type.as_str(),
                "source": event.source,
                "time": Utc::now(),
                "detail": event.data,
            });
            self.queue
                .push(&self.completion_channel, envelope.to_string())
                .await?;
            info!(
                "Event {} routed to completion channel {}",
                event_id, self.completion_channel
            );
        } else {
            debug!(
                "Event {} ({}) published with no queue routing rule",
                event_id,
                event.event_type.as_str()
            );
        }

        Ok(event_id)
    }
}

/// Test double that records every published event.
#[derive(Default)]
pub struct RecordingEventBus {
    events: Mutex<Vec<DomainEvent>>,
}

impl RecordingEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().await.clone()
    }

    pub async fn count_of(&self, event_type: EventType) -> usize {
        self.events
            .lock()
            .await
            .iter()
            .filter(|event| event.event_type == event_type)
            .count()
    }
}

#[async_trait]
impl EventBus for RecordingEventBus {
    async fn publish(&self, event: DomainEvent) -> Result<String, MessagingError> {
        let event_id = event.id.clone();
        self.events.lock().await.push(event);
        Ok(event_id)
    }
}
