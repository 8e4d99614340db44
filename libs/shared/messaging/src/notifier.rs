use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use shared_config::AppConfig;

use crate::error::MessagingError;
use crate::queue::MessageQueue;

/// Per-country notification channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationChannel {
    Peru,
    Chile,
    General,
}

#[derive(Debug, Clone)]
pub struct NotificationContent {
    pub id: String,
    pub subject: Option<String>,
    pub body: Value,
    pub timestamp: DateTime<Utc>,
}

/// Wire envelope wrapping one notification on a queue channel. Fields
/// default to empty so consumers can reject malformed envelopes with a
/// domain error instead of a deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEnvelope {
    #[serde(rename = "Type", default)]
    pub message_type: String,
    #[serde(rename = "MessageId", default)]
    pub message_id: String,
    #[serde(rename = "Subject", default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(rename = "Message", default)]
    pub message: String,
    #[serde(rename = "Timestamp", default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(
        rename = "MessageAttributes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub attributes: Option<HashMap<String, String>>,
}

pub const NOTIFICATION_TYPE: &str = "Notification";

/// Outbound notification port.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Sends one notification and returns the platform message id.
    async fn send(
        &self,
        channel: NotificationChannel,
        content: NotificationContent,
        attributes: HashMap<String, String>,
    ) -> Result<String, MessagingError>;
}

/// Notification sender that wraps content in a [`NotificationEnvelope`]
/// and fans it out onto the channel's queue.
pub struct QueueNotificationSender {
    queue: Arc<dyn MessageQueue>,
    peru_channel: String,
    chile_channel: String,
    general_channel: String,
}

impl QueueNotificationSender {
    pub fn new(queue: Arc<dyn MessageQueue>, config: &AppConfig) -> Self {
        Self {
            queue,
            peru_channel: config.peru_queue_channel.clone(),
            chile_channel: config.chile_queue_channel.clone(),
            general_channel: "appointments.general".to_string(),
        }
    }

    fn channel_name(&self, channel: NotificationChannel) -> &str {
        match channel {
            NotificationChannel::Peru => &self.peru_channel,
            NotificationChannel::Chile => &self.chile_channel,
            NotificationChannel::General => &self.general_channel,
        }
    }
}

#[async_trait]
impl NotificationSender for QueueNotificationSender {
    async fn send(
        &self,
        channel: NotificationChannel,
        content: NotificationContent,
        attributes: HashMap<String, String>,
    ) -> Result<String, MessagingError> {
        let message_id = Uuid::new_v4().to_string();
        let envelope = NotificationEnvelope {
            message_type: NOTIFICATION_TYPE.to_string(),
            message_id: message_id.clone(),
            subject: content.subject,
            message: serde_json::to_string(&content.body)?,
            timestamp: Some(content.timestamp),
            attributes: if attributes.is_empty() {
                None
            } else {
                Some(attributes)
            },
        };

        let channel_name = self.channel_name(channel);
        self.queue
            .push(channel_name, serde_json::to_string(&envelope)?)
            .await?;

        info!(
            "Notification {} dispatched to channel {}",
            message_id, channel_name
        );
        Ok(message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::InMemoryMessageQueue;

    #[tokio::test]
    async fn send_wraps_content_in_a_notification_envelope() {
        let queue = Arc::new(InMemoryMessageQueue::new());
        let sender = QueueNotificationSender::new(queue.clone(), &AppConfig::default());

        let content = NotificationContent {
            id: "apt-1".to_string(),
            subject: Some("New appointment".to_string()),
            body: serde_json::json!({"id": "apt-1", "countryISO": "PE"}),
            timestamp: Utc::now(),
        };

        let message_id = sender
            .send(NotificationChannel::Peru, content, HashMap::new())
            .await
            .unwrap();

        let batch = queue.pop_batch("appointments.pe", 1).await.unwrap();
        let envelope: NotificationEnvelope = serde_json::from_str(&batch[0]).unwrap();

        assert_eq!(envelope.message_type, NOTIFICATION_TYPE);
        assert_eq!(envelope.message_id, message_id);
        let body: Value = serde_json::from_str(&envelope.message).unwrap();
        assert_eq!(body["countryISO"], "PE");
    }

    #[tokio::test]
    async fn chile_notifications_land_on_the_chile_channel() {
        let queue = Arc::new(InMemoryMessageQueue::new());
        let sender = QueueNotificationSender::new(queue.clone(), &AppConfig::default());

        let content = NotificationContent {
            id: "apt-2".to_string(),
            subject: None,
            body: serde_json::json!({"id": "apt-2"}),
            timestamp: Utc::now(),
        };
        sender
            .send(NotificationChannel::Chile, content, HashMap::new())
            .await
            .unwrap();

        assert_eq!(queue.len("appointments.cl").await, 1);
        assert_eq!(queue.len("appointments.pe").await, 0);
    }
}
