pub mod bus;
pub mod error;
pub mod notifier;
pub mod queue;

pub use bus::{EventBus, QueueEventBus, RecordingEventBus};
pub use error::MessagingError;
pub use notifier::{
    NotificationChannel, NotificationContent, NotificationEnvelope, NotificationSender,
    QueueNotificationSender, NOTIFICATION_TYPE,
};
pub use queue::{InMemoryMessageQueue, MessageQueue, RedisMessageQueue};
