use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use shared_messaging::EventBus;
use shared_models::{AppointmentEntity, DomainEvent, EventType, COMPLETION_EVENT_SOURCE};

use crate::error::{classify_failure, CompletionError};
use crate::models::AppointmentCompletionData;

/// Publishes the terminal events of the completion pipeline.
pub struct CompletionEventPublisher {
    event_bus: Arc<dyn EventBus>,
}

impl CompletionEventPublisher {
    pub fn new(event_bus: Arc<dyn EventBus>) -> Self {
        Self { event_bus }
    }

    /// Publishes `appointment.fully.completed` once the whole pipeline has
    /// run. Returns the published event id.
    pub async fn publish_fully_completed(
        &self,
        appointment: &AppointmentEntity,
        data: &AppointmentCompletionData,
        finalized_at: DateTime<Utc>,
    ) -> Result<String, CompletionError> {
        let event = DomainEvent::new(
            EventType::AppointmentFullyCompleted,
            serde_json::json!({
                "appointmentId": appointment.id,
                "insuredId": appointment.insured_id,
                "countryISO": appointment.country_iso,
                "completedAt": data.completed_at,
                "finalizedAt": finalized_at,
            }),
            COMPLETION_EVENT_SOURCE,
        );

        let event_id = self
            .event_bus
            .publish(event)
            .await
            .map_err(|e| CompletionError::EventPublish(e.to_string()))?;

        info!(
            appointment_id = %appointment.id,
            event_id = %event_id,
            "Published fully-completed event"
        );
        Ok(event_id)
    }

    /// Best-effort `appointment.completion.error` event. A failed publish
    /// is logged and swallowed so it never masks the original error.
    pub async fn publish_completion_error(&self, appointment_id: &str, error: &CompletionError) {
        let message = error.to_string();
        let event = DomainEvent::new(
            EventType::AppointmentCompletionError,
            serde_json::json!({
                "appointmentId": appointment_id,
                "error": message,
                "errorType": classify_failure(&message),
                "occurredAt": Utc::now(),
            }),
            COMPLETION_EVENT_SOURCE,
        );

        if let Err(publish_error) = self.event_bus.publish(event).await {
            warn!(
                appointment_id = %appointment_id,
                error = %publish_error,
                "Could not publish completion-error event"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_messaging::RecordingEventBus;
    use shared_models::CountryIso;

    #[tokio::test]
    async fn error_events_carry_a_failure_classification() {
        let bus = Arc::new(RecordingEventBus::new());
        let publisher = CompletionEventPublisher::new(bus.clone());

        let error = CompletionError::Database("row vanished".to_string());
        publisher.publish_completion_error("apt-1", &error).await;

        let events = bus.events().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, EventType::AppointmentCompletionError);
        assert_eq!(events[0].data["errorType"], "database");
        assert_eq!(events[0].data["appointmentId"], "apt-1");
    }

    #[tokio::test]
    async fn fully_completed_events_carry_the_appointment_details() {
        let bus = Arc::new(RecordingEventBus::new());
        let publisher = CompletionEventPublisher::new(bus.clone());

        let appointment = AppointmentEntity::create_pending(
            "apt-2".to_string(),
            "12345".to_string(),
            1001,
            CountryIso::CL,
        );
        let data = AppointmentCompletionData {
            appointment_id: "apt-2".to_string(),
            status: "completed".to_string(),
            completed_at: Utc::now(),
            processing_time: None,
            country_iso: Some("CL".to_string()),
            metadata: None,
        };

        let event_id = publisher
            .publish_fully_completed(&appointment, &data, Utc::now())
            .await
            .unwrap();

        let events = bus.events().await;
        assert_eq!(events[0].id, event_id);
        assert_eq!(events[0].event_type, EventType::AppointmentFullyCompleted);
        assert_eq!(events[0].data["countryISO"], "CL");
        assert_eq!(events[0].source, COMPLETION_EVENT_SOURCE);
    }
}
