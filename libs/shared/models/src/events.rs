use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::appointment::AppointmentEntity;

/// Domain event types carried over the event bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "appointment.created")]
    AppointmentCreated,
    #[serde(rename = "appointment.completed")]
    AppointmentCompleted,
    #[serde(rename = "appointment.cancelled")]
    AppointmentCancelled,
    #[serde(rename = "appointment.updated")]
    AppointmentUpdated,
    #[serde(rename = "appointment.fully.completed")]
    AppointmentFullyCompleted,
    #[serde(rename = "appointment.completion.error")]
    AppointmentCompletionError,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::AppointmentCreated => "appointment.created",
            EventType::AppointmentCompleted => "appointment.completed",
            EventType::AppointmentCancelled => "appointment.cancelled",
            EventType::AppointmentUpdated => "appointment.updated",
            EventType::AppointmentFullyCompleted => "appointment.fully.completed",
            EventType::AppointmentCompletionError => "appointment.completion.error",
        }
    }
}

/// Confirmation payload published when a country processor finishes with
/// an appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentConfirmation {
    pub appointment_id: String,
    pub status: String,
    pub completed_at: DateTime<Utc>,
}

/// Envelope for every event crossing the bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    pub data: Value,
    pub source: String,
}

pub const APPOINTMENT_EVENT_SOURCE: &str = "appointments.booking";
pub const COMPLETION_EVENT_SOURCE: &str = "appointments.completion";

impl DomainEvent {
    pub fn new(event_type: EventType, data: Value, source: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_type,
            timestamp: Utc::now(),
            data,
            source: source.to_string(),
        }
    }

    pub fn appointment_created(appointment: &AppointmentEntity) -> Self {
        let data = serde_json::json!({
            "appointmentId": appointment.id,
            "insuredId": appointment.insured_id,
            "scheduleId": appointment.schedule_id,
            "countryISO": appointment.country_iso,
            "status": appointment.status,
            "createdAt": appointment.created_at,
        });
        Self::new(EventType::AppointmentCreated, data, APPOINTMENT_EVENT_SOURCE)
    }

    pub fn appointment_completed(confirmation: &AppointmentConfirmation) -> Self {
        let data = serde_json::to_value(confirmation)
            .expect("confirmation payload is always serializable");
        Self::new(EventType::AppointmentCompleted, data, APPOINTMENT_EVENT_SOURCE)
    }

    pub fn appointment_cancelled(appointment_id: &str) -> Self {
        let data = serde_json::json!({
            "appointmentId": appointment_id,
            "cancelledAt": Utc::now(),
        });
        Self::new(EventType::AppointmentCancelled, data, APPOINTMENT_EVENT_SOURCE)
    }
}
