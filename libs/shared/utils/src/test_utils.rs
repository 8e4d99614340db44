use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::{AppointmentEntity, AppointmentStatus, CountryIso};

pub fn test_config() -> Arc<AppConfig> {
    Arc::new(AppConfig::default())
}

/// A pending appointment created a fixed interval in the past, so
/// processing-time calculations in tests are deterministic enough.
pub fn pending_appointment(country: CountryIso) -> AppointmentEntity {
    let mut appointment = AppointmentEntity::create_pending(
        Uuid::new_v4().to_string(),
        "12345".to_string(),
        1001,
        country,
    );
    appointment.created_at = Utc::now() - Duration::minutes(30);
    appointment
}

pub fn appointment_with_status(
    country: CountryIso,
    status: AppointmentStatus,
) -> AppointmentEntity {
    pending_appointment(country).with_status(status)
}

/// Wire-shape JSON for a created-appointment payload, as it travels inside
/// a notification envelope.
pub fn appointment_payload_json(appointment: &AppointmentEntity) -> String {
    serde_json::to_string(appointment).expect("appointment serializes")
}

/// Wire-shape JSON for a completion-confirmation envelope.
pub fn confirmation_envelope_json(appointment_id: &str) -> String {
    json!({
        "id": Uuid::new_v4().to_string(),
        "detail-type": "appointment.completed",
        "source": "appointments.booking",
        "detail": {
            "appointmentId": appointment_id,
            "status": "completed",
            "completedAt": Utc::now(),
        }
    })
    .to_string()
}
