use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shared_models::{AppointmentEntity, AppointmentStatus, CountryIso};

pub use shared_models::ScheduleId;

/// Body of `POST /appointment`. Fields are optional so presence is checked
/// by the service, in validation order, rather than by the deserializer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    #[serde(default)]
    pub insured_id: Option<String>,
    #[serde(default)]
    pub schedule_id: Option<ScheduleId>,
    #[serde(default, rename = "countryISO")]
    pub country_iso: Option<String>,
}

/// Read model for one appointment, as returned by the query endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDto {
    pub id: String,
    pub insured_id: String,
    pub schedule_id: i64,
    #[serde(rename = "countryISO")]
    pub country_iso: CountryIso,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub is_pending: bool,
    pub is_completed: bool,
}

impl From<&AppointmentEntity> for AppointmentDto {
    fn from(appointment: &AppointmentEntity) -> Self {
        Self {
            id: appointment.id.clone(),
            insured_id: appointment.insured_id.clone(),
            schedule_id: appointment.schedule_id,
            country_iso: appointment.country_iso,
            status: appointment.status,
            created_at: appointment.created_at,
            is_pending: appointment.is_pending(),
            is_completed: appointment.is_completed(),
        }
    }
}
