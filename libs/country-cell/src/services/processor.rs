use std::sync::Arc;

use chrono::Utc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use shared_database::{AppointmentRow, CountryConnection, CountryDatabase};
use shared_messaging::EventBus;
use shared_models::{AppointmentConfirmation, CountryIso, DomainEvent};

use crate::error::CountryProcessingError;
use crate::models::AppointmentData;

/// Persists appointments into the country's relational store and publishes
/// the completion confirmation.
///
/// The connection is established lazily on first use and cached for the
/// lifetime of the processor.
pub struct CountryProcessor {
    country: CountryIso,
    database: Arc<dyn CountryDatabase>,
    event_bus: Arc<dyn EventBus>,
    connection: OnceCell<Arc<dyn CountryConnection>>,
}

impl CountryProcessor {
    pub fn new(
        country: CountryIso,
        database: Arc<dyn CountryDatabase>,
        event_bus: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            country,
            database,
            event_bus,
            connection: OnceCell::new(),
        }
    }

    async fn connection(&self) -> Result<&Arc<dyn CountryConnection>, CountryProcessingError> {
        self.connection
            .get_or_try_init(|| async {
                debug!(country = %self.country, "Opening country database connection");
                self.database
                    .connect()
                    .await
                    .map_err(|e| CountryProcessingError::Database(e.to_string()))
            })
            .await
    }

    /// Upserts the appointment: existing rows get their status refreshed,
    /// new appointments are inserted as completed for this country.
    pub async fn process_appointment(
        &self,
        appointment: &AppointmentData,
    ) -> Result<(), CountryProcessingError> {
        let connection = self.connection().await?;

        let existing = connection
            .find_by_id(&appointment.id)
            .await
            .map_err(|e| CountryProcessingError::Database(e.to_string()))?;

        match existing {
            Some(_) => {
                info!(
                    country = %self.country,
                    appointment_id = %appointment.id,
                    "Appointment already stored, refreshing status"
                );
                connection
                    .update_status(&appointment.id, "completed")
                    .await
                    .map_err(|e| CountryProcessingError::Database(e.to_string()))?;
            }
            None => {
                let now = Utc::now();
                let row = AppointmentRow {
                    id: appointment.id.clone(),
                    insured_id: appointment.insured_id.clone(),
                    schedule_id: appointment.schedule_id,
                    country_iso: self.country,
                    status: "completed".to_string(),
                    created_at: appointment.created_at,
                    updated_at: now,
                };
                connection
                    .insert(row)
                    .await
                    .map_err(|e| CountryProcessingError::Database(e.to_string()))?;
                info!(
                    country = %self.country,
                    appointment_id = %appointment.id,
                    "Appointment stored in country database"
                );
            }
        }

        Ok(())
    }

    /// Publishes the completion confirmation event for downstream
    /// orchestration. Returns the published event id.
    pub async fn send_confirmation(
        &self,
        appointment: &AppointmentData,
    ) -> Result<String, CountryProcessingError> {
        let confirmation = AppointmentConfirmation {
            appointment_id: appointment.id.clone(),
            status: "completed".to_string(),
            completed_at: Utc::now(),
        };

        let event = DomainEvent::appointment_completed(&confirmation);
        let event_id = self
            .event_bus
            .publish(event)
            .await
            .map_err(|e| CountryProcessingError::Confirmation(e.to_string()))?;

        info!(
            country = %self.country,
            appointment_id = %appointment.id,
            event_id = %event_id,
            "Completion confirmation published"
        );

        Ok(event_id)
    }
}
