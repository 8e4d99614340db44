use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{info, instrument};

use shared_messaging::{NotificationEnvelope, NOTIFICATION_TYPE};
use shared_models::is_valid_insured_id;

use crate::error::CountryProcessingError;
use crate::models::{AppointmentData, AppointmentMessage, CountryProfile, ProcessingStats};
use crate::services::processor::CountryProcessor;
use crate::services::rules::CountryBusinessRules;

/// Processes one country's queued appointment notifications end to end:
/// envelope validation, payload validation, business rules, persistence
/// and completion confirmation.
pub struct CountryAppointmentService {
    profile: CountryProfile,
    rules: Arc<dyn CountryBusinessRules>,
    processor: Arc<CountryProcessor>,
    stats: RwLock<ProcessingStats>,
}

impl CountryAppointmentService {
    pub fn new(
        profile: CountryProfile,
        rules: Arc<dyn CountryBusinessRules>,
        processor: Arc<CountryProcessor>,
    ) -> Self {
        Self {
            profile,
            rules,
            processor,
            stats: RwLock::new(ProcessingStats::default()),
        }
    }

    /// Handles one raw queue message: a JSON notification envelope whose
    /// `Message` field carries the appointment payload.
    #[instrument(skip(self, raw), fields(country = %self.profile.country))]
    pub async fn process_message(&self, raw: &str) -> Result<String, CountryProcessingError> {
        let envelope: NotificationEnvelope = serde_json::from_str(raw)
            .map_err(|e| CountryProcessingError::InvalidEnvelope(e.to_string()))?;
        let payload = Self::validate_envelope(&envelope)?;

        let message: AppointmentMessage = serde_json::from_str(payload)
            .map_err(|e| CountryProcessingError::InvalidPayload(e.to_string()))?;
        let appointment = self.validate_message(message)?;

        self.rules.apply(&appointment).await?;
        self.processor.process_appointment(&appointment).await?;
        let event_id = self.processor.send_confirmation(&appointment).await?;

        let mut stats = self.stats.write().await;
        stats.processed_count += 1;
        stats.last_processed_at = Some(Utc::now());
        drop(stats);

        info!(
            appointment_id = %appointment.id,
            event_id = %event_id,
            "Appointment processed for {}",
            self.profile.display_name
        );
        Ok(appointment.id)
    }

    pub async fn processing_stats(&self) -> ProcessingStats {
        self.stats.read().await.clone()
    }

    fn validate_envelope(
        envelope: &NotificationEnvelope,
    ) -> Result<&str, CountryProcessingError> {
        if envelope.message_type != NOTIFICATION_TYPE {
            return Err(CountryProcessingError::InvalidEnvelope(format!(
                "unexpected envelope type '{}'",
                envelope.message_type
            )));
        }
        if envelope.message_id.is_empty() {
            return Err(CountryProcessingError::InvalidEnvelope(
                "envelope is missing a message id".to_string(),
            ));
        }
        if envelope.message.is_empty() {
            return Err(CountryProcessingError::InvalidEnvelope(
                "envelope carries an empty message body".to_string(),
            ));
        }
        Ok(&envelope.message)
    }

    fn validate_message(
        &self,
        message: AppointmentMessage,
    ) -> Result<AppointmentData, CountryProcessingError> {
        let id = message
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                CountryProcessingError::InvalidPayload("missing appointment id".to_string())
            })?;
        let insured_id = message.insured_id.ok_or_else(|| {
            CountryProcessingError::InvalidPayload("missing insuredId".to_string())
        })?;
        let schedule_id = message.schedule_id.ok_or_else(|| {
            CountryProcessingError::InvalidPayload("missing scheduleId".to_string())
        })?;
        let country = message.country_iso.ok_or_else(|| {
            CountryProcessingError::InvalidPayload("missing countryISO".to_string())
        })?;
        let status = message.status.ok_or_else(|| {
            CountryProcessingError::InvalidPayload("missing status".to_string())
        })?;
        let created_at = message.created_at.ok_or_else(|| {
            CountryProcessingError::InvalidPayload("missing createdAt".to_string())
        })?;

        if country != self.profile.country.as_str() {
            return Err(CountryProcessingError::CountryMismatch {
                expected: self.profile.country,
                received: country,
            });
        }

        if !is_valid_insured_id(&insured_id) {
            return Err(CountryProcessingError::Validation(format!(
                "insuredId '{insured_id}' must be exactly 5 digits"
            )));
        }

        let schedule_id = schedule_id.as_positive().ok_or_else(|| {
            CountryProcessingError::Validation(
                "scheduleId must be a positive number".to_string(),
            )
        })?;

        Ok(AppointmentData {
            id,
            insured_id,
            schedule_id,
            country_iso: self.profile.country,
            status,
            created_at,
        })
    }
}
