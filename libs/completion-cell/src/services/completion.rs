use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use shared_database::AppointmentRepository;
use shared_models::{AppointmentEntity, AppointmentStatus};

use crate::error::CompletionError;
use crate::models::{
    AppointmentCompletionData, CompletionHealth, CompletionStats, ConfirmationEnvelope,
    RawConfirmationDetail, CONFIRMATION_DETAIL_TYPE,
};
use crate::services::metrics::CompletionMetrics;
use crate::services::publisher::CompletionEventPublisher;
use crate::services::rules::CompletionRulesDispatcher;
use crate::services::validator::validate_completion_state;

/// Repository probe id used by the health check. Looking it up and getting
/// a clean not-found still proves the store answers.
const HEALTH_PROBE_ID: &str = "health-check-probe";

/// Final stage of the booking workflow: takes a country processor's
/// confirmation, moves the appointment to `completed`, records metrics,
/// runs country rules and publishes the terminal event.
pub struct AppointmentCompletionService {
    repository: Arc<dyn AppointmentRepository>,
    metrics: Arc<CompletionMetrics>,
    rules: Arc<CompletionRulesDispatcher>,
    publisher: Arc<CompletionEventPublisher>,
}

impl AppointmentCompletionService {
    pub fn new(
        repository: Arc<dyn AppointmentRepository>,
        metrics: Arc<CompletionMetrics>,
        rules: Arc<CompletionRulesDispatcher>,
        publisher: Arc<CompletionEventPublisher>,
    ) -> Self {
        Self {
            repository,
            metrics,
            rules,
            publisher,
        }
    }

    /// Handles one raw confirmation envelope from the completion channel.
    pub async fn process_confirmation_envelope(
        &self,
        raw: &str,
    ) -> Result<(), CompletionError> {
        let envelope: ConfirmationEnvelope = serde_json::from_str(raw)
            .map_err(|e| CompletionError::InvalidEnvelope(e.to_string()))?;

        if envelope.detail_type != CONFIRMATION_DETAIL_TYPE {
            return Err(CompletionError::InvalidEnvelope(format!(
                "unexpected detail-type '{}'",
                envelope.detail_type
            )));
        }
        let detail = envelope.detail.ok_or_else(|| {
            CompletionError::InvalidEnvelope("envelope has no detail".to_string())
        })?;

        let raw_detail: RawConfirmationDetail = serde_json::from_value(detail)
            .map_err(|e| CompletionError::InvalidEnvelope(e.to_string()))?;
        let data = AppointmentCompletionData::from_raw(raw_detail)?;

        self.complete_appointment(data).await
    }

    /// Runs the completion pipeline for one validated confirmation. On any
    /// failure a best-effort completion-error event is published before the
    /// error propagates.
    #[instrument(skip(self, data), fields(appointment_id = %data.appointment_id))]
    pub async fn complete_appointment(
        &self,
        data: AppointmentCompletionData,
    ) -> Result<(), CompletionError> {
        let appointment_id = data.appointment_id.clone();
        match self.run_pipeline(&data).await {
            Ok(()) => Ok(()),
            Err(error) => {
                self.publisher
                    .publish_completion_error(&appointment_id, &error)
                    .await;
                Err(error)
            }
        }
    }

    async fn run_pipeline(
        &self,
        data: &AppointmentCompletionData,
    ) -> Result<(), CompletionError> {
        let appointment = self
            .repository
            .find_by_id(&data.appointment_id)
            .await
            .map_err(|e| CompletionError::Database(e.to_string()))?
            .ok_or_else(|| CompletionError::NotFound(data.appointment_id.clone()))?;

        validate_completion_state(&appointment)?;

        self.repository
            .update_status(&appointment.id, AppointmentStatus::Completed)
            .await
            .map_err(|e| CompletionError::Database(e.to_string()))?;

        let processing_time = data.processing_time.unwrap_or_else(|| {
            (data.completed_at - appointment.created_at).num_milliseconds()
        });
        self.metrics.record(processing_time).await;

        let country = data
            .country_iso
            .as_deref()
            .unwrap_or_else(|| appointment.country_iso.as_str());
        self.rules.apply(country, &appointment).await?;

        self.publisher
            .publish_fully_completed(&appointment, data, Utc::now())
            .await?;

        info!(
            appointment_id = %appointment.id,
            processing_time_ms = processing_time,
            "Appointment fully completed"
        );
        Ok(())
    }

    pub async fn get_completion_stats(&self) -> Result<CompletionStats, CompletionError> {
        self.metrics.snapshot().await
    }

    /// Probes the repository with a sentinel id. Not-found means the store
    /// answered, which is all the check needs.
    pub async fn health_check(&self) -> CompletionHealth {
        let repository_reachable = match self.repository.find_by_id(HEALTH_PROBE_ID).await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "Repository health probe failed");
                false
            }
        };
        let metrics_available = self.metrics.snapshot().await.is_ok();

        CompletionHealth {
            healthy: repository_reachable && metrics_available,
            repository_reachable,
            metrics_available,
            checked_at: Utc::now(),
        }
    }

    /// Convenience for tests and composition code that already hold an
    /// entity instead of a wire confirmation.
    pub fn confirmation_for(appointment: &AppointmentEntity) -> AppointmentCompletionData {
        AppointmentCompletionData {
            appointment_id: appointment.id.clone(),
            status: "completed".to_string(),
            completed_at: Utc::now(),
            processing_time: None,
            country_iso: Some(appointment.country_iso.as_str().to_string()),
            metadata: None,
        }
    }
}
