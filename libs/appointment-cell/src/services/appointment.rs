use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use shared_database::AppointmentRepository;
use shared_messaging::{
    EventBus, NotificationChannel, NotificationContent, NotificationSender,
};
use shared_models::{
    is_valid_insured_id, AppointmentConfirmation, AppointmentEntity, AppointmentStatus,
    CountryIso, DomainEvent,
};
use shared_utils::IdGenerator;

use crate::error::AppointmentError;
use crate::models::{AppointmentDto, CreateAppointmentRequest};

/// Application service for the synchronous API path: appointment creation,
/// insured lookup and status updates.
pub struct AppointmentService {
    repository: Arc<dyn AppointmentRepository>,
    notifications: Arc<dyn NotificationSender>,
    event_bus: Arc<dyn EventBus>,
    id_generator: Arc<dyn IdGenerator>,
}

impl AppointmentService {
    pub fn new(
        repository: Arc<dyn AppointmentRepository>,
        notifications: Arc<dyn NotificationSender>,
        event_bus: Arc<dyn EventBus>,
        id_generator: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            repository,
            notifications,
            event_bus,
            id_generator,
        }
    }

    /// Creates a new appointment: validate, persist as pending, notify the
    /// country channel, publish the created event, return the new id.
    ///
    /// Notification and event dispatch are best-effort sequential, not
    /// transactional. A failure after persistence leaves an orphaned
    /// pending row; that is surfaced in the logs and the returned error,
    /// never swallowed.
    #[instrument(skip(self, request))]
    pub async fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
    ) -> Result<String, AppointmentError> {
        let (insured_id, schedule_id, country_iso) = validate_create_request(&request)?;

        let appointment_id = self.id_generator.generate();
        let appointment = AppointmentEntity::create_pending(
            appointment_id.clone(),
            insured_id,
            schedule_id,
            country_iso,
        );

        self.repository.save(&appointment).await.map_err(|e| {
            AppointmentError::Repository(format!("failed to persist appointment: {}", e))
        })?;
        info!("Appointment {} persisted as pending", appointment.id);

        if let Err(e) = self.dispatch_created(&appointment).await {
            warn!(
                "Appointment {} persisted but downstream dispatch failed; a pending row remains: {}",
                appointment.id, e
            );
            return Err(e);
        }

        info!("Appointment {} created for {}", appointment.id, country_iso);
        Ok(appointment_id)
    }

    /// Returns every appointment of one insured, mapped to the read model.
    pub async fn get_appointments_by_insured(
        &self,
        insured_id: &str,
    ) -> Result<Vec<AppointmentDto>, AppointmentError> {
        if !is_valid_insured_id(insured_id) {
            return Err(AppointmentError::InvalidInsuredId(insured_id.to_string()));
        }

        let appointments = self
            .repository
            .find_by_insured_id(insured_id)
            .await
            .map_err(|e| {
                AppointmentError::Repository(format!("failed to query appointments: {}", e))
            })?;

        info!(
            "Found {} appointments for insured {}",
            appointments.len(),
            insured_id
        );
        Ok(appointments.iter().map(AppointmentDto::from).collect())
    }

    /// Updates the status of an existing appointment and publishes the
    /// completed event when the new status is completed.
    pub async fn update_appointment_status(
        &self,
        appointment_id: &str,
        status: AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        let appointment = self
            .repository
            .find_by_id(appointment_id)
            .await
            .map_err(|e| AppointmentError::Repository(format!("failed to look up appointment: {}", e)))?
            .ok_or_else(|| AppointmentError::NotFound(appointment_id.to_string()))?;

        if status == AppointmentStatus::Error {
            return Err(AppointmentError::Validation(format!(
                "status {} cannot be set through this operation",
                status
            )));
        }

        let updated = appointment.with_status(status);
        self.repository.save(&updated).await.map_err(|e| {
            AppointmentError::Repository(format!("failed to update appointment status: {}", e))
        })?;
        info!("Appointment {} status updated to {}", appointment_id, status);

        if status == AppointmentStatus::Completed {
            let confirmation = AppointmentConfirmation {
                appointment_id: appointment_id.to_string(),
                status: status.to_string(),
                completed_at: Utc::now(),
            };
            self.event_bus
                .publish(DomainEvent::appointment_completed(&confirmation))
                .await
                .map_err(|e| {
                    AppointmentError::EventPublish(format!(
                        "failed to publish completed event: {}",
                        e
                    ))
                })?;
        }

        Ok(())
    }

    async fn dispatch_created(
        &self,
        appointment: &AppointmentEntity,
    ) -> Result<(), AppointmentError> {
        self.send_created_notification(appointment).await?;

        self.event_bus
            .publish(DomainEvent::appointment_created(appointment))
            .await
            .map_err(|e| {
                AppointmentError::EventPublish(format!("failed to publish created event: {}", e))
            })?;

        Ok(())
    }

    async fn send_created_notification(
        &self,
        appointment: &AppointmentEntity,
    ) -> Result<(), AppointmentError> {
        let channel = if appointment.is_peru() {
            NotificationChannel::Peru
        } else {
            NotificationChannel::Chile
        };

        let content = NotificationContent {
            id: appointment.id.clone(),
            subject: Some(format!("New medical appointment: {}", appointment.id)),
            body: serde_json::to_value(appointment).map_err(|e| {
                AppointmentError::Notification(format!("failed to encode notification: {}", e))
            })?,
            timestamp: Utc::now(),
        };

        let attributes = HashMap::from([
            ("priority".to_string(), "normal".to_string()),
            ("category".to_string(), "appointment".to_string()),
            (
                "countryISO".to_string(),
                appointment.country_iso.to_string(),
            ),
        ]);

        self.notifications
            .send(channel, content, attributes)
            .await
            .map_err(|e| {
                AppointmentError::Notification(format!("failed to send notification: {}", e))
            })?;

        Ok(())
    }
}

/// Fail-fast request validation: presence first, then insured id format,
/// then schedule id coercion, then country code. First failure wins.
fn validate_create_request(
    request: &CreateAppointmentRequest,
) -> Result<(String, i64, CountryIso), AppointmentError> {
    let insured_id = request
        .insured_id
        .as_deref()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppointmentError::Validation("the insuredId field is required".into()))?;

    let schedule_id = request
        .schedule_id
        .as_ref()
        .ok_or_else(|| AppointmentError::Validation("the scheduleId field is required".into()))?;

    let country_iso = request
        .country_iso
        .as_deref()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppointmentError::Validation("the countryISO field is required".into()))?;

    if !is_valid_insured_id(insured_id) {
        return Err(AppointmentError::InvalidInsuredId(insured_id.to_string()));
    }

    let schedule_id = schedule_id.as_positive().ok_or_else(|| {
        AppointmentError::Validation("the schedule id must be a positive number".into())
    })?;

    let country_iso = CountryIso::from_str(country_iso)
        .map_err(|_| AppointmentError::Validation("the country code must be PE or CL".into()))?;

    Ok((insured_id.to_string(), schedule_id, country_iso))
}
