use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use shared_models::{AppointmentEntity, AppointmentStatus};

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Storage(String),

    #[error("Appointment not found: {0}")]
    NotFound(String),
}

/// Persistence port for the appointment document store.
///
/// `delete` exists as repository-level plumbing only; no core workflow
/// calls it.
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn save(&self, appointment: &AppointmentEntity) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<AppointmentEntity>, RepositoryError>;

    async fn find_by_insured_id(
        &self,
        insured_id: &str,
    ) -> Result<Vec<AppointmentEntity>, RepositoryError>;

    async fn update_status(
        &self,
        id: &str,
        status: AppointmentStatus,
    ) -> Result<(), RepositoryError>;

    async fn delete(&self, id: &str) -> Result<(), RepositoryError>;
}

/// In-memory document store used in local mode and tests.
#[derive(Debug, Default)]
pub struct InMemoryAppointmentRepository {
    appointments: RwLock<HashMap<String, AppointmentEntity>>,
}

impl InMemoryAppointmentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AppointmentRepository for InMemoryAppointmentRepository {
    async fn save(&self, appointment: &AppointmentEntity) -> Result<(), RepositoryError> {
        let mut appointments = self.appointments.write().await;
        appointments.insert(appointment.id.clone(), appointment.clone());
        debug!("Saved appointment {}", appointment.id);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<AppointmentEntity>, RepositoryError> {
        let appointments = self.appointments.read().await;
        Ok(appointments.get(id).cloned())
    }

    async fn find_by_insured_id(
        &self,
        insured_id: &str,
    ) -> Result<Vec<AppointmentEntity>, RepositoryError> {
        let appointments = self.appointments.read().await;
        let mut matches: Vec<AppointmentEntity> = appointments
            .values()
            .filter(|appointment| appointment.insured_id == insured_id)
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(matches)
    }

    async fn update_status(
        &self,
        id: &str,
        status: AppointmentStatus,
    ) -> Result<(), RepositoryError> {
        let mut appointments = self.appointments.write().await;
        match appointments.get(id) {
            Some(existing) => {
                let updated = existing.with_status(status);
                appointments.insert(id.to_string(), updated);
                debug!("Updated appointment {} to {}", id, status);
                Ok(())
            }
            None => Err(RepositoryError::NotFound(id.to_string())),
        }
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let mut appointments = self.appointments.write().await;
        appointments.remove(id);
        Ok(())
    }
}
