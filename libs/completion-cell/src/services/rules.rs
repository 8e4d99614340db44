use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use shared_models::AppointmentEntity;

use crate::error::CompletionError;

/// Country-specific steps that run after an appointment completes.
#[async_trait]
pub trait CompletionRules: Send + Sync {
    async fn apply(&self, appointment: &AppointmentEntity) -> Result<(), CompletionError>;
}

/// Peru: notify MINSA and feed the EsSalud statistics pipeline. Both are
/// log-only placeholders until the external integrations exist.
pub struct PeruCompletionRules;

#[async_trait]
impl CompletionRules for PeruCompletionRules {
    async fn apply(&self, appointment: &AppointmentEntity) -> Result<(), CompletionError> {
        info!(
            appointment_id = %appointment.id,
            "Notifying MINSA of completed appointment"
        );
        info!(
            appointment_id = %appointment.id,
            insured_id = %appointment.insured_id,
            "Reporting completion to EsSalud statistics"
        );
        Ok(())
    }
}

/// Chile: notify FONASA and record the appointment in the national health
/// system. Log-only placeholders.
pub struct ChileCompletionRules;

#[async_trait]
impl CompletionRules for ChileCompletionRules {
    async fn apply(&self, appointment: &AppointmentEntity) -> Result<(), CompletionError> {
        info!(
            appointment_id = %appointment.id,
            "Notifying FONASA of completed appointment"
        );
        info!(
            appointment_id = %appointment.id,
            insured_id = %appointment.insured_id,
            "Recording completion in the national health system"
        );
        Ok(())
    }
}

/// Routes post-completion work to the country handlers by country code.
/// An unrecognized code is logged and skipped rather than failing the
/// pipeline.
pub struct CompletionRulesDispatcher {
    peru: Arc<dyn CompletionRules>,
    chile: Arc<dyn CompletionRules>,
}

impl Default for CompletionRulesDispatcher {
    fn default() -> Self {
        Self::new(Arc::new(PeruCompletionRules), Arc::new(ChileCompletionRules))
    }
}

impl CompletionRulesDispatcher {
    pub fn new(peru: Arc<dyn CompletionRules>, chile: Arc<dyn CompletionRules>) -> Self {
        Self { peru, chile }
    }

    pub async fn apply(
        &self,
        country: &str,
        appointment: &AppointmentEntity,
    ) -> Result<(), CompletionError> {
        match country {
            "PE" => self.peru.apply(appointment).await,
            "CL" => self.chile.apply(appointment).await,
            other => {
                warn!(
                    appointment_id = %appointment.id,
                    country = other,
                    "No completion rules registered for country"
                );
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use shared_models::CountryIso;

    struct CountingRules {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl CompletionRules for CountingRules {
        async fn apply(&self, _appointment: &AppointmentEntity) -> Result<(), CompletionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn appointment(country: CountryIso) -> AppointmentEntity {
        AppointmentEntity::create_pending(
            "apt-1".to_string(),
            "12345".to_string(),
            1001,
            country,
        )
    }

    #[tokio::test]
    async fn dispatcher_routes_by_country_code() {
        let peru_calls = Arc::new(AtomicUsize::new(0));
        let chile_calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = CompletionRulesDispatcher::new(
            Arc::new(CountingRules {
                calls: peru_calls.clone(),
            }),
            Arc::new(CountingRules {
                calls: chile_calls.clone(),
            }),
        );

        dispatcher
            .apply("PE", &appointment(CountryIso::PE))
            .await
            .unwrap();
        dispatcher
            .apply("CL", &appointment(CountryIso::CL))
            .await
            .unwrap();

        assert_eq!(peru_calls.load(Ordering::SeqCst), 1);
        assert_eq!(chile_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_countries_are_skipped_without_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = CompletionRulesDispatcher::new(
            Arc::new(CountingRules {
                calls: calls.clone(),
            }),
            Arc::new(CountingRules {
                calls: calls.clone(),
            }),
        );

        let result = dispatcher.apply("BR", &appointment(CountryIso::PE)).await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
