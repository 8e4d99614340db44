use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;
use mockall::mock;

use completion_cell::{
    AppointmentCompletionService, CompletionConsumer, CompletionError, CompletionEventPublisher,
    CompletionMetrics, CompletionRulesDispatcher,
};
use shared_database::{
    AppointmentRepository, InMemoryAppointmentRepository, RepositoryError,
};
use shared_messaging::{InMemoryMessageQueue, MessageQueue, RecordingEventBus};
use shared_models::{AppointmentEntity, AppointmentStatus, CountryIso, EventType};
use shared_utils::test_utils::{confirmation_envelope_json, pending_appointment};

mock! {
    Repo {}

    #[async_trait]
    impl AppointmentRepository for Repo {
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
}

struct Fixture {
    service: Arc<AppointmentCompletionService>,
    repository: Arc<InMemoryAppointmentRepository>,
    event_bus: Arc<RecordingEventBus>,
    metrics: Arc<CompletionMetrics>,
}

fn fixture() -> Fixture {
    let repository = Arc::new(InMemoryAppointmentRepository::new());
    let event_bus = Arc::new(RecordingEventBus::new());
    let metrics = Arc::new(CompletionMetrics::new());

    let service = Arc::new(AppointmentCompletionService::new(
        repository.clone(),
        metrics.clone(),
        Arc::new(CompletionRulesDispatcher::default()),
        Arc::new(CompletionEventPublisher::new(event_bus.clone())),
    ));

    Fixture {
        service,
        repository,
        event_bus,
        metrics,
    }
}

fn service_with_repository(repository: Arc<dyn AppointmentRepository>) -> AppointmentCompletionService {
    AppointmentCompletionService::new(
        repository,
        Arc::new(CompletionMetrics::new()),
        Arc::new(CompletionRulesDispatcher::default()),
        Arc::new(CompletionEventPublisher::new(Arc::new(
            RecordingEventBus::new(),
        ))),
    )
}

#[tokio::test]
async fn confirmation_completes_a_pending_appointment() {
    let fixture = fixture();
    let appointment = pending_appointment(CountryIso::PE);
    fixture.repository.save(&appointment).await.unwrap();

    fixture
        .service
        .process_confirmation_envelope(&confirmation_envelope_json(&appointment.id))
        .await
        .unwrap();

    let stored = fixture
        .repository
        .find_by_id(&appointment.id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.is_completed());

    assert_eq!(
        fixture
            .event_bus
            .count_of(EventType::AppointmentFullyCompleted)
            .await,
        1
    );
    let stats = fixture.metrics.snapshot().await.unwrap();
    assert_eq!(stats.total_completed, 1);
    // Created 30 minutes before confirmation, so a real duration lands.
    assert!(stats.average_completion_time_ms > 0);
}

#[tokio::test]
async fn duplicate_confirmation_is_rejected_and_leaves_metrics_untouched() {
    let fixture = fixture();
    let appointment = pending_appointment(CountryIso::CL);
    fixture.repository.save(&appointment).await.unwrap();

    fixture
        .service
        .process_confirmation_envelope(&confirmation_envelope_json(&appointment.id))
        .await
        .unwrap();
    let result = fixture
        .service
        .process_confirmation_envelope(&confirmation_envelope_json(&appointment.id))
        .await;

    assert_matches!(result, Err(CompletionError::AlreadyCompleted(_)));
    let stats = fixture.metrics.snapshot().await.unwrap();
    assert_eq!(stats.total_completed, 1);
    assert_eq!(
        fixture
            .event_bus
            .count_of(EventType::AppointmentCompletionError)
            .await,
        1
    );
}

#[tokio::test]
async fn cancelled_appointments_cannot_be_completed() {
    let fixture = fixture();
    let appointment =
        pending_appointment(CountryIso::PE).with_status(AppointmentStatus::Cancelled);
    fixture.repository.save(&appointment).await.unwrap();

    let result = fixture
        .service
        .process_confirmation_envelope(&confirmation_envelope_json(&appointment.id))
        .await;

    assert_matches!(result, Err(CompletionError::CancelledAppointment(_)));
    let stored = fixture
        .repository
        .find_by_id(&appointment.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, AppointmentStatus::Cancelled);
}

#[tokio::test]
async fn unknown_appointment_leaves_stats_untouched() {
    let fixture = fixture();

    let result = fixture
        .service
        .process_confirmation_envelope(&confirmation_envelope_json("no-such-appointment"))
        .await;

    assert_matches!(result, Err(CompletionError::NotFound(_)));
    let stats = fixture.metrics.snapshot().await.unwrap();
    assert!(!stats.has_completions());
    assert_eq!(
        fixture
            .event_bus
            .count_of(EventType::AppointmentCompletionError)
            .await,
        1
    );
}

#[tokio::test]
async fn malformed_confirmations_never_reach_the_repository() {
    let mut repository = MockRepo::new();
    repository.expect_find_by_id().times(0);
    repository.expect_update_status().times(0);
    let service = service_with_repository(Arc::new(repository));

    let result = service.process_confirmation_envelope("not json").await;
    assert_matches!(result, Err(CompletionError::InvalidEnvelope(_)));

    let wrong_type = serde_json::json!({
        "id": "evt-1",
        "detail-type": "appointment.created",
        "detail": {"appointmentId": "apt-1"},
    })
    .to_string();
    let result = service.process_confirmation_envelope(&wrong_type).await;
    assert_matches!(result, Err(CompletionError::InvalidEnvelope(_)));

    let missing_detail = serde_json::json!({
        "id": "evt-2",
        "detail-type": "appointment.completed",
    })
    .to_string();
    let result = service.process_confirmation_envelope(&missing_detail).await;
    assert_matches!(result, Err(CompletionError::InvalidEnvelope(_)));

    let bad_status = serde_json::json!({
        "id": "evt-3",
        "detail-type": "appointment.completed",
        "detail": {
            "appointmentId": "apt-1",
            "status": "pending",
            "completedAt": "2026-08-30T12:00:00Z",
        },
    })
    .to_string();
    let result = service.process_confirmation_envelope(&bad_status).await;
    assert_matches!(result, Err(CompletionError::Validation(_)));
}

#[tokio::test]
async fn consumer_continues_past_failing_confirmations() {
    let fixture = fixture();
    let queue = Arc::new(InMemoryMessageQueue::new());

    let appointment = pending_appointment(CountryIso::PE);
    fixture.repository.save(&appointment).await.unwrap();

    queue
        .push("appointments.completed", "broken".to_string())
        .await
        .unwrap();
    queue
        .push(
            "appointments.completed",
            confirmation_envelope_json(&appointment.id),
        )
        .await
        .unwrap();

    let consumer = CompletionConsumer::new(
        fixture.service.clone(),
        queue.clone(),
        "appointments.completed".to_string(),
        10,
        Duration::from_millis(10),
    );
    let (succeeded, failed) = consumer.process_batch().await.unwrap();

    assert_eq!(succeeded, 1);
    assert_eq!(failed, 1);
    let stored = fixture
        .repository
        .find_by_id(&appointment.id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.is_completed());
}

#[tokio::test]
async fn health_check_reports_healthy_with_a_reachable_store() {
    let fixture = fixture();
    let health = fixture.service.health_check().await;

    assert!(health.healthy);
    assert!(health.repository_reachable);
    assert!(health.metrics_available);
}

#[tokio::test]
async fn health_check_flags_an_unreachable_store() {
    let mut repository = MockRepo::new();
    repository
        .expect_find_by_id()
        .returning(|_| Err(RepositoryError::Storage("connection refused".to_string())));
    let service = service_with_repository(Arc::new(repository));

    let health = service.health_check().await;

    assert!(!health.healthy);
    assert!(!health.repository_reachable);
}
