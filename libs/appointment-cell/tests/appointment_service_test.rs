use std::sync::Arc;

use assert_matches::assert_matches;

use appointment_cell::{AppointmentError, AppointmentService, CreateAppointmentRequest, ScheduleId};
use shared_config::AppConfig;
use shared_database::{AppointmentRepository, InMemoryAppointmentRepository};
use shared_messaging::{
    InMemoryMessageQueue, QueueNotificationSender, RecordingEventBus,
};
use shared_models::{AppointmentStatus, EventType};
use shared_utils::UuidIdGenerator;

struct Fixture {
    service: AppointmentService,
    repository: Arc<InMemoryAppointmentRepository>,
    queue: Arc<InMemoryMessageQueue>,
    event_bus: Arc<RecordingEventBus>,
}

fn fixture() -> Fixture {
    let repository = Arc::new(InMemoryAppointmentRepository::new());
    let queue = Arc::new(InMemoryMessageQueue::new());
    let event_bus = Arc::new(RecordingEventBus::new());
    let notifications = Arc::new(QueueNotificationSender::new(
        queue.clone(),
        &AppConfig::default(),
    ));

    let service = AppointmentService::new(
        repository.clone(),
        notifications,
        event_bus.clone(),
        Arc::new(UuidIdGenerator),
    );

    Fixture {
        service,
        repository,
        queue,
        event_bus,
    }
}

fn request(insured: &str, schedule: &str, country: &str) -> CreateAppointmentRequest {
    CreateAppointmentRequest {
        insured_id: Some(insured.to_string()),
        schedule_id: Some(ScheduleId::Text(schedule.to_string())),
        country_iso: Some(country.to_string()),
    }
}

#[tokio::test]
async fn valid_creation_persists_pending_and_returns_unique_ids() {
    let fx = fixture();

    let first = fx
        .service
        .create_appointment(request("12345", "1001", "PE"))
        .await
        .unwrap();
    let second = fx
        .service
        .create_appointment(request("12345", "1002", "PE"))
        .await
        .unwrap();

    assert!(!first.is_empty());
    assert_ne!(first, second);

    let stored = fx.repository.find_by_id(&first).await.unwrap().unwrap();
    assert_eq!(stored.status, AppointmentStatus::Pending);
    assert_eq!(stored.insured_id, "12345");
    assert_eq!(stored.schedule_id, 1001);
}

#[tokio::test]
async fn creation_notifies_the_country_channel_and_publishes_created_event() {
    let fx = fixture();

    fx.service
        .create_appointment(request("12345", "1001", "PE"))
        .await
        .unwrap();

    assert_eq!(fx.queue.len("appointments.pe").await, 1);
    assert_eq!(fx.queue.len("appointments.cl").await, 0);
    assert_eq!(fx.event_bus.count_of(EventType::AppointmentCreated).await, 1);
}

#[tokio::test]
async fn chile_creations_go_to_the_chile_channel() {
    let fx = fixture();

    fx.service
        .create_appointment(request("54321", "2001", "CL"))
        .await
        .unwrap();

    assert_eq!(fx.queue.len("appointments.cl").await, 1);
    assert_eq!(fx.queue.len("appointments.pe").await, 0);
}

#[tokio::test]
async fn invalid_insured_ids_are_rejected_before_persistence() {
    let fx = fixture();

    for bad in ["1234", "123456", "12a45", ""] {
        let result = fx
            .service
            .create_appointment(request(bad, "1001", "PE"))
            .await;
        assert!(result.is_err(), "insured id {:?} should be rejected", bad);
    }

    // Nothing reached the repository or the outbound channels.
    assert!(fx
        .repository
        .find_by_insured_id("12345")
        .await
        .unwrap()
        .is_empty());
    assert_eq!(fx.queue.len("appointments.pe").await, 0);
    assert_eq!(fx.event_bus.events().await.len(), 0);
}

#[tokio::test]
async fn non_positive_schedule_ids_are_rejected() {
    let fx = fixture();

    for bad in ["0", "-3", "abc"] {
        let result = fx
            .service
            .create_appointment(request("12345", bad, "PE"))
            .await;
        assert_matches!(result, Err(AppointmentError::Validation(_)));
    }
}

#[tokio::test]
async fn unknown_country_code_is_rejected() {
    let fx = fixture();
    let result = fx
        .service
        .create_appointment(request("12345", "1001", "BR"))
        .await;
    assert_matches!(result, Err(AppointmentError::Validation(_)));
}

#[tokio::test]
async fn created_appointment_shows_up_in_insured_lookup_as_pending() {
    let fx = fixture();

    let appointment_id = fx
        .service
        .create_appointment(request("12345", "1001", "PE"))
        .await
        .unwrap();

    let appointments = fx
        .service
        .get_appointments_by_insured("12345")
        .await
        .unwrap();

    assert_eq!(appointments.len(), 1);
    assert_eq!(appointments[0].id, appointment_id);
    assert_eq!(appointments[0].status, AppointmentStatus::Pending);
    assert!(appointments[0].is_pending);
    assert!(!appointments[0].is_completed);
}

#[tokio::test]
async fn lookup_rejects_malformed_insured_ids() {
    let fx = fixture();
    let result = fx.service.get_appointments_by_insured("12ab5").await;
    assert_matches!(result, Err(AppointmentError::InvalidInsuredId(_)));
}

#[tokio::test]
async fn lookup_for_unknown_insured_returns_empty_list() {
    let fx = fixture();
    let appointments = fx
        .service
        .get_appointments_by_insured("99999")
        .await
        .unwrap();
    assert!(appointments.is_empty());
}

#[tokio::test]
async fn status_update_to_completed_publishes_completed_event() {
    let fx = fixture();

    let appointment_id = fx
        .service
        .create_appointment(request("12345", "1001", "PE"))
        .await
        .unwrap();

    fx.service
        .update_appointment_status(&appointment_id, AppointmentStatus::Completed)
        .await
        .unwrap();

    let stored = fx
        .repository
        .find_by_id(&appointment_id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.is_completed());
    assert_eq!(
        fx.event_bus.count_of(EventType::AppointmentCompleted).await,
        1
    );
}

#[tokio::test]
async fn status_update_for_unknown_appointment_is_not_found() {
    let fx = fixture();
    let result = fx
        .service
        .update_appointment_status("ghost", AppointmentStatus::Cancelled)
        .await;
    assert_matches!(result, Err(AppointmentError::NotFound(_)));
}
