use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppointmentError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("The insured id must be exactly 5 digits: {0}")]
    InvalidInsuredId(String),

    #[error("Appointment not found: {0}")]
    NotFound(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Notification dispatch failed: {0}")]
    Notification(String),

    #[error("Event publish failed: {0}")]
    EventPublish(String),
}
