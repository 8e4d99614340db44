use shared_models::CountryIso;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CountryProcessingError {
    #[error("Invalid notification envelope: {0}")]
    InvalidEnvelope(String),

    #[error("Invalid appointment payload: {0}")]
    InvalidPayload(String),

    #[error("Appointment belongs to another country: expected {expected}, received {received}")]
    CountryMismatch {
        expected: CountryIso,
        received: String,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Confirmation publish error: {0}")]
    Confirmation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Queue error: {0}")]
    Queue(String),
}
