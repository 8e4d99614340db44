use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Invalid confirmation envelope: {0}")]
    InvalidEnvelope(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Appointment {0} is already completed")]
    AlreadyCompleted(String),

    #[error("Cannot complete cancelled appointment {0}")]
    CancelledAppointment(String),

    #[error("Appointment {id} is in state '{status}' and cannot be completed")]
    InvalidState { id: String, status: String },

    #[error("Appointment not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Event publish error: {0}")]
    EventPublish(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Queue error: {0}")]
    Queue(String),
}

/// Classifies a failure message into a coarse category for error events.
pub fn classify_failure(message: &str) -> &'static str {
    let lower = message.to_lowercase();
    if lower.contains("validation") || lower.contains("invalid") {
        "validation"
    } else if lower.contains("database") || lower.contains("storage") || lower.contains("sql") {
        "database"
    } else if lower.contains("network")
        || lower.contains("timeout")
        || lower.contains("connection")
    {
        "network"
    } else {
        "unknown"
    }
}
