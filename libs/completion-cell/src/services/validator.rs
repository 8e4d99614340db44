use shared_models::{AppointmentEntity, AppointmentStatus};

use crate::error::CompletionError;

/// Checks that an appointment is in a state that allows completion.
///
/// Only `pending` appointments may complete. Completed and cancelled
/// appointments each get a dedicated error so duplicate or contradictory
/// confirmations are distinguishable in logs and error events.
pub fn validate_completion_state(
    appointment: &AppointmentEntity,
) -> Result<(), CompletionError> {
    match appointment.status {
        AppointmentStatus::Pending => Ok(()),
        AppointmentStatus::Completed => {
            Err(CompletionError::AlreadyCompleted(appointment.id.clone()))
        }
        AppointmentStatus::Cancelled => {
            Err(CompletionError::CancelledAppointment(appointment.id.clone()))
        }
        other => Err(CompletionError::InvalidState {
            id: appointment.id.clone(),
            status: other.to_string(),
        }),
    }
}
