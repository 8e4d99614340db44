use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use shared_models::AppError;

use crate::error::AppointmentError;
use crate::models::CreateAppointmentRequest;
use crate::services::appointment::AppointmentService;

/// `POST /appointment` — accepts a booking request and returns 202 with
/// the generated appointment id.
#[axum::debug_handler]
pub async fn create_appointment(
    State(service): State<Arc<AppointmentService>>,
    payload: Result<Json<CreateAppointmentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload.map_err(|rejection| AppError::InvalidJson(rejection.to_string()))?;

    let appointment_id = service
        .create_appointment(request)
        .await
        .map_err(|e| match e {
            AppointmentError::Validation(msg) => AppError::Validation(msg),
            AppointmentError::InvalidInsuredId(id) => AppError::Validation(format!(
                "the insured id must be exactly 5 digits: {}",
                id
            )),
            other => AppError::Internal(other.to_string()),
        })?;

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "message": "Appointment request accepted for processing",
            "appointmentId": appointment_id,
        })),
    ))
}

/// `GET /appointment/{insuredId}` — every appointment of one insured.
#[axum::debug_handler]
pub async fn get_appointments_by_insured(
    State(service): State<Arc<AppointmentService>>,
    Path(insured_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let appointments = service
        .get_appointments_by_insured(&insured_id)
        .await
        .map_err(|e| match e {
            AppointmentError::InvalidInsuredId(id) => AppError::InvalidInsuredIdFormat(id),
            other => AppError::Internal(other.to_string()),
        })?;

    Ok(Json(json!({
        "insuredId": insured_id,
        "totalAppointments": appointments.len(),
        "appointments": appointments,
    })))
}

/// `GET /appointment` without a path parameter.
pub async fn missing_insured_id() -> AppError {
    AppError::MissingInsuredId
}
