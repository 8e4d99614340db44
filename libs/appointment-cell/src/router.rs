use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{create_appointment, get_appointments_by_insured, missing_insured_id};
use crate::services::appointment::AppointmentService;

pub fn create_appointment_router(service: Arc<AppointmentService>) -> Router {
    Router::new()
        .route(
            "/appointment",
            post(create_appointment).get(missing_insured_id),
        )
        .route("/appointment/{insured_id}", get(get_appointments_by_insured))
        .with_state(service)
}
