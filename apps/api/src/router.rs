use axum::{routing::get, Router};

use appointment_cell::create_appointment_router;
use completion_cell::create_completion_router;

use crate::bootstrap::App;

pub fn create_router(app: &App) -> Router {
    Router::new()
        .route(
            "/",
            get(|| async { "Appointment booking API is running!" }),
        )
        .merge(create_appointment_router(app.appointment_service.clone()))
        .merge(create_completion_router(app.completion_service.clone()))
}
