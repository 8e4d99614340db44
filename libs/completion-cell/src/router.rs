use std::sync::Arc;

use axum::{routing::get, Router};

use crate::handlers::{completion_health, completion_stats};
use crate::services::completion::AppointmentCompletionService;

pub fn create_completion_router(service: Arc<AppointmentCompletionService>) -> Router {
    Router::new()
        .route("/completion/health", get(completion_health))
        .route("/completion/stats", get(completion_stats))
        .with_state(service)
}
