use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use shared_models::AppError;

use crate::services::completion::AppointmentCompletionService;

/// `GET /completion/health`
#[axum::debug_handler]
pub async fn completion_health(
    State(service): State<Arc<AppointmentCompletionService>>,
) -> impl IntoResponse {
    let health = service.health_check().await;
    let status = if health.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(health))
}

/// `GET /completion/stats`
#[axum::debug_handler]
pub async fn completion_stats(
    State(service): State<Arc<AppointmentCompletionService>>,
) -> Result<impl IntoResponse, AppError> {
    let stats = service
        .get_completion_stats()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "totalCompleted": stats.total_completed,
        "completedToday": stats.completed_today,
        "averageCompletionTimeMs": stats.average_completion_time_ms,
        "averageCompletionTime": stats.human_readable_average(),
        "lastCompletionAt": stats.last_completion_at,
    })))
}
