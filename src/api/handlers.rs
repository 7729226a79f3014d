use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::counter::VisitorCounter;
use crate::models::VisitResponse;

/// Body sent with every failed visit; details stay in the logs.
pub const UPDATE_FAILED_MESSAGE: &str = "An error occurred while updating the counter.";

pub struct AppState {
    pub counter: VisitorCounter,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Record a visit and return the updated counters
pub async fn get_visitor_count(
    State(state): State<Arc<AppState>>,
) -> Result<Json<VisitResponse>, (StatusCode, Json<ErrorResponse>)> {
    tracing::info!("Processed a request.");

    match state.counter.handle_visit().await {
        Ok(record) => {
            tracing::debug!(
                total_visitors = record.total_visitors,
                visitors_today = record.visitors_today,
                "Visitor counter updated"
            );
            Ok(Json(VisitResponse::from(&record)))
        }
        Err(e) => {
            let err = anyhow::Error::new(e);
            tracing::error!("An error occurred: {err:#}");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: UPDATE_FAILED_MESSAGE.to_string(),
                }),
            ))
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    #[derive(Serialize)]
    struct HealthResponse {
        status: String,
    }

    Json(HealthResponse {
        status: "OK".to_string(),
    })
}
