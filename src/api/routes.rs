use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::CorsConfig;
use crate::counter::VisitorCounter;

use super::handlers::{get_visitor_count, health_check, AppState};

pub const VISIT_PATH: &str = "/api/getVisitorCount";

/// Route table for the counter service. Built once at startup and handed
/// to the listener.
pub fn create_counter_router(counter: VisitorCounter, cors: &CorsConfig) -> Router {
    let state = Arc::new(AppState { counter });

    Router::new()
        .route("/health", get(health_check))
        .route(VISIT_PATH, get(get_visitor_count))
        .layer(cors_layer(cors))
        .with_state(state)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods([Method::GET]);

    if config.allows_any_origin() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{origin}'");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}
