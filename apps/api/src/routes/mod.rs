pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::interview::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Interview API
        .route(
            "/api/v1/interviews",
            post(handlers::start_interview).get(handlers::list_interviews),
        )
        .route("/api/v1/interviews/:id", get(handlers::get_interview))
        .route(
            "/api/v1/interviews/:id/record",
            get(handlers::get_record),
        )
        .route(
            "/api/v1/interviews/:id/messages",
            post(handlers::post_message),
        )
        .route(
            "/api/v1/interviews/:id/finalize",
            post(handlers::finalize_interview),
        )
        .with_state(state)
}
