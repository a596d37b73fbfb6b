use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

pub mod health;
pub mod notifications;
pub mod tat;

pub fn router(state: AppState) -> Router {
    // Very permissive CORS for local dev (tighten for prod)
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // health
        .route("/health", get(health::health))
        // notification hierarchy + acknowledgement
        .route("/api/v1/notifications", get(notifications::list_notifications))
        .route("/api/v1/notifications/seen", post(notifications::mark_seen))
        // TAT evaluation
        .route("/api/v1/cases/:id/tat", get(tat::get_case_tat))
        .route("/api/v1/tat/due-date", get(tat::get_due_date))
        // state & middleware
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
