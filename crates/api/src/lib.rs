pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use state::AppState;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Assessment workflow routes (25 MB body limit for audio uploads)
    let assessment_routes = Router::new()
        .route("/", get(routes::assessment::list))
        .route("/start", post(routes::assessment::start))
        .route("/accept", post(routes::assessment::accept))
        .route("/reject", post(routes::assessment::reject))
        .route(
            "/{assessment_id}/current-question",
            get(routes::assessment::current_question),
        )
        .route("/{assessment_id}/submit", post(routes::assessment::submit))
        .route(
            "/{assessment_id}/complete",
            post(routes::assessment::complete),
        )
        .layer(DefaultBodyLimit::max(25 * 1024 * 1024));

    // Committed proficiency (durable side, written only by accept)
    let proficiency_routes = Router::new().route("/{language_id}", get(routes::proficiency::get));

    let api = Router::new()
        .nest("/assessment", assessment_routes)
        .nest("/proficiency", proficiency_routes);

    // Health check
    let health = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api)
        .merge(health)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
