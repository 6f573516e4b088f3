use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Interview sessions
        .route("/interview/start", post(handlers::start_interview))
        .route("/interview/submit", post(handlers::submit_response))
        .route("/interview/:session_id", get(handlers::get_session))
        .route(
            "/interview/:session_id/results",
            get(handlers::get_results),
        )
        // Speech
        .route("/transcribe", post(handlers::transcribe))
        .route("/synthesize", post(handlers::synthesize))
        // Question generation
        .route("/generate", post(handlers::generate_questions))
        .route("/questions/edit", post(handlers::edit_question))
        // Scoring
        .route("/scoring/score", post(handlers::score_response))
        .route("/scoring/health", get(handlers::scoring_health))
        // Interview templates
        .route(
            "/interviews",
            get(handlers::list_interviews).post(handlers::create_interview),
        )
        .route(
            "/interviews/:interview_id",
            get(handlers::get_interview)
                .put(handlers::update_interview)
                .delete(handlers::delete_interview),
        )
        .route(
            "/interviews/:interview_id/results",
            get(handlers::list_interview_results),
        )
        .route(
            "/interviews/:interview_id/start",
            post(handlers::start_from_interview),
        )
        // Results review
        .route("/results", get(handlers::list_results))
        .route(
            "/results/:session_id",
            get(handlers::get_result).delete(handlers::delete_result),
        )
        .route(
            "/results/:session_id/accept",
            post(handlers::accept_result),
        )
        .route(
            "/results/:session_id/reject",
            post(handlers::reject_result),
        )
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
