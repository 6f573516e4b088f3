//! HTTP API server for the interview frontend and admin tools
//!
//! This module provides a REST API for running interviews:
//! - POST /interview/start - Start a session
//! - POST /interview/submit - Submit (or skip) an answer
//! - GET /interview/:id - Session state
//! - GET /interview/:id/results - Scored results of a completed session
//! - POST /transcribe, /synthesize - Speech sidecars
//! - POST /generate, /questions/edit - Question generation
//! - POST /scoring/score, GET /scoring/health - Standalone scoring
//! - /interviews, /results - Templates and result review
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use handlers::ErrorResponse;
pub use routes::create_router;
pub use state::AppState;
