//! Language-model gateway used by question generation and scoring.

pub mod client;
pub mod messages;

pub use client::{
    CompletionError, CompletionGateway, CompletionInput, CompletionOptions, CompletionRequest,
    OllamaClient,
};
pub use messages::ChatMessage;
