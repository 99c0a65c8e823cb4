//! The remote answer endpoint: request shaping and the HTTP client.

pub mod client;
pub mod request;

pub use client::{AnswerClient, HttpAnswerClient};
pub use request::{
    AnswerResponse, COMPLETION_INSTRUCTION, ChatRequest, CompletionRequest, OutboundRequest,
    RequestKind, UserData,
};
