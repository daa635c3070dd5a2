//! OpenAI Responses API provider.

pub mod client;

pub use client::OpenAiResponsesClient;
