//! OpenAI-compatible chat-completion client.
//!
//! [`ChatClient`] is the seam the pipeline talks to; [`OpenAiCompatClient`]
//! is the HTTP implementation used in production.

mod client;
mod retry;
mod types;


pub use client::{ChatClient, OpenAiCompatClient};
pub use retry::{NoRetry, RetryPolicy};
pub use types::{ChatCompletionRequest, ChatCompletionResponse, ChatExchange, Message, MessageRole};
