//! Language model providers for docqa.

pub mod openai;
mod sse;

pub use openai::OpenAiChat;
