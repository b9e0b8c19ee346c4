//! Question answering for docqa.

pub mod answer;
pub mod retriever;

pub use answer::{Answer, AnswerGenerator, AnswerStream, NO_CONTEXT_MESSAGE};
pub use retriever::Retriever;
