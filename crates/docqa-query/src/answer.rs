//! Answer generation over retrieved context.
//!
//! The streaming path mirrors what an SSE frontend consumes: one `Sources`
//! event before any text, then `Token` events, then exactly one terminal
//! event (`Done` on success, `Error` otherwise). Errors never surface as a
//! stream failure; they arrive in-band so the consumer can render them.

use docqa_core::{AnswerEvent, LanguageModel, RetrievedChunk};
use futures::stream::BoxStream;
use futures::StreamExt;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

use crate::retriever::Retriever;

/// Message used when retrieval finds nothing above the threshold.
pub const NO_CONTEXT_MESSAGE: &str =
    "No relevant documents found. Please upload some files first.";

/// Event sequence of one streamed answer.
pub type AnswerStream = BoxStream<'static, AnswerEvent>;

/// A fully materialized answer.
#[derive(Debug, Clone)]
pub struct Answer {
    /// Generated answer text
    pub text: String,
    /// Deduplicated source document names, in first-retrieved order
    pub sources: Vec<String>,
}

/// Answers questions by retrieving context and prompting the model.
pub struct AnswerGenerator {
    retriever: Retriever,
    model: Arc<dyn LanguageModel>,
}

impl AnswerGenerator {
    /// Create a generator over the given retriever and model.
    pub fn new(retriever: Retriever, model: Arc<dyn LanguageModel>) -> Self {
        Self { retriever, model }
    }

    /// Answer a question in one call.
    ///
    /// Fails when nothing relevant is stored; the streaming path reports the
    /// same condition as an in-band `Error` event instead.
    pub async fn ask(&self, question: &str) -> docqa_core::Result<Answer> {
        let chunks = self.retriever.retrieve(question).await?;
        if chunks.is_empty() {
            return Err(docqa_core::Error::Other(NO_CONTEXT_MESSAGE.to_string()));
        }

        let sources = dedup_sources(&chunks);
        let prompt = build_prompt(question, &chunks);
        let text = self.model.complete(&prompt).await?;
        Ok(Answer { text, sources })
    }

    /// Answer a question as an event stream.
    ///
    /// The `Sources` event is emitted before the first model token so a
    /// frontend can show citations while text is still arriving.
    pub async fn ask_stream(&self, question: &str) -> AnswerStream {
        let chunks = match self.retriever.retrieve(question).await {
            Ok(chunks) => chunks,
            Err(err) => {
                return futures::stream::iter(vec![AnswerEvent::Error(err.to_string())]).boxed();
            }
        };

        if chunks.is_empty() {
            debug!("no chunks cleared the threshold");
            return futures::stream::iter(vec![AnswerEvent::Error(
                NO_CONTEXT_MESSAGE.to_string(),
            )])
            .boxed();
        }

        let sources = dedup_sources(&chunks);
        let prompt = build_prompt(question, &chunks);
        let model = Arc::clone(&self.model);

        let (tx, rx) = mpsc::channel::<AnswerEvent>(32);
        tokio::spawn(async move {
            if tx.send(AnswerEvent::Sources(sources)).await.is_err() {
                return;
            }

            let mut tokens = match model.complete_stream(&prompt).await {
                Ok(stream) => stream,
                Err(err) => {
                    let _ = tx.send(AnswerEvent::Error(err.to_string())).await;
                    return;
                }
            };

            while let Some(item) = tokens.next().await {
                match item {
                    Ok(token) => {
                        if tx.send(AnswerEvent::Token(token)).await.is_err() {
                            return;
                        }
                    }
                    Err(err) => {
                        let _ = tx.send(AnswerEvent::Error(err.to_string())).await;
                        return;
                    }
                }
            }

            let _ = tx.send(AnswerEvent::Done).await;
        });

        ReceiverStream::new(rx).boxed()
    }
}

/// Source names in first-retrieved order, without duplicates.
fn dedup_sources(chunks: &[RetrievedChunk]) -> Vec<String> {
    let mut seen = HashSet::new();
    chunks
        .iter()
        .map(|c| c.metadata.source.clone())
        .filter(|source| seen.insert(source.clone()))
        .collect()
}

/// Prompt with the retrieved chunks inlined as context.
fn build_prompt(question: &str, chunks: &[RetrievedChunk]) -> String {
    let context = chunks
        .iter()
        .map(|c| c.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are an assistant. Use the following context to answer the question.\n\
         If the answer is not in the context, say you don't know.\n\n\
         Context:\n{context}\n\n\
         Question: {question}\n\n\
         Answer concisely, and include citations if possible."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use docqa_core::{
        ChunkMetadata, Document, DocumentStore, EmbedError, Embedder, LlmError, NewChunk,
        StoreError, TokenStream,
    };
    use uuid::Uuid;

    struct FixedEmbedder;

    #[async_trait]
    impl Embedder for FixedEmbedder {
        fn model_name(&self) -> &str {
            "fixed"
        }

        fn dimension(&self) -> usize {
            2
        }

        async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }
    }

    /// Store that answers every similarity query with preset chunks.
    struct PresetStore {
        chunks: Vec<RetrievedChunk>,
    }

    impl PresetStore {
        fn with_sources(sources: &[&str]) -> Self {
            let chunks = sources
                .iter()
                .enumerate()
                .map(|(i, source)| RetrievedChunk {
                    id: Uuid::new_v4(),
                    content: format!("chunk {i}"),
                    metadata: ChunkMetadata {
                        source: source.to_string(),
                    },
                    similarity: 0.9 - i as f32 * 0.1,
                })
                .collect();
            Self { chunks }
        }

        fn empty() -> Self {
            Self { chunks: Vec::new() }
        }
    }

    #[async_trait]
    impl DocumentStore for PresetStore {
        async fn insert_document(&self, _name: &str) -> Result<Document, StoreError> {
            Err(StoreError::Insert("read-only".to_string()))
        }

        async fn insert_chunks(&self, _rows: &[NewChunk]) -> Result<(), StoreError> {
            Err(StoreError::Insert("read-only".to_string()))
        }

        async fn list_documents(&self) -> Result<Vec<Document>, StoreError> {
            Ok(Vec::new())
        }

        async fn delete_document(&self, _id: Uuid) -> Result<Option<u64>, StoreError> {
            Ok(None)
        }

        async fn similarity_search(
            &self,
            _embedding: &[f32],
            _threshold: f32,
            _limit: usize,
        ) -> Result<Vec<RetrievedChunk>, StoreError> {
            Ok(self.chunks.clone())
        }
    }

    /// Model that streams a fixed token sequence.
    struct ScriptedModel {
        tokens: Vec<Result<String, LlmError>>,
        answer: String,
    }

    impl ScriptedModel {
        fn speaking(tokens: &[&str]) -> Self {
            Self {
                tokens: tokens.iter().map(|t| Ok(t.to_string())).collect(),
                answer: tokens.concat(),
            }
        }

        fn failing_after(tokens: &[&str], error: &str) -> Self {
            let mut scripted: Vec<Result<String, LlmError>> =
                tokens.iter().map(|t| Ok(t.to_string())).collect();
            scripted.push(Err(LlmError::Stream(error.to_string())));
            Self {
                tokens: scripted,
                answer: String::new(),
            }
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        fn model_name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            Ok(self.answer.clone())
        }

        async fn complete_stream(&self, _prompt: &str) -> Result<TokenStream, LlmError> {
            let tokens: Vec<Result<String, LlmError>> = self
                .tokens
                .iter()
                .map(|t| match t {
                    Ok(s) => Ok(s.clone()),
                    Err(LlmError::Stream(m)) => Err(LlmError::Stream(m.clone())),
                    Err(LlmError::Provider(m)) => Err(LlmError::Provider(m.clone())),
                })
                .collect();
            Ok(futures::stream::iter(tokens).boxed())
        }
    }

    fn generator(store: PresetStore, model: ScriptedModel) -> AnswerGenerator {
        let retriever = Retriever::new(Arc::new(FixedEmbedder), Arc::new(store));
        AnswerGenerator::new(retriever, Arc::new(model))
    }

    #[tokio::test]
    async fn test_stream_event_order() {
        let gen = generator(
            PresetStore::with_sources(&["a.pdf"]),
            ScriptedModel::speaking(&["The", " answer", " is", " 42"]),
        );

        let events: Vec<AnswerEvent> = gen.ask_stream("what is it?").await.collect().await;

        assert_eq!(events.len(), 6);
        assert_eq!(events[0], AnswerEvent::Sources(vec!["a.pdf".to_string()]));
        assert_eq!(events[1], AnswerEvent::Token("The".to_string()));
        assert_eq!(events[2], AnswerEvent::Token(" answer".to_string()));
        assert_eq!(events[3], AnswerEvent::Token(" is".to_string()));
        assert_eq!(events[4], AnswerEvent::Token(" 42".to_string()));
        assert_eq!(events[5], AnswerEvent::Done);
    }

    #[tokio::test]
    async fn test_stream_with_no_context_is_single_error() {
        let gen = generator(PresetStore::empty(), ScriptedModel::speaking(&["unused"]));

        let events: Vec<AnswerEvent> = gen.ask_stream("anything?").await.collect().await;

        assert_eq!(
            events,
            vec![AnswerEvent::Error(NO_CONTEXT_MESSAGE.to_string())]
        );
    }

    #[tokio::test]
    async fn test_stream_failure_ends_with_error_not_done() {
        let gen = generator(
            PresetStore::with_sources(&["a.pdf"]),
            ScriptedModel::failing_after(&["partial"], "connection reset"),
        );

        let events: Vec<AnswerEvent> = gen.ask_stream("question").await.collect().await;

        assert_eq!(events.len(), 3);
        assert_eq!(events[1], AnswerEvent::Token("partial".to_string()));
        assert!(matches!(events[2], AnswerEvent::Error(_)));
    }

    #[tokio::test]
    async fn test_sources_deduplicated_in_first_seen_order() {
        let gen = generator(
            PresetStore::with_sources(&["b.pdf", "a.pdf", "b.pdf", "c.pdf"]),
            ScriptedModel::speaking(&["ok"]),
        );

        let events: Vec<AnswerEvent> = gen.ask_stream("question").await.collect().await;
        assert_eq!(
            events[0],
            AnswerEvent::Sources(vec![
                "b.pdf".to_string(),
                "a.pdf".to_string(),
                "c.pdf".to_string()
            ])
        );
    }

    #[tokio::test]
    async fn test_ask_materializes_answer_and_sources() {
        let gen = generator(
            PresetStore::with_sources(&["a.pdf", "b.pdf"]),
            ScriptedModel::speaking(&["Forty-two."]),
        );

        let answer = gen.ask("question").await.unwrap();
        assert_eq!(answer.text, "Forty-two.");
        assert_eq!(answer.sources, vec!["a.pdf".to_string(), "b.pdf".to_string()]);
    }

    #[tokio::test]
    async fn test_ask_with_no_context_fails() {
        let gen = generator(PresetStore::empty(), ScriptedModel::speaking(&["unused"]));
        let result = gen.ask("question").await;
        assert!(result.is_err());
    }

    #[test]
    fn test_prompt_contains_context_and_question() {
        let chunks = vec![RetrievedChunk {
            id: Uuid::new_v4(),
            content: "Paris is the capital of France.".to_string(),
            metadata: ChunkMetadata {
                source: "geo.pdf".to_string(),
            },
            similarity: 0.9,
        }];

        let prompt = build_prompt("What is the capital of France?", &chunks);
        assert!(prompt.contains("Paris is the capital of France."));
        assert!(prompt.contains("Question: What is the capital of France?"));
        assert!(prompt.contains("say you don't know"));
    }
}
