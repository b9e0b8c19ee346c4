//! End-to-end exercise of the service facade: ingest, poll, list, ask,
//! delete, using in-process providers so no network is involved.

use async_trait::async_trait;
use docqa::config::Config;
use docqa::service::{DeleteOutcome, DocQaService};
use docqa_core::{AnswerEvent, JobStatus, LanguageModel, LlmError, TokenStream};
use docqa_embed::HashEmbedder;
use docqa_query::NO_CONTEXT_MESSAGE;
use docqa_store::MemoryStore;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use uuid::Uuid;

struct ScriptedModel {
    tokens: Vec<String>,
}

impl ScriptedModel {
    fn new(tokens: &[&str]) -> Self {
        Self {
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
        }
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
        Ok(self.tokens.concat())
    }

    async fn complete_stream(&self, _prompt: &str) -> Result<TokenStream, LlmError> {
        let tokens: Vec<Result<String, LlmError>> =
            self.tokens.iter().cloned().map(Ok).collect();
        Ok(futures::stream::iter(tokens).boxed())
    }
}

fn test_service(staging: &TempDir) -> DocQaService {
    let mut config = Config::default();
    config.chunking.chunk_size = 60;
    config.chunking.overlap = 15;
    config.embedding.batch_size = 2;
    config.ingest.insert_batch_size = 2;
    // Hash embeddings of unrelated texts can land anywhere on the sphere, so
    // accept every chunk and rely on ranking
    config.retrieval.threshold = -1.0;

    DocQaService::new(
        &config,
        Arc::new(HashEmbedder::new(16)),
        Arc::new(MemoryStore::new()),
        Arc::new(ScriptedModel::new(&["The", " answer", " is", " 42."])),
        staging.path().to_path_buf(),
    )
    .unwrap()
}

async fn ingest_and_wait(service: &DocQaService, name: &str, content: &str) -> Uuid {
    let job_id = service.submit_upload(name, content.as_bytes()).await.unwrap();
    for _ in 0..500 {
        let progress = service.job_status(job_id).await;
        match progress.status {
            JobStatus::Complete => return job_id,
            JobStatus::Error => panic!("ingestion failed: {}", progress.message),
            _ => tokio::time::sleep(Duration::from_millis(5)).await,
        }
    }
    panic!("ingestion never finished");
}

#[tokio::test]
async fn test_ingest_then_ask_then_delete() {
    let staging = TempDir::new().unwrap();
    let service = test_service(&staging);

    let job_id = ingest_and_wait(
        &service,
        "notes.txt",
        "The project deadline is in March.\n\nBudget was approved last week.\n\nKickoff happens on Monday.",
    )
    .await;

    // Final job record
    let progress = service.job_status(job_id).await;
    assert_eq!(progress.progress, 100);
    assert!(progress.total_chunks > 0);
    assert_eq!(progress.processed_chunks, progress.total_chunks);
    assert_eq!(progress.filename, "notes.txt");

    // Document is listed
    let documents = service.documents().await.unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].name, "notes.txt");

    // Streamed answer: sources first, then tokens, then done
    let events: Vec<AnswerEvent> = service
        .ask_stream("When is the deadline?")
        .await
        .collect()
        .await;

    assert_eq!(
        events.first(),
        Some(&AnswerEvent::Sources(vec!["notes.txt".to_string()]))
    );
    assert_eq!(events.last(), Some(&AnswerEvent::Done));
    let text: String = events
        .iter()
        .filter_map(|e| match e {
            AnswerEvent::Token(t) => Some(t.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(text, "The answer is 42.");

    // Materialized answer agrees
    let answer = service.ask("When is the deadline?").await.unwrap();
    assert_eq!(answer.text, "The answer is 42.");
    assert_eq!(answer.sources, vec!["notes.txt".to_string()]);

    // Delete cascades; a repeat delete of the same id is a miss
    let outcome = service.delete_document(documents[0].id).await.unwrap();
    assert!(matches!(outcome, DeleteOutcome::Deleted { chunks } if chunks > 0));
    assert_eq!(
        service.delete_document(documents[0].id).await.unwrap(),
        DeleteOutcome::NotFound
    );
    assert!(service.documents().await.unwrap().is_empty());

    // With nothing stored, asking reports the no-context condition in-band
    let events: Vec<AnswerEvent> = service.ask_stream("Anything left?").await.collect().await;
    assert_eq!(
        events,
        vec![AnswerEvent::Error(NO_CONTEXT_MESSAGE.to_string())]
    );
}

#[tokio::test]
async fn test_multiple_documents_cite_multiple_sources() {
    let staging = TempDir::new().unwrap();
    let service = test_service(&staging);

    ingest_and_wait(&service, "a.txt", "Alpha document body with several words.").await;
    ingest_and_wait(&service, "b.txt", "Bravo document body with other words.").await;

    let documents = service.documents().await.unwrap();
    assert_eq!(documents.len(), 2);

    let events: Vec<AnswerEvent> = service.ask_stream("What is in them?").await.collect().await;
    match events.first() {
        Some(AnswerEvent::Sources(sources)) => {
            assert!(!sources.is_empty());
            for source in sources {
                assert!(source == "a.txt" || source == "b.txt");
            }
        }
        other => panic!("expected sources event, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_job_status() {
    let staging = TempDir::new().unwrap();
    let service = test_service(&staging);

    let progress = service.job_status(Uuid::new_v4()).await;
    assert_eq!(progress.status, JobStatus::NotFound);
}

#[tokio::test]
async fn test_delete_unknown_document() {
    let staging = TempDir::new().unwrap();
    let service = test_service(&staging);

    let outcome = service.delete_document(Uuid::new_v4()).await.unwrap();
    assert_eq!(outcome, DeleteOutcome::NotFound);
}
