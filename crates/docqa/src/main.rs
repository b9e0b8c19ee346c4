//! # docqa CLI
//!
//! Command-line interface for docqa, a document Q&A system: ingest PDF and
//! text files, then ask questions answered from their content with source
//! citations.
//!
//! The store lives in process memory, so documents are ingested and
//! questioned within one invocation.
//!
//! ## Commands
//!
//! - `docqa ask <QUESTION> -f <FILE>...` - Ingest files, then ask once
//! - `docqa shell -f <FILE>...` - Interactive session; `:docs`, `:delete`,
//!   and `:quit` are meta-commands, everything else is a question
//! - `docqa config show|init|path` - Manage configuration
//!
//! ## Examples
//!
//! ```bash
//! docqa ask "What does the report conclude?" -f report.pdf
//! docqa shell -f report.pdf -f notes.md
//! ```
//!
//! Requires `OPENAI_API_KEY` for embedding and answer generation.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docqa::config::Config;
use docqa::service::{DeleteOutcome, DocQaService};
use docqa_core::{AnswerEvent, JobStatus};
use docqa_embed::OpenAiEmbedder;
use docqa_llm::OpenAiChat;
use docqa_store::MemoryStore;
use futures::StreamExt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "docqa")]
#[command(about = "Document Q&A over your own files")]
#[command(version)]
struct Cli {
    /// Path to config file (default: ~/.config/docqa/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest files and ask a single question
    Ask {
        /// The question
        question: String,

        /// Files to ingest first (.pdf, .txt, .md); repeatable
        #[arg(short, long = "file")]
        files: Vec<PathBuf>,
    },

    /// Interactive question-answering session
    Shell {
        /// Files to ingest on startup; repeatable
        #[arg(short, long = "file")]
        files: Vec<PathBuf>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Print sample configuration file
    Init,
    /// Show config file path
    Path,
}

/// Build the service from config and environment.
fn create_service(config: &Config) -> Result<DocQaService> {
    let api_key = std::env::var("OPENAI_API_KEY")
        .context("OPENAI_API_KEY is not set; docqa needs it for embeddings and answers")?;

    let embedder = Arc::new(
        OpenAiEmbedder::new(api_key.clone())
            .with_model(config.embedding.model.clone(), config.embedding.dimension),
    );
    let model = Arc::new(OpenAiChat::new(api_key).with_model(config.llm.model.clone()));
    let store = Arc::new(MemoryStore::new());

    let staging_dir = config
        .staging_dir()
        .context("Failed to determine staging directory")?;

    DocQaService::new(config, embedder, store, model, staging_dir)
        .context("Failed to build service")
}

/// Ingest one file, printing progress until the job reaches a terminal state.
async fn ingest_file(service: &DocQaService, file: &Path) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }
    let filename = file
        .file_name()
        .and_then(|n| n.to_str())
        .context("File has no usable name")?
        .to_string();

    let bytes = tokio::fs::read(file).await?;
    let job_id = service.submit_upload(&filename, &bytes).await?;

    // Poll like a frontend would
    let mut last_message = String::new();
    loop {
        let progress = service.job_status(job_id).await;
        if progress.message != last_message {
            println!("[{:>3}%] {}", progress.progress, progress.message);
            last_message = progress.message.clone();
        }
        match progress.status {
            JobStatus::Complete => return Ok(()),
            JobStatus::Error => anyhow::bail!("ingestion failed: {}", progress.message),
            _ => tokio::time::sleep(Duration::from_millis(200)).await,
        }
    }
}

/// Stream one answer to stdout. Returns an error for in-band error events.
async fn stream_answer(service: &DocQaService, question: &str) -> Result<()> {
    let mut events = service.ask_stream(question).await;

    while let Some(event) = events.next().await {
        match event {
            AnswerEvent::Sources(sources) => {
                println!("Sources: {}", sources.join(", "));
                println!();
            }
            AnswerEvent::Token(token) => {
                print!("{token}");
                std::io::stdout().flush().ok();
            }
            AnswerEvent::Done => {
                println!();
                return Ok(());
            }
            AnswerEvent::Error(message) => {
                println!();
                anyhow::bail!("{message}");
            }
        }
    }
    Ok(())
}

async fn list_documents(service: &DocQaService) -> Result<()> {
    let documents = service.documents().await?;
    if documents.is_empty() {
        println!("No documents ingested.");
    } else {
        for doc in &documents {
            println!(
                "{}  {}  ({})",
                doc.id,
                doc.name,
                doc.created_at.format("%Y-%m-%d %H:%M:%S")
            );
        }
    }
    Ok(())
}

/// Interactive loop: questions and `:`-prefixed meta-commands.
async fn run_shell(service: &DocQaService) -> Result<()> {
    use tokio::io::{AsyncBufReadExt, BufReader};

    println!("docqa shell - ask a question, or :docs, :delete <id>, :quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();

        match line {
            "" => {}
            ":quit" | ":exit" => break,
            ":docs" => list_documents(service).await?,
            _ if line.starts_with(":delete") => {
                let arg = line.trim_start_matches(":delete").trim();
                match arg.parse::<Uuid>() {
                    Ok(id) => match service.delete_document(id).await? {
                        DeleteOutcome::Deleted { chunks } => {
                            println!("Deleted document {id} ({chunks} chunks)");
                        }
                        DeleteOutcome::NotFound => println!("Document not found: {id}"),
                    },
                    Err(_) => println!("Usage: :delete <document-id>"),
                }
            }
            question => {
                if let Err(err) = stream_answer(service, question).await {
                    println!("{err}");
                }
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load_from(cli.config.clone().or_else(Config::config_path))
        .context("Failed to load config")?;

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        config.logging.level.parse().unwrap_or(Level::INFO)
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    match cli.command {
        Commands::Ask { question, files } => {
            let service = create_service(&config)?;
            for file in &files {
                ingest_file(&service, file).await?;
            }
            stream_answer(&service, &question).await?;
        }

        Commands::Shell { files } => {
            let service = create_service(&config)?;
            for file in &files {
                ingest_file(&service, file).await?;
            }
            run_shell(&service).await?;
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                println!("{}", toml::to_string_pretty(&config)?);
            }
            ConfigAction::Init => {
                println!("{}", Config::sample_toml());
            }
            ConfigAction::Path => {
                if let Some(path) = Config::config_path() {
                    println!("{}", path.display());
                } else {
                    println!("Could not determine config directory");
                }
            }
        },
    }

    Ok(())
}
