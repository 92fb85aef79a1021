//! docchat application binary - composition root.
//!
//! Ties together the docchat crates into a single executable:
//! 1. Load configuration from TOML
//! 2. Initialize the document store and the in-process vector store
//! 3. Wire the ingestion and retrieval backends into a session orchestrator
//! 4. Run the interactive chat loop on stdin

mod cli;

use std::path::{Path, PathBuf};

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use docchat_core::config::DocChatConfig;
use docchat_rag::{
    HashEmbedding, IngestionService, LocalIngestionService, LocalRetrievalService,
    RetrievalService,
};
use docchat_session::{SessionError, SessionOrchestrator};
use docchat_store::DocumentStore;

use cli::CliArgs;

/// Expand ~ to home directory in a path string.
fn resolve_data_dir(data_dir: &str) -> PathBuf {
    if data_dir.starts_with("~/") || data_dir.starts_with("~\\") {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(&data_dir[2..])
    } else {
        PathBuf::from(data_dir)
    }
}

/// Read a file and stage it into the session.
async fn open_document<I: IngestionService, R: RetrievalService>(
    orch: &mut SessionOrchestrator<I, R>,
    path: &Path,
) -> Result<(), String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());

    let doc = orch
        .stage_document(&bytes, &filename)
        .map_err(|e| e.to_string())?;
    println!("Staged '{}' ({} bytes). Use :ingest to build the index.", doc.filename, doc.size);
    Ok(())
}

/// Build the index for the currently staged document.
async fn ingest<I: IngestionService, R: RetrievalService>(
    orch: &mut SessionOrchestrator<I, R>,
) -> Result<(), String> {
    let doc = orch
        .session()
        .document()
        .cloned()
        .ok_or_else(|| "no document staged; use :open <path> first".to_string())?;

    println!("Building index for '{}'...", doc.filename);
    let handle = orch.build_index(&doc).await.map_err(|e| e.to_string())?;
    println!("Index '{}' ready. Ask away.", handle);
    Ok(())
}

fn print_status<I: IngestionService, R: RetrievalService>(orch: &SessionOrchestrator<I, R>) {
    let session = orch.session();
    println!("phase:    {}", session.phase());
    match session.document() {
        Some(doc) => println!("document: {} ({} bytes)", doc.filename, doc.size),
        None => println!("document: none"),
    }
    match session.index_handle() {
        Some(handle) => println!("index:    {}", handle),
        None => println!("index:    none"),
    }
    println!("history:  {} turns", session.history().len());
}

fn print_help() {
    println!("Commands:");
    println!("  :open <path>  stage a document for ingestion");
    println!("  :ingest       build the vector index for the staged document");
    println!("  :status       show the session state");
    println!("  :reset        clear the session");
    println!("  :quit         exit");
    println!("Anything else is asked as a question about the indexed document.");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Tracing. Flag wins over RUST_LOG, which wins over the config file.
    let config_file = args.resolve_config_path();
    let config = DocChatConfig::load_or_default(&config_file);
    let log_level = args
        .resolve_log_level()
        .unwrap_or_else(|| config.general.log_level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    tracing::info!("Starting docchat v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // Storage.
    let data_dir = args
        .resolve_data_dir()
        .map(|d| resolve_data_dir(&d))
        .unwrap_or_else(|| resolve_data_dir(&config.general.data_dir));
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::error!(path = %data_dir.display(), error = %e, "Failed to create data directory");
        return Err(e.into());
    }
    let staging_dir = data_dir.join(&config.storage.staging_dir);
    let store = DocumentStore::new(&staging_dir)?;
    tracing::info!(path = %staging_dir.display(), "Document store ready");

    // In-process vector store shared by ingestion and retrieval.
    let vectors = docchat_rag::VectorStore::new();
    let ingestion = LocalIngestionService::new(
        vectors.clone(),
        HashEmbedding::new(),
        config.ingestion.clone(),
    );
    let retrieval = LocalRetrievalService::new(
        vectors,
        HashEmbedding::new(),
        config.retrieval.clone(),
    );
    let mut orch = SessionOrchestrator::new(store, ingestion, retrieval);

    // Optionally open and ingest a document given on the command line.
    if let Some(path) = args.document.clone() {
        if let Err(e) = open_document(&mut orch, &path).await {
            eprintln!("error: {}", e);
        } else if let Err(e) = ingest(&mut orch).await {
            eprintln!("error: {}", e);
        }
    }

    println!("docchat — type :help for commands.");

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        stdout.write_all(b"docchat> ").await?;
        stdout.flush().await?;

        let line = match lines.next_line().await? {
            Some(line) => line,
            None => break, // EOF
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            ":quit" | ":q" | ":exit" => break,
            ":help" | ":h" => print_help(),
            ":status" => print_status(&orch),
            ":reset" => {
                orch.reset();
                println!("Session cleared.");
            }
            ":ingest" => {
                if let Err(e) = ingest(&mut orch).await {
                    eprintln!("error: {}", e);
                }
            }
            _ if input.starts_with(":open") => {
                match input.strip_prefix(":open").map(str::trim) {
                    Some(path) if !path.is_empty() => {
                        if let Err(e) = open_document(&mut orch, Path::new(path)).await {
                            eprintln!("error: {}", e);
                        }
                    }
                    _ => eprintln!("usage: :open <path>"),
                }
            }
            _ if input.starts_with(':') => {
                eprintln!("unknown command '{}'; type :help", input);
            }
            question => match orch.ask(question).await {
                Ok(answer) => println!("{}", answer),
                Err(SessionError::PreconditionFailed { .. }) => {
                    eprintln!("No indexed document yet; use :open <path> then :ingest.");
                }
                Err(e) => eprintln!("error: {}", e),
            },
        }
    }

    orch.reset();
    tracing::info!("docchat exiting");
    Ok(())
}
