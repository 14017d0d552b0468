use chrono::Utc;
use clap::{Parser, Subcommand};
use pdf_qa_core::{
    Embedder, GenerationParams, Generator, HashEmbedder, HttpEmbedder, HttpGenerator,
    IndexStorage, JsonDocumentStore, QaEngine, QaOptions, ResponseMode,
    DEFAULT_EMBEDDING_DIMENSIONS,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pdf-qa", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory holding document records and persisted indices
    #[arg(long, default_value = "./qa_data")]
    data_dir: PathBuf,

    /// Generation endpoint URL
    #[arg(long, env = "GENERATION_ENDPOINT", default_value = "http://localhost:8080/generate")]
    generate_endpoint: String,

    /// Bearer token for the generation endpoint
    #[arg(long, env = "GENERATION_API_KEY")]
    generate_api_key: Option<String>,

    /// The generation endpoint echoes the prompt before the answer
    /// (continuation-style models)
    #[arg(long, default_value_t = false)]
    echoes_prompt: bool,

    /// Embedding endpoint URL; the local hashing embedder is used when unset
    #[arg(long, env = "EMBED_ENDPOINT")]
    embed_endpoint: Option<String>,

    /// Bearer token for the embedding endpoint
    #[arg(long, env = "EMBED_API_KEY")]
    embed_api_key: Option<String>,

    /// Embedding dimensionality
    #[arg(long, default_value_t = DEFAULT_EMBEDDING_DIMENSIONS)]
    embed_dimensions: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Extract a PDF's text, index it, and print the new document id.
    Upload {
        /// Path to the PDF file
        #[arg(long)]
        pdf: String,
    },
    /// Ask a question against an uploaded document.
    Ask {
        /// Document id returned by upload
        #[arg(long)]
        document_id: i64,
        /// Natural-language question
        #[arg(long)]
        question: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    let embedder: Arc<dyn Embedder> = match &cli.embed_endpoint {
        Some(endpoint) => Arc::new(HttpEmbedder::new(
            endpoint,
            cli.embed_api_key.clone(),
            cli.embed_dimensions,
        )),
        None => Arc::new(HashEmbedder {
            dimensions: cli.embed_dimensions,
        }),
    };

    let response_mode = if cli.echoes_prompt {
        ResponseMode::EchoesPrompt
    } else {
        ResponseMode::Direct
    };
    let generator: Arc<dyn Generator> = Arc::new(HttpGenerator::new(
        &cli.generate_endpoint,
        cli.generate_api_key.clone(),
        response_mode,
        GenerationParams::default(),
    ));

    let store = JsonDocumentStore::new(cli.data_dir.join("documents.json"));
    let storage = IndexStorage::new(cli.data_dir.join("indices"));
    let engine = QaEngine::new(store, embedder, generator, storage, QaOptions::default());

    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "pdf-qa boot"
    );

    match cli.command {
        Command::Upload { pdf } => {
            let document_id = engine
                .upload_pdf(Path::new(&pdf))
                .await
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;
            info!(document_id, pdf = %pdf, "pdf indexed");
            println!("document_id: {document_id}");
        }
        Command::Ask {
            document_id,
            question,
        } => {
            let answer = engine
                .ask(document_id, &question)
                .await
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;
            println!("{answer}");
        }
    }

    Ok(())
}
