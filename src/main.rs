use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use clap::{Parser, Subcommand};
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use concierge::cli;
use concierge::config::AppConfig;
use concierge::db;
use concierge::handlers;
use concierge::services::ai::ollama::OllamaProvider;
use concierge::services::ai::openai::OpenAiProvider;
use concierge::services::ai::LlmProvider;
use concierge::services::ingest;
use concierge::services::retrieval::SqliteRetriever;
use concierge::state::AppState;

#[derive(Parser)]
#[command(name = "concierge", version, about = "Document Q&A and appointment booking assistant")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Chat in the terminal (default)
    Chat,
    /// Serve the session API over HTTP
    Serve,
    /// Load a plain-text document into the excerpt store
    Ingest {
        path: PathBuf,
        /// Name stored with the excerpts (defaults to the file name)
        #[arg(long)]
        source: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Chat);

    let default_filter = match command {
        Command::Chat => "warn",
        _ => "info",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::from_env();

    let mut conn = db::init_db(&config.database_url)?;

    if let Command::Ingest { path, source } = &command {
        let count = ingest::ingest_file(&mut conn, path, source.as_deref())?;
        tracing::info!(path = %path.display(), chunks = count, "ingest complete");
        return Ok(());
    }

    ingest::ensure_ingested(&mut conn, Path::new(&config.document_path))?;

    let llm = build_llm(&config)?;
    let db = Arc::new(Mutex::new(conn));

    let state = Arc::new(AppState {
        db: Arc::clone(&db),
        config: config.clone(),
        llm,
        retriever: Box::new(SqliteRetriever::new(db)),
        sessions: tokio::sync::Mutex::new(HashMap::new()),
    });

    match command {
        Command::Serve => {
            let app = handlers::router(state);
            let addr = format!("0.0.0.0:{}", config.port);
            tracing::info!("starting server on {addr}");

            let listener = tokio::net::TcpListener::bind(&addr).await?;
            axum::serve(listener, app).await?;
        }
        _ => {
            let interrupt = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!(error = %e, "failed to listen for interrupt");
                    std::future::pending::<()>().await;
                }
            };
            let stdin = BufReader::new(tokio::io::stdin());
            cli::run_chat_loop(&state, stdin, tokio::io::stdout(), interrupt).await?;
        }
    }

    Ok(())
}

fn build_llm(config: &AppConfig) -> anyhow::Result<Box<dyn LlmProvider>> {
    let llm: Box<dyn LlmProvider> = match config.llm_provider.as_str() {
        "groq" => {
            anyhow::ensure!(!config.groq_api_key.is_empty(), "GROQ_API_KEY must be set when LLM_PROVIDER=groq");
            tracing::info!("using Groq LLM provider (model: {})", config.groq_model);
            Box::new(OpenAiProvider::new(
                "https://api.groq.com/openai/v1".to_string(),
                config.groq_api_key.clone(),
                config.groq_model.clone(),
                config.llm_timeout_secs,
            )?)
        }
        "ollama" => {
            tracing::info!("using Ollama LLM provider (url: {})", config.ollama_url);
            Box::new(OllamaProvider::new(
                config.ollama_url.clone(),
                config.ollama_model.clone(),
                config.llm_timeout_secs,
            )?)
        }
        "openai" => {
            anyhow::ensure!(!config.openai_api_key.is_empty(), "OPENAI_API_KEY must be set when LLM_PROVIDER=openai");
            tracing::info!("using OpenAI LLM provider (model: {})", config.openai_model);
            Box::new(OpenAiProvider::new(
                config.openai_base_url.clone(),
                config.openai_api_key.clone(),
                config.openai_model.clone(),
                config.llm_timeout_secs,
            )?)
        }
        other => anyhow::bail!("unknown LLM_PROVIDER '{other}' (expected openai, groq or ollama)"),
    };
    Ok(llm)
}
