use anyhow::{Context, Result};
use clap::Parser;
use interview_agent::config::StorageBackend;
use interview_agent::speech::{HttpSynthesisGateway, HttpTranscriptionGateway};
use interview_agent::{
    create_router, AppState, Config, JsonFileStore, MemoryStore, OllamaClient, Store,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "interview-agent", version, about = "Interview automation backend")]
struct Args {
    /// Configuration file (extension optional)
    #[arg(long, default_value = "config/interview-agent")]
    config: String,

    /// Override `service.http.bind`
    #[arg(long)]
    bind: Option<String>,

    /// Override `service.http.port`
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut cfg = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config))?;
    if let Some(bind) = args.bind {
        cfg.service.http.bind = bind;
    }
    if let Some(port) = args.port {
        cfg.service.http.port = port;
    }

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("LLM: {} ({})", cfg.llm.base_url, cfg.llm.model);

    let store: Arc<dyn Store> = match cfg.storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory storage");
            Arc::new(MemoryStore::new())
        }
        StorageBackend::File => Arc::new(
            JsonFileStore::open(&cfg.storage.data_path)
                .await
                .with_context(|| {
                    format!("Failed to open data directory {}", cfg.storage.data_path)
                })?,
        ),
    };

    let completion = Arc::new(OllamaClient::from_config(&cfg.llm));
    let transcriber = Arc::new(HttpTranscriptionGateway::from_config(&cfg.speech)?);
    let synthesizer = Arc::new(HttpSynthesisGateway::from_config(&cfg.speech)?);

    let state = AppState::new(
        store,
        completion,
        &cfg.llm,
        transcriber,
        synthesizer,
        cfg.speech.default_voice.clone(),
    );
    let app = create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app).await.context("HTTP server error")?;
    Ok(())
}
