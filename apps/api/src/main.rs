mod config;
mod errors;
mod interview;
mod llm_client;
mod models;
mod routes;
mod state;
mod storage;

use std::fs::{self, OpenOptions};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::interview::flow::FlowController;
use crate::interview::questions::QuestionGenerator;
use crate::interview::sessions::SessionRegistry;
use crate::llm_client::rate_limit::RateLimitedClient;
use crate::llm_client::{GroqClient, ModelClient};
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::CandidateStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration first; a missing API key aborts startup
    let config = Config::from_env()?;

    init_tracing(&config)?;

    info!("Starting TalentScout API v{}", env!("CARGO_PKG_VERSION"));

    // Candidate store
    let store = Arc::new(CandidateStore::new(&config.data_dir, config.retention_days));
    store.init()?;

    // LLM client, optionally behind the rate limiter
    let groq = GroqClient::new(&config)?;
    info!("LLM client initialized (model: {})", groq.model());
    let client: Arc<dyn ModelClient> = if config.enable_rate_limiting {
        info!(
            "Rate limiting LLM calls to {} per {}s",
            config.rate_limit_requests, config.rate_limit_period
        );
        Arc::new(RateLimitedClient::new(
            Arc::new(groq),
            config.rate_limit_requests,
            Duration::from_secs(config.rate_limit_period),
        ))
    } else {
        Arc::new(groq)
    };

    let flow = FlowController::new(QuestionGenerator::new(client), store.clone());

    // Abandoned sessions are swept once a minute
    let sessions = SessionRegistry::new(Duration::from_secs(config.session_idle_timeout_mins * 60));
    sessions.spawn_reaper(Duration::from_secs(60));
    info!(
        "Sessions expire after {} idle minutes",
        config.session_idle_timeout_mins
    );

    let state = AppState {
        config: config.clone(),
        flow: Arc::new(flow),
        sessions,
        store,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Console logging, plus a plain-text copy to `LOG_FILE` when set.
/// `RUST_LOG` overrides `LOG_LEVEL`.
fn init_tracing(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "talentscout_api={level},tower_http={level}",
            level = config.log_level
        ))
    });

    let file_layer = match &config.log_file {
        Some(path) => {
            if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory for {path}"))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {path}"))?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    Ok(())
}
