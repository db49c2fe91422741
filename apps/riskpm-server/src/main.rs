//! Virtual Risk Project Manager Server
//!
//! Serves the risk profile form and the REST API behind it:
//!
//! - Profile capture (business, project, tool, extra comments)
//! - Standards & regulations upload (PDF text extraction)
//! - Risk template generation / regeneration via a chat-completion service
//! - CSV download of the last parsed template
//!
//! ## Architecture
//!
//! One in-memory session per process. Each generate action makes exactly
//! one outbound completion request with an explicit timeout, then a single
//! parse attempt of the reply.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use clap::Parser;
use risk_engine::completion::{
    DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_MS,
};
use risk_engine::{CompletionService, CompletionSettings, OpenAiClient, Session};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;

use api::{
    handle_clear_standards, handle_download, handle_generate, handle_get_session, handle_health,
    handle_index, handle_regenerate, handle_update_profile, handle_upload_standards,
};

/// Command-line arguments for the risk template server
#[derive(Parser, Debug)]
#[command(name = "riskpm-server")]
#[command(about = "Virtual Risk Project Manager - risk template generation server")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "RISKPM_PORT", default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, env = "RISKPM_HOST", default_value = "127.0.0.1")]
    host: String,

    /// API key for the completion service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Chat-completions endpoint
    #[arg(long, env = "RISKPM_API_URL", default_value = DEFAULT_ENDPOINT)]
    api_url: String,

    /// Model identifier
    #[arg(long, env = "RISKPM_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Sampling temperature
    #[arg(long, env = "RISKPM_TEMPERATURE", default_value_t = DEFAULT_TEMPERATURE)]
    temperature: f32,

    /// Completion request timeout in milliseconds
    #[arg(long, env = "RISKPM_TIMEOUT_MS", default_value_t = DEFAULT_TIMEOUT_MS)]
    timeout_ms: u64,

    /// Maximum upload size in megabytes
    #[arg(long, env = "RISKPM_MAX_UPLOAD_MB", default_value = "50")]
    max_upload_mb: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The single form session
    pub session: Arc<Mutex<Session>>,
    /// Completion service used for generation
    pub completion: Arc<dyn CompletionService>,
    /// Model parameters for every request
    pub settings: Arc<CompletionSettings>,
}

impl AppState {
    pub fn new(completion: Arc<dyn CompletionService>, settings: CompletionSettings) -> Self {
        Self {
            session: Arc::new(Mutex::new(Session::new())),
            completion,
            settings: Arc::new(settings),
        }
    }
}

/// Build the full router
pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Form page
        .route("/", get(handle_index))
        // Health check
        .route("/health", get(handle_health))
        // Session
        .route("/api/session", get(handle_get_session))
        .route("/api/profile", put(handle_update_profile))
        .route(
            "/api/standards",
            post(handle_upload_standards).delete(handle_clear_standards),
        )
        // Template generation
        .route("/api/generate", post(handle_generate))
        .route("/api/regenerate", post(handle_regenerate))
        .route("/api/template/download", get(handle_download))
        // Apply middleware
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting riskpm server on {}:{}", args.host, args.port);

    let client = OpenAiClient::new(args.api_url.clone(), args.api_key.clone(), args.timeout_ms)?;
    if !client.is_configured() {
        warn!("OPENAI_API_KEY is not set; template generation will be unavailable");
    }

    let settings = CompletionSettings {
        model: args.model.clone(),
        temperature: args.temperature,
    };

    let state = AppState::new(Arc::new(client), settings);
    let app = build_router(state, args.max_upload_mb * 1024 * 1024);

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Completion endpoint: {} (model {})", args.api_url, args.model);
    info!("Completion timeout: {}ms", args.timeout_ms);

    axum::serve(listener, app).await?;

    Ok(())
}
