//! fieldscan Server
//!
//! REST front end for the field extraction pipeline. Takes raw output from a
//! text recognition engine and returns typed, validated document fields:
//!
//! - Field extraction against the default or a per-request catalog
//! - Text validation with document-type rules (Aadhaar, PAN, passport)
//! - Per-block document processing
//!
//! ## Architecture
//!
//! The pipeline itself is synchronous and stateless. The server only holds
//! the immutable default catalog and service config, shared through `Arc`,
//! and adds:
//!
//! - Rate limiting via tower-governor
//! - Request tracing via tower-http

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use clap::Parser;
use field_engine::FieldCatalog;
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod config;
mod error;

use api::{
    handle_extract_fields, handle_health, handle_list_document_types, handle_list_fields,
    handle_process_document, handle_validate_text,
};
use config::ServiceConfig;

/// Command-line arguments for the fieldscan server
#[derive(Parser, Debug)]
#[command(name = "fieldscan-server")]
#[command(about = "fieldscan server for OCR field extraction and validation")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "API_PORT", default_value = "8000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, env = "API_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Rate limit: requests per second per IP
    #[arg(long, default_value = "10")]
    rate_limit: u32,

    /// Service config file (YAML)
    #[arg(short, long, env = "FIELDSCAN_CONFIG", default_value = "config/fieldscan.yaml")]
    config: PathBuf,

    /// Field catalog file (YAML or JSON), overrides the config's catalog
    #[arg(long, env = "FIELDSCAN_CATALOG")]
    catalog: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Default catalog, used when a request brings no field definitions
    pub catalog: Arc<FieldCatalog>,
    pub config: Arc<ServiceConfig>,
}

impl AppState {
    pub fn new(catalog: FieldCatalog, config: ServiceConfig) -> Self {
        Self {
            catalog: Arc::new(catalog),
            config: Arc::new(config),
        }
    }
}

/// All routes, without the per-IP rate limiter
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handle_health))
        // API endpoints
        .route("/api/fields", get(handle_list_fields))
        .route("/api/document-types", get(handle_list_document_types))
        .route("/api/fields/extract", post(handle_extract_fields))
        .route("/api/validate", post(handle_validate_text))
        .route("/api/document/process", post(handle_process_document))
        // Apply middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
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

    info!("Starting fieldscan server on {}:{}", args.host, args.port);

    let config = ServiceConfig::load(&args.config)
        .with_context(|| format!("Failed to load config {}", args.config.display()))?;
    let catalog = config
        .catalog(args.catalog.as_deref())
        .context("Failed to build field catalog")?;

    info!("Default catalog: {} fields", catalog.len());

    // Create rate limiter configuration
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(args.rate_limit.into())
            .burst_size(args.rate_limit * 2)
            .finish()
            .context("Failed to create rate limiter config")?,
    );

    let threshold = config.ocr.confidence_threshold;
    let app = build_router(AppState::new(catalog, config)).layer(GovernorLayer {
        config: governor_conf,
    });

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Rate limit: {} requests/second per IP", args.rate_limit);
    info!("Default confidence threshold: {}", threshold);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
