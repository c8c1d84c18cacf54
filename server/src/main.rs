//! Plant Disease Prediction Server
//!
//! HTTP API serving plant disease diagnoses from leaf images.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use leaf_disease::backend::{backend_name, configure_cpu_math};
use leaf_disease::config::InternalErrorStatus;
use leaf_disease::inference::BurnModelLoader;
use leaf_disease::utils::logging::{init_logging, parse_level, LogConfig};
use leaf_disease::AppConfig;
use leaf_disease_server::{build_router, AppState};

/// Plant Disease Prediction Server
#[derive(Parser, Debug)]
#[command(name = "leaf-disease-server")]
#[command(version)]
#[command(about = "HTTP API server for plant disease prediction")]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, env = "PLANT_DISEASE_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "PLANT_DISEASE_PORT")]
    port: Option<u16>,

    /// Host to bind to
    #[arg(long, env = "PLANT_DISEASE_HOST")]
    host: Option<String>,

    /// Path to the serialized model record
    #[arg(short, long, env = "PLANT_DISEASE_MODEL_PATH")]
    model: Option<PathBuf>,

    /// Load the model at startup instead of on first request
    #[arg(long, default_value = "false")]
    preload: bool,

    /// Flag predictions whose probability does not exceed this cutoff (0.0-1.0)
    #[arg(long)]
    confidence_threshold: Option<f32>,

    /// Answer internal failures with 500 instead of 400
    #[arg(long, default_value = "false")]
    strict_errors: bool,

    /// Keep multi-threaded CPU math kernels
    #[arg(long, env = "PLANT_DISEASE_CPU_OPTS", default_value = "false")]
    enable_cpu_optimizations: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "PLANT_DISEASE_LOG", default_value = "info")]
    log_level: String,
}

impl Cli {
    /// Apply command-line overrides on top of the file configuration
    fn apply(&self, config: &mut AppConfig) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(model) = &self.model {
            config.model.path = model.clone();
        }
        if self.preload {
            config.model.preload = true;
        }
        if let Some(cutoff) = self.confidence_threshold {
            config.threshold.enabled = true;
            config.threshold.cutoff = cutoff;
        }
        if self.strict_errors {
            config.errors.internal_status = InternalErrorStatus::InternalServerError;
        }
        if self.enable_cpu_optimizations {
            config.disable_cpu_math_optimizations = false;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(&LogConfig::server(parse_level(&cli.log_level)))?;

    // Build configuration
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    cli.apply(&mut config);
    config.validate()?;

    configure_cpu_math(config.disable_cpu_math_optimizations);

    info!("Plant Disease Server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Backend:        {}", backend_name());
    info!("  Model path:     {:?}", config.model.path);
    info!("  Normalization:  {:?}", config.preprocessing.normalization);
    info!(
        "  Threshold:      {}",
        if config.threshold.enabled {
            format!("{:.2}", config.threshold.cutoff)
        } else {
            "disabled".to_string()
        }
    );
    info!("  Internal error: {:?}", config.errors.internal_status);

    if !config.model.path.exists() {
        warn!(
            "Model not found at {:?}. Predictions will fail with 500 until it is deployed.",
            config.model.path
        );
    }

    // Create shared state
    let loader = Arc::new(BurnModelLoader::new(config.model.architecture.clone()));
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let preload = config.model.preload;
    let state = Arc::new(AppState::new(config, loader)?);

    if preload {
        if let Err(e) = state.predictor.classifier().get().await {
            warn!("Model preload failed, will retry on first request: {}", e);
        }
    }

    let app = build_router(state);

    // Start server
    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
