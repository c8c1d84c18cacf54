//! Leaf Disease CLI
//!
//! Front-end for the prediction service: uploads a leaf image to the
//! `/predict/disease` endpoint and prints the diagnosis. Also lists the known
//! diseases and can run the preprocessing step locally for debugging.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::debug;

use leaf_disease::client::{render_prediction, DiagnosisClient};
use leaf_disease::utils::format_millis;
use leaf_disease::utils::logging::{init_logging, LogConfig};
use leaf_disease::{AppConfig, Preprocessor};

/// Plant disease recognition from leaf images
#[derive(Parser, Debug)]
#[command(name = "leaf_disease")]
#[command(version)]
#[command(about = "Upload a leaf image and get a plant disease diagnosis", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, default_value = "false")]
    verbose: bool,

    /// JSON configuration file
    #[arg(short, long, env = "PLANT_DISEASE_CONFIG")]
    config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send an image to the prediction service
    Predict {
        /// Path to the leaf image (jpg, jpeg, png)
        image: PathBuf,

        /// Prediction endpoint URL
        #[arg(short, long, env = "PLANT_DISEASE_ENDPOINT")]
        endpoint: Option<String>,
    },

    /// List the diseases the classifier knows
    Classes,

    /// Preprocess an image locally and print tensor statistics
    Inspect {
        /// Path to the image
        image: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&LogConfig::cli(cli.verbose))?;

    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Predict { image, endpoint } => predict(&config, image, endpoint).await,
        Commands::Classes => classes(&config),
        Commands::Inspect { image } => inspect(&config, image),
    }
}

async fn predict(config: &AppConfig, image: PathBuf, endpoint: Option<String>) -> Result<()> {
    let mut settings = config.client.clone();
    if let Some(endpoint) = endpoint {
        settings.endpoint = endpoint;
    }

    let client = DiagnosisClient::new(&settings)?;
    debug!("Posting {:?} to {}", image, client.endpoint());

    println!("{}", "Memprediksi...".dimmed());
    match client.predict_file(&image).await {
        Ok(response) => {
            println!("{}", "Prediksi Berhasil!".green().bold());
            print!("{}", render_prediction(&response.data));
        }
        Err(e) => {
            eprintln!("{}", e.to_string().red());
            std::process::exit(1);
        }
    }

    Ok(())
}

fn classes(config: &AppConfig) -> Result<()> {
    let (catalog, index) = config.load_catalog()?;

    println!("{}", "Kelas Penyakit".bold());
    for (i, record) in catalog.ordered(&index) {
        println!("{:>2}. {}", i, record.name.cyan());
        println!("    {}", record.description);
        println!("    {} {}", "Penanganan:".dimmed(), record.treatment);
    }

    Ok(())
}

fn inspect(config: &AppConfig, image: PathBuf) -> Result<()> {
    let bytes = std::fs::read(&image)?;
    let preprocessor = Preprocessor::new(config.preprocessing.clone());

    let start = Instant::now();
    let tensor = preprocessor.preprocess_bytes(&bytes)?;
    let elapsed = start.elapsed();

    let (min, max, mean) = tensor.stats();
    println!("Image: {:?}", image);
    println!("Normalization: {:?}", config.preprocessing.normalization);
    println!("Tensor shape: {:?}", tensor.shape());
    println!("Values: min={:.3}, max={:.3}, mean={:.3}", min, max, mean);
    println!("Preprocessing time: {}", format_millis(elapsed.as_secs_f64()));

    Ok(())
}
