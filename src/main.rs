use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use thumbnail_compositor::{
    composition::{AnimationRequest, CompositionEngine, CompositionReport, StillRequest},
    config::Config,
};

#[derive(Parser)]
#[command(
    name = "thumbnail-compositor",
    version,
    about = "Compose still and animated thumbnails from video frames",
    long_about = "Thumbnail-Compositor places zoomed and panned frames into a layout, adds text and a logo, and writes a PNG or a looping GIF."
)]
struct Cli {
    /// Configuration file (optional)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compose a still PNG thumbnail
    Still {
        /// Request file (TOML or JSON)
        #[arg(short, long)]
        request: PathBuf,

        /// Override the configured output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Compose an animated GIF thumbnail
    Gif {
        /// Request file (TOML or JSON)
        #[arg(short, long)]
        request: PathBuf,

        /// Override the configured output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Print basic facts about a video
    Probe {
        video: PathBuf,
    },

    /// Save a single frame of a video as PNG
    Capture {
        video: PathBuf,

        /// Timestamp in seconds
        #[arg(long)]
        at: f64,

        /// Destination PNG file
        #[arg(long)]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting Thumbnail-Compositor v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => Config::default(),
    };

    let engine = CompositionEngine::from_config(config)?;

    match cli.command {
        Command::Still { request, output_dir } => {
            let request = StillRequest::from_file(&request)
                .with_context(|| format!("Failed to read request {:?}", request))?;
            let engine = with_output_dir(engine, output_dir);
            print_report(&engine.create_still(request).await)
        }
        Command::Gif { request, output_dir } => {
            let request = AnimationRequest::from_file(&request)
                .with_context(|| format!("Failed to read request {:?}", request))?;
            let engine = with_output_dir(engine, output_dir);
            print_report(&engine.create_animation(request).await)
        }
        Command::Probe { video } => {
            let info = engine.probe(&video).await.map_err(|e| anyhow::anyhow!(e.user_message()))?;
            println!("{}", serde_json::to_string_pretty(&info)?);
            Ok(())
        }
        Command::Capture { video, at, out } => {
            let frame = engine
                .capture(&video, at)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            frame
                .as_image()
                .save(&out)
                .with_context(|| format!("Failed to save frame to {:?}", out))?;
            info!("Saved {}x{} frame to {:?}", frame.width(), frame.height(), out);
            Ok(())
        }
    }
}

fn with_output_dir(engine: CompositionEngine, output_dir: Option<PathBuf>) -> CompositionEngine {
    match output_dir {
        Some(dir) => engine.with_output_dir(dir),
        None => engine,
    }
}

/// Print the report as JSON and fail the process if the request failed
fn print_report(report: &CompositionReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    if !report.success {
        std::process::exit(1);
    }
    Ok(())
}
