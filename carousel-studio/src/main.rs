//! # Carousel Studio CLI
//!
//! Render templated carousels, apply scripted edits and export slides.

use std::path::{Path, PathBuf};

use anyhow::Context;
use carousel_core::{EngineConfig, PlaceholderRenderer};
use carousel_studio::{
    build_deck, export_deck, fill_media, read_rows, read_templates, EditScript, StudioClient,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(version, about = "Carousel Studio - render, edit and export slide carousels", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Engine configuration file (JSON)
    #[arg(long, env = "CAROUSEL_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render templates with local data and export edited slides
    Render {
        /// Template file; repeat to cycle several templates
        #[arg(short, long = "template", required = true)]
        templates: Vec<PathBuf>,

        /// JSON array of slide rows
        #[arg(short, long)]
        data: PathBuf,

        /// Edit script to apply before export
        #[arg(short, long)]
        script: Option<PathBuf>,

        /// Output directory
        #[arg(short, long, default_value = "slides")]
        out: PathBuf,
    },
    /// Generate a carousel with the service and export it
    Generate {
        /// Service base URL
        #[arg(long, env = "CAROUSEL_API_URL")]
        base_url: String,

        /// Generation code
        #[arg(long)]
        code: String,

        /// Template identifier
        #[arg(long)]
        template_id: String,

        /// Edit script to apply before export
        #[arg(short, long)]
        script: Option<PathBuf>,

        /// Output directory
        #[arg(short, long, default_value = "slides")]
        out: PathBuf,
    },
    /// Search for image URLs
    Search {
        /// Service base URL
        #[arg(long, env = "CAROUSEL_API_URL")]
        base_url: String,

        /// Search keyword
        keyword: String,
    },
}

/// Initialize structured tracing with optional JSON format.
///
/// Set `RUST_LOG` to control log levels (default: info,carousel_core=debug,carousel_studio=debug).
/// Set `RUST_LOG_FORMAT=json` for JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,carousel_core=debug,carousel_studio=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn load_script(path: Option<&Path>) -> anyhow::Result<EditScript> {
    match path {
        Some(path) => EditScript::from_path(path)
            .with_context(|| format!("failed to load edit script {}", path.display())),
        None => Ok(EditScript::default()),
    }
}

fn render_and_export(
    config: EngineConfig,
    templates: &[String],
    rows: &[carousel_core::SlideContent],
    script: &EditScript,
    out: &Path,
) -> anyhow::Result<()> {
    let mut editor = build_deck(
        config,
        templates,
        rows,
        PlaceholderRenderer,
        &script.media_sizes,
    )?;
    let report = script.apply(&mut editor)?;
    tracing::info!(
        "Edit script: {} applied, {} skipped",
        report.applied,
        report.skipped
    );
    let paths = export_deck(&editor, out)?;
    for path in paths {
        println!("{}", path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Render {
            templates,
            data,
            script,
            out,
        } => {
            let templates = read_templates(&templates)?;
            let rows = read_rows(&data)
                .with_context(|| format!("failed to read slide data {}", data.display()))?;
            let script = load_script(script.as_deref())?;
            render_and_export(config, &templates, &rows, &script, &out)?;
        }
        Commands::Generate {
            base_url,
            code,
            template_id,
            script,
            out,
        } => {
            let client = StudioClient::new(&base_url)?;
            let template = client
                .fetch_template(&template_id)
                .await
                .with_context(|| format!("failed to fetch template {template_id}"))?;
            let mut rows = client
                .generate_carousel(&code, &template_id)
                .await
                .context("carousel generation failed")?;
            let filled = fill_media(&mut rows, &client).await?;
            tracing::debug!("Filled media for {filled} slides from search");
            let script = load_script(script.as_deref())?;
            render_and_export(config, &[template], &rows, &script, &out)?;
        }
        Commands::Search { base_url, keyword } => {
            let client = StudioClient::new(&base_url)?;
            for url in client.search_images(&keyword).await? {
                println!("{url}");
            }
        }
    }

    Ok(())
}
