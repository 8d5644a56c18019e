use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;

use ayur_assist::core::config::{AppPaths, ConfigService};
use ayur_assist::core::logging;
use ayur_assist::ingest::Ingestor;
use ayur_assist::rag::RagContext;

#[derive(Parser, Debug)]
#[command(
    name = "ayur-ingest",
    about = "Embed the JSON / JSONL knowledge base into the vector store"
)]
struct IngestCli {
    /// Directory of .json / .jsonl documents (defaults to ingest.source_dir)
    #[arg(long, env = "AYUR_SOURCE_DIR")]
    source: Option<PathBuf>,

    /// Clear the store and embed everything again
    #[arg(long, default_value_t = false)]
    force_rebuild: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = IngestCli::parse();
    let paths = Arc::new(AppPaths::new());
    logging::init(&paths, "ingest.log", "info");

    let settings = ConfigService::new(paths.clone())
        .load_app_config()
        .context("failed to load configuration")?;
    let source = cli
        .source
        .unwrap_or_else(|| paths.resolve(&settings.ingest.source_dir));

    if !source.is_dir() {
        bail!(
            "source directory {} not found; pass --source DIR or set ingest.source_dir \
             (relative paths resolve under {})",
            source.display(),
            paths.user_data_dir.display()
        );
    }

    let context = RagContext::from_config(&paths, &settings)
        .await
        .context("failed to open vector store")?;
    let report = Ingestor::from_config(context.clone(), &settings)
        .ingest(&source, cli.force_rebuild)
        .await
        .with_context(|| format!("ingestion from {} failed", source.display()))?;

    if report.skipped_existing {
        println!("Vector store already populated; nothing embedded (use --force-rebuild to redo).");
    } else {
        println!(
            "Embedded {} chunk(s) from {} file(s) in {}",
            report.embedded,
            report.files,
            source.display()
        );
    }
    if report.skipped_lines > 0 || report.skipped_entries > 0 {
        println!(
            "Skipped {} malformed line(s) and {} entries without text",
            report.skipped_lines, report.skipped_entries
        );
    }
    println!("Store now holds {} chunk(s)", context.store.count().await?);

    Ok(())
}
