//! Convert a legacy text model into canonical dump JSON
//!
//! ```bash
//! convert_model full_model.txt full_model.json
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use reimbursement_core::config::LoggingConfig;
use reimbursement_core::loader::{convert_legacy, persist_canonical};
use reimbursement_core::logging::init_logging;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "convert_model")]
#[command(about = "Convert a legacy text model to canonical JSON")]
#[command(version)]
struct Cli {
    /// Legacy text model
    legacy: PathBuf,

    /// Canonical JSON output path
    canonical: PathBuf,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&LoggingConfig {
        level: "info".to_string(),
    });

    let dump = convert_legacy(&cli.legacy)
        .with_context(|| format!("reading {}", cli.legacy.display()))?;
    let ensemble = dump
        .to_ensemble(&cli.legacy)
        .with_context(|| format!("building ensemble from {}", cli.legacy.display()))?;
    persist_canonical(&dump, &cli.canonical)
        .with_context(|| format!("writing {}", cli.canonical.display()))?;
    info!(output = %cli.canonical.display(), "canonical model written");

    let summary = ensemble.summary();
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("trees:             {}", summary.num_trees);
        println!("leaves:            {}", summary.num_leaves);
        println!("max depth:         {}", summary.max_depth);
        match summary.max_feature_index {
            Some(index) => println!("max feature index: {index}"),
            None => println!("max feature index: -"),
        }
        println!("features:          {}", summary.feature_names.join(", "));
    }
    Ok(())
}
