//! Accuracy of the reimbursement engine over a labelled case corpus
//!
//! ```bash
//! evaluate_cases public_cases.json --index-mode position --worst 5
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use reimbursement_core::logging::init_logging;
use reimbursement_core::{evaluate_cases, load_cases, EngineConfig, IndexMode, ReimbursementEngine};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "evaluate_cases")]
#[command(about = "Compare engine output with expected reimbursements")]
#[command(version)]
struct Cli {
    /// Case corpus (JSON array)
    cases: PathBuf,

    /// Case index passed to the engine: zero | position
    #[arg(long, default_value = "zero")]
    index_mode: IndexMode,

    /// Number of worst cases to list
    #[arg(long, default_value_t = 5)]
    worst: usize,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,

    /// Engine configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = EngineConfig::resolve(cli.config.as_deref()).context("loading configuration")?;
    init_logging(&config.logging);

    let engine = ReimbursementEngine::from_config(&config).context("loading reimbursement models")?;
    let cases = load_cases(&cli.cases)?;
    let report = evaluate_cases(&engine, &cases, cli.index_mode).context("evaluating cases")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("cases:           {}", report.count);
    println!("index mode:      {}", report.index_mode);
    println!("mean abs error:  ${:.2}", report.mean_abs_error);
    match report.max_error_case {
        Some(index) => println!("max abs error:   ${:.2} (case {index})", report.max_abs_error),
        None => println!("max abs error:   -"),
    }
    println!("exact (< $0.01): {}", report.exact_matches);
    println!("close (< $1.00): {}", report.close_matches);

    let worst = report.worst(cli.worst);
    if !worst.is_empty() {
        println!();
        println!("worst cases:");
        for outcome in worst {
            println!(
                "  #{:<5} days={:<4} miles={:<8} receipts={:<9} expected={:.2} got={:.2} error={:+.2}",
                outcome.index,
                outcome.days,
                outcome.miles,
                outcome.receipts,
                outcome.expected,
                outcome.predicted,
                outcome.error
            );
        }
    }

    let (primary, _) = engine.cache_stats();
    tracing::debug!(hits = primary.hits, misses = primary.misses, "primary cache");
    Ok(())
}
