//! Reimbursement calculator
//!
//! ## Usage
//!
//! ```bash
//! calculate_reimbursement <days> <miles> <receipts> [case_index]
//! ```
//!
//! Prints only the amount with two decimals; diagnostics go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use reimbursement_core::logging::init_logging;
use reimbursement_core::{EngineConfig, ReimbursementEngine};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "calculate_reimbursement")]
#[command(about = "Calculate a travel reimbursement from trip figures")]
#[command(version, allow_negative_numbers = true)]
struct Cli {
    /// Trip duration in days ("5" or "5.0")
    days: f64,

    /// Miles traveled
    miles: f64,

    /// Total receipts amount
    receipts: f64,

    /// Case index; blank or non-numeric values count as 0
    #[arg(allow_hyphen_values = true)]
    case_index: Option<String>,

    /// Engine configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn parse_case_index(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(0)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = EngineConfig::resolve(cli.config.as_deref()).context("loading configuration")?;
    init_logging(&config.logging);

    let engine = ReimbursementEngine::init_global(&config).context("loading reimbursement models")?;
    let case_index = parse_case_index(cli.case_index.as_deref());
    let amount = engine
        .calculate(cli.days, cli.miles, cli.receipts, case_index)
        .context("calculating reimbursement")?;

    println!("{amount:.2}");
    Ok(())
}
