//! Recompute command - re-run calculation over a stored batch.
//!
//! The persisted line items are the snapshot of record; only fee
//! overrides and configuration can change between runs.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use rust_decimal::Decimal;
use tracing::info;

use recon_core::{Engine, TaxType};

use super::process::{load_config, print_report};
use super::store::JsonStore;

/// Arguments for the recompute command.
#[derive(Args)]
pub struct RecomputeArgs {
    /// Batch key of the stored run
    #[arg(long)]
    pub batch_key: String,

    /// Store file holding items and run verdicts
    #[arg(long, default_value = "recon-store.json")]
    pub store: PathBuf,

    /// Write the run report as JSON (default: stdout summary)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Replace the participation fee override
    #[arg(long)]
    pub participation_fee: Option<Decimal>,

    /// Tax type of the participation fee override (included/excluded)
    #[arg(long)]
    pub participation_fee_tax: Option<String>,

    /// Replace the shipping fee override
    #[arg(long)]
    pub shipping_fee: Option<Decimal>,

    /// Tax type of the shipping fee override (included/excluded)
    #[arg(long)]
    pub shipping_fee_tax: Option<String>,
}

pub fn run(args: RecomputeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let mut store = JsonStore::open(&args.store)?;
    let Some(run) = store.run(&args.batch_key) else {
        anyhow::bail!("No stored run for batch {}", args.batch_key);
    };
    let mut run = run.clone();

    if let Some(fee) = args.participation_fee {
        run.fee_overrides.participation_fee = Some(fee);
    }
    if let Some(tax) = &args.participation_fee_tax {
        run.fee_overrides.participation_fee_tax_type = Some(TaxType::parse(tax));
    }
    if let Some(fee) = args.shipping_fee {
        run.fee_overrides.shipping_fee = Some(fee);
    }
    if let Some(tax) = &args.shipping_fee_tax {
        run.fee_overrides.shipping_fee_tax_type = Some(TaxType::parse(tax));
    }

    info!(batch = %args.batch_key, "recomputing run");
    let report = Engine::new(&mut store, &config).recompute(&mut run)?;

    if let Some(path) = &args.output {
        fs::write(path, serde_json::to_string_pretty(&report)?)?;
        println!(
            "{} Report written to {}",
            style("✓").green(),
            path.display()
        );
    } else {
        print_report(&report);
    }

    Ok(())
}
