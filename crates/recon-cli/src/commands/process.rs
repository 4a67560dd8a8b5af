//! Process command - reconcile one batch of supplier documents.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use rust_decimal::Decimal;
use tracing::{debug, info};

use recon_core::{
    BatchInput, DocumentFile, Engine, FeeOverrides, LineItem, RunReport, SupplierConfig, TaxType,
};

use super::store::JsonStore;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Batch key (auction identifier)
    #[arg(long)]
    pub batch_key: String,

    /// Supplier name, used to pick the document extractors
    #[arg(long)]
    pub supplier: String,

    /// Document files: .csv, .pdf, or .txt with pre-extracted PDF text
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Store file holding items and run verdicts
    #[arg(long, default_value = "recon-store.json")]
    pub store: PathBuf,

    /// Write the run report as JSON (default: stdout summary)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Dump the extracted line items as CSV
    #[arg(long)]
    pub export_csv: Option<PathBuf>,

    /// Override the participation fee for this run
    #[arg(long)]
    pub participation_fee: Option<Decimal>,

    /// Tax type of the participation fee override (included/excluded)
    #[arg(long)]
    pub participation_fee_tax: Option<String>,

    /// Override the shipping fee for this run
    #[arg(long)]
    pub shipping_fee: Option<Decimal>,

    /// Tax type of the shipping fee override (included/excluded)
    #[arg(long)]
    pub shipping_fee_tax: Option<String>,
}

pub fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let overrides = fee_overrides(&args);

    let input = build_batch_input(&args)?;
    info!(
        batch = %input.batch_key,
        supplier = %input.supplier,
        files = input.files.len(),
        "processing batch"
    );

    let mut store = JsonStore::open(&args.store)?;
    let report = Engine::new(&mut store, &config).process_batch(&input, overrides)?;

    if let Some(path) = &args.export_csv {
        let items = store.items(&args.batch_key);
        fs::write(path, format_items_csv(&items)?)?;
        println!(
            "{} Items exported to {}",
            style("✓").green(),
            path.display()
        );
    }

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

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

pub fn load_config(config_path: Option<&str>) -> anyhow::Result<SupplierConfig> {
    match config_path {
        Some(path) => Ok(SupplierConfig::from_file(std::path::Path::new(path))?),
        None => Ok(SupplierConfig::default()),
    }
}

pub fn fee_overrides(args: &ProcessArgs) -> FeeOverrides {
    FeeOverrides {
        participation_fee: args.participation_fee,
        participation_fee_tax_type: args
            .participation_fee_tax
            .as_deref()
            .map(TaxType::parse),
        shipping_fee: args.shipping_fee,
        shipping_fee_tax_type: args.shipping_fee_tax.as_deref().map(TaxType::parse),
    }
}

/// Map each input path onto a document. A `.txt` file stands in for a
/// PDF whose text was extracted elsewhere; its content goes into the
/// pre-extracted text map and the document carries no bytes.
fn build_batch_input(args: &ProcessArgs) -> anyhow::Result<BatchInput> {
    let mut files = Vec::new();
    let mut extracted_text = HashMap::new();

    for path in &args.files {
        if !path.exists() {
            anyhow::bail!("Input file not found: {}", path.display());
        }
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let (media_type, data, text) = match extension.as_str() {
            "csv" => ("text/csv", Some(fs::read(path)?), None),
            "pdf" => ("application/pdf", Some(fs::read(path)?), None),
            "txt" => ("application/pdf", None, Some(fs::read_to_string(path)?)),
            _ => anyhow::bail!("Unsupported file format: {}", extension),
        };

        if let Some(text) = text {
            extracted_text.insert(file_name.clone(), text);
        }
        files.push(DocumentFile {
            file_id: file_name.clone(),
            file_name,
            media_type: media_type.to_string(),
            data,
        });
    }

    Ok(BatchInput {
        batch_key: args.batch_key.clone(),
        supplier: args.supplier.clone(),
        files,
        extracted_text,
    })
}

pub fn print_report(report: &RunReport) {
    println!(
        "{} {} items processed ({} created, {} updated, {} failed)",
        style("✓").green(),
        report.items_processed,
        report.items_created,
        report.items_updated,
        report.items_failed
    );

    match (report.invoice_amount, report.system_amount) {
        (Some(claimed), Some(system)) => {
            println!("  Invoice amount: ¥{}", claimed);
            println!("  System amount:  ¥{}", system);
        }
        (None, Some(system)) => {
            println!("  System amount:  ¥{}", system);
            println!("  Invoice amount: {}", style("not found").yellow());
        }
        _ => {}
    }

    if report.has_amount_mismatch {
        println!(
            "{} Amount mismatch{}",
            style("✗").red(),
            report
                .amount_difference
                .map(|d| format!(" (difference: ¥{})", d))
                .unwrap_or_default()
        );
    } else {
        println!("{} Amounts match", style("✓").green());
    }

    for error in &report.errors {
        eprintln!("  {} {}", style("!").yellow(), error);
    }
}

fn format_items_csv(items: &[&LineItem]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "product_id",
        "name",
        "purchase_price",
        "commission",
        "quantity",
        "brand",
        "box_number",
    ])?;

    for item in items {
        wtr.write_record([
            &item.product_id,
            &item.name,
            &item.purchase_price.to_string(),
            &item.commission.to_string(),
            &item.quantity.to_string(),
            &item.brand.clone().unwrap_or_default(),
            &item.box_number.clone().unwrap_or_default(),
        ])?;
    }

    Ok(String::from_utf8(wtr.into_inner()?)?)
}
