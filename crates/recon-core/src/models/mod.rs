//! Data models for line items, supplier configuration and run verdicts.

pub mod config;
pub mod item;
pub mod run;

pub use config::{CalculationType, FeeConfig, RoundingConfig, RoundingMode, SupplierConfig, TaxType};
pub use item::{InvoiceSummary, LineItem, ParseOutput};
pub use run::{FeeOverrides, ReconciliationRun, RunReport, RunStatus};
