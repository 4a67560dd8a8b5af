//! Core library for supplier document reconciliation.
//!
//! This crate provides:
//! - Per-supplier document extraction (CSV and PDF text) into a
//!   normalized line-item model
//! - Japanese text and price normalization helpers
//! - Tax and rounding calculation over extracted items
//! - The reconciliation engine comparing claimed invoice totals against
//!   recomputed system totals

pub mod calc;
pub mod error;
pub mod extract;
pub mod models;
pub mod normalize;
pub mod reconcile;

pub use error::{ExtractError, ReconError, Result, StoreError};
pub use models::config::{
    CalculationType, FeeConfig, RoundingConfig, RoundingMode, SupplierConfig, TaxType,
};
pub use models::item::{InvoiceSummary, LineItem, ParseOutput};
pub use models::run::{FeeOverrides, ReconciliationRun, RunReport, RunStatus};
pub use extract::{DocumentInput, Extractor};
pub use reconcile::{BatchInput, DocumentFile, Engine, ItemStore, MemoryStore, UpsertOutcome};
