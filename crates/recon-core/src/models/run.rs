//! Reconciliation run records and the per-run report contract.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::config::TaxType;

/// Lifecycle of a reconciliation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Created,
    Processing,
    /// All items persisted.
    Success,
    /// Some items failed to persist.
    Partial,
    /// Nothing persisted, or an unrecoverable failure.
    Error,
}

/// Run-level fee overrides. A non-null value takes precedence over the
/// supplier configuration for this run only.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participation_fee: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub participation_fee_tax_type: Option<TaxType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_fee: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_fee_tax_type: Option<TaxType>,
}

/// Persisted import-log record tying a batch of documents to a verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationRun {
    /// Key of the auction/batch this run belongs to.
    pub batch_key: String,

    /// Resolved supplier name.
    pub supplier: String,

    pub status: RunStatus,

    /// Claimed total from the supplier documents. None means no ground
    /// truth was found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_amount: Option<Decimal>,

    /// Independently recomputed total.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_amount: Option<i64>,

    /// Absolute difference between claimed and computed totals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_difference: Option<Decimal>,

    pub has_amount_mismatch: bool,

    /// Mutating these after the fact must trigger recomputation of the
    /// amounts above from the persisted line items.
    #[serde(flatten)]
    pub fee_overrides: FeeOverrides,

    pub started_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl ReconciliationRun {
    pub fn new(
        batch_key: impl Into<String>,
        supplier: impl Into<String>,
        fee_overrides: FeeOverrides,
    ) -> Self {
        Self {
            batch_key: batch_key.into(),
            supplier: supplier.into(),
            status: RunStatus::Created,
            invoice_amount: None,
            system_amount: None,
            amount_difference: None,
            has_amount_mismatch: false,
            fee_overrides,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Apply the comparison policy to a computed total and an optional
    /// claimed total.
    ///
    /// Any difference of one whole currency unit or more is a mismatch;
    /// sub-unit noise is tolerated. Absence of a claimed total is itself a
    /// mismatch (no ground truth is a red flag, not a pass).
    pub fn set_totals(&mut self, invoice_amount: Option<Decimal>, system_amount: i64) {
        self.system_amount = Some(system_amount);
        self.invoice_amount = invoice_amount;

        match invoice_amount {
            Some(claimed) => {
                let diff = (claimed - Decimal::from(system_amount)).abs();
                self.amount_difference = Some(diff);
                self.has_amount_mismatch = diff >= Decimal::ONE;
            }
            None => {
                self.amount_difference = None;
                self.has_amount_mismatch = true;
            }
        }
    }
}

/// Aggregate result reported to the caller after a run.
///
/// This is the literal contract the surrounding CLI/UI reports to end
/// users: counts, a human-readable error list, and the verdict.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    pub items_processed: usize,
    pub items_succeeded: usize,
    pub items_failed: usize,

    /// Upsert outcome split of the succeeded items.
    pub items_created: usize,
    pub items_updated: usize,

    pub errors: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_amount: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_amount: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_difference: Option<Decimal>,

    pub has_amount_mismatch: bool,

    pub status: RunStatus,
}

impl Default for RunStatus {
    fn default() -> Self {
        Self::Created
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run() -> ReconciliationRun {
        ReconciliationRun::new("batch-1", "apex", FeeOverrides::default())
    }

    #[test]
    fn test_whole_unit_difference_is_mismatch() {
        let mut r = run();
        r.set_totals(Some(Decimal::from(100_000)), 99_999);
        assert_eq!(r.amount_difference, Some(Decimal::ONE));
        assert!(r.has_amount_mismatch);
    }

    #[test]
    fn test_exact_match() {
        let mut r = run();
        r.set_totals(Some(Decimal::from(100_000)), 100_000);
        assert_eq!(r.amount_difference, Some(Decimal::ZERO));
        assert!(!r.has_amount_mismatch);
    }

    #[test]
    fn test_sub_unit_noise_tolerated() {
        let mut r = run();
        r.set_totals(Some(Decimal::new(1000005, 1)), 100_000);
        assert!(!r.has_amount_mismatch);
    }

    #[test]
    fn test_no_ground_truth_is_mismatch() {
        let mut r = run();
        r.set_totals(None, 100_000);
        assert!(r.invoice_amount.is_none());
        assert!(r.amount_difference.is_none());
        assert!(r.has_amount_mismatch);
    }
}
