//! Line item and invoice summary models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One purchased unit extracted from a supplier document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// Unique key for persistence. Derived per supplier: box+row
    /// concatenation, a sequential number, a tag/lot number, or a
    /// supplier-native ID.
    pub product_id: String,

    /// Product description. Required, non-empty.
    pub name: String,

    /// Pre-fee unit cost. Whether this is tax-included or tax-excluded is
    /// defined by the supplier configuration, not by the item.
    pub purchase_price: Decimal,

    /// Per-item commission. Same tax-inclusion ambiguity as the price.
    #[serde(default)]
    pub commission: Decimal,

    /// Quantity purchased.
    #[serde(default = "default_quantity")]
    pub quantity: u32,

    /// Brand name, when the document carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    /// Box number from positional listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub box_number: Option<String>,

    /// Row number within the box.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_number: Option<String>,

    /// The supplier's own product identifier, when distinct from
    /// `product_id`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_product_id: Option<String>,

    /// Supplier-specific extras: accessories, serial numbers, source row
    /// numbers.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

fn default_quantity() -> u32 {
    1
}

impl LineItem {
    /// Create an item with the required fields; everything else defaults.
    pub fn new(product_id: impl Into<String>, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            product_id: product_id.into(),
            name: name.into(),
            purchase_price: price,
            commission: Decimal::ZERO,
            quantity: 1,
            brand: None,
            box_number: None,
            row_number: None,
            original_product_id: None,
            metadata: HashMap::new(),
        }
    }

    /// Acceptance check applied by every extractor: a non-empty name and a
    /// non-negative price. Rows failing this are dropped, not fatal.
    pub fn is_acceptable(&self) -> bool {
        !self.name.trim().is_empty() && self.purchase_price >= Decimal::ZERO
    }
}

/// The claimed total as printed on a supplier document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceSummary {
    /// The figure the system total is reconciled against.
    pub total_amount: Decimal,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub participation_fee: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_fee: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_fees: Option<Decimal>,

    /// Provenance: which pattern or document section produced this summary.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl InvoiceSummary {
    pub fn new(total_amount: Decimal) -> Self {
        Self {
            total_amount,
            subtotal: None,
            tax: None,
            participation_fee: None,
            shipping_fee: None,
            other_fees: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.metadata.insert("source".to_string(), source.into());
        self
    }
}

/// Result of parsing one document: zero or more line items plus at most one
/// invoice summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseOutput {
    pub items: Vec<LineItem>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_summary: Option<InvoiceSummary>,
}

impl ParseOutput {
    pub fn empty() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acceptance() {
        let item = LineItem::new("1", "ロレックス", Decimal::from(1000));
        assert!(item.is_acceptable());

        let mut blank = item.clone();
        blank.name = "  ".to_string();
        assert!(!blank.is_acceptable());

        let mut negative = item;
        negative.purchase_price = Decimal::from(-1);
        assert!(!negative.is_acceptable());
    }

    #[test]
    fn test_quantity_defaults_on_deserialize() {
        let item: LineItem = serde_json::from_str(
            r#"{"product_id":"1","name":"test","purchase_price":"100"}"#,
        )
        .unwrap();
        assert_eq!(item.quantity, 1);
        assert_eq!(item.commission, Decimal::ZERO);
    }
}
