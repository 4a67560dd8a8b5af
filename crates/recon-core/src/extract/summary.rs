//! Generic invoice-summary extraction from reference/cover PDF text.
//!
//! Secondary extractor: applied when the primary product extractor did not
//! yield a claimed total. Labeled patterns are tried most specific first;
//! the matched label is recorded as provenance.

use rust_decimal::Decimal;
use tracing::debug;

use super::patterns::SUMMARY_LABELS;
use crate::models::item::InvoiceSummary;
use crate::normalize::normalize_price;

/// Scan text for a labeled claimed total. Returns `None` when no label
/// matches or the matched amount is zero.
pub fn extract_summary(text: &str) -> Option<InvoiceSummary> {
    for (label, pattern) in SUMMARY_LABELS.iter() {
        if let Some(caps) = pattern.captures(text) {
            let amount = normalize_price(&caps[1]);
            if amount > Decimal::ZERO {
                debug!(label, %amount, "matched claimed total");
                let mut summary = InvoiceSummary::new(amount).with_source("summary_regex");
                summary
                    .metadata
                    .insert("matched_label".to_string(), (*label).to_string());
                return Some(summary);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_labeled_total() {
        let text = "お取引明細\nご請求金額 ¥1,234,500円\n";
        let summary = extract_summary(text).unwrap();
        assert_eq!(summary.total_amount, Decimal::from(1_234_500));
        assert_eq!(summary.metadata["matched_label"], "ご請求金額");
    }

    #[test]
    fn test_specific_label_wins_over_generic() {
        let text = "合計 999\n合計金額：1,000\n";
        // 合計金額 is tried before the bare 合計 label.
        let summary = extract_summary(text).unwrap();
        assert_eq!(summary.total_amount, Decimal::from(1_000));
        assert_eq!(summary.metadata["matched_label"], "合計金額");
    }

    #[test]
    fn test_no_label_yields_none() {
        assert!(extract_summary("納品書\n商品A 1,000\n").is_none());
        assert!(extract_summary("").is_none());
    }

    #[test]
    fn test_zero_amount_rejected() {
        assert!(extract_summary("請求金額 0").is_none());
    }
}
