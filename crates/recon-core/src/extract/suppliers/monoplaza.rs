//! Monoplaza (モノプラザ) documents.
//!
//! Monoplaza's PDF carries no line items at all, only a reconciliation
//! summary with labeled totals. Whether a given file is that PDF or a
//! regular items CSV is decided by the binary signature on the first
//! bytes, not by the declared media type.

use tracing::warn;

use crate::error::ExtractError;
use crate::extract::csv_generic::{self, CsvSpec, CsvEncoding, GENERIC_COLUMNS};
use crate::extract::patterns::{MONO_COMMISSION, MONO_PARTICIPATION, MONO_SUBTOTAL, MONO_TOTAL};
use crate::extract::pdf_text_from_bytes;
use crate::extract::DocumentInput;
use crate::models::item::{InvoiceSummary, ParseOutput};
use crate::normalize::normalize_price;

const PDF_SIGNATURE: &[u8] = b"%PDF";

const CSV_SPEC: CsvSpec = CsvSpec {
    encoding: CsvEncoding::Utf8,
    columns: GENERIC_COLUMNS,
    skip_records: &[],
};

pub fn parse(input: DocumentInput<'_>) -> Result<ParseOutput, ExtractError> {
    match input {
        DocumentInput::Text(text) => parse_summary_text(text),
        DocumentInput::Bytes(bytes) if bytes.starts_with(PDF_SIGNATURE) => {
            let text = pdf_text_from_bytes(bytes)?;
            parse_summary_text(&text)
        }
        DocumentInput::Bytes(bytes) => csv_generic::parse(bytes, &CSV_SPEC),
    }
}

fn parse_summary_text(text: &str) -> Result<ParseOutput, ExtractError> {
    let Some(caps) = MONO_TOTAL.captures(text) else {
        warn!("monoplaza payable-amount label not found; document yields nothing");
        return Ok(ParseOutput::empty());
    };

    let mut summary =
        InvoiceSummary::new(normalize_price(&caps[1])).with_source("monoplaza_invoice");
    summary.subtotal = MONO_SUBTOTAL
        .captures(text)
        .map(|c| normalize_price(&c[1]));
    summary.other_fees = MONO_COMMISSION
        .captures(text)
        .map(|c| normalize_price(&c[1]));
    summary.participation_fee = MONO_PARTICIPATION
        .captures(text)
        .map(|c| normalize_price(&c[1]));

    Ok(ParseOutput {
        items: Vec::new(),
        invoice_summary: Some(summary),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    const SHEET: &str = "\
モノプラザ株式会社 精算書

仕入小計 ¥1,650,000
手数料小計 ¥49,500
参加費 ¥3,300
お支払金額合計 ¥1,702,800
";

    #[test]
    fn test_labeled_totals() {
        let out = parse_summary_text(SHEET).unwrap();
        assert!(out.items.is_empty());

        let summary = out.invoice_summary.unwrap();
        assert_eq!(summary.total_amount, Decimal::from(1_702_800));
        assert_eq!(summary.subtotal, Some(Decimal::from(1_650_000)));
        assert_eq!(summary.other_fees, Some(Decimal::from(49_500)));
        assert_eq!(summary.participation_fee, Some(Decimal::from(3_300)));
        assert_eq!(summary.metadata["source"], "monoplaza_invoice");
    }

    #[test]
    fn test_missing_total_yields_nothing() {
        let out = parse_summary_text("仕入小計 1,000\n").unwrap();
        assert!(out.invoice_summary.is_none());
    }

    #[test]
    fn test_non_pdf_bytes_parse_as_csv() {
        let csv = "商品ID,商品名,落札金額\nMP-1,ネックレス,52000\n";
        let out = parse(DocumentInput::Bytes(csv.as_bytes())).unwrap();
        assert_eq!(out.items.len(), 1);
        assert_eq!(out.items[0].product_id, "MP-1");
        assert!(out.invoice_summary.is_none());
    }
}
