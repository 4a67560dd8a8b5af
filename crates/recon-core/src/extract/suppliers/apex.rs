//! Apex (アペックス) auction result PDFs.
//!
//! Item rows sit between a 落札明細 start marker and a 合計 line. The 合計
//! line yields this document's own summary, but it totals a different
//! section than the authoritative grand-total line on Apex's reference
//! sheets, so the reconciliation engine prefers a reference-derived total
//! when one exists.

use tracing::{debug, warn};

use crate::error::ExtractError;
use crate::extract::patterns::{APEX_ITEM, APEX_TOTAL};
use crate::models::item::{InvoiceSummary, LineItem, ParseOutput};
use crate::normalize::normalize_price;

const START_MARKER: &str = "落札明細";

pub fn parse(text: &str) -> Result<ParseOutput, ExtractError> {
    let mut items = Vec::new();
    let mut invoice_summary = None;
    let mut in_table = false;

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();

        if !in_table {
            if line.contains(START_MARKER) {
                in_table = true;
            }
            continue;
        }

        if let Some(caps) = APEX_TOTAL.captures(line) {
            let price_total = normalize_price(&caps[1]);
            let commission_total = caps.get(2).map(|m| normalize_price(m.as_str()));

            let mut summary = InvoiceSummary::new(
                price_total + commission_total.unwrap_or_default(),
            )
            .with_source("items_pdf_total");
            summary.subtotal = Some(price_total);
            summary.other_fees = commission_total;
            invoice_summary = Some(summary);
            break;
        }

        let Some(caps) = APEX_ITEM.captures(line) else {
            continue;
        };

        let mut item = LineItem::new(
            caps[1].to_string(),
            caps[2].trim().to_string(),
            normalize_price(&caps[3]),
        );
        item.commission = normalize_price(&caps[4]);
        item.metadata
            .insert("source_line".to_string(), (line_no + 1).to_string());

        if item.is_acceptable() {
            items.push(item);
        } else {
            debug!(line_no, "dropping unacceptable apex row");
        }
    }

    if !in_table {
        warn!("apex start marker not found; document yields nothing");
        return Ok(ParseOutput::empty());
    }

    Ok(ParseOutput {
        items,
        invoice_summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    const SAMPLE: &str = "\
アペックス株式会社
落札結果のご案内

落札明細
No 商品名 落札金額 手数料
1 デイトジャスト 116234 450,000 13,500
2 バーキン30 トゴ 1,200,000 36,000
合計 1,650,000 49,500

お振込先：……
";

    #[test]
    fn test_items_and_summary() {
        let out = parse(SAMPLE).unwrap();

        assert_eq!(out.items.len(), 2);
        assert_eq!(out.items[0].product_id, "1");
        assert_eq!(out.items[0].name, "デイトジャスト 116234");
        assert_eq!(out.items[0].purchase_price, Decimal::from(450_000));
        assert_eq!(out.items[0].commission, Decimal::from(13_500));
        assert_eq!(out.items[1].purchase_price, Decimal::from(1_200_000));

        let summary = out.invoice_summary.unwrap();
        assert_eq!(summary.total_amount, Decimal::from(1_699_500));
        assert_eq!(summary.subtotal, Some(Decimal::from(1_650_000)));
        assert_eq!(summary.metadata["source"], "items_pdf_total");
    }

    #[test]
    fn test_no_start_marker_yields_nothing() {
        let out = parse("請求書\n合計 1,000\n").unwrap();
        assert!(out.items.is_empty());
        assert!(out.invoice_summary.is_none());
    }

    #[test]
    fn test_text_before_marker_ignored() {
        let text = format!("1 偽アイテム 100 10\n{SAMPLE}");
        let out = parse(&text).unwrap();
        assert_eq!(out.items.len(), 2);
    }
}
