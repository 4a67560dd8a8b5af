//! Timegate (タイムゲート) transaction statements.
//!
//! Timegate PDFs are text-extracted in an environment the core does not
//! control; this extractor only ever sees the pre-extracted text from the
//! `{file_id: text}` map. Handing it raw bytes is a contract violation.
//! The extraction path emits half-width katakana, converted per line
//! before matching.

use tracing::warn;

use crate::error::ExtractError;
use crate::extract::patterns::TIMEGATE_ITEM;
use crate::extract::DocumentInput;
use crate::models::item::{LineItem, ParseOutput};
use crate::normalize::{half_to_full_katakana, normalize_price};

const START_MARKER: &str = "取引明細";

pub fn parse(input: DocumentInput<'_>) -> Result<ParseOutput, ExtractError> {
    let DocumentInput::Text(text) = input else {
        return Err(ExtractError::InvalidInput {
            extractor: "timegate".to_string(),
            reason: "requires pre-extracted text, not raw bytes".to_string(),
        });
    };

    let mut items = Vec::new();
    let mut in_table = false;

    for (line_no, raw_line) in text.lines().enumerate() {
        let line = half_to_full_katakana(raw_line.trim());

        if !in_table {
            if line.contains(START_MARKER) {
                in_table = true;
            }
            continue;
        }

        let Some(caps) = TIMEGATE_ITEM.captures(&line) else {
            continue;
        };

        let mut item = LineItem::new(
            caps[1].to_string(),
            caps[2].trim().to_string(),
            normalize_price(&caps[3]),
        );
        item.metadata
            .insert("source_line".to_string(), (line_no + 1).to_string());

        if item.is_acceptable() {
            items.push(item);
        }
    }

    if !in_table {
        warn!("timegate start marker not found; document yields nothing");
    }

    Ok(ParseOutput {
        items,
        invoice_summary: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    const SAMPLE: &str = "\
お取引明細
ﾀｸﾞNo.10231 ｸﾞｯﾁ ｼｮﾙﾀﾞｰﾊﾞｯｸﾞ ¥45,000
ﾀｸﾞNo.10232 ｳﾞｨﾄﾝ ﾓﾉｸﾞﾗﾑ ¥128,000円
";

    #[test]
    fn test_half_width_rows() {
        let out = parse(DocumentInput::Text(SAMPLE)).unwrap();
        assert_eq!(out.items.len(), 2);

        assert_eq!(out.items[0].product_id, "10231");
        assert_eq!(out.items[0].name, "グッチ ショルダーバッグ");
        assert_eq!(out.items[0].purchase_price, Decimal::from(45_000));

        assert_eq!(out.items[1].name, "ヴィトン モノグラム");
        assert_eq!(out.items[1].purchase_price, Decimal::from(128_000));
    }

    #[test]
    fn test_bytes_input_is_contract_violation() {
        let err = parse(DocumentInput::Bytes(b"%PDF-1.4")).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidInput { .. }));
    }

    #[test]
    fn test_missing_marker_yields_nothing() {
        let out = parse(DocumentInput::Text("ﾀｸﾞNo.1 ﾃｽﾄ ¥100\n")).unwrap();
        assert!(out.items.is_empty());
    }
}
