//! Ecotrade (エコトレード) CSV listings.
//!
//! Shift_JIS export with positional 箱No/枝番 columns; the persistence key
//! is the box and row numbers joined by a hyphen.

use tracing::debug;

use crate::error::ExtractError;
use crate::extract::csv_generic::{self, ColumnMap, CsvEncoding, CsvSpec};
use crate::models::item::ParseOutput;

const COLUMNS: ColumnMap = ColumnMap {
    product_id: &[],
    name: &["商品名"],
    price: &["落札金額"],
    commission: &["手数料"],
    quantity: &[],
    brand: &["ブランド"],
    box_number: &["箱no", "箱番号"],
    row_number: &["枝番"],
};

const SPEC: CsvSpec = CsvSpec {
    encoding: CsvEncoding::ShiftJis,
    columns: COLUMNS,
    skip_records: &[],
};

pub fn parse(bytes: &[u8]) -> Result<ParseOutput, ExtractError> {
    let mut out = csv_generic::parse(bytes, &SPEC)?;

    // Rows without both positional fields cannot form a stable key and
    // are dropped like any other malformed row.
    out.items.retain_mut(|item| {
        match (item.box_number.as_deref(), item.row_number.as_deref()) {
            (Some(box_no), Some(row_no)) => {
                item.product_id = format!("{box_no}-{row_no}");
                true
            }
            _ => {
                debug!(name = %item.name, "dropping ecotrade row without box/row numbers");
                false
            }
        }
    });

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn encode_sjis(text: &str) -> Vec<u8> {
        let (bytes, _, _) = encoding_rs::SHIFT_JIS.encode(text);
        bytes.into_owned()
    }

    #[test]
    fn test_box_row_key() {
        let csv = "箱No,枝番,商品名,ブランド,落札金額\n\
                   12,3,デイトジャスト,ロレックス,\"450,000\"\n\
                   12,4,スピードマスター,オメガ,\"280,000\"\n";
        let out = parse(&encode_sjis(csv)).unwrap();

        assert_eq!(out.items.len(), 2);
        assert_eq!(out.items[0].product_id, "12-3");
        assert_eq!(out.items[1].product_id, "12-4");
        assert_eq!(out.items[0].purchase_price, Decimal::from(450_000));
        assert_eq!(out.items[0].brand.as_deref(), Some("ロレックス"));
        assert!(out.invoice_summary.is_none());
    }

    #[test]
    fn test_rows_missing_position_are_dropped() {
        let csv = "箱No,枝番,商品名,落札金額\n12,3,デイトジャスト,450000\n,,無箱品,1000\n";
        let out = parse(&encode_sjis(csv)).unwrap();
        assert_eq!(out.items.len(), 1);
    }
}
