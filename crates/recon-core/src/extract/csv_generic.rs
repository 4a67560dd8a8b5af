//! Generic column-mapped CSV extraction.
//!
//! Supplier CSV extractors wrap this with their own column mapping and a
//! post-processing step; unknown CSV suppliers use it directly.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::error::ExtractError;
use crate::models::item::{LineItem, ParseOutput};
use crate::normalize::normalize_price;

/// Text encoding of the raw CSV bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvEncoding {
    Utf8,
    /// Legacy Japanese 8-bit encoding used by older supplier exports.
    ShiftJis,
}

/// Candidate header names for each line item field. The first header
/// present in the document wins; an empty candidate list means the field
/// is not expected.
#[derive(Debug, Clone, Copy)]
pub struct ColumnMap {
    pub product_id: &'static [&'static str],
    pub name: &'static [&'static str],
    pub price: &'static [&'static str],
    pub commission: &'static [&'static str],
    pub quantity: &'static [&'static str],
    pub brand: &'static [&'static str],
    pub box_number: &'static [&'static str],
    pub row_number: &'static [&'static str],
}

/// Full parsing instructions for one CSV layout.
#[derive(Debug, Clone, Copy)]
pub struct CsvSpec {
    pub encoding: CsvEncoding,
    pub columns: ColumnMap,
    /// Physical record indices (0-based, after the header row) to skip
    /// unconditionally, for layouts whose header spans two rows.
    pub skip_records: &'static [usize],
}

/// Column mapping for CSVs from suppliers without a dedicated extractor.
pub const GENERIC_COLUMNS: ColumnMap = ColumnMap {
    product_id: &["商品id", "product_id", "productid", "id", "no", "no."],
    name: &["商品名", "品名", "name"],
    price: &["落札金額", "落札価格", "金額", "価格", "price"],
    commission: &["手数料", "commission"],
    quantity: &["数量", "quantity", "qty"],
    brand: &["ブランド", "brand"],
    box_number: &["箱no", "箱番号", "box"],
    row_number: &["枝番", "row"],
};

pub const GENERIC_SPEC: CsvSpec = CsvSpec {
    encoding: CsvEncoding::Utf8,
    columns: GENERIC_COLUMNS,
    skip_records: &[],
};

/// Decode raw CSV bytes with the configured encoding.
///
/// Malformed sequences are replaced, not fatal: a garbled cell becomes a
/// dropped row later, the rest of the file still parses.
pub fn decode(bytes: &[u8], encoding: CsvEncoding) -> String {
    let codec = match encoding {
        CsvEncoding::Utf8 => encoding_rs::UTF_8,
        CsvEncoding::ShiftJis => encoding_rs::SHIFT_JIS,
    };
    let (text, _, had_errors) = codec.decode(bytes);
    if had_errors {
        warn!(?encoding, "CSV decoding replaced malformed sequences");
    }
    text.into_owned()
}

struct ColumnIndex {
    product_id: Option<usize>,
    name: Option<usize>,
    price: Option<usize>,
    commission: Option<usize>,
    quantity: Option<usize>,
    brand: Option<usize>,
    box_number: Option<usize>,
    row_number: Option<usize>,
}

impl ColumnIndex {
    fn resolve(headers: &csv::StringRecord, map: &ColumnMap) -> Self {
        let find = |candidates: &[&str]| {
            headers.iter().position(|h| {
                let h = h.trim().to_lowercase();
                candidates.iter().any(|c| h == *c)
            })
        };
        Self {
            product_id: find(map.product_id),
            name: find(map.name),
            price: find(map.price),
            commission: find(map.commission),
            quantity: find(map.quantity),
            brand: find(map.brand),
            box_number: find(map.box_number),
            row_number: find(map.row_number),
        }
    }
}

fn field<'r>(record: &'r csv::StringRecord, idx: Option<usize>) -> Option<&'r str> {
    idx.and_then(|i| record.get(i)).map(str::trim).filter(|s| !s.is_empty())
}

/// Parse CSV bytes into line items.
///
/// Rows with an empty name or an unparseable shape are dropped and logged;
/// only a structural failure of the whole document is an error.
pub fn parse(bytes: &[u8], spec: &CsvSpec) -> Result<ParseOutput, ExtractError> {
    let text = decode(bytes, spec.encoding);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let index = ColumnIndex::resolve(&headers, &spec.columns);

    let mut items = Vec::new();
    for (record_idx, result) in reader.records().enumerate() {
        if spec.skip_records.contains(&record_idx) {
            continue;
        }

        // Physical row number in the file, 1-based, counting the header.
        let source_row = record_idx + 2;

        let record = match result {
            Ok(record) => record,
            Err(e) => {
                debug!(source_row, error = %e, "skipping malformed CSV row");
                continue;
            }
        };

        let Some(name) = field(&record, index.name) else {
            debug!(source_row, "skipping row without a product name");
            continue;
        };

        let price = field(&record, index.price)
            .map(normalize_price)
            .unwrap_or(Decimal::ZERO);

        let product_id = field(&record, index.product_id)
            .map(str::to_string)
            .unwrap_or_else(|| (record_idx + 1).to_string());

        let mut item = LineItem::new(product_id, name, price);
        if let Some(commission) = field(&record, index.commission) {
            item.commission = normalize_price(commission);
        }
        if let Some(quantity) = field(&record, index.quantity) {
            item.quantity = quantity.parse().unwrap_or(1);
        }
        item.brand = field(&record, index.brand).map(str::to_string);
        item.box_number = field(&record, index.box_number).map(str::to_string);
        item.row_number = field(&record, index.row_number).map(str::to_string);
        item.metadata
            .insert("source_row".to_string(), source_row.to_string());

        if item.is_acceptable() {
            items.push(item);
        } else {
            debug!(source_row, "dropping unacceptable row");
        }
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

    #[test]
    fn test_generic_mapping() {
        let csv = "No,商品名,落札金額,手数料,ブランド\n\
                   1,デイトジャスト,450000,13500,ロレックス\n\
                   2,バーキン30,\"1,200,000\",36000,エルメス\n";
        let out = parse(csv.as_bytes(), &GENERIC_SPEC).unwrap();

        assert_eq!(out.items.len(), 2);
        assert_eq!(out.items[0].product_id, "1");
        assert_eq!(out.items[0].purchase_price, Decimal::from(450_000));
        assert_eq!(out.items[1].purchase_price, Decimal::from(1_200_000));
        assert_eq!(out.items[1].brand.as_deref(), Some("エルメス"));
        assert_eq!(out.items[0].metadata["source_row"], "2");
    }

    #[test]
    fn test_rows_without_name_are_dropped() {
        let csv = "No,商品名,落札金額\n1,デイトジャスト,1000\n2,,2000\n3,バーキン,3000\n";
        let out = parse(csv.as_bytes(), &GENERIC_SPEC).unwrap();
        assert_eq!(out.items.len(), 2);
        assert_eq!(out.items[1].product_id, "3");
    }

    #[test]
    fn test_shift_jis_decoding() {
        // 商品名 / テスト in Shift_JIS
        let mut bytes: Vec<u8> = Vec::new();
        bytes.extend_from_slice(&[0x8f, 0xa4, 0x95, 0x69, 0x96, 0xbc]); // 商品名
        bytes.extend_from_slice(b",\x89\xbf\x8ai\n"); // ,価格
        bytes.extend_from_slice(&[0x83, 0x65, 0x83, 0x58, 0x83, 0x67]); // テスト
        bytes.extend_from_slice(b",1000\n");

        let spec = CsvSpec {
            encoding: CsvEncoding::ShiftJis,
            ..GENERIC_SPEC
        };
        let out = parse(&bytes, &spec).unwrap();
        assert_eq!(out.items.len(), 1);
        assert_eq!(out.items[0].name, "テスト");
        assert_eq!(out.items[0].purchase_price, Decimal::from(1000));
    }

    #[test]
    fn test_deterministic() {
        let csv = "商品名,価格\nテスト,¥1,\n";
        let a = parse(csv.as_bytes(), &GENERIC_SPEC).unwrap();
        let b = parse(csv.as_bytes(), &GENERIC_SPEC).unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
