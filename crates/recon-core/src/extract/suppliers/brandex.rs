//! Brandex (ブランデックス) CSV listings.
//!
//! The real header is split across two physical rows; the second row only
//! continues column captions and is skipped by its row index, not by
//! content matching.

use crate::error::ExtractError;
use crate::extract::csv_generic::{self, ColumnMap, CsvEncoding, CsvSpec};
use crate::models::item::ParseOutput;

const COLUMNS: ColumnMap = ColumnMap {
    product_id: &["no", "no."],
    name: &["商品名"],
    price: &["落札金額", "税抜金額"],
    commission: &["手数料"],
    quantity: &[],
    brand: &["ブランド"],
    box_number: &[],
    row_number: &[],
};

const SPEC: CsvSpec = CsvSpec {
    encoding: CsvEncoding::Utf8,
    columns: COLUMNS,
    // The continuation of the two-row header.
    skip_records: &[0],
};

pub fn parse(bytes: &[u8]) -> Result<ParseOutput, ExtractError> {
    csv_generic::parse(bytes, &SPEC)
}
