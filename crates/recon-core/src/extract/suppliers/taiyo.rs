//! Taiyo Auction (大洋オークション) CSV listings.
//!
//! Carries a supplier-native 商品ID which doubles as the persistence key
//! and is preserved as `original_product_id`.

use crate::error::ExtractError;
use crate::extract::csv_generic::{self, ColumnMap, CsvEncoding, CsvSpec};
use crate::models::item::ParseOutput;

const COLUMNS: ColumnMap = ColumnMap {
    product_id: &["商品id"],
    name: &["商品名"],
    price: &["落札価格", "落札金額"],
    commission: &["手数料"],
    quantity: &["数量"],
    brand: &["ブランド"],
    box_number: &[],
    row_number: &[],
};

const SPEC: CsvSpec = CsvSpec {
    encoding: CsvEncoding::Utf8,
    columns: COLUMNS,
    skip_records: &[],
};

pub fn parse(bytes: &[u8]) -> Result<ParseOutput, ExtractError> {
    let mut out = csv_generic::parse(bytes, &SPEC)?;
    for item in &mut out.items {
        item.original_product_id = Some(item.product_id.clone());
    }
    Ok(out)
}
