//! Regex patterns for supplier document extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Apex item line: no, name, price, commission
    pub static ref APEX_ITEM: Regex = Regex::new(
        r"^(\d{1,4})\s+(.+?)\s+([\d,]+)\s+([\d,]+)$"
    ).unwrap();

    // Apex 合計 line: price total, optional commission total
    pub static ref APEX_TOTAL: Regex = Regex::new(
        r"^合計\s*[¥￥]?([\d,]+)(?:\s+[¥￥]?([\d,]+))?"
    ).unwrap();

    // JWA item line: packed qty+no+price token, name, commission
    pub static ref JWA_ITEM: Regex = Regex::new(
        r"^(\d[\d,]*)\s+(.+?)\s+([\d,]+)$"
    ).unwrap();

    // Comma-grouped price shape used to validate packed-token splits
    pub static ref PRICE_GROUPED: Regex = Regex::new(
        r"^\d{1,3}(?:,\d{3})*$"
    ).unwrap();

    // Timegate item line, matched after full-width conversion
    pub static ref TIMEGATE_ITEM: Regex = Regex::new(
        r"^タグNo\.?\s*(\d+)\s+(.+?)\s+[¥￥]?([\d,]+)円?$"
    ).unwrap();

    // Monoplaza reconciliation sheet labels
    pub static ref MONO_SUBTOTAL: Regex = Regex::new(
        r"仕入小計\s*[:：]?\s*[¥￥]?([\d,]+)"
    ).unwrap();

    pub static ref MONO_COMMISSION: Regex = Regex::new(
        r"手数料小計\s*[:：]?\s*[¥￥]?([\d,]+)"
    ).unwrap();

    pub static ref MONO_PARTICIPATION: Regex = Regex::new(
        r"参加費\s*[:：]?\s*[¥￥]?([\d,]+)"
    ).unwrap();

    pub static ref MONO_TOTAL: Regex = Regex::new(
        r"お支払金額(?:合計)?\s*[:：]?\s*[¥￥]?([\d,]+)"
    ).unwrap();

    // Labeled claimed-total patterns for the generic summary extractor,
    // most specific labels first (請求金額 is a substring of ご請求金額,
    // 合計 of 合計金額).
    pub static ref SUMMARY_LABELS: Vec<(&'static str, Regex)> = [
        "ご請求金額",
        "請求金額",
        "お支払金額",
        "合計金額",
        "総合計",
        "合計",
    ]
    .iter()
    .map(|label| {
        let re = Regex::new(&format!(r"{label}\s*[:：]?\s*[¥￥]?([\d,]+)円?")).unwrap();
        (*label, re)
    })
    .collect();
}
