//! JWA (ジェイダブルエー) auction result PDFs.
//!
//! The leading token of each row concatenates a single-digit quantity, a
//! 1-2 digit item number and a comma-grouped price with no separator.
//! Splitting is a best-effort heuristic: every plausible boundary is
//! tried, the remainder must look like `digits(,ddd)*`, and when several
//! splits survive the one whose item number is closest to the previous
//! item number plus one wins. A genuinely non-monotonic sequence can
//! still misparse.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::error::ExtractError;
use crate::extract::patterns::{JWA_ITEM, PRICE_GROUPED};
use crate::models::item::{LineItem, ParseOutput};
use crate::normalize::normalize_price;

const START_MARKER: &str = "出品明細";
const END_MARKER: &str = "以上";

pub fn parse(text: &str) -> Result<ParseOutput, ExtractError> {
    let mut items = Vec::new();
    let mut in_table = false;
    let mut prev_no: Option<u32> = None;

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();

        if !in_table {
            if line.contains(START_MARKER) {
                in_table = true;
            }
            continue;
        }

        if line.starts_with(END_MARKER) {
            break;
        }

        let Some(caps) = JWA_ITEM.captures(line) else {
            continue;
        };

        let Some((quantity, item_no, price)) = split_packed_token(&caps[1], prev_no) else {
            debug!(line_no, token = &caps[1], "no valid split for packed token");
            continue;
        };
        prev_no = Some(item_no);

        let mut item = LineItem::new(item_no.to_string(), caps[2].trim().to_string(), price);
        item.quantity = quantity;
        item.commission = normalize_price(&caps[3]);
        item.metadata
            .insert("source_line".to_string(), (line_no + 1).to_string());

        if item.is_acceptable() {
            items.push(item);
        }
    }

    if !in_table {
        warn!("jwa start marker not found; document yields nothing");
    }

    Ok(ParseOutput {
        items,
        invoice_summary: None,
    })
}

/// Split a packed `{qty}{item_no}{price}` token.
///
/// Returns `(quantity, item_no, price)` or `None` when no boundary
/// produces a well-formed comma-grouped price.
fn split_packed_token(token: &str, prev_no: Option<u32>) -> Option<(u32, u32, Decimal)> {
    let mut chars = token.chars();
    let quantity = chars.next()?.to_digit(10).filter(|d| *d > 0)?;
    let rest = chars.as_str();

    let mut candidates: Vec<(u32, &str)> = Vec::new();
    for no_len in [1usize, 2] {
        if rest.len() <= no_len {
            continue;
        }
        let (no_part, price_part) = rest.split_at(no_len);
        if !no_part.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        if !PRICE_GROUPED.is_match(price_part) {
            continue;
        }
        if let Ok(no) = no_part.parse::<u32>() {
            candidates.push((no, price_part));
        }
    }

    let (item_no, price_part) = match candidates.len() {
        0 => return None,
        1 => candidates[0],
        _ => {
            // Ambiguous boundary: prefer the split continuing the
            // monotonic item-number sequence; without history, the
            // shorter item number wins.
            let expected = prev_no.map(|p| p + 1);
            *candidates
                .iter()
                .min_by_key(|(no, _)| match expected {
                    Some(e) => (no.abs_diff(e), *no),
                    None => (0, *no),
                })?
        }
    };

    Some((quantity, item_no, normalize_price(price_part)))
}
