//! Price-string normalization and katakana width conversion.
//!
//! Every extractor funnels raw numeric fields through [`normalize_price`];
//! the lenient zero-on-garbage policy means callers must validate before
//! treating a zero as meaningful.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a price string into a [`Decimal`].
///
/// Strips thousands separators, yen signs (¥/￥) and the 円 suffix, trims,
/// then parses. Empty or unparseable input yields `Decimal::ZERO`; this
/// function never fails.
pub fn normalize_price(value: &str) -> Decimal {
    let cleaned: String = value
        .chars()
        .filter(|c| !matches!(c, ',' | '¥' | '￥' | '円'))
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        return Decimal::ZERO;
    }

    Decimal::from_str(cleaned).unwrap_or(Decimal::ZERO)
}

/// Convert half-width katakana to full-width, character by character.
///
/// A dakuten/handakuten mark (ﾞ/ﾟ) following a voiceable base character is
/// consumed and merged into the composed full-width form (ｶﾞ → ガ).
/// Characters outside the half-width katakana block pass through unchanged.
pub fn half_to_full_katakana(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        let Some(full) = to_full_width(c) else {
            out.push(c);
            continue;
        };

        match chars.peek() {
            Some('ﾞ') => {
                if let Some(voiced) = with_dakuten(full) {
                    chars.next();
                    out.push(voiced);
                } else {
                    out.push(full);
                }
            }
            Some('ﾟ') => {
                if let Some(voiced) = with_handakuten(full) {
                    chars.next();
                    out.push(voiced);
                } else {
                    out.push(full);
                }
            }
            _ => out.push(full),
        }
    }

    out
}

fn to_full_width(c: char) -> Option<char> {
    let full = match c {
        '｡' => '。',
        '｢' => '「',
        '｣' => '」',
        '､' => '、',
        '･' => '・',
        'ｦ' => 'ヲ',
        'ｧ' => 'ァ',
        'ｨ' => 'ィ',
        'ｩ' => 'ゥ',
        'ｪ' => 'ェ',
        'ｫ' => 'ォ',
        'ｬ' => 'ャ',
        'ｭ' => 'ュ',
        'ｮ' => 'ョ',
        'ｯ' => 'ッ',
        'ｰ' => 'ー',
        'ｱ' => 'ア',
        'ｲ' => 'イ',
        'ｳ' => 'ウ',
        'ｴ' => 'エ',
        'ｵ' => 'オ',
        'ｶ' => 'カ',
        'ｷ' => 'キ',
        'ｸ' => 'ク',
        'ｹ' => 'ケ',
        'ｺ' => 'コ',
        'ｻ' => 'サ',
        'ｼ' => 'シ',
        'ｽ' => 'ス',
        'ｾ' => 'セ',
        'ｿ' => 'ソ',
        'ﾀ' => 'タ',
        'ﾁ' => 'チ',
        'ﾂ' => 'ツ',
        'ﾃ' => 'テ',
        'ﾄ' => 'ト',
        'ﾅ' => 'ナ',
        'ﾆ' => 'ニ',
        'ﾇ' => 'ヌ',
        'ﾈ' => 'ネ',
        'ﾉ' => 'ノ',
        'ﾊ' => 'ハ',
        'ﾋ' => 'ヒ',
        'ﾌ' => 'フ',
        'ﾍ' => 'ヘ',
        'ﾎ' => 'ホ',
        'ﾏ' => 'マ',
        'ﾐ' => 'ミ',
        'ﾑ' => 'ム',
        'ﾒ' => 'メ',
        'ﾓ' => 'モ',
        'ﾔ' => 'ヤ',
        'ﾕ' => 'ユ',
        'ﾖ' => 'ヨ',
        'ﾗ' => 'ラ',
        'ﾘ' => 'リ',
        'ﾙ' => 'ル',
        'ﾚ' => 'レ',
        'ﾛ' => 'ロ',
        'ﾜ' => 'ワ',
        'ﾝ' => 'ン',
        'ﾞ' => '゛',
        'ﾟ' => '゜',
        _ => return None,
    };
    Some(full)
}

fn with_dakuten(c: char) -> Option<char> {
    let voiced = match c {
        'ウ' => 'ヴ',
        'カ' => 'ガ',
        'キ' => 'ギ',
        'ク' => 'グ',
        'ケ' => 'ゲ',
        'コ' => 'ゴ',
        'サ' => 'ザ',
        'シ' => 'ジ',
        'ス' => 'ズ',
        'セ' => 'ゼ',
        'ソ' => 'ゾ',
        'タ' => 'ダ',
        'チ' => 'ヂ',
        'ツ' => 'ヅ',
        'テ' => 'デ',
        'ト' => 'ド',
        'ハ' => 'バ',
        'ヒ' => 'ビ',
        'フ' => 'ブ',
        'ヘ' => 'ベ',
        'ホ' => 'ボ',
        _ => return None,
    };
    Some(voiced)
}

fn with_handakuten(c: char) -> Option<char> {
    let voiced = match c {
        'ハ' => 'パ',
        'ヒ' => 'ピ',
        'フ' => 'プ',
        'ヘ' => 'ペ',
        'ホ' => 'ポ',
        _ => return None,
    };
    Some(voiced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_price_plain() {
        assert_eq!(normalize_price("12345"), Decimal::from(12345));
        assert_eq!(normalize_price(" 12345 "), Decimal::from(12345));
        assert_eq!(normalize_price("12,345"), Decimal::from(12345));
    }

    #[test]
    fn test_normalize_price_currency_markers() {
        assert_eq!(normalize_price("¥12,345円"), Decimal::from(12345));
        assert_eq!(normalize_price("￥1,000"), Decimal::from(1000));
        assert_eq!(normalize_price("1000円"), Decimal::from(1000));
    }

    #[test]
    fn test_normalize_price_fractional() {
        assert_eq!(
            normalize_price("1,234.5"),
            Decimal::from_str("1234.5").unwrap()
        );
    }

    #[test]
    fn test_normalize_price_lenient_zero() {
        assert_eq!(normalize_price(""), Decimal::ZERO);
        assert_eq!(normalize_price("   "), Decimal::ZERO);
        assert_eq!(normalize_price("n/a"), Decimal::ZERO);
        assert_eq!(normalize_price("¥"), Decimal::ZERO);
    }

    #[test]
    fn test_normalize_price_idempotent() {
        for s in ["¥12,345円", "980", "1,234.5", ""] {
            let once = normalize_price(s);
            assert_eq!(normalize_price(&once.to_string()), once);
        }
    }

    #[test]
    fn test_half_to_full_plain() {
        assert_eq!(half_to_full_katakana("ﾛﾚｯｸｽ"), "ロレックス");
        assert_eq!(half_to_full_katakana("ｴﾙﾒｽ"), "エルメス");
    }

    #[test]
    fn test_half_to_full_dakuten() {
        // half-width KA + combining dakuten composes to GA
        assert_eq!(half_to_full_katakana("ｶﾞ"), "ガ");
        assert_eq!(half_to_full_katakana("ｳﾞｨﾄﾝ"), "ヴィトン");
        assert_eq!(half_to_full_katakana("ｸﾞｯﾁ"), "グッチ");
    }

    #[test]
    fn test_half_to_full_handakuten() {
        assert_eq!(half_to_full_katakana("ﾊﾟﾃｯｸ"), "パテック");
    }

    #[test]
    fn test_half_to_full_passthrough() {
        // ASCII and full-width text pass through; orphan marks keep their
        // standalone full-width form
        assert_eq!(half_to_full_katakana("Rolex 123"), "Rolex 123");
        assert_eq!(half_to_full_katakana("ロレックス"), "ロレックス");
        assert_eq!(half_to_full_katakana("ｱﾞ"), "ア゛");
    }
}
