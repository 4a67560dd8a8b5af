//! Document extractors and the extractor selector.
//!
//! Dispatch is a closed table: one strategy per known supplier format,
//! extended only by code. A new supplier means a new module under
//! `suppliers/` and an entry here.

pub mod csv_generic;
pub mod patterns;
pub mod summary;
pub mod suppliers;

pub use csv_generic::{ColumnMap, CsvEncoding, CsvSpec};
pub use summary::extract_summary;

use crate::error::{ExtractError, ReconError, Result};
use crate::models::item::ParseOutput;

/// Raw input handed to an extractor.
///
/// CSV extractors require bytes (they own the text decoding); PDF
/// extractors accept bytes or pre-extracted text, except Timegate which
/// requires text. Passing the wrong kind is a contract violation.
#[derive(Debug, Clone, Copy)]
pub enum DocumentInput<'a> {
    Bytes(&'a [u8]),
    Text(&'a str),
}

impl<'a> DocumentInput<'a> {
    fn require_bytes(&self, extractor: &str) -> std::result::Result<&'a [u8], ExtractError> {
        match self {
            DocumentInput::Bytes(bytes) => Ok(bytes),
            DocumentInput::Text(_) => Err(ExtractError::InvalidInput {
                extractor: extractor.to_string(),
                reason: "requires raw bytes, got pre-extracted text".to_string(),
            }),
        }
    }
}

/// Extract plain text from PDF bytes.
pub(crate) fn pdf_text_from_bytes(bytes: &[u8]) -> std::result::Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::PdfText(e.to_string()))
}

fn pdf_text(input: DocumentInput<'_>) -> std::result::Result<String, ExtractError> {
    match input {
        DocumentInput::Bytes(bytes) => pdf_text_from_bytes(bytes),
        DocumentInput::Text(text) => Ok(text.to_string()),
    }
}

/// The closed set of extraction strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extractor {
    GenericCsv,
    EcotradeCsv,
    BrandexCsv,
    TaiyoCsv,
    ApexPdf,
    JwaPdf,
    TimegatePdf,
    MonoplazaInvoice,
    GenericPdf,
}

impl Extractor {
    pub fn name(&self) -> &'static str {
        match self {
            Extractor::GenericCsv => "generic_csv",
            Extractor::EcotradeCsv => "ecotrade_csv",
            Extractor::BrandexCsv => "brandex_csv",
            Extractor::TaiyoCsv => "taiyo_csv",
            Extractor::ApexPdf => "apex_pdf",
            Extractor::JwaPdf => "jwa_pdf",
            Extractor::TimegatePdf => "timegate_pdf",
            Extractor::MonoplazaInvoice => "monoplaza_invoice",
            Extractor::GenericPdf => "generic_pdf",
        }
    }

    /// Parse one document into line items and an optional summary.
    pub fn parse(&self, input: DocumentInput<'_>) -> std::result::Result<ParseOutput, ExtractError> {
        match self {
            Extractor::GenericCsv => {
                csv_generic::parse(input.require_bytes(self.name())?, &csv_generic::GENERIC_SPEC)
            }
            Extractor::EcotradeCsv => suppliers::ecotrade::parse(input.require_bytes(self.name())?),
            Extractor::BrandexCsv => suppliers::brandex::parse(input.require_bytes(self.name())?),
            Extractor::TaiyoCsv => suppliers::taiyo::parse(input.require_bytes(self.name())?),
            Extractor::ApexPdf => suppliers::apex::parse(&pdf_text(input)?),
            Extractor::JwaPdf => suppliers::jwa::parse(&pdf_text(input)?),
            Extractor::TimegatePdf => suppliers::timegate::parse(input),
            Extractor::MonoplazaInvoice => suppliers::monoplaza::parse(input),
            Extractor::GenericPdf => {
                let text = pdf_text(input)?;
                Ok(ParseOutput {
                    items: Vec::new(),
                    invoice_summary: summary::extract_summary(&text),
                })
            }
        }
    }
}

/// Known supplier name variants, including Japanese-script aliases.
/// First match wins.
const CSV_SUPPLIERS: &[(Extractor, &[&str])] = &[
    (Extractor::EcotradeCsv, &["ecotrade", "エコトレード"]),
    (Extractor::BrandexCsv, &["brandex", "ブランデックス"]),
    (Extractor::TaiyoCsv, &["taiyo", "大洋"]),
    // Monoplaza CSVs still go through the signature-checking extractor.
    (Extractor::MonoplazaInvoice, &["monoplaza", "モノプラザ"]),
];

const PDF_SUPPLIERS: &[(Extractor, &[&str])] = &[
    (Extractor::ApexPdf, &["apex", "アペックス"]),
    (Extractor::JwaPdf, &["jwa", "ジェイダブルエー"]),
    (Extractor::TimegatePdf, &["timegate", "タイムゲート"]),
    (Extractor::MonoplazaInvoice, &["monoplaza", "モノプラザ"]),
];

/// Coarse media-type classification.
pub fn is_csv_media(media_type: &str) -> bool {
    let mt = media_type.to_lowercase();
    mt.contains("csv") || mt == "application/vnd.ms-excel"
}

pub fn is_pdf_media(media_type: &str) -> bool {
    media_type.to_lowercase().contains("pdf")
}

fn match_supplier(table: &[(Extractor, &[&str])], supplier: &str) -> Option<Extractor> {
    let needle = supplier.to_lowercase();
    table
        .iter()
        .find(|(_, aliases)| aliases.iter().any(|a| needle.contains(a)))
        .map(|(extractor, _)| *extractor)
}

/// Choose the extractor for a declared media type and supplier identity.
///
/// Two-level dispatch: coarse media type, then case-insensitive substring
/// match against the known supplier variants. No supplier match falls back
/// to the generic extractor for that media type; an unknown media type is
/// a hard error, since nothing downstream can proceed without knowing how
/// to parse the bytes.
pub fn select(media_type: &str, supplier: Option<&str>) -> Result<Extractor> {
    let table = if is_csv_media(media_type) {
        CSV_SUPPLIERS
    } else if is_pdf_media(media_type) {
        PDF_SUPPLIERS
    } else {
        return Err(ReconError::UnsupportedMediaType(media_type.to_string()));
    };

    let fallback = if is_csv_media(media_type) {
        Extractor::GenericCsv
    } else {
        Extractor::GenericPdf
    };

    Ok(supplier
        .and_then(|s| match_supplier(table, s))
        .unwrap_or(fallback))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_select_by_supplier_alias() {
        assert_eq!(
            select("text/csv", Some("エコトレード株式会社")).unwrap(),
            Extractor::EcotradeCsv
        );
        assert_eq!(
            select("application/pdf", Some("Apex Co., Ltd.")).unwrap(),
            Extractor::ApexPdf
        );
        assert_eq!(
            select("application/pdf", Some("アペックス")).unwrap(),
            Extractor::ApexPdf
        );
    }

    #[test]
    fn test_select_is_case_insensitive() {
        assert_eq!(
            select("TEXT/CSV", Some("BRANDEX")).unwrap(),
            Extractor::BrandexCsv
        );
    }

    #[test]
    fn test_unknown_supplier_falls_back_to_generic() {
        assert_eq!(select("text/csv", Some("未知の業者")).unwrap(), Extractor::GenericCsv);
        assert_eq!(select("application/pdf", None).unwrap(), Extractor::GenericPdf);
    }

    #[test]
    fn test_monoplaza_dispatches_to_signature_check_for_both_media() {
        assert_eq!(
            select("text/csv", Some("モノプラザ")).unwrap(),
            Extractor::MonoplazaInvoice
        );
        assert_eq!(
            select("application/pdf", Some("monoplaza")).unwrap(),
            Extractor::MonoplazaInvoice
        );
    }

    #[test]
    fn test_unsupported_media_type_is_hard_error() {
        let err = select("image/png", Some("apex")).unwrap_err();
        assert!(matches!(err, ReconError::UnsupportedMediaType(_)));
    }

    #[test]
    fn test_excel_media_treated_as_csv() {
        assert_eq!(
            select("application/vnd.ms-excel", Some("taiyo")).unwrap(),
            Extractor::TaiyoCsv
        );
    }
}
