//! Reconciliation engine: drives extraction, calculation and comparison
//! for one batch of supplier documents.
//!
//! Row- and file-level problems are absorbed into the run's error list;
//! only selector-level and infrastructure failures abort the run, and
//! even then the persisted run record is left in a terminal state.

mod store;

pub use store::{ItemStore, MemoryStore, UpsertOutcome};

use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::calc::{calculate_total, resolve_fees};
use crate::error::{ExtractError, ReconError, Result};
use crate::extract::{self, extract_summary, DocumentInput, Extractor};
use crate::models::config::SupplierConfig;
use crate::models::item::{InvoiceSummary, LineItem, ParseOutput};
use crate::models::run::{FeeOverrides, ReconciliationRun, RunReport, RunStatus};

/// One file in a batch, as handed over by the I/O collaborators.
#[derive(Debug, Clone)]
pub struct DocumentFile {
    pub file_id: String,
    pub file_name: String,
    /// Declared media type, e.g. `text/csv` or `application/pdf`.
    pub media_type: String,
    /// Raw bytes; `None` when text extraction happens outside the core
    /// and only the pre-extracted text map applies.
    pub data: Option<Vec<u8>>,
}

/// Everything the engine needs for one reconciliation run.
#[derive(Debug, Clone, Default)]
pub struct BatchInput {
    /// Key of the auction/batch; also the persistence scope.
    pub batch_key: String,
    /// Resolved supplier name (the core does not look suppliers up).
    pub supplier: String,
    /// Files in listing order.
    pub files: Vec<DocumentFile>,
    /// Pre-extracted plain text keyed by file id, for documents whose
    /// text extraction runs in another environment.
    pub extracted_text: HashMap<String, String>,
}

enum DocClass {
    CsvItems,
    PdfItems,
    Reference,
}

fn classify(supplier: &str, file: &DocumentFile) -> Result<DocClass> {
    if extract::is_csv_media(&file.media_type) {
        Ok(DocClass::CsvItems)
    } else if extract::is_pdf_media(&file.media_type) {
        if is_items_pdf(supplier, &file.file_name) {
            Ok(DocClass::PdfItems)
        } else {
            Ok(DocClass::Reference)
        }
    } else {
        Err(ReconError::UnsupportedMediaType(file.media_type.clone()))
    }
}

/// Whether a PDF is a line-item document for this supplier, decided by
/// supplier identity plus a filename keyword.
fn is_items_pdf(supplier: &str, file_name: &str) -> bool {
    let items_pdf_supplier = matches!(
        extract::select("application/pdf", Some(supplier)),
        Ok(Extractor::ApexPdf | Extractor::JwaPdf | Extractor::TimegatePdf)
    );
    items_pdf_supplier && ["明細", "落札", "出品"].iter().any(|k| file_name.contains(k))
}

/// Scan priority for reference PDFs with invoice-like filenames:
/// detail/summary listings first, then invoice/billing keywords.
/// Files matching neither are not scanned.
fn reference_priority(file_name: &str) -> Option<u8> {
    if ["明細", "詳細"].iter().any(|k| file_name.contains(k)) {
        return Some(0);
    }
    let lower = file_name.to_lowercase();
    if ["請求", "計算書"].iter().any(|k| file_name.contains(k))
        || ["invoice", "billing", "statement"].iter().any(|k| lower.contains(k))
    {
        return Some(1);
    }
    None
}

/// Reconciliation engine over a persistence collaborator.
pub struct Engine<'a, S: ItemStore> {
    store: &'a mut S,
    config: &'a SupplierConfig,
}

impl<'a, S: ItemStore> Engine<'a, S> {
    pub fn new(store: &'a mut S, config: &'a SupplierConfig) -> Self {
        Self { store, config }
    }

    /// Run the full import state machine for one batch.
    ///
    /// Soft failures (unparseable files, dropped rows, missing
    /// pre-extracted text) are collected in the report; a hard failure
    /// marks the persisted run `error` before propagating.
    pub fn process_batch(
        &mut self,
        input: &BatchInput,
        overrides: FeeOverrides,
    ) -> Result<RunReport> {
        let mut run = ReconciliationRun::new(&input.batch_key, &input.supplier, overrides);
        run.status = RunStatus::Processing;
        self.store.save_run(&run)?;

        match self.process_inner(input, &mut run) {
            Ok(report) => Ok(report),
            Err(e) => {
                run.status = RunStatus::Error;
                run.finished_at = Some(Utc::now());
                if let Err(save_err) = self.store.save_run(&run) {
                    warn!(%save_err, "failed to persist error status for run");
                }
                Err(e)
            }
        }
    }

    fn process_inner(
        &mut self,
        input: &BatchInput,
        run: &mut ReconciliationRun,
    ) -> Result<RunReport> {
        let mut errors = Vec::new();

        let mut csv_files = Vec::new();
        let mut pdf_items_files = Vec::new();
        let mut references = Vec::new();
        for file in &input.files {
            match classify(&input.supplier, file)? {
                DocClass::CsvItems => csv_files.push(file),
                DocClass::PdfItems => pdf_items_files.push(file),
                DocClass::Reference => references.push(file),
            }
        }
        info!(
            supplier = %input.supplier,
            csv = csv_files.len(),
            pdf_items = pdf_items_files.len(),
            references = references.len(),
            "classified batch files"
        );

        let mut items: Vec<LineItem> = Vec::new();
        let mut claimed: Option<InvoiceSummary> = None;
        let mut claimed_from_items_pdf = false;

        let ordered = csv_files
            .iter()
            .map(|f| (*f, false))
            .chain(pdf_items_files.iter().map(|f| (*f, true)));
        for (file, from_pdf) in ordered {
            match self.parse_file(input, file) {
                Ok(output) => {
                    debug!(file = %file.file_name, items = output.items.len(), "parsed items document");
                    items.extend(output.items);
                    // First summary wins.
                    if claimed.is_none() {
                        if let Some(summary) = output.invoice_summary {
                            claimed = Some(summary);
                            claimed_from_items_pdf = from_pdf;
                        }
                    }
                }
                Err(e) => {
                    warn!(file = %file.file_name, error = %e, "items document failed");
                    errors.push(format!("{}: {}", file.file_name, e));
                }
            }
        }

        // The Apex items-PDF totals a different section than the grand
        // total on its reference sheets; a reference-derived figure
        // supersedes it when one can be extracted.
        let prefer_reference = claimed_from_items_pdf
            && matches!(
                extract::select("application/pdf", Some(&input.supplier)),
                Ok(Extractor::ApexPdf)
            );

        if claimed.is_none() || prefer_reference {
            if let Some(summary) = self.scan_references(input, &references, &mut errors) {
                claimed = Some(summary);
            }
        }

        let fees = resolve_fees(self.config, &run.fee_overrides);
        let system_amount = calculate_total(&items, self.config, &fees);
        run.set_totals(claimed.as_ref().map(|s| s.total_amount), system_amount);

        if run.has_amount_mismatch {
            warn!(
                invoice_amount = ?run.invoice_amount,
                system_amount,
                difference = ?run.amount_difference,
                "amount mismatch detected"
            );
        }

        let mut created = 0;
        let mut updated = 0;
        let mut failed = 0;
        for item in &items {
            match self.store.upsert_line_item(&input.batch_key, item) {
                Ok(UpsertOutcome::Created) => created += 1,
                Ok(UpsertOutcome::Updated) => updated += 1,
                Err(e) => {
                    failed += 1;
                    errors.push(e.to_string());
                }
            }
        }
        let succeeded = created + updated;

        run.status = if failed == 0 {
            RunStatus::Success
        } else if succeeded > 0 {
            RunStatus::Partial
        } else {
            RunStatus::Error
        };
        run.finished_at = Some(Utc::now());
        self.store.save_run(run)?;

        Ok(RunReport {
            items_processed: items.len(),
            items_succeeded: succeeded,
            items_failed: failed,
            items_created: created,
            items_updated: updated,
            errors,
            invoice_amount: run.invoice_amount,
            system_amount: run.system_amount,
            amount_difference: run.amount_difference,
            has_amount_mismatch: run.has_amount_mismatch,
            status: run.status,
        })
    }

    /// Re-run calculation and comparison over the persisted line items.
    ///
    /// This is the fee-edit path: the run's overrides may have changed,
    /// the item snapshot has not. Must produce the same result as a fresh
    /// import of the same inputs.
    pub fn recompute(&mut self, run: &mut ReconciliationRun) -> Result<RunReport> {
        let items = self.store.find_line_items_for_batch(&run.batch_key)?;
        let fees = resolve_fees(self.config, &run.fee_overrides);
        let system_amount = calculate_total(&items, self.config, &fees);
        run.set_totals(run.invoice_amount, system_amount);
        run.finished_at = Some(Utc::now());
        self.store.save_run(run)?;

        info!(
            batch = %run.batch_key,
            system_amount,
            mismatch = run.has_amount_mismatch,
            "recomputed run totals"
        );

        Ok(RunReport {
            items_processed: items.len(),
            items_succeeded: items.len(),
            items_failed: 0,
            items_created: 0,
            items_updated: 0,
            errors: Vec::new(),
            invoice_amount: run.invoice_amount,
            system_amount: run.system_amount,
            amount_difference: run.amount_difference,
            has_amount_mismatch: run.has_amount_mismatch,
            status: run.status,
        })
    }

    fn parse_file(&self, input: &BatchInput, file: &DocumentFile) -> Result<ParseOutput> {
        let extractor = extract::select(&file.media_type, Some(&input.supplier))?;

        // Timegate documents are only ever parsed from the pre-extracted
        // text map; raw bytes are not a substitute.
        if extractor == Extractor::TimegatePdf {
            let text = input
                .extracted_text
                .get(&file.file_id)
                .ok_or_else(|| ExtractError::TextUnavailable(file.file_id.clone()))?;
            return Ok(extractor.parse(DocumentInput::Text(text))?);
        }

        if let Some(bytes) = file.data.as_deref() {
            return Ok(extractor.parse(DocumentInput::Bytes(bytes))?);
        }
        if let Some(text) = input.extracted_text.get(&file.file_id) {
            return Ok(extractor.parse(DocumentInput::Text(text))?);
        }
        Err(ExtractError::TextUnavailable(file.file_id.clone()).into())
    }

    /// Step-3 scan: reference PDFs with invoice-like filenames, in
    /// priority order, structured extractor first, generic summary regex
    /// as fallback. Stops at the first successful extraction.
    fn scan_references(
        &self,
        input: &BatchInput,
        references: &[&DocumentFile],
        errors: &mut Vec<String>,
    ) -> Option<InvoiceSummary> {
        let mut candidates: Vec<(u8, &DocumentFile)> = references
            .iter()
            .filter_map(|f| reference_priority(&f.file_name).map(|p| (p, *f)))
            .collect();
        candidates.sort_by_key(|(priority, _)| *priority);

        for (_, file) in candidates {
            let text = match self.reference_text(input, file) {
                Ok(text) => text,
                Err(e) => {
                    warn!(file = %file.file_name, error = %e, "reference document unreadable");
                    errors.push(format!("{}: {}", file.file_name, e));
                    continue;
                }
            };

            if let Ok(structured) = extract::select("application/pdf", Some(&input.supplier)) {
                if let Ok(output) = structured.parse(DocumentInput::Text(&text)) {
                    if let Some(summary) = output.invoice_summary {
                        debug!(file = %file.file_name, extractor = structured.name(), "claimed total from reference");
                        return Some(summary);
                    }
                }
            }

            if let Some(summary) = extract_summary(&text) {
                debug!(file = %file.file_name, "claimed total from summary regex");
                return Some(summary);
            }
        }
        None
    }

    fn reference_text(
        &self,
        input: &BatchInput,
        file: &DocumentFile,
    ) -> std::result::Result<String, ExtractError> {
        if let Some(text) = input.extracted_text.get(&file.file_id) {
            return Ok(text.clone());
        }
        match file.data.as_deref() {
            Some(bytes) => extract::pdf_text_from_bytes(bytes),
            None => Err(ExtractError::TextUnavailable(file.file_id.clone())),
        }
    }
}
