//! Error types for the recon-core library.

use thiserror::Error;

/// Main error type for the recon library.
#[derive(Error, Debug)]
pub enum ReconError {
    /// Document extraction error.
    #[error("extraction error: {0}")]
    Extract(#[from] ExtractError),

    /// Persistence collaborator error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The declared media type is not one the selector can dispatch on.
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to document extraction.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Failed to decode the raw bytes with the expected text encoding.
    #[error("failed to decode document text: {0}")]
    Decode(String),

    /// Failed to extract text from a PDF.
    #[error("failed to extract PDF text: {0}")]
    PdfText(String),

    /// CSV structure error (not a per-row shape problem).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The extractor was handed the wrong input kind (bytes where
    /// pre-extracted text is required, or vice versa).
    #[error("invalid input for extractor {extractor}: {reason}")]
    InvalidInput { extractor: String, reason: String },

    /// Pre-extracted text was required but not supplied for this file.
    /// Recoverable: the file is skipped and the run continues.
    #[error("pre-extracted text unavailable for file {0}")]
    TextUnavailable(String),
}

/// Errors from the persistence collaborator.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Upsert of a single line item failed.
    #[error("failed to upsert item {product_id}: {reason}")]
    Upsert { product_id: String, reason: String },

    /// Lookup of persisted items failed.
    #[error("failed to load items for batch {batch_key}: {reason}")]
    Lookup { batch_key: String, reason: String },

    /// Saving the run verdict failed.
    #[error("failed to save run: {0}")]
    SaveRun(String),
}

/// Result type for the recon library.
pub type Result<T> = std::result::Result<T, ReconError>;
