//! Orçamento - repair-order quote rendering
//!
//! This crate provides:
//! - Quote records parsed leniently from form payloads
//! - An immutable layout/branding configuration
//! - A drawing surface abstraction with PDF and recording backends
//! - The page decorator (header and footer on every page)
//! - The document renderer (defect/cause text, order metadata, itemized
//!   tables, payment summary and the terms page)
//!
//! # Example
//!
//! ```ignore
//! use orcamento::{QuoteConfig, QuoteRecord, QuoteRenderer};
//!
//! let record = QuoteRecord::from_json(r#"{
//!     "os": "1234",
//!     "defeito": "Tela quebrada",
//!     "pecas": { "Tela": 350.00 },
//!     "mao_obra": { "Troca de tela": 80.00 },
//!     "valor_total": 400,
//!     "parcelas": 3
//! }"#)?;
//!
//! let renderer = QuoteRenderer::new(QuoteConfig::default())?;
//! renderer.generate_document(&record, "data/orcamento_1234_1700000000.pdf")?;
//! ```

pub mod config;
pub mod decorator;
pub mod record;
mod renderer;
pub mod surface;
mod table;

pub use config::QuoteConfig;
pub use decorator::PageDecorator;
pub use record::{LineItem, QuoteRecord};
pub use renderer::QuoteRenderer;
pub use surface::{DrawOp, DrawingSurface, PdfSurface, RecordingSurface, Rect, TextRun, TextStyle};

use pdf_core::PdfError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Message shown to the user when the destination is held by another program
pub const LOCKED_MESSAGE: &str = "O arquivo PDF está ocupado. Feche-o e tente novamente.";

/// Errors that can occur while generating a quote
#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Output file is locked: {}", .0.display())]
    OutputLocked(PathBuf),

    #[error("Asset {} unavailable: {reason}", .path.display())]
    AssetMissing { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("PDF error: {0}")]
    PdfError(PdfError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<PdfError> for QuoteError {
    fn from(err: PdfError) -> Self {
        match err {
            PdfError::OutputLocked(path) => QuoteError::OutputLocked(path),
            PdfError::IoError(e) => QuoteError::IoError(e),
            other => QuoteError::PdfError(other),
        }
    }
}

/// Broad classification of a [`QuoteError`] for callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Payload or configuration could not be understood
    InvalidInput,
    /// Destination file is held open by another process
    OutputLocked,
    /// Any other filesystem, stream or serialization failure
    IoFailure,
    /// A configured asset (font) could not be loaded
    AssetMissing,
}

impl QuoteError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QuoteError::InvalidInput(_) | QuoteError::JsonError(_) => ErrorKind::InvalidInput,
            QuoteError::OutputLocked(_) => ErrorKind::OutputLocked,
            QuoteError::AssetMissing { .. } => ErrorKind::AssetMissing,
            QuoteError::IoError(_) | QuoteError::PdfError(_) => ErrorKind::IoFailure,
        }
    }

    /// Portuguese message suitable for the person who requested the quote
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::OutputLocked => LOCKED_MESSAGE.to_string(),
            _ => format!("Falha ao gerar o PDF: {self}"),
        }
    }
}

/// Result type for quote operations
pub type Result<T> = std::result::Result<T, QuoteError>;

/// Generate a quote PDF at `output_path` with the default configuration
pub fn generate_document<P: AsRef<Path>>(record: &QuoteRecord, output_path: P) -> Result<()> {
    QuoteRenderer::new(QuoteConfig::default())?.generate_document(record, output_path)
}

/// Deterministic file name for a generated quote
///
/// The order id is reduced to `[A-Za-z0-9_-]`; any other character becomes
/// `_` and a missing or blank id becomes `sem-os`.
///
/// # Examples
/// ```
/// use orcamento::output_file_name;
/// assert_eq!(output_file_name(Some("1234"), 1700000000), "orcamento_1234_1700000000.pdf");
/// assert_eq!(output_file_name(Some("12/A"), 1), "orcamento_12_A_1.pdf");
/// assert_eq!(output_file_name(None, 1), "orcamento_sem-os_1.pdf");
/// ```
pub fn output_file_name(order_id: Option<&str>, unix_timestamp: u64) -> String {
    let sanitized: String = order_id
        .map(str::trim)
        .unwrap_or_default()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let id = if sanitized.is_empty() {
        "sem-os"
    } else {
        sanitized.as_str()
    };

    format!("orcamento_{id}_{unix_timestamp}.pdf")
}
