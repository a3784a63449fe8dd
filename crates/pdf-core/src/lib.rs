//! PDF Core - Low-level PDF writing
//!
//! This crate provides functionality for:
//! - Creating documents page by page
//! - Standard Type1 fonts (Helvetica) and embedded TrueType fonts
//! - Inserting text at specific coordinates with alignment
//! - Drawing rectangles, lines, circles and axial gradients
//! - Inserting images (JPEG, PNG)
//! - Saving with an exclusive lock on the destination
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{Align, BuiltinFont, Color, FontFamily, PageSize, PdfDocument};
//!
//! let mut doc = PdfDocument::new();
//! doc.register_font_family(
//!     "helvetica",
//!     FontFamily::builtin(BuiltinFont::Helvetica, BuiltinFont::HelveticaBold),
//! )?;
//! let page = doc.add_page(PageSize::A4)?;
//! doc.set_font("helvetica", 12.0)?;
//! doc.insert_text("Olá, mundo!", page, 40.0, 60.0, Align::Left)?;
//! doc.fill_rect(page, 40.0, 80.0, 200.0, 3.0, Color::from_rgb(243, 112, 33))?;
//! doc.save("output.pdf")?;
//! ```

mod builtin;
mod document;
mod font;
mod graphics;
mod image;
mod output;
mod text;

pub use builtin::BuiltinFont;
pub use document::{Color, PageSize, PdfDocument};
pub use font::{FontData, FontFace, FontFamily, FontFamilyBuilder, FontWeight, LineMetrics};
pub use image::{calculate_scaled_dimensions, image_dimensions, ImageScaleMode};
pub use text::{generate_text_operators, wrap_text, TextRenderContext};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Font not found: {0}")]
    FontNotFound(String),

    #[error("Font already exists: {0}")]
    FontAlreadyExists(String),

    #[error("Failed to parse font: {0}")]
    FontParseError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("PDF parsing error: {0}")]
    ParseError(String),

    #[error("Output file is locked: {}", .0.display())]
    OutputLocked(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Text alignment options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    /// Offset to apply to an anchor x so text of `width` lands with this alignment
    pub fn offset(self, width: f64) -> f64 {
        match self {
            Align::Left => 0.0,
            Align::Center => -width / 2.0,
            Align::Right => -width,
        }
    }
}
