//! PT-BR Text - Brazilian Portuguese formatting and parsing
//!
//! This crate provides:
//! - Currency formatting (`R$ 430.00`)
//! - Local date formatting (`dd/mm/yyyy`)
//! - Lenient decimal parsing for form input (`"350,00"`, `"R$ 1.234,56"`)
//! - Lenient count parsing (`"3x"` -> 3)
//!
//! # Example
//!
//! ```
//! use ptbr_text::{format_currency, parse_decimal};
//!
//! let price = parse_decimal("R$ 1.234,56").unwrap();
//! assert_eq!(format_currency("R$", price), "R$ 1234.56");
//! ```

mod formatter;
mod number;

pub use formatter::{format_currency, format_date_br};
pub use number::{parse_count, parse_decimal};

use thiserror::Error;

/// Errors that can occur while parsing form numbers
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NumberError {
    #[error("Empty input")]
    Empty,

    #[error("Not a number: {0}")]
    NotANumber(String),

    #[error("Number out of range")]
    NotFinite,
}

/// Result type for number parsing
pub type Result<T> = std::result::Result<T, NumberError>;
