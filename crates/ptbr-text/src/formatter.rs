//! Currency and date formatting

use chrono::NaiveDate;

/// Format an amount with a currency symbol and exactly two decimals
///
/// No thousands separators are inserted and the decimal separator is a
/// point. Non-finite amounts render as zero.
///
/// # Examples
/// ```
/// use ptbr_text::format_currency;
/// assert_eq!(format_currency("R$", 430.0), "R$ 430.00");
/// assert_eq!(format_currency("R$", 1234.5), "R$ 1234.50");
/// assert_eq!(format_currency("R$", 0.005), "R$ 0.01");
/// ```
pub fn format_currency(symbol: &str, amount: f64) -> String {
    let cents = if amount.is_finite() {
        (amount * 100.0).round()
    } else {
        0.0
    };
    // Avoid "-0.00" for tiny negatives
    let value = if cents == 0.0 { 0.0 } else { cents / 100.0 };

    if symbol.is_empty() {
        format!("{value:.2}")
    } else {
        format!("{symbol} {value:.2}")
    }
}

/// Format a date as `dd/mm/yyyy`
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use ptbr_text::format_date_br;
/// let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
/// assert_eq!(format_date_br(date), "07/03/2025");
/// ```
pub fn format_date_br(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}
