//! Text rendering utilities

use crate::document::Color;
use crate::graphics::fmt_num;

/// Context for rendering text
pub struct TextRenderContext {
    /// PDF font resource name (e.g., "F1")
    pub font_name: String,
    /// Font size in points
    pub font_size: f32,
    /// Text color (RGB)
    pub color: Color,
}

/// Generate PDF operators for text insertion
///
/// Creates the PDF text operators (BT, rg, Tf, Td, Tj, ET) that draw
/// already-encoded text with its baseline starting at `(x, y)`.
///
/// # Arguments
/// * `text_hex` - Hex-encoded text (e.g., "<50E167696E61>")
/// * `x` - X coordinate in points (PDF coordinates, from left)
/// * `y` - Baseline Y coordinate in points (PDF coordinates, from bottom)
/// * `ctx` - Text rendering context
pub fn generate_text_operators(text_hex: &str, x: f64, y: f64, ctx: &TextRenderContext) -> Vec<u8> {
    let mut ops = String::new();

    ops.push_str("BT\n");
    ops.push_str(&format!(
        "{} {} {} rg\n",
        fmt_num(ctx.color.r as f64),
        fmt_num(ctx.color.g as f64),
        fmt_num(ctx.color.b as f64)
    ));
    ops.push_str(&format!("/{} {} Tf\n", ctx.font_name, fmt_num(ctx.font_size as f64)));
    ops.push_str(&format!("{} {} Td\n", fmt_num(x), fmt_num(y)));
    ops.push_str(&format!("{text_hex} Tj\n"));
    ops.push_str("ET\n");

    ops.into_bytes()
}

/// Split text into lines that fit `max_width`
///
/// Explicit newlines always break. Words are packed greedily using the
/// `measure` callback (width in points); a single word wider than the line
/// is broken between characters.
///
/// # Arguments
/// * `text` - Text to split
/// * `max_width` - Maximum line width in points
/// * `measure` - Returns the rendered width of a string
pub fn wrap_text<F>(text: &str, max_width: f64, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f64,
{
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let paragraph = paragraph.trim_end_matches('\r');
        let mut current_line = String::new();

        for word in paragraph.split_whitespace() {
            let candidate = if current_line.is_empty() {
                word.to_string()
            } else {
                format!("{current_line} {word}")
            };

            if measure(&candidate) <= max_width {
                current_line = candidate;
                continue;
            }

            if !current_line.is_empty() {
                lines.push(std::mem::take(&mut current_line));
            }

            if measure(word) <= max_width {
                current_line = word.to_string();
            } else {
                let mut pieces = break_word(word, max_width, &measure);
                current_line = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
            }
        }

        lines.push(current_line);
    }

    lines
}

/// Break an overlong word into chunks no wider than `max_width`
fn break_word<F>(word: &str, max_width: f64, measure: &F) -> Vec<String>
where
    F: Fn(&str) -> f64,
{
    let mut pieces = Vec::new();
    let mut current = String::new();

    for c in word.chars() {
        current.push(c);
        // Keep at least one character per line so narrow widths still progress
        if measure(&current) > max_width && current.chars().count() > 1 {
            current.pop();
            pieces.push(std::mem::take(&mut current));
            current.push(c);
        }
    }

    pieces.push(current);
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Every character is 1pt wide
    fn char_count(s: &str) -> f64 {
        s.chars().count() as f64
    }

    #[test]
    fn test_wrap_text() {
        let lines = wrap_text("Hello world this is a test", 12.0, char_count);
        assert_eq!(lines, vec!["Hello world", "this is a", "test"]);
    }

    #[test]
    fn test_wrap_text_single_line() {
        let lines = wrap_text("Short", 100.0, char_count);
        assert_eq!(lines, vec!["Short"]);
    }

    #[test]
    fn test_wrap_text_empty() {
        let lines = wrap_text("", 10.0, char_count);
        assert_eq!(lines, vec![""]);
    }

    #[test]
    fn test_wrap_text_whitespace_only() {
        let lines = wrap_text("   ", 10.0, char_count);
        assert_eq!(lines, vec![""]);
    }

    #[test]
    fn test_wrap_text_exact_fit() {
        let lines = wrap_text("Hello world", 11.0, char_count);
        assert_eq!(lines, vec!["Hello world"]);
    }

    #[test]
    fn test_wrap_text_just_over() {
        let lines = wrap_text("Hello world", 10.0, char_count);
        assert_eq!(lines, vec!["Hello", "world"]);
    }

    #[test]
    fn test_wrap_text_multiple_spaces() {
        let lines = wrap_text("Hello    world", 20.0, char_count);
        assert_eq!(lines, vec!["Hello world"]);
    }

    #[test]
    fn test_wrap_text_keeps_newlines() {
        let lines = wrap_text("Tela quebrada\r\n\nNão liga", 50.0, char_count);
        assert_eq!(lines, vec!["Tela quebrada", "", "Não liga"]);
    }

    #[test]
    fn test_wrap_text_breaks_long_word() {
        let lines = wrap_text("ab Supercalifragilistic", 10.0, char_count);
        assert_eq!(lines, vec!["ab", "Supercalif", "ragilistic"]);
    }

    #[test]
    fn test_wrap_text_long_word_tail_joins_next_word() {
        let lines = wrap_text("abcdefgh ij", 5.0, char_count);
        assert_eq!(lines, vec!["abcde", "fgh", "ij"]);
    }

    #[test]
    fn test_wrap_text_narrower_than_a_char() {
        let lines = wrap_text("abc", 0.5, char_count);
        assert_eq!(lines, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_generate_text_operators() {
        let ctx = TextRenderContext {
            font_name: "F1".to_string(),
            font_size: 12.0,
            color: Color::black(),
        };

        let ops = generate_text_operators("<48656C6C6F>", 100.0, 700.0, &ctx);
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.starts_with("BT\n"));
        assert!(ops_str.contains("0 0 0 rg"));
        assert!(ops_str.contains("/F1 12 Tf"));
        assert!(ops_str.contains("100 700 Td"));
        assert!(ops_str.contains("<48656C6C6F> Tj"));
        assert!(ops_str.ends_with("ET\n"));
    }

    #[test]
    fn test_generate_text_operators_fractional_position() {
        let ctx = TextRenderContext {
            font_name: "F2".to_string(),
            font_size: 9.5,
            color: Color::from_rgb(255, 0, 0),
        };

        let ops = generate_text_operators("<41>", 327.64, 726.6504, &ctx);
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.contains("1 0 0 rg"));
        assert!(ops_str.contains("/F2 9.5 Tf"));
        assert!(ops_str.contains("327.64 726.65 Td"));
    }
}
