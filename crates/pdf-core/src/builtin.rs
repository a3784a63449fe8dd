//! Standard 14 fonts used without embedding
//!
//! Widths come from the Adobe Core 14 AFM files and are expressed in
//! 1/1000 em. Text is written with `WinAnsiEncoding`, so every character
//! must map to a single byte; anything outside the code page becomes `?`.

use lopdf::{dictionary, Dictionary};

/// Helvetica widths for WinAnsi codes 32..=126
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 32-47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 48-63
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 64-79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 80-95
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 96-111
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 112-126
];

/// Helvetica-Bold widths for WinAnsi codes 32..=126
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // 32-47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 48-63
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // 64-79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 80-95
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // 96-111
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 112-126
];

/// Built-in PDF fonts available without embedding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinFont {
    Helvetica,
    HelveticaBold,
}

impl BuiltinFont {
    /// PostScript name used as `BaseFont`
    pub fn base_name(self) -> &'static str {
        match self {
            BuiltinFont::Helvetica => "Helvetica",
            BuiltinFont::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Ascender in 1/1000 em
    pub fn ascender(self) -> i16 {
        718
    }

    /// Descender in 1/1000 em (negative)
    pub fn descender(self) -> i16 {
        -207
    }

    /// Extra leading derived from the font bounding box
    pub fn line_gap(self) -> i16 {
        match self {
            BuiltinFont::Helvetica => 231,
            BuiltinFont::HelveticaBold => 265,
        }
    }

    /// Advance width of a character in 1/1000 em
    pub fn char_width(self, c: char) -> u16 {
        let table = match self {
            BuiltinFont::Helvetica => &HELVETICA_WIDTHS,
            BuiltinFont::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        };
        let base = fold_accent(c);
        match base as u32 {
            code @ 32..=126 => table[(code - 32) as usize],
            _ => self.symbol_width(base),
        }
    }

    fn symbol_width(self, c: char) -> u16 {
        match c {
            '\u{a0}' => 278,
            'º' => 365,
            'ª' => 370,
            '°' => 400,
            '•' => 350,
            '–' => 556,
            '—' => 1000,
            '…' => 1000,
            '‘' | '’' => match self {
                BuiltinFont::Helvetica => 222,
                BuiltinFont::HelveticaBold => 278,
            },
            '“' | '”' => match self {
                BuiltinFont::Helvetica => 333,
                BuiltinFont::HelveticaBold => 500,
            },
            '´' | '¨' => 333,
            // digits, currency signs and anything unmapped
            _ => 556,
        }
    }

    /// Width of a string in points at the given size
    pub fn text_width_points(self, text: &str, font_size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| self.char_width(c) as u32).sum();
        units as f32 * font_size / 1000.0
    }

    /// Encode text as a hex string of WinAnsi bytes for the `Tj` operator
    pub fn encode_text_hex(self, text: &str) -> String {
        let mut result = String::with_capacity(text.len() * 2 + 2);
        result.push('<');
        for c in text.chars() {
            result.push_str(&format!("{:02X}", win_ansi_byte(c)));
        }
        result.push('>');
        result
    }

    /// Font dictionary for the document's object table
    pub fn to_pdf_dictionary(self) -> Dictionary {
        dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => self.base_name(),
            "Encoding" => "WinAnsiEncoding",
        }
    }
}

/// Map a character to its WinAnsiEncoding byte
pub(crate) fn win_ansi_byte(c: char) -> u8 {
    match c as u32 {
        code @ 0x20..=0x7E => code as u8,
        code @ 0xA0..=0xFF => code as u8,
        _ => match c {
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            '\t' | '\n' | '\r' => b' ',
            _ => b'?',
        },
    }
}

/// Accented Latin-1 letters share the advance width of their base letter
fn fold_accent(c: char) -> char {
    match c {
        'À'..='Å' => 'A',
        'Ç' => 'C',
        'È'..='Ë' => 'E',
        'Ì'..='Ï' => 'I',
        'Ñ' => 'N',
        'Ò'..='Ö' | 'Ø' => 'O',
        'Ù'..='Ü' => 'U',
        'Ý' => 'Y',
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ì'..='ï' => 'i',
        'ñ' => 'n',
        'ò'..='ö' | 'ø' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ascii_widths() {
        assert_eq!(BuiltinFont::Helvetica.char_width(' '), 278);
        assert_eq!(BuiltinFont::Helvetica.char_width('A'), 667);
        assert_eq!(BuiltinFont::Helvetica.char_width('i'), 222);
        assert_eq!(BuiltinFont::Helvetica.char_width('~'), 584);
        assert_eq!(BuiltinFont::HelveticaBold.char_width('A'), 722);
        assert_eq!(BuiltinFont::HelveticaBold.char_width('i'), 278);
    }

    #[test]
    fn test_accented_widths_match_base_letter() {
        let font = BuiltinFont::Helvetica;
        assert_eq!(font.char_width('ç'), font.char_width('c'));
        assert_eq!(font.char_width('Ã'), font.char_width('A'));
        assert_eq!(font.char_width('õ'), font.char_width('o'));
        assert_eq!(font.char_width('É'), font.char_width('E'));
    }

    #[test]
    fn test_text_width_points() {
        // "R$" = 722 + 556 units
        let width = BuiltinFont::Helvetica.text_width_points("R$", 10.0);
        assert!((width - 12.78).abs() < 0.001);
        assert_eq!(BuiltinFont::Helvetica.text_width_points("", 10.0), 0.0);
    }

    #[test]
    fn test_encode_text_hex_win_ansi() {
        assert_eq!(BuiltinFont::Helvetica.encode_text_hex("Página 1"), "<50E167696E612031>");
        assert_eq!(BuiltinFont::Helvetica.encode_text_hex("Nº"), "<4EBA>");
        assert_eq!(BuiltinFont::Helvetica.encode_text_hex(""), "<>");
    }

    #[test]
    fn test_unmapped_characters_fall_back() {
        assert_eq!(win_ansi_byte('€'), 0x80);
        assert_eq!(win_ansi_byte('•'), 0x95);
        assert_eq!(win_ansi_byte('ส'), b'?');
        assert_eq!(win_ansi_byte('\n'), b' ');
    }

    #[test]
    fn test_pdf_dictionary() {
        let dict = BuiltinFont::HelveticaBold.to_pdf_dictionary();
        assert_eq!(dict.get(b"Subtype").unwrap().as_name().unwrap(), b"Type1");
        assert_eq!(
            dict.get(b"BaseFont").unwrap().as_name().unwrap(),
            b"Helvetica-Bold"
        );
        assert_eq!(
            dict.get(b"Encoding").unwrap().as_name().unwrap(),
            b"WinAnsiEncoding"
        );
    }
}
