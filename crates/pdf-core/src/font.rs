//! Font handling for PDF documents

use crate::builtin::BuiltinFont;
use crate::{PdfError, Result};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{Dictionary, Object, Stream};
use std::collections::BTreeSet;
use std::io::Write;
use std::sync::Arc;

/// Font weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

/// Vertical metrics of a font at a given size, in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMetrics {
    /// Distance from the top of the line box to the baseline
    pub ascent: f64,
    /// Depth below the baseline (positive)
    pub descent: f64,
    /// Distance between consecutive baselines
    pub line_height: f64,
}

impl LineMetrics {
    fn from_units(ascender: i16, descender: i16, line_gap: i16, units_per_em: u16, size: f32) -> Self {
        let scale = size as f64 / units_per_em.max(1) as f64;
        Self {
            ascent: ascender as f64 * scale,
            descent: -(descender as f64) * scale,
            line_height: (ascender as f64 - descender as f64 + line_gap as f64) * scale,
        }
    }
}

/// TrueType font data for embedding
///
/// The raw file is shared behind an `Arc`, so cloning a `FontData` is cheap
/// and one loaded font can serve any number of documents.
#[derive(Debug, Clone)]
pub struct FontData {
    /// Font name/identifier (also used as `BaseFont`)
    pub name: String,
    ttf_data: Arc<Vec<u8>>,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    line_gap: i16,
    bbox: [i16; 4],
}

/// PDF objects generated for font embedding
pub struct FontObjects {
    /// Type0 font dictionary
    pub type0_font: Dictionary,
    /// CIDFont Type2 dictionary
    pub cid_font: Dictionary,
    /// Font descriptor dictionary
    pub font_descriptor: Dictionary,
    /// Font file stream (TTF data)
    pub font_file_stream: Stream,
    /// ToUnicode CMap stream
    pub tounicode_stream: Stream,
}

impl FontData {
    /// Create font data from TTF bytes
    ///
    /// # Arguments
    /// * `name` - Font identifier
    /// * `ttf_data` - TrueType font file bytes
    pub fn from_ttf(name: &str, ttf_data: Vec<u8>) -> Result<Self> {
        let face = ttf_parser::Face::parse(&ttf_data, 0)
            .map_err(|e| PdfError::FontParseError(format!("{name}: {e:?}")))?;

        let rect = face.global_bounding_box();
        let units_per_em = face.units_per_em();
        let ascender = face.ascender();
        let descender = face.descender();
        let line_gap = face.line_gap();
        let bbox = [rect.x_min, rect.y_min, rect.x_max, rect.y_max];

        Ok(Self {
            name: name.to_string(),
            ttf_data: Arc::new(ttf_data),
            units_per_em,
            ascender,
            descender,
            line_gap,
            bbox,
        })
    }

    fn face(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.ttf_data, 0).ok()
    }

    /// Get glyph ID for a character
    pub fn glyph_id(&self, c: char) -> Option<u16> {
        self.face()
            .and_then(|face| face.glyph_index(c).map(|id| id.0))
    }

    /// Get font units per em
    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    /// Calculate text width in font units
    pub fn text_width(&self, text: &str) -> u32 {
        let Some(face) = self.face() else {
            return 0;
        };
        text.chars()
            .filter_map(|c| face.glyph_index(c))
            .filter_map(|gid| face.glyph_hor_advance(gid))
            .map(u32::from)
            .sum()
    }

    /// Calculate text width in points for a given font size
    pub fn text_width_points(&self, text: &str, font_size: f32) -> f32 {
        let width = self.text_width(text);
        (width as f32 / self.units_per_em.max(1) as f32) * font_size
    }

    /// Vertical metrics at the given size
    pub fn line_metrics(&self, font_size: f32) -> LineMetrics {
        LineMetrics::from_units(
            self.ascender,
            self.descender,
            self.line_gap,
            self.units_per_em,
            font_size,
        )
    }

    /// Scale a value in font units to the 1/1000 em grid PDF expects
    fn to_pdf_units(&self, value: i32) -> i32 {
        value * 1000 / self.units_per_em.max(1) as i32
    }

    /// Encode text as hex glyph IDs for the `Tj` operator (Identity-H)
    pub fn encode_text_hex(&self, text: &str) -> String {
        let face = self.face();
        let mut result = String::from("<");
        for c in text.chars() {
            let gid = face
                .as_ref()
                .and_then(|f| f.glyph_index(c))
                .map(|g| g.0)
                .unwrap_or(0);
            result.push_str(&format!("{gid:04X}"));
        }
        result.push('>');
        result
    }

    /// Generate all PDF objects needed to embed this font
    ///
    /// `used_chars` drives the `/W` array and the ToUnicode CMap.
    pub fn to_pdf_objects(&self, used_chars: &BTreeSet<char>) -> Result<FontObjects> {
        let font_name = Object::Name(self.name.clone().into_bytes());

        let tounicode_content = self.generate_tounicode_cmap(used_chars);
        let tounicode_stream = Stream::new(
            Dictionary::from_iter(vec![("Type", "CMap".into())]),
            tounicode_content.into_bytes(),
        );

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&self.ttf_data)?;
        let compressed = encoder.finish()?;
        let font_file_stream = Stream::new(
            Dictionary::from_iter(vec![
                ("Length1", (self.ttf_data.len() as i64).into()),
                ("Filter", "FlateDecode".into()),
            ]),
            compressed,
        );

        let font_bbox: Vec<Object> = self
            .bbox
            .iter()
            .map(|&v| Object::Integer(self.to_pdf_units(v as i32) as i64))
            .collect();
        let ascent = self.to_pdf_units(self.ascender as i32);
        let descent = self.to_pdf_units(self.descender as i32);

        let font_descriptor = Dictionary::from_iter(vec![
            ("Type", "FontDescriptor".into()),
            ("FontName", font_name.clone()),
            ("Flags", 32.into()), // Nonsymbolic
            ("FontBBox", font_bbox.into()),
            ("ItalicAngle", 0.into()),
            ("Ascent", ascent.into()),
            ("Descent", descent.into()),
            ("CapHeight", ascent.into()),
            ("StemV", 80.into()),
        ]);

        let cid_system_info = Dictionary::from_iter(vec![
            ("Registry", Object::string_literal("Adobe")),
            ("Ordering", Object::string_literal("Identity")),
            ("Supplement", 0.into()),
        ]);

        let cid_font = Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "CIDFontType2".into()),
            ("BaseFont", font_name.clone()),
            ("CIDSystemInfo", cid_system_info.into()),
            ("CIDToGIDMap", "Identity".into()),
            ("W", self.generate_widths_array(used_chars).into()),
            ("DW", 1000.into()),
        ]);

        // DescendantFonts and ToUnicode are linked once the objects have ids
        let type0_font = Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "Type0".into()),
            ("BaseFont", font_name),
            ("Encoding", "Identity-H".into()),
        ]);

        Ok(FontObjects {
            type0_font,
            cid_font,
            font_descriptor,
            font_file_stream,
            tounicode_stream,
        })
    }

    /// Generate /W array for glyph widths: [gid1 [w1] gid2 [w2] ...]
    fn generate_widths_array(&self, used_chars: &BTreeSet<char>) -> Vec<Object> {
        let mut widths = Vec::new();
        let Some(face) = self.face() else {
            return widths;
        };

        let mut gids: Vec<ttf_parser::GlyphId> = used_chars
            .iter()
            .filter_map(|&c| face.glyph_index(c))
            .collect();
        gids.sort();
        gids.dedup();

        for gid in gids {
            let advance = face.glyph_hor_advance(gid).unwrap_or(0);
            widths.push(Object::Integer(gid.0 as i64));
            widths.push(Object::Array(vec![Object::Integer(
                self.to_pdf_units(advance as i32) as i64,
            )]));
        }

        widths
    }

    /// Generate ToUnicode CMap stream content
    fn generate_tounicode_cmap(&self, used_chars: &BTreeSet<char>) -> String {
        let mut cmap = String::new();

        cmap.push_str("/CIDInit /ProcSet findresource begin\n");
        cmap.push_str("12 dict begin\n");
        cmap.push_str("begincmap\n");
        cmap.push_str("/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
        cmap.push_str("/CMapName /Adobe-Identity-UCS def\n");
        cmap.push_str("/CMapType 2 def\n");
        cmap.push_str("1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n");

        let chars: Vec<char> = used_chars.iter().copied().collect();
        // bfchar sections hold at most 100 entries
        for chunk in chars.chunks(100) {
            cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
            for &c in chunk {
                let gid = self.glyph_id(c).unwrap_or(0);
                let mut utf16 = [0u16; 2];
                let unicode: String = c
                    .encode_utf16(&mut utf16)
                    .iter()
                    .map(|unit| format!("{unit:04X}"))
                    .collect();
                cmap.push_str(&format!("<{gid:04X}> <{unicode}>\n"));
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str("endcmap\n");
        cmap.push_str("CMapName currentdict /CMap defineresource pop\n");
        cmap.push_str("end\n");
        cmap.push_str("end\n");

        cmap
    }
}

/// A font usable for drawing text: a standard font or an embedded TrueType font
#[derive(Debug, Clone)]
pub enum FontFace {
    Builtin(BuiltinFont),
    TrueType(FontData),
}

impl FontFace {
    /// Unique name of this face within a document
    pub fn name(&self) -> &str {
        match self {
            FontFace::Builtin(font) => font.base_name(),
            FontFace::TrueType(data) => &data.name,
        }
    }

    /// Calculate text width in points for a given font size
    pub fn text_width_points(&self, text: &str, font_size: f32) -> f32 {
        match self {
            FontFace::Builtin(font) => font.text_width_points(text, font_size),
            FontFace::TrueType(data) => data.text_width_points(text, font_size),
        }
    }

    /// Encode text for the `Tj` operator
    pub fn encode_text_hex(&self, text: &str) -> String {
        match self {
            FontFace::Builtin(font) => font.encode_text_hex(text),
            FontFace::TrueType(data) => data.encode_text_hex(text),
        }
    }

    /// Vertical metrics at the given size
    pub fn line_metrics(&self, font_size: f32) -> LineMetrics {
        match self {
            FontFace::Builtin(font) => LineMetrics::from_units(
                font.ascender(),
                font.descender(),
                font.line_gap(),
                1000,
                font_size,
            ),
            FontFace::TrueType(data) => data.line_metrics(font_size),
        }
    }
}

/// Font family with a regular and an optional bold variant
#[derive(Debug, Clone)]
pub struct FontFamily {
    /// Regular variant
    pub regular: FontFace,
    /// Bold variant
    pub bold: Option<FontFace>,
}

impl FontFamily {
    /// Family backed by standard fonts; nothing is embedded
    pub fn builtin(regular: BuiltinFont, bold: BuiltinFont) -> Self {
        Self {
            regular: FontFace::Builtin(regular),
            bold: Some(FontFace::Builtin(bold)),
        }
    }

    /// Get the face for the specified weight, falling back to regular
    pub fn variant(&self, weight: FontWeight) -> &FontFace {
        match weight {
            FontWeight::Bold => self.bold.as_ref().unwrap_or(&self.regular),
            FontWeight::Regular => &self.regular,
        }
    }

    /// All faces of the family
    pub fn faces(&self) -> impl Iterator<Item = &FontFace> {
        std::iter::once(&self.regular).chain(self.bold.as_ref())
    }
}

/// Builder for TrueType font families
#[derive(Default)]
pub struct FontFamilyBuilder {
    regular: Option<Vec<u8>>,
    bold: Option<Vec<u8>>,
}

impl FontFamilyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn regular(mut self, ttf_data: Vec<u8>) -> Self {
        self.regular = Some(ttf_data);
        self
    }

    pub fn bold(mut self, ttf_data: Vec<u8>) -> Self {
        self.bold = Some(ttf_data);
        self
    }

    /// Build the FontFamily from the provided TTF data
    pub fn build(self, family_name: &str) -> Result<FontFamily> {
        let regular = match self.regular {
            Some(data) => FontData::from_ttf(&format!("{family_name}-regular"), data)?,
            None => {
                return Err(PdfError::FontParseError(
                    "FontFamily must have at least a regular variant".to_string(),
                ))
            }
        };

        let bold = self
            .bold
            .map(|data| FontData::from_ttf(&format!("{family_name}-bold"), data))
            .transpose()?;

        Ok(FontFamily {
            regular: FontFace::TrueType(regular),
            bold: bold.map(FontFace::TrueType),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Font data whose bytes do not parse; every glyph lookup misses
    fn unparsable_font() -> FontData {
        FontData {
            name: "test".to_string(),
            ttf_data: Arc::new(vec![0u8; 100]),
            units_per_em: 2048,
            ascender: 1900,
            descender: -500,
            line_gap: 0,
            bbox: [-1000, -500, 2000, 1900],
        }
    }

    fn chars(text: &str) -> BTreeSet<char> {
        text.chars().collect()
    }

    #[test]
    fn test_from_ttf_rejects_garbage() {
        let result = FontData::from_ttf("broken", vec![0u8; 100]);
        assert!(matches!(result, Err(PdfError::FontParseError(_))));
    }

    #[test]
    fn test_builder_requires_regular() {
        let result = FontFamilyBuilder::new().bold(vec![1, 2, 3]).build("roboto");
        assert!(matches!(result, Err(PdfError::FontParseError(_))));
    }

    #[test]
    fn test_text_width_without_face() {
        let font = unparsable_font();
        assert_eq!(font.text_width("Olá"), 0);
        assert_eq!(font.text_width_points("Olá", 12.0), 0.0);
    }

    #[test]
    fn test_encode_text_hex_without_face() {
        let font = unparsable_font();
        assert_eq!(font.encode_text_hex(""), "<>");
        assert_eq!(font.encode_text_hex("A"), "<0000>");
        assert_eq!(font.encode_text_hex("AB"), "<00000000>");
    }

    #[test]
    fn test_line_metrics_scale_with_units_per_em() {
        let metrics = unparsable_font().line_metrics(10.24);
        assert!((metrics.ascent - 9.5).abs() < 1e-9);
        assert!((metrics.descent - 2.5).abs() < 1e-9);
        assert!((metrics.line_height - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_to_pdf_units() {
        let font = unparsable_font();
        assert_eq!(font.to_pdf_units(2048), 1000);
        assert_eq!(font.to_pdf_units(1024), 500);
    }

    #[test]
    fn test_to_pdf_objects() {
        let font = unparsable_font();
        let objects = font.to_pdf_objects(&chars("Orçamento")).unwrap();

        assert_eq!(
            objects.type0_font.get(b"Encoding").unwrap().as_name().unwrap(),
            b"Identity-H"
        );
        assert_eq!(
            objects.cid_font.get(b"Subtype").unwrap().as_name().unwrap(),
            b"CIDFontType2"
        );
        let bbox = objects.font_descriptor.get(b"FontBBox").unwrap().as_array().unwrap();
        assert_eq!(bbox[2].as_i64().unwrap(), 976);
        assert!(!objects.font_file_stream.content.is_empty());
        assert!(!objects.tounicode_stream.content.is_empty());
    }

    #[test]
    fn test_generate_tounicode_cmap() {
        let font = unparsable_font();
        let cmap = font.generate_tounicode_cmap(&chars("Aç"));

        assert!(cmap.contains("/CIDInit"));
        assert!(cmap.contains("2 beginbfchar"));
        assert!(cmap.contains("<0000> <0041>"));
        assert!(cmap.contains("<0000> <00E7>"));
        assert!(cmap.contains("endcmap"));
    }

    #[test]
    fn test_generate_tounicode_cmap_empty() {
        let cmap = unparsable_font().generate_tounicode_cmap(&BTreeSet::new());
        assert!(cmap.contains("begincmap"));
        assert!(!cmap.contains("beginbfchar"));
    }

    #[test]
    fn test_widths_array_without_face_is_empty() {
        let font = unparsable_font();
        assert!(font.generate_widths_array(&chars("AB")).is_empty());
    }

    #[test]
    fn test_builtin_family_variants() {
        let family = FontFamily::builtin(BuiltinFont::Helvetica, BuiltinFont::HelveticaBold);
        assert_eq!(family.variant(FontWeight::Regular).name(), "Helvetica");
        assert_eq!(family.variant(FontWeight::Bold).name(), "Helvetica-Bold");
        assert_eq!(family.faces().count(), 2);
    }

    #[test]
    fn test_bold_falls_back_to_regular() {
        let family = FontFamily {
            regular: FontFace::TrueType(unparsable_font()),
            bold: None,
        };
        assert_eq!(family.variant(FontWeight::Bold).name(), "test");
        assert_eq!(family.faces().count(), 1);
    }

    #[test]
    fn test_builtin_line_metrics() {
        let metrics = FontFace::Builtin(BuiltinFont::Helvetica).line_metrics(10.0);
        assert!((metrics.ascent - 7.18).abs() < 1e-9);
        assert!((metrics.line_height - 11.56).abs() < 1e-9);
    }
}
