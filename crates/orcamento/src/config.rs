//! Layout, branding and text configuration
//!
//! Every field has a default matching the shop's printed quote, so a JSON
//! file only needs the values it changes.

use crate::{QuoteError, Result};
use pdf_core::{Color, PageSize};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete renderer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuoteConfig {
    pub page: PageConfig,
    pub palette: Palette,
    pub branding: Branding,
    pub fonts: FontConfig,
    pub labels: Labels,
    pub layout: LayoutConfig,
    /// Notes listed on the last page
    pub terms: Vec<String>,
    pub currency_symbol: String,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            page: PageConfig::default(),
            palette: Palette::default(),
            branding: Branding::default(),
            fonts: FontConfig::default(),
            labels: Labels::default(),
            layout: LayoutConfig::default(),
            terms: [
                "Programas essenciais como navegadores, leitores de PDF, pacote Office e WinRAR são instalados.",
                "Sistemas específicos e apps de nuvem devem ser providenciados pelo cliente.",
                "O backup cobre documentos, fotos e downloads. Arquivos em nuvem não são incluídos.",
                "Reparo de carcaça não garante aparência estética original.",
                "Caso de falha no reparo de placa, não será cobrado.",
                "Tempo de entrega para peças: 5 a 7 dias.",
                "Tempo de realização de serviço: 1 a 2 dias úteis.",
            ]
            .map(String::from)
            .to_vec(),
            currency_symbol: "R$".to_string(),
        }
    }
}

impl QuoteConfig {
    /// Parse a (possibly partial) configuration from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| QuoteError::InvalidInput(format!("invalid configuration: {e}")))
    }

    /// Load a (possibly partial) configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Pretty-printed JSON of this configuration
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Page size and margins in points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageConfig {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    /// Distance from the page bottom to the footer rule
    pub bottom_margin: f64,
    /// First y available to content, below the header band
    pub content_top: f64,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            width: PageSize::A4.width,
            height: PageSize::A4.height,
            margin: 40.0,
            bottom_margin: 40.0,
            content_top: 115.0,
        }
    }
}

impl PageConfig {
    pub fn size(&self) -> PageSize {
        PageSize::new(self.width, self.height)
    }

    /// Width between the left and right margins
    pub fn printable_width(&self) -> f64 {
        self.width - 2.0 * self.margin
    }

    pub fn right_edge(&self) -> f64 {
        self.width - self.margin
    }
}

/// Colors, written as `#RRGGBB` in JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Palette {
    #[serde(with = "hex_color")]
    pub brand: Color,
    #[serde(with = "hex_color")]
    pub brand_light: Color,
    #[serde(with = "hex_color")]
    pub text_dark: Color,
    #[serde(with = "hex_color")]
    pub text_medium: Color,
    #[serde(with = "hex_color")]
    pub border: Color,
    /// Background of odd table rows
    #[serde(with = "hex_color")]
    pub row_shade: Color,
    #[serde(with = "hex_color")]
    pub footer_text: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            brand: Color::from_rgb(0xF3, 0x70, 0x21),
            brand_light: Color::from_rgb(0xFD, 0xB8, 0x13),
            text_dark: Color::from_rgb(0x2C, 0x3E, 0x50),
            text_medium: Color::from_rgb(0x7F, 0x8C, 0x8D),
            border: Color::from_rgb(0xEA, 0xEA, 0xEA),
            row_shade: Color::from_rgb(0xF8, 0xF9, 0xF9),
            footer_text: Color::from_rgb(0xAA, 0xAA, 0xAA),
        }
    }
}

/// Shop identity printed in the header and footer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Branding {
    pub business_name: String,
    pub contact_lines: Vec<String>,
    /// Logo image (PNG or JPEG); skipped when missing
    pub logo_path: Option<PathBuf>,
    pub logo_width: f64,
    pub logo_max_height: f64,
    pub validity_notice: String,
    /// Word printed before the page number
    pub page_label: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            business_name: "TELETÉCNICO - SOLUÇÕES EM INFORMÁTICA".to_string(),
            contact_lines: vec![
                "CNPJ: 03.379.570/0001-22 | Rua Sao Paulo, Nº 1050".to_string(),
                "CENTRO, DIVINÓPOLIS - MG | CEP: 35500-006".to_string(),
                "Whatsapp: (37) 3112-0073 | Email: teletecnico@financeiro.com.br".to_string(),
            ],
            logo_path: Some(PathBuf::from("contents/logo.png")),
            logo_width: 140.0,
            logo_max_height: 60.0,
            validity_notice: "Orçamento válido por 7 dias. Agradecemos a preferência!".to_string(),
            page_label: "Página".to_string(),
        }
    }
}

/// TrueType files for body text; builtin Helvetica when unset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FontConfig {
    pub regular: Option<PathBuf>,
    pub bold: Option<PathBuf>,
}

/// Captions printed on the quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Labels {
    pub defect_heading: String,
    pub cause_heading: String,
    pub order_number: String,
    pub issue_date: String,
    pub parts_title: String,
    pub labor_title: String,
    pub table_headers: [String; 4],
    pub summary_title: String,
    pub card_total: String,
    /// `{n}` is replaced by the number of installments
    pub installments: String,
    pub cash_total: String,
    pub terms_title: String,
    /// Shown for a missing order id, defect or cause
    pub placeholder: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            defect_heading: "Defeito Apresentado:".to_string(),
            cause_heading: "Causa do Defeito (Pré-Orçamento):".to_string(),
            order_number: "Número da O.S.".to_string(),
            issue_date: "Data de Emissão".to_string(),
            parts_title: "Peças".to_string(),
            labor_title: "Mão de Obra".to_string(),
            table_headers: ["QTD", "DESCRIÇÃO", "R$ UNIT.", "TOTAL"].map(String::from),
            summary_title: "Resumo Financeiro".to_string(),
            card_total: "Total no Cartão:".to_string(),
            installments: "em até {n}x vezes".to_string(),
            cash_total: "Total no dinheiro/pix:".to_string(),
            terms_title: "Observações e Prazos".to_string(),
            placeholder: "Não informado".to_string(),
        }
    }
}

impl Labels {
    pub fn installments_text(&self, installments: u32) -> String {
        self.installments.replace("{n}", &installments.to_string())
    }
}

/// Geometry of the page-one flow, tables, payment box and terms list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub heading_size: f32,
    pub body_size: f32,
    /// Offset from a heading to its text
    pub heading_gap: f64,
    /// Space between the defect text and the cause heading
    pub block_gap: f64,
    /// Left column ends this far left of the page center
    pub left_column_inset: f64,
    /// Right column starts this far right of the page center
    pub right_column_offset: f64,
    /// Offset between the two label/value pairs of the right column
    pub right_row_gap: f64,
    pub right_column_height: f64,
    /// Space between the top section and the tables
    pub section_gap: f64,

    pub table_row_estimate: f64,
    pub table_overhead_estimate: f64,
    /// Reserved space at the bottom of the page for the pre-check
    pub table_bottom_reserve: f64,
    /// Space above each table title
    pub table_spacing: f64,
    pub table_title_size: f32,
    pub table_title_gap: f64,
    pub column_widths: [f64; 4],
    pub header_height: f64,
    pub min_row_height: f64,
    pub cell_padding: f64,
    pub cell_text_offset: f64,
    /// Added to the wrapped description height
    pub row_padding: f64,

    /// Cursor beyond which the payment box moves to a new page
    pub payment_break_y: f64,
    pub payment_width: f64,
    pub payment_offset: f64,
    pub payment_padding: f64,
    pub payment_title_size: f32,
    pub payment_value_size: f32,
    pub payment_note_size: f32,
    /// Installments note sits this far below its total
    pub payment_note_offset: f64,
    pub payment_row_gap: f64,
    /// Space kept below the last payment row inside the border
    pub payment_box_tail: f64,

    pub terms_title_size: f32,
    /// Space after the terms title, in title line heights
    pub terms_title_spacing: f64,
    pub bullet_radius: f64,
    pub bullet_indent: f64,
    pub bullet_gap: f64,

    pub logo_y: f64,
    pub header_text_x: f64,
    pub header_text_y: f64,
    pub business_name_size: f32,
    pub contact_size: f32,
    pub accent_bar_y: f64,
    pub accent_bar_height: f64,
    pub footer_size: f32,
    /// Footer text sits this far below the footer rule
    pub footer_text_gap: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            heading_size: 11.0,
            body_size: 10.0,
            heading_gap: 15.0,
            block_gap: 15.0,
            left_column_inset: 50.0,
            right_column_offset: 30.0,
            right_row_gap: 40.0,
            right_column_height: 80.0,
            section_gap: 20.0,

            table_row_estimate: 30.0,
            table_overhead_estimate: 100.0,
            table_bottom_reserve: 150.0,
            table_spacing: 12.0,
            table_title_size: 12.0,
            table_title_gap: 5.0,
            column_widths: [40.0, 312.0, 80.0, 80.0],
            header_height: 25.0,
            min_row_height: 25.0,
            cell_padding: 10.0,
            cell_text_offset: 8.0,
            row_padding: 12.0,

            payment_break_y: 600.0,
            payment_width: 280.0,
            payment_offset: 25.0,
            payment_padding: 10.0,
            payment_title_size: 16.0,
            payment_value_size: 12.0,
            payment_note_size: 8.0,
            payment_note_offset: 12.0,
            payment_row_gap: 25.0,
            payment_box_tail: 30.0,

            terms_title_size: 12.0,
            terms_title_spacing: 1.7,
            bullet_radius: 2.0,
            bullet_indent: 15.0,
            bullet_gap: 8.0,

            logo_y: 25.0,
            header_text_x: 250.0,
            header_text_y: 35.0,
            business_name_size: 14.0,
            contact_size: 9.0,
            accent_bar_y: 90.0,
            accent_bar_height: 3.0,
            footer_size: 8.0,
            footer_text_gap: 10.0,
        }
    }
}

impl LayoutConfig {
    pub fn table_width(&self) -> f64 {
        self.column_widths.iter().sum()
    }
}

/// Serde adapter for `#RRGGBB` colors
mod hex_color {
    use pdf_core::Color;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(color: &Color, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&color.to_hex())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Color, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Color::from_hex(&hex)
            .ok_or_else(|| de::Error::custom(format!("invalid color {hex:?}, expected #RRGGBB")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_geometry() {
        let config = QuoteConfig::default();
        assert_eq!(config.page.printable_width(), 595.28 - 80.0);
        assert_eq!(config.layout.table_width(), 512.0);
        assert_eq!(config.terms.len(), 7);
    }

    #[test]
    fn test_partial_json_overrides_only_given_fields() {
        let config = QuoteConfig::from_json(
            r##"{
                "palette": { "brand": "#112233" },
                "branding": { "logoPath": null },
                "currencySymbol": "US$"
            }"##,
        )
        .unwrap();

        assert_eq!(config.palette.brand, Color::from_rgb(0x11, 0x22, 0x33));
        assert_eq!(config.palette.brand_light, Palette::default().brand_light);
        assert_eq!(config.branding.logo_path, None);
        assert_eq!(config.branding.business_name, Branding::default().business_name);
        assert_eq!(config.currency_symbol, "US$");
        assert_eq!(config.layout, LayoutConfig::default());
    }

    #[test]
    fn test_round_trip_through_json() {
        let config = QuoteConfig::default();
        let json = config.to_json_pretty().unwrap();
        assert!(json.contains("\"brand\": \"#F37021\""));

        let parsed = QuoteConfig::from_json(&json).unwrap();
        assert_eq!(parsed.palette.brand.to_hex(), "#F37021");
        assert_eq!(parsed.labels, config.labels);
    }

    #[test]
    fn test_invalid_color_is_invalid_input() {
        let err = QuoteConfig::from_json(r#"{"palette": {"brand": "orange"}}"#).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"labels": {"placeholder": "-"}}"#).unwrap();

        let config = QuoteConfig::from_json_file(&path).unwrap();
        assert_eq!(config.labels.placeholder, "-");

        let missing = QuoteConfig::from_json_file(dir.path().join("nope.json")).unwrap_err();
        assert_eq!(missing.kind(), crate::ErrorKind::IoFailure);
    }

    #[test]
    fn test_installments_text() {
        assert_eq!(Labels::default().installments_text(3), "em até 3x vezes");
    }
}
