//! Drawing surfaces the layout engine renders through
//!
//! Coordinates are points from the top-left corner of the page. Text is
//! positioned by the top of its line box; backends convert to baselines.

use crate::Result;
use pdf_core::{
    calculate_scaled_dimensions, image_dimensions, wrap_text, Align, BuiltinFont, Color,
    FontFamily, FontWeight, ImageScaleMode, LineMetrics, PageSize, PdfDocument, PdfError,
};
use std::path::Path;
use tracing::debug;

/// Font weight, size and color of a text run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub weight: FontWeight,
    pub size: f32,
    pub color: Color,
}

impl TextStyle {
    pub fn regular(size: f32, color: Color) -> Self {
        Self {
            weight: FontWeight::Regular,
            size,
            color,
        }
    }

    pub fn bold(size: f32, color: Color) -> Self {
        Self {
            weight: FontWeight::Bold,
            size,
            color,
        }
    }
}

/// Axis-aligned rectangle; `y` is the top edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Capabilities the quote layout needs from an output backend
///
/// Drawing calls apply to the page most recently started with
/// [`start_page`](DrawingSurface::start_page).
pub trait DrawingSurface {
    /// Append a page and make it current; returns its 1-based number
    fn start_page(&mut self) -> Result<usize>;

    /// Number of the current page, 0 before the first page
    fn page_number(&self) -> usize;

    fn page_size(&self) -> PageSize;

    fn measure_text(&self, text: &str, style: &TextStyle) -> f64;

    fn line_metrics(&self, style: &TextStyle) -> LineMetrics;

    /// Draw one line of text; `x` is the anchor for `align`, `y` the line top
    fn draw_text(&mut self, text: &str, x: f64, y: f64, align: Align, style: &TextStyle)
        -> Result<()>;

    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<()>;

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f64) -> Result<()>;

    fn draw_line(
        &mut self,
        from: (f64, f64),
        to: (f64, f64),
        color: Color,
        line_width: f64,
    ) -> Result<()>;

    fn fill_circle(&mut self, center: (f64, f64), radius: f64, color: Color) -> Result<()>;

    /// Fill `rect` with a horizontal gradient
    fn fill_gradient(&mut self, rect: Rect, from: Color, to: Color) -> Result<()>;

    /// Draw an image scaled to fit `bounds` keeping its aspect ratio
    ///
    /// Returns the drawn (width, height).
    fn draw_image(&mut self, data: &[u8], bounds: Rect) -> Result<(f64, f64)>;

    fn line_height(&self, style: &TextStyle) -> f64 {
        self.line_metrics(style).line_height
    }

    /// Split text into lines no wider than `width`
    fn wrap_text(&self, text: &str, width: f64, style: &TextStyle) -> Vec<String> {
        wrap_text(text, width, |s| self.measure_text(s, style))
    }

    /// Height of `text` wrapped at `width`
    fn text_height(&self, text: &str, width: f64, style: &TextStyle) -> f64 {
        self.wrap_text(text, width, style).len() as f64 * self.line_height(style)
    }

    /// Draw text wrapped at `width` starting with its first line top at `y`
    ///
    /// Returns the height of the block.
    fn draw_text_block(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        width: f64,
        align: Align,
        style: &TextStyle,
    ) -> Result<f64> {
        let lines = self.wrap_text(text, width, style);
        let line_height = self.line_height(style);
        let anchor = match align {
            Align::Left => x,
            Align::Center => x + width / 2.0,
            Align::Right => x + width,
        };

        for (i, line) in lines.iter().enumerate() {
            self.draw_text(line, anchor, y + i as f64 * line_height, align, style)?;
        }

        Ok(lines.len() as f64 * line_height)
    }
}

pub(crate) fn helvetica() -> FontFamily {
    FontFamily::builtin(BuiltinFont::Helvetica, BuiltinFont::HelveticaBold)
}

/// Font family name registered in the PDF document
const BODY_FAMILY: &str = "body";

/// Surface writing a real PDF through `pdf-core`
pub struct PdfSurface {
    doc: PdfDocument,
    fonts: FontFamily,
    page_size: PageSize,
    page: usize,
}

impl PdfSurface {
    pub fn new(fonts: FontFamily, page_size: PageSize) -> Result<Self> {
        let mut doc = PdfDocument::new();
        doc.register_font_family(BODY_FAMILY, fonts.clone())?;

        Ok(Self {
            doc,
            fonts,
            page_size,
            page: 0,
        })
    }

    /// Surface using the builtin Helvetica family
    pub fn with_helvetica(page_size: PageSize) -> Result<Self> {
        Self::new(helvetica(), page_size)
    }

    /// Set a document information entry (Title, Producer, CreationDate...)
    pub fn set_info(&mut self, key: &str, value: &str) {
        self.doc.set_info(key, value);
    }

    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        Ok(self.doc.to_bytes()?)
    }

    /// Write the document to `path`, failing with `OutputLocked` when the
    /// file is held by another process
    pub fn save(&mut self, path: &Path) -> Result<()> {
        Ok(self.doc.save(path)?)
    }
}

impl DrawingSurface for PdfSurface {
    fn start_page(&mut self) -> Result<usize> {
        self.page = self.doc.add_page(self.page_size)?;
        debug!(page = self.page, "started PDF page");
        Ok(self.page)
    }

    fn page_number(&self) -> usize {
        self.page
    }

    fn page_size(&self) -> PageSize {
        self.page_size
    }

    fn measure_text(&self, text: &str, style: &TextStyle) -> f64 {
        self.fonts
            .variant(style.weight)
            .text_width_points(text, style.size) as f64
    }

    fn line_metrics(&self, style: &TextStyle) -> LineMetrics {
        self.fonts.variant(style.weight).line_metrics(style.size)
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        align: Align,
        style: &TextStyle,
    ) -> Result<()> {
        let ascent = self.line_metrics(style).ascent;
        self.doc.set_font(BODY_FAMILY, style.size)?;
        self.doc.set_font_weight(style.weight)?;
        self.doc.set_text_color(style.color);
        self.doc.insert_text(text, self.page, x, y + ascent, align)?;
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<()> {
        self.doc
            .fill_rect(self.page, rect.x, rect.y, rect.width, rect.height, color)?;
        Ok(())
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f64) -> Result<()> {
        self.doc.stroke_rect(
            self.page,
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            color,
            line_width,
        )?;
        Ok(())
    }

    fn draw_line(
        &mut self,
        from: (f64, f64),
        to: (f64, f64),
        color: Color,
        line_width: f64,
    ) -> Result<()> {
        self.doc.draw_line(self.page, from, to, color, line_width)?;
        Ok(())
    }

    fn fill_circle(&mut self, center: (f64, f64), radius: f64, color: Color) -> Result<()> {
        self.doc
            .fill_circle(self.page, center.0, center.1, radius, color)?;
        Ok(())
    }

    fn fill_gradient(&mut self, rect: Rect, from: Color, to: Color) -> Result<()> {
        self.doc.fill_linear_gradient(
            self.page,
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            from,
            to,
        )?;
        Ok(())
    }

    fn draw_image(&mut self, data: &[u8], bounds: Rect) -> Result<(f64, f64)> {
        Ok(self.doc.insert_image_scaled(
            data,
            self.page,
            bounds.x,
            bounds.y,
            bounds.width,
            bounds.height,
            ImageScaleMode::FitBox,
        )?)
    }
}

/// A single line of text as placed on a page
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub page: usize,
    pub text: String,
    /// Left edge after alignment
    pub x: f64,
    /// Top of the line box
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub align: Align,
    pub style: TextStyle,
}

impl TextRun {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Operation captured by [`RecordingSurface`]
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    StartPage(usize),
    Text(TextRun),
    FillRect {
        page: usize,
        rect: Rect,
        color: Color,
    },
    StrokeRect {
        page: usize,
        rect: Rect,
        color: Color,
        line_width: f64,
    },
    Line {
        page: usize,
        from: (f64, f64),
        to: (f64, f64),
        color: Color,
        line_width: f64,
    },
    Circle {
        page: usize,
        center: (f64, f64),
        radius: f64,
        color: Color,
    },
    Gradient {
        page: usize,
        rect: Rect,
        from: Color,
        to: Color,
    },
    Image {
        page: usize,
        rect: Rect,
    },
}

/// Surface that records every operation instead of producing output
///
/// Measures text with real font metrics, so recorded positions match what
/// [`PdfSurface`] would draw with the same fonts.
pub struct RecordingSurface {
    fonts: FontFamily,
    page_size: PageSize,
    page: usize,
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    /// Recorder measuring with the builtin Helvetica family
    pub fn new(page_size: PageSize) -> Self {
        Self::with_fonts(helvetica(), page_size)
    }

    pub fn with_fonts(fonts: FontFamily, page_size: PageSize) -> Self {
        Self {
            fonts,
            page_size,
            page: 0,
            ops: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn page_count(&self) -> usize {
        self.page
    }

    pub fn texts(&self) -> impl Iterator<Item = &TextRun> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text(run) => Some(run),
            _ => None,
        })
    }

    pub fn texts_on(&self, page: usize) -> impl Iterator<Item = &TextRun> {
        self.texts().filter(move |run| run.page == page)
    }

    /// First run whose text equals `text`
    pub fn find_text(&self, text: &str) -> Option<&TextRun> {
        self.texts().find(|run| run.text == text)
    }

    fn current_page(&self) -> Result<usize> {
        if self.page == 0 {
            return Err(PdfError::InvalidPage(0, 0).into());
        }
        Ok(self.page)
    }
}

impl DrawingSurface for RecordingSurface {
    fn start_page(&mut self) -> Result<usize> {
        self.page += 1;
        self.ops.push(DrawOp::StartPage(self.page));
        Ok(self.page)
    }

    fn page_number(&self) -> usize {
        self.page
    }

    fn page_size(&self) -> PageSize {
        self.page_size
    }

    fn measure_text(&self, text: &str, style: &TextStyle) -> f64 {
        self.fonts
            .variant(style.weight)
            .text_width_points(text, style.size) as f64
    }

    fn line_metrics(&self, style: &TextStyle) -> LineMetrics {
        self.fonts.variant(style.weight).line_metrics(style.size)
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        align: Align,
        style: &TextStyle,
    ) -> Result<()> {
        let page = self.current_page()?;
        if text.is_empty() {
            return Ok(());
        }

        let width = self.measure_text(text, style);
        let height = self.line_height(style);
        self.ops.push(DrawOp::Text(TextRun {
            page,
            text: text.to_string(),
            x: x + align.offset(width),
            y,
            width,
            height,
            align,
            style: *style,
        }));
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<()> {
        let page = self.current_page()?;
        self.ops.push(DrawOp::FillRect { page, rect, color });
        Ok(())
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f64) -> Result<()> {
        let page = self.current_page()?;
        self.ops.push(DrawOp::StrokeRect {
            page,
            rect,
            color,
            line_width,
        });
        Ok(())
    }

    fn draw_line(
        &mut self,
        from: (f64, f64),
        to: (f64, f64),
        color: Color,
        line_width: f64,
    ) -> Result<()> {
        let page = self.current_page()?;
        self.ops.push(DrawOp::Line {
            page,
            from,
            to,
            color,
            line_width,
        });
        Ok(())
    }

    fn fill_circle(&mut self, center: (f64, f64), radius: f64, color: Color) -> Result<()> {
        let page = self.current_page()?;
        self.ops.push(DrawOp::Circle {
            page,
            center,
            radius,
            color,
        });
        Ok(())
    }

    fn fill_gradient(&mut self, rect: Rect, from: Color, to: Color) -> Result<()> {
        let page = self.current_page()?;
        self.ops.push(DrawOp::Gradient {
            page,
            rect,
            from,
            to,
        });
        Ok(())
    }

    fn draw_image(&mut self, data: &[u8], bounds: Rect) -> Result<(f64, f64)> {
        let page = self.current_page()?;
        let (width, height) = image_dimensions(data)?;
        let (drawn_width, drawn_height) = calculate_scaled_dimensions(
            width,
            height,
            bounds.width,
            bounds.height,
            ImageScaleMode::FitBox,
        );
        self.ops.push(DrawOp::Image {
            page,
            rect: Rect::new(bounds.x, bounds.y, drawn_width, drawn_height),
        });
        Ok((drawn_width, drawn_height))
    }
}
