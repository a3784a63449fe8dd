//! Quote document layout

use crate::config::{FontConfig, QuoteConfig};
use crate::decorator::PageDecorator;
use crate::record::QuoteRecord;
use crate::surface::{helvetica, DrawingSurface, PdfSurface, Rect, TextStyle};
use crate::table;
use crate::{QuoteError, Result};
use chrono::{Local, NaiveDate};
use pdf_core::{image_dimensions, Align, FontFamily, FontFamilyBuilder};
use ptbr_text::{format_currency, format_date_br};
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Renders quote records into PDF documents
///
/// Fonts and the logo are loaded once at construction and shared read-only,
/// so a renderer can serve any number of documents from any thread.
pub struct QuoteRenderer {
    config: Arc<QuoteConfig>,
    fonts: FontFamily,
    decorator: PageDecorator,
}

impl QuoteRenderer {
    /// Create a renderer, loading configured fonts and the logo
    ///
    /// A font that is configured but unreadable fails with `AssetMissing`.
    /// A missing or undecodable logo only drops it from the header.
    pub fn new(config: QuoteConfig) -> Result<Self> {
        let fonts = load_fonts(&config.fonts)?;
        let logo = config.branding.logo_path.as_deref().and_then(load_logo);
        let config = Arc::new(config);
        let decorator = PageDecorator::new(Arc::clone(&config), logo);

        Ok(Self {
            config,
            fonts,
            decorator,
        })
    }

    pub fn config(&self) -> &QuoteConfig {
        &self.config
    }

    /// Render `record` and write the finished PDF to `output_path`
    ///
    /// Returns once the file has been flushed to disk. A destination held by
    /// another process fails with `OutputLocked`.
    pub fn generate_document<P: AsRef<Path>>(
        &self,
        record: &QuoteRecord,
        output_path: P,
    ) -> Result<()> {
        let path = output_path.as_ref();
        let (mut surface, pages) = self.render_pdf(record)?;
        surface.save(path)?;

        info!(
            path = %path.display(),
            order_id = record.order_id.as_deref().unwrap_or_default(),
            pages,
            "quote written"
        );
        Ok(())
    }

    /// Render `record` to PDF bytes without touching the filesystem
    pub fn render_to_bytes(&self, record: &QuoteRecord) -> Result<Vec<u8>> {
        let (mut surface, _) = self.render_pdf(record)?;
        surface.to_bytes()
    }

    /// Lay out `record` on any drawing surface; returns the number of pages
    ///
    /// The surface must not have pages yet.
    pub fn render_into<S: DrawingSurface + ?Sized>(
        &self,
        surface: &mut S,
        record: &QuoteRecord,
        issue_date: NaiveDate,
    ) -> Result<usize> {
        let mut layout = Layout {
            config: &self.config,
            decorator: &self.decorator,
            surface,
            y: self.config.page.content_top,
        };

        layout.start_page()?;
        layout.first_page(record, issue_date)?;
        layout.terms_page()?;

        Ok(layout.surface.page_number())
    }

    fn render_pdf(&self, record: &QuoteRecord) -> Result<(PdfSurface, usize)> {
        let mut surface = PdfSurface::new(self.fonts.clone(), self.config.page.size())?;
        let now = Local::now();
        let pages = self.render_into(&mut surface, record, now.date_naive())?;

        let order_id = non_blank(&record.order_id).unwrap_or(&self.config.labels.placeholder);
        surface.set_info("Title", &format!("Orçamento O.S. {order_id}"));
        surface.set_info("Producer", "orcamento");
        surface.set_info("CreationDate", &now.format("D:%Y%m%d%H%M%S").to_string());

        Ok((surface, pages))
    }
}

/// Layout cursor over one document being rendered
struct Layout<'a, S: DrawingSurface + ?Sized> {
    config: &'a QuoteConfig,
    decorator: &'a PageDecorator,
    surface: &'a mut S,
    /// Top of the next content block
    y: f64,
}

impl<S: DrawingSurface + ?Sized> Layout<'_, S> {
    /// Start a decorated page and move the cursor to the content top
    fn start_page(&mut self) -> Result<()> {
        self.surface.start_page()?;
        self.decorator.decorate(&mut *self.surface)?;
        self.y = self.config.page.content_top;
        Ok(())
    }

    fn first_page(&mut self, record: &QuoteRecord, issue_date: NaiveDate) -> Result<()> {
        let config = self.config;
        let page = &config.page;
        let layout = &config.layout;
        let labels = &config.labels;

        let left_bottom = self.left_column(record)?;

        let right_x = page.width / 2.0 + layout.right_column_offset;
        let right_width = page.right_edge() - right_x;
        let heading = self.heading_style();
        let body = self.body_style();
        let order_id = non_blank(&record.order_id).unwrap_or(&labels.placeholder);
        let date = format_date_br(issue_date);

        let rows = [
            (&labels.order_number, order_id),
            (&labels.issue_date, date.as_str()),
        ];

        let mut y = page.content_top;
        for (label, value) in rows {
            self.surface
                .draw_text_block(label, right_x, y, right_width, Align::Left, &heading)?;
            self.surface.draw_text_block(
                value,
                right_x,
                y + layout.heading_gap,
                right_width,
                Align::Left,
                &body,
            )?;
            y += layout.right_row_gap;
        }

        let right_bottom = page.content_top + layout.right_column_height;
        self.y = left_bottom.max(right_bottom) + layout.section_gap;

        self.tables(record)?;
        self.payment_summary(record)
    }

    /// Defect and cause blocks; returns the bottom of the column
    fn left_column(&mut self, record: &QuoteRecord) -> Result<f64> {
        let config = self.config;
        let page = &config.page;
        let layout = &config.layout;
        let labels = &config.labels;

        let x = page.margin;
        let width = page.width / 2.0 - layout.left_column_inset;
        let heading = self.heading_style();
        let body = self.body_style();

        let blocks = [
            (&labels.defect_heading, &record.defect_description),
            (&labels.cause_heading, &record.cause_description),
        ];

        let mut y = page.content_top;
        for (i, (title, text)) in blocks.into_iter().enumerate() {
            if i > 0 {
                y += layout.block_gap;
            }
            let title_height = self
                .surface
                .draw_text_block(title, x, y, width, Align::Left, &heading)?;
            y += title_height.max(layout.heading_gap);

            let text = non_blank(text).unwrap_or(&labels.placeholder);
            y += self
                .surface
                .draw_text_block(text, x, y, width, Align::Left, &body)?;
        }

        Ok(y)
    }

    /// Parts and labor tables, moved together to a new page when the
    /// estimate does not fit
    ///
    /// The estimate assumes single-line rows; long descriptions can still
    /// run past the bottom margin.
    fn tables(&mut self, record: &QuoteRecord) -> Result<()> {
        let config = self.config;
        let layout = &config.layout;
        let labels = &config.labels;

        let tables = [
            (&labels.parts_title, table::rows_for(&record.parts, &config.currency_symbol)),
            (&labels.labor_title, table::rows_for(&record.labor, &config.currency_symbol)),
        ];

        let row_count: usize = tables.iter().map(|(_, rows)| rows.len()).sum();
        let estimate =
            row_count as f64 * layout.table_row_estimate + layout.table_overhead_estimate;
        if self.y + estimate > config.page.height - layout.table_bottom_reserve {
            debug!(
                y = self.y,
                estimate, "tables do not fit, continuing on a new page"
            );
            self.start_page()?;
        }

        for (title, rows) in &tables {
            if rows.is_empty() {
                continue;
            }
            self.y = table::draw_table(&mut *self.surface, config, title, rows, self.y)?;
        }

        Ok(())
    }

    fn payment_summary(&mut self, record: &QuoteRecord) -> Result<()> {
        let config = self.config;
        let layout = &config.layout;
        let labels = &config.labels;
        let palette = &config.palette;

        if self.y > layout.payment_break_y {
            self.start_page()?;
        }

        let x = config.page.right_edge() - layout.payment_width;
        let right = x + layout.payment_width;
        let top = self.y + layout.payment_offset;
        let mut y = top;

        let title = TextStyle::bold(layout.payment_title_size, palette.text_dark);
        self.surface
            .draw_text(&labels.summary_title, x, y, Align::Left, &title)?;
        y += layout.payment_row_gap;

        self.surface
            .draw_line((x, y), (right, y), palette.brand, 1.0)?;
        y += layout.payment_padding;

        let value = TextStyle::bold(layout.payment_value_size, palette.text_dark);
        let note = TextStyle::regular(layout.payment_note_size, palette.text_dark);
        let card_total = format_currency(&config.currency_symbol, record.card_total());
        let cash_total = format_currency(&config.currency_symbol, record.cash_total);

        self.surface
            .draw_text(&labels.card_total, x, y, Align::Left, &value)?;
        self.surface
            .draw_text(&card_total, right, y, Align::Right, &value)?;
        self.surface.draw_text(
            &labels.installments_text(record.installments),
            right,
            y + layout.payment_note_offset,
            Align::Right,
            &note,
        )?;
        y += layout.payment_row_gap;

        self.surface
            .draw_text(&labels.cash_total, x, y, Align::Left, &value)?;
        self.surface
            .draw_text(&cash_total, right, y, Align::Right, &value)?;
        y += layout.payment_row_gap;

        let border_top = top - layout.payment_padding;
        let bottom = y + layout.payment_box_tail;
        self.surface.stroke_rect(
            Rect::new(
                x - layout.payment_padding,
                border_top,
                layout.payment_width + 2.0 * layout.payment_padding,
                bottom - border_top,
            ),
            palette.brand,
            1.0,
        )?;

        self.y = bottom;
        Ok(())
    }

    /// Fresh page listing the shop's notes and turnaround times
    fn terms_page(&mut self) -> Result<()> {
        let config = self.config;
        let page = &config.page;
        let layout = &config.layout;

        self.start_page()?;

        let title = TextStyle::bold(layout.terms_title_size, config.palette.text_dark);
        self.surface.draw_text_block(
            &config.labels.terms_title,
            page.margin,
            self.y,
            page.printable_width(),
            Align::Left,
            &title,
        )?;
        self.y += self.surface.line_height(&title) * layout.terms_title_spacing;

        let body = self.body_style();
        let ascent = self.surface.line_metrics(&body).ascent;
        let text_x = page.margin + layout.bullet_indent;
        let text_width = page.printable_width() - layout.bullet_indent;
        let limit = page.height - page.bottom_margin;

        for term in &config.terms {
            let height = self.surface.text_height(term, text_width, &body);
            if self.y + height > limit {
                self.start_page()?;
            }

            self.surface.fill_circle(
                (page.margin + layout.bullet_radius, self.y + ascent / 2.0),
                layout.bullet_radius,
                config.palette.text_dark,
            )?;
            self.surface
                .draw_text_block(term, text_x, self.y, text_width, Align::Left, &body)?;
            self.y += height + layout.bullet_gap;
        }

        Ok(())
    }

    fn heading_style(&self) -> TextStyle {
        TextStyle::bold(self.config.layout.heading_size, self.config.palette.text_dark)
    }

    fn body_style(&self) -> TextStyle {
        TextStyle::regular(self.config.layout.body_size, self.config.palette.text_dark)
    }
}

/// Trimmed text, or `None` when absent or blank
fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn load_fonts(config: &FontConfig) -> Result<FontFamily> {
    let Some(regular_path) = &config.regular else {
        return Ok(helvetica());
    };

    let mut builder = FontFamilyBuilder::new().regular(read_asset(regular_path)?);
    if let Some(bold_path) = &config.bold {
        builder = builder.bold(read_asset(bold_path)?);
    }

    let family = builder
        .build("body")
        .map_err(|e| QuoteError::AssetMissing {
            path: regular_path.clone(),
            reason: e.to_string(),
        })?;
    debug!(path = %regular_path.display(), "loaded TrueType fonts");
    Ok(family)
}

fn read_asset(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| QuoteError::AssetMissing {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Logo bytes when the file exists and decodes as PNG or JPEG
fn load_logo(path: &Path) -> Option<Arc<[u8]>> {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no logo, header drawn without it");
            return None;
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "logo unreadable, header drawn without it");
            return None;
        }
    };

    match image_dimensions(&data) {
        Ok((width, height)) => {
            debug!(path = %path.display(), width, height, "loaded logo");
            Some(data.into())
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "logo is not a PNG or JPEG, header drawn without it");
            None
        }
    }
}
