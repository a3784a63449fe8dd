//! Header and footer drawn on every page

use crate::config::QuoteConfig;
use crate::surface::{DrawingSurface, Rect, TextStyle};
use crate::Result;
use pdf_core::Align;
use std::sync::Arc;
use tracing::warn;

/// Draws the shop header and the footer of a freshly started page
///
/// Holds no per-page state: the page number is read from the surface, so one
/// decorator serves every page of every document.
#[derive(Debug, Clone)]
pub struct PageDecorator {
    config: Arc<QuoteConfig>,
    logo: Option<Arc<[u8]>>,
}

impl PageDecorator {
    /// `logo` holds the encoded image (PNG or JPEG) when one is available
    pub fn new(config: Arc<QuoteConfig>, logo: Option<Arc<[u8]>>) -> Self {
        Self { config, logo }
    }

    pub fn has_logo(&self) -> bool {
        self.logo.is_some()
    }

    /// Decorate the current page of `surface`
    ///
    /// Only touches the band above the content top and the band below the
    /// bottom margin.
    pub fn decorate<S: DrawingSurface + ?Sized>(&self, surface: &mut S) -> Result<()> {
        self.draw_header(surface)?;
        self.draw_footer(surface)
    }

    fn draw_header<S: DrawingSurface + ?Sized>(&self, surface: &mut S) -> Result<()> {
        let page = &self.config.page;
        let layout = &self.config.layout;
        let branding = &self.config.branding;
        let palette = &self.config.palette;

        if let Some(logo) = &self.logo {
            let bounds = Rect::new(
                page.margin,
                layout.logo_y,
                branding.logo_width,
                branding.logo_max_height,
            );
            if let Err(e) = surface.draw_image(logo, bounds) {
                warn!(error = %e, "skipping logo that could not be drawn");
            }
        }

        let text_width = page.right_edge() - layout.header_text_x;
        let mut y = layout.header_text_y;

        y += surface.draw_text_block(
            &branding.business_name,
            layout.header_text_x,
            y,
            text_width,
            Align::Right,
            &TextStyle::bold(layout.business_name_size, palette.text_dark),
        )?;

        let contact_style = TextStyle::regular(layout.contact_size, palette.text_medium);
        for line in &branding.contact_lines {
            y += surface.draw_text_block(
                line,
                layout.header_text_x,
                y,
                text_width,
                Align::Right,
                &contact_style,
            )?;
        }

        surface.fill_gradient(
            Rect::new(
                page.margin,
                layout.accent_bar_y,
                page.printable_width(),
                layout.accent_bar_height,
            ),
            palette.brand,
            palette.brand_light,
        )
    }

    fn draw_footer<S: DrawingSurface + ?Sized>(&self, surface: &mut S) -> Result<()> {
        let page = &self.config.page;
        let layout = &self.config.layout;
        let branding = &self.config.branding;
        let palette = &self.config.palette;

        let rule_y = page.height - page.bottom_margin;
        surface.draw_line(
            (page.margin, rule_y),
            (page.right_edge(), rule_y),
            palette.border,
            1.0,
        )?;

        let style = TextStyle::regular(layout.footer_size, palette.footer_text);
        let text_y = rule_y + layout.footer_text_gap;
        surface.draw_text(
            &branding.validity_notice,
            page.margin + page.printable_width() / 2.0,
            text_y,
            Align::Center,
            &style,
        )?;

        let label = format!("{} {}", branding.page_label, surface.page_number());
        surface.draw_text(&label, page.right_edge(), text_y, Align::Right, &style)
    }
}

impl Default for PageDecorator {
    fn default() -> Self {
        Self::new(Arc::new(QuoteConfig::default()), None)
    }
}
