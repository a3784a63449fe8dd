//! Itemized tables of parts and labor

use crate::config::QuoteConfig;
use crate::record::LineItem;
use crate::surface::{DrawingSurface, Rect, TextStyle};
use crate::Result;
use pdf_core::{Align, Color};
use ptbr_text::format_currency;

/// Cells of one table row: quantity, description, unit price, line total
pub(crate) type Row = [String; 4];

/// Rows for `items`; every line has quantity 1
pub(crate) fn rows_for(items: &[LineItem], currency_symbol: &str) -> Vec<Row> {
    items
        .iter()
        .map(|item| {
            let price = format_currency(currency_symbol, item.unit_price);
            ["1".to_string(), item.description.clone(), price.clone(), price]
        })
        .collect()
}

/// Width available to the description text of a row
pub(crate) fn description_width(config: &QuoteConfig) -> f64 {
    config.layout.column_widths[1] - 2.0 * config.layout.cell_padding
}

/// Draw a titled table with its top edge at `y`; returns the y below it
///
/// The table is drawn as one piece; callers decide beforehand whether it
/// needs a fresh page.
pub(crate) fn draw_table<S: DrawingSurface + ?Sized>(
    surface: &mut S,
    config: &QuoteConfig,
    title: &str,
    rows: &[Row],
    y: f64,
) -> Result<f64> {
    let layout = &config.layout;
    let palette = &config.palette;
    let x = config.page.margin;
    let width = layout.table_width();

    let title_style = TextStyle::bold(layout.table_title_size, palette.text_dark);
    let title_y = y + layout.table_spacing;
    surface.draw_text(title, x, title_y, Align::Left, &title_style)?;
    let mut ty = title_y + surface.line_height(&title_style) + layout.table_title_gap;

    surface.fill_rect(Rect::new(x, ty, width, layout.header_height), palette.brand)?;
    let header_style = TextStyle::bold(layout.body_size, Color::white());
    let mut cx = x;
    for (header, column_width) in config.labels.table_headers.iter().zip(layout.column_widths) {
        surface.draw_text(
            header,
            cx + layout.cell_padding,
            ty + layout.cell_text_offset,
            Align::Left,
            &header_style,
        )?;
        cx += column_width;
    }
    ty += layout.header_height;

    let cell_style = TextStyle::regular(layout.body_size, palette.text_dark);
    let text_width = description_width(config);
    for (i, row) in rows.iter().enumerate() {
        let row_height = layout
            .min_row_height
            .max(surface.text_height(&row[1], text_width, &cell_style) + layout.row_padding);
        let shade = if i % 2 == 1 {
            palette.row_shade
        } else {
            Color::white()
        };
        surface.fill_rect(Rect::new(x, ty, width, row_height), shade)?;

        let mut cx = x;
        for (j, (cell, column_width)) in row.iter().zip(layout.column_widths).enumerate() {
            let align = if j > 1 { Align::Right } else { Align::Left };
            surface.draw_text_block(
                cell,
                cx + layout.cell_padding,
                ty + layout.cell_text_offset,
                column_width - 2.0 * layout.cell_padding,
                align,
                &cell_style,
            )?;
            cx += column_width;
        }

        let bottom = ty + row_height;
        surface.draw_line((x, bottom), (x + width, bottom), palette.border, 1.0)?;
        ty = bottom;
    }

    Ok(ty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawOp, RecordingSurface};
    use pretty_assertions::assert_eq;

    fn drawn(rows: &[Row]) -> (RecordingSurface, f64) {
        let config = QuoteConfig::default();
        let mut surface = RecordingSurface::new(config.page.size());
        surface.start_page().unwrap();
        let bottom = draw_table(&mut surface, &config, "Peças", rows, 200.0).unwrap();
        (surface, bottom)
    }

    fn row_fills(surface: &RecordingSurface) -> Vec<(Rect, Color)> {
        surface
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::FillRect { rect, color, .. } => Some((*rect, *color)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_rows_for_formats_prices() {
        let rows = rows_for(&[LineItem::new("Tela", 350.0)], "R$");
        assert_eq!(
            rows,
            vec![["1", "Tela", "R$ 350.00", "R$ 350.00"].map(String::from)]
        );
    }

    #[test]
    fn test_header_band_and_labels() {
        let config = QuoteConfig::default();
        let (surface, _) = drawn(&[]);

        let fills = row_fills(&surface);
        assert_eq!(fills.len(), 1);
        let (band, color) = fills[0];
        assert_eq!(color, config.palette.brand);
        assert_eq!(band.width, 512.0);
        assert_eq!(band.height, 25.0);

        let qtd = surface.find_text("QTD").unwrap();
        assert_eq!(qtd.x, 50.0);
        assert_eq!(qtd.y, band.y + 8.0);
        assert_eq!(qtd.style.color, Color::white());
        let total = surface.find_text("TOTAL").unwrap();
        assert_eq!(total.x, 40.0 + 40.0 + 312.0 + 80.0 + 10.0);
    }

    #[test]
    fn test_rows_alternate_shading() {
        let config = QuoteConfig::default();
        let rows = rows_for(
            &[
                LineItem::new("Tela", 350.0),
                LineItem::new("Bateria", 120.0),
                LineItem::new("Cabo", 20.0),
            ],
            "R$",
        );
        let (surface, bottom) = drawn(&rows);

        let colors: Vec<Color> = row_fills(&surface).into_iter().skip(1).map(|f| f.1).collect();
        assert_eq!(
            colors,
            vec![Color::white(), config.palette.row_shade, Color::white()]
        );

        let fills = row_fills(&surface);
        assert_eq!(bottom, fills[3].0.bottom());
        assert!(fills[1..].iter().all(|(rect, _)| rect.height == 25.0));
    }

    #[test]
    fn test_prices_are_right_aligned() {
        let rows = rows_for(&[LineItem::new("Tela", 350.0)], "R$");
        let (surface, _) = drawn(&rows);

        let prices: Vec<_> = surface
            .texts()
            .filter(|run| run.text == "R$ 350.00")
            .collect();
        assert_eq!(prices.len(), 2);
        assert!((prices[0].right() - (40.0 + 40.0 + 312.0 + 80.0 - 10.0)).abs() < 1e-9);
        assert!((prices[1].right() - (40.0 + 512.0 - 10.0)).abs() < 1e-9);
    }

    #[test]
    fn test_long_description_grows_row() {
        let config = QuoteConfig::default();
        let description = "Substituição completa do conjunto de tela com moldura, \
                           vidro frontal, sensor de toque e cabo flex original";
        let rows = rows_for(&[LineItem::new(description, 900.0)], "R$");
        let (surface, bottom) = drawn(&rows);

        let style = TextStyle::regular(10.0, config.palette.text_dark);
        let text_height = surface.text_height(description, 292.0, &style);
        assert!(text_height > surface.line_height(&style));

        let row = row_fills(&surface)[1].0;
        assert_eq!(row.height, text_height + 12.0);
        assert_eq!(bottom, row.bottom());
    }
}
