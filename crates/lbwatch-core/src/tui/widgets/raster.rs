//! Blits a pixel [`Raster`] into terminal cells.
//!
//! Each cell shows two vertically stacked pixels using the upper half block:
//! the foreground paints the top pixel, the background the bottom one.

use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use ratatui::style::Color;
use ratatui::widgets::Widget;

use crate::render::{Raster, Rgba};
use crate::tui::style::Palette;

const HALF_BLOCK: &str = "▀";

pub struct RasterView<'a> {
    raster: &'a Raster,
    backdrop: Rgba,
}

impl<'a> RasterView<'a> {
    pub fn new(raster: &'a Raster) -> Self {
        Self {
            raster,
            backdrop: Palette::canvas(),
        }
    }

    /// Cells (columns, rows) needed to show a `width` × `height` pixel raster.
    pub fn cell_size(width: u32, height: u32) -> (u16, u16) {
        let cols = u16::try_from(width).unwrap_or(u16::MAX);
        let rows = u16::try_from(height.div_ceil(2)).unwrap_or(u16::MAX);
        (cols, rows)
    }
}

impl Widget for RasterView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = area.intersection(buf.area);
        for row in 0..area.height {
            for col in 0..area.width {
                let x = u32::from(col);
                let y = u32::from(row) * 2;
                let top = self.raster.pixel(x, y).over(self.backdrop);
                let bottom = self.raster.pixel(x, y + 1).over(self.backdrop);
                if let Some(cell) = buf.cell_mut(Position::new(area.x + col, area.y + row)) {
                    cell.set_symbol(HALF_BLOCK)
                        .set_fg(to_color(top))
                        .set_bg(to_color(bottom));
                }
            }
        }
    }
}

fn to_color(color: Rgba) -> Color {
    let (r, g, b) = color.to_rgb8();
    Color::Rgb(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Fill, Path, Point, Surface};

    #[test]
    fn test_half_block_maps_two_pixels_per_cell() {
        let mut raster = Raster::new(2, 2);
        // Top-left pixel only.
        raster.fill_path(
            &Path::closed(vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(1.0, 1.0),
                Point::new(0.0, 1.0),
            ]),
            &Fill::Solid(Rgba::from_rgb8(255, 0, 0)),
        );

        let area = Rect::new(0, 0, 2, 1);
        let mut buf = Buffer::empty(area);
        RasterView::new(&raster).render(area, &mut buf);

        let (br, bg, bb) = Palette::canvas().to_rgb8();
        let backdrop = Color::Rgb(br, bg, bb);

        let lit = buf.cell(Position::new(0, 0)).unwrap();
        assert_eq!(lit.symbol(), HALF_BLOCK);
        assert_eq!(lit.fg, Color::Rgb(255, 0, 0));
        assert_eq!(lit.bg, backdrop);

        let dark = buf.cell(Position::new(1, 0)).unwrap();
        assert_eq!(dark.fg, backdrop);
        assert_eq!(dark.bg, backdrop);
    }

    #[test]
    fn test_cell_size_rounds_rows_up() {
        assert_eq!(RasterView::cell_size(40, 21), (40, 11));
        assert_eq!(RasterView::cell_size(40, 20), (40, 10));
    }

    #[test]
    fn test_render_clips_to_buffer() {
        let raster = Raster::new(10, 10);
        let mut buf = Buffer::empty(Rect::new(0, 0, 3, 2));
        RasterView::new(&raster).render(Rect::new(1, 1, 10, 10), &mut buf);
        assert_eq!(buf.cell(Position::new(0, 0)).unwrap().symbol(), " ");
        assert_eq!(buf.cell(Position::new(2, 1)).unwrap().symbol(), HALF_BLOCK);
    }
}
