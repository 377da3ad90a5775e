//! Terminal implementation of the render surface
//!
//! Frames are drawn with upper half blocks: every cell shows two stacked
//! pixels, the top one as foreground and the bottom one as background.

use image::imageops::{self, FilterType};
use image::RgbImage;
use log::warn;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::widgets::Widget;

use crate::pdf::Frame;
use crate::viewer::{RenderSurface, ScrollPosition};

const HALF_BLOCK: &str = "▀";

/// Frame pixels covered by one terminal cell
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellSize {
    pub width: u16,
    pub height: u16,
}

impl Default for CellSize {
    fn default() -> Self {
        Self {
            width: 8,
            height: 16,
        }
    }
}

/// A scrollable page canvas
#[derive(Debug)]
pub struct TerminalSurface {
    cell: CellSize,
    /// Downsampled frame, one pixel per half cell
    image: Option<RgbImage>,
    page: Option<usize>,
    scroll_rows: u16,
    viewport: Rect,
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self::new(CellSize::default())
    }
}

impl TerminalSurface {
    #[must_use]
    pub fn new(cell: CellSize) -> Self {
        Self {
            cell,
            image: None,
            page: None,
            scroll_rows: 0,
            viewport: Rect::default(),
        }
    }

    /// Remember the area the canvas is drawn into
    pub fn set_viewport(&mut self, area: Rect) {
        self.viewport = area;
        self.scroll_rows = self.scroll_rows.min(self.max_scroll());
    }

    #[must_use]
    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Viewport height in frame pixels, for fit-to-height
    #[must_use]
    pub fn viewport_height_px(&self) -> u32 {
        u32::from(self.viewport.height) * u32::from(self.cell.height)
    }

    /// Page of the frame on display
    #[must_use]
    pub fn page(&self) -> Option<usize> {
        self.page
    }

    #[must_use]
    pub fn scroll_rows(&self) -> u16 {
        self.scroll_rows
    }

    /// Cells needed to show the whole frame as (columns, rows)
    #[must_use]
    pub fn content_size(&self) -> (u16, u16) {
        self.image.as_ref().map_or((0, 0), |img| {
            let cols = u16::try_from(img.width()).unwrap_or(u16::MAX);
            let rows = u16::try_from(img.height().div_ceil(2)).unwrap_or(u16::MAX);
            (cols, rows)
        })
    }

    fn max_scroll(&self) -> u16 {
        let (_, rows) = self.content_size();
        rows.saturating_sub(self.viewport.height)
    }

    fn downsample(&self, frame: &Frame) -> Option<RgbImage> {
        let source = frame.to_rgb_image()?;
        let half_cell = u32::from((self.cell.height / 2).max(1));
        let width = frame.width.div_ceil(u32::from(self.cell.width.max(1))).max(1);
        let height = frame.height.div_ceil(half_cell).max(1);
        Some(imageops::resize(&source, width, height, FilterType::Triangle))
    }
}

impl RenderSurface for TerminalSurface {
    fn display_image(&mut self, frame: &Frame) {
        match self.downsample(frame) {
            Some(image) => {
                self.image = Some(image);
                self.page = Some(frame.page);
                self.scroll_rows = self.scroll_rows.min(self.max_scroll());
            }
            None => warn!("Frame for page {} has an inconsistent buffer", frame.page),
        }
    }

    fn reset_scroll_to_top(&mut self) {
        self.scroll_rows = 0;
    }

    fn scroll_position(&self) -> ScrollPosition {
        let (_, rows) = self.content_size();
        if rows == 0 || rows <= self.viewport.height {
            return ScrollPosition::WHOLE;
        }
        let rows = f32::from(rows);
        let top = f32::from(self.scroll_rows);
        let bottom = top + f32::from(self.viewport.height);
        ScrollPosition::new(top / rows, bottom / rows)
    }

    fn scroll_by(&mut self, lines: i32) {
        let target = i32::from(self.scroll_rows).saturating_add(lines);
        let clamped = target.clamp(0, i32::from(self.max_scroll()));
        self.scroll_rows = u16::try_from(clamped).unwrap_or(0);
    }
}

impl Widget for &TerminalSurface {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(image) = self.image.as_ref() else {
            return;
        };

        let (cols, _) = self.content_size();
        // Center narrow pages, crop wide ones from the left
        let x_offset = area.width.saturating_sub(cols) / 2;

        for row in 0..area.height {
            let top_y = (u32::from(self.scroll_rows) + u32::from(row)) * 2;
            if top_y >= image.height() {
                break;
            }
            let bottom_y = top_y + 1;

            for col in 0..area.width.saturating_sub(x_offset) {
                let x = u32::from(col);
                if x >= image.width() {
                    break;
                }
                let top = image.get_pixel(x, top_y).0;
                let bottom = if bottom_y < image.height() {
                    image.get_pixel(x, bottom_y).0
                } else {
                    [0, 0, 0]
                };

                if let Some(cell) = buf.cell_mut((area.x + x_offset + col, area.y + row)) {
                    cell.set_symbol(HALF_BLOCK)
                        .set_fg(Color::Rgb(top[0], top[1], top[2]))
                        .set_bg(Color::Rgb(bottom[0], bottom[1], bottom[2]));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface_with_page(rows: u16) -> TerminalSurface {
        let mut surface = TerminalSurface::new(CellSize {
            width: 1,
            height: 2,
        });
        surface.set_viewport(Rect::new(0, 0, 10, 4));
        // Two frame pixel rows per cell row
        surface.display_image(&Frame::blank(10, u32::from(rows) * 2, 0, 1.0));
        surface
    }

    #[test]
    fn scroll_is_clamped_to_content() {
        let mut surface = surface_with_page(10);
        assert_eq!(surface.content_size(), (10, 10));

        surface.scroll_by(100);
        assert_eq!(surface.scroll_rows(), 6);
        assert_eq!(surface.scroll_position().bottom, 1.0);

        surface.scroll_by(-3);
        assert_eq!(surface.scroll_rows(), 3);
        assert_eq!(surface.scroll_position(), ScrollPosition::new(0.3, 0.7));

        surface.reset_scroll_to_top();
        assert_eq!(surface.scroll_position().top, 0.0);
    }

    #[test]
    fn short_page_is_fully_visible() {
        let surface = surface_with_page(2);
        assert_eq!(surface.scroll_position(), ScrollPosition::WHOLE);
    }

    #[test]
    fn renders_half_blocks() {
        let mut surface = surface_with_page(4);
        surface.set_viewport(Rect::new(0, 0, 10, 4));
        let mut buf = Buffer::empty(Rect::new(0, 0, 10, 4));

        (&surface).render(Rect::new(0, 0, 10, 4), &mut buf);

        let cell = &buf[(0, 0)];
        assert_eq!(cell.symbol(), HALF_BLOCK);
        assert_eq!(cell.fg, Color::Rgb(255, 255, 255));
    }

    #[test]
    fn viewport_height_in_pixels() {
        let mut surface = TerminalSurface::default();
        surface.set_viewport(Rect::new(0, 0, 80, 30));
        assert_eq!(surface.viewport_height_px(), 480);
    }
}
