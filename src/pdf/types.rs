//! Core types for PDF rendering

use std::path::PathBuf;

/// Intrinsic page size in PDF points
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageSize {
    pub width_pt: f32,
    pub height_pt: f32,
}

impl PageSize {
    #[must_use]
    pub const fn new(width_pt: f32, height_pt: f32) -> Self {
        Self {
            width_pt,
            height_pt,
        }
    }
}

/// Axis-aligned rectangle in page space (points, origin top-left, y down)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageRect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl PageRect {
    #[must_use]
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    #[must_use]
    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).abs()
    }

    #[must_use]
    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).abs()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width() <= f32::EPSILON || self.height() <= f32::EPSILON
    }

    /// Rectangle with ordered corners
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            x0: self.x0.min(self.x1),
            y0: self.y0.min(self.y1),
            x1: self.x0.max(self.x1),
            y1: self.y0.max(self.y1),
        }
    }

    /// Scale into pixel space for a frame rendered at `scale`
    #[must_use]
    pub fn scaled(&self, scale: f32) -> Self {
        Self {
            x0: self.x0 * scale,
            y0: self.y0 * scale,
            x1: self.x1 * scale,
            y1: self.y1 * scale,
        }
    }
}

/// A highlight annotation waiting to be written on save
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Highlight {
    /// Page number (0-indexed)
    pub page: usize,
    /// Highlighted region in page space
    pub rect: PageRect,
}

/// Raw rendered page image.
///
/// RGB pixel data (3 bytes per pixel) plus the page and zoom it was produced
/// for. This is what the render surface receives.
#[derive(Clone, PartialEq)]
pub struct Frame {
    /// Raw RGB pixel data (3 bytes per pixel: R, G, B)
    pub pixels: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Page number (0-indexed)
    pub page: usize,
    /// Zoom factor used for rendering
    pub zoom: f32,
}

impl Frame {
    /// Blank white frame
    #[must_use]
    pub fn blank(width: u32, height: u32, page: usize, zoom: f32) -> Self {
        Self {
            pixels: vec![0xFF; width as usize * height as usize * 3],
            width,
            height,
            page,
            zoom,
        }
    }

    /// Bytes per row
    #[must_use]
    pub fn stride(&self) -> usize {
        self.width as usize * 3
    }

    /// RGB value at the given pixel, if in bounds
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y as usize * self.stride() + x as usize * 3;
        self.pixels
            .get(idx..idx + 3)
            .map(|px| [px[0], px[1], px[2]])
    }

    /// Copy into an `image` buffer for resampling
    #[must_use]
    pub fn to_rgb_image(&self) -> Option<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.pixels.clone())
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("page", &self.page)
            .field("zoom", &self.zoom)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pixels_len", &self.pixels.len())
            .finish_non_exhaustive()
    }
}

/// Metadata of an opened document
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentMeta {
    pub path: PathBuf,
    pub page_count: usize,
    pub page_sizes: Vec<PageSize>,
}

impl DocumentMeta {
    #[must_use]
    pub fn page_size(&self, page: usize) -> Option<PageSize> {
        self.page_sizes.get(page).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_orders_corners() {
        let rect = PageRect::new(10.0, 20.0, 2.0, 4.0).normalized();
        assert_eq!(rect, PageRect::new(2.0, 4.0, 10.0, 20.0));
    }

    #[test]
    fn pixel_out_of_bounds_is_none() {
        let frame = Frame::blank(2, 2, 0, 1.0);
        assert_eq!(frame.pixel(1, 1), Some([0xFF, 0xFF, 0xFF]));
        assert_eq!(frame.pixel(2, 0), None);
    }

    #[test]
    fn frame_converts_to_rgb_image() {
        let frame = Frame::blank(4, 3, 0, 1.0);
        let img = frame.to_rgb_image().unwrap();
        assert_eq!(img.dimensions(), (4, 3));
    }
}
