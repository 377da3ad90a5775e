//! Painting pending highlights onto rendered frames

use super::types::{Frame, PageRect};

/// Colour and strength of the highlight marker
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HighlightStyle {
    pub color: [u8; 3],
    /// Blend strength in [0, 1]
    pub opacity: f32,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self {
            color: [0xFF, 0xE6, 0x00],
            opacity: 0.4,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PixelRect {
    x0: usize,
    y0: usize,
    x1: usize,
    y1: usize,
}

fn to_pixel_rect(rect: &PageRect, scale: f32, width: u32, height: u32) -> Option<PixelRect> {
    let scaled = rect.normalized().scaled(scale);
    let max_x = width as f32;
    let max_y = height as f32;

    if scaled.x1 <= 0.0 || scaled.y1 <= 0.0 || scaled.x0 >= max_x || scaled.y0 >= max_y {
        return None;
    }

    let x0 = scaled.x0.floor().max(0.0) as usize;
    let y0 = scaled.y0.floor().max(0.0) as usize;
    let x1 = scaled.x1.ceil().min(max_x) as usize;
    let y1 = scaled.y1.ceil().min(max_y) as usize;

    if x0 >= x1 || y0 >= y1 {
        None
    } else {
        Some(PixelRect { x0, y0, x1, y1 })
    }
}

/// Multiply-blend `style.color` over every rect (given in page space)
pub fn paint_highlights(frame: &mut Frame, rects: &[PageRect], style: &HighlightStyle) {
    if rects.is_empty() || frame.pixels.is_empty() {
        return;
    }

    let alpha = style.opacity.clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }

    let stride = frame.stride();
    let (width, height, zoom) = (frame.width, frame.height, frame.zoom);

    for rect in rects {
        let Some(px_rect) = to_pixel_rect(rect, zoom, width, height) else {
            continue;
        };

        for y in px_rect.y0..px_rect.y1 {
            let start = y * stride + px_rect.x0 * 3;
            let end = y * stride + px_rect.x1 * 3;
            let Some(row) = frame.pixels.get_mut(start..end) else {
                continue;
            };
            for px in row.chunks_exact_mut(3) {
                for (channel, tint) in px.iter_mut().zip(style.color) {
                    let multiplied = f32::from(*channel) * f32::from(tint) / 255.0;
                    let blended = f32::from(*channel) * (1.0 - alpha) + multiplied * alpha;
                    *channel = blended.round().clamp(0.0, 255.0) as u8;
                }
            }
        }
    }
}
