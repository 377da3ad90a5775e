//! The drawing target the controller renders into

use crate::pdf::Frame;

/// Visible slice of the scrollable content, as fractions in [0, 1]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollPosition {
    pub top: f32,
    pub bottom: f32,
}

impl ScrollPosition {
    /// Content fully visible
    pub const WHOLE: Self = Self {
        top: 0.0,
        bottom: 1.0,
    };

    #[must_use]
    pub fn new(top: f32, bottom: f32) -> Self {
        let top = top.clamp(0.0, 1.0);
        Self {
            top,
            bottom: bottom.clamp(top, 1.0),
        }
    }
}

impl Default for ScrollPosition {
    fn default() -> Self {
        Self::WHOLE
    }
}

/// A scrollable canvas that shows one frame at a time
pub trait RenderSurface {
    /// Replace the displayed image. Scroll position is left alone.
    fn display_image(&mut self, frame: &Frame);

    fn reset_scroll_to_top(&mut self);

    /// Currently visible fraction of the content
    fn scroll_position(&self) -> ScrollPosition;

    /// Scroll by `lines` (negative scrolls up)
    fn scroll_by(&mut self, lines: i32);
}
