//! Tunables of the page-view controller

use crate::pdf::{HighlightStyle, Zoom, ZoomBounds};

/// Controller configuration, usually built from the user settings
#[derive(Clone, Debug, PartialEq)]
pub struct ViewerConfig {
    /// Zoom factor of a fresh viewer
    pub initial_zoom: f32,
    /// Keyboard zoom multipliers
    pub zoom_in_step: f32,
    pub zoom_out_step: f32,
    /// Ctrl+wheel zoom multipliers
    pub wheel_zoom_in: f32,
    pub wheel_zoom_out: f32,
    pub zoom_bounds: ZoomBounds,
    /// Turn pages when scrolling past the top or bottom edge
    pub scroll_page_turn: bool,
    /// Lines moved per wheel notch
    pub scroll_step_lines: u16,
    /// Number of rendered frames kept around
    pub frame_cache_size: usize,
    /// Render on a worker thread instead of inline
    pub background_render: bool,
    pub highlight_style: HighlightStyle,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            initial_zoom: Zoom::DEFAULT_FACTOR,
            zoom_in_step: Zoom::ZOOM_IN_RATE,
            zoom_out_step: Zoom::ZOOM_OUT_RATE,
            wheel_zoom_in: Zoom::WHEEL_IN_RATE,
            wheel_zoom_out: Zoom::WHEEL_OUT_RATE,
            zoom_bounds: ZoomBounds::default(),
            scroll_page_turn: true,
            scroll_step_lines: 3,
            frame_cache_size: 8,
            background_render: false,
            highlight_style: HighlightStyle::default(),
        }
    }
}

impl ViewerConfig {
    /// Starting zoom state
    #[must_use]
    pub fn zoom(&self) -> Zoom {
        Zoom::new(self.initial_zoom, self.zoom_bounds)
    }
}
