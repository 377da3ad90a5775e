//! Zoom state for PDF rendering
//!
//! Zoom is relative: each step multiplies the current factor. The factor is
//! clamped into a configurable range so repeated steps cannot request
//! unbounded pixel buffers.

/// Allowed zoom range
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomBounds {
    pub min: f32,
    pub max: f32,
}

impl Default for ZoomBounds {
    fn default() -> Self {
        Self {
            min: Zoom::MIN_SCALE,
            max: Zoom::MAX_SCALE,
        }
    }
}

impl ZoomBounds {
    /// Build bounds, repairing swapped or degenerate limits
    #[must_use]
    pub fn new(min: f32, max: f32) -> Self {
        let min = if min.is_finite() && min > 0.0 {
            min
        } else {
            Zoom::MIN_SCALE
        };
        let max = if max.is_finite() && max > 0.0 {
            max
        } else {
            Zoom::MAX_SCALE
        };
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }
}

/// Zoom state for PDF viewing
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Zoom {
    /// Current zoom factor (1.0 = one pixel per point)
    factor: f32,
    bounds: ZoomBounds,
}

impl Default for Zoom {
    fn default() -> Self {
        Self::new(Self::DEFAULT_FACTOR, ZoomBounds::default())
    }
}

impl Zoom {
    /// Initial factor of a fresh viewer
    pub const DEFAULT_FACTOR: f32 = 2.0;
    /// Toolbar zoom in multiplier - 20%
    pub const ZOOM_IN_RATE: f32 = 1.2;
    /// Toolbar zoom out multiplier - 20%
    pub const ZOOM_OUT_RATE: f32 = 0.8;
    /// Ctrl+wheel zoom in multiplier - 10%
    pub const WHEEL_IN_RATE: f32 = 1.1;
    /// Ctrl+wheel zoom out multiplier - 10%
    pub const WHEEL_OUT_RATE: f32 = 0.9;
    /// Minimum allowed zoom factor
    pub const MIN_SCALE: f32 = 0.1;
    /// Maximum allowed zoom factor
    pub const MAX_SCALE: f32 = 20.0;

    #[must_use]
    pub fn new(factor: f32, bounds: ZoomBounds) -> Self {
        let mut zoom = Self {
            factor: Self::DEFAULT_FACTOR,
            bounds,
        };
        zoom.factor = zoom.clamp_factor(factor);
        zoom
    }

    /// Returns the current zoom factor
    #[must_use]
    pub fn factor(&self) -> f32 {
        self.factor
    }

    #[must_use]
    pub fn bounds(&self) -> ZoomBounds {
        self.bounds
    }

    /// Whether `factor` is usable as a relative zoom step
    #[must_use]
    pub fn is_valid_step(factor: f32) -> bool {
        factor.is_finite() && factor > 0.0
    }

    /// Multiply the current factor, returning true if it changed
    pub fn scale_by(&mut self, step: f32) -> bool {
        if !Self::is_valid_step(step) {
            return false;
        }
        self.set(self.factor * step)
    }

    /// Set an absolute factor, returning true if it changed
    pub fn set(&mut self, factor: f32) -> bool {
        let clamped = self.clamp_factor(factor);
        if (self.factor - clamped).abs() > f32::EPSILON {
            self.factor = clamped;
            true
        } else {
            false
        }
    }

    /// Factor that makes a page of `page_height_pt` exactly `viewport_px` tall
    #[must_use]
    pub fn fit_height_factor(viewport_px: u32, page_height_pt: f32) -> Option<f32> {
        if viewport_px == 0 || !page_height_pt.is_finite() || page_height_pt <= 0.0 {
            return None;
        }
        Some(viewport_px as f32 / page_height_pt)
    }

    /// Clamp factor to valid range, handling NaN/Inf
    #[must_use]
    pub fn clamp_factor(&self, factor: f32) -> f32 {
        if !factor.is_finite() {
            self.factor
        } else {
            factor.clamp(self.bounds.min, self.bounds.max)
        }
    }
}
