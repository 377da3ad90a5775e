//! Turning pages when scrolling runs past the content edge

use super::surface::ScrollPosition;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

/// A normalized wheel or key scroll step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrollDelta {
    pub direction: ScrollDirection,
    /// Ctrl held: zoom instead of scroll
    pub ctrl: bool,
}

impl ScrollDelta {
    #[must_use]
    pub const fn up() -> Self {
        Self {
            direction: ScrollDirection::Up,
            ctrl: false,
        }
    }

    #[must_use]
    pub const fn down() -> Self {
        Self {
            direction: ScrollDirection::Down,
            ctrl: false,
        }
    }

    #[must_use]
    pub const fn with_ctrl(self) -> Self {
        Self { ctrl: true, ..self }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageTurn {
    Previous,
    Next,
}

/// Decides whether a scroll that already happened should turn the page
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrollCoupler {
    enabled: bool,
}

impl ScrollCoupler {
    #[must_use]
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Check the position reached *after* applying a scroll step.
    ///
    /// Scrolling up with the top edge visible goes to the previous page,
    /// scrolling down with the bottom edge visible goes to the next one.
    #[must_use]
    pub fn after_scroll(
        &self,
        direction: ScrollDirection,
        position: ScrollPosition,
    ) -> Option<PageTurn> {
        if !self.enabled {
            return None;
        }

        match direction {
            ScrollDirection::Up if position.top <= 0.0 => Some(PageTurn::Previous),
            ScrollDirection::Down if position.bottom >= 1.0 => Some(PageTurn::Next),
            _ => None,
        }
    }
}
