//! Render request and response types

use super::document::DocumentFault;
use super::types::{Frame, PageRect};

/// Unique identifier for render requests
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl RequestId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

/// What the render surface needs: which page, at which scale
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderSpec {
    /// Page number (0-indexed)
    pub page: usize,
    /// Zoom factor applied uniformly on both axes
    pub zoom: f32,
}

impl RenderSpec {
    #[must_use]
    pub const fn new(page: usize, zoom: f32) -> Self {
        Self { page, zoom }
    }

    /// Scale matrix diagonal as (x, y)
    #[must_use]
    pub const fn scale(&self) -> (f32, f32) {
        (self.zoom, self.zoom)
    }
}

/// A page render with the highlights to paint on it
#[derive(Clone, Debug, PartialEq)]
pub struct PageJob {
    pub id: RequestId,
    pub spec: RenderSpec,
    pub highlights: Vec<PageRect>,
}

/// Request sent to the render worker
#[derive(Debug)]
pub enum RenderRequest {
    /// Render a page
    Page(PageJob),

    /// Shutdown the worker
    Shutdown,
}

/// Response from the render worker
#[derive(Debug)]
pub enum RenderResponse {
    /// Rendered page
    Page { id: RequestId, frame: Frame },

    /// Request was dropped because a newer one arrived first
    Superseded(RequestId),

    /// Error during rendering
    Error { id: RequestId, error: DocumentFault },
}

impl RenderResponse {
    #[must_use]
    pub fn id(&self) -> RequestId {
        match self {
            Self::Page { id, .. } | Self::Superseded(id) | Self::Error { id, .. } => *id,
        }
    }
}
