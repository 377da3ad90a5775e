//! PDF document plumbing: engine access, rendering, caching and highlights

#[cfg(feature = "pdf")]
pub mod annotate;
mod cache;
mod document;
#[cfg(feature = "pdf")]
mod engine;
mod highlight;
mod request;
mod state;
mod types;
mod worker;
mod zoom;

pub use cache::{CacheKey, FrameCache};
pub use document::{DocumentFault, DocumentHandle, DocumentLoader, describe};
#[cfg(feature = "pdf")]
pub use engine::{MupdfDocument, MupdfLoader};
pub use highlight::{HighlightStyle, paint_highlights};
pub use request::{PageJob, RenderRequest, RenderResponse, RenderSpec, RequestId};
pub use state::{Command, Effect, ViewState};
pub use types::*;
pub use worker::{RenderWorker, render_page, render_worker};
pub use zoom::*;
