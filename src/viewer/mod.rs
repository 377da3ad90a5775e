//! The page-view controller and the contracts around it

mod config;
mod controller;
mod error;
mod scroll;
mod search;
mod surface;

pub use config::ViewerConfig;
pub use controller::PageViewController;
pub use error::ViewerError;
pub use scroll::{PageTurn, ScrollCoupler, ScrollDelta, ScrollDirection};
pub use search::{PendingHighlights, SearchResult};
pub use surface::{RenderSurface, ScrollPosition};
