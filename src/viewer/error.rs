//! Errors surfaced by the page-view controller

use std::path::PathBuf;

use crate::pdf::DocumentFault;

#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("Could not open {}: {source}", .path.display())]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: DocumentFault,
    },

    #[error("Could not save to {}: {source}", .path.display())]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: DocumentFault,
    },

    #[error("No document loaded")]
    NoDocumentLoaded,

    #[error("Invalid zoom factor: {0}")]
    InvalidZoom(f32),

    #[error("Invalid viewport height: {0}")]
    InvalidViewport(u32),
}

impl ViewerError {
    /// Whether the shell should show this error to the user.
    ///
    /// Saving without a document is silently ignored, and bad zoom or
    /// viewport values are programming errors that only get logged.
    #[must_use]
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::OpenFailed { .. } | Self::SaveFailed { .. })
    }
}
