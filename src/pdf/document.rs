//! Document capability traits
//!
//! The viewer never talks to a PDF engine directly. It goes through a
//! [`DocumentLoader`] to open files and a [`DocumentHandle`] for everything
//! page related, so the controller can be exercised without MuPDF.

use std::path::Path;

use super::types::{DocumentMeta, Frame, Highlight, PageRect, PageSize};

/// Errors from the document engine
#[derive(Debug, thiserror::Error)]
pub enum DocumentFault {
    #[cfg(feature = "pdf")]
    #[error("PDF engine: {0}")]
    Pdf(#[from] mupdf::error::Error),

    #[cfg(feature = "pdf")]
    #[error("PDF writer: {0}")]
    Writer(#[from] lopdf::Error),

    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("page {page} out of range (page_count={page_count})")]
    PageOutOfRange { page: usize, page_count: usize },

    #[error("document has no pages")]
    Empty,

    #[error("{detail}")]
    Generic { detail: String },
}

impl DocumentFault {
    pub fn generic(msg: impl Into<String>) -> Self {
        Self::Generic { detail: msg.into() }
    }

    /// Fail with `PageOutOfRange` unless `page < page_count`
    pub fn check_page(page: usize, page_count: usize) -> Result<(), Self> {
        if page < page_count {
            Ok(())
        } else {
            Err(Self::PageOutOfRange { page, page_count })
        }
    }
}

/// An opened document
pub trait DocumentHandle {
    /// Number of pages
    fn page_count(&self) -> usize;

    /// Intrinsic size of a page in points
    fn page_size(&self, page: usize) -> Result<PageSize, DocumentFault>;

    /// Render a page to RGB8 pixels at the given scale
    fn rasterize(&self, page: usize, scale_x: f32, scale_y: f32) -> Result<Frame, DocumentFault>;

    /// Bounding boxes of every occurrence of `needle` on a page
    fn search_on_page(&self, page: usize, needle: &str) -> Result<Vec<PageRect>, DocumentFault>;

    /// Write the document with the given highlight annotations to `path`
    fn save(&self, path: &Path, highlights: &[Highlight]) -> Result<(), DocumentFault>;
}

/// Opens documents by path
pub trait DocumentLoader: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn DocumentHandle>, DocumentFault>;
}

/// Collect page geometry of a freshly opened document
pub fn describe(path: &Path, doc: &dyn DocumentHandle) -> Result<DocumentMeta, DocumentFault> {
    let page_count = doc.page_count();
    if page_count == 0 {
        return Err(DocumentFault::Empty);
    }

    let page_sizes = (0..page_count)
        .map(|page| doc.page_size(page))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DocumentMeta {
        path: path.to_path_buf(),
        page_count,
        page_sizes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_page_rejects_out_of_range() {
        assert!(DocumentFault::check_page(0, 1).is_ok());
        let err = DocumentFault::check_page(3, 3).unwrap_err();
        assert_eq!(err.to_string(), "page 3 out of range (page_count=3)");
    }
}
