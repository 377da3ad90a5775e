//! MuPDF-backed document handle

use std::path::{Path, PathBuf};

use log::debug;
use mupdf::{Colorspace, Document, Matrix, Page, Pixmap, Quad, TextPageFlags};

use super::annotate;
use super::document::{DocumentFault, DocumentHandle, DocumentLoader};
use super::highlight::HighlightStyle;
use super::types::{Frame, Highlight, PageRect, PageSize};

/// Opens documents with MuPDF
#[derive(Clone, Copy, Debug, Default)]
pub struct MupdfLoader {
    style: HighlightStyle,
}

impl MupdfLoader {
    #[must_use]
    pub fn new(style: HighlightStyle) -> Self {
        Self { style }
    }
}

impl DocumentLoader for MupdfLoader {
    fn open(&self, path: &Path) -> Result<Box<dyn DocumentHandle>, DocumentFault> {
        Ok(Box::new(MupdfDocument::open(path, self.style)?))
    }
}

/// A document opened through MuPDF
pub struct MupdfDocument {
    path: PathBuf,
    doc: Document,
    page_count: usize,
    style: HighlightStyle,
}

impl MupdfDocument {
    pub fn open(path: &Path, style: HighlightStyle) -> Result<Self, DocumentFault> {
        let doc = Document::open(path.to_string_lossy().as_ref())?;
        let page_count = usize::try_from(doc.page_count()?)
            .map_err(|_| DocumentFault::generic("negative page count"))?;

        debug!("MuPDF opened {path:?} with {page_count} pages");

        Ok(Self {
            path: path.to_path_buf(),
            doc,
            page_count,
            style,
        })
    }

    fn load_page(&self, page: usize) -> Result<Page, DocumentFault> {
        DocumentFault::check_page(page, self.page_count)?;
        Ok(self.doc.load_page(page as i32)?)
    }
}

impl DocumentHandle for MupdfDocument {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn page_size(&self, page: usize) -> Result<PageSize, DocumentFault> {
        let bounds = self.load_page(page)?.bounds()?;
        Ok(PageSize::new(bounds.x1 - bounds.x0, bounds.y1 - bounds.y0))
    }

    fn rasterize(&self, page: usize, scale_x: f32, scale_y: f32) -> Result<Frame, DocumentFault> {
        let loaded = self.load_page(page)?;
        let transform = Matrix::new_scale(scale_x, scale_y);
        let rgb = Colorspace::device_rgb();

        // show_extras draws annotations already stored in the file
        let pixmap = loaded.to_pixmap(&transform, &rgb, false, true)?;
        let pixels = pixmap_to_rgb(&pixmap)?;

        Ok(Frame {
            pixels,
            width: pixmap.width(),
            height: pixmap.height(),
            page,
            zoom: scale_x,
        })
    }

    fn search_on_page(&self, page: usize, needle: &str) -> Result<Vec<PageRect>, DocumentFault> {
        let text_page = self.load_page(page)?.to_text_page(TextPageFlags::empty())?;
        // MuPDF matches case-insensitively; a hit across lines yields one quad per line
        let rects = text_page
            .search(needle)?
            .iter()
            .map(quad_bounds)
            .filter(|rect| !rect.is_empty())
            .collect();
        Ok(rects)
    }

    fn save(&self, path: &Path, highlights: &[Highlight]) -> Result<(), DocumentFault> {
        let written = annotate::write_highlights(&self.path, path, highlights, &self.style)?;
        debug!("Wrote {written} highlight annotations to {path:?}");
        Ok(())
    }
}

fn pixmap_to_rgb(pixmap: &Pixmap) -> Result<Vec<u8>, DocumentFault> {
    let n = pixmap.n() as usize;
    if n < 3 {
        return Err(DocumentFault::generic(format!(
            "Unsupported pixmap format: {n} channels"
        )));
    }

    let width = pixmap.width() as usize;
    let height = pixmap.height() as usize;
    let stride = pixmap.stride() as usize;
    let samples = pixmap.samples();
    let row_bytes = width * n;
    let expected_min = stride.saturating_mul(height);
    if samples.len() < expected_min || row_bytes > stride {
        return Err(DocumentFault::generic("Pixmap buffer size mismatch"));
    }

    let mut out = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        let row_start = y * stride;
        let row = &samples[row_start..row_start + row_bytes];
        if n == 3 {
            out.extend_from_slice(row);
        } else {
            for px in row.chunks_exact(n) {
                out.extend_from_slice(&px[..3]);
            }
        }
    }

    Ok(out)
}

/// Axis-aligned bounds of a search hit
fn quad_bounds(quad: &Quad) -> PageRect {
    let points = [quad.ul, quad.ur, quad.ll, quad.lr];
    let (x0, y0, x1, y1) = points.iter().fold(
        (f32::INFINITY, f32::INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        |(x0, y0, x1, y1), p| (x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y)),
    );
    PageRect::new(x0, y0, x1, y1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mupdf::Point;

    #[test]
    fn quad_bounds_covers_every_corner() {
        let quad = Quad::new(
            Point::new(10.0, 20.0),
            Point::new(50.0, 18.0),
            Point::new(11.0, 32.0),
            Point::new(52.0, 30.0),
        );
        assert_eq!(quad_bounds(&quad), PageRect::new(10.0, 18.0, 52.0, 32.0));
    }
}
