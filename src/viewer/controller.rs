//! Page-view controller
//!
//! Turns navigation, zoom and search intents into [`ViewState`] transitions
//! and executes the resulting effects: rendering through the frame cache,
//! resetting the surface scroll, invalidating stale frames.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};

use super::config::ViewerConfig;
use super::error::ViewerError;
use super::scroll::{PageTurn, ScrollCoupler, ScrollDelta, ScrollDirection};
use super::search::{PendingHighlights, SearchResult};
use super::surface::RenderSurface;
use crate::pdf::{
    CacheKey, Command, DocumentHandle, DocumentLoader, DocumentMeta, Effect, Frame, FrameCache,
    RenderSpec, RenderWorker, ViewState, Zoom, describe, render_page,
};

struct LoadedDocument {
    meta: DocumentMeta,
    handle: Box<dyn DocumentHandle>,
}

/// Owns the open document and drives a [`RenderSurface`]
pub struct PageViewController<S: RenderSurface> {
    loader: Arc<dyn DocumentLoader>,
    surface: S,
    config: ViewerConfig,
    state: ViewState,
    document: Option<LoadedDocument>,
    highlights: PendingHighlights,
    cache: FrameCache,
    worker: Option<RenderWorker>,
    coupler: ScrollCoupler,
}

impl<S: RenderSurface> PageViewController<S> {
    #[must_use]
    pub fn new(loader: Arc<dyn DocumentLoader>, surface: S, config: ViewerConfig) -> Self {
        Self {
            loader,
            surface,
            state: ViewState::new(config.zoom()),
            document: None,
            highlights: PendingHighlights::new(),
            cache: FrameCache::new(config.frame_cache_size),
            worker: None,
            coupler: ScrollCoupler::new(config.scroll_page_turn),
            config,
        }
    }

    /// Open a document, replacing the current one.
    ///
    /// On failure the previous document and view state are kept.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<DocumentMeta, ViewerError> {
        let path = path.as_ref();

        let loaded = self
            .loader
            .open(path)
            .and_then(|handle| {
                let meta = describe(path, handle.as_ref())?;
                Ok(LoadedDocument { meta, handle })
            })
            .map_err(|source| {
                error!("Failed to open {path:?}: {source}");
                ViewerError::OpenFailed {
                    path: path.to_path_buf(),
                    source,
                }
            })?;

        let meta = loaded.meta.clone();
        info!("Opened {path:?} ({} pages)", meta.page_count);

        self.worker = None;
        self.document = Some(loaded);
        self.highlights.clear();
        if self.config.background_render {
            self.worker = Some(RenderWorker::spawn(
                Arc::clone(&self.loader),
                path.to_path_buf(),
                self.config.highlight_style,
            ));
        }

        self.apply_command(Command::Load {
            page_count: meta.page_count,
        });

        Ok(meta)
    }

    /// Release the document, its worker and cached frames
    pub fn close(&mut self) {
        if let Some(doc) = self.document.take() {
            info!("Closed {:?}", doc.meta.path);
        }
        self.worker = None;
        self.highlights.clear();
        self.apply_command(Command::Unload);
    }

    /// Go to the next page; false at the last page or without a document
    pub fn next_page(&mut self) -> bool {
        self.apply_command(Command::NextPage)
    }

    /// Go to the previous page; false at the first page or without a document
    pub fn prev_page(&mut self) -> bool {
        self.apply_command(Command::PrevPage)
    }

    /// Jump to `page`, clamped into the document
    pub fn go_to_page(&mut self, page: usize) -> bool {
        self.apply_command(Command::GoToPage(page))
    }

    /// Multiply the zoom factor by `factor`.
    ///
    /// Returns whether the zoom changed. Zoom is clamped to the configured
    /// bounds, so steps past a limit are no-ops.
    pub fn change_zoom(&mut self, factor: f32) -> Result<bool, ViewerError> {
        if !Zoom::is_valid_step(factor) {
            warn!("Rejected zoom factor {factor}");
            return Err(ViewerError::InvalidZoom(factor));
        }
        if self.document.is_none() {
            return Ok(false);
        }
        Ok(self.apply_command(Command::ScaleZoom(factor)))
    }

    /// Zoom so the current page is exactly `viewport_height_px` tall
    pub fn fit_to_height(&mut self, viewport_height_px: u32) -> Result<bool, ViewerError> {
        if viewport_height_px == 0 {
            warn!("Rejected fit-to-height for an empty viewport");
            return Err(ViewerError::InvalidViewport(viewport_height_px));
        }

        let Some(size) = self
            .document
            .as_ref()
            .and_then(|doc| doc.meta.page_size(self.state.page_index))
        else {
            return Ok(false);
        };

        let Some(factor) = Zoom::fit_height_factor(viewport_height_px, size.height_pt) else {
            warn!(
                "Page {} has unusable height {}",
                self.state.page_index, size.height_pt
            );
            return Ok(false);
        };

        Ok(self.apply_command(Command::SetZoom(factor)))
    }

    /// Search the current page and highlight every match.
    ///
    /// An empty `query` repeats the previous search. The query is remembered
    /// even when nothing matches; the page is re-rendered only when something
    /// did.
    pub fn search(&mut self, query: &str) -> SearchResult {
        let page = self.state.page_index;
        let query = if query.is_empty() {
            self.state.last_query.clone()
        } else {
            query.to_string()
        };

        let Some(doc) = self.document.as_ref() else {
            return SearchResult::default();
        };
        if query.is_empty() {
            return SearchResult {
                page,
                ..SearchResult::default()
            };
        }

        let rects = match doc.handle.search_on_page(page, &query) {
            Ok(rects) => rects,
            Err(e) => {
                error!("Search for {query:?} on page {page} failed: {e}");
                Vec::new()
            }
        };
        debug!("Search {query:?} on page {page}: {} matches", rects.len());

        self.apply_command(Command::RememberQuery(query.clone()));

        let result = SearchResult { query, page, rects };
        if !result.is_empty() {
            if self.highlights.add_batch(page, &result.rects) > 0 {
                self.apply_command(Command::HighlightsChanged(page));
            } else {
                self.execute_effects(vec![Effect::RenderCurrentPage]);
            }
        }

        result
    }

    /// Drop the highlights added by the most recent search
    pub fn undo_last_highlights(&mut self) -> bool {
        let Some(batch) = self.highlights.undo_last() else {
            return false;
        };

        let pages: BTreeSet<usize> = batch.iter().map(|h| h.page).collect();
        debug!("Undid {} highlights on pages {pages:?}", batch.len());
        for page in pages {
            self.apply_command(Command::HighlightsChanged(page));
        }
        true
    }

    /// Write the document with all pending highlights to `path`
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ViewerError> {
        let path = path.as_ref();
        let Some(doc) = self.document.as_ref() else {
            return Err(ViewerError::NoDocumentLoaded);
        };

        let highlights = self.highlights.to_vec();
        doc.handle
            .save(path, &highlights)
            .map_err(|source| {
                error!("Failed to save {path:?}: {source}");
                ViewerError::SaveFailed {
                    path: path.to_path_buf(),
                    source,
                }
            })?;

        info!("Saved {path:?} with {} highlights", highlights.len());
        Ok(())
    }

    /// Page and zoom the surface should show, if anything
    #[must_use]
    pub fn render_request(&self) -> Option<RenderSpec> {
        self.state.render_spec()
    }

    /// Apply a wheel step: zoom with ctrl held, otherwise scroll and maybe
    /// turn the page. Returns whether the page or zoom changed.
    pub fn handle_scroll(&mut self, delta: ScrollDelta) -> bool {
        if self.document.is_none() {
            return false;
        }

        if delta.ctrl {
            let step = match delta.direction {
                ScrollDirection::Up => self.config.wheel_zoom_in,
                ScrollDirection::Down => self.config.wheel_zoom_out,
            };
            return self.change_zoom(step).unwrap_or(false);
        }

        let lines = i32::from(self.config.scroll_step_lines);
        let lines = match delta.direction {
            ScrollDirection::Up => -lines,
            ScrollDirection::Down => lines,
        };
        self.surface.scroll_by(lines);

        let position = self.surface.scroll_position();
        match self.coupler.after_scroll(delta.direction, position) {
            Some(PageTurn::Previous) => self.prev_page(),
            Some(PageTurn::Next) => self.next_page(),
            None => false,
        }
    }

    /// Show a finished background render, dropping stale ones.
    ///
    /// Returns whether a frame reached the surface. Always false when
    /// rendering inline.
    pub fn pump(&mut self) -> bool {
        let Some(result) = self.worker.as_mut().and_then(RenderWorker::poll) else {
            return false;
        };
        self.deliver(result)
    }

    /// Like [`Self::pump`], blocking up to `timeout` for the newest render
    pub fn wait_for_frame(&mut self, timeout: Duration) -> bool {
        let Some(result) = self.worker.as_mut().and_then(|w| w.wait(timeout)) else {
            return false;
        };
        self.deliver(result)
    }

    fn deliver(&mut self, result: Result<Frame, crate::pdf::DocumentFault>) -> bool {
        match result {
            Ok(frame) => {
                let key = CacheKey::from_spec(&RenderSpec::new(frame.page, frame.zoom));
                let current = self.state.render_spec().map(|spec| CacheKey::from_spec(&spec));
                if current.as_ref() != Some(&key) {
                    debug!("Dropping frame for page {} at {:.3}", frame.page, frame.zoom);
                    return false;
                }
                let frame = self.cache.insert(key, frame);
                self.surface.display_image(&frame);
                true
            }
            Err(e) => {
                error!("Background render failed: {e}");
                false
            }
        }
    }

    fn apply_command(&mut self, cmd: Command) -> bool {
        debug!("Applying {cmd:?}");
        let effects = self.state.apply(cmd);
        let changed = !effects.is_empty();
        self.execute_effects(effects);
        changed
    }

    fn execute_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::InvalidateCache => self.cache.invalidate_all(),
                Effect::InvalidatePage(page) => self.cache.invalidate_page(page),
                Effect::RenderCurrentPage => self.render_current_page(),
                Effect::ResetScroll => self.surface.reset_scroll_to_top(),
            }
        }
    }

    fn render_current_page(&mut self) {
        let Some(spec) = self.state.render_spec() else {
            return;
        };

        let key = CacheKey::from_spec(&spec);
        if let Some(frame) = self.cache.get(&key) {
            debug!("Page {} at {:.3} served from cache", spec.page, spec.zoom);
            if let Some(worker) = self.worker.as_mut() {
                worker.cancel_pending();
            }
            self.surface.display_image(&frame);
            return;
        }

        let highlights = self.highlights.for_page(spec.page);

        if let Some(worker) = self.worker.as_mut() {
            let id = worker.submit(spec, highlights);
            debug!("Queued page {} at {:.3} as {id:?}", spec.page, spec.zoom);
            return;
        }

        let Some(doc) = self.document.as_ref() else {
            return;
        };
        match render_page(
            doc.handle.as_ref(),
            &spec,
            &highlights,
            &self.config.highlight_style,
        ) {
            Ok(frame) => {
                let frame = self.cache.insert(key, frame);
                self.surface.display_image(&frame);
            }
            Err(e) => error!("Failed to render page {}: {e}", spec.page),
        }
    }

    #[must_use]
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    #[must_use]
    pub fn document(&self) -> Option<&DocumentMeta> {
        self.document.as_ref().map(|doc| &doc.meta)
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.document.is_some()
    }

    #[must_use]
    pub fn pending_highlights(&self) -> &PendingHighlights {
        &self.highlights
    }

    #[must_use]
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Number of frames currently cached
    #[must_use]
    pub fn cached_frames(&self) -> usize {
        self.cache.len()
    }
}
