//! In-memory documents and a recording surface for tests

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::event_source::{Event, KeyCode, KeyModifiers, SimulatedEventSource};
use crate::pdf::{
    DocumentFault, DocumentHandle, DocumentLoader, Frame, Highlight, PageRect, PageSize,
};
use crate::viewer::{RenderSurface, ScrollPosition};

/// Left margin of laid out text, in points
pub const TEXT_LEFT: f32 = 72.0;
/// Top edge of the first text line, in points
pub const TEXT_TOP: f32 = 72.0;
pub const GLYPH_WIDTH: f32 = 6.0;
pub const LINE_HEIGHT: f32 = 14.0;
const GLYPH_HEIGHT: f32 = 12.0;

/// One page of a fake document
#[derive(Clone, Debug, PartialEq)]
pub struct FakePage {
    pub size: PageSize,
    pub lines: Vec<String>,
}

impl FakePage {
    /// Case-insensitive matches laid out on a monospace grid from the
    /// top-left margin. Matches never overlap or cross lines.
    #[must_use]
    pub fn find(&self, needle: &str) -> Vec<PageRect> {
        let pattern: Vec<char> = needle.chars().flat_map(char::to_lowercase).collect();
        if pattern.is_empty() {
            return Vec::new();
        }

        let mut hits = Vec::new();
        for (row, text) in self.lines.iter().enumerate() {
            let folded: Vec<char> = text.chars().flat_map(char::to_lowercase).collect();
            let y0 = TEXT_TOP + row as f32 * LINE_HEIGHT;

            let mut start = 0;
            while start + pattern.len() <= folded.len() {
                if folded[start..start + pattern.len()] != pattern[..] {
                    start += 1;
                    continue;
                }
                let end = start + pattern.len();
                hits.push(PageRect::new(
                    TEXT_LEFT + start as f32 * GLYPH_WIDTH,
                    y0,
                    TEXT_LEFT + end as f32 * GLYPH_WIDTH,
                    y0 + GLYPH_HEIGHT,
                ));
                start = end;
            }
        }
        hits
    }
}

/// Contents of a fake document file
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FakePdf {
    pub pages: Vec<FakePage>,
    /// Highlight annotations stored in the file
    pub annotations: Vec<Highlight>,
}

impl FakePdf {
    /// `page_count` blank US Letter pages
    #[must_use]
    pub fn letter(page_count: usize) -> Self {
        Self::with_page_size(page_count, PageSize::new(612.0, 792.0))
    }

    #[must_use]
    pub fn with_page_size(page_count: usize, size: PageSize) -> Self {
        Self {
            pages: vec![
                FakePage {
                    size,
                    lines: Vec::new(),
                };
                page_count
            ],
            annotations: Vec::new(),
        }
    }

    /// Replace the text of `page`
    #[must_use]
    pub fn with_text(mut self, page: usize, lines: &[&str]) -> Self {
        if let Some(p) = self.pages.get_mut(page) {
            p.lines = lines.iter().map(|l| (*l).to_string()).collect();
        }
        self
    }
}

#[derive(Debug, Default)]
struct FakeStore {
    files: HashMap<PathBuf, FakePdf>,
    opens: usize,
    rasterizations: usize,
    fail_saves: bool,
}

/// A [`DocumentLoader`] over an in-memory file table
#[derive(Clone, Debug, Default)]
pub struct FakeLoader {
    store: Arc<Mutex<FakeStore>>,
}

impl FakeLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_document(self, path: impl Into<PathBuf>, pdf: FakePdf) -> Self {
        self.add_document(path, pdf);
        self
    }

    pub fn add_document(&self, path: impl Into<PathBuf>, pdf: FakePdf) {
        self.lock().files.insert(path.into(), pdf);
    }

    /// Stored contents of `path`, including annotations written by saves
    #[must_use]
    pub fn file(&self, path: impl AsRef<Path>) -> Option<FakePdf> {
        self.lock().files.get(path.as_ref()).cloned()
    }

    /// Make every following save fail with a permission error
    pub fn fail_saves(&self, fail: bool) {
        self.lock().fail_saves = fail;
    }

    #[must_use]
    pub fn opens(&self) -> usize {
        self.lock().opens
    }

    /// Pages rasterized through any handle of this loader
    #[must_use]
    pub fn rasterizations(&self) -> usize {
        self.lock().rasterizations
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DocumentLoader for FakeLoader {
    fn open(&self, path: &Path) -> Result<Box<dyn DocumentHandle>, DocumentFault> {
        let mut store = self.lock();
        let pdf = store.files.get(path).cloned().ok_or_else(|| {
            DocumentFault::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            ))
        })?;
        store.opens += 1;

        Ok(Box::new(FakeDocument {
            pdf,
            store: Arc::clone(&self.store),
        }))
    }
}

/// Handle to a [`FakePdf`]; rasterizes blank white pages
#[derive(Debug)]
pub struct FakeDocument {
    pdf: FakePdf,
    store: Arc<Mutex<FakeStore>>,
}

impl FakeDocument {
    fn page(&self, page: usize) -> Result<&FakePage, DocumentFault> {
        self.pdf
            .pages
            .get(page)
            .ok_or(DocumentFault::PageOutOfRange {
                page,
                page_count: self.pdf.pages.len(),
            })
    }
}

impl DocumentHandle for FakeDocument {
    fn page_count(&self) -> usize {
        self.pdf.pages.len()
    }

    fn page_size(&self, page: usize) -> Result<PageSize, DocumentFault> {
        Ok(self.page(page)?.size)
    }

    fn rasterize(&self, page: usize, scale_x: f32, scale_y: f32) -> Result<Frame, DocumentFault> {
        let size = self.page(page)?.size;
        self.store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .rasterizations += 1;

        let width = (size.width_pt * scale_x).round().max(1.0) as u32;
        let height = (size.height_pt * scale_y).round().max(1.0) as u32;
        Ok(Frame::blank(width, height, page, scale_x))
    }

    fn search_on_page(&self, page: usize, needle: &str) -> Result<Vec<PageRect>, DocumentFault> {
        Ok(self.page(page)?.find(needle))
    }

    fn save(&self, path: &Path, highlights: &[Highlight]) -> Result<(), DocumentFault> {
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        if store.fail_saves {
            return Err(DocumentFault::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                format!("{} is read-only", path.display()),
            )));
        }

        let mut saved = self.pdf.clone();
        saved.annotations.extend_from_slice(highlights);
        store.files.insert(path.to_path_buf(), saved);
        Ok(())
    }
}

/// A [`RenderSurface`] that keeps every frame it was given.
///
/// Scrolling is modelled as a window of `visible` height sliding over
/// content of height 1.0, moving `line_step` per line.
#[derive(Debug)]
pub struct RecordingSurface {
    pub frames: Vec<Frame>,
    pub resets: usize,
    top: f32,
    visible: f32,
    line_step: f32,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSurface {
    /// Half of the page visible, a tenth of the page per line
    #[must_use]
    pub fn new() -> Self {
        Self::with_window(0.5, 0.1)
    }

    #[must_use]
    pub fn with_window(visible: f32, line_step: f32) -> Self {
        Self {
            frames: Vec::new(),
            resets: 0,
            top: 0.0,
            visible: visible.clamp(0.0, 1.0),
            line_step,
        }
    }

    #[must_use]
    pub fn last_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn set_top(&mut self, top: f32) {
        self.top = top.clamp(0.0, 1.0 - self.visible);
    }
}

impl RenderSurface for RecordingSurface {
    fn display_image(&mut self, frame: &Frame) {
        self.frames.push(frame.clone());
    }

    fn reset_scroll_to_top(&mut self) {
        self.top = 0.0;
        self.resets += 1;
    }

    fn scroll_position(&self) -> ScrollPosition {
        ScrollPosition::new(self.top, self.top + self.visible)
    }

    fn scroll_by(&mut self, lines: i32) {
        self.set_top(self.top + lines as f32 * self.line_step);
    }
}

/// Builder for scripted keyboard and mouse input
#[derive(Debug, Default)]
pub struct TestScenarioBuilder {
    events: Vec<Event>,
}

impl TestScenarioBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn press_char(mut self, c: char) -> Self {
        self.events.push(SimulatedEventSource::char_key(c));
        self
    }

    #[must_use]
    pub fn press_ctrl_char(mut self, c: char) -> Self {
        self.events.push(SimulatedEventSource::ctrl_char_key(c));
        self
    }

    #[must_use]
    pub fn press(mut self, code: KeyCode) -> Self {
        self.events
            .push(SimulatedEventSource::key_event(code, KeyModifiers::empty()));
        self
    }

    /// Type text into an open prompt
    #[must_use]
    pub fn type_text(mut self, text: &str) -> Self {
        for c in text.chars() {
            self.events.push(SimulatedEventSource::char_key(c));
        }
        self
    }

    #[must_use]
    pub fn press_enter(self) -> Self {
        self.press(KeyCode::Enter)
    }

    #[must_use]
    pub fn quit(self) -> Self {
        self.press_char('q')
    }

    #[must_use]
    pub fn event(mut self, event: Event) -> Self {
        self.events.push(event);
        self
    }

    #[must_use]
    pub fn build(self) -> SimulatedEventSource {
        SimulatedEventSource::new(self.events)
    }
}
