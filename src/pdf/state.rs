//! View state management

use super::request::RenderSpec;
use super::zoom::Zoom;

/// Current view state of the page viewer
#[derive(Clone, Debug, PartialEq)]
pub struct ViewState {
    /// Whether a document is open
    pub document_loaded: bool,

    /// Current page (0-indexed)
    pub page_index: usize,

    /// Total page count
    pub page_count: usize,

    /// Zoom factor
    pub zoom: Zoom,

    /// Last submitted search query, empty when none
    pub last_query: String,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(Zoom::default())
    }
}

impl ViewState {
    /// Create an empty view state with no document loaded
    #[must_use]
    pub fn new(zoom: Zoom) -> Self {
        Self {
            document_loaded: false,
            page_index: 0,
            page_count: 0,
            zoom,
            last_query: String::new(),
        }
    }

    /// Apply a command and return resulting effects
    #[must_use]
    pub fn apply(&mut self, cmd: Command) -> Vec<Effect> {
        match cmd {
            Command::Load { page_count } => {
                self.document_loaded = page_count > 0;
                self.page_count = page_count;
                self.page_index = 0;
                self.last_query.clear();
                if self.document_loaded {
                    vec![
                        Effect::InvalidateCache,
                        Effect::RenderCurrentPage,
                        Effect::ResetScroll,
                    ]
                } else {
                    vec![Effect::InvalidateCache]
                }
            }

            Command::Unload => {
                let was_loaded = self.document_loaded;
                self.document_loaded = false;
                self.page_count = 0;
                self.page_index = 0;
                self.last_query.clear();
                if was_loaded {
                    vec![Effect::InvalidateCache]
                } else {
                    vec![]
                }
            }

            Command::NextPage => {
                if self.document_loaded && self.page_index + 1 < self.page_count {
                    self.page_index += 1;
                    vec![Effect::RenderCurrentPage, Effect::ResetScroll]
                } else {
                    vec![]
                }
            }

            Command::PrevPage => {
                if self.document_loaded && self.page_index > 0 {
                    self.page_index -= 1;
                    vec![Effect::RenderCurrentPage, Effect::ResetScroll]
                } else {
                    vec![]
                }
            }

            Command::GoToPage(page) => {
                if !self.document_loaded {
                    return vec![];
                }
                let clamped = page.min(self.page_count.saturating_sub(1));
                if self.page_index != clamped {
                    self.page_index = clamped;
                    vec![Effect::RenderCurrentPage, Effect::ResetScroll]
                } else {
                    vec![]
                }
            }

            Command::ScaleZoom(step) => {
                if self.document_loaded && self.zoom.scale_by(step) {
                    vec![Effect::RenderCurrentPage]
                } else {
                    vec![]
                }
            }

            Command::SetZoom(factor) => {
                if self.document_loaded && self.zoom.set(factor) {
                    vec![Effect::RenderCurrentPage]
                } else {
                    vec![]
                }
            }

            Command::RememberQuery(query) => {
                if self.document_loaded && !query.is_empty() {
                    self.last_query = query;
                }
                vec![]
            }

            Command::HighlightsChanged(page) => {
                if !self.document_loaded {
                    return vec![];
                }
                if page == self.page_index {
                    vec![Effect::InvalidatePage(page), Effect::RenderCurrentPage]
                } else {
                    vec![Effect::InvalidatePage(page)]
                }
            }
        }
    }

    /// Render parameters for the current page, if a document is loaded
    #[must_use]
    pub fn render_spec(&self) -> Option<RenderSpec> {
        self.document_loaded
            .then(|| RenderSpec::new(self.page_index, self.zoom.factor()))
    }

    /// Whether the current page is the last one
    #[must_use]
    pub fn is_last_page(&self) -> bool {
        self.page_index + 1 >= self.page_count
    }
}

/// Commands that modify view state
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// A document with `page_count` pages was opened
    Load { page_count: usize },
    /// The document was closed
    Unload,
    /// Go to the next page
    NextPage,
    /// Go to the previous page
    PrevPage,
    /// Go to a specific page
    GoToPage(usize),
    /// Multiply the zoom factor
    ScaleZoom(f32),
    /// Set an absolute zoom factor
    SetZoom(f32),
    /// Remember a submitted search query
    RememberQuery(String),
    /// Highlights on a page were added or removed
    HighlightsChanged(usize),
}

/// Effects produced by state changes
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Invalidate entire cache
    InvalidateCache,
    /// Invalidate a specific page
    InvalidatePage(usize),
    /// Render the current page
    RenderCurrentPage,
    /// Scroll the surface back to the top
    ResetScroll,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded_state(page_count: usize) -> ViewState {
        let mut state = ViewState::default();
        let _ = state.apply(Command::Load { page_count });
        state
    }

    #[test]
    fn load_resets_page_and_query() {
        let mut state = loaded_state(5);
        state.page_index = 3;
        state.last_query = "needle".to_string();

        let effects = state.apply(Command::Load { page_count: 2 });
        assert_eq!(state.page_index, 0);
        assert_eq!(state.page_count, 2);
        assert!(state.last_query.is_empty());
        assert!(state.document_loaded);
        assert_eq!(
            effects,
            vec![
                Effect::InvalidateCache,
                Effect::RenderCurrentPage,
                Effect::ResetScroll
            ]
        );
    }

    #[test]
    fn next_page_clamps_at_last_page() {
        let mut state = loaded_state(3);

        assert_eq!(
            state.apply(Command::NextPage),
            vec![Effect::RenderCurrentPage, Effect::ResetScroll]
        );
        let _ = state.apply(Command::NextPage);
        assert_eq!(state.page_index, 2);
        assert!(state.is_last_page());

        assert!(state.apply(Command::NextPage).is_empty());
        assert_eq!(state.page_index, 2);
    }

    #[test]
    fn prev_page_at_first_page_is_noop() {
        let mut state = loaded_state(3);
        let before = state.clone();

        assert!(state.apply(Command::PrevPage).is_empty());
        assert_eq!(state, before);
    }

    #[test]
    fn commands_without_document_do_nothing() {
        let mut state = ViewState::default();
        let before = state.clone();

        assert!(state.apply(Command::NextPage).is_empty());
        assert!(state.apply(Command::PrevPage).is_empty());
        assert!(state.apply(Command::GoToPage(4)).is_empty());
        assert!(state.apply(Command::ScaleZoom(1.2)).is_empty());
        assert!(state.apply(Command::SetZoom(3.0)).is_empty());
        assert!(state.apply(Command::RememberQuery("x".into())).is_empty());
        assert!(state.apply(Command::HighlightsChanged(0)).is_empty());
        assert_eq!(state, before);
        assert!(state.render_spec().is_none());
    }

    #[test]
    fn go_to_page_clamps_to_max() {
        let mut state = loaded_state(10);

        let effects = state.apply(Command::GoToPage(999));
        assert_eq!(state.page_index, 9);
        assert_eq!(
            effects,
            vec![Effect::RenderCurrentPage, Effect::ResetScroll]
        );
        assert!(state.apply(Command::GoToPage(9)).is_empty());
    }

    #[test]
    fn zoom_change_renders_without_scroll_reset() {
        let mut state = loaded_state(1);
        let effects = state.apply(Command::ScaleZoom(1.2));
        assert_eq!(effects, vec![Effect::RenderCurrentPage]);
        assert!((state.zoom.factor() - Zoom::DEFAULT_FACTOR * 1.2).abs() < 1e-5);
    }

    #[test]
    fn highlights_on_other_page_only_invalidate() {
        let mut state = loaded_state(4);
        assert_eq!(
            state.apply(Command::HighlightsChanged(2)),
            vec![Effect::InvalidatePage(2)]
        );
        assert_eq!(
            state.apply(Command::HighlightsChanged(0)),
            vec![Effect::InvalidatePage(0), Effect::RenderCurrentPage]
        );
    }

    #[test]
    fn render_spec_projects_page_and_zoom() {
        let mut state = loaded_state(3);
        let _ = state.apply(Command::NextPage);
        let spec = state.render_spec().unwrap();
        assert_eq!(spec.page, 1);
        assert_eq!(spec.zoom, Zoom::DEFAULT_FACTOR);
    }

    #[test]
    fn unload_clears_document() {
        let mut state = loaded_state(3);
        assert_eq!(state.apply(Command::Unload), vec![Effect::InvalidateCache]);
        assert!(!state.document_loaded);
        assert!(state.apply(Command::Unload).is_empty());
    }
}
