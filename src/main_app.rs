use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::{debug, info, warn};
use ratatui::Terminal;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::event_source::{Event, EventSource};
use crate::inputs::{Intent, intent_for_event};
use crate::notification::NoticeQueue;
use crate::pdf::DocumentLoader;
use crate::viewer::{PageViewController, SearchResult, ViewerConfig, ViewerError};
use crate::widget::{Prompt, PromptKind, PromptOutcome, Sidebar, TerminalSurface};

const SIDEBAR_WIDTH: u16 = 24;
const SAVE_SUFFIX: &str = "-highlighted";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Quit,
}

pub struct App {
    pub viewer: PageViewController<TerminalSurface>,
    pub prompt: Option<Prompt>,
    pub notices: NoticeQueue,
    /// Result of the most recent search, for the match count label
    pub last_result: Option<SearchResult>,
}

impl App {
    pub fn new(loader: Arc<dyn DocumentLoader>, config: ViewerConfig) -> Self {
        Self {
            viewer: PageViewController::new(loader, TerminalSurface::default(), config),
            prompt: None,
            notices: NoticeQueue::new(),
            last_result: None,
        }
    }

    /// Open `path`; failures become a notice and the current document stays
    pub fn open_document(&mut self, path: &str) {
        let path = path.trim();
        if path.is_empty() {
            return;
        }

        match self.viewer.open(path) {
            Ok(meta) => {
                self.last_result = None;
                debug!("Document ready: {} pages", meta.page_count);
            }
            Err(e) => self.report(&e),
        }
    }

    fn search(&mut self, query: &str) {
        let result = self.viewer.search(query);
        if result.query.is_empty() {
            return;
        }

        if result.is_empty() {
            self.notices
                .warn(format!("'{}' not found on this page", result.query));
        }
        self.last_result = Some(result);
    }

    fn save(&mut self, path: &str) {
        let path = path.trim();
        if path.is_empty() {
            return;
        }

        let mut target = PathBuf::from(path);
        if target.extension().is_none() {
            target.set_extension("pdf");
        }

        match self.viewer.save(&target) {
            Ok(()) => self.notices.info(format!("Saved to {}", target.display())),
            Err(e) => self.report(&e),
        }
    }

    fn report(&mut self, error: &ViewerError) {
        if error.is_user_facing() {
            self.notices.error(error.to_string());
        } else {
            warn!("Ignored: {error}");
        }
    }

    /// Suggested save path: next to the open file, with a suffix
    fn suggested_save_path(&self) -> String {
        let Some(doc) = self.viewer.document() else {
            return String::new();
        };
        let stem = doc
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let name = format!("{stem}{SAVE_SUFFIX}.pdf");
        doc.path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(name)
            .display()
            .to_string()
    }

    pub fn handle_event(&mut self, event: &Event) -> Option<AppAction> {
        if let Event::Key(key) = event {
            if key.kind == crossterm::event::KeyEventKind::Release {
                return None;
            }

            // A notice is modal: any key acknowledges it
            if self.notices.dismiss_current() {
                return None;
            }

            if let Some(prompt) = self.prompt.as_mut() {
                match prompt.handle_key(key) {
                    PromptOutcome::Pending => {}
                    PromptOutcome::Cancelled => self.prompt = None,
                    PromptOutcome::Submitted(text) => {
                        let kind = prompt.kind;
                        self.prompt = None;
                        self.submit_prompt(kind, &text);
                    }
                }
                return None;
            }
        }

        intent_for_event(event).and_then(|intent| self.handle_intent(intent))
    }

    fn submit_prompt(&mut self, kind: PromptKind, text: &str) {
        match kind {
            PromptKind::Search => self.search(text),
            PromptKind::Open => self.open_document(text),
            PromptKind::Save => self.save(text),
        }
    }

    pub fn handle_intent(&mut self, intent: Intent) -> Option<AppAction> {
        debug!("Intent {intent:?}");
        let zoom = |viewer: &mut PageViewController<TerminalSurface>, step: f32| {
            if let Err(e) = viewer.change_zoom(step) {
                warn!("Zoom step rejected: {e}");
            }
        };

        match intent {
            Intent::Quit => return Some(AppAction::Quit),
            Intent::NextPage => {
                self.viewer.next_page();
            }
            Intent::PrevPage => {
                self.viewer.prev_page();
            }
            Intent::ZoomIn => {
                let step = self.viewer.config().zoom_in_step;
                zoom(&mut self.viewer, step);
            }
            Intent::ZoomOut => {
                let step = self.viewer.config().zoom_out_step;
                zoom(&mut self.viewer, step);
            }
            Intent::FitHeight => {
                let height = self.viewer.surface().viewport_height_px();
                if let Err(e) = self.viewer.fit_to_height(height) {
                    self.report(&e);
                }
            }
            Intent::SearchPrompt => {
                if self.viewer.is_loaded() {
                    self.prompt = Some(Prompt::new(PromptKind::Search));
                }
            }
            Intent::RepeatSearch => self.search(""),
            Intent::OpenPrompt => self.prompt = Some(Prompt::new(PromptKind::Open)),
            Intent::SavePrompt => {
                if self.viewer.is_loaded() {
                    let suggestion = self.suggested_save_path();
                    self.prompt = Some(Prompt::with_text(PromptKind::Save, suggestion));
                }
            }
            Intent::UndoHighlights => {
                self.viewer.undo_last_highlights();
            }
            Intent::Scroll { delta, steps } => {
                for _ in 0..steps {
                    if self.viewer.handle_scroll(delta) {
                        break;
                    }
                }
            }
        }
        None
    }

    /// Deliver finished background renders; true when a redraw is needed
    pub fn tick(&mut self) -> bool {
        self.viewer.pump()
    }

    pub fn draw(&mut self, f: &mut ratatui::Frame) {
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(f.area());
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(1), Constraint::Length(SIDEBAR_WIDTH)])
            .split(outer[0]);

        let canvas = columns[0];
        self.viewer.surface_mut().set_viewport(canvas);
        f.render_widget(self.viewer.surface(), canvas);

        let state = self.viewer.state();
        let sidebar = Sidebar {
            document: self.viewer.document(),
            page_index: state.page_index,
            zoom: state.zoom.factor(),
            // Matches belong to the page they were found on
            last_result: self
                .last_result
                .as_ref()
                .filter(|result| result.page == state.page_index),
            pending_highlights: self.viewer.pending_highlights().len(),
        };
        f.render_widget(sidebar, columns[1]);

        if let Some(prompt) = self.prompt.as_ref() {
            f.render_widget(prompt, outer[1]);
        } else if self.viewer.document().is_none() {
            f.render_widget(Paragraph::new("Press 'o' to open a PDF"), outer[1]);
        }

        if let Some(notice) = self.notices.current() {
            let area = centered_rect(50, 5, f.area());
            let body = Paragraph::new(vec![
                Line::from(notice.message.as_str()),
                Line::styled("[any key]", Style::default().add_modifier(Modifier::DIM)),
            ])
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} ", notice.level.title())),
            );
            f.render_widget(Clear, area);
            f.render_widget(body, area);
        }
    }
}

fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let width = u16::try_from(u32::from(area.width) * u32::from(percent_x.min(100)) / 100)
        .unwrap_or(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}

pub fn run_app_with_event_source<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event_source: &mut dyn EventSource,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    let tick_rate = Duration::from_millis(50);
    let mut last_tick = std::time::Instant::now();
    let mut first_render = true;

    loop {
        let mut events_processed = 0;
        let mut should_quit = false;

        while event_source.poll(Duration::from_millis(0))? && events_processed < 50 {
            let event = event_source.read()?;
            events_processed += 1;

            if app.handle_event(&event) == Some(AppAction::Quit) {
                should_quit = true;
                break;
            }
        }

        let mut needs_redraw = events_processed > 0 || first_render;
        first_render = false;

        if last_tick.elapsed() >= tick_rate {
            if app.tick() {
                needs_redraw = true;
            }
            last_tick = std::time::Instant::now();
        }

        if needs_redraw {
            terminal.draw(|f| app.draw(f))?;
        }

        if should_quit {
            info!("Quit requested");
            return Ok(());
        }

        // If no events were processed, wait a bit to avoid busy-waiting
        if events_processed == 0 {
            let timeout = tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_secs(0));
            let _ = event_source.poll(timeout);
        }
    }
}
