//! One-line text prompt used for search queries and file paths

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptKind {
    Search,
    Open,
    Save,
}

impl PromptKind {
    pub fn label(&self) -> &'static str {
        match self {
            PromptKind::Search => "Search: ",
            PromptKind::Open => "Open file: ",
            PromptKind::Save => "Save as: ",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PromptOutcome {
    /// Still editing
    Pending,
    Submitted(String),
    Cancelled,
}

#[derive(Clone, Debug)]
pub struct Prompt {
    pub kind: PromptKind,
    input: String,
}

impl Prompt {
    pub fn new(kind: PromptKind) -> Self {
        Self {
            kind,
            input: String::new(),
        }
    }

    /// Prompt pre-filled with `text`
    pub fn with_text(kind: PromptKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            input: text.into(),
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> PromptOutcome {
        if key.kind == KeyEventKind::Release {
            return PromptOutcome::Pending;
        }

        match key.code {
            KeyCode::Enter => PromptOutcome::Submitted(self.input.clone()),
            KeyCode::Esc => PromptOutcome::Cancelled,
            KeyCode::Backspace => {
                self.input.pop();
                PromptOutcome::Pending
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.clear();
                PromptOutcome::Pending
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.push(c);
                PromptOutcome::Pending
            }
            _ => PromptOutcome::Pending,
        }
    }
}

impl Widget for &Prompt {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let line = Line::from(vec![
            Span::styled(
                self.kind.label(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(self.input.as_str()),
            Span::styled(" ", Style::default().add_modifier(Modifier::REVERSED)),
        ]);
        Paragraph::new(line).render(area, buf);
    }
}
