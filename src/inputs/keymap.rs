//! Key and mouse bindings
//!
//! Raw crossterm events are mapped to [`Intent`]s here so the rest of the
//! shell never looks at key codes.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};

use crate::viewer::{ScrollDelta, ScrollDirection};

/// Lines moved by PageUp/PageDown, in wheel steps
pub const PAGE_SCROLL_STEPS: u16 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    NextPage,
    PrevPage,
    ZoomIn,
    ZoomOut,
    FitHeight,
    /// Ask for a search query
    SearchPrompt,
    /// Search again for the previous query
    RepeatSearch,
    OpenPrompt,
    SavePrompt,
    UndoHighlights,
    /// Scroll `steps` wheel notches
    Scroll { delta: ScrollDelta, steps: u16 },
    Quit,
}

/// Intent bound to a key press, if any
pub fn intent_for_key(key: &KeyEvent) -> Option<Intent> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let intent = match key.code {
        KeyCode::Right => Intent::NextPage,
        KeyCode::Left => Intent::PrevPage,
        KeyCode::Char('0') if ctrl => Intent::FitHeight,
        KeyCode::Char('+' | '=') => Intent::ZoomIn,
        KeyCode::Char('-') => Intent::ZoomOut,
        KeyCode::Char('s' | 'S') if ctrl => Intent::SavePrompt,
        KeyCode::Char('/') => Intent::SearchPrompt,
        KeyCode::F(3) => Intent::RepeatSearch,
        KeyCode::Char('o') if !ctrl => Intent::OpenPrompt,
        KeyCode::Char('u') if !ctrl => Intent::UndoHighlights,
        KeyCode::Char('q') if !ctrl => Intent::Quit,
        KeyCode::Esc => Intent::Quit,
        KeyCode::Up => Intent::Scroll {
            delta: ScrollDelta::up(),
            steps: 1,
        },
        KeyCode::Down => Intent::Scroll {
            delta: ScrollDelta::down(),
            steps: 1,
        },
        KeyCode::PageUp => Intent::Scroll {
            delta: ScrollDelta::up(),
            steps: PAGE_SCROLL_STEPS,
        },
        KeyCode::PageDown => Intent::Scroll {
            delta: ScrollDelta::down(),
            steps: PAGE_SCROLL_STEPS,
        },
        _ => return None,
    };
    Some(intent)
}

/// Normalize a vertical wheel event. Horizontal scrolling is ignored.
pub fn scroll_delta(mouse: &MouseEvent) -> Option<ScrollDelta> {
    let direction = match mouse.kind {
        MouseEventKind::ScrollUp => ScrollDirection::Up,
        MouseEventKind::ScrollDown => ScrollDirection::Down,
        _ => return None,
    };
    Some(ScrollDelta {
        direction,
        ctrl: mouse.modifiers.contains(KeyModifiers::CONTROL),
    })
}

pub fn intent_for_event(event: &Event) -> Option<Intent> {
    match event {
        Event::Key(key) => intent_for_key(key),
        Event::Mouse(mouse) => scroll_delta(mouse).map(|delta| Intent::Scroll { delta, steps: 1 }),
        _ => None,
    }
}
