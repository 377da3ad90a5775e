//! Where the app gets its input from: the real terminal, or a script in tests

use std::collections::VecDeque;
use std::time::Duration;

use anyhow::Result;
pub use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers, MouseEvent,
    MouseEventKind,
};

/// Key a drained script answers with, so a scripted run always ends
pub const SCRIPT_END_KEY: char = 'q';

pub trait EventSource {
    /// Whether an event is ready within `timeout`
    fn poll(&mut self, timeout: Duration) -> Result<bool>;

    fn read(&mut self) -> Result<Event>;
}

/// Keyboard and mouse input from crossterm
pub struct TerminalEventSource;

impl EventSource for TerminalEventSource {
    fn poll(&mut self, timeout: Duration) -> Result<bool> {
        Ok(crossterm::event::poll(timeout)?)
    }

    fn read(&mut self) -> Result<Event> {
        Ok(crossterm::event::read()?)
    }
}

/// Replays a fixed list of events
pub struct SimulatedEventSource {
    queue: VecDeque<Event>,
}

impl SimulatedEventSource {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            queue: events.into(),
        }
    }

    /// Events not read yet
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn key_event(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::empty(),
        })
    }

    pub fn char_key(c: char) -> Event {
        Self::key_event(KeyCode::Char(c), KeyModifiers::empty())
    }

    pub fn ctrl_char_key(c: char) -> Event {
        Self::key_event(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    /// Wheel notch over the top-left cell; ctrl turns it into a zoom step
    pub fn wheel(kind: MouseEventKind, modifiers: KeyModifiers) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column: 0,
            row: 0,
            modifiers,
        })
    }
}

impl EventSource for SimulatedEventSource {
    fn poll(&mut self, _timeout: Duration) -> Result<bool> {
        Ok(!self.queue.is_empty())
    }

    fn read(&mut self) -> Result<Event> {
        Ok(self
            .queue
            .pop_front()
            .unwrap_or_else(|| Self::char_key(SCRIPT_END_KEY)))
    }
}
