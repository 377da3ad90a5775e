pub mod keymap;

pub use keymap::{Intent, intent_for_event, intent_for_key, scroll_delta};
