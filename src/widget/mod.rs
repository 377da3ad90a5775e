pub mod page_canvas;
pub mod prompt;
pub mod sidebar;

pub use page_canvas::{CellSize, TerminalSurface};
pub use prompt::{Prompt, PromptKind, PromptOutcome};
pub use sidebar::{Sidebar, match_label};
