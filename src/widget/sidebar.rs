//! Status sidebar: document, page, zoom and search results

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Widget, Wrap};

use crate::pdf::DocumentMeta;
use crate::viewer::SearchResult;

const KEY_HELP: [&str; 9] = [
    "←/→    page",
    "+/-    zoom",
    "^0     fit height",
    "/ F3   search",
    "u      undo marks",
    "o      open",
    "^S     save",
    "wheel  scroll",
    "q Esc  quit",
];

/// Snapshot of what the sidebar shows
#[derive(Clone, Debug, Default)]
pub struct Sidebar<'a> {
    pub document: Option<&'a DocumentMeta>,
    pub page_index: usize,
    pub zoom: f32,
    pub last_result: Option<&'a SearchResult>,
    pub pending_highlights: usize,
}

/// Label shown after a search
pub fn match_label(result: &SearchResult) -> String {
    format!("Matches: {}", result.count())
}

impl Sidebar<'_> {
    fn lines(&self) -> Vec<Line<'static>> {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let mut lines = Vec::new();

        match self.document {
            Some(doc) => {
                let name = doc
                    .path
                    .file_name()
                    .map_or_else(|| doc.path.display().to_string(), |n| n.to_string_lossy().into_owned());
                lines.push(Line::styled(name, bold));
                lines.push(Line::from(format!(
                    "Page {}/{}",
                    self.page_index + 1,
                    doc.page_count
                )));
                lines.push(Line::from(format!("Zoom {:.0}%", self.zoom * 100.0)));
            }
            None => lines.push(Line::styled("No document", bold)),
        }

        lines.push(Line::from(""));
        if let Some(result) = self.last_result {
            lines.push(Line::from(match_label(result)));
        }
        if self.pending_highlights > 0 {
            lines.push(Line::from(format!("Marks: {}", self.pending_highlights)));
        }

        lines.push(Line::from(""));
        lines.extend(KEY_HELP.iter().map(|help| Line::from(*help)));
        lines
    }
}

impl Widget for Sidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.lines())
            .block(Block::default().borders(Borders::LEFT).title(" folio "))
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::PageSize;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::path::PathBuf;

    fn buffer_text(buf: &Buffer) -> String {
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn shows_page_zoom_and_matches() {
        let meta = DocumentMeta {
            path: PathBuf::from("/docs/report.pdf"),
            page_count: 3,
            page_sizes: vec![PageSize::new(612.0, 792.0); 3],
        };
        let result = SearchResult {
            query: "test".to_string(),
            page: 1,
            rects: vec![crate::pdf::PageRect::new(0.0, 0.0, 1.0, 1.0); 2],
        };

        let mut terminal = Terminal::new(TestBackend::new(30, 20)).unwrap();
        terminal
            .draw(|f| {
                let sidebar = Sidebar {
                    document: Some(&meta),
                    page_index: 1,
                    zoom: 2.4,
                    last_result: Some(&result),
                    pending_highlights: 2,
                };
                f.render_widget(sidebar, f.area());
            })
            .unwrap();

        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("report.pdf"));
        assert!(text.contains("Page 2/3"));
        assert!(text.contains("Zoom 240%"));
        assert!(text.contains("Matches: 2"));
    }
}
