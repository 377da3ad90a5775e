//! Search results and the session's pending highlight annotations

use crate::pdf::{Highlight, PageRect};

/// Matches of one query on one page
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchResult {
    pub query: String,
    /// Page that was searched (0-indexed)
    pub page: usize,
    /// Match rectangles in page space, in reading order
    pub rects: Vec<PageRect>,
}

impl SearchResult {
    #[must_use]
    pub fn count(&self) -> usize {
        self.rects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

/// Highlights added during this session, written to the file on save.
///
/// Each search adds one batch so the newest batch can be undone as a unit.
/// A rectangle already highlighted on the same page is not added twice.
#[derive(Clone, Debug, Default)]
pub struct PendingHighlights {
    batches: Vec<Vec<Highlight>>,
}

impl PendingHighlights {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a batch of rects on `page`, returning how many were new
    pub fn add_batch(&mut self, page: usize, rects: &[PageRect]) -> usize {
        let mut batch: Vec<Highlight> = Vec::with_capacity(rects.len());

        for rect in rects {
            let highlight = Highlight { page, rect: *rect };
            if self.contains(&highlight) || batch.contains(&highlight) {
                continue;
            }
            batch.push(highlight);
        }

        let added = batch.len();
        if added > 0 {
            self.batches.push(batch);
        }
        added
    }

    /// Remove and return the newest batch
    pub fn undo_last(&mut self) -> Option<Vec<Highlight>> {
        self.batches.pop()
    }

    #[must_use]
    pub fn contains(&self, highlight: &Highlight) -> bool {
        self.iter().any(|h| h == highlight)
    }

    /// Rects to paint on `page`
    #[must_use]
    pub fn for_page(&self, page: usize) -> Vec<PageRect> {
        self.iter()
            .filter(|h| h.page == page)
            .map(|h| h.rect)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Highlight> {
        self.batches.iter().flatten()
    }

    /// Every pending highlight, oldest first
    #[must_use]
    pub fn to_vec(&self) -> Vec<Highlight> {
        self.iter().copied().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    #[must_use]
    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    pub fn clear(&mut self) {
        self.batches.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f32) -> PageRect {
        PageRect::new(x, 10.0, x + 20.0, 22.0)
    }

    #[test]
    fn duplicates_are_stored_once() {
        let mut pending = PendingHighlights::new();

        assert_eq!(pending.add_batch(0, &[rect(0.0), rect(30.0), rect(0.0)]), 2);
        assert_eq!(pending.add_batch(0, &[rect(30.0)]), 0);
        // Same rect on another page is a different highlight
        assert_eq!(pending.add_batch(1, &[rect(30.0)]), 1);

        assert_eq!(pending.len(), 3);
        assert_eq!(pending.batch_count(), 2);
        assert_eq!(pending.for_page(0), vec![rect(0.0), rect(30.0)]);
    }

    #[test]
    fn undo_drops_newest_batch() {
        let mut pending = PendingHighlights::new();
        pending.add_batch(0, &[rect(0.0)]);
        pending.add_batch(2, &[rect(5.0), rect(40.0)]);

        let undone = pending.undo_last().unwrap();
        assert_eq!(undone.len(), 2);
        assert!(undone.iter().all(|h| h.page == 2));
        assert_eq!(pending.to_vec(), vec![Highlight { page: 0, rect: rect(0.0) }]);

        pending.undo_last();
        assert!(pending.is_empty());
        assert!(pending.undo_last().is_none());
    }

    #[test]
    fn search_result_counts_rects() {
        let result = SearchResult {
            query: "test".to_string(),
            page: 1,
            rects: vec![rect(0.0), rect(50.0)],
        };
        assert_eq!(result.count(), 2);
        assert!(!result.is_empty());
        assert!(SearchResult::default().is_empty());
    }
}
