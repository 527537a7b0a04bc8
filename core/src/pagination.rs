use tracing::debug;
use tracing::warn;

use crate::config::DEFAULT_LOOKAHEAD;
use crate::selection::SelectionModel;
use crate::types::Query;
use crate::types::ResultPage;
use crate::types::SelectOption;

/// What [`PaginationEngine::record_page`] did with a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// Page 0: the list was replaced and the cursor reset.
    Replaced,
    /// A later page was appended.
    Appended,
    /// A later page came back empty; the query is treated as exhausted.
    Exhausted,
    /// The page does not follow the loaded ones and was dropped.
    OutOfOrder,
}

/// Loaded results for the active query text, the last loaded page, the
/// cursor, and whether more pages exist.
#[derive(Debug, Clone)]
pub struct PaginationEngine {
    lookahead: usize,
    query: Option<String>,
    page: u32,
    complete: bool,
    /// The next page failed to load. Look-ahead stays off until a new
    /// first page arrives or the host calls [`PaginationEngine::resume`].
    stalled: bool,
    cursor: usize,
    items: Vec<SelectOption>,
}

impl PaginationEngine {
    pub fn new(lookahead: usize) -> Self {
        Self {
            lookahead,
            query: None,
            page: 0,
            complete: false,
            stalled: false,
            cursor: 0,
            items: Vec::new(),
        }
    }

    /// True when more pages exist and `cursor` is within `lookahead` rows of
    /// the end of `loaded` results.
    pub fn should_fetch_more(&self, cursor: usize, loaded: usize) -> bool {
        !self.complete && cursor + self.lookahead > loaded
    }

    /// The next page to request for the current cursor, if look-ahead is due.
    pub fn next_page_query(&self) -> Option<Query> {
        let text = self.query.as_ref()?;
        if self.stalled
            || self.items.is_empty() || !self.should_fetch_more(self.cursor, self.items.len()) {
            return None;
        }
        Some(Query::new(text.clone(), self.page.saturating_add(1)))
    }

    /// Merge a page into the loaded results. Items already in `selection` are
    /// filtered out before they become visible.
    pub fn record_page(
        &mut self,
        query: &Query,
        page: ResultPage,
        selection: &SelectionModel,
    ) -> PageOutcome {
        let ResultPage { items, complete } = page;

        if query.page == 0 {
            self.items = selection.filter(items);
            self.query = Some(query.text.clone());
            self.page = 0;
            self.cursor = 0;
            self.complete = complete;
            self.stalled = false;
            debug!(key = %query.cache_key(), loaded = self.items.len(), complete, "results replaced");
            return PageOutcome::Replaced;
        }

        let follows = self.query.as_deref() == Some(query.text.as_str())
            && query.page == self.page.saturating_add(1);
        if !follows {
            debug!(key = %query.cache_key(), page = self.page, "dropping out-of-order page");
            return PageOutcome::OutOfOrder;
        }

        if items.is_empty() {
            if !complete {
                warn!(
                    key = %query.cache_key(),
                    "empty page without completion flag; treating query as exhausted"
                );
            }
            self.complete = true;
            return PageOutcome::Exhausted;
        }

        self.items.extend(selection.filter(items));
        self.page = query.page;
        self.complete = complete;
        debug!(key = %query.cache_key(), loaded = self.items.len(), complete, "results appended");
        PageOutcome::Appended
    }

    /// Note that `query` failed. When it was the next page of the loaded
    /// results, stop look-ahead so the failure is not re-requested on every
    /// cursor move.
    pub fn record_failure(&mut self, query: &Query) -> bool {
        let next = self.query.as_deref() == Some(query.text.as_str())
            && query.page == self.page.saturating_add(1);
        if next {
            debug!(key = %query.cache_key(), "next page failed; look-ahead stalled");
            self.stalled = true;
        }
        next
    }

    /// Re-enable look-ahead after a failed page.
    pub fn resume(&mut self) {
        self.stalled = false;
    }

    pub fn is_stalled(&self) -> bool {
        self.stalled
    }

    /// Move the cursor, clamped to the loaded results. Returns whether it moved.
    pub fn set_cursor(&mut self, cursor: usize) -> bool {
        let cursor = cursor.min(self.items.len().saturating_sub(1));
        if cursor == self.cursor {
            return false;
        }
        self.cursor = cursor;
        true
    }

    /// Drop items that became selected and keep the cursor in range.
    pub fn refilter(&mut self, selection: &SelectionModel) {
        self.items.retain(|item| !selection.contains(item));
        self.cursor = self.cursor.min(self.items.len().saturating_sub(1));
    }

    /// Forget the loaded results and the active query.
    pub fn reset(&mut self) {
        self.query = None;
        self.page = 0;
        self.complete = false;
        self.stalled = false;
        self.cursor = 0;
        self.items.clear();
    }

    pub fn items(&self) -> &[SelectOption] {
        &self.items
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn query_text(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn lookahead(&self) -> usize {
        self.lookahead
    }
}

impl Default for PaginationEngine {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKAHEAD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::SelectMode;
    use pretty_assertions::assert_eq;

    fn options(range: std::ops::Range<usize>) -> Vec<SelectOption> {
        range
            .map(|i| SelectOption::new(i.to_string(), format!("Item {i}")))
            .collect()
    }

    fn loaded(count: usize, complete: bool) -> PaginationEngine {
        let mut engine = PaginationEngine::new(20);
        engine.record_page(
            &Query::first_page("x"),
            ResultPage::new(options(0..count), complete),
            &SelectionModel::default(),
        );
        engine
    }

    #[test]
    fn look_ahead_threshold() {
        let engine = loaded(25, false);
        assert!(!engine.should_fetch_more(4, 25));
        assert!(!engine.should_fetch_more(5, 25));
        assert!(engine.should_fetch_more(6, 25));
    }

    #[test]
    fn complete_query_never_fetches_more() {
        let engine = loaded(25, true);
        assert!(!engine.should_fetch_more(24, 25));
        assert_eq!(None, engine.next_page_query());
    }

    #[test]
    fn next_page_follows_cursor() {
        let mut engine = loaded(25, false);
        assert!(engine.set_cursor(4));
        assert_eq!(None, engine.next_page_query());
        assert!(engine.set_cursor(6));
        assert_eq!(Some(Query::new("x", 1)), engine.next_page_query());
    }

    #[test]
    fn short_first_page_is_due_for_more_immediately() {
        let engine = loaded(5, false);
        assert_eq!(Some(Query::new("x", 1)), engine.next_page_query());
    }

    #[test]
    fn appended_pages_advance_and_recompute_completion() {
        let mut engine = loaded(25, false);
        let outcome = engine.record_page(
            &Query::new("x", 1),
            ResultPage::new(options(25..30), true),
            &SelectionModel::default(),
        );
        assert_eq!(PageOutcome::Appended, outcome);
        assert_eq!(30, engine.items().len());
        assert_eq!(1, engine.page());
        assert!(engine.is_complete());
    }

    #[test]
    fn empty_non_final_page_is_terminal() {
        let mut engine = loaded(25, false);
        engine.set_cursor(10);
        let outcome = engine.record_page(
            &Query::new("x", 1),
            ResultPage::new(Vec::new(), false),
            &SelectionModel::default(),
        );
        assert_eq!(PageOutcome::Exhausted, outcome);
        assert_eq!(0, engine.page());
        assert_eq!(25, engine.items().len());
        assert!(engine.is_complete());
        assert_eq!(None, engine.next_page_query());
    }

    #[test]
    fn failed_next_page_stalls_until_resumed_or_replaced() {
        let mut engine = loaded(5, false);
        assert!(!engine.record_failure(&Query::new("other", 1)));
        assert!(engine.record_failure(&Query::new("x", 1)));
        assert!(engine.is_stalled());
        assert_eq!(None, engine.next_page_query());
        assert!(engine.set_cursor(4));
        assert_eq!(None, engine.next_page_query());

        engine.resume();
        assert_eq!(Some(Query::new("x", 1)), engine.next_page_query());

        engine.record_failure(&Query::new("x", 1));
        engine.record_page(
            &Query::first_page("x"),
            ResultPage::new(options(0..5), false),
            &SelectionModel::default(),
        );
        assert!(!engine.is_stalled());
        assert_eq!(Some(Query::new("x", 1)), engine.next_page_query());
    }

    #[test]
    fn pages_must_be_monotonic() {
        let mut engine = loaded(25, false);
        let skipped = engine.record_page(
            &Query::new("x", 2),
            ResultPage::new(options(50..55), false),
            &SelectionModel::default(),
        );
        assert_eq!(PageOutcome::OutOfOrder, skipped);
        let other_text = engine.record_page(
            &Query::new("y", 1),
            ResultPage::new(options(50..55), false),
            &SelectionModel::default(),
        );
        assert_eq!(PageOutcome::OutOfOrder, other_text);
        assert_eq!(25, engine.items().len());
    }

    #[test]
    fn page_zero_resets_cursor_and_filters_selection() {
        let mut engine = loaded(25, false);
        engine.set_cursor(12);
        let mut selection = SelectionModel::new(SelectMode::Multi);
        selection.add(SelectOption::new("1", "Item 1"));
        engine.record_page(
            &Query::first_page("y"),
            ResultPage::new(options(0..3), false),
            &selection,
        );
        assert_eq!(0, engine.cursor());
        assert_eq!(Some("y"), engine.query_text());
        assert_eq!(options(0..1).into_iter().chain(options(2..3)).collect::<Vec<_>>(), engine.items());
    }

    #[test]
    fn cursor_is_clamped() {
        let mut engine = loaded(3, true);
        assert!(engine.set_cursor(99));
        assert_eq!(2, engine.cursor());
        assert!(!engine.set_cursor(2));
    }
}
