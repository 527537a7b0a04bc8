//! Composition root: wires the debouncer, request controller, cache,
//! pagination, selection and keyboard navigator into one widget.
//!
//! All mutation goes through the transition methods below. Timers and
//! fetches never touch the state directly; they post [`WidgetEvent`]s that the
//! host feeds back through [`SelectWidget::handle_event`].

use std::sync::Arc;

use tracing::debug;
use tracing::trace;
use tracing::warn;

use crate::cache::ResultCache;
use crate::config::SelectConfig;
use crate::debounce::Debouncer;
use crate::debounce::QueryDebouncer;
use crate::error::SelectError;
use crate::event::SelectEvent;
use crate::event::SelectEventSender;
use crate::event::WidgetEvent;
use crate::event::WidgetEventReceiver;
use crate::event::WidgetEventSender;
use crate::navigator::CursorMove;
use crate::navigator::KeyboardNavigator;
use crate::navigator::NavAction;
use crate::navigator::NavContext;
use crate::navigator::SelectKey;
use crate::pagination::PageOutcome;
use crate::pagination::PaginationEngine;
use crate::request::FetchToken;
use crate::request::RequestController;
use crate::selection::SelectMode;
use crate::selection::SelectionModel;
use crate::transport::CompletionPredicate;
use crate::transport::OptionsExtractor;
use crate::transport::OptionsTransport;
use crate::transport::PageLoader;
use crate::types::Query;
use crate::types::ResultPage;
use crate::types::SelectOption;

/// Input-side state owned by the widget itself.
#[derive(Debug, Default)]
struct InputState {
    text: String,
    focused: bool,
    last_error: Option<String>,
}

/// Snapshot of everything a renderer needs.
#[derive(Debug, Clone, Copy)]
pub struct WidgetView<'a> {
    pub multi: bool,
    pub selection: &'a [SelectOption],
    pub focused_chip: Option<usize>,
    pub input: &'a str,
    /// Only present while nothing is selected.
    pub placeholder: Option<&'a str>,
    pub options: &'a [SelectOption],
    pub cursor: Option<usize>,
    pub open: bool,
    pub fetching: bool,
    pub error: Option<&'a str>,
    pub focused: bool,
}

pub struct SelectWidget {
    config: SelectConfig,
    input: InputState,
    selection: SelectionModel,
    pagination: PaginationEngine,
    navigator: KeyboardNavigator,
    requests: RequestController,
    debouncer: QueryDebouncer,
    blur_timer: Debouncer<()>,
    cache: Option<ResultCache>,
    widget_tx: WidgetEventSender,
    notifications: SelectEventSender,
}

impl SelectWidget {
    /// Build a widget. The returned receiver must be drained by the host and
    /// every event passed to [`handle_event`](Self::handle_event).
    pub fn new(
        config: SelectConfig,
        transport: Arc<dyn OptionsTransport>,
        notifications: SelectEventSender,
    ) -> (Self, WidgetEventReceiver) {
        let (widget_tx, widget_rx) = WidgetEventSender::channel();
        let requests = RequestController::new(
            transport,
            PageLoader::from_config(&config),
            widget_tx.clone(),
        )
        .with_timeout(config.request_timeout());
        let mode = if config.multi {
            SelectMode::Multi
        } else {
            SelectMode::Single
        };
        let cache = config
            .cache
            .then(|| ResultCache::new(config.cache_capacity));

        let widget = Self {
            selection: SelectionModel::new(mode),
            pagination: PaginationEngine::new(config.lookahead),
            navigator: KeyboardNavigator::new(),
            input: InputState::default(),
            requests,
            debouncer: QueryDebouncer::new(),
            blur_timer: Debouncer::new(),
            cache,
            widget_tx,
            notifications,
            config,
        };
        (widget, widget_rx)
    }

    /// Replace the default `results` extractor.
    pub fn with_options_extractor(mut self, extractor: OptionsExtractor) -> Self {
        self.requests.loader_mut().set_extractor(extractor);
        self
    }

    /// Replace the default "no `more` flag" completeness check.
    pub fn with_completion_predicate(mut self, is_complete: CompletionPredicate) -> Self {
        self.requests
            .loader_mut()
            .set_completion_predicate(is_complete);
        self
    }

    /// Use a cache handle shared with other widgets. Ignored when caching is
    /// disabled in the config.
    pub fn with_shared_cache(mut self, cache: ResultCache) -> Self {
        if self.config.cache {
            self.cache = Some(cache);
        }
        self
    }

    pub fn config(&self) -> &SelectConfig {
        &self.config
    }

    pub fn selection(&self) -> &[SelectOption] {
        self.selection.current()
    }

    pub fn options(&self) -> &[SelectOption] {
        self.pagination.items()
    }

    pub fn input(&self) -> &str {
        &self.input.text
    }

    pub fn cursor(&self) -> usize {
        self.pagination.cursor()
    }

    pub fn is_open(&self) -> bool {
        !self.pagination.items().is_empty()
    }

    pub fn is_fetching(&self) -> bool {
        self.requests.is_fetching()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.input.last_error.as_deref()
    }

    pub fn cache(&self) -> Option<&ResultCache> {
        self.cache.as_ref()
    }

    pub fn view(&self) -> WidgetView<'_> {
        let open = self.is_open();
        WidgetView {
            multi: self.selection.is_multi(),
            selection: self.selection.current(),
            focused_chip: self.navigator.focused_chip(),
            input: &self.input.text,
            placeholder: self
                .selection
                .is_empty()
                .then_some(self.config.placeholder.as_str()),
            options: self.pagination.items(),
            cursor: open.then(|| self.pagination.cursor()),
            open,
            fetching: self.requests.is_fetching(),
            error: self.input.last_error.as_deref(),
            focused: self.input.focused,
        }
    }

    // ---- host input ---------------------------------------------------

    pub fn handle_key(&mut self, key: SelectKey) {
        if !self.input.focused {
            self.focus();
        }
        let ctx = NavContext {
            multi: self.selection.is_multi(),
            input_empty: self.input.text.is_empty(),
            results_open: self.is_open(),
            selection_len: self.selection.len(),
        };
        let action = self.navigator.on_key(key, ctx);
        trace!(?key, ?action, "key handled");
        match action {
            NavAction::OpenResults => self.schedule_search(),
            NavAction::MoveCursor(direction) => self.move_cursor(direction),
            NavAction::SelectCursor => self.select_index(self.pagination.cursor()),
            NavAction::Close => self.close_results(),
            NavAction::FocusChip(_) | NavAction::None => {}
            NavAction::RemoveChip(index) => self.remove_selection(index),
            NavAction::EditInput(key) => self.edit_input(key),
        }
    }

    /// Replace the input text (paste, programmatic edits). Schedules a search
    /// when the text changed.
    pub fn set_input(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text == self.input.text {
            return;
        }
        self.input.text = text;
        self.on_input_changed();
    }

    pub fn focus(&mut self) {
        self.input.focused = true;
        self.blur_timer.cancel();
    }

    /// Close the results after the blur delay, unless focus returns first.
    pub fn blur(&mut self) {
        self.input.focused = false;
        let tx = self.widget_tx.clone();
        self.blur_timer
            .schedule((), self.config.blur_delay(), move |generation, ()| {
                tx.send(WidgetEvent::BlurElapsed { generation });
            });
    }

    /// Clicking into the input drops chip focus and searches the current text.
    pub fn click_input(&mut self) {
        self.focus();
        self.navigator.reset();
        self.schedule_search();
    }

    /// The dropdown arrow: close when open, search otherwise.
    pub fn toggle_results(&mut self) {
        if self.is_open() {
            self.close_results();
        } else {
            self.schedule_search();
        }
    }

    /// Ask again for the page that failed to load. Look-ahead never does this
    /// on its own.
    pub fn retry_next_page(&mut self) {
        if self.pagination.is_stalled() {
            self.pagination.resume();
            self.maybe_fetch_more();
        }
    }

    /// Move the cursor to `index` (mouse hover or host-driven).
    pub fn set_cursor(&mut self, index: usize) {
        if self.pagination.set_cursor(index) {
            self.notifications
                .send(SelectEvent::CursorChanged(self.pagination.cursor()));
        }
        self.maybe_fetch_more();
    }

    /// Commit the option at `index` of the visible results.
    pub fn select_index(&mut self, index: usize) {
        let Some(option) = self.pagination.items().get(index).cloned() else {
            return;
        };
        self.commit_selection(option);
    }

    pub fn remove_selection(&mut self, index: usize) {
        if self.selection.remove_at(index).is_some() {
            self.after_selection_mutation();
        }
    }

    pub fn remove_option(&mut self, option: &SelectOption) {
        if self.selection.remove(option) {
            self.after_selection_mutation();
        }
    }

    /// Set the selection from the host. Does not emit `SelectionChanged`.
    pub fn set_selection(&mut self, options: Vec<SelectOption>) {
        self.selection.replace_all(options);
        self.pagination.refilter(&self.selection);
        self.input.text.clear();
        self.debouncer.cancel();
    }

    // ---- async completions --------------------------------------------

    pub fn handle_event(&mut self, event: WidgetEvent) {
        match event {
            WidgetEvent::DebounceElapsed { generation, text } => {
                if !self.debouncer.accept(generation) {
                    trace!(generation, "stale debounce fire");
                    return;
                }
                self.fetch_options(Query::first_page(text));
            }
            WidgetEvent::FetchCompleted {
                token,
                query,
                result,
            } => self.on_fetch_completed(token, query, result),
            WidgetEvent::BlurElapsed { generation } => {
                if self.blur_timer.accept(generation) && !self.input.focused {
                    self.close_results();
                }
            }
        }
    }

    // ---- transitions --------------------------------------------------

    fn edit_input(&mut self, key: SelectKey) {
        let changed = match key {
            SelectKey::Char(ch) => {
                self.input.text.push(ch);
                true
            }
            SelectKey::Backspace => self.input.text.pop().is_some(),
            _ => false,
        };
        if changed {
            self.on_input_changed();
        } else if !self.is_open() {
            self.navigator.results_closed();
        }
    }

    fn on_input_changed(&mut self) {
        // Typing starts a new query: whatever was loading is now irrelevant.
        self.requests.cancel();
        self.schedule_search();
    }

    fn schedule_search(&mut self) {
        let tx = self.widget_tx.clone();
        self.debouncer.schedule(
            self.input.text.clone(),
            self.config.quiet_period(),
            move |generation, text| {
                tx.send(WidgetEvent::DebounceElapsed { generation, text });
            },
        );
    }

    /// Serve `query` from the cache or hand it to the request controller.
    fn fetch_options(&mut self, query: Query) {
        if let Some(page) = self.cache.as_ref().and_then(|c| c.get_query(&query)) {
            debug!(key = %query.cache_key(), "cache hit");
            self.requests.cancel();
            self.apply_page(&query, page);
            return;
        }
        self.requests.fetch(query);
    }

    fn on_fetch_completed(
        &mut self,
        token: FetchToken,
        query: Query,
        result: Result<ResultPage, SelectError>,
    ) {
        if !self.requests.finish(token) {
            trace!(generation = token.generation(), "discarding stale response");
            return;
        }
        match result {
            Ok(page) => {
                if let Some(cache) = &self.cache {
                    cache.put_query(&query, page.clone());
                }
                self.apply_page(&query, page);
            }
            Err(SelectError::Cancelled) => {}
            Err(err) => self.on_fetch_failed(&query, err),
        }
    }

    fn apply_page(&mut self, query: &Query, page: ResultPage) {
        let outcome = self
            .pagination
            .record_page(query, page, &self.selection);
        if outcome == PageOutcome::OutOfOrder {
            return;
        }
        self.input.last_error = None;

        if self.is_open() {
            self.navigator.results_opened();
        } else {
            self.navigator.results_closed();
        }
        if outcome == PageOutcome::Replaced && self.is_open() {
            self.notifications.send(SelectEvent::CursorChanged(0));
        }
        self.maybe_fetch_more();
    }

    fn on_fetch_failed(&mut self, query: &Query, err: SelectError) {
        warn!(key = %query.cache_key(), "fetch failed: {err}");
        let message = err.to_string();
        self.input.last_error = Some(message.clone());
        if query.page == 0 {
            self.pagination.reset();
            self.navigator.results_closed();
        } else {
            self.pagination.record_failure(query);
        }
        self.notifications.send(SelectEvent::Error(message));
    }

    fn maybe_fetch_more(&mut self) {
        // A pending debounce means the loaded list is about to be replaced.
        if self.debouncer.is_pending() {
            return;
        }
        // Never let a page advance for the displayed list supersede a fresh
        // search that is still loading.
        if self.requests.in_flight_query().is_some_and(|q| {
            q.page == 0 || Some(q.text.as_str()) != self.pagination.query_text()
        }) {
            return;
        }
        if let Some(next) = self.pagination.next_page_query() {
            self.fetch_options(next);
        }
    }

    fn move_cursor(&mut self, direction: CursorMove) {
        let len = self.pagination.items().len();
        if len == 0 {
            return;
        }
        let current = self.pagination.cursor();
        let next = match direction {
            CursorMove::Next => (current + 1) % len,
            CursorMove::Previous => current.checked_sub(1).unwrap_or(len - 1),
        };
        self.set_cursor(next);
    }

    fn commit_selection(&mut self, option: SelectOption) {
        debug!(id = ?option.id, name = %option.name, "option selected");
        self.selection.add(option);
        self.after_selection_mutation();
    }

    fn after_selection_mutation(&mut self) {
        self.clear_results();
        self.input.text.clear();
        self.notifications.send(SelectEvent::SelectionChanged(
            self.selection.current().to_vec(),
        ));
    }

    /// Close the list without selecting, telling the host if it was open.
    fn close_results(&mut self) {
        let was_open = self.is_open();
        self.clear_results();
        if was_open {
            self.notifications.send(SelectEvent::Canceled);
        }
    }

    fn clear_results(&mut self) {
        self.debouncer.cancel();
        self.requests.cancel();
        self.pagination.reset();
        self.navigator.results_closed();
    }
}
