use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;

use crate::error::Result;
use crate::request::FetchToken;
use crate::types::Query;
use crate::types::ResultPage;
use crate::types::SelectOption;

/// Completions from the widget's own timers and fetches. The host drains the
/// receiver and feeds each event back through `SelectWidget::handle_event`, so
/// every state change happens on the host's thread.
#[derive(Debug)]
pub enum WidgetEvent {
    /// The debounce window for `text` closed without further input.
    DebounceElapsed { generation: u64, text: String },

    /// A network fetch finished (or failed). Stale tokens are ignored.
    FetchCompleted {
        token: FetchToken,
        query: Query,
        result: Result<ResultPage>,
    },

    /// The delayed close after losing focus is due.
    BlurElapsed { generation: u64 },
}

pub type WidgetEventReceiver = UnboundedReceiver<WidgetEvent>;

#[derive(Clone, Debug)]
pub struct WidgetEventSender {
    tx: UnboundedSender<WidgetEvent>,
}

impl WidgetEventSender {
    pub fn channel() -> (Self, WidgetEventReceiver) {
        let (tx, rx) = unbounded_channel();
        (Self { tx }, rx)
    }

    /// Send an event back to the widget owner. A closed channel only means the
    /// widget is gone, so the failure is logged and dropped.
    pub fn send(&self, event: WidgetEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::debug!("widget event dropped, receiver closed: {e}");
        }
    }
}

/// Notifications for the host page.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectEvent {
    SelectionChanged(Vec<SelectOption>),
    CursorChanged(usize),
    /// The result list closed without a selection.
    Canceled,
    /// A fetch failed for a reason other than cancellation.
    Error(String),
}

#[derive(Clone, Debug)]
pub struct SelectEventSender {
    tx: UnboundedSender<SelectEvent>,
}

impl SelectEventSender {
    pub fn new(tx: UnboundedSender<SelectEvent>) -> Self {
        Self { tx }
    }

    pub fn channel() -> (Self, UnboundedReceiver<SelectEvent>) {
        let (tx, rx) = unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn send(&self, event: SelectEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::error!("failed to send select event: {e}");
        }
    }
}
