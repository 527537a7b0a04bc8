use std::sync::Arc;

use crossterm::event::Event;
use crossterm::event::EventStream;
use futures::StreamExt;
use rapid_select_core::OptionsTransport;
use rapid_select_core::SelectConfig;
use rapid_select_core::SelectEvent;
use rapid_select_core::SelectEventSender;
use rapid_select_core::SelectOption;
use rapid_select_core::SelectWidget;
use rapid_select_core::WidgetEvent;
use rapid_select_core::WidgetEventReceiver;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;
use tracing::info;

use crate::key_map::KeyIntent;
use crate::key_map::map_key;
use crate::select_view::SelectView;
use crate::tui::Tui;

/// How the session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum AppExit {
    /// Ctrl+D with the selection at that moment.
    Accepted(Vec<SelectOption>),
    /// Ctrl+C, or the terminal went away.
    Aborted,
}

/// One wakeup of the event loop.
enum Step {
    Terminal(Option<std::io::Result<Event>>),
    Widget(WidgetEvent),
    Notification(SelectEvent),
}

pub(crate) struct App {
    widget: SelectWidget,
    widget_rx: WidgetEventReceiver,
    notes_rx: UnboundedReceiver<SelectEvent>,
    detail_key: Option<String>,
}

impl App {
    pub(crate) fn new(config: SelectConfig, transport: Arc<dyn OptionsTransport>) -> Self {
        let detail_key = config.detail_key.clone();
        let (notifications, notes_rx) = SelectEventSender::channel();
        let (mut widget, widget_rx) = SelectWidget::new(config, transport, notifications);
        widget.focus();
        Self {
            widget,
            widget_rx,
            notes_rx,
            detail_key,
        }
    }

    pub(crate) async fn run(mut self, terminal: &mut Tui) -> anyhow::Result<AppExit> {
        let mut events = EventStream::new();
        loop {
            self.draw(terminal)?;
            let step = tokio::select! {
                event = events.next() => Step::Terminal(event),
                Some(event) = self.widget_rx.recv() => Step::Widget(event),
                Some(note) = self.notes_rx.recv() => Step::Notification(note),
            };
            match step {
                Step::Terminal(None) => return Ok(AppExit::Aborted),
                Step::Terminal(Some(event)) => {
                    if let Some(exit) = self.on_terminal_event(event?) {
                        return Ok(exit);
                    }
                }
                Step::Widget(event) => self.widget.handle_event(event),
                Step::Notification(note) => self.on_notification(note),
            }
        }
    }

    fn draw(&self, terminal: &mut Tui) -> std::io::Result<()> {
        terminal.draw(|frame| {
            let area = frame.area();
            let view = SelectView::new(self.widget.view())
                .with_detail_key(self.detail_key.as_deref());
            let cursor = view.cursor_position(area);
            frame.render_widget_ref(view, area);
            if self.widget.view().focused {
                frame.set_cursor_position(cursor);
            }
        })?;
        Ok(())
    }

    fn on_terminal_event(&mut self, event: Event) -> Option<AppExit> {
        match event {
            Event::Key(key) => match map_key(&key) {
                KeyIntent::Widget(key) => self.widget.handle_key(key),
                KeyIntent::Blur => self.widget.blur(),
                KeyIntent::Accept => {
                    return Some(AppExit::Accepted(self.widget.selection().to_vec()));
                }
                KeyIntent::Abort => return Some(AppExit::Aborted),
                KeyIntent::Ignore => {}
            },
            Event::Paste(text) => {
                self.widget.focus();
                let pasted = text.replace(['\r', '\n'], " ");
                let input = format!("{}{pasted}", self.widget.input());
                self.widget.set_input(input);
            }
            Event::FocusGained => self.widget.focus(),
            Event::FocusLost => self.widget.blur(),
            Event::Mouse(_) | Event::Resize(_, _) => {}
        }
        None
    }

    fn on_notification(&mut self, note: SelectEvent) {
        match note {
            SelectEvent::SelectionChanged(selection) => {
                info!(count = selection.len(), "selection changed");
            }
            SelectEvent::CursorChanged(cursor) => debug!(cursor, "cursor moved"),
            SelectEvent::Canceled => debug!("results closed without a selection"),
            // Already logged by the widget and shown on the error line.
            SelectEvent::Error(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use async_trait::async_trait;
    use crossterm::event::KeyCode;
    use crossterm::event::KeyEvent;
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use serde_json::json;
    use std::time::Duration;

    struct Canned;

    #[async_trait]
    impl OptionsTransport for Canned {
        async fn get(&self, _url: &str) -> rapid_select_core::Result<Value> {
            Ok(json!({"results": [{"id": 1, "name": "Alpha"}, {"id": 2, "name": "Beta"}]}))
        }
    }

    fn app() -> App {
        App::new(SelectConfig::with_endpoint("q="), Arc::new(Canned))
    }

    fn press(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Option<AppExit> {
        app.on_terminal_event(Event::Key(KeyEvent::new(code, modifiers)))
    }

    async fn settle(app: &mut App) {
        while let Ok(Some(event)) =
            tokio::time::timeout(Duration::from_secs(5), app.widget_rx.recv()).await
        {
            app.widget.handle_event(event);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ctrl_c_aborts_and_ctrl_d_accepts() {
        let mut app = app();
        assert_eq!(
            Some(AppExit::Aborted),
            press(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL)
        );
        assert_eq!(
            Some(AppExit::Accepted(Vec::new())),
            press(&mut app, KeyCode::Char('d'), KeyModifiers::CONTROL)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn typed_search_then_enter_is_accepted() {
        let mut app = app();
        press(&mut app, KeyCode::Char('b'), KeyModifiers::NONE);
        settle(&mut app).await;
        press(&mut app, KeyCode::Down, KeyModifiers::NONE);
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);

        assert_eq!(
            Some(AppExit::Accepted(vec![SelectOption::new("2", "Beta")])),
            press(&mut app, KeyCode::Char('d'), KeyModifiers::CONTROL)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn tab_blurs_and_typing_refocuses() {
        let mut app = app();
        press(&mut app, KeyCode::Tab, KeyModifiers::NONE);
        assert!(!app.widget.view().focused);
        press(&mut app, KeyCode::Char('x'), KeyModifiers::NONE);
        assert!(app.widget.view().focused);
    }

    #[tokio::test(start_paused = true)]
    async fn paste_appends_single_line_text() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'), KeyModifiers::NONE);
        app.on_terminal_event(Event::Paste("b\nc".to_string()));
        assert_eq!("ab c", app.widget.input());
    }
}
