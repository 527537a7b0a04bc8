use ratatui::buffer::Buffer;
use ratatui::layout::Constraint;
use ratatui::layout::Layout;
use ratatui::layout::Position;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Widget;
use ratatui::widgets::WidgetRef;
use rapid_select_core::SelectOption;
use rapid_select_core::WidgetView;
use unicode_width::UnicodeWidthStr;

use crate::util::list_window::ListWindow;

/// Maximum number of result rows drawn at once.
pub(crate) const MAX_RESULT_ROWS: usize = 8;

const INPUT_PROMPT: &str = "› ";

/// Draws one [`WidgetView`]: the chip row, the input line, the result list
/// and the last error.
pub struct SelectView<'a> {
    view: WidgetView<'a>,
    detail_key: Option<&'a str>,
}

impl<'a> SelectView<'a> {
    pub fn new(view: WidgetView<'a>) -> Self {
        Self {
            view,
            detail_key: None,
        }
    }

    /// Show `option[key]` next to each option name.
    pub fn with_detail_key(mut self, key: Option<&'a str>) -> Self {
        self.detail_key = key;
        self
    }

    pub fn desired_height(&self) -> u16 {
        2 + self.list_height() + u16::from(self.view.error.is_some())
    }

    /// Result rows plus the border.
    fn list_height(&self) -> u16 {
        if self.view.open {
            self.view.options.len().min(MAX_RESULT_ROWS) as u16 + 2
        } else {
            0
        }
    }

    /// Where the terminal cursor belongs when the view is drawn in `area`.
    pub fn cursor_position(&self, area: Rect) -> Position {
        let offset = (INPUT_PROMPT.width() + self.view.input.width()) as u16;
        Position::new(
            area.x.saturating_add(offset).min(area.right().saturating_sub(1)),
            area.y.saturating_add(1),
        )
    }

    fn chip_line(&self) -> Line<'a> {
        if self.view.selection.is_empty() {
            return Line::from("No selection".dim());
        }
        let mut spans: Vec<Span<'a>> = Vec::new();
        for (idx, option) in self.view.selection.iter().enumerate() {
            if idx > 0 {
                spans.push(" ".into());
            }
            let label = if self.view.multi {
                format!(" {} × ", option.name)
            } else {
                format!(" {} ", option.name)
            };
            let chip = if self.view.focused_chip == Some(idx) {
                Span::styled(label, Style::default().fg(Color::Black).bg(Color::Yellow))
            } else {
                Span::styled(
                    label,
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::REVERSED),
                )
            };
            spans.push(chip);
        }
        Line::from(spans)
    }

    fn input_line(&self) -> Line<'a> {
        let mut spans: Vec<Span<'a>> = vec![INPUT_PROMPT.bold()];
        match self.view.placeholder {
            Some(placeholder) if self.view.input.is_empty() && !placeholder.is_empty() => {
                spans.push(placeholder.dim().italic());
            }
            _ => spans.push(Span::from(self.view.input)),
        }
        if self.view.fetching {
            spans.push("  searching…".dim());
        }
        Line::from(spans)
    }

    fn option_line(&self, option: &'a SelectOption, selected: bool) -> Line<'a> {
        let marker = if selected { "› " } else { "  " };
        let mut spans = vec![Span::from(marker), Span::from(option.name.as_str())];
        if let Some(detail) = self.detail_key.and_then(|key| option.field_text(key)) {
            spans.push(format!("  {detail}").dim());
        }
        let line = Line::from(spans);
        if selected {
            line.style(Style::default().fg(Color::Black).bg(Color::White))
        } else {
            line
        }
    }

    fn render_results(&self, area: Rect, buf: &mut Buffer) {
        let options = self.view.options;
        let cursor = self.view.cursor.unwrap_or(0);
        let window = ListWindow::anchored(cursor, options.len(), MAX_RESULT_ROWS);
        let lines: Vec<Line<'a>> = window
            .range()
            .map(|idx| self.option_line(&options[idx], idx == cursor))
            .collect();
        let title = format!(" {}/{} ", cursor + 1, options.len());
        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .title(title)
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .render(area, buf);
    }
}

impl WidgetRef for SelectView<'_> {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        let [chips, input, results, error, _] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(self.list_height()),
            Constraint::Length(u16::from(self.view.error.is_some())),
            Constraint::Min(0),
        ])
        .areas(area);

        self.chip_line().render(chips, buf);
        self.input_line().render(input, buf);
        if self.view.open {
            self.render_results(results, buf);
        }
        if let Some(message) = self.view.error {
            Line::from(format!("error: {message}").red()).render(error, buf);
        }
    }
}
