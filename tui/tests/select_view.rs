#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use rapid_select_core::SelectOption;
use rapid_select_core::WidgetView;
use rapid_select_tui::SelectView;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::WidgetRef;
use serde_json::json;

fn options(count: usize) -> Vec<SelectOption> {
    (0..count)
        .map(|i| SelectOption::new(i.to_string(), format!("opt-{i:02}")))
        .collect()
}

fn empty_view<'a>() -> WidgetView<'a> {
    WidgetView {
        multi: false,
        selection: &[],
        focused_chip: None,
        input: "",
        placeholder: None,
        options: &[],
        cursor: None,
        open: false,
        fetching: false,
        error: None,
        focused: true,
    }
}

/// Render `view` and return the buffer as one string per row.
fn render(view: SelectView<'_>, width: u16, height: u16) -> Vec<String> {
    let area = Rect::new(0, 0, width, height);
    let mut buf = Buffer::empty(area);
    view.render_ref(area, &mut buf);
    (0..area.height)
        .map(|y| {
            (0..area.width)
                .map(|x| buf[(x, y)].symbol().to_string())
                .collect::<String>()
        })
        .collect()
}

#[test]
fn long_result_list_is_windowed_around_the_cursor() {
    let options = options(20);
    let view = WidgetView {
        input: "opt",
        options: &options,
        cursor: Some(15),
        open: true,
        ..empty_view()
    };
    let rows = render(SelectView::new(view), 40, 12);
    let screen = rows.join("\n");

    assert!(screen.contains("› opt-15"), "{screen}");
    assert!(screen.contains("opt-11"), "{screen}");
    assert!(screen.contains("opt-18"), "{screen}");
    assert!(!screen.contains("opt-10"), "{screen}");
    assert!(!screen.contains("opt-19"), "{screen}");
    assert!(rows[2].contains("16/20"), "{screen}");
}

#[test]
fn placeholder_shows_only_without_selection() {
    let view = WidgetView {
        placeholder: Some("Pick a team"),
        fetching: true,
        ..empty_view()
    };
    let rows = render(SelectView::new(view), 40, 4);
    assert!(rows[0].starts_with("No selection"));
    assert!(rows[1].contains("Pick a team"));
    assert!(rows[1].contains("searching…"));

    let selection = vec![SelectOption::new("1", "Core")];
    let view = WidgetView {
        selection: &selection,
        ..empty_view()
    };
    let rows = render(SelectView::new(view), 40, 4);
    assert!(rows[0].contains(" Core "));
    assert!(!rows[1].contains("Pick a team"));
}

#[test]
fn multi_selection_renders_removable_chips() {
    let selection = vec![SelectOption::new("1", "Ann"), SelectOption::new("2", "Bo")];
    let view = WidgetView {
        multi: true,
        selection: &selection,
        focused_chip: Some(1),
        ..empty_view()
    };
    let rows = render(SelectView::new(view), 40, 3);
    assert_eq!(" Ann ×   Bo ×", rows[0].trim_end());
}

#[test]
fn detail_field_and_error_line() {
    let options = vec![SelectOption::new("7", "Ops").with_field("email", json!("ops@example.com"))];
    let view = WidgetView {
        options: &options,
        cursor: Some(0),
        open: true,
        error: Some("HTTP 503"),
        ..empty_view()
    };
    let select_view = SelectView::new(view).with_detail_key(Some("email"));
    assert_eq!(6, select_view.desired_height());

    let rows = render(select_view, 50, 6);
    assert!(rows[3].contains("Ops  ops@example.com"), "{rows:?}");
    assert!(rows[5].starts_with("error: HTTP 503"), "{rows:?}");
}
