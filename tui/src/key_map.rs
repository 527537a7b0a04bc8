use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use rapid_select_core::SelectKey;

/// What a terminal key means to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyIntent {
    /// Forward to the widget.
    Widget(SelectKey),
    /// Move focus away from the input.
    Blur,
    /// Ctrl+D: finish and print the selection.
    Accept,
    /// Ctrl+C: quit without output.
    Abort,
    Ignore,
}

pub fn map_key(event: &KeyEvent) -> KeyIntent {
    if event.kind == KeyEventKind::Release {
        return KeyIntent::Ignore;
    }
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    match event.code {
        KeyCode::Char('c') if ctrl => KeyIntent::Abort,
        KeyCode::Char('d') if ctrl => KeyIntent::Accept,
        KeyCode::Char('n') if ctrl => KeyIntent::Widget(SelectKey::CtrlN),
        KeyCode::Char('p') if ctrl => KeyIntent::Widget(SelectKey::CtrlP),
        KeyCode::Char(_) if ctrl || event.modifiers.contains(KeyModifiers::ALT) => {
            KeyIntent::Widget(SelectKey::Other)
        }
        KeyCode::Char(ch) => KeyIntent::Widget(SelectKey::Char(ch)),
        KeyCode::Backspace => KeyIntent::Widget(SelectKey::Backspace),
        KeyCode::Enter => KeyIntent::Widget(SelectKey::Enter),
        KeyCode::Esc => KeyIntent::Widget(SelectKey::Escape),
        KeyCode::Up => KeyIntent::Widget(SelectKey::Up),
        KeyCode::Down => KeyIntent::Widget(SelectKey::Down),
        KeyCode::Tab | KeyCode::BackTab => KeyIntent::Blur,
        _ => KeyIntent::Widget(SelectKey::Other),
    }
}
