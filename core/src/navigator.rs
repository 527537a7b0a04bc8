//! Keyboard state machine for the widget.
//!
//! ```text
//! Idle --char--> Browsing --Escape/blur/select--> Idle
//! Idle --Backspace, empty input, multi, no results--> ChipFocused
//! ChipFocused --Backspace--> Idle (chip removed)
//! ChipFocused --other key--> Idle (chip kept, key handled normally)
//! ```

/// Transport-neutral keys the widget reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectKey {
    Char(char),
    Backspace,
    Enter,
    Escape,
    Up,
    Down,
    /// Ctrl+N: open, or next result.
    CtrlN,
    /// Ctrl+P: previous result.
    CtrlP,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavState {
    #[default]
    Idle,
    Browsing,
    ChipFocused(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMove {
    Next,
    Previous,
}

/// What the widget should do in response to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    /// Search for the current input (debounced).
    OpenResults,
    MoveCursor(CursorMove),
    SelectCursor,
    /// Close the open result list without selecting.
    Close,
    FocusChip(usize),
    RemoveChip(usize),
    /// Let the text input handle the key.
    EditInput(SelectKey),
    None,
}

/// Facts about the widget the navigator needs for one key.
#[derive(Debug, Clone, Copy, Default)]
pub struct NavContext {
    pub multi: bool,
    pub input_empty: bool,
    pub results_open: bool,
    pub selection_len: usize,
}

#[derive(Debug, Clone, Default)]
pub struct KeyboardNavigator {
    state: NavState,
}

impl KeyboardNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    pub fn focused_chip(&self) -> Option<usize> {
        match self.state {
            NavState::ChipFocused(index) => Some(index),
            _ => None,
        }
    }

    pub fn on_key(&mut self, key: SelectKey, ctx: NavContext) -> NavAction {
        if ctx.multi && key == SelectKey::Backspace && ctx.input_empty {
            return self.on_chip_backspace(ctx);
        }

        if let NavState::ChipFocused(_) = self.state {
            self.state = NavState::Idle;
        }

        match key {
            SelectKey::Enter | SelectKey::Down | SelectKey::CtrlN if !ctx.results_open => {
                self.state = NavState::Browsing;
                NavAction::OpenResults
            }
            SelectKey::Enter => NavAction::SelectCursor,
            SelectKey::Down | SelectKey::CtrlN => NavAction::MoveCursor(CursorMove::Next),
            SelectKey::Up | SelectKey::CtrlP if ctx.results_open => {
                NavAction::MoveCursor(CursorMove::Previous)
            }
            SelectKey::Escape if ctx.results_open => {
                self.state = NavState::Idle;
                NavAction::Close
            }
            SelectKey::Char(_) | SelectKey::Backspace => {
                self.state = NavState::Browsing;
                NavAction::EditInput(key)
            }
            _ => NavAction::None,
        }
    }

    fn on_chip_backspace(&mut self, ctx: NavContext) -> NavAction {
        if ctx.results_open {
            self.state = NavState::Idle;
            return NavAction::Close;
        }
        match self.state {
            NavState::ChipFocused(index) => {
                self.state = NavState::Idle;
                NavAction::RemoveChip(index)
            }
            _ if ctx.selection_len > 0 => {
                let last = ctx.selection_len - 1;
                self.state = NavState::ChipFocused(last);
                NavAction::FocusChip(last)
            }
            _ => NavAction::None,
        }
    }

    pub fn results_opened(&mut self) {
        self.state = NavState::Browsing;
    }

    pub fn results_closed(&mut self) {
        if self.state == NavState::Browsing {
            self.state = NavState::Idle;
        }
    }

    pub fn reset(&mut self) {
        self.state = NavState::Idle;
    }
}
