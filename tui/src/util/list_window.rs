//! Which slice of a long result list to draw so the cursor stays in view.

use std::ops::Range;

/// Rows `start..start + len` of a list, chosen so the cursor sits near the
/// middle of the window until the list runs out at either end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ListWindow {
    pub start: usize,
    pub len: usize,
}

impl ListWindow {
    pub(crate) fn anchored(cursor: usize, count: usize, max_rows: usize) -> Self {
        if count == 0 || max_rows == 0 {
            return Self { start: 0, len: 0 };
        }
        let len = max_rows.min(count);
        let start = cursor.saturating_sub(len / 2).min(count - len);
        Self { start, len }
    }

    pub(crate) fn range(self) -> Range<usize> {
        self.start..self.start + self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn short_lists_are_shown_whole() {
        assert_eq!(0..3, ListWindow::anchored(2, 3, 8).range());
        assert_eq!(0..0, ListWindow::anchored(0, 0, 8).range());
    }

    #[test]
    fn cursor_is_centered_in_long_lists() {
        assert_eq!(11..19, ListWindow::anchored(15, 40, 8).range());
    }

    #[test]
    fn window_sticks_to_the_ends() {
        assert_eq!(0..8, ListWindow::anchored(1, 40, 8).range());
        assert_eq!(32..40, ListWindow::anchored(39, 40, 8).range());
    }
}
