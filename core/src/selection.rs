use crate::types::SelectOption;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectMode {
    #[default]
    Single,
    Multi,
}

/// Ordered, identity-unique set of chosen options.
#[derive(Debug, Clone, Default)]
pub struct SelectionModel {
    mode: SelectMode,
    items: Vec<SelectOption>,
}

impl SelectionModel {
    pub fn new(mode: SelectMode) -> Self {
        Self {
            mode,
            items: Vec::new(),
        }
    }

    pub fn mode(&self) -> SelectMode {
        self.mode
    }

    pub fn is_multi(&self) -> bool {
        self.mode == SelectMode::Multi
    }

    /// Single mode replaces the selection; multi mode appends unless an
    /// option with the same identity is already present. Returns whether the
    /// selection changed.
    pub fn add(&mut self, option: SelectOption) -> bool {
        match self.mode {
            SelectMode::Single => {
                if self.items.len() == 1 && self.items[0] == option {
                    return false;
                }
                self.items = vec![option];
                true
            }
            SelectMode::Multi => {
                if self.contains(&option) {
                    return false;
                }
                self.items.push(option);
                true
            }
        }
    }

    pub fn remove(&mut self, option: &SelectOption) -> bool {
        let before = self.items.len();
        self.items.retain(|item| !item.same_identity(option));
        self.items.len() != before
    }

    pub fn remove_at(&mut self, index: usize) -> Option<SelectOption> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn pop(&mut self) -> Option<SelectOption> {
        self.items.pop()
    }

    pub fn current(&self) -> &[SelectOption] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, option: &SelectOption) -> bool {
        self.items.iter().any(|item| item.same_identity(option))
    }

    /// Drop options that are already selected.
    pub fn filter(&self, options: Vec<SelectOption>) -> Vec<SelectOption> {
        if self.items.is_empty() {
            return options;
        }
        options
            .into_iter()
            .filter(|option| !self.contains(option))
            .collect()
    }

    /// Replace the whole selection, keeping first occurrences. Single mode
    /// keeps only the first option.
    pub fn replace_all(&mut self, options: Vec<SelectOption>) {
        self.items.clear();
        for option in options {
            if self.mode == SelectMode::Single && !self.items.is_empty() {
                break;
            }
            if !self.contains(&option) {
                self.items.push(option);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn opt(id: &str) -> SelectOption {
        SelectOption::new(id, format!("Option {id}"))
    }

    #[test]
    fn single_mode_keeps_only_latest() {
        let mut selection = SelectionModel::new(SelectMode::Single);
        assert!(selection.add(opt("1")));
        assert!(selection.add(opt("2")));
        assert_eq!(&[opt("2")], selection.current());
    }

    #[test]
    fn multi_mode_preserves_insertion_order() {
        let mut selection = SelectionModel::new(SelectMode::Multi);
        selection.add(opt("2"));
        selection.add(opt("1"));
        assert_eq!(&[opt("2"), opt("1")], selection.current());
    }

    #[test]
    fn multi_mode_deduplicates_by_id() {
        let mut selection = SelectionModel::new(SelectMode::Multi);
        selection.add(opt("1"));
        assert!(!selection.add(SelectOption::new("1", "renamed")));
        assert_eq!(1, selection.len());
    }

    #[test]
    fn remove_by_identity() {
        let mut selection = SelectionModel::new(SelectMode::Multi);
        selection.add(opt("1"));
        selection.add(opt("2"));
        assert!(selection.remove(&SelectOption::new("1", "whatever")));
        assert!(!selection.remove(&opt("9")));
        assert_eq!(&[opt("2")], selection.current());
        assert_eq!(Some(opt("2")), selection.remove_at(0));
        assert_eq!(None, selection.remove_at(0));
    }

    #[test]
    fn filter_excludes_selected_ids() {
        let mut selection = SelectionModel::new(SelectMode::Multi);
        selection.add(opt("42"));
        let filtered = selection.filter(vec![opt("41"), opt("42"), opt("43")]);
        assert_eq!(vec![opt("41"), opt("43")], filtered);
    }

    #[test]
    fn filter_without_ids_uses_structural_equality() {
        let mut selection = SelectionModel::new(SelectMode::Multi);
        let red = SelectOption::anonymous("Red").with_field("hex", json!("#f00"));
        selection.add(red.clone());
        let other_red = SelectOption::anonymous("Red").with_field("hex", json!("#e00"));
        let filtered = selection.filter(vec![red, other_red.clone()]);
        assert_eq!(vec![other_red], filtered);
    }

    #[test]
    fn replace_all_respects_mode() {
        let mut single = SelectionModel::new(SelectMode::Single);
        single.replace_all(vec![opt("1"), opt("2")]);
        assert_eq!(&[opt("1")], single.current());

        let mut multi = SelectionModel::new(SelectMode::Multi);
        multi.replace_all(vec![opt("1"), opt("2"), opt("1")]);
        assert_eq!(&[opt("1"), opt("2")], multi.current());
    }
}
