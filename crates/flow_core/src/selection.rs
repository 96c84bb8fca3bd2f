use std::collections::BTreeSet;

use shared::domain::{SelectAllState, StudentId};

/// Row checkboxes of the defaulter table and the set they feed.
///
/// The selected set only ever holds IDs of known rows, so the select-all
/// tri-state can be derived from counts alone.
#[derive(Debug, Clone)]
pub struct StudentSelection {
    rows: Vec<StudentId>,
    selected: BTreeSet<StudentId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkAction {
    pub enabled: bool,
    pub label: String,
}

impl StudentSelection {
    pub fn new(rows: impl IntoIterator<Item = StudentId>) -> Self {
        let mut rows: Vec<StudentId> = rows.into_iter().collect();
        let mut seen = BTreeSet::new();
        rows.retain(|id| seen.insert(id.clone()));
        Self {
            rows,
            selected: BTreeSet::new(),
        }
    }

    pub fn set_all(&mut self, checked: bool) {
        if checked {
            self.selected = self.rows.iter().cloned().collect();
        } else {
            self.selected.clear();
        }
    }

    /// Returns false for IDs that are not in the table.
    pub fn set(&mut self, id: &StudentId, checked: bool) -> bool {
        if !self.rows.contains(id) {
            return false;
        }
        if checked {
            self.selected.insert(id.clone());
        } else {
            self.selected.remove(id);
        }
        true
    }

    pub fn is_selected(&self, id: &StudentId) -> bool {
        self.selected.contains(id)
    }

    pub fn rows(&self) -> &[StudentId] {
        &self.rows
    }

    pub fn selected(&self) -> Vec<StudentId> {
        self.selected.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn total(&self) -> usize {
        self.rows.len()
    }

    pub fn select_all_state(&self) -> SelectAllState {
        SelectAllState::from_counts(self.selected.len(), self.rows.len())
    }

    pub fn bulk_action(&self) -> BulkAction {
        if self.selected.is_empty() {
            BulkAction {
                enabled: false,
                label: "Send Bulk Reminders".to_string(),
            }
        } else {
            BulkAction {
                enabled: true,
                label: format!("Send Reminders ({})", self.selected.len()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection(n: usize) -> StudentSelection {
        StudentSelection::new((1..=n).map(|i| StudentId(format!("student{i}"))))
    }

    #[test]
    fn select_all_marks_every_row() {
        let mut sel = selection(4);
        sel.set_all(true);
        assert_eq!(sel.len(), sel.total());
        assert!(sel.rows().iter().all(|id| sel.is_selected(id)));
        assert_eq!(sel.select_all_state(), SelectAllState::Checked);

        sel.set_all(false);
        assert!(sel.is_empty());
        assert_eq!(sel.select_all_state(), SelectAllState::Unchecked);
    }

    #[test]
    fn partial_selection_is_indeterminate() {
        let mut sel = selection(3);
        for k in 1..3 {
            sel.set(&StudentId(format!("student{k}")), true);
            assert_eq!(sel.select_all_state(), SelectAllState::Indeterminate);
        }
        sel.set(&StudentId::from("student3"), true);
        assert_eq!(sel.select_all_state(), SelectAllState::Checked);
    }

    #[test]
    fn unknown_rows_are_rejected() {
        let mut sel = selection(2);
        assert!(!sel.set(&StudentId::from("ghost"), true));
        assert!(sel.is_empty());
    }

    #[test]
    fn duplicate_rows_collapse() {
        let sel = StudentSelection::new(vec![
            StudentId::from("a"),
            StudentId::from("a"),
            StudentId::from("b"),
        ]);
        assert_eq!(sel.total(), 2);
    }

    #[test]
    fn bulk_button_label_tracks_selection() {
        let mut sel = selection(3);
        assert_eq!(
            sel.bulk_action(),
            BulkAction {
                enabled: false,
                label: "Send Bulk Reminders".into()
            }
        );
        sel.set(&StudentId::from("student2"), true);
        sel.set(&StudentId::from("student3"), true);
        assert_eq!(sel.bulk_action().label, "Send Reminders (2)");
        assert!(sel.bulk_action().enabled);
    }
}
