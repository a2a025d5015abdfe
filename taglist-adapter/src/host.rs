use alloc::collections::BTreeSet;
use alloc::vec::Vec;

/// The native control a [`crate::ListModel`] mirrors.
///
/// The host owns the authoritative selection: users click on the native control, so the model
/// pulls the selection back lazily after [`crate::ListModel::mark_selection_dirty`]. Selection
/// changes made through the model are pushed one index at a time.
///
/// Structural reports default to no-ops for hosts that re-render from the model on their own.
pub trait ListHost {
    /// The indexes currently selected in the native control, in any order.
    fn pull_selection(&mut self) -> Vec<usize>;

    fn push_selection(&mut self, index: usize, selected: bool);

    fn insert_item(&mut self, _index: usize, _text: &str) {}

    fn remove_item(&mut self, _index: usize) {}

    fn set_item_text(&mut self, _index: usize, _text: &str) {}

    fn clear_items(&mut self) {}
}

impl<H: ListHost + ?Sized> ListHost for &mut H {
    fn pull_selection(&mut self) -> Vec<usize> {
        (**self).pull_selection()
    }

    fn push_selection(&mut self, index: usize, selected: bool) {
        (**self).push_selection(index, selected);
    }

    fn insert_item(&mut self, index: usize, text: &str) {
        (**self).insert_item(index, text);
    }

    fn remove_item(&mut self, index: usize) {
        (**self).remove_item(index);
    }

    fn set_item_text(&mut self, index: usize, text: &str) {
        (**self).set_item_text(index, text);
    }

    fn clear_items(&mut self) {
        (**self).clear_items();
    }
}

/// A host without a native counterpart (e.g. before the control is created).
///
/// It keeps the pushed selection and shifts it across inserts and removes the way a native list
/// does, so the model can pull it back unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DetachedHost {
    selected: BTreeSet<usize>,
}

impl DetachedHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates a selection change made directly on the control.
    pub fn select_externally(&mut self, index: usize, selected: bool) {
        self.push_selection(index, selected);
    }

    pub fn selected(&self) -> impl Iterator<Item = usize> + '_ {
        self.selected.iter().copied()
    }
}

impl ListHost for DetachedHost {
    fn pull_selection(&mut self) -> Vec<usize> {
        self.selected.iter().copied().collect()
    }

    fn push_selection(&mut self, index: usize, selected: bool) {
        if selected {
            self.selected.insert(index);
        } else {
            self.selected.remove(&index);
        }
    }

    fn insert_item(&mut self, index: usize, _text: &str) {
        self.selected = self
            .selected
            .iter()
            .map(|&i| if i >= index { i + 1 } else { i })
            .collect();
    }

    fn remove_item(&mut self, index: usize) {
        self.selected = self
            .selected
            .iter()
            .filter(|&&i| i != index)
            .map(|&i| if i > index { i - 1 } else { i })
            .collect();
    }

    fn clear_items(&mut self) {
        self.selected.clear();
    }
}
