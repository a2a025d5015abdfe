use alloc::vec::Vec;

use crate::SelectionMode;

/// Payload of the selection-changed notification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelectionChange {
    /// The lowest selected index, if any.
    pub selected_index: Option<usize>,
    pub selected_count: usize,
}

/// A lightweight, serializable snapshot of a list's selection.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
///
/// This is useful for restoring UI state across sessions (or after reloading items) without
/// coupling the model to any specific UI framework.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListState {
    pub selection_mode: SelectionMode,
    /// Selected actual indexes, ascending.
    pub selected: Vec<usize>,
    pub focused: Option<usize>,
}
