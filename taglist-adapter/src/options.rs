use alloc::string::{String, ToString};
use alloc::sync::Arc;
use core::cmp::Ordering;
use core::fmt;

use crate::SelectionChange;

/// Produces the display text of an item. Sorting and string search operate on this text.
pub type DisplayText<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// Compares two display texts for sorting.
///
/// Hosts typically supply a locale-aware comparison here; [`default_compare`] is a
/// case-insensitive fallback.
pub type TextCompare = Arc<dyn Fn(&str, &str) -> Ordering + Send + Sync>;

/// A callback fired when the set of selected indexes changes.
pub type SelectionChangedCallback = Arc<dyn Fn(SelectionChange) + Send + Sync>;

/// How many entries may be selected at once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SelectionMode {
    /// Nothing can be selected.
    None,
    /// At most one entry is selected.
    #[default]
    One,
    /// Any number of entries; each click toggles one entry.
    MultiSimple,
    /// Any number of entries; the host extends ranges with modifier keys.
    MultiExtended,
}

impl SelectionMode {
    pub fn is_multi(self) -> bool {
        matches!(self, Self::MultiSimple | Self::MultiExtended)
    }
}

/// Case-insensitive comparison, falling back to ordinal order for texts that only differ in case.
pub fn default_compare(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded.then_with(|| a.cmp(b))
}

/// Configuration for [`crate::ListModel`].
///
/// Cheap to clone: closures are stored in `Arc`s.
pub struct ListOptions<T> {
    pub display_text: DisplayText<T>,
    pub compare: TextCompare,
    pub selection_mode: SelectionMode,
    /// Keeps items ordered by display text. New items are inserted at their sorted position.
    pub sorted: bool,
    pub on_selection_changed: Option<SelectionChangedCallback>,
}

impl<T> Clone for ListOptions<T> {
    fn clone(&self) -> Self {
        Self {
            display_text: Arc::clone(&self.display_text),
            compare: Arc::clone(&self.compare),
            selection_mode: self.selection_mode,
            sorted: self.sorted,
            on_selection_changed: self.on_selection_changed.clone(),
        }
    }
}

impl<T> fmt::Debug for ListOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListOptions")
            .field("selection_mode", &self.selection_mode)
            .field("sorted", &self.sorted)
            .field(
                "on_selection_changed",
                &self.on_selection_changed.as_ref().map(|_| ".."),
            )
            .finish_non_exhaustive()
    }
}

impl<T: fmt::Display + 'static> ListOptions<T> {
    /// Options for items rendered through their `Display` impl.
    pub fn new() -> Self {
        Self::with_display_text(|item: &T| item.to_string())
    }
}

impl<T: fmt::Display + 'static> Default for ListOptions<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ListOptions<T> {
    /// Options with a custom display text.
    pub fn with_display_text(display_text: impl Fn(&T) -> String + Send + Sync + 'static) -> Self {
        Self {
            display_text: Arc::new(display_text),
            compare: Arc::new(default_compare),
            selection_mode: SelectionMode::default(),
            sorted: false,
            on_selection_changed: None,
        }
    }

    pub fn selection_mode(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = mode;
        self
    }

    pub fn sorted(mut self, sorted: bool) -> Self {
        self.sorted = sorted;
        self
    }

    pub fn compare(
        mut self,
        compare: impl Fn(&str, &str) -> Ordering + Send + Sync + 'static,
    ) -> Self {
        self.compare = Arc::new(compare);
        self
    }

    pub fn on_selection_changed(
        mut self,
        on_selection_changed: impl Fn(SelectionChange) + Send + Sync + 'static,
    ) -> Self {
        self.on_selection_changed = Some(Arc::new(on_selection_changed));
        self
    }
}
