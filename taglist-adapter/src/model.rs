use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::Cell;
use core::cmp::Ordering;

use taglist::{ItemArray, MaskRegistry, TagMask, TagView};

use crate::{
    DetachedHost, Error, ListHost, ListOptions, ListState, Result, SelectionChange,
    SelectionChangedCallback, SelectionMode,
};

/// A headless list-box model.
///
/// This type is intentionally UI-agnostic:
/// - It owns the items and their selection/caret tags, not any UI objects.
/// - Structural changes are reported to the [`ListHost`] as they happen.
/// - Selection changes made on the host side are pulled back lazily: call
///   [`ListModel::mark_selection_dirty`] when the native control reports a change, and the next
///   selection read resynchronizes once.
#[derive(Debug)]
pub struct ListModel<T, H = DetachedHost> {
    items: ItemArray<T>,
    masks: MaskRegistry,
    selected: TagMask,
    caret: TagMask,
    host: H,
    options: ListOptions<T>,
    selection_dirty: bool,

    notify_depth: Cell<usize>,
    notify_pending: Cell<bool>,
}

impl<T> ListModel<T, DetachedHost> {
    /// Creates a model that is not attached to a native control.
    pub fn new(options: ListOptions<T>) -> Self {
        Self::with_host(options, DetachedHost::new())
    }
}

impl<T, H: ListHost> ListModel<T, H> {
    pub fn with_host(options: ListOptions<T>, host: H) -> Self {
        let mut masks = MaskRegistry::new();
        let selected = masks.allocate();
        let caret = masks.allocate();
        adebug!(
            selection_mode = ?options.selection_mode,
            sorted = options.sorted,
            "ListModel::with_host"
        );
        Self {
            items: ItemArray::new(),
            masks,
            selected,
            caret,
            host,
            options,
            selection_dirty: false,
            notify_depth: Cell::new(0),
            notify_pending: Cell::new(false),
        }
    }

    pub fn options(&self) -> &ListOptions<T> {
        &self.options
    }

    pub fn items(&self) -> &ItemArray<T> {
        &self.items
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host.
    ///
    /// Selection changes made directly on the host are not seen until
    /// [`ListModel::mark_selection_dirty`] is called.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// The tag bit marking selected entries in [`ListModel::items`].
    pub fn selected_mask(&self) -> TagMask {
        self.selected
    }

    /// The tag bit marking the caret entry in [`ListModel::items`].
    pub fn caret_mask(&self) -> TagMask {
        self.caret
    }

    /// Tag bits still free for host-defined tags on the same items.
    pub fn remaining_masks(&self) -> u32 {
        self.masks.remaining()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&T> {
        Ok(self.items.get(index)?)
    }

    pub fn iter(&self) -> taglist::Iter<'_, T> {
        self.items.iter()
    }

    pub fn display_text(&self, index: usize) -> Result<String> {
        let item = self.items.get(index)?;
        Ok((self.options.display_text)(item))
    }

    fn text_of(&self, item: &T) -> String {
        (self.options.display_text)(item)
    }

    fn out_of_range(&self, index: usize) -> Error {
        Error::Items(taglist::Error::IndexOutOfRange {
            index,
            len: self.items.len(),
        })
    }

    fn notify_now(&self) {
        if let Some(cb) = &self.options.on_selection_changed {
            cb(self.selection_change());
        }
    }

    fn notify(&self) {
        if self.notify_depth.get() > 0 {
            self.notify_pending.set(true);
            return;
        }
        self.notify_now();
    }

    /// Batches multiple updates into a single selection-changed notification.
    ///
    /// Nested batches coalesce into the outermost one.
    pub fn batch_update<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let depth = self.notify_depth.get();
        self.notify_depth.set(depth.saturating_add(1));

        let out = f(self);

        let depth = self.notify_depth.get();
        debug_assert!(depth > 0, "notify_depth underflow");
        let next = depth.saturating_sub(1);
        self.notify_depth.set(next);

        if next == 0 && self.notify_pending.replace(false) {
            self.notify_now();
        }
        out
    }

    fn selection_change(&self) -> SelectionChange {
        let view = self.items.view(self.selected);
        SelectionChange {
            selected_index: view.first_index(),
            selected_count: view.count(),
        }
    }

    // Items

    /// Adds `item` and returns the index it landed at.
    ///
    /// Unsorted lists append. Sorted lists insert after every item whose display text compares
    /// less than or equal to the new one.
    pub fn add(&mut self, item: T) -> Result<usize> {
        let text = self.text_of(&item);
        let index = if self.options.sorted {
            self.sorted_position(&text)
        } else {
            self.items.len()
        };
        self.items.insert(index, item)?;
        self.host.insert_item(index, &text);
        self.mark_selection_dirty();
        atrace!(index, "ListModel::add");
        Ok(index)
    }

    pub fn add_range(&mut self, items: impl IntoIterator<Item = T>) -> Result<()> {
        self.batch_update(|m| {
            for item in items {
                m.add(item)?;
            }
            Ok(())
        })
    }

    fn sorted_position(&self, text: &str) -> usize {
        let (mut lo, mut hi) = (0usize, self.items.len());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let Ok(item) = self.items.get(mid) else {
                break;
            };
            if (self.options.compare)(&self.text_of(item), text) == Ordering::Greater {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        lo
    }

    /// Inserts `item` at `index`. Sorted lists reject explicit positions.
    pub fn insert(&mut self, index: usize, item: T) -> Result<()> {
        if self.options.sorted {
            return Err(Error::InsertIntoSorted);
        }
        let text = self.text_of(&item);
        self.items.insert(index, item)?;
        self.host.insert_item(index, &text);
        self.mark_selection_dirty();
        atrace!(index, "ListModel::insert");
        Ok(())
    }

    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        self.batch_update(|m| {
            m.sync_selection();
            let was_selected = m.items.get_state(index, m.selected)?;
            let item = m.items.remove_at(index)?;
            m.host.remove_item(index);
            m.mark_selection_dirty();
            atrace!(index, was_selected, "ListModel::remove_at");
            if was_selected {
                m.notify();
            }
            Ok(item)
        })
    }

    pub fn clear(&mut self) {
        self.batch_update(|m| {
            m.sync_selection();
            let had_selection = !m.items.view(m.selected).is_empty();
            m.items.clear();
            m.host.clear_items();
            m.mark_selection_dirty();
            atrace!(had_selection, "ListModel::clear");
            if had_selection {
                m.notify();
            }
        });
    }

    /// Replaces the item at `index`, keeping its selection. Sorted lists are not re-sorted.
    pub fn set_item(&mut self, index: usize, item: T) -> Result<T> {
        let text = self.text_of(&item);
        let prev = self.items.set_item(index, item)?;
        self.host.set_item_text(index, &text);
        Ok(prev)
    }

    // Sorting

    pub fn set_sorted(&mut self, sorted: bool) {
        if self.options.sorted == sorted {
            return;
        }
        self.options.sorted = sorted;
        if sorted {
            self.sort();
        }
    }

    /// Stable-sorts the items by display text and re-sends them to the host.
    ///
    /// Selection and caret follow their entries.
    pub fn sort(&mut self) {
        let before = self.batch_update(|m| {
            m.sync_selection();
            m.selection_change()
        });
        let display = Arc::clone(&self.options.display_text);
        let compare = Arc::clone(&self.options.compare);
        self.items.sort_by(|a, b| compare(&display(a), &display(b)));
        self.resend_items();
        if self.selection_change() != before {
            self.notify();
        }
    }

    fn resend_items(&mut self) {
        self.host.clear_items();
        for (index, item) in self.items.iter().enumerate() {
            let text = (self.options.display_text)(item);
            self.host.insert_item(index, &text);
        }
        for index in self.items.view(self.selected).indices() {
            self.host.push_selection(index, true);
        }
        self.selection_dirty = false;
        adebug!(len = self.items.len(), "ListModel::resend_items");
    }

    pub fn set_display_text(
        &mut self,
        display_text: impl Fn(&T) -> String + Send + Sync + 'static,
    ) {
        self.options.display_text = Arc::new(display_text);
        if self.options.sorted {
            self.sort();
        } else {
            self.sync_selection();
            self.resend_items();
        }
    }

    pub fn set_on_selection_changed(
        &mut self,
        on_selection_changed: Option<impl Fn(SelectionChange) + Send + Sync + 'static>,
    ) {
        self.options.on_selection_changed =
            on_selection_changed.map(|f| Arc::new(f) as SelectionChangedCallback);
    }

    pub fn set_options(&mut self, options: ListOptions<T>) {
        let mode_changed = self.options.selection_mode != options.selection_mode;
        let becomes_sorted = options.sorted && !self.options.sorted;
        let order_changed = !Arc::ptr_eq(&self.options.display_text, &options.display_text)
            || !Arc::ptr_eq(&self.options.compare, &options.compare);
        let text_changed = !Arc::ptr_eq(&self.options.display_text, &options.display_text);

        self.batch_update(|m| {
            if mode_changed {
                m.clear_selected();
            }
            m.options = options;
            atrace!(
                selection_mode = ?m.options.selection_mode,
                sorted = m.options.sorted,
                "ListModel::set_options"
            );
            if m.options.sorted && (becomes_sorted || order_changed) {
                m.sort();
            } else if text_changed {
                m.sync_selection();
                m.resend_items();
            }
        });
    }

    /// Clones the current options, applies `f`, then delegates to `set_options`.
    pub fn update_options(&mut self, f: impl FnOnce(&mut ListOptions<T>)) {
        let mut next = self.options.clone();
        f(&mut next);
        self.set_options(next);
    }

    // Search

    /// Finds the first item whose display text starts with `prefix`, ignoring case.
    ///
    /// The search starts after `start` (or at the first item when `None`) and wraps around, so
    /// `start` itself is checked last. An empty list yields `None` for any `start`.
    pub fn find_string(&self, prefix: &str, start: Option<usize>) -> Result<Option<usize>> {
        let prefix = prefix.to_lowercase();
        self.find(start, |text| text.starts_with(&prefix))
    }

    /// Like [`ListModel::find_string`], but the whole display text must match.
    pub fn find_string_exact(&self, text: &str, start: Option<usize>) -> Result<Option<usize>> {
        let text = text.to_lowercase();
        self.find(start, |candidate| candidate == text)
    }

    fn find(&self, start: Option<usize>, matches: impl Fn(&str) -> bool) -> Result<Option<usize>> {
        let len = self.items.len();
        if len == 0 {
            return Ok(None);
        }
        if let Some(start) = start {
            if start >= len {
                return Err(self.out_of_range(start));
            }
        }
        let first = start.map_or(0, |s| (s + 1) % len);
        for offset in 0..len {
            let index = (first + offset) % len;
            let item = self.items.get(index)?;
            if matches(&self.text_of(item).to_lowercase()) {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    // Selection

    pub fn selection_mode(&self) -> SelectionMode {
        self.options.selection_mode
    }

    /// Changes the selection mode. The current selection is cleared.
    pub fn set_selection_mode(&mut self, mode: SelectionMode) {
        if self.options.selection_mode == mode {
            return;
        }
        self.batch_update(|m| {
            m.clear_selected();
            m.options.selection_mode = mode;
        });
    }

    /// Flags the selection as possibly out of date with the host.
    ///
    /// Call this when the native control reports a selection change. The pull happens on the next
    /// selection read, once.
    pub fn mark_selection_dirty(&mut self) {
        self.selection_dirty = true;
    }

    pub fn is_selection_dirty(&self) -> bool {
        self.selection_dirty
    }

    /// Pulls the selection from the host if it was marked dirty.
    ///
    /// Returns `true` if the host was consulted.
    pub fn sync_selection(&mut self) -> bool {
        if !self.selection_dirty {
            return false;
        }
        self.selection_dirty = false;

        let len = self.items.len();
        let mut wanted = alloc::vec![false; len];
        for index in self.host.pull_selection() {
            match wanted.get_mut(index) {
                Some(slot) => *slot = true,
                None => {
                    awarn!(index, len, "ListModel: host index past the end");
                }
            }
        }

        let mut changed = false;
        for (index, value) in wanted.into_iter().enumerate() {
            changed |= self
                .items
                .set_state(index, self.selected, value)
                .unwrap_or(false);
        }
        adebug!(changed, "ListModel::sync_selection");
        if changed {
            self.notify();
        }
        true
    }

    /// A view over the selected entries, in item order.
    pub fn selection(&mut self) -> TagView<'_, T> {
        self.sync_selection();
        self.items.view(self.selected)
    }

    pub fn selected_indices(&mut self) -> Vec<usize> {
        self.selection().to_indices()
    }

    pub fn selected_items(&mut self) -> Vec<&T> {
        self.selection().iter().collect()
    }

    pub fn selected_count(&mut self) -> usize {
        self.selection().count()
    }

    /// The lowest selected index.
    pub fn selected_index(&mut self) -> Option<usize> {
        self.selection().first_index()
    }

    pub fn selected_item(&mut self) -> Option<&T> {
        self.selection().first()
    }

    pub fn is_selected(&mut self, index: usize) -> Result<bool> {
        self.sync_selection();
        Ok(self.items.get_state(index, self.selected)?)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.items.len() {
            return Err(self.out_of_range(index));
        }
        Ok(())
    }

    fn apply_selected(&mut self, index: usize, value: bool) -> Result<()> {
        if self.items.set_state(index, self.selected, value)? {
            self.host.push_selection(index, value);
            self.notify();
        }
        Ok(())
    }

    /// Selects or deselects the item at `index`.
    ///
    /// In [`SelectionMode::One`] selecting an item deselects the previous one. Selecting moves the
    /// caret to `index`.
    pub fn set_selected(&mut self, index: usize, value: bool) -> Result<()> {
        if self.options.selection_mode == SelectionMode::None {
            return Err(Error::SelectionDisabled);
        }
        self.check_index(index)?;

        self.batch_update(|m| {
            m.sync_selection();
            if value && m.options.selection_mode == SelectionMode::One {
                let others: Vec<usize> = m
                    .items
                    .view(m.selected)
                    .indices()
                    .filter(|&i| i != index)
                    .collect();
                for other in others {
                    m.apply_selected(other, false)?;
                }
            }
            m.apply_selected(index, value)?;
            if value {
                m.move_caret(index)?;
            }
            Ok(())
        })
    }

    /// Selects `index` alone, or clears the selection for `None`.
    pub fn set_selected_index(&mut self, index: Option<usize>) -> Result<()> {
        let Some(index) = index else {
            self.clear_selected();
            return Ok(());
        };
        if self.options.selection_mode == SelectionMode::None {
            return Err(Error::SelectionDisabled);
        }
        self.check_index(index)?;
        self.batch_update(|m| {
            if m.options.selection_mode.is_multi() {
                m.clear_selected();
            }
            m.set_selected(index, true)
        })
    }

    pub fn clear_selected(&mut self) {
        self.batch_update(|m| {
            m.sync_selection();
            let selected = m.items.view(m.selected).to_indices();
            for index in selected {
                if m.items.set_state(index, m.selected, false).unwrap_or(false) {
                    m.host.push_selection(index, false);
                    m.notify();
                }
            }
        });
    }

    /// Selects every item. Only available in multi-select modes.
    pub fn select_all(&mut self) -> Result<()> {
        if !self.options.selection_mode.is_multi() {
            return Err(Error::MultiSelectRequired);
        }
        self.batch_update(|m| {
            m.sync_selection();
            for index in 0..m.items.len() {
                m.apply_selected(index, true)?;
            }
            Ok(())
        })
    }

    // Caret

    /// The caret (focused) index. The caret follows its entry across inserts, removes and sorts.
    pub fn focused_index(&self) -> Option<usize> {
        self.items.view(self.caret).first_index()
    }

    pub fn set_focused_index(&mut self, index: Option<usize>) -> Result<()> {
        match index {
            Some(index) => self.move_caret(index),
            None => {
                self.items.clear_state(self.caret);
                Ok(())
            }
        }
    }

    fn move_caret(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        if self.items.get_state(index, self.caret)? {
            return Ok(());
        }
        self.items.clear_state(self.caret);
        self.items.set_state(index, self.caret, true)?;
        Ok(())
    }

    // Snapshots

    pub fn state(&mut self) -> ListState {
        ListState {
            selection_mode: self.options.selection_mode,
            selected: self.selected_indices(),
            focused: self.focused_index(),
        }
    }

    /// Restores a snapshot taken with [`ListModel::state`].
    ///
    /// Restoring fails on indexes past the current item count; the selection applied before the
    /// failing index is kept.
    pub fn restore_state(&mut self, state: &ListState) -> Result<()> {
        self.batch_update(|m| {
            m.set_selection_mode(state.selection_mode);
            m.clear_selected();
            for &index in &state.selected {
                m.set_selected(index, true)?;
            }
            m.set_focused_index(state.focused)
        })
    }
}

impl<T: PartialEq, H: ListHost> ListModel<T, H> {
    pub fn contains(&self, item: &T) -> bool {
        self.items.iter().any(|x| x == item)
    }

    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.items.iter().position(|x| x == item)
    }

    /// Removes the first item equal to `item`.
    pub fn remove(&mut self, item: &T) -> Option<T> {
        let index = self.index_of(item)?;
        self.remove_at(index).ok()
    }
}
