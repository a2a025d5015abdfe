use alloc::vec::Vec;
use core::cell::Cell;
use core::cmp::Ordering;

use slotmap::SlotMap;

use crate::entry::{Entry, EntryId};
use crate::{Cursor, Error, Match, Result, TagMask, TagView};

#[derive(Clone, Copy, Debug)]
struct CountCache {
    mask: TagMask,
    mode: Match,
    version: u64,
    count: usize,
}

/// An ordered, resizable sequence of tagged entries.
///
/// Insertion order defines the actual index space. Each entry carries a `u32` state whose bits
/// are tags handed out by a [`crate::MaskRegistry`]; a tag partitions the array into a virtual
/// subsequence addressed by virtual indexes.
///
/// Every structural mutation (add, insert, remove, clear, replace, sort, effective state change)
/// bumps [`ItemArray::version`] by exactly one. Detached [`Cursor`]s compare against it to
/// detect modification during enumeration.
///
/// Virtual → actual index translation is a linear scan; no auxiliary index is maintained.
#[derive(Clone, Debug)]
pub struct ItemArray<T> {
    entries: SlotMap<EntryId, Entry<T>>,
    order: Vec<EntryId>,
    version: u64,
    count_cache: Cell<Option<CountCache>>,
}

impl<T> Default for ItemArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ItemArray<T> {
    pub fn new() -> Self {
        Self {
            entries: SlotMap::with_key(),
            order: Vec::new(),
            version: 0,
            count_cache: Cell::new(None),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: SlotMap::with_capacity_and_key(capacity),
            order: Vec::with_capacity(capacity),
            version: 0,
            count_cache: Cell::new(None),
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The structural version. Starts at zero and only ever grows.
    pub fn version(&self) -> u64 {
        self.version
    }

    fn touch(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    fn out_of_range(&self, index: usize) -> Error {
        Error::IndexOutOfRange {
            index,
            len: self.order.len(),
        }
    }

    fn entry_id_at(&self, index: usize) -> Result<EntryId> {
        self.order
            .get(index)
            .copied()
            .ok_or_else(|| self.out_of_range(index))
    }

    pub(crate) fn entry_at(&self, index: usize) -> Option<&Entry<T>> {
        let id = *self.order.get(index)?;
        self.entries.get(id)
    }

    fn entry_at_mut(&mut self, index: usize) -> Result<&mut Entry<T>> {
        let id = self.entry_id_at(index)?;
        let len = self.order.len();
        self.entries
            .get_mut(id)
            .ok_or(Error::IndexOutOfRange { index, len })
    }

    /// Appends `item` and returns its handle.
    pub fn add(&mut self, item: T) -> EntryId {
        let id = self.entries.insert(Entry::new(item));
        self.order.push(id);
        self.touch();
        ltrace!(
            index = self.order.len() - 1,
            version = self.version,
            "ItemArray::add"
        );
        id
    }

    pub fn add_range(&mut self, items: impl IntoIterator<Item = T>) {
        let items = items.into_iter();
        self.order.reserve(items.size_hint().0);
        for item in items {
            self.add(item);
        }
    }

    /// Inserts `item` at `index`, shifting later entries up.
    ///
    /// `index == len()` appends.
    pub fn insert(&mut self, index: usize, item: T) -> Result<EntryId> {
        if index > self.order.len() {
            return Err(self.out_of_range(index));
        }
        let id = self.entries.insert(Entry::new(item));
        self.order.insert(index, id);
        self.touch();
        ltrace!(index, version = self.version, "ItemArray::insert");
        Ok(id)
    }

    /// Removes the entry at `index`, shifting later entries down, and returns its payload.
    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        let id = self.entry_id_at(index)?;
        self.order.remove(index);
        let entry = self.entries.remove(id);
        debug_assert!(entry.is_some(), "ItemArray: order references a dead entry");
        debug_assert_eq!(self.entries.len(), self.order.len());
        self.touch();
        ltrace!(index, version = self.version, "ItemArray::remove_at");
        entry.map(|e| e.item).ok_or(Error::IndexOutOfRange {
            index,
            len: self.order.len(),
        })
    }

    /// Removes the entry addressed by `id`. Returns `None` for stale handles.
    pub fn remove_entry(&mut self, id: EntryId) -> Option<T> {
        let index = self.index_of_entry(id)?;
        self.remove_at(index).ok()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.entries.clear();
        self.touch();
        ltrace!(version = self.version, "ItemArray::clear");
    }

    pub fn get(&self, index: usize) -> Result<&T> {
        self.entry_at(index)
            .map(|e| &e.item)
            .ok_or_else(|| self.out_of_range(index))
    }

    /// Mutable access to a payload. In-place payload edits are not structural and do not bump
    /// the version.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        self.entry_at_mut(index).map(|e| &mut e.item)
    }

    pub fn entry(&self, index: usize) -> Result<&Entry<T>> {
        self.entry_at(index).ok_or_else(|| self.out_of_range(index))
    }

    /// Replaces the payload at `index`, keeping the entry's handle and state bits.
    pub fn set_item(&mut self, index: usize, item: T) -> Result<T> {
        let entry = self.entry_at_mut(index)?;
        let prev = core::mem::replace(&mut entry.item, item);
        self.touch();
        ltrace!(index, version = self.version, "ItemArray::set_item");
        Ok(prev)
    }

    pub fn entry_id(&self, index: usize) -> Result<EntryId> {
        self.entry_id_at(index)
    }

    /// Actual index of the entry addressed by `id`. Linear scan.
    pub fn index_of_entry(&self, id: EntryId) -> Option<usize> {
        self.order.iter().position(|&e| e == id)
    }

    pub fn resolve(&self, id: EntryId) -> Option<&T> {
        self.entries.get(id).map(|e| &e.item)
    }

    pub fn resolve_entry(&self, id: EntryId) -> Option<&Entry<T>> {
        self.entries.get(id)
    }

    /// Translates a virtual index within the entries matching all bits of `mask` into an actual
    /// index. Returns `None` if fewer than `virtual_index + 1` entries match.
    pub fn get_actual_index(&self, virtual_index: usize, mask: TagMask) -> Option<usize> {
        self.actual_index_matching(virtual_index, mask, Match::All)
    }

    pub fn actual_index_matching(
        &self,
        virtual_index: usize,
        mask: TagMask,
        mode: Match,
    ) -> Option<usize> {
        if mask.is_empty() {
            return (virtual_index < self.order.len()).then_some(virtual_index);
        }
        self.iter_tagged(mask, mode)
            .nth(virtual_index)
            .map(|(index, _)| index)
    }

    /// The inverse of [`ItemArray::get_actual_index`]. Returns `None` if the entry at
    /// `actual_index` does not match `mask` (or does not exist).
    pub fn get_virtual_index(&self, actual_index: usize, mask: TagMask) -> Option<usize> {
        self.virtual_index_matching(actual_index, mask, Match::All)
    }

    pub fn virtual_index_matching(
        &self,
        actual_index: usize,
        mask: TagMask,
        mode: Match,
    ) -> Option<usize> {
        let entry = self.entry_at(actual_index)?;
        if !entry.matches(mask, mode) {
            return None;
        }
        Some(
            self.order[..actual_index]
                .iter()
                .filter_map(|&id| self.entries.get(id))
                .filter(|e| e.matches(mask, mode))
                .count(),
        )
    }

    /// The payload at `virtual_index` within the entries matching `mask`.
    pub fn get_item(&self, virtual_index: usize, mask: TagMask) -> Result<&T> {
        match self.get_actual_index(virtual_index, mask) {
            Some(index) => self.get(index),
            None => Err(Error::IndexOutOfRange {
                index: virtual_index,
                len: self.get_count(mask),
            }),
        }
    }

    /// Number of entries matching all bits of `mask`.
    ///
    /// The empty mask returns the total count in `O(1)`. Other masks scan the array once per
    /// version; the result is cached until the next structural change.
    pub fn get_count(&self, mask: TagMask) -> usize {
        self.count_matching(mask, Match::All)
    }

    pub fn count_matching(&self, mask: TagMask, mode: Match) -> usize {
        if mask.is_empty() {
            return self.order.len();
        }
        if let Some(cache) = self.count_cache.get() {
            if cache.mask == mask && cache.mode == mode && cache.version == self.version {
                return cache.count;
            }
        }
        let count = self.iter_tagged(mask, mode).count();
        self.count_cache.set(Some(CountCache {
            mask,
            mode,
            version: self.version,
            count,
        }));
        count
    }

    pub fn state(&self, index: usize) -> Result<u32> {
        self.entry(index).map(|e| e.state)
    }

    /// Returns `true` if the entry at `index` has every bit of `mask` set.
    pub fn get_state(&self, index: usize, mask: TagMask) -> Result<bool> {
        self.entry(index).map(|e| e.has(mask))
    }

    /// Sets or clears the bits of `mask` on the entry at `index`.
    ///
    /// Returns whether the state changed. The version is bumped only for effective changes.
    pub fn set_state(&mut self, index: usize, mask: TagMask, value: bool) -> Result<bool> {
        let entry = self.entry_at_mut(index)?;
        let next = mask.apply(entry.state, value);
        if next == entry.state {
            return Ok(false);
        }
        entry.state = next;
        self.touch();
        ltrace!(index, bits = mask.bits(), value, "ItemArray::set_state");
        Ok(true)
    }

    /// Clears the bits of `mask` on every entry. Returns how many entries changed.
    pub fn clear_state(&mut self, mask: TagMask) -> usize {
        let mut changed = 0usize;
        for &id in &self.order {
            if let Some(entry) = self.entries.get_mut(id) {
                let next = mask.apply(entry.state, false);
                if next != entry.state {
                    entry.state = next;
                    changed += 1;
                }
            }
        }
        if changed > 0 {
            self.touch();
            ltrace!(bits = mask.bits(), changed, "ItemArray::clear_state");
        }
        changed
    }

    /// Stable-sorts the entries with `compare`. Entries that compare equal keep their relative
    /// order. Handles and state bits travel with their entries.
    pub fn sort_by(&mut self, mut compare: impl FnMut(&T, &T) -> Ordering) {
        let entries = &self.entries;
        self.order.sort_by(|a, b| match (entries.get(*a), entries.get(*b)) {
            (Some(a), Some(b)) => compare(&a.item, &b.item),
            _ => Ordering::Equal,
        });
        self.touch();
        ldebug!(
            len = self.order.len(),
            version = self.version,
            "ItemArray::sort_by"
        );
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            entries: &self.entries,
            ids: self.order.iter(),
        }
    }

    /// Iterates `(actual_index, item)` pairs of the entries matching `mask`, in insertion order.
    pub fn iter_tagged(&self, mask: TagMask, mode: Match) -> Tagged<'_, T> {
        Tagged {
            entries: &self.entries,
            ids: self.order.iter().enumerate(),
            mask,
            mode,
        }
    }

    /// A borrowed view over the entries matching all bits of `mask`.
    pub fn view(&self, mask: TagMask) -> TagView<'_, T> {
        TagView::new(self, mask, Match::All)
    }

    pub fn view_matching(&self, mask: TagMask, mode: Match) -> TagView<'_, T> {
        TagView::new(self, mask, mode)
    }

    /// A detached enumeration that can be advanced across `&mut` borrows of the array and fails
    /// with [`Error::ConcurrentModification`] once the array changed.
    pub fn cursor(&self, mask: TagMask, mode: Match) -> Cursor {
        Cursor::new(mask, mode, self.version)
    }
}

impl<T> FromIterator<T> for ItemArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = Self::new();
        array.add_range(iter);
        array
    }
}

impl<T> Extend<T> for ItemArray<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.add_range(iter);
    }
}

impl<'a, T> IntoIterator for &'a ItemArray<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over every payload of an [`ItemArray`], in insertion order.
#[derive(Debug)]
pub struct Iter<'a, T> {
    entries: &'a SlotMap<EntryId, Entry<T>>,
    ids: core::slice::Iter<'a, EntryId>,
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries,
            ids: self.ids.clone(),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let entries = self.entries;
        self.ids.find_map(|&id| entries.get(id)).map(|e| &e.item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.ids.len()))
    }
}

/// Iterator over the `(actual_index, item)` pairs of the entries matching a mask.
#[derive(Debug)]
pub struct Tagged<'a, T> {
    entries: &'a SlotMap<EntryId, Entry<T>>,
    ids: core::iter::Enumerate<core::slice::Iter<'a, EntryId>>,
    mask: TagMask,
    mode: Match,
}

impl<T> Clone for Tagged<'_, T> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries,
            ids: self.ids.clone(),
            mask: self.mask,
            mode: self.mode,
        }
    }
}

impl<'a, T> Iterator for Tagged<'a, T> {
    type Item = (usize, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let entries = self.entries;
        let (mask, mode) = (self.mask, self.mode);
        self.ids.find_map(|(index, &id)| {
            let entry = entries.get(id)?;
            entry.matches(mask, mode).then_some((index, &entry.item))
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.ids.size_hint().1)
    }
}

/// Iterator over the payloads of the entries matching a mask.
#[derive(Debug)]
pub struct TaggedItems<'a, T> {
    inner: Tagged<'a, T>,
}

impl<'a, T> TaggedItems<'a, T> {
    pub(crate) fn new(inner: Tagged<'a, T>) -> Self {
        Self { inner }
    }
}

impl<'a, T> Iterator for TaggedItems<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, item)| item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
