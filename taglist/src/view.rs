use alloc::vec::Vec;

use crate::{Error, ItemArray, Match, Result, TagMask, TaggedItems};

/// A read-only collection over the entries of an [`ItemArray`] that match a fixed mask.
///
/// A view holds only the mask and a borrow of the array; it never copies storage. Positions
/// within the view are virtual indexes.
#[derive(Debug)]
pub struct TagView<'a, T> {
    array: &'a ItemArray<T>,
    mask: TagMask,
    mode: Match,
}

impl<T> Clone for TagView<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TagView<'_, T> {}

impl<'a, T> TagView<'a, T> {
    pub(crate) fn new(array: &'a ItemArray<T>, mask: TagMask, mode: Match) -> Self {
        Self { array, mask, mode }
    }

    pub fn mask(&self) -> TagMask {
        self.mask
    }

    pub fn array(&self) -> &'a ItemArray<T> {
        self.array
    }

    /// Number of matching entries. Cached by the array until its next structural change.
    pub fn count(&self) -> usize {
        self.array.count_matching(self.mask, self.mode)
    }

    pub fn is_empty(&self) -> bool {
        self.first_index().is_none()
    }

    pub fn iter(&self) -> TaggedItems<'a, T> {
        TaggedItems::new(self.array.iter_tagged(self.mask, self.mode))
    }

    /// Actual indexes of the matching entries, ascending.
    pub fn indices(&self) -> impl Iterator<Item = usize> + use<'a, T> {
        self.array
            .iter_tagged(self.mask, self.mode)
            .map(|(index, _)| index)
    }

    pub fn to_indices(&self) -> Vec<usize> {
        self.indices().collect()
    }

    pub fn get(&self, virtual_index: usize) -> Result<&'a T> {
        let array = self.array;
        match self.actual_index(virtual_index) {
            Some(index) => array.get(index),
            None => Err(Error::IndexOutOfRange {
                index: virtual_index,
                len: self.count(),
            }),
        }
    }

    pub fn actual_index(&self, virtual_index: usize) -> Option<usize> {
        self.array
            .actual_index_matching(virtual_index, self.mask, self.mode)
    }

    pub fn virtual_index(&self, actual_index: usize) -> Option<usize> {
        self.array
            .virtual_index_matching(actual_index, self.mask, self.mode)
    }

    /// Returns `true` if the entry at `actual_index` is part of this view.
    pub fn contains_index(&self, actual_index: usize) -> bool {
        self.array
            .entry(actual_index)
            .is_ok_and(|e| e.matches(self.mask, self.mode))
    }

    pub fn first_index(&self) -> Option<usize> {
        self.indices().next()
    }

    pub fn first(&self) -> Option<&'a T> {
        self.iter().next()
    }
}

impl<T: PartialEq> TagView<'_, T> {
    /// Returns `true` if a matching entry holds a payload equal to `item`.
    pub fn contains(&self, item: &T) -> bool {
        self.iter().any(|x| x == item)
    }

    /// Virtual index of the first matching entry equal to `item`.
    pub fn position(&self, item: &T) -> Option<usize> {
        self.iter().position(|x| x == item)
    }
}

impl<'a, T> IntoIterator for TagView<'a, T> {
    type Item = &'a T;
    type IntoIter = TaggedItems<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
