use crate::{Error, ItemArray, Match, Result, TagMask};

/// A detached, version-checked enumeration over an [`ItemArray`].
///
/// Unlike [`ItemArray::iter_tagged`], a cursor does not borrow the array between steps, so the
/// owner may mutate the array while an enumeration is in flight. The next step then fails with
/// [`Error::ConcurrentModification`] and the cursor stays failed until [`Cursor::reset`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cursor {
    mask: TagMask,
    mode: Match,
    position: usize,
    version: u64,
}

impl Cursor {
    pub(crate) fn new(mask: TagMask, mode: Match, version: u64) -> Self {
        Self {
            mask,
            mode,
            position: 0,
            version,
        }
    }

    pub fn mask(&self) -> TagMask {
        self.mask
    }

    /// The array version this cursor was started against.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Advances to the next matching entry and returns `(actual_index, item)`, or `None` at the
    /// end of the array.
    pub fn advance<'a, T>(&mut self, array: &'a ItemArray<T>) -> Result<Option<(usize, &'a T)>> {
        if array.version() != self.version {
            lwarn!(
                expected = self.version,
                found = array.version(),
                "Cursor: array modified during enumeration"
            );
            return Err(Error::ConcurrentModification {
                expected: self.version,
                found: array.version(),
            });
        }
        while self.position < array.len() {
            let index = self.position;
            self.position += 1;
            let Some(entry) = array.entry_at(index) else {
                continue;
            };
            if entry.matches(self.mask, self.mode) {
                return Ok(Some((index, entry.item())));
            }
        }
        Ok(None)
    }

    /// Restarts the enumeration from the first entry against the array's current version.
    pub fn reset<T>(&mut self, array: &ItemArray<T>) {
        self.position = 0;
        self.version = array.version();
    }
}
