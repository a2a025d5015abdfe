use slotmap::new_key_type;

use crate::{Match, TagMask};

new_key_type! {
    /// A stable handle to an entry of an [`crate::ItemArray`].
    ///
    /// Handles survive inserts, removals and sorts of other entries. Once the entry is removed
    /// its handle never resolves again, even if the underlying slot is reused.
    pub struct EntryId;
}

/// One stored payload plus its tag-state bit vector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry<T> {
    pub(crate) item: T,
    pub(crate) state: u32,
}

impl<T> Entry<T> {
    pub(crate) fn new(item: T) -> Self {
        Self { item, state: 0 }
    }

    pub fn item(&self) -> &T {
        &self.item
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    pub fn has(&self, mask: TagMask) -> bool {
        mask.matches(self.state, Match::All)
    }

    pub fn matches(&self, mask: TagMask, mode: Match) -> bool {
        mask.matches(self.state, mode)
    }
}
