/// Errors reported by [`crate::ItemArray`] and its views.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// An actual or virtual index did not address an entry.
    ///
    /// For virtual indexes, `len` is the number of entries matching the queried mask.
    #[error("index {index} is out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// A [`crate::Cursor`] was advanced after the array it enumerates was structurally modified.
    #[error("collection was modified during enumeration (version {expected} -> {found})")]
    ConcurrentModification { expected: u64, found: u64 },

    /// Every tag bit of the state field has already been handed out.
    #[error("all {max} tag bits are already allocated")]
    TagBitsExhausted { max: u32 },
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
