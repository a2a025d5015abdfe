/// Errors reported by [`crate::ListModel`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Items(#[from] taglist::Error),

    /// The selection mode is [`crate::SelectionMode::None`].
    #[error("selection is disabled for this list")]
    SelectionDisabled,

    /// The operation needs `MultiSimple` or `MultiExtended`.
    #[error("operation requires a multi-select selection mode")]
    MultiSelectRequired,

    /// Sorted lists choose the position of new items themselves.
    #[error("cannot insert at an explicit index into a sorted list")]
    InsertIntoSorted,
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
