//! A headless item store with bitmask-tagged virtual views.
//!
//! For a list-box style model (selection modes, sorted insertion, host synchronization), see the
//! `taglist-adapter` crate.
//!
//! This crate focuses on the bookkeeping behind selectable list controls: an ordered array of
//! entries, each carrying a small bit vector of tag states (e.g. "selected"), and cheap views
//! that expose the entries matching a tag as their own collection without copying storage.
//!
//! It is UI-agnostic. A TUI/GUI layer is expected to provide:
//! - the payload values and their display text
//! - tag masks for the properties it tracks (allocated from a [`MaskRegistry`])
//! - synchronization with whatever native control owns the authoritative selection
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod array;
mod cursor;
mod entry;
mod error;
mod mask;
mod view;

#[cfg(test)]
mod tests;

pub use array::{ItemArray, Iter, Tagged, TaggedItems};
pub use cursor::Cursor;
pub use entry::{Entry, EntryId};
pub use error::{Error, Result};
pub use mask::{MaskRegistry, Match, TagMask};
pub use view::TagView;
