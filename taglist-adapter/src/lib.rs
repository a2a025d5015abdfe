//! A framework-neutral list-box model for the `taglist` crate.
//!
//! The `taglist` crate is UI-agnostic and only keeps tagged entries. This crate provides the
//! list-control workflows adapters usually rebuild on top of it:
//!
//! - Selection modes, caret tracking and change notifications
//! - Lazy selection sync with an injected native control ([`ListHost`])
//! - Sorted insertion and case-insensitive string search by display text
//! - Serializable selection snapshots
//! - The value model of a boolean check-box cell ([`check`])
//!
//! This crate is intentionally framework-agnostic (no win32/gtk bindings).
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

pub mod check;
mod error;
mod host;
mod model;
mod options;
mod state;


pub use error::{Error, Result};
pub use host::{DetachedHost, ListHost};
pub use model::ListModel;
pub use options::{
    DisplayText, ListOptions, SelectionChangedCallback, SelectionMode, TextCompare,
    default_compare,
};
pub use state::{ListState, SelectionChange};
