use core::ops::BitOr;

use crate::{Error, Result};

/// A bit pattern identifying one or more boolean tags across entries.
///
/// The empty mask matches every entry; queries with it address the full, unfiltered array.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TagMask(u32);

impl TagMask {
    pub const EMPTY: Self = Self(0);

    /// Number of tag bits available in an entry's state field.
    ///
    /// The top bit is never handed out so that state values stay representable as non-negative
    /// `i32`s for hosts that store them that way.
    pub const MAX_TAGS: u32 = 31;

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns `true` if `state` satisfies this mask under `mode`.
    pub const fn matches(self, state: u32, mode: Match) -> bool {
        if self.0 == 0 {
            return true;
        }
        match mode {
            Match::All => state & self.0 == self.0,
            Match::Any => state & self.0 != 0,
        }
    }

    pub(crate) const fn apply(self, state: u32, value: bool) -> u32 {
        if value {
            state | self.0
        } else {
            state & !self.0
        }
    }
}

impl BitOr for TagMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// How a multi-bit mask is matched against an entry's state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Match {
    /// Every bit of the mask must be set.
    #[default]
    All,
    /// At least one bit of the mask must be set.
    Any,
}

/// Hands out tag bits, one at a time, for the lifetime of the owning control.
///
/// The registry is never reset: a mask handed out once stays reserved, so two collections built
/// on the same array never share a bit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MaskRegistry {
    next_bit: u32,
}

impl MaskRegistry {
    pub const fn new() -> Self {
        Self { next_bit: 0 }
    }

    /// Allocates the next free tag bit.
    ///
    /// # Panics
    ///
    /// Panics when all [`TagMask::MAX_TAGS`] bits are in use. Running out of tags is a
    /// programming error; use [`MaskRegistry::try_allocate`] to observe it as a value.
    pub fn allocate(&mut self) -> TagMask {
        match self.try_allocate() {
            Ok(mask) => mask,
            Err(err) => panic!("MaskRegistry::allocate: {err}"),
        }
    }

    pub fn try_allocate(&mut self) -> Result<TagMask> {
        if self.next_bit >= TagMask::MAX_TAGS {
            lwarn!(max = TagMask::MAX_TAGS, "MaskRegistry: tag bits exhausted");
            return Err(Error::TagBitsExhausted {
                max: TagMask::MAX_TAGS,
            });
        }
        let mask = TagMask(1 << self.next_bit);
        self.next_bit += 1;
        ltrace!(bits = mask.bits(), "MaskRegistry::allocate");
        Ok(mask)
    }

    /// Number of tags handed out so far.
    pub fn allocated(&self) -> u32 {
        self.next_bit
    }

    pub fn remaining(&self) -> u32 {
        TagMask::MAX_TAGS - self.next_bit
    }

    /// The union of every mask handed out so far.
    pub fn allocated_mask(&self) -> TagMask {
        if self.next_bit == 0 {
            return TagMask::EMPTY;
        }
        TagMask(u32::MAX >> (32 - self.next_bit))
    }
}
