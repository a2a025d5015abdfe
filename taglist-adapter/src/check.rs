//! The value side of a data-bound check-box cell.
//!
//! A check-box column stores arbitrary values (`bool`, `"Y"`/`"N"`, `1`/`0`, ...) and renders
//! them as a two- or three-state box. [`CheckCell`] maps between the stored value and a
//! [`CheckState`], and implements the click cycle.

/// The visual state of a check box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CheckState {
    #[default]
    Unchecked,
    Checked,
    Indeterminate,
}

impl CheckState {
    pub fn from_bool(value: Option<bool>) -> Self {
        match value {
            Some(true) => Self::Checked,
            Some(false) => Self::Unchecked,
            None => Self::Indeterminate,
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::Checked => Some(true),
            Self::Unchecked => Some(false),
            Self::Indeterminate => None,
        }
    }
}

/// A check-box cell bound to a value of type `V`.
///
/// An empty cell (`value == None`) shows as indeterminate in three-state cells and unchecked
/// otherwise. Values equal to none of the configured values show as unchecked.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CheckCell<V> {
    pub true_value: V,
    pub false_value: V,
    pub indeterminate_value: Option<V>,
    pub three_state: bool,
    value: Option<V>,
}

impl CheckCell<bool> {
    /// A cell storing `bool`s; the indeterminate state is stored as an empty cell.
    pub fn boolean(three_state: bool) -> Self {
        Self::new(true, false, None, three_state)
    }
}

impl<V: Clone + PartialEq> CheckCell<V> {
    pub fn new(
        true_value: V,
        false_value: V,
        indeterminate_value: Option<V>,
        three_state: bool,
    ) -> Self {
        Self {
            true_value,
            false_value,
            indeterminate_value,
            three_state,
            value: None,
        }
    }

    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    pub fn set_value(&mut self, value: Option<V>) {
        self.value = value;
    }

    pub fn state(&self) -> CheckState {
        let Some(value) = &self.value else {
            return if self.three_state {
                CheckState::Indeterminate
            } else {
                CheckState::Unchecked
            };
        };
        if *value == self.true_value {
            CheckState::Checked
        } else if *value == self.false_value {
            CheckState::Unchecked
        } else if self.three_state && self.indeterminate_value.as_ref() == Some(value) {
            CheckState::Indeterminate
        } else {
            CheckState::Unchecked
        }
    }

    /// Stores the value representing `state`.
    ///
    /// Two-state cells store `Indeterminate` as unchecked.
    pub fn set_state(&mut self, state: CheckState) {
        self.value = match state {
            CheckState::Checked => Some(self.true_value.clone()),
            CheckState::Unchecked => Some(self.false_value.clone()),
            CheckState::Indeterminate if self.three_state => self.indeterminate_value.clone(),
            CheckState::Indeterminate => Some(self.false_value.clone()),
        };
    }

    /// Advances the cell the way a click does and returns the new state.
    ///
    /// Unchecked → Checked → (Indeterminate, three-state only) → Unchecked.
    pub fn toggle(&mut self) -> CheckState {
        let next = match (self.state(), self.three_state) {
            (CheckState::Unchecked, _) => CheckState::Checked,
            (CheckState::Checked, true) => CheckState::Indeterminate,
            (CheckState::Checked, false) => CheckState::Unchecked,
            (CheckState::Indeterminate, _) => CheckState::Unchecked,
        };
        self.set_state(next);
        next
    }
}
