//! A user's vote on a marker, modelled as an explicit state machine.
//!
//! ```text
//! NoRow --save(v)--> Active(v) --clear--> Inactive{retained: v}
//!                        ^                        |
//!                        +--- save(v') / reactivate
//! ```
//!
//! Clearing never discards the value: the row keeps it and reactivation
//! restores it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::marker::DEFAULT_VOTE;

/// A vote between 1 and 10 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct VoteValue(u8);

impl VoteValue {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn new(value: i64) -> Result<Self, CoreError> {
        match u8::try_from(value) {
            Ok(n) if (Self::MIN..=Self::MAX).contains(&n) => Ok(Self(n)),
            _ => Err(CoreError::Validation(format!(
                "Vote must be {}–{}, got {value}",
                Self::MIN,
                Self::MAX
            ))),
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Every valid value, ascending. Used to build 1–10 dropdowns.
    pub fn all() -> impl Iterator<Item = VoteValue> {
        (Self::MIN..=Self::MAX).map(VoteValue)
    }
}

/// The value preselected in 1–10 dropdowns.
impl Default for VoteValue {
    fn default() -> Self {
        Self(DEFAULT_VOTE)
    }
}

impl TryFrom<i64> for VoteValue {
    type Error = CoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VoteValue> for i64 {
    fn from(value: VoteValue) -> Self {
        i64::from(value.0)
    }
}

impl fmt::Display for VoteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where one user stands with one marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum VoteState {
    /// The user never voted.
    NoRow,
    /// The vote counts.
    Active { value: VoteValue },
    /// The vote was cleared; the row still holds the last value.
    Inactive { retained: VoteValue },
}

impl VoteState {
    /// Rebuild the state from a stored `(vote, is_active)` pair.
    pub fn from_row(row: Option<(VoteValue, bool)>) -> Self {
        match row {
            None => Self::NoRow,
            Some((value, true)) => Self::Active { value },
            Some((retained, false)) => Self::Inactive { retained },
        }
    }

    /// Saving always lands in `Active` with the new value.
    #[must_use]
    pub fn save(self, value: VoteValue) -> Self {
        Self::Active { value }
    }

    /// Clearing keeps the value. Clearing a non-active vote is a no-op.
    #[must_use]
    pub fn clear(self) -> Self {
        match self {
            Self::Active { value } => Self::Inactive { retained: value },
            other => other,
        }
    }

    /// Bring back a cleared vote with its retained value.
    #[must_use]
    pub fn reactivate(self) -> Self {
        match self {
            Self::Inactive { retained } => Self::Active { value: retained },
            other => other,
        }
    }

    /// "My vote": a missing row and an inactive row both read as no vote.
    pub fn active_value(self) -> Option<VoteValue> {
        match self {
            Self::Active { value } => Some(value),
            Self::NoRow | Self::Inactive { .. } => None,
        }
    }

    /// The number stored in the row, active or not.
    pub fn stored_value(self) -> Option<VoteValue> {
        match self {
            Self::NoRow => None,
            Self::Active { value } => Some(value),
            Self::Inactive { retained } => Some(retained),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(n: i64) -> VoteValue {
        VoteValue::new(n).unwrap()
    }

    #[test]
    fn vote_value_range() {
        assert!(VoteValue::new(0).is_err());
        assert!(VoteValue::new(11).is_err());
        assert!(VoteValue::new(-4).is_err());
        assert_eq!(VoteValue::new(1).unwrap().get(), 1);
        assert_eq!(VoteValue::new(10).unwrap().get(), 10);
        assert_eq!(VoteValue::all().count(), 10);
        assert_eq!(VoteValue::default().get(), 7);
    }

    #[test]
    fn vote_value_serde_rejects_out_of_range() {
        assert_eq!(serde_json::from_str::<VoteValue>("7").unwrap(), v(7));
        assert!(serde_json::from_str::<VoteValue>("12").is_err());
        assert_eq!(serde_json::to_string(&v(3)).unwrap(), "3");
    }

    #[test]
    fn save_clear_read_keeps_value() {
        let state = VoteState::NoRow.save(v(7)).clear();
        assert_eq!(state.active_value(), None);
        assert_eq!(state.stored_value(), Some(v(7)));
        assert_eq!(state.reactivate(), VoteState::Active { value: v(7) });
    }

    #[test]
    fn save_overwrites_unconditionally() {
        let state = VoteState::NoRow.save(v(3)).save(v(9));
        assert_eq!(state.active_value(), Some(v(9)));

        let revived = VoteState::Inactive { retained: v(4) }.save(v(8));
        assert_eq!(revived, VoteState::Active { value: v(8) });
    }

    #[test]
    fn clear_and_reactivate_are_noops_elsewhere() {
        assert_eq!(VoteState::NoRow.clear(), VoteState::NoRow);
        assert_eq!(VoteState::NoRow.reactivate(), VoteState::NoRow);
        let active = VoteState::Active { value: v(5) };
        assert_eq!(active.reactivate(), active);
        let inactive = VoteState::Inactive { retained: v(5) };
        assert_eq!(inactive.clear(), inactive);
    }

    #[test]
    fn missing_and_inactive_rows_read_the_same() {
        assert_eq!(VoteState::from_row(None).active_value(), None);
        assert_eq!(VoteState::from_row(Some((v(6), false))).active_value(), None);
        assert_eq!(
            VoteState::from_row(Some((v(6), true))).active_value(),
            Some(v(6))
        );
    }

    #[test]
    fn state_serializes_with_tag() {
        let json = serde_json::to_value(VoteState::Inactive { retained: v(2) }).unwrap();
        assert_eq!(json["state"], "inactive");
        assert_eq!(json["retained"], 2);
        let json = serde_json::to_value(VoteState::NoRow).unwrap();
        assert_eq!(json["state"], "no_row");
    }
}
