//! Vote rows and the "my votes" view.

use serde::{Deserialize, Serialize};
use tba_core::marker::GroupType;
use tba_core::types::{CategoryId, MarkerId, Timestamp, UserId};
use tba_core::vote::{VoteState, VoteValue};

use super::ids::opt_text_id;

/// A row from the `votes` table. One per (marker, user).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub marker_id: MarkerId,
    pub user_id: UserId,
    pub vote: VoteValue,
    pub is_active: bool,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

impl Vote {
    pub fn state(&self) -> VoteState {
        VoteState::from_row(Some((self.vote, self.is_active)))
    }
}

/// DTO for saving a vote.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SaveVote {
    pub vote: VoteValue,
}

/// One line of the "my votes" table: an active vote with its marker.
#[derive(Debug, Clone, Serialize)]
pub struct MyVote {
    pub marker_id: MarkerId,
    pub vote: VoteValue,
    pub updated_at: Option<Timestamp>,
    pub title: String,
    pub group_type: GroupType,
    pub category_id: Option<CategoryId>,
    pub category_name: String,
    /// The marker itself may have been deactivated since the vote.
    pub marker_active: bool,
}

/// Columns read when only the category is needed.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CategoryRef {
    #[serde(default, deserialize_with = "opt_text_id")]
    pub category_id: Option<CategoryId>,
}
