//! Repository for the `votes` table.
//!
//! A vote row is never deleted. Clearing flips `is_active` and keeps the
//! number, so reactivating restores it.

use std::collections::HashMap;

use chrono::Utc;
use serde_json::json;
use tba_core::types::{MarkerId, UserId};
use tba_core::vote::{VoteState, VoteValue};

use crate::models::vote::{MyVote, Vote};
use crate::models::{decode_first, decode_rows};
use crate::repositories::{CategoryRepo, MarkerRepo};
use crate::store::{Direction, Query, RowStore, StoreError};

const TABLE: &str = "votes";

const COLUMNS: &str = "marker_id,user_id,vote,is_active,updated_at";

/// Conflict key for upserts: one vote per (marker, user).
const CONFLICT_KEY: &[&str] = &["marker_id", "user_id"];

/// Provides vote reads and state transitions.
pub struct VoteRepo;

impl VoteRepo {
    fn row_query(marker_id: MarkerId, user_id: UserId) -> Query {
        Query::new()
            .eq("marker_id", marker_id.to_string())
            .eq("user_id", user_id.to_string())
    }

    /// The stored row for (marker, user), active or not.
    pub async fn find(
        store: &dyn RowStore,
        marker_id: MarkerId,
        user_id: UserId,
    ) -> Result<Option<Vote>, StoreError> {
        let query = Self::row_query(marker_id, user_id).select(COLUMNS).limit(1);
        decode_first(store.select(TABLE, &query).await?)
    }

    /// Where the user stands with the marker.
    pub async fn find_mine(
        store: &dyn RowStore,
        marker_id: MarkerId,
        user_id: UserId,
    ) -> Result<VoteState, StoreError> {
        let vote = Self::find(store, marker_id, user_id).await?;
        Ok(VoteState::from_row(vote.map(|v| (v.vote, v.is_active))))
    }

    /// Write the vote and make it active, whatever state the row was in.
    pub async fn save(
        store: &dyn RowStore,
        marker_id: MarkerId,
        user_id: UserId,
        value: VoteValue,
    ) -> Result<Vote, StoreError> {
        let row = json!({
            "marker_id": marker_id,
            "user_id": user_id,
            "vote": value,
            "is_active": true,
            "updated_at": Utc::now(),
        });
        let saved = store.upsert(TABLE, row, CONFLICT_KEY).await?;
        Ok(serde_json::from_value(saved)?)
    }

    /// Deactivate the vote, keeping its value.
    ///
    /// Returns the resulting state; clearing when there is no row is a no-op.
    pub async fn clear(
        store: &dyn RowStore,
        marker_id: MarkerId,
        user_id: UserId,
    ) -> Result<VoteState, StoreError> {
        let patch = json!({ "is_active": false, "updated_at": Utc::now() });
        let rows = store
            .update(TABLE, &Self::row_query(marker_id, user_id), patch)
            .await?;
        let vote: Option<Vote> = decode_first(rows)?;
        Ok(VoteState::from_row(vote.map(|v| (v.vote, v.is_active))))
    }

    /// Reactivate a cleared vote with its retained value.
    ///
    /// Returns `None` when the user never voted on the marker.
    pub async fn reactivate(
        store: &dyn RowStore,
        marker_id: MarkerId,
        user_id: UserId,
    ) -> Result<Option<Vote>, StoreError> {
        let patch = json!({ "is_active": true, "updated_at": Utc::now() });
        let rows = store
            .update(TABLE, &Self::row_query(marker_id, user_id), patch)
            .await?;
        decode_first(rows)
    }

    /// The user's active votes, highest first then most recently updated,
    /// each joined with its marker and category name.
    ///
    /// Votes whose marker cannot be read are skipped.
    pub async fn list_mine(store: &dyn RowStore, user_id: UserId) -> Result<Vec<MyVote>, StoreError> {
        let query = Query::new()
            .select(COLUMNS)
            .eq("user_id", user_id.to_string())
            .eq("is_active", true)
            .order("vote", Direction::Desc)
            .order("updated_at", Direction::Desc);
        let votes: Vec<Vote> = decode_rows(store.select(TABLE, &query).await?)?;
        if votes.is_empty() {
            return Ok(Vec::new());
        }

        let marker_ids: Vec<MarkerId> = votes.iter().map(|v| v.marker_id).collect();
        let markers: HashMap<MarkerId, _> = MarkerRepo::find_many(store, &marker_ids)
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();

        let mut category_ids: Vec<String> = markers
            .values()
            .filter_map(|m| m.category_id.clone())
            .collect();
        category_ids.sort();
        category_ids.dedup();
        let category_names: HashMap<String, String> = CategoryRepo::find_many(store, &category_ids)
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        Ok(votes
            .into_iter()
            .filter_map(|v| {
                let marker = markers.get(&v.marker_id)?;
                let category_name = marker
                    .category_id
                    .as_ref()
                    .and_then(|id| category_names.get(id))
                    .cloned()
                    .unwrap_or_default();
                Some(MyVote {
                    marker_id: v.marker_id,
                    vote: v.vote,
                    updated_at: v.updated_at,
                    title: marker.title.clone(),
                    group_type: marker.group_type,
                    category_id: marker.category_id.clone(),
                    category_name,
                    marker_active: marker.is_active,
                })
            })
            .collect())
    }
}
