//! Leaderboard read model — a ranking view over committed profiles.
//!
//! Never stored as independent state; recomputed on read. Ordering is
//! descending by points with ties broken by ascending user id, so a given
//! set of profiles always ranks the same way.

use crate::types::UserId;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaderboardRow {
    pub user_id: UserId,
    pub points: i64,
    pub level: i64,
    pub streak_current: i64,
}
