//! Badge catalog and unlock predicates.
//!
//! Badges are append-only and never revoked. Predicates are evaluated after
//! the profile mutation, against the user's already-held codes, so a badge is
//! awarded at most once for the account lifetime.

use crate::profile::GamificationProfile;
use crate::types::{BadgeCode, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const FIRST_EVENT: &str = "FIRST_EVENT";
pub const STREAK_WEEK: &str = "STREAK_WEEK";
pub const STREAK_MONTH: &str = "STREAK_MONTH";
pub const LEVEL_FIVE: &str = "LEVEL_FIVE";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Badge {
    pub user_id: UserId,
    pub badge_code: BadgeCode,
    pub title: String,
    pub description: String,
    pub earned_at: DateTime<Utc>,
}

struct Unlock {
    code: &'static str,
    title: &'static str,
    description: &'static str,
    earned: fn(&GamificationProfile, bool) -> bool,
}

fn first_event(_profile: &GamificationProfile, first: bool) -> bool {
    first
}

fn streak_week(profile: &GamificationProfile, _first: bool) -> bool {
    profile.streak_current >= 7
}

fn streak_month(profile: &GamificationProfile, _first: bool) -> bool {
    profile.streak_current >= 30
}

fn level_five(profile: &GamificationProfile, _first: bool) -> bool {
    profile.level >= 5
}

const CATALOG: &[Unlock] = &[
    Unlock {
        code: FIRST_EVENT,
        title: "First Steps",
        description: "Completed your first action",
        earned: first_event,
    },
    Unlock {
        code: STREAK_WEEK,
        title: "On a Roll",
        description: "Maintained a 7-day activity streak",
        earned: streak_week,
    },
    Unlock {
        code: STREAK_MONTH,
        title: "Iron Habit",
        description: "Maintained a 30-day activity streak",
        earned: streak_month,
    },
    Unlock {
        code: LEVEL_FIVE,
        title: "Road Veteran",
        description: "Reached level 5",
        earned: level_five,
    },
];

/// Badges newly unlocked by this update, excluding codes in `held`.
pub fn unlocked(
    profile: &GamificationProfile,
    first_event_for_user: bool,
    held: &HashSet<BadgeCode>,
    now: DateTime<Utc>,
) -> Vec<Badge> {
    CATALOG
        .iter()
        .filter(|u| !held.contains(u.code) && (u.earned)(profile, first_event_for_user))
        .map(|u| Badge {
            user_id: profile.user_id.clone(),
            badge_code: u.code.to_string(),
            title: u.title.to_string(),
            description: u.description.to_string(),
            earned_at: now,
        })
        .collect()
}
