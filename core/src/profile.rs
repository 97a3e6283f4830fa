//! The per-user gamification profile and its update rules.
//!
//! The profile is owned exclusively by the event processor; read models see
//! committed snapshots only.

use crate::levels::LevelTable;
use crate::types::UserId;
use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GamificationProfile {
    pub user_id: UserId,
    pub points: i64,
    pub xp: i64,
    /// Derived: always equals `levels.level_for(xp)` after an update.
    pub level: i64,
    pub streak_current: i64,
    pub streak_longest: i64,
    /// UTC day of the most recent qualifying event.
    pub last_event_date: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

impl GamificationProfile {
    /// Zero-value profile. Not persisted until the first real event.
    pub fn empty(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            points: 0,
            xp: 0,
            level: 1,
            streak_current: 0,
            streak_longest: 0,
            last_event_date: None,
            updated_at: now,
        }
    }

    /// Apply one award for an event on `day`.
    ///
    /// Streak rule, with `last` = `last_event_date`:
    ///   - no prior event        -> streak becomes 1
    ///   - day == last           -> unchanged
    ///   - day == last + 1       -> streak + 1
    ///   - day >  last + 1       -> reset to 1 (not 0)
    ///   - day <  last           -> unchanged; a late-arriving event never
    ///                              rewinds the streak or `last_event_date`
    ///
    /// `streak_longest` tracks the running maximum. Points and XP accrue by
    /// the same amount; the level is recomputed from XP.
    pub fn apply_award(
        &mut self,
        awarded: i64,
        day: NaiveDate,
        levels: &LevelTable,
        now: DateTime<Utc>,
    ) {
        self.points += awarded;
        self.xp += awarded;
        self.level = levels.level_for(self.xp);

        match self.last_event_date {
            None => self.streak_current = 1,
            Some(last) if day == last => {}
            Some(last) if last.checked_add_days(Days::new(1)) == Some(day) => {
                self.streak_current += 1;
            }
            Some(last) if day < last => {}
            Some(_) => self.streak_current = 1,
        }
        self.streak_longest = self.streak_longest.max(self.streak_current);
        if self.last_event_date.map_or(true, |last| day > last) {
            self.last_event_date = Some(day);
        }
        self.updated_at = now;
    }
}
