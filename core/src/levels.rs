//! The level table — ordered XP thresholds and the level lookup.

use crate::error::{GameError, GameResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LevelThreshold {
    pub level: i64,
    /// Minimum cumulative XP for this level, inclusive.
    pub min_xp: i64,
}

/// Immutable, validated level ladder.
#[derive(Debug, Clone)]
pub struct LevelTable {
    thresholds: Vec<LevelThreshold>,
}

impl LevelTable {
    /// Validates the ladder: level 1 starts at 0 XP, `min_xp` strictly
    /// increasing, levels strictly increasing.
    pub fn new(mut thresholds: Vec<LevelThreshold>) -> GameResult<Self> {
        thresholds.sort_by_key(|t| t.min_xp);
        let first = thresholds
            .first()
            .ok_or_else(|| GameError::InvalidConfig("level table is empty".into()))?;
        if first.level != 1 || first.min_xp != 0 {
            return Err(GameError::InvalidConfig(
                "level table must start at level 1 with min_xp 0".into(),
            ));
        }
        for pair in thresholds.windows(2) {
            if pair[1].min_xp <= pair[0].min_xp {
                return Err(GameError::InvalidConfig(format!(
                    "min_xp must be strictly increasing; {} follows {}",
                    pair[1].min_xp, pair[0].min_xp
                )));
            }
            if pair[1].level <= pair[0].level {
                return Err(GameError::InvalidConfig(format!(
                    "levels must be strictly increasing; {} follows {}",
                    pair[1].level, pair[0].level
                )));
            }
        }
        Ok(Self { thresholds })
    }

    /// The highest level whose `min_xp <= xp`. Negative XP is treated as 0.
    pub fn level_for(&self, xp: i64) -> i64 {
        let xp = xp.max(0);
        let mut level = 1;
        for t in &self.thresholds {
            if xp >= t.min_xp {
                level = t.level;
            } else {
                break;
            }
        }
        level
    }

    /// The production ladder, also used by tests.
    pub fn builtin() -> Self {
        let thresholds = [
            (1, 0),
            (2, 100),
            (3, 250),
            (4, 500),
            (5, 900),
            (6, 1400),
            (7, 2000),
            (8, 2800),
            (9, 3800),
            (10, 5000),
        ];
        Self {
            thresholds: thresholds
                .iter()
                .map(|&(level, min_xp)| LevelThreshold { level, min_xp })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_boundaries_match_ladder() {
        let table = LevelTable::builtin();
        assert_eq!(table.level_for(0), 1);
        assert_eq!(table.level_for(99), 1);
        assert_eq!(table.level_for(100), 2);
        assert_eq!(table.level_for(249), 2);
        assert_eq!(table.level_for(250), 3);
        assert_eq!(table.level_for(5000), 10);
        assert_eq!(table.level_for(1_000_000), 10);
    }

    #[test]
    fn negative_xp_is_level_one() {
        let table = LevelTable::builtin();
        assert_eq!(table.level_for(-1), 1);
        assert_eq!(table.level_for(i64::MIN), 1);
    }

    #[test]
    fn level_is_monotone_in_xp() {
        let table = LevelTable::builtin();
        let mut prev = 0;
        for xp in 0..6000 {
            let level = table.level_for(xp);
            assert!(level >= prev, "level dropped from {prev} to {level} at xp {xp}");
            prev = level;
        }
    }

    #[test]
    fn rejects_ladder_not_starting_at_level_one() {
        let bad = vec![
            LevelThreshold { level: 2, min_xp: 0 },
            LevelThreshold { level: 3, min_xp: 50 },
        ];
        assert!(LevelTable::new(bad).is_err());
    }

    #[test]
    fn rejects_duplicate_min_xp() {
        let bad = vec![
            LevelThreshold { level: 1, min_xp: 0 },
            LevelThreshold { level: 2, min_xp: 100 },
            LevelThreshold { level: 3, min_xp: 100 },
        ];
        assert!(LevelTable::new(bad).is_err());
    }
}
