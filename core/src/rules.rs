//! The rule table — static mapping from event type to award parameters.
//!
//! Loaded once at startup, never mutated at runtime. The processor is a pure
//! function of (rule table, level table, profile, event).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamificationRule {
    pub event_type: String,
    pub base_points: i64,
    /// Per-user, per-UTC-day ceiling on points from this event type.
    #[serde(default)]
    pub daily_cap: Option<i64>,
    /// Keys that must be present in the event metadata.
    #[serde(default)]
    pub required_metadata_keys: Vec<String>,
}

/// Immutable rule catalog keyed by event type.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: HashMap<String, GamificationRule>,
}

impl RuleTable {
    pub fn new(rules: Vec<GamificationRule>) -> Self {
        Self {
            rules: rules
                .into_iter()
                .map(|r| (r.event_type.clone(), r))
                .collect(),
        }
    }

    pub fn rule_for(&self, event_type: &str) -> Option<&GamificationRule> {
        self.rules.get(event_type)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The production catalog, also used by tests against a throwaway store.
    pub fn builtin() -> Self {
        Self::new(vec![
            GamificationRule {
                event_type: "clock_in".into(),
                base_points: 5,
                daily_cap: None,
                required_metadata_keys: vec![],
            },
            GamificationRule {
                event_type: "clock_out".into(),
                base_points: 2,
                daily_cap: None,
                required_metadata_keys: vec![],
            },
            GamificationRule {
                event_type: "photo_uploaded".into(),
                base_points: 3,
                daily_cap: Some(15),
                required_metadata_keys: vec!["photo_id".into()],
            },
            GamificationRule {
                event_type: "job_status_updated".into(),
                base_points: 8,
                daily_cap: None,
                required_metadata_keys: vec!["job_id".into()],
            },
            GamificationRule {
                event_type: "weather_alert_configured".into(),
                base_points: 6,
                daily_cap: None,
                required_metadata_keys: vec![],
            },
            GamificationRule {
                event_type: "map_drawing_saved".into(),
                base_points: 4,
                daily_cap: None,
                required_metadata_keys: vec![],
            },
        ])
    }
}
