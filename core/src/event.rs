//! Event envelopes — what crosses the processor boundary.
//!
//! An event is ephemeral: it is validated, awarded, and recorded in the
//! ledger within one transaction. No other component reads events back.

use crate::badge::Badge;
use crate::profile::GamificationProfile;
use crate::types::{EventType, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The envelope the client emitter submits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventInput {
    pub event_type: EventType,
    /// Caller-supplied token for at-most-once processing of retries.
    #[serde(default)]
    pub idempotency_key: Option<String>,
    pub device_id: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    pub occurred_at: DateTime<Utc>,
}

impl EventInput {
    pub fn new(
        event_type: impl Into<String>,
        device_id: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            idempotency_key: None,
            device_id: device_id.into(),
            lat: None,
            lng: None,
            metadata: serde_json::Map::new(),
            occurred_at,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    /// Attach a fresh v4 idempotency key. Resubmitting the SAME envelope
    /// deduplicates; building a new envelope gets a new key.
    pub fn with_generated_key(mut self) -> Self {
        self.idempotency_key = Some(Uuid::new_v4().to_string());
        self
    }

    pub fn with_geotag(mut self, lat: f64, lng: f64) -> Self {
        self.lat = Some(lat);
        self.lng = Some(lng);
        self
    }

    pub fn with_metadata_entry(
        mut self,
        key: impl Into<String>,
        value: serde_json::Value,
    ) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Result of processing one event. Serialized into the ledger so a duplicate
/// submission replays exactly this.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventOutcome {
    pub awarded_points: i64,
    pub profile: GamificationProfile,
    pub new_badges: Vec<Badge>,
    /// True when this processing crossed a level threshold.
    pub leveled_up: bool,
    /// True when this outcome was replayed from the idempotency ledger
    /// instead of being applied again.
    #[serde(default)]
    pub replayed: bool,
}

/// The ledger row as persisted to SQLite. One row per processed event; serves
/// idempotency replay, daily-cap accounting, and audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Option<i64>,
    pub user_id: UserId,
    pub event_type: EventType,
    pub idempotency_key: Option<String>,
    pub device_id: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub awarded_points: i64,
    /// UTC calendar day the event occurred on. Daily caps key on this.
    pub occurred_day: NaiveDate,
    /// JSON-serialized `EventOutcome` for idempotent replay.
    pub result_json: String,
    pub created_at: DateTime<Utc>,
}
