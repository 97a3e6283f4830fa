//! The event processor — the heart of the gamification core.
//!
//! PROCESSING ORDER (fixed, documented, never reordered):
//!   1. Rule lookup          (UnknownEventType)
//!   2. Metadata validation  (InvalidMetadata)
//!   3. Idempotency replay
//!   4. Daily-cap accounting
//!   5. Profile mutation     (points / xp / level / streak)
//!   6. Badge unlocks
//!   7. Ledger append + commit
//!
//! RULES:
//!   - Steps 3-7 share ONE immediate transaction. A duplicate submission
//!     either replays the stored outcome or serializes behind the first;
//!     a ledger row and its profile mutation commit together or not at all.
//!   - The processor never talks to SQLite directly; everything goes
//!     through GameStore/GameTx.

use crate::badge;
use crate::clock::{utc_day, GameClock};
use crate::config::GameConfig;
use crate::error::{GameError, GameResult};
use crate::event::{EventInput, EventOutcome, LedgerEntry};
use crate::profile::GamificationProfile;
use crate::store::GameStore;
use std::sync::Arc;

pub struct EventProcessor {
    config: GameConfig,
    store: GameStore,
    clock: Arc<dyn GameClock>,
}

impl EventProcessor {
    pub fn new(config: GameConfig, store: GameStore, clock: Arc<dyn GameClock>) -> Self {
        Self {
            config,
            store,
            clock,
        }
    }

    /// Committed-state read access for the profile and leaderboard models.
    pub fn store(&self) -> &GameStore {
        &self.store
    }

    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }

    /// Validate, award, and persist one event for `user_id`.
    pub fn process(&mut self, user_id: &str, input: &EventInput) -> GameResult<EventOutcome> {
        let rule = self
            .config
            .rules
            .rule_for(&input.event_type)
            .ok_or_else(|| {
                log::warn!(
                    "rejected event: unknown type '{}' from user={user_id}",
                    input.event_type
                );
                GameError::UnknownEventType {
                    event_type: input.event_type.clone(),
                }
            })?;

        let missing: Vec<String> = rule
            .required_metadata_keys
            .iter()
            .filter(|k| !input.metadata.contains_key(*k))
            .cloned()
            .collect();
        if !missing.is_empty() {
            log::warn!(
                "rejected event: type='{}' user={user_id} missing metadata {missing:?}",
                input.event_type
            );
            return Err(GameError::InvalidMetadata { missing });
        }

        let now = self.clock.now();
        let day = utc_day(input.occurred_at);

        let tx = self.store.begin()?;

        // At-most-once per (user, key): a key seen before replays the stored
        // outcome without touching the profile.
        if let Some(key) = &input.idempotency_key {
            if let Some(json) = tx.ledger_lookup(user_id, key)? {
                let mut outcome: EventOutcome = serde_json::from_str(&json)?;
                outcome.replayed = true;
                log::debug!("replayed event user={user_id} key={key}");
                return Ok(outcome);
            }
        }

        let awarded = match rule.daily_cap {
            Some(cap) => {
                let already = tx.awarded_on_day(user_id, &input.event_type, day)?;
                rule.base_points.min((cap - already).max(0))
            }
            None => rule.base_points,
        };

        let stored = tx.profile(user_id)?;
        let first_event_for_user = stored.is_none();
        let mut profile =
            stored.unwrap_or_else(|| GamificationProfile::empty(user_id.to_string(), now));
        let level_before = profile.level;
        profile.apply_award(awarded, day, &self.config.levels, now);
        tx.upsert_profile(&profile)?;

        let held = tx.held_badges(user_id)?;
        let new_badges = badge::unlocked(&profile, first_event_for_user, &held, now);
        for b in &new_badges {
            tx.insert_badge(b)?;
        }

        let leveled_up = profile.level > level_before;
        let outcome = EventOutcome {
            awarded_points: awarded,
            profile,
            new_badges,
            leveled_up,
            replayed: false,
        };

        let entry = LedgerEntry {
            id: None,
            user_id: user_id.to_string(),
            event_type: input.event_type.clone(),
            idempotency_key: input.idempotency_key.clone(),
            device_id: input.device_id.clone(),
            lat: input.lat,
            lng: input.lng,
            awarded_points: awarded,
            occurred_day: day,
            result_json: serde_json::to_string(&outcome)?,
            created_at: now,
        };
        tx.append_ledger(&entry)?;
        tx.commit()?;

        log::info!(
            "event processed user={user_id} type={} awarded={awarded} level={} streak={}",
            input.event_type,
            outcome.profile.level,
            outcome.profile.streak_current
        );
        for b in &outcome.new_badges {
            log::info!("badge earned user={user_id} code={}", b.badge_code);
        }
        Ok(outcome)
    }
}
