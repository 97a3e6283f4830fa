//! Gamification core for the paving-operations dashboard.
//!
//! Event intake, idempotent point awarding, streak/level computation, badge
//! unlocks, and the profile/leaderboard read models. The UI emits event
//! envelopes; the processor validates them against the static rule table,
//! applies daily caps, and commits the profile mutation together with the
//! idempotency ledger row in a single SQLite transaction.

pub mod badge;
pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod leaderboard;
pub mod levels;
pub mod notify;
pub mod processor;
pub mod profile;
pub mod rules;
pub mod service;
pub mod store;
pub mod types;
