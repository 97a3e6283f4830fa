//! The caller-facing surface: emit-event, get-profile, get-leaderboard.
//!
//! Every operation checks the caller identity FIRST; anonymous calls are
//! rejected before any side effect. Profile reads are self-scoped; the
//! leaderboard is visible to any authenticated caller.

use crate::badge::Badge;
use crate::clock::GameClock;
use crate::config::GameConfig;
use crate::error::{GameError, GameResult};
use crate::event::{EventInput, EventOutcome};
use crate::leaderboard::LeaderboardRow;
use crate::notify::{GameNotice, GameObserver, Notifier};
use crate::processor::EventProcessor;
use crate::profile::GamificationProfile;
use crate::store::GameStore;
use crate::types::UserId;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
}

/// Caller context as established by the (external) auth layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    Authenticated(Identity),
}

impl Caller {
    pub fn user(user_id: impl Into<String>) -> Self {
        Self::Authenticated(Identity {
            user_id: user_id.into(),
        })
    }

    fn require(&self) -> GameResult<&Identity> {
        match self {
            Self::Authenticated(identity) => Ok(identity),
            Self::Anonymous => Err(GameError::Unauthorized),
        }
    }
}

/// Self-scoped profile view: the committed profile plus earned badges,
/// newest badge first.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProfileView {
    pub profile: GamificationProfile,
    pub badges: Vec<Badge>,
}

pub struct GameService {
    processor: EventProcessor,
    notifier: Notifier,
}

impl GameService {
    pub fn new(config: GameConfig, store: GameStore, clock: Arc<dyn GameClock>) -> Self {
        Self {
            processor: EventProcessor::new(config, store, clock),
            notifier: Notifier::new(),
        }
    }

    pub fn register_observer(&mut self, observer: Box<dyn GameObserver>) {
        self.notifier.register(observer);
    }

    /// Process one event for the authenticated caller. Duplicates (same
    /// idempotency key) return the stored outcome and publish nothing.
    pub fn emit_event(&mut self, caller: &Caller, input: &EventInput) -> GameResult<EventOutcome> {
        let identity = caller.require()?;
        let outcome = self.processor.process(&identity.user_id, input)?;

        if !outcome.replayed {
            self.notifier.publish(&GameNotice::EventProcessed {
                user_id: identity.user_id.clone(),
                event_type: input.event_type.clone(),
                awarded_points: outcome.awarded_points,
            });
            for b in &outcome.new_badges {
                self.notifier.publish(&GameNotice::BadgeEarned {
                    user_id: identity.user_id.clone(),
                    badge_code: b.badge_code.clone(),
                });
            }
            if outcome.leveled_up {
                self.notifier.publish(&GameNotice::LevelUp {
                    user_id: identity.user_id.clone(),
                    level: outcome.profile.level,
                });
            }
        }
        Ok(outcome)
    }

    /// The caller's own profile. A user with no prior events gets a
    /// zero-value profile (level 1) that is NOT persisted.
    pub fn get_profile(&self, caller: &Caller) -> GameResult<ProfileView> {
        let identity = caller.require()?;
        let store = self.processor.store();
        let profile = match store.profile(&identity.user_id)? {
            Some(profile) => profile,
            None => GamificationProfile::empty(identity.user_id.clone(), self.processor.now()),
        };
        let badges = store.badges_for(&identity.user_id)?;
        Ok(ProfileView { profile, badges })
    }

    /// Top profiles by points, ties broken by ascending user id.
    pub fn get_leaderboard(&self, caller: &Caller, limit: usize) -> GameResult<Vec<LeaderboardRow>> {
        caller.require()?;
        self.processor.store().leaderboard(limit)
    }
}
