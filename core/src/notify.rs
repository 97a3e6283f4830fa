//! Observer registry — explicit pub-sub instead of a module-level singleton.
//!
//! Consumers (UI bridges, log sinks) register a [`GameObserver`] on the
//! service; notices are published after the transaction commits, never
//! before, and never for replayed duplicates.

use crate::types::{BadgeCode, EventType, UserId};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameNotice {
    EventProcessed {
        user_id: UserId,
        event_type: EventType,
        awarded_points: i64,
    },
    BadgeEarned {
        user_id: UserId,
        badge_code: BadgeCode,
    },
    LevelUp {
        user_id: UserId,
        level: i64,
    },
}

pub trait GameObserver {
    fn notify(&self, notice: &GameNotice);
}

#[derive(Default)]
pub struct Notifier {
    observers: Vec<Box<dyn GameObserver>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, observer: Box<dyn GameObserver>) {
        self.observers.push(observer);
    }

    pub fn publish(&self, notice: &GameNotice) {
        for observer in &self.observers {
            observer.notify(notice);
        }
    }
}
