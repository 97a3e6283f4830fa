//! Shared primitive types used across the gamification core.

/// Stable identifier for an authenticated user.
pub type UserId = String;

/// A gamification event type, e.g. `"clock_in"`.
pub type EventType = String;

/// Stable identifier for an earned badge, e.g. `"FIRST_EVENT"`.
pub type BadgeCode = String;
