use chrono::{DateTime, Utc};
use gamify_core::{
    badge,
    clock::FixedClock,
    config::GameConfig,
    event::EventInput,
    service::{Caller, GameService},
    store::GameStore,
};
use std::sync::Arc;

// ── Test helpers ────────────────────────────────────────────────────────────

fn ts(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn make_service() -> GameService {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = GameStore::in_memory().unwrap();
    store.migrate().unwrap();
    GameService::new(
        GameConfig::builtin(),
        store,
        Arc::new(FixedClock(ts("2026-03-01T12:00:00Z"))),
    )
}

fn emit_on(svc: &mut GameService, user: &str, at: &str) -> gamify_core::event::EventOutcome {
    svc.emit_event(
        &Caller::user(user),
        &EventInput::new("clock_in", "tablet-1", ts(at)),
    )
    .unwrap()
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// The very first processed event earns FIRST_EVENT; the second does not
/// re-earn it.
#[test]
fn first_event_badge_awarded_once() {
    let mut svc = make_service();

    let first = emit_on(&mut svc, "crew-1", "2026-03-01T06:00:00Z");
    let codes: Vec<&str> = first.new_badges.iter().map(|b| b.badge_code.as_str()).collect();
    assert_eq!(codes, vec![badge::FIRST_EVENT]);

    let second = emit_on(&mut svc, "crew-1", "2026-03-01T07:00:00Z");
    assert!(second.new_badges.is_empty());
}

/// Seven consecutive days of activity earn STREAK_WEEK exactly on day 7,
/// and day 8 does not duplicate it.
#[test]
fn streak_week_fires_on_day_seven() {
    let mut svc = make_service();

    for day in 1..=6 {
        let outcome = emit_on(&mut svc, "crew-1", &format!("2026-03-0{day}T06:00:00Z"));
        assert!(
            !outcome.new_badges.iter().any(|b| b.badge_code == badge::STREAK_WEEK),
            "STREAK_WEEK must not fire at streak {}",
            outcome.profile.streak_current
        );
    }

    let seventh = emit_on(&mut svc, "crew-1", "2026-03-07T06:00:00Z");
    assert_eq!(seventh.profile.streak_current, 7);
    let codes: Vec<&str> = seventh.new_badges.iter().map(|b| b.badge_code.as_str()).collect();
    assert_eq!(codes, vec![badge::STREAK_WEEK]);

    let eighth = emit_on(&mut svc, "crew-1", "2026-03-08T06:00:00Z");
    assert!(eighth.new_badges.is_empty());
}

/// A broken and rebuilt streak does not re-earn STREAK_WEEK: badges are
/// permanent, single-award markers.
#[test]
fn rebuilt_streak_does_not_re_earn() {
    let mut svc = make_service();

    for day in 1..=7 {
        emit_on(&mut svc, "crew-1", &format!("2026-03-0{day}T06:00:00Z"));
    }
    // Break the streak, then rebuild past seven days.
    for day in 10..=17 {
        let outcome = emit_on(&mut svc, "crew-1", &format!("2026-03-{day}T06:00:00Z"));
        assert!(
            !outcome.new_badges.iter().any(|b| b.badge_code == badge::STREAK_WEEK)
        );
    }
}

/// Badges show up in the profile view, newest first.
#[test]
fn profile_view_lists_badges_newest_first() {
    let mut svc = make_service();
    let caller = Caller::user("crew-1");

    for day in 1..=7 {
        emit_on(&mut svc, "crew-1", &format!("2026-03-0{day}T06:00:00Z"));
    }

    let view = svc.get_profile(&caller).unwrap();
    let codes: Vec<&str> = view.badges.iter().map(|b| b.badge_code.as_str()).collect();
    assert_eq!(codes, vec![badge::STREAK_WEEK, badge::FIRST_EVENT]);
    assert!(view.badges.iter().all(|b| b.user_id == "crew-1"));
}

/// Reaching level 5 (900 XP) earns LEVEL_FIVE.
#[test]
fn level_five_badge_at_nine_hundred_xp() {
    let mut svc = make_service();
    let caller = Caller::user("crew-1");

    // 113 job updates x 8 = 904 XP.
    let mut earned_level_five = false;
    for i in 0..113 {
        let outcome = svc
            .emit_event(
                &caller,
                &EventInput::new("job_status_updated", "tablet-1", ts("2026-03-01T08:00:00Z"))
                    .with_metadata_entry("job_id", serde_json::json!(format!("job-{i}"))),
            )
            .unwrap();
        if outcome.new_badges.iter().any(|b| b.badge_code == badge::LEVEL_FIVE) {
            assert_eq!(outcome.profile.level, 5);
            earned_level_five = true;
        }
    }
    assert!(earned_level_five);
    assert_eq!(svc.get_profile(&caller).unwrap().profile.xp, 904);
}
