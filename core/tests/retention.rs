use chrono::{DateTime, Utc};
use gamify_core::{
    clock::FixedClock,
    config::GameConfig,
    event::EventInput,
    service::{Caller, GameService},
    store::GameStore,
};
use std::path::PathBuf;
use std::sync::Arc;

// ── Test helpers ────────────────────────────────────────────────────────────

fn ts(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn temp_db() -> PathBuf {
    std::env::temp_dir().join(format!("gamify-test-{}.db", uuid::Uuid::new_v4()))
}

fn cleanup(path: &PathBuf) {
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Pruning the ledger drops old rows but never touches profiles: points,
/// levels, and streaks survive the retention sweep.
#[test]
fn prune_keeps_profiles_intact() {
    let path = temp_db();
    let db = path.to_str().unwrap();

    {
        let store = GameStore::open(db).unwrap();
        store.migrate().unwrap();
        let mut svc = GameService::new(
            GameConfig::builtin(),
            store,
            Arc::new(FixedClock(ts("2026-03-10T12:00:00Z"))),
        );
        svc.emit_event(
            &Caller::user("crew-1"),
            &EventInput::new("clock_in", "tablet-1", ts("2026-02-01T06:00:00Z")).with_key("old"),
        )
        .unwrap();
        svc.emit_event(
            &Caller::user("crew-1"),
            &EventInput::new("clock_in", "tablet-1", ts("2026-03-10T06:00:00Z")).with_key("new"),
        )
        .unwrap();
    }

    let store = GameStore::open(db).unwrap();
    let deleted = store
        .prune_events("2026-03-01".parse().unwrap())
        .unwrap();
    assert_eq!(deleted, 1);

    let profile = store.profile("crew-1").unwrap().unwrap();
    assert_eq!(profile.points, 10);

    cleanup(&path);
}

/// Pruned idempotency keys are forgotten: resubmitting a key from beyond the
/// retention window processes as a fresh event. This is the documented
/// trade-off of bounding the ledger.
#[test]
fn pruned_keys_lose_replay_protection() {
    let path = temp_db();
    let db = path.to_str().unwrap();

    {
        let store = GameStore::open(db).unwrap();
        store.migrate().unwrap();
        let mut svc = GameService::new(
            GameConfig::builtin(),
            store,
            Arc::new(FixedClock(ts("2026-03-10T12:00:00Z"))),
        );
        svc.emit_event(
            &Caller::user("crew-1"),
            &EventInput::new("clock_in", "tablet-1", ts("2026-02-01T06:00:00Z")).with_key("k-1"),
        )
        .unwrap();
    }

    let store = GameStore::open(db).unwrap();
    store.prune_events("2026-03-01".parse().unwrap()).unwrap();

    let mut svc = GameService::new(
        GameConfig::builtin(),
        store,
        Arc::new(FixedClock(ts("2026-03-10T12:00:00Z"))),
    );
    let outcome = svc
        .emit_event(
            &Caller::user("crew-1"),
            &EventInput::new("clock_in", "tablet-1", ts("2026-03-10T06:00:00Z")).with_key("k-1"),
        )
        .unwrap();
    assert!(!outcome.replayed);
    assert_eq!(outcome.profile.points, 10);

    cleanup(&path);
}
