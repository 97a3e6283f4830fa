//! game-runner: headless driver for the gamification core.
//!
//! Usage:
//!   game-runner emit    --db game.db --user u7 --event clock_in [--key k-1]
//!                       [--device crew-tablet] [--lat 41.5 --lng -81.7]
//!                       [--meta photo_id=p-1]
//!   game-runner profile --db game.db --user u7
//!   game-runner board   --db game.db [--limit 10]
//!   game-runner prune   --db game.db --days 30

use anyhow::{anyhow, Result};
use chrono::{Days, Utc};
use gamify_core::{
    clock::SystemClock,
    config::GameConfig,
    event::EventInput,
    service::{Caller, GameService},
    store::GameStore,
};
use std::env;
use std::sync::Arc;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let cmd = args.get(1).map(String::as_str).unwrap_or("help");
    let db = arg_value(&args, "--db").unwrap_or(":memory:");
    let data_dir = arg_value(&args, "--data-dir").unwrap_or("core/data");

    let store = GameStore::open(db)?;
    store.migrate()?;

    if cmd == "prune" {
        let days: u64 = require_arg(&args, "--days")?.parse()?;
        let before = Utc::now()
            .date_naive()
            .checked_sub_days(Days::new(days))
            .ok_or_else(|| anyhow!("invalid --days value {days}"))?;
        let deleted = store.prune_events(before)?;
        log::info!("pruned {deleted} ledger rows older than {before}");
        println!("pruned {deleted} ledger rows (before {before})");
        return Ok(());
    }

    let config = if std::path::Path::new(data_dir).exists() {
        GameConfig::load(data_dir)?
    } else {
        GameConfig::builtin()
    };
    let mut service = GameService::new(config, store, Arc::new(SystemClock));

    match cmd {
        "emit" => {
            let user = require_arg(&args, "--user")?;
            let event = require_arg(&args, "--event")?;
            let device = arg_value(&args, "--device").unwrap_or("cli");

            let mut input = EventInput::new(event, device, Utc::now());
            input = match arg_value(&args, "--key") {
                Some(key) => input.with_key(key),
                None => input.with_generated_key(),
            };
            if let (Some(lat), Some(lng)) = (arg_value(&args, "--lat"), arg_value(&args, "--lng"))
            {
                input = input.with_geotag(lat.parse()?, lng.parse()?);
            }
            for pair in args.windows(2) {
                if pair[0] == "--meta" {
                    let (k, v) = pair[1]
                        .split_once('=')
                        .ok_or_else(|| anyhow!("--meta expects key=value, got '{}'", pair[1]))?;
                    input = input
                        .with_metadata_entry(k, serde_json::Value::String(v.to_string()));
                }
            }

            let outcome = service.emit_event(&Caller::user(user), &input)?;
            println!(
                "awarded {} point(s){}",
                outcome.awarded_points,
                if outcome.replayed { " (replayed)" } else { "" }
            );
            println!(
                "  points={} xp={} level={} streak={}/{}",
                outcome.profile.points,
                outcome.profile.xp,
                outcome.profile.level,
                outcome.profile.streak_current,
                outcome.profile.streak_longest
            );
            for badge in &outcome.new_badges {
                println!("  new badge: {} — {}", badge.badge_code, badge.title);
            }
        }
        "profile" => {
            let user = require_arg(&args, "--user")?;
            let view = service.get_profile(&Caller::user(user))?;
            println!(
                "{}: points={} xp={} level={} streak={}/{} last_event={}",
                view.profile.user_id,
                view.profile.points,
                view.profile.xp,
                view.profile.level,
                view.profile.streak_current,
                view.profile.streak_longest,
                view.profile
                    .last_event_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".into())
            );
            for badge in &view.badges {
                println!("  [{}] {} — {}", badge.badge_code, badge.title, badge.description);
            }
        }
        "board" => {
            let limit: usize = arg_value(&args, "--limit")
                .map(str::parse)
                .transpose()?
                .unwrap_or(gamify_core::leaderboard::DEFAULT_LIMIT);
            let rows = service.get_leaderboard(&Caller::user("cli-admin"), limit)?;
            for (rank, row) in rows.iter().enumerate() {
                println!(
                    "{:>3}. {}  points={} level={} streak={}",
                    rank + 1,
                    row.user_id,
                    row.points,
                    row.level,
                    row.streak_current
                );
            }
        }
        _ => {
            eprintln!("usage: game-runner <emit|profile|board|prune> [options]");
            eprintln!("  common: --db PATH  --data-dir DIR");
        }
    }
    Ok(())
}

fn arg_value<'a>(args: &'a [String], key: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|pair| pair[0] == key)
        .map(|pair| pair[1].as_str())
}

fn require_arg<'a>(args: &'a [String], key: &str) -> Result<&'a str> {
    arg_value(args, key).ok_or_else(|| anyhow!("missing required argument {key}"))
}
