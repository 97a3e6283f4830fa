//! Static configuration — the rule and level tables, loaded from data/.
//!
//! Tables are data, not code: they load into immutable in-memory structures
//! at startup and the processor never mutates them.

use crate::levels::{LevelTable, LevelThreshold};
use crate::rules::{GamificationRule, RuleTable};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
struct RulesFile {
    rules: Vec<GamificationRule>,
}

#[derive(Debug, Clone, Deserialize)]
struct LevelsFile {
    levels: Vec<LevelThreshold>,
}

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub rules: RuleTable,
    pub levels: LevelTable,
}

impl GameConfig {
    /// Load from the data/ directory. In tests, use `GameConfig::builtin()`.
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let rules_path = format!("{data_dir}/rules/gamification_rules.json");
        let rules_content = std::fs::read_to_string(&rules_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {rules_path}: {e}"))?;
        let rules_file: RulesFile = serde_json::from_str(&rules_content)?;
        let rules = RuleTable::new(rules_file.rules);

        let levels_path = format!("{data_dir}/levels/level_thresholds.json");
        let levels_content = std::fs::read_to_string(&levels_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {levels_path}: {e}"))?;
        let levels_file: LevelsFile = serde_json::from_str(&levels_content)?;
        let levels = LevelTable::new(levels_file.levels)?;

        Ok(Self { rules, levels })
    }

    /// The built-in production catalog.
    pub fn builtin() -> Self {
        Self {
            rules: RuleTable::builtin(),
            levels: LevelTable::builtin(),
        }
    }
}
