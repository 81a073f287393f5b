//! Bot configuration

use crate::ai::SearchConfig;
use crate::eval::Heuristics;
use crate::strategy::Difficulty;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything needed to build a [`crate::Bot`]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub difficulty: Difficulty,
    /// Random seed for reproducibility (None = entropy)
    pub seed: Option<u64>,
    /// Limits for the hard tier's search
    pub search: SearchConfig,
    /// Evaluation weights for the hard tier's search
    pub heuristics: Heuristics,
}

impl BotConfig {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    pub fn with_heuristics(mut self, heuristics: Heuristics) -> Self {
        self.heuristics = heuristics;
        self
    }

    /// Load from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: BotConfig = serde_json::from_str(r#"{"difficulty": "medium", "search": {"max_depth": 3}}"#).unwrap();
        assert_eq!(config.difficulty, Difficulty::Medium);
        assert_eq!(config.seed, None);
        assert_eq!(config.search.max_depth, 3);
        assert_eq!(config.search.time_budget_ms, SearchConfig::default().time_budget_ms);
        assert_eq!(config.heuristics, Heuristics::default());
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("loa-bot-config-{}.json", std::process::id()));
        let config = BotConfig::new(Difficulty::Easy).with_seed(99);
        config.save(&path).unwrap();
        let loaded = BotConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(BotConfig::load(Path::new("/nonexistent/loa/bot.json")).is_err());
    }
}
