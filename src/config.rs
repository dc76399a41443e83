//! Tunables for every mode. All sections default to the values the game
//! ships with, so a JSON override only needs the keys it changes.

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CategoryFilter};
use crate::error::GameError;
use crate::mode::GameMode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Mode loaded at startup.
    pub initial_mode: GameMode,
    pub sound_enabled: bool,
    /// Fixed RNG seed; `None` seeds from the environment.
    pub seed: Option<u64>,
    pub free_spawn: FreeSpawnConfig,
    pub challenge: ChallengeConfig,
    pub simple: SimpleConfig,
    pub levels: LevelsConfig,
    pub memory: MemoryConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            initial_mode: GameMode::Challenge,
            sound_enabled: true,
            seed: None,
            free_spawn: FreeSpawnConfig::default(),
            challenge: ChallengeConfig::default(),
            simple: SimpleConfig::default(),
            levels: LevelsConfig::default(),
            memory: MemoryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreeSpawnConfig {
    pub spawn_interval_ms: f64,
    pub max_live: usize,
    pub expire_ms: f64,
    /// Delay between the hit animation and removal + celebration.
    pub vanish_ms: f64,
    /// Distance kept free from the right/bottom edge when placing.
    pub edge_margin: f64,
    pub edge_offset: f64,
    pub token_size: f64,
}

impl Default for FreeSpawnConfig {
    fn default() -> Self {
        Self {
            spawn_interval_ms: 2000.0,
            max_live: 5,
            expire_ms: 5000.0,
            vanish_ms: 300.0,
            edge_margin: 150.0,
            edge_offset: 20.0,
            token_size: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengeConfig {
    /// Simultaneous targets, 1..=4.
    pub targets: usize,
    pub points_per_hit: u32,
    pub spawn_interval_ms: f64,
    pub max_live: usize,
    pub expire_ms: f64,
    /// Probability that a spawn shows one of the targets.
    pub target_chance: f64,
    pub categories: CategoryFilter,
    pub edge_margin: f64,
    pub edge_offset: f64,
    pub token_size: f64,
}

impl ChallengeConfig {
    /// Smallest pool that can hold every target plus one replacement.
    pub fn min_pool(&self) -> usize {
        self.targets + 1
    }
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            targets: 4,
            points_per_hit: 10,
            spawn_interval_ms: 1500.0,
            max_live: 8,
            expire_ms: 6000.0,
            target_chance: 0.4,
            categories: CategoryFilter::All,
            edge_margin: 150.0,
            edge_offset: 20.0,
            token_size: 90.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleConfig {
    pub points_per_hit: u32,
    pub vanish_ms: f64,
    pub next_round_ms: f64,
    pub token_size: f64,
}

impl Default for SimpleConfig {
    fn default() -> Self {
        Self {
            points_per_hit: 10,
            vanish_ms: 300.0,
            next_round_ms: 700.0,
            token_size: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelsConfig {
    pub level_complete_ms: f64,
    pub advance_ms: f64,
    /// Delay between the final celebration and the summary label.
    pub summary_ms: f64,
    /// Share of the client area the grid may cover.
    pub fill_ratio: f64,
    pub spacing: f64,
    pub best_time_key: String,
}

impl Default for LevelsConfig {
    fn default() -> Self {
        Self {
            level_complete_ms: 500.0,
            advance_ms: 1000.0,
            summary_ms: 500.0,
            fill_ratio: 0.7,
            spacing: 20.0,
            best_time_key: "simpleLevelsBestTime".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub pairs: usize,
    pub reveal_ms: f64,
    pub fade_ms: f64,
    pub remove_ms: f64,
    pub flip_back_ms: f64,
    pub complete_ms: f64,
    pub summary_ms: f64,
    pub teardown_ms: f64,
    pub card_size: f64,
    pub spacing: f64,
    /// Grid columns; `None` picks the smallest square that fits.
    pub columns: Option<usize>,
    pub best_time_key: String,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            pairs: 2,
            reveal_ms: 600.0,
            fade_ms: 500.0,
            remove_ms: 300.0,
            flip_back_ms: 1000.0,
            complete_ms: 1000.0,
            summary_ms: 500.0,
            teardown_ms: 2500.0,
            card_size: 120.0,
            spacing: 20.0,
            columns: None,
            best_time_key: "memoryGameBestTime".to_string(),
        }
    }
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GameError> {
        let invalid = |msg: &str| Err(GameError::InvalidConfig(msg.to_string()));
        if !(1..=4).contains(&self.challenge.targets) {
            return invalid("challenge.targets must be within 1..=4");
        }
        if self.free_spawn.max_live == 0 || self.challenge.max_live == 0 {
            return invalid("max_live must be at least 1");
        }
        let catalog = Catalog::standard();
        let pool = catalog.pool(&self.challenge.categories).len();
        if pool < self.challenge.min_pool() {
            return Err(GameError::InvalidConfig(format!(
                "challenge.categories leave {pool} tokens, {} targets need at least {}",
                self.challenge.targets,
                self.challenge.min_pool()
            )));
        }
        if !(0.0..=1.0).contains(&self.challenge.target_chance) {
            return invalid("challenge.target_chance must be a probability");
        }
        if self.free_spawn.spawn_interval_ms <= 0.0 || self.challenge.spawn_interval_ms <= 0.0 {
            return invalid("spawn_interval_ms must be positive");
        }
        if !(self.levels.fill_ratio > 0.0 && self.levels.fill_ratio <= 1.0) {
            return invalid("levels.fill_ratio must be within (0, 1]");
        }
        if self.memory.pairs == 0 {
            return invalid("memory.pairs must be at least 1");
        }
        if self.memory.pairs > catalog.all_tokens().len() {
            return invalid("memory.pairs exceeds the number of distinct tokens");
        }
        if self.memory.columns == Some(0) {
            return invalid("memory.columns must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Category;

    #[test]
    fn empty_json_yields_defaults() {
        let config = GameConfig::from_json("{}").unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.memory.best_time_key, "memoryGameBestTime");
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let json = r#"{
            "initial_mode": "memory",
            "memory": { "pairs": 6 },
            "challenge": { "categories": { "only": ["fruits", "animals"] } }
        }"#;
        let config = GameConfig::from_json(json).unwrap();
        assert_eq!(config.initial_mode, GameMode::Memory);
        assert_eq!(config.memory.pairs, 6);
        assert_eq!(config.memory.reveal_ms, 600.0);
        assert_eq!(
            config.challenge.categories,
            CategoryFilter::Only(vec![Category::Fruits, Category::Animals])
        );
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(matches!(
            GameConfig::from_json(r#"{"challenge": {"targets": 5}}"#),
            Err(GameError::InvalidConfig(_))
        ));
        assert!(GameConfig::from_json(r#"{"memory": {"pairs": 0}}"#).is_err());
        assert!(GameConfig::from_json(r#"{"memory": {"pairs": 60}}"#).is_err());
        assert!(GameConfig::from_json(r#"{"memory": {"pairs": 59}}"#).is_ok());
        assert!(GameConfig::from_json(r#"{"levels": {"fill_ratio": 1.5}}"#).is_err());
        assert!(GameConfig::from_json("not json").is_err());
    }

    #[test]
    fn rejects_category_filters_too_small_for_targets() {
        let empty = r#"{"challenge": {"categories": {"only": []}}}"#;
        assert!(matches!(GameConfig::from_json(empty), Err(GameError::InvalidConfig(_))));

        // Fruits hold 8 tokens: enough for 4 targets plus a replacement.
        let fruits = r#"{"challenge": {"categories": {"only": ["fruits"]}}}"#;
        assert!(GameConfig::from_json(fruits).is_ok());
        assert_eq!(GameConfig::default().challenge.min_pool(), 5);
    }
}
