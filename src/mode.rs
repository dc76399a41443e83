use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Named game modes the manager can load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Free play: tokens pop up, any click is a hit.
    Free,
    Challenge,
    /// One target among four options.
    Simple,
    Levels,
    Memory,
}

impl GameMode {
    /// Order of the "next mode" button.
    pub const CYCLE: [GameMode; 3] = [GameMode::Challenge, GameMode::Levels, GameMode::Memory];

    pub fn next(self) -> GameMode {
        match self {
            GameMode::Challenge => GameMode::Levels,
            GameMode::Levels => GameMode::Memory,
            GameMode::Memory | GameMode::Free | GameMode::Simple => GameMode::Challenge,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            GameMode::Free => "free",
            GameMode::Challenge => "challenge",
            GameMode::Simple => "simple",
            GameMode::Levels => "levels",
            GameMode::Memory => "memory",
        }
    }

    /// Text for the mode toggle button.
    pub fn button_label(self) -> &'static str {
        match self {
            GameMode::Free => "Mode: Free 🎲",
            GameMode::Challenge => "Mode: Challenge 🎯",
            GameMode::Simple => "Mode: Simple 🔎",
            GameMode::Levels => "Mode: Levels 🎈",
            GameMode::Memory => "Mode: Memory 🧠",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for GameMode {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(GameMode::Free),
            "challenge" => Ok(GameMode::Challenge),
            "simple" => Ok(GameMode::Simple),
            "levels" => Ok(GameMode::Levels),
            "memory" => Ok(GameMode::Memory),
            other => Err(GameError::InvalidConfig(format!("unknown mode '{other}'"))),
        }
    }
}
