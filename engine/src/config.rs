use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::model::Player;

/// Match setup, typically read from a JSON file.
///
/// ```json
/// { "players": ["Ana", "Bo", "Cy"], "seed": 7, "reset_delay_ms": 1500 }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct MatchConfig {
    pub players: Vec<String>,
    /// Fixed seed for the roll source; entropy-seeded when absent.
    pub seed: Option<u64>,
    /// Keep the finished round on display this long before the buffer resets.
    pub reset_delay_ms: Option<u64>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self { players: (1..=2).map(Player::default_name).collect(), seed: None, reset_delay_ms: None }
    }
}

impl MatchConfig {
    pub fn with_player_count(n: usize) -> Self {
        Self { players: (1..=n).map(Player::default_name).collect(), ..Self::default() }
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("loading match config from {}", path.display());
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.players.is_empty() { return Err(EngineError::EmptyRoster); }
        Ok(())
    }

    pub fn roster(&self) -> Vec<Player> { self.players.iter().map(Player::new).collect() }
}
