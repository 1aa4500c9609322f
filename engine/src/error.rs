use thiserror::Error;

use crate::model::RoundPhase;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("die value {0} is outside 1..=6")]
    InvalidDieValue(u8),
    #[error("{phase:?} round needs {expected} dice, got {got}")]
    RollCountMismatch { phase: RoundPhase, expected: usize, got: usize },
    #[error("entry for a {entry:?} round recorded into a {buffer:?} round")]
    PhaseMismatch { buffer: RoundPhase, entry: RoundPhase },
    #[error("player index {idx} out of range for {count} players")]
    PlayerOutOfRange { idx: usize, count: usize },
    #[error("a match needs at least one player")]
    EmptyRoster,
    #[error("scripted rolls need at least one face")]
    EmptyScript,
    #[error("inconsistent match state: {0}")]
    Inconsistent(String),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
