use serde::{Deserialize, Serialize};

use crate::model::{CompletedRound, RoundPhase};
use crate::rules::{resolve_round, RoundOutcome};

/// One line of the round log shown under the table.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundSummary {
    /// 1-based round number.
    pub number: u64,
    pub phase: RoundPhase,
    pub faces: Vec<Vec<u8>>,
    pub outcome: RoundOutcome,
}

impl RoundSummary {
    pub fn of(number: u64, round: &CompletedRound) -> Self {
        let faces = round.entries().iter().map(|e| e.rolls.faces().iter().map(|d| d.get()).collect()).collect();
        Self { number, phase: round.phase(), faces, outcome: resolve_round(round.entries(), round.phase()) }
    }

    /// Name of the round winner, or `None` for a draw.
    pub fn winner_name<'a>(&self, names: &'a [String]) -> Option<&'a str> {
        match self.outcome {
            RoundOutcome::Winner { player_idx } => names.get(player_idx).map(String::as_str),
            RoundOutcome::Draw { .. } => None,
        }
    }
}

/// Completed rounds, newest first.
pub fn log(history: &[CompletedRound]) -> Vec<RoundSummary> {
    history.iter().enumerate().rev().map(|(i, r)| RoundSummary::of(i as u64 + 1, r)).collect()
}
