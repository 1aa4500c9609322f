//! Round resolution: the extreme-unique rule and winner selection.

use serde::{Deserialize, Serialize};

use crate::model::{DieValue, PlayerRoundEntry, RoundPhase};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Direction { Max, Min }

impl Direction {
    #[inline] pub fn for_phase(phase: RoundPhase) -> Self {
        match phase { RoundPhase::Normal => Direction::Max, RoundPhase::SuddenDeath => Direction::Min }
    }

    #[inline] fn better(self, a: DieValue, b: DieValue) -> bool {
        match self { Direction::Max => a > b, Direction::Min => a < b }
    }
}

/// The face that appears exactly once in `rolls` and is the most extreme such face
/// in `direction`. `None` when every face repeats.
pub fn resolve_extreme(rolls: &[DieValue], direction: Direction) -> Option<DieValue> {
    let mut counts = [0u8; 6];
    for d in rolls { counts[d.slot()] = counts[d.slot()].saturating_add(1); }
    let uniques = rolls.iter().copied().filter(|d| counts[d.slot()] == 1);
    match direction {
        Direction::Max => uniques.max(),
        Direction::Min => uniques.min(),
    }
}

/// Indices (ascending) of the players whose resolved value is best in `direction`.
/// Players with no unique face are left out; if nobody has one the result is empty.
pub fn round_winners(entries: &[PlayerRoundEntry], direction: Direction) -> Vec<usize> {
    let mut winners: Vec<usize> = vec![];
    let mut best: Option<DieValue> = None;
    for e in entries {
        let Some(value) = resolve_extreme(e.rolls.faces(), direction) else {
            log::trace!("player {} has no unique face", e.player_idx);
            continue;
        };
        match best {
            Some(b) if direction.better(b, value) => {}
            Some(b) if b == value => winners.push(e.player_idx),
            _ => { best = Some(value); winners.clear(); winners.push(e.player_idx); }
        }
    }
    winners.sort_unstable();
    winners
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoundOutcome {
    Winner { player_idx: usize },
    /// Zero or several players tied for best; the next round is sudden death.
    Draw { tied: Vec<usize> },
}

impl RoundOutcome {
    pub fn from_winners(winners: Vec<usize>) -> Self {
        if winners.len() == 1 { RoundOutcome::Winner { player_idx: winners[0] } } else { RoundOutcome::Draw { tied: winners } }
    }

    pub fn is_draw(&self) -> bool { matches!(self, RoundOutcome::Draw { .. }) }

    /// Phase that follows a round with this outcome.
    pub fn next_phase(&self) -> RoundPhase {
        match self { RoundOutcome::Winner { .. } => RoundPhase::Normal, RoundOutcome::Draw { .. } => RoundPhase::SuddenDeath }
    }
}

pub fn resolve_round(entries: &[PlayerRoundEntry], phase: RoundPhase) -> RoundOutcome {
    RoundOutcome::from_winners(round_winners(entries, Direction::for_phase(phase)))
}
