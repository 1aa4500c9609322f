use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

pub const NORMAL_ROLL: usize = 5;
pub const SUDDEN_DEATH_ROLL: usize = 3;

const PLACEHOLDER_NORMAL: [DieValue; NORMAL_ROLL] = [DieValue(1), DieValue(2), DieValue(3), DieValue(4), DieValue(5)];
const PLACEHOLDER_SUDDEN_DEATH: [DieValue; SUDDEN_DEATH_ROLL] = [DieValue(1), DieValue(2), DieValue(3)];

/// A single face of a six-sided die, always in `1..=6`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DieValue(u8);

impl DieValue {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 6;

    pub fn new(face: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&face) { Ok(Self(face)) } else { Err(EngineError::InvalidDieValue(face)) }
    }

    #[inline] pub fn get(self) -> u8 { self.0 }

    /// Zero-based slot for frequency tables.
    #[inline] pub(crate) fn slot(self) -> usize { (self.0 - Self::MIN) as usize }
}

impl TryFrom<u8> for DieValue {
    type Error = EngineError;
    fn try_from(face: u8) -> Result<Self> { Self::new(face) }
}

impl From<DieValue> for u8 {
    fn from(d: DieValue) -> u8 { d.0 }
}

impl std::fmt::Display for DieValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    Normal,
    /// Tie-break round: fewer dice, lowest unique value wins.
    SuddenDeath,
}

impl RoundPhase {
    pub fn dice_count(self) -> usize {
        match self { RoundPhase::Normal => NORMAL_ROLL, RoundPhase::SuddenDeath => SUDDEN_DEATH_ROLL }
    }
    pub fn label(self) -> &'static str {
        match self { RoundPhase::Normal => "Normal Round", RoundPhase::SuddenDeath => "Sudden Death Round" }
    }
}

/// One player's batch for a round. The variant fixes both the phase and the number of dice.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "phase", content = "dice", rename_all = "snake_case")]
pub enum Rolls {
    Normal([DieValue; NORMAL_ROLL]),
    SuddenDeath([DieValue; SUDDEN_DEATH_ROLL]),
}

impl Rolls {
    pub fn from_faces(phase: RoundPhase, faces: &[DieValue]) -> Result<Self> {
        let mismatch = || EngineError::RollCountMismatch { phase, expected: phase.dice_count(), got: faces.len() };
        match phase {
            RoundPhase::Normal => faces.try_into().map(Rolls::Normal).map_err(|_| mismatch()),
            RoundPhase::SuddenDeath => faces.try_into().map(Rolls::SuddenDeath).map_err(|_| mismatch()),
        }
    }

    pub fn placeholder(phase: RoundPhase) -> Self {
        match phase {
            RoundPhase::Normal => Rolls::Normal(PLACEHOLDER_NORMAL),
            RoundPhase::SuddenDeath => Rolls::SuddenDeath(PLACEHOLDER_SUDDEN_DEATH),
        }
    }

    pub fn phase(&self) -> RoundPhase {
        match self { Rolls::Normal(_) => RoundPhase::Normal, Rolls::SuddenDeath(_) => RoundPhase::SuddenDeath }
    }

    pub fn faces(&self) -> &[DieValue] {
        match self { Rolls::Normal(d) => d, Rolls::SuddenDeath(d) => d }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PlayerRoundEntry {
    pub player_idx: usize,
    pub rolls: Rolls,
}

impl PlayerRoundEntry {
    pub fn phase(&self) -> RoundPhase { self.rolls.phase() }
}

/// The in-progress round: one entry per player, all of the buffer's phase.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RoundBuffer {
    phase: RoundPhase,
    entries: Vec<PlayerRoundEntry>,
}

impl RoundBuffer {
    pub fn placeholder(phase: RoundPhase, player_count: usize) -> Self {
        let entries = (0..player_count).map(|player_idx| PlayerRoundEntry { player_idx, rolls: Rolls::placeholder(phase) }).collect();
        Self { phase, entries }
    }

    pub fn record(&mut self, player_idx: usize, rolls: Rolls) -> Result<()> {
        if rolls.phase() != self.phase {
            return Err(EngineError::PhaseMismatch { buffer: self.phase, entry: rolls.phase() });
        }
        let count = self.entries.len();
        let slot = self.entries.get_mut(player_idx).ok_or(EngineError::PlayerOutOfRange { idx: player_idx, count })?;
        *slot = PlayerRoundEntry { player_idx, rolls };
        Ok(())
    }

    pub fn phase(&self) -> RoundPhase { self.phase }
    pub fn entries(&self) -> &[PlayerRoundEntry] { &self.entries }
    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn seal(&self) -> CompletedRound {
        CompletedRound { phase: self.phase, entries: self.entries.clone() }
    }

    fn check(&self) -> Result<()> {
        for (pos, e) in self.entries.iter().enumerate() {
            if e.player_idx != pos {
                return Err(EngineError::Inconsistent(format!("entry at {} claims player {}", pos, e.player_idx)));
            }
            if e.phase() != self.phase {
                return Err(EngineError::PhaseMismatch { buffer: self.phase, entry: e.phase() });
            }
        }
        Ok(())
    }
}

/// A finished round as stored in history. Never mutated after sealing.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CompletedRound {
    phase: RoundPhase,
    entries: Vec<PlayerRoundEntry>,
}

impl CompletedRound {
    pub fn phase(&self) -> RoundPhase { self.phase }
    pub fn entries(&self) -> &[PlayerRoundEntry] { &self.entries }
    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Player {
    pub name: String,
    pub victories: u32,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self { Self { name: name.into(), victories: 0 } }

    /// Name given to the `n`th player (1-based) when none is supplied.
    pub fn default_name(n: usize) -> String { format!("Player {}", n) }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum EventType {
    Roll,
    RoundWon,
    SuddenDeath,
    BufferReset,
    PlayerAdded,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Event {
    pub seq: u64,
    pub ty: EventType,
    pub payload: serde_json::Value,
    pub state_hash: String,
}

/// Buffer reset held back so the outgoing round stays on screen for `delay_ms`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ScheduledReset {
    pub phase: RoundPhase,
    pub delay_ms: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchState {
    pub players: Vec<Player>,
    pub current_player_idx: usize,
    pub round_idx: u64,
    pub phase: RoundPhase,
    pub buffer: RoundBuffer,
    pub history: Vec<CompletedRound>,
    pub scheduled_reset: Option<ScheduledReset>,
    pub events_seq: u64,
}

impl MatchState {
    pub fn new(players: Vec<Player>) -> Result<Self> {
        if players.is_empty() { return Err(EngineError::EmptyRoster); }
        let buffer = RoundBuffer::placeholder(RoundPhase::Normal, players.len());
        Ok(Self { players, current_player_idx: 0, round_idx: 0, phase: RoundPhase::Normal, buffer, history: vec![], scheduled_reset: None, events_seq: 0 })
    }

    pub fn player_count(&self) -> usize { self.players.len() }

    pub fn current_player(&self) -> &Player { &self.players[self.current_player_idx] }

    /// Checks every structural invariant of the match.
    pub fn validate(&self) -> Result<()> {
        let count = self.players.len();
        if count == 0 { return Err(EngineError::EmptyRoster); }
        if self.current_player_idx >= count {
            return Err(EngineError::PlayerOutOfRange { idx: self.current_player_idx, count });
        }
        if self.buffer.len() != count {
            return Err(EngineError::Inconsistent(format!("buffer holds {} entries for {} players", self.buffer.len(), count)));
        }
        self.buffer.check()?;
        match self.scheduled_reset {
            Some(reset) if reset.phase != self.phase => {
                return Err(EngineError::PhaseMismatch { buffer: self.phase, entry: reset.phase });
            }
            None if self.buffer.phase() != self.phase => {
                return Err(EngineError::PhaseMismatch { buffer: self.buffer.phase(), entry: self.phase });
            }
            _ => {}
        }
        if self.history.len() as u64 != self.round_idx {
            return Err(EngineError::Inconsistent(format!("{} rounds in history at round {}", self.history.len(), self.round_idx)));
        }
        for round in &self.history {
            if let Some(e) = round.entries.iter().find(|e| e.phase() != round.phase) {
                return Err(EngineError::PhaseMismatch { buffer: round.phase, entry: e.phase() });
            }
        }
        Ok(())
    }
}
