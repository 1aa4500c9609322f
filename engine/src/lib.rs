pub mod config;
pub mod error;
pub mod history;
pub mod model;
pub mod rng;
pub mod rules;

use config::MatchConfig;
use error::Result;
use history::RoundSummary;
use model::*;
use rng::{RollSource, SeededRolls};
use rules::RoundOutcome;
use serde_json::json;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Fingerprint of everything a renderer can observe; the event counter is left out.
fn state_hash(s: &MatchState) -> String {
    let mut hasher = DefaultHasher::new();
    (&s.players, s.current_player_idx, s.round_idx, s.phase).hash(&mut hasher);
    (&s.buffer, &s.history, &s.scheduled_reset).hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

/// A running match. Owns the state and the roll source; callers drive it with
/// [`Match::roll`] and [`Match::add_player`] and read it through snapshots.
#[derive(Debug)]
pub struct Match<R = SeededRolls> {
    state: MatchState,
    rolls: R,
    reset_delay_ms: Option<u64>,
}

impl Match<SeededRolls> {
    pub fn from_config(cfg: &MatchConfig) -> Result<Self> {
        cfg.validate()?;
        let rolls = cfg.seed.map(SeededRolls::new).unwrap_or_else(SeededRolls::from_entropy);
        log::info!("new match: {} players, seed {}", cfg.players.len(), rolls.seed());
        Ok(Self::new(cfg.roster(), rolls)?.with_reset_delay(cfg.reset_delay_ms))
    }
}

impl<R: RollSource> Match<R> {
    pub fn new(players: Vec<Player>, rolls: R) -> Result<Self> {
        Ok(Self { state: MatchState::new(players)?, rolls, reset_delay_ms: None })
    }

    /// Hold the finished round on display for `ms` instead of resetting the buffer at once.
    pub fn with_reset_delay(mut self, ms: Option<u64>) -> Self { self.reset_delay_ms = ms; self }

    pub fn state(&self) -> &MatchState { &self.state }

    pub fn snapshot(&self) -> MatchState { self.state.clone() }

    /// The current player rolls. Completes the round once every player has rolled.
    ///
    /// A pending scheduled reset is applied once the batch is accepted, before it is
    /// recorded. On error nothing is recorded and no reset is applied.
    pub fn roll(&mut self) -> Result<Vec<Event>> {
        let (idx, phase) = (self.state.current_player_idx, self.state.phase);
        let faces = self.rolls.roll_batch(phase.dice_count());
        let rolls = Rolls::from_faces(phase, &faces)?;
        let mut events = vec![];
        // the scheduled phase is always `state.phase`, so the batch fits the reset buffer
        events.extend(self.apply_scheduled_reset());
        self.state.buffer.record(idx, rolls)?;
        log::debug!("{} rolled {:?} ({:?})", self.state.players[idx].name, faces.iter().map(|d| d.get()).collect::<Vec<_>>(), phase);
        let payload = json!({ "playerIdx": idx, "phase": phase, "faces": faces });
        events.push(self.emit(EventType::Roll, payload));
        if idx + 1 < self.state.player_count() {
            self.state.current_player_idx = idx + 1;
        } else {
            events.push(self.finish_round());
        }
        self.debug_check();
        Ok(events)
    }

    fn finish_round(&mut self) -> Event {
        let phase = self.state.phase;
        let outcome = rules::resolve_round(self.state.buffer.entries(), phase);
        let ty = match &outcome {
            RoundOutcome::Winner { player_idx } => {
                let p = &mut self.state.players[*player_idx];
                p.victories += 1;
                log::info!("round {} ({:?}) won by {} ({} victories)", self.state.round_idx + 1, phase, p.name, p.victories);
                EventType::RoundWon
            }
            RoundOutcome::Draw { tied } => {
                log::info!("round {} ({:?}) tied between {:?}, sudden death", self.state.round_idx + 1, phase, tied);
                EventType::SuddenDeath
            }
        };
        self.state.history.push(self.state.buffer.seal());
        self.state.round_idx += 1;
        self.state.current_player_idx = 0;
        let next = outcome.next_phase();
        self.state.phase = next;
        match self.reset_delay_ms {
            Some(delay_ms) => self.state.scheduled_reset = Some(ScheduledReset { phase: next, delay_ms }),
            None => self.reset_buffer(next),
        }
        let payload = json!({ "round": self.state.round_idx, "phase": phase, "outcome": outcome, "nextPhase": next });
        self.emit(ty, payload)
    }

    /// Runs the deferred buffer reset, if one is pending.
    pub fn apply_scheduled_reset(&mut self) -> Option<Event> {
        let reset = self.state.scheduled_reset.take()?;
        self.reset_buffer(reset.phase);
        log::debug!("buffer reset to {:?} after {}ms hold", reset.phase, reset.delay_ms);
        Some(self.emit(EventType::BufferReset, json!({ "phase": reset.phase, "delayMs": reset.delay_ms })))
    }

    /// Adds `Player {n+1}` and restarts the match: history is cleared and a normal
    /// round begins with the first player. Victories are kept.
    pub fn add_player(&mut self) -> Event {
        let name = Player::default_name(self.state.player_count() + 1);
        self.state.players.push(Player::new(name.clone()));
        self.state.scheduled_reset = None;
        self.state.phase = RoundPhase::Normal;
        self.reset_buffer(RoundPhase::Normal);
        self.state.current_player_idx = 0;
        self.state.history.clear();
        self.state.round_idx = 0;
        log::info!("{} joined, match restarted with {} players", name, self.state.player_count());
        let ev = self.emit(EventType::PlayerAdded, json!({ "playerIdx": self.state.player_count() - 1, "name": name }));
        self.debug_check();
        ev
    }

    pub fn history_log(&self) -> Vec<RoundSummary> { history::log(&self.state.history) }

    /// Players tied for the most victories.
    pub fn leaders(&self) -> Vec<usize> {
        let top = self.state.players.iter().map(|p| p.victories).max().unwrap_or(0);
        self.state.players.iter().enumerate().filter(|(_, p)| p.victories == top).map(|(i, _)| i).collect()
    }

    fn reset_buffer(&mut self, phase: RoundPhase) {
        self.state.buffer = RoundBuffer::placeholder(phase, self.state.player_count());
    }

    fn emit(&mut self, ty: EventType, payload: serde_json::Value) -> Event {
        self.state.events_seq += 1;
        Event { seq: self.state.events_seq, ty, payload, state_hash: state_hash(&self.state) }
    }

    fn debug_check(&self) {
        if cfg!(debug_assertions) {
            if let Err(e) = self.state.validate() { panic!("match invariant broken: {}", e); }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRolls;

    fn two_players(script: &[u8]) -> Match<ScriptedRolls> {
        Match::new(vec![Player::new("a"), Player::new("b")], ScriptedRolls::new(script).unwrap()).unwrap()
    }

    #[test]
    fn first_roll_only_advances_turn() {
        let mut m = two_players(&[1, 2, 3, 4, 6]);
        let events = m.roll().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].ty, EventType::Roll);
        assert_eq!(m.state().current_player_idx, 1);
        assert_eq!(m.state().current_player().name, "b");
        assert!(m.state().history.is_empty());
    }

    #[test]
    fn events_are_sequenced() {
        let mut m = two_players(&[1, 2, 3, 4, 6, 1, 2, 3, 4, 5]);
        let events = m.roll().unwrap().into_iter().chain(m.roll().unwrap()).collect::<Vec<_>>();
        let seqs: Vec<u64> = events.iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
        assert_eq!(events[2].ty, EventType::RoundWon);
    }

    #[test]
    fn broken_roll_source_leaves_state_untouched() {
        struct Short;
        impl RollSource for Short {
            fn roll_one(&mut self) -> DieValue { DieValue::new(3).unwrap() }
            fn roll_batch(&mut self, _n: usize) -> Vec<DieValue> { vec![self.roll_one()] }
        }
        let mut m = Match::new(vec![Player::new("a")], Short).unwrap();
        let before = m.snapshot();
        assert!(m.roll().is_err());
        assert_eq!(m.snapshot(), before);
    }

    /// Good batch first, then a short one.
    struct ShortAfterFirst { calls: usize }
    impl RollSource for ShortAfterFirst {
        fn roll_one(&mut self) -> DieValue { DieValue::new(2).unwrap() }
        fn roll_batch(&mut self, n: usize) -> Vec<DieValue> {
            self.calls += 1;
            if self.calls == 1 {
                [1, 1, 2, 2, 3].iter().map(|&f| DieValue::new(f).unwrap()).collect()
            } else {
                (0..n - 1).map(|_| self.roll_one()).collect()
            }
        }
    }

    #[test]
    fn failed_roll_keeps_pending_reset() {
        let mut m = Match::new(vec![Player::new("a")], ShortAfterFirst { calls: 0 }).unwrap().with_reset_delay(Some(500));
        m.roll().unwrap();
        let before = m.snapshot();
        assert_eq!(before.scheduled_reset, Some(ScheduledReset { phase: RoundPhase::Normal, delay_ms: 500 }));
        let err = m.roll().unwrap_err();
        assert!(matches!(err, crate::error::EngineError::RollCountMismatch { expected: 5, got: 4, .. }));
        assert_eq!(m.snapshot(), before);
        assert_eq!(m.state().buffer.entries(), before.history[0].entries());
    }

    #[test]
    fn state_hash_follows_dice_not_just_position() {
        let mut a = two_players(&[1, 2, 3, 4, 6]);
        let mut b = two_players(&[1, 2, 3, 4, 5]);
        let ha = a.roll().unwrap().pop().unwrap().state_hash;
        let hb = b.roll().unwrap().pop().unwrap().state_hash;
        assert_ne!(ha, hb);
        let mut c = two_players(&[1, 2, 3, 4, 6]);
        assert_eq!(c.roll().unwrap().pop().unwrap().state_hash, ha);
    }
}
