//! Roll sources: where die faces come from.
//!
//! The match only ever talks to [`RollSource`], so tests can swap the
//! seeded generator for a [`ScriptedRolls`] that replays fixed faces.

use std::collections::VecDeque;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::error::{EngineError, Result};
use crate::model::DieValue;

pub trait RollSource {
    /// One independent, uniformly distributed face.
    fn roll_one(&mut self) -> DieValue;

    fn roll_batch(&mut self, n: usize) -> Vec<DieValue> {
        (0..n).map(|_| self.roll_one()).collect()
    }
}

/// Reproducible rolls from a fixed seed.
#[derive(Clone, Debug)]
pub struct SeededRolls {
    rng: StdRng,
    seed: u64,
}

impl SeededRolls {
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed ^ 0x5EED), seed }
    }

    /// Seeded from OS entropy; the chosen seed is kept so a match can be replayed.
    pub fn from_entropy() -> Self { Self::new(rand::thread_rng().gen()) }

    pub fn seed(&self) -> u64 { self.seed }
}

impl RollSource for SeededRolls {
    fn roll_one(&mut self) -> DieValue {
        let face: u8 = self.rng.gen_range(DieValue::MIN..=DieValue::MAX);
        DieValue::try_from(face).unwrap_or_else(|_| unreachable!("gen_range stays within 1..=6"))
    }
}

/// Replays a fixed list of faces, cycling once exhausted.
#[derive(Clone, Debug)]
pub struct ScriptedRolls {
    queue: VecDeque<DieValue>,
    script: Vec<DieValue>,
}

impl ScriptedRolls {
    pub fn new(faces: &[u8]) -> Result<Self> {
        let script = faces.iter().map(|&f| DieValue::new(f)).collect::<Result<Vec<_>>>()?;
        if script.is_empty() { return Err(EngineError::EmptyScript); }
        Ok(Self { queue: script.iter().copied().collect(), script })
    }

    pub fn remaining(&self) -> usize { self.queue.len() }
}

impl RollSource for ScriptedRolls {
    fn roll_one(&mut self) -> DieValue {
        if self.queue.is_empty() { self.queue.extend(self.script.iter().copied()); }
        self.queue.pop_front().unwrap_or(self.script[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_rolls_are_reproducible() {
        let mut a = SeededRolls::new(42);
        let mut b = SeededRolls::new(42);
        assert_eq!(a.roll_batch(50), b.roll_batch(50));
    }

    #[test]
    fn seeded_rolls_stay_in_range() {
        let mut rolls = SeededRolls::new(7);
        for d in rolls.roll_batch(1000) {
            assert!((1..=6).contains(&d.get()));
        }
    }

    #[test]
    fn seeded_rolls_cover_every_face() {
        let mut rolls = SeededRolls::new(9);
        let mut seen = [false; 6];
        for d in rolls.roll_batch(600) { seen[d.slot()] = true; }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn batch_sizes() {
        let mut rolls = SeededRolls::from_entropy();
        assert_eq!(rolls.roll_batch(5).len(), 5);
        assert_eq!(rolls.roll_batch(3).len(), 3);
    }

    #[test]
    fn scripted_rolls_cycle() {
        let mut rolls = ScriptedRolls::new(&[1, 2, 3]).unwrap();
        let faces: Vec<u8> = rolls.roll_batch(5).into_iter().map(u8::from).collect();
        assert_eq!(faces, vec![1, 2, 3, 1, 2]);
        assert_eq!(rolls.remaining(), 1);
    }

    #[test]
    fn scripted_rolls_reject_bad_faces() {
        assert!(ScriptedRolls::new(&[1, 9]).is_err());
    }

    #[test]
    fn empty_script_is_an_error() {
        assert!(matches!(ScriptedRolls::new(&[]), Err(EngineError::EmptyScript)));
    }
}
