//! # Index Sources
//!
//! Oracle index assignment and request index selection both draw from an
//! injected [`IndexSource`]. Production uses [`RandomIndexSource`]; tests use
//! [`ScriptedIndexSource`] to fix the sequence.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of indexes in `0..space`
pub trait IndexSource {
    fn next_index(&mut self, space: u8) -> u8;
}

/// Pseudo-random indexes from a seedable RNG
#[derive(Debug, Clone)]
pub struct RandomIndexSource {
    rng: StdRng,
}

impl RandomIndexSource {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl IndexSource for RandomIndexSource {
    fn next_index(&mut self, space: u8) -> u8 {
        self.rng.gen_range(0..space)
    }
}

/// Replays a fixed script, cycling when exhausted. Values are reduced modulo
/// the requested space.
#[derive(Debug, Clone)]
pub struct ScriptedIndexSource {
    script: VecDeque<u8>,
}

impl ScriptedIndexSource {
    pub fn new(script: impl IntoIterator<Item = u8>) -> Self {
        let script: VecDeque<u8> = script.into_iter().collect();
        Self { script }
    }
}

impl IndexSource for ScriptedIndexSource {
    fn next_index(&mut self, space: u8) -> u8 {
        match self.script.pop_front() {
            Some(index) => {
                self.script.push_back(index);
                index % space
            }
            None => 0,
        }
    }
}
