//! Seeded demo input
//!
//! A [`Pilot`] stands in for a player in demo rounds and tests. It holds a
//! run direction for a random number of ticks, mostly rightward, and taps
//! jump now and then. Same seed, same inputs.

use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::tick::PlayerInput;

/// Chance per tick of pressing jump
const JUMP_CHANCE: f64 = 0.04;
/// Chance that a new hold heads right rather than left or nowhere
const RIGHT_BIAS: f64 = 0.7;
/// Hold lengths, in ticks
const MIN_HOLD: u32 = 10;
const MAX_HOLD: u32 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Heading {
    Left,
    Right,
    Still,
}

/// Random input source for one player
#[derive(Debug, Clone)]
pub struct Pilot {
    seed: u64,
    rng: Pcg32,
    heading: Heading,
    hold: u32,
}

impl Pilot {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            heading: Heading::Still,
            hold: 0,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Commands for the next tick
    pub fn next_input(&mut self) -> PlayerInput {
        if self.hold == 0 {
            self.heading = if self.rng.random_bool(RIGHT_BIAS) {
                Heading::Right
            } else if self.rng.random_bool(0.5) {
                Heading::Left
            } else {
                Heading::Still
            };
            self.hold = self.rng.random_range(MIN_HOLD..=MAX_HOLD);
        }
        self.hold -= 1;

        PlayerInput {
            left: self.heading == Heading::Left,
            right: self.heading == Heading::Right,
            jump: self.rng.random_bool(JUMP_CHANCE),
        }
    }
}
