//! RNG trait abstraction for the simulation
//!
//! Every rule takes its randomness as an explicit parameter so tests can
//! substitute a scripted or seeded source:
//! - Rust's thread_rng() for interactive hosts
//! - a seeded Xoshiro256StarStar for reproducible runs

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

/// Seedable generator used by headless runs and tests
pub type SimRng = Xoshiro256StarStar;

/// Create a reproducible generator from a seed
pub fn seeded_rng(seed: u64) -> SimRng {
    Xoshiro256StarStar::seed_from_u64(seed)
}

/// Random number generator trait for the update rules
pub trait WorldRng {
    /// Generate random boolean with 50% probability
    fn gen_bool(&mut self) -> bool;

    /// Generate random f32 in [0.0, 1.0)
    fn gen_f32(&mut self) -> f32;

    /// Check if random value is less than probability threshold
    fn check_probability(&mut self, probability: f32) -> bool {
        self.gen_f32() < probability
    }

    /// Uniform f32 in [min, max)
    fn gen_range_f32(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.gen_f32()
    }
}

// Blanket implementation for any type implementing rand::Rng
impl<T: ?Sized + rand::Rng> WorldRng for T {
    fn gen_bool(&mut self) -> bool {
        rand::Rng::r#gen(self)
    }

    fn gen_f32(&mut self) -> f32 {
        rand::Rng::r#gen(self)
    }
}
