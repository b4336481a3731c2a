//! Deterministic random number generation helpers.
//!
//! The simulator threads a single explicit `StdRng` through every random
//! draw; [`seeded_rng`] is the one place that decides between a pinned seed
//! and operating-system entropy.
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Builds the simulator's generator: seeded when a seed is pinned, from
/// operating-system entropy otherwise.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}
