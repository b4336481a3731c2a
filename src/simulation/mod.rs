//! # Simulation module
//!
//! **Microscopic simulator** - deterministic kinematic simulation of vehicles
//! flowing across the junction, obeying the signal states it is given and
//! producing the observation snapshots the controller consumes.
//!
//! ## Purpose
//!
//! - Advances vehicle kinematics by a fixed time step
//! - Spawns vehicles per lane from a Poisson arrival process
//! - Transfers vehicles across the junction according to their turn geometry
//! - Counts collisions between crossing trajectories (observation only)
//! - Publishes an immutable observation snapshot after every step
//!
//! ## Simulation pipeline
//!
//! The simulator executes the following pipeline in
//! [`Simulator::step()`](crate::simulation::simulator::Simulator::step):
//! ```text
//! 1. Ingest cached signal states   ← applied via apply_signals()
//! 2. Kinematic update per vehicle  ← kinematics module
//! 3. Lane transfers / despawns     ← transfer module
//! 4. Spawn vehicles                ← spawn module
//! 5. Count collisions              ← collisions module
//! 6. Publish observation snapshot  ← states module
//! ```
//!
//! ## Components
//!
//! - [`config::SimulationConfig`] - Time step, geometry and RNG seeding knobs
//! - [`traffic::LaneTraffic`] - Per-lane vehicle queues (vehicles are owned by
//!   their current lane; a transfer is a move)
//! - [`simulator::Simulator`] - The stepping engine
//! - [`states::ObservationSnapshot`] - Immutable state dump published per step
//! - [`simulator::SimulationError`] - Per-tick fault surfaced to the loop layer
//!
//! ## Determinism
//!
//! All randomness is drawn from a single seeded `StdRng` owned by the
//! simulator. Given the same topology, the same signal stream and the same
//! seed, two runs produce identical vehicle trajectories.
//!
//! ## Usage
//!
//! ```rust
//! use junction_sim_core::simulation::config::SimulationConfig;
//! use junction_sim_core::simulation::simulator::Simulator;
//! use junction_sim_core::utils::fixtures::reference_four_arm_junction;
//! use std::sync::Arc;
//!
//! let junction = Arc::new(reference_four_arm_junction());
//! let config = SimulationConfig::new().with_seed(42).build();
//! let mut simulator = Simulator::new(junction, config);
//! for _ in 0..10 {
//!     let snapshot = simulator.step().unwrap();
//!     println!("step {} vehicles {}", snapshot.step, snapshot.vehicle_count());
//! }
//! ```
pub mod collisions;
pub mod config;
pub mod kinematics;
pub mod simulator;
pub mod spawn;
pub mod states;
pub mod traffic;
pub mod transfer;
