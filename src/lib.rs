//! # junction_sim_core
//!
//! Core library for signalised junction simulation with adaptive
//! traffic-light control.
//!
//! Three tightly coupled components form a closed loop:
//!
//! - the **phase enumerator** ([`phases`]) computes, once per topology, every
//!   maximal subset of traffic lights whose movements are mutually
//!   non-conflicting;
//! - the **adaptive controller** ([`control`]) scores those phases each
//!   control tick from live vehicle observations and picks the one to hold
//!   green;
//! - the **microscopic simulator** ([`simulation`]) advances vehicle
//!   kinematics under the commanded signal states and publishes the
//!   observation snapshots the controller consumes.
//!
//! The **coordinator** ([`coordinator`]) owns both periodic loops, smooths
//! signal transitions through amber and falls back to all-red when the
//! control exchange breaks down.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use junction_sim_core::control::Tunables;
//! use junction_sim_core::coordinator::{Coordinator, CoordinatorConfig};
//! use junction_sim_core::utils::fixtures::reference_four_arm_description;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut coordinator = Coordinator::build(
//!         reference_four_arm_description(0.5),
//!         CoordinatorConfig::default(),
//!     )
//!     .unwrap();
//!     coordinator.set_strategy("smart_fair", Tunables::default()).unwrap();
//!     coordinator.start().await.unwrap();
//!     tokio::time::sleep(std::time::Duration::from_secs(5)).await;
//!     coordinator.stop().await.unwrap();
//! }
//! ```
pub mod agents;
pub mod control;
pub mod coordinator;
pub mod phases;
pub mod simulation;
pub mod topology;
pub mod traffic_lights;
pub mod utils;
pub mod verbose;
