// src/agents/mod.rs
//! # Agents Module
//!
//! Vehicles flowing across the junction.
//!
//! ## Key Components
//!
//! - [`Vehicle`] - The primary agent, owned by the lane it currently occupies
//! - [`VehicleKind`] - Normal traffic vs priority vehicles
//!
//! ## Lifecycle
//!
//! A vehicle spawns at the far end of a lane (`distance == lane length`),
//! approaches the stop line as its distance decreases, crosses the junction
//! once the distance goes negative, and is destroyed when it falls below the
//! configured exit threshold.
//!
//! ## Usage
//!
//! ```rust
//! use junction_sim_core::agents::{Vehicle, VehicleKind};
//!
//! let vehicle = Vehicle::new(1)
//!     .with_origin_lane(111)
//!     .with_destination_lane(124)
//!     .with_distance(500.0)
//!     .with_velocity(40.0)
//!     .build();
//! assert_eq!(vehicle.kind, VehicleKind::Normal);
//! ```
mod vehicle;

pub use self::vehicle::*;
