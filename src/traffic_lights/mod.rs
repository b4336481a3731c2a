//! # Traffic Lights Module
//!
//! Signal heads controlling movements across the junction.
//!
//! A [`lights::TrafficLight`] guards a set of *origin* lanes (all on one road)
//! and permits movement onto a set of *destination* lanes. Its commanded
//! state is binary (red/green); the transient amber flag added during state
//! changes is runtime signal state, kept on the [`states::SignalBoard`] owned
//! by the simulator rather than on the light itself.
//!
//! ## Components
//!
//! - [`lights::TrafficLight`] - A signal head with origin and destination lanes
//! - [`lights::TrafficLightID`] - Unique identifier for signal heads
//! - [`states::LightState`] - Commanded state (red or green)
//! - [`states::SignalState`] - Runtime state: commanded state plus amber flag
//! - [`states::SignalBoard`] - The per-junction board of runtime signal states
//! - [`states::SignalUpdate`] - A single `{light, state, amber}` update
//!
//! ## Usage
//!
//! ```rust
//! use junction_sim_core::traffic_lights::lights::{TrafficLight, TrafficLightID};
//! use junction_sim_core::traffic_lights::states::LightState;
//!
//! let light = TrafficLight::new(TrafficLightID(1))
//!     .with_origins(vec![111, 112])
//!     .with_destinations(vec![111, 112])
//!     .with_state(LightState::Red)
//!     .build();
//! assert_eq!(light.get_origins(), &[111, 112]);
//! ```
pub mod lights;
pub mod states;
