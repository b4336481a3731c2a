//! # Topology Module
//!
//! Immutable description of a signalised junction: roads, lanes, traffic
//! lights and compass orientation.
//!
//! ## Conventions
//!
//! ```text
//!                N (0)
//!                 │
//!        W (3) ── ┼ ── E (1)
//!                 │
//!                S (2)
//! ```
//!
//! - Compass sides are numbered clockwise N=0, E=1, S=2, W=3. Two sides are
//!   perpendicular when their values sum to an odd number, opposite when even.
//! - Lane IDs encode their road: `lane_id / 10 == road_id`.
//! - Lanes within a road are ordered rightmost to leftmost as observed from
//!   the origin side.
//!
//! ## Components
//!
//! - [`sides::CompassSide`] - Arrival/departure side of a road
//! - [`sides::Turn`] - Movement classification (right / straight / left)
//! - [`road::Road`], [`road::Lane`] - Immutable road and lane descriptions
//! - [`junction::Junction`] - The validated aggregate, owner of the
//!   enumerated phase set
//! - [`junction::JunctionDescription`] - The structured topology intake
//! - [`junction::TopologyError`] - Construction-time invariant violations
//!
//! ## Usage
//!
//! ```rust
//! use junction_sim_core::topology::{
//!     CompassSide, Junction, JunctionDescription, LaneDescription, RoadDescription,
//! };
//! use junction_sim_core::traffic_lights::lights::TrafficLightID;
//! use junction_sim_core::topology::LightDescription;
//! use junction_sim_core::traffic_lights::states::LightState;
//!
//! let description = JunctionDescription {
//!     id: 1,
//!     roads: vec![RoadDescription {
//!         id: 11,
//!         from_side: CompassSide::South,
//!         to_side: CompassSide::North,
//!         lanes: vec![LaneDescription::new(111).with_arrival_rate(0.2)],
//!     }],
//!     lights: vec![LightDescription {
//!         id: TrafficLightID(1),
//!         origins: vec![111],
//!         destinations: vec![111],
//!         initial_state: LightState::Red,
//!     }],
//! };
//! let junction = Junction::build(description).unwrap();
//! assert_eq!(junction.get_phases().len(), 1);
//! ```
pub mod junction;
pub mod road;
pub mod sides;

pub use self::junction::{
    Junction, JunctionDescription, JunctionID, LaneDescription, LightDescription,
    RoadDescription, TopologyError,
};
pub use self::road::{road_of_lane, Lane, LaneID, Road, RoadID};
pub use self::sides::{CompassSide, CompassSideError, Turn};
