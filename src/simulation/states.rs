use crate::agents::{VehicleID, VehicleKind};
use crate::topology::junction::JunctionID;
use crate::topology::road::{LaneID, RoadID};
use crate::traffic_lights::lights::TrafficLightID;
use crate::traffic_lights::states::LightState;
use serde_json::{json, Value};
use std::collections::HashSet;

/// State of a single vehicle at a specific step.
#[derive(Debug, Clone)]
pub struct VehicleObservation {
    pub id: VehicleID,
    pub distance: f64,
    pub velocity: f64,
    pub kind: VehicleKind,
    pub destination: Option<LaneID>,
}

/// State of a single lane at a specific step: the vehicles occupying it, in
/// queue order.
#[derive(Debug, Clone)]
pub struct LaneObservation {
    pub id: LaneID,
    pub vehicles: Vec<VehicleObservation>,
}

/// Congestion indicator of a road: the number of vehicles across its lanes.
#[derive(Debug, Clone)]
pub struct RoadObservation {
    pub id: RoadID,
    pub congestion: usize,
}

/// State of a single signal head at a specific step.
#[derive(Debug, Clone)]
pub struct LightObservation {
    pub id: TrafficLightID,
    pub state: LightState,
    pub in_amber: bool,
}

/// Immutable state dump published by the simulator after every step.
///
/// This is the structural contract consumed by the controller and by any
/// telemetry subscriber; encoding and transport are collaborator concerns.
#[derive(Debug, Clone)]
pub struct ObservationSnapshot {
    pub junction_id: JunctionID,
    /// Wall-clock capture time in milliseconds since the Unix epoch.
    pub timestamp_ms: u128,
    /// Simulated time in seconds (`step * Δt`): the controller's clock.
    pub sim_time: f64,
    /// Step counter at capture.
    pub step: i64,
    pub lights: Vec<LightObservation>,
    pub roads: Vec<RoadObservation>,
    pub lanes: Vec<LaneObservation>,
    /// Colliding vehicle pairs detected this tick.
    pub collisions: u32,
}

impl ObservationSnapshot {
    /// Looks up a lane observation by lane ID.
    pub fn lane(&self, id: LaneID) -> Option<&LaneObservation> {
        self.lanes.iter().find(|lane| lane.id == id)
    }

    /// Total number of observed vehicles.
    pub fn vehicle_count(&self) -> usize {
        self.lanes.iter().map(|lane| lane.vehicles.len()).sum()
    }

    /// The set of every vehicle ID observed anywhere in the junction.
    pub fn observed_vehicle_ids(&self) -> HashSet<VehicleID> {
        self.lanes
            .iter()
            .flat_map(|lane| lane.vehicles.iter().map(|vehicle| vehicle.id))
            .collect()
    }

    /// Shapes the snapshot as a JSON value for collaborators.
    ///
    /// # Example
    /// ```
    /// use junction_sim_core::simulation::config::SimulationConfig;
    /// use junction_sim_core::simulation::simulator::Simulator;
    /// use junction_sim_core::utils::fixtures::reference_four_arm_junction;
    /// use std::sync::Arc;
    ///
    /// let mut simulator = Simulator::new(
    ///     Arc::new(reference_four_arm_junction()),
    ///     SimulationConfig::new().with_seed(1).build(),
    /// );
    /// let snapshot = simulator.step().unwrap();
    /// let payload = snapshot.to_json();
    /// assert_eq!(payload["junction_id"], 1);
    /// ```
    pub fn to_json(&self) -> Value {
        json!({
            "junction_id": self.junction_id,
            "timestamp_ms": self.timestamp_ms as u64,
            "sim_time": self.sim_time,
            "step": self.step,
            "collisions": self.collisions,
            "lights": self.lights.iter().map(|light| json!({
                "id": light.id.0,
                "state": light.state.to_string(),
                "in_amber": light.in_amber,
            })).collect::<Vec<_>>(),
            "roads": self.roads.iter().map(|road| json!({
                "id": road.id,
                "congestion": road.congestion,
            })).collect::<Vec<_>>(),
            "lanes": self.lanes.iter().map(|lane| json!({
                "id": lane.id,
                "vehicles": lane.vehicles.iter().map(|vehicle| json!({
                    "id": vehicle.id,
                    "distance": vehicle.distance,
                    "velocity": vehicle.velocity,
                    "kind": vehicle.kind.to_string(),
                    "destination": vehicle.destination,
                })).collect::<Vec<_>>(),
            })).collect::<Vec<_>>(),
        })
    }
}
