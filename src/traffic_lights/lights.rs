use crate::topology::road::{road_of_lane, LaneID, RoadID};
use crate::traffic_lights::states::LightState;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrafficLightID(pub i64);

impl fmt::Display for TrafficLightID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error types for TrafficLight operations.
#[derive(Debug)]
pub enum TrafficLightError {
    NotFound,
    AlreadyExists,
}

impl fmt::Display for TrafficLightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrafficLightError::NotFound => write!(f, "No traffic light was found"),
            TrafficLightError::AlreadyExists => write!(f, "Traffic light already exists"),
        }
    }
}

impl std::error::Error for TrafficLightError {}

/// A signal head guarding a set of origin lanes of a single road.
///
/// Vehicles on an origin lane may move onto any of the destination lanes when
/// the light is green. The set of destination roads, together with the origin
/// road's arrival side, defines which turn types the light permits; the phase
/// enumerator derives its conflict predicates from exactly this information.
#[derive(Debug, Clone)]
pub struct TrafficLight {
    /// Traffic light identifier.
    id: TrafficLightID,
    /// Origin lane IDs. Invariant: non-empty, all on the same road.
    origins: Vec<LaneID>,
    /// Destination lane IDs reachable through this light.
    destinations: Vec<LaneID>,
    /// Commanded state at construction time.
    state: LightState,
}

impl TrafficLight {
    /// Creates a new `TrafficLightBuilder` for constructing a `TrafficLight`.
    ///
    /// # Arguments
    /// * `id` - The identifier for the traffic light.
    ///
    /// # Returns
    /// A `TrafficLightBuilder` instance for configuring and building the light.
    pub fn new(id: TrafficLightID) -> TrafficLightBuilder {
        TrafficLightBuilder {
            traffic_light: TrafficLight {
                id,
                origins: Vec::new(),
                destinations: Vec::new(),
                state: LightState::Red,
            },
        }
    }

    /// Returns the unique identifier (ID) of the traffic light
    pub fn get_id(&self) -> TrafficLightID {
        self.id
    }

    /// Returns the origin lane IDs guarded by this light.
    pub fn get_origins(&self) -> &[LaneID] {
        &self.origins
    }

    /// Returns the destination lane IDs reachable through this light.
    pub fn get_destinations(&self) -> &[LaneID] {
        &self.destinations
    }

    /// Returns the initial commanded state of the light.
    pub fn get_initial_state(&self) -> LightState {
        self.state
    }

    /// Returns the road the origin lanes belong to.
    ///
    /// Derived from the first origin lane via the `lane_id / 10` encoding.
    /// Junction validation guarantees origins are non-empty and share a road.
    pub fn origin_road(&self) -> RoadID {
        road_of_lane(self.origins[0])
    }

    /// Returns the distinct destination road IDs, in first-seen order.
    pub fn destination_roads(&self) -> Vec<RoadID> {
        let mut roads: Vec<RoadID> = Vec::new();
        for dest in &self.destinations {
            let road_id = road_of_lane(*dest);
            if !roads.contains(&road_id) {
                roads.push(road_id);
            }
        }
        roads
    }

    /// Checks whether the given lane is one of this light's origins.
    pub fn controls_lane(&self, lane_id: LaneID) -> bool {
        self.origins.contains(&lane_id)
    }
}

/// A builder for constructing `TrafficLight` instances.
pub struct TrafficLightBuilder {
    traffic_light: TrafficLight,
}

impl TrafficLightBuilder {
    /// Sets the origin lane IDs for the traffic light.
    pub fn with_origins(mut self, origins: Vec<LaneID>) -> Self {
        self.traffic_light.origins = origins;
        self
    }

    /// Sets the destination lane IDs for the traffic light.
    pub fn with_destinations(mut self, destinations: Vec<LaneID>) -> Self {
        self.traffic_light.destinations = destinations;
        self
    }

    /// Sets the initial commanded state for the traffic light.
    pub fn with_state(mut self, state: LightState) -> Self {
        self.traffic_light.state = state;
        self
    }

    /// Builds and returns the final `TrafficLight` instance.
    pub fn build(self) -> TrafficLight {
        self.traffic_light
    }
}
