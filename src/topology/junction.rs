use crate::phases::enumerator::maximal_phases;
use crate::phases::Phase;
use crate::topology::road::{road_of_lane, Lane, LaneID, Road, RoadID};
use crate::topology::sides::CompassSide;
use crate::traffic_lights::lights::{TrafficLight, TrafficLightID};
use crate::traffic_lights::states::LightState;
use std::collections::HashSet;
use std::fmt;

/// Alias for junction identifiers.
pub type JunctionID = i64;

/// Construction-time violations of the topology invariants.
///
/// Surfaced to the caller from [`Junction::build`]; no partial junction is
/// retained when any variant is returned.
#[derive(Debug, Clone)]
pub enum TopologyError {
    /// A lane ID does not satisfy the `lane_id / 10 == road_id` encoding.
    LaneEncodingMismatch { lane_id: LaneID, road_id: RoadID },
    /// A road was declared without lanes.
    RoadWithoutLanes(RoadID),
    /// Duplicate road identifier in the description.
    DuplicateRoad(RoadID),
    /// Duplicate lane identifier in the description.
    DuplicateLane(LaneID),
    /// Duplicate traffic light identifier in the description.
    DuplicateLight(TrafficLightID),
    /// A traffic light was declared with no origin lanes.
    LightWithoutOrigins(TrafficLightID),
    /// A traffic light's origin lanes span more than one road.
    OriginsSpanRoads(TrafficLightID),
    /// A traffic light references an origin lane that does not exist.
    UnknownOriginLane {
        light_id: TrafficLightID,
        lane_id: LaneID,
    },
    /// A traffic light references a destination lane that does not exist.
    UnknownDestinationLane {
        light_id: TrafficLightID,
        lane_id: LaneID,
    },
}

impl fmt::Display for TopologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopologyError::LaneEncodingMismatch { lane_id, road_id } => write!(
                f,
                "Lane '{}' does not encode its road '{}' (expected lane_id / 10 == road_id)",
                lane_id, road_id
            ),
            TopologyError::RoadWithoutLanes(road_id) => {
                write!(f, "Road '{}' has no lanes", road_id)
            }
            TopologyError::DuplicateRoad(road_id) => {
                write!(f, "Duplicate road identifier '{}'", road_id)
            }
            TopologyError::DuplicateLane(lane_id) => {
                write!(f, "Duplicate lane identifier '{}'", lane_id)
            }
            TopologyError::DuplicateLight(light_id) => {
                write!(f, "Duplicate traffic light identifier '{}'", light_id)
            }
            TopologyError::LightWithoutOrigins(light_id) => {
                write!(f, "Traffic light '{}' has no origin lanes", light_id)
            }
            TopologyError::OriginsSpanRoads(light_id) => write!(
                f,
                "Traffic light '{}' has origin lanes on more than one road",
                light_id
            ),
            TopologyError::UnknownOriginLane { light_id, lane_id } => write!(
                f,
                "Traffic light '{}' references unknown origin lane '{}'",
                light_id, lane_id
            ),
            TopologyError::UnknownDestinationLane { light_id, lane_id } => write!(
                f,
                "Traffic light '{}' references unknown destination lane '{}'",
                light_id, lane_id
            ),
        }
    }
}

impl std::error::Error for TopologyError {}

/// Structured lane description accepted by the topology intake.
#[derive(Debug, Clone)]
pub struct LaneDescription {
    pub id: LaneID,
    pub length: f64,
    pub max_velocity: f64,
    pub max_acceleration: f64,
    pub max_deceleration: f64,
    pub arrival_rate: f64,
}

impl LaneDescription {
    /// A lane description with default physical parameters.
    pub fn new(id: LaneID) -> Self {
        LaneDescription {
            id,
            length: 500.0,
            max_velocity: 15.0,
            max_acceleration: 3.0,
            max_deceleration: 5.0,
            arrival_rate: 0.0,
        }
    }

    pub fn with_length(mut self, length: f64) -> Self {
        self.length = length;
        self
    }

    pub fn with_max_velocity(mut self, max_velocity: f64) -> Self {
        self.max_velocity = max_velocity;
        self
    }

    pub fn with_arrival_rate(mut self, arrival_rate: f64) -> Self {
        self.arrival_rate = arrival_rate;
        self
    }

    pub fn with_max_acceleration(mut self, max_acceleration: f64) -> Self {
        self.max_acceleration = max_acceleration;
        self
    }

    pub fn with_max_deceleration(mut self, max_deceleration: f64) -> Self {
        self.max_deceleration = max_deceleration;
        self
    }
}

/// Structured road description accepted by the topology intake.
#[derive(Debug, Clone)]
pub struct RoadDescription {
    pub id: RoadID,
    pub from_side: CompassSide,
    pub to_side: CompassSide,
    pub lanes: Vec<LaneDescription>,
}

/// Structured traffic light description accepted by the topology intake.
#[derive(Debug, Clone)]
pub struct LightDescription {
    pub id: TrafficLightID,
    pub origins: Vec<LaneID>,
    pub destinations: Vec<LaneID>,
    pub initial_state: LightState,
}

/// Structured junction description accepted by the topology intake.
#[derive(Debug, Clone)]
pub struct JunctionDescription {
    pub id: JunctionID,
    pub roads: Vec<RoadDescription>,
    pub lights: Vec<LightDescription>,
}

/// The aggregate junction: roads, lanes, traffic lights and the precomputed
/// set of maximal compatible phases.
///
/// Structurally immutable once built; only per-tick state (vehicle positions,
/// signal states) mutates, and that state lives in the simulator. Downstream
/// components hold the junction behind an `Arc` and treat it as read-only.
#[derive(Debug)]
pub struct Junction {
    id: JunctionID,
    roads: Vec<Road>,
    lights: Vec<TrafficLight>,
    phases: Vec<Phase>,
}

impl Junction {
    /// Validates a junction description and builds the immutable aggregate,
    /// enumerating its maximal compatible phases in the process.
    ///
    /// Validation enforces:
    /// - every lane ID matches the `road_id * 10 + k` encoding,
    /// - every road has at least one lane, no duplicate road/lane/light IDs,
    /// - every light's origins are a non-empty subset of one road's lanes,
    /// - every origin and destination lane exists.
    ///
    /// Destination lanes on the origin road itself are accepted: in this
    /// topology a road runs through the junction from its arrival side to its
    /// departure side, so a same-road destination encodes the straight-through
    /// movement rather than a U-turn.
    pub fn build(description: JunctionDescription) -> Result<Junction, TopologyError> {
        let mut road_ids: HashSet<RoadID> = HashSet::new();
        let mut lane_ids: HashSet<LaneID> = HashSet::new();

        let mut roads: Vec<Road> = Vec::with_capacity(description.roads.len());
        for road_desc in &description.roads {
            if !road_ids.insert(road_desc.id) {
                return Err(TopologyError::DuplicateRoad(road_desc.id));
            }
            if road_desc.lanes.is_empty() {
                return Err(TopologyError::RoadWithoutLanes(road_desc.id));
            }
            let mut lanes: Vec<Lane> = Vec::with_capacity(road_desc.lanes.len());
            for lane_desc in &road_desc.lanes {
                if road_of_lane(lane_desc.id) != road_desc.id {
                    return Err(TopologyError::LaneEncodingMismatch {
                        lane_id: lane_desc.id,
                        road_id: road_desc.id,
                    });
                }
                if !lane_ids.insert(lane_desc.id) {
                    return Err(TopologyError::DuplicateLane(lane_desc.id));
                }
                lanes.push(
                    Lane::new(lane_desc.id)
                        .with_length(lane_desc.length)
                        .with_max_velocity(lane_desc.max_velocity)
                        .with_max_acceleration(lane_desc.max_acceleration)
                        .with_max_deceleration(lane_desc.max_deceleration)
                        .with_arrival_rate(lane_desc.arrival_rate)
                        .build(),
                );
            }
            roads.push(
                Road::new(road_desc.id, road_desc.from_side, road_desc.to_side)
                    .with_lanes(lanes)
                    .build(),
            );
        }

        let mut light_ids: HashSet<TrafficLightID> = HashSet::new();
        let mut lights: Vec<TrafficLight> = Vec::with_capacity(description.lights.len());
        for light_desc in &description.lights {
            if !light_ids.insert(light_desc.id) {
                return Err(TopologyError::DuplicateLight(light_desc.id));
            }
            if light_desc.origins.is_empty() {
                return Err(TopologyError::LightWithoutOrigins(light_desc.id));
            }
            let origin_road = road_of_lane(light_desc.origins[0]);
            for origin in &light_desc.origins {
                if road_of_lane(*origin) != origin_road {
                    return Err(TopologyError::OriginsSpanRoads(light_desc.id));
                }
                if !lane_ids.contains(origin) {
                    return Err(TopologyError::UnknownOriginLane {
                        light_id: light_desc.id,
                        lane_id: *origin,
                    });
                }
            }
            for dest in &light_desc.destinations {
                if !lane_ids.contains(dest) {
                    return Err(TopologyError::UnknownDestinationLane {
                        light_id: light_desc.id,
                        lane_id: *dest,
                    });
                }
            }
            lights.push(
                TrafficLight::new(light_desc.id)
                    .with_origins(light_desc.origins.clone())
                    .with_destinations(light_desc.destinations.clone())
                    .with_state(light_desc.initial_state)
                    .build(),
            );
        }

        let phases = maximal_phases(&roads, &lights)?;

        Ok(Junction {
            id: description.id,
            roads,
            lights,
            phases,
        })
    }

    /// Returns the junction identifier.
    pub fn get_id(&self) -> JunctionID {
        self.id
    }

    /// Returns all roads of the junction.
    pub fn get_roads(&self) -> &[Road] {
        &self.roads
    }

    /// Returns all traffic lights of the junction.
    pub fn get_lights(&self) -> &[TrafficLight] {
        &self.lights
    }

    /// Returns the precomputed maximal compatible phases.
    pub fn get_phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Looks up a road by its identifier.
    pub fn get_road(&self, id: RoadID) -> Option<&Road> {
        self.roads.iter().find(|road| road.get_id() == id)
    }

    /// Looks up a lane by its identifier, together with its road.
    pub fn get_lane(&self, id: LaneID) -> Option<(&Road, &Lane)> {
        let road = self.get_road(road_of_lane(id))?;
        let lane = road.get_lane(id)?;
        Some((road, lane))
    }

    /// Looks up a traffic light by its identifier.
    pub fn get_light(&self, id: TrafficLightID) -> Option<&TrafficLight> {
        self.lights.iter().find(|light| light.get_id() == id)
    }

    /// Looks up the traffic light guarding the given origin lane.
    pub fn get_light_by_origin_lane(&self, lane_id: LaneID) -> Option<&TrafficLight> {
        self.lights.iter().find(|light| light.controls_lane(lane_id))
    }

    /// Returns the road arriving from the side opposite to the given road's
    /// arrival side, if the junction has one.
    pub fn opposing_road(&self, road: &Road) -> Option<&Road> {
        let from = road.get_from_side();
        self.roads.iter().find(|other| {
            other.get_id() != road.get_id()
                && other.get_from_side() != from
                && other.get_from_side().is_opposite_to(from)
        })
    }

    /// Iterates over every lane of every road.
    pub fn lanes(&self) -> impl Iterator<Item = &Lane> {
        self.roads.iter().flat_map(|road| road.get_lanes().iter())
    }
}
