use crate::topology::sides::CompassSide;

/// Alias for road identifiers.
pub type RoadID = i64;
/// Alias for lane identifiers. Lane IDs encode their road: `lane_id / 10 == road_id`.
pub type LaneID = i64;

/// Derives the road identifier from a lane identifier.
///
/// # Example
/// ```
/// use junction_sim_core::topology::road_of_lane;
/// assert_eq!(road_of_lane(112), 11);
/// assert_eq!(road_of_lane(147), 14);
/// ```
pub fn road_of_lane(lane_id: LaneID) -> RoadID {
    lane_id / 10
}

/// Physical description of a single lane.
///
/// A lane is immutable after junction construction; the vehicles currently
/// occupying it are runtime state owned by the simulator, not by this type.
#[derive(Debug, Clone)]
pub struct Lane {
    /// Lane identifier, encoded as `road_id * 10 + k`.
    id: LaneID,
    /// Physical length in distance units. Vehicles spawn at this distance.
    length: f64,
    /// Speed ceiling for the lane.
    max_velocity: f64,
    /// Maximum acceleration a vehicle may apply on this lane.
    max_acceleration: f64,
    /// Maximum deceleration (braking) a vehicle may apply on this lane.
    max_deceleration: f64,
    /// Stochastic arrival rate λ in vehicles per second. Zero disables spawning.
    arrival_rate: f64,
}

impl Lane {
    /// Creates a new `LaneBuilder` for constructing a `Lane`.
    ///
    /// # Example
    /// ```
    /// use junction_sim_core::topology::Lane;
    /// let lane = Lane::new(111)
    ///     .with_length(500.0)
    ///     .with_max_velocity(15.0)
    ///     .with_arrival_rate(0.2)
    ///     .build();
    /// assert_eq!(lane.get_id(), 111);
    /// ```
    pub fn new(id: LaneID) -> LaneBuilder {
        LaneBuilder {
            lane: Lane {
                id,
                length: 500.0,
                max_velocity: 15.0,
                max_acceleration: 3.0,
                max_deceleration: 5.0,
                arrival_rate: 0.0,
            },
        }
    }

    /// Returns the lane identifier.
    pub fn get_id(&self) -> LaneID {
        self.id
    }

    /// Returns the identifier of the road this lane belongs to.
    pub fn get_road_id(&self) -> RoadID {
        road_of_lane(self.id)
    }

    /// Returns the physical length of the lane.
    pub fn get_length(&self) -> f64 {
        self.length
    }

    /// Returns the speed ceiling of the lane.
    pub fn get_max_velocity(&self) -> f64 {
        self.max_velocity
    }

    /// Returns the maximum acceleration allowed on the lane.
    pub fn get_max_acceleration(&self) -> f64 {
        self.max_acceleration
    }

    /// Returns the maximum deceleration allowed on the lane.
    pub fn get_max_deceleration(&self) -> f64 {
        self.max_deceleration
    }

    /// Returns the stochastic arrival rate λ (vehicles/second).
    pub fn get_arrival_rate(&self) -> f64 {
        self.arrival_rate
    }
}

/// A builder for constructing `Lane` instances.
pub struct LaneBuilder {
    lane: Lane,
}

impl LaneBuilder {
    /// Sets the physical length of the lane.
    pub fn with_length(mut self, length: f64) -> Self {
        self.lane.length = length;
        self
    }

    /// Sets the speed ceiling of the lane.
    pub fn with_max_velocity(mut self, max_velocity: f64) -> Self {
        self.lane.max_velocity = max_velocity;
        self
    }

    /// Sets the maximum acceleration of the lane.
    pub fn with_max_acceleration(mut self, max_acceleration: f64) -> Self {
        self.lane.max_acceleration = max_acceleration;
        self
    }

    /// Sets the maximum deceleration of the lane.
    pub fn with_max_deceleration(mut self, max_deceleration: f64) -> Self {
        self.lane.max_deceleration = max_deceleration;
        self
    }

    /// Sets the stochastic arrival rate λ (vehicles/second).
    pub fn with_arrival_rate(mut self, arrival_rate: f64) -> Self {
        self.lane.arrival_rate = arrival_rate;
        self
    }

    /// Builds and returns the final `Lane` instance.
    pub fn build(self) -> Lane {
        self.lane
    }
}

/// A road arriving at the junction from one compass side and leaving towards
/// another. Immutable for the lifetime of a junction.
///
/// Lanes are ordered rightmost to leftmost as observed from the origin side.
/// The pair (from_side, to_side) defines the movement vector that the phase
/// enumerator uses to classify straight-through movements and turns.
#[derive(Debug, Clone)]
pub struct Road {
    id: RoadID,
    from_side: CompassSide,
    to_side: CompassSide,
    lanes: Vec<Lane>,
}

impl Road {
    /// Creates a new `RoadBuilder` for constructing a `Road`.
    ///
    /// # Example
    /// ```
    /// use junction_sim_core::topology::{CompassSide, Lane, Road};
    /// let road = Road::new(11, CompassSide::South, CompassSide::North)
    ///     .with_lanes(vec![Lane::new(111).build(), Lane::new(112).build()])
    ///     .build();
    /// assert_eq!(road.get_lanes().len(), 2);
    /// ```
    pub fn new(id: RoadID, from_side: CompassSide, to_side: CompassSide) -> RoadBuilder {
        RoadBuilder {
            road: Road {
                id,
                from_side,
                to_side,
                lanes: Vec::new(),
            },
        }
    }

    /// Returns the road identifier.
    pub fn get_id(&self) -> RoadID {
        self.id
    }

    /// Returns the side the road arrives from.
    pub fn get_from_side(&self) -> CompassSide {
        self.from_side
    }

    /// Returns the side the road departs towards.
    pub fn get_to_side(&self) -> CompassSide {
        self.to_side
    }

    /// Returns the lanes of the road, ordered rightmost to leftmost.
    pub fn get_lanes(&self) -> &[Lane] {
        &self.lanes
    }

    /// Returns the lane with the given identifier, if it belongs to this road.
    pub fn get_lane(&self, id: LaneID) -> Option<&Lane> {
        self.lanes.iter().find(|lane| lane.get_id() == id)
    }

    /// Returns the zero-based position of a lane counted from the rightmost
    /// edge of the road, if the lane belongs to this road.
    pub fn lane_position(&self, id: LaneID) -> Option<usize> {
        self.lanes.iter().position(|lane| lane.get_id() == id)
    }
}

/// A builder for constructing `Road` instances.
pub struct RoadBuilder {
    road: Road,
}

impl RoadBuilder {
    /// Sets the lanes of the road (ordered rightmost to leftmost).
    pub fn with_lanes(mut self, lanes: Vec<Lane>) -> Self {
        self.road.lanes = lanes;
        self
    }

    /// Appends a lane to the road.
    pub fn with_lane_append(mut self, lane: Lane) -> Self {
        self.road.lanes.push(lane);
        self
    }

    /// Builds and returns the final `Road` instance.
    pub fn build(self) -> Road {
        self.road
    }
}
