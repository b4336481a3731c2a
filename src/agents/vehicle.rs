use crate::topology::road::LaneID;
use std::fmt;

pub type VehicleID = u64; // Alias for VehicleID

/// Kind of agent occupying a lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleKind {
    /// Regular traffic.
    Normal,
    /// Priority traffic (e.g. emergency services), injected by collaborators.
    Priority,
}

impl fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VehicleKind::Normal => "normal",
            VehicleKind::Priority => "priority",
        };
        write!(f, "{}", s)
    }
}

/// Represents a single vehicle in the simulation.
///
/// The vehicle is owned by the lane it currently occupies; a lane transfer
/// moves the value into the destination lane's queue. Distance is measured
/// towards the stop line: positive while approaching, negative once inside
/// or past the junction.
#[derive(Debug, Clone)]
pub struct Vehicle {
    /// Unique identifier
    pub id: VehicleID,
    /// Agent kind. See the ref. at `VehicleKind`
    pub kind: VehicleKind,
    /// Signed distance to the stop line
    pub distance: f64,
    /// Instantaneous velocity
    pub velocity: f64,
    /// Lane the vehicle entered the junction on
    pub origin_lane: LaneID,
    /// Lane the vehicle will exit on. Chosen at spawn from the origin
    /// light's destinations; lanes with no controlling light leave it unset
    /// and the vehicle continues straight until it exits.
    pub destination_lane: Option<LaneID>,
    /// Raised once the vehicle has completed its lane transfer. A transfer
    /// resets the distance to a negative landing offset, so without this
    /// flag the transfer condition would fire again on the next tick.
    pub crossed: bool,
}

impl Vehicle {
    /// Constructs a new `VehicleBuilder` for building a `Vehicle` object.
    ///
    /// # Arguments
    /// * `id` - A unique identifier for the vehicle.
    ///
    /// # Example
    /// ```
    /// use junction_sim_core::agents::{Vehicle, VehicleKind};
    /// let vehicle = Vehicle::new(1)
    ///     .with_origin_lane(111)
    ///     .with_distance(500.0)
    ///     .with_kind(VehicleKind::Priority)
    ///     .build();
    /// println!("Vehicle: {:?}", vehicle);
    /// ```
    pub fn new(id: VehicleID) -> VehicleBuilder {
        VehicleBuilder {
            vehicle: Vehicle {
                id,
                kind: VehicleKind::Normal,
                distance: 0.0,
                velocity: 0.0,
                origin_lane: -1,
                destination_lane: None,
                crossed: false,
            },
        }
    }

    /// True once the vehicle is inside or past the junction.
    pub fn has_crossed_stop_line(&self) -> bool {
        self.distance <= 0.0
    }
}

/// A builder for constructing `Vehicle` instances.
pub struct VehicleBuilder {
    vehicle: Vehicle,
}

impl VehicleBuilder {
    /// Sets the agent kind.
    pub fn with_kind(mut self, kind: VehicleKind) -> Self {
        self.vehicle.kind = kind;
        self
    }

    /// Sets the signed distance to the stop line.
    pub fn with_distance(mut self, distance: f64) -> Self {
        self.vehicle.distance = distance;
        self
    }

    /// Sets the instantaneous velocity.
    pub fn with_velocity(mut self, velocity: f64) -> Self {
        self.vehicle.velocity = velocity;
        self
    }

    /// Sets the lane the vehicle enters the junction on.
    pub fn with_origin_lane(mut self, lane: LaneID) -> Self {
        self.vehicle.origin_lane = lane;
        self
    }

    /// Sets the lane the vehicle will exit on.
    pub fn with_destination_lane(mut self, lane: LaneID) -> Self {
        self.vehicle.destination_lane = Some(lane);
        self
    }

    /// Builds and returns the final `Vehicle` instance.
    pub fn build(self) -> Vehicle {
        self.vehicle
    }
}
