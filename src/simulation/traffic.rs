use crate::agents::{Vehicle, VehicleID};
use crate::topology::junction::Junction;
use crate::topology::road::LaneID;
use indexmap::IndexMap;

/// Per-lane vehicle queues.
///
/// This wraps an internal IndexMap<LaneID, Vec<Vehicle>> so that lanes are
/// iterated in their registration order (road order, rightmost lane first),
/// keeping the update order - and with it the whole simulation - deterministic.
/// Vehicles are owned by the lane queue they currently occupy; a lane
/// transfer moves the vehicle value between queues.
#[derive(Debug, Default)]
pub struct LaneTraffic(IndexMap<LaneID, Vec<Vehicle>>);

impl LaneTraffic {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Creates a storage with an empty queue for every lane of the junction.
    pub fn from_junction(junction: &Junction) -> Self {
        let mut map = IndexMap::new();
        for road in junction.get_roads() {
            for lane in road.get_lanes() {
                map.insert(lane.get_id(), Vec::new());
            }
        }
        Self(map)
    }

    /// Returns the vehicles on the given lane.
    pub fn vehicles(&self, lane: LaneID) -> Option<&Vec<Vehicle>> {
        self.0.get(&lane)
    }

    /// Returns a mutable reference to the vehicles on the given lane.
    pub fn vehicles_mut(&mut self, lane: LaneID) -> Option<&mut Vec<Vehicle>> {
        self.0.get_mut(&lane)
    }

    /// Appends a vehicle to the given lane's queue.
    pub fn push(&mut self, lane: LaneID, vehicle: Vehicle) {
        self.0.entry(lane).or_default().push(vehicle);
    }

    /// Total number of vehicles across all lanes.
    pub fn total(&self) -> usize {
        self.0.values().map(|queue| queue.len()).sum()
    }

    /// Lane IDs in registration order.
    pub fn lane_ids(&self) -> Vec<LaneID> {
        self.0.keys().copied().collect()
    }

    /// Iterates over `(lane, vehicles)` pairs in registration order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, LaneID, Vec<Vehicle>> {
        self.0.iter()
    }

    /// Iterates over all vehicles of all lanes in registration order.
    pub fn all_vehicles(&self) -> impl Iterator<Item = (LaneID, &Vehicle)> {
        self.0
            .iter()
            .flat_map(|(lane, queue)| queue.iter().map(move |v| (*lane, v)))
    }

    /// Finds the lane currently holding the vehicle with the given ID.
    pub fn lane_of(&self, id: VehicleID) -> Option<LaneID> {
        self.0.iter().find_map(|(lane, queue)| {
            queue.iter().any(|vehicle| vehicle.id == id).then_some(*lane)
        })
    }
}

// Allow transparent access to IndexMap API and deref-coercions in function calls
impl std::ops::Deref for LaneTraffic {
    type Target = IndexMap<LaneID, Vec<Vehicle>>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::ops::DerefMut for LaneTraffic {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl IntoIterator for LaneTraffic {
    type Item = (LaneID, Vec<Vehicle>);
    type IntoIter = indexmap::map::IntoIter<LaneID, Vec<Vehicle>>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// Make `for (lane, queue) in &traffic { .. }` work like for &IndexMap
impl<'a> IntoIterator for &'a LaneTraffic {
    type Item = (&'a LaneID, &'a Vec<Vehicle>);
    type IntoIter = indexmap::map::Iter<'a, LaneID, Vec<Vehicle>>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a mut LaneTraffic {
    type Item = (&'a LaneID, &'a mut Vec<Vehicle>);
    type IntoIter = indexmap::map::IterMut<'a, LaneID, Vec<Vehicle>>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter_mut()
    }
}
