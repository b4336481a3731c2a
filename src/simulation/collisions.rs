use crate::simulation::traffic::LaneTraffic;
use crate::topology::junction::Junction;
use crate::topology::road::{road_of_lane, RoadID};

/// A vehicle currently inside the junction core, reduced to the two roads
/// that define its trajectory.
#[derive(Debug, Clone, Copy)]
struct CrossingTrajectory {
    origin_road: RoadID,
    destination_road: RoadID,
}

/// Counts colliding vehicle pairs inside the junction for this tick.
///
/// A vehicle participates once it is past the stop line (`distance < 0`) and
/// within `junction_span` of it. Two trajectories collide when:
///
/// - their origin roads differ and their destination roads are perpendicular
///   (crossing paths), or
/// - their destination roads are identical but their origins differ
///   (a merge into the same outbound road).
///
/// Counting is observation-only; no recovery is modelled.
pub fn count_collisions(junction: &Junction, traffic: &LaneTraffic, junction_span: f64) -> u32 {
    let mut trajectories: Vec<CrossingTrajectory> = Vec::new();
    for (lane_id, vehicle) in traffic.all_vehicles() {
        if vehicle.distance >= 0.0 || vehicle.distance.abs() >= junction_span {
            continue;
        }
        let destination_road = vehicle
            .destination_lane
            .map_or(road_of_lane(lane_id), road_of_lane);
        trajectories.push(CrossingTrajectory {
            origin_road: road_of_lane(vehicle.origin_lane),
            destination_road,
        });
    }

    let perpendicular = |a: RoadID, b: RoadID| -> bool {
        match (junction.get_road(a), junction.get_road(b)) {
            (Some(first), Some(second)) => first
                .get_from_side()
                .is_perpendicular_to(second.get_from_side()),
            _ => false,
        }
    };

    let mut collisions = 0u32;
    for i in 0..trajectories.len() {
        for j in (i + 1)..trajectories.len() {
            let first = trajectories[i];
            let second = trajectories[j];
            let crossing = first.origin_road != second.origin_road
                && perpendicular(first.destination_road, second.destination_road);
            let merging = first.destination_road == second.destination_road
                && first.origin_road != second.origin_road;
            if crossing || merging {
                collisions += 1;
            }
        }
    }
    collisions
}
