use crate::agents::Vehicle;
use crate::simulation::config::SimulationConfig;
use crate::topology::junction::Junction;
use crate::topology::road::{road_of_lane, LaneID, Road};
use crate::topology::sides::Turn;
use rand::rngs::StdRng;
use rand::Rng;

/// What happens to a vehicle that has reached (or passed) the stop line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransferOutcome {
    /// The vehicle keeps advancing on its current lane (left turns stage
    /// through the junction before landing; lanes without a controlling
    /// light simply run through).
    Stay,
    /// The vehicle moves into the destination lane with its stop-line
    /// distance reset to the given (negative) offset.
    Transfer { destination: LaneID, distance: f64 },
}

/// Combined width of the destination-road lanes a landing vehicle crosses,
/// counted from the curb up to and including the landing lane.
fn landing_offset(config: &SimulationConfig, dest_road: &Road, dest_lane: LaneID) -> f64 {
    let crossed = dest_road.lane_position(dest_lane).map_or(1, |pos| pos + 1);
    config.get_lane_width() * crossed as f64
}

/// Combined width of the lanes of the road whose traffic crosses the
/// junction core in front of the origin road: the opposing road where one
/// exists, otherwise the destination road.
fn crossing_depth(
    config: &SimulationConfig,
    junction: &Junction,
    origin_road: &Road,
    dest_road: &Road,
) -> f64 {
    let lanes = junction
        .opposing_road(origin_road)
        .map_or(dest_road.get_lanes().len(), |road| road.get_lanes().len());
    config.get_lane_width() * lanes as f64
}

/// Decides the fate of a vehicle whose stop-line distance has gone
/// non-positive while still on its origin lane.
///
/// The destination lane is resolved first (the spawn-time choice, otherwise a
/// uniform draw from the origin light's destinations, recorded back onto the
/// vehicle). The geometric turn type then dictates the landing:
///
/// - **Right** - land immediately, shifted by the destination lanes crossed
///   from the curb.
/// - **Straight** - land immediately, shifted by the opposing road's combined
///   lane width.
/// - **Left** - keep advancing through the junction until the crossing depth
///   is cleared, then land with the crossed lanes added to the shift.
pub fn resolve_transfer(
    junction: &Junction,
    config: &SimulationConfig,
    vehicle: &mut Vehicle,
    rng: &mut StdRng,
) -> TransferOutcome {
    if vehicle.destination_lane.is_none() {
        if let Some(light) = junction.get_light_by_origin_lane(vehicle.origin_lane) {
            let destinations = light.get_destinations();
            if !destinations.is_empty() {
                let pick = rng.random_range(0..destinations.len());
                vehicle.destination_lane = Some(destinations[pick]);
            }
        }
    }
    let Some(destination) = vehicle.destination_lane else {
        // No controlling light: the lane runs through, the vehicle exits on it.
        return TransferOutcome::Stay;
    };

    let Some(origin_road) = junction.get_road(road_of_lane(vehicle.origin_lane)) else {
        return TransferOutcome::Stay;
    };
    let Some((dest_road, _)) = junction.get_lane(destination) else {
        return TransferOutcome::Stay;
    };

    let turn = Turn::classify(origin_road.get_from_side(), dest_road.get_to_side());
    match turn {
        Turn::Right => TransferOutcome::Transfer {
            destination,
            distance: -landing_offset(config, dest_road, destination),
        },
        Turn::Straight => TransferOutcome::Transfer {
            destination,
            distance: -crossing_depth(config, junction, origin_road, dest_road),
        },
        Turn::Left => {
            let depth = crossing_depth(config, junction, origin_road, dest_road);
            if vehicle.distance > -depth {
                // Still crossing the opposing traffic's lanes.
                TransferOutcome::Stay
            } else {
                TransferOutcome::Transfer {
                    destination,
                    distance: -(depth + landing_offset(config, dest_road, destination)),
                }
            }
        }
    }
}
