use crate::topology::junction::{
    JunctionDescription, LaneDescription, LightDescription, RoadDescription,
};
use crate::topology::sides::CompassSide;
use crate::traffic_lights::lights::TrafficLightID;
use crate::traffic_lights::states::LightState;

/// Generates the description of a symmetric four-arm junction.
///
/// Creates four roads (arriving S, N, W, E) with `lanes_per_road` lanes each
/// and one traffic light per road guarding all of its lanes, permitting the
/// straight-through movement onto the same road. Lane IDs follow the
/// `road_id * 10 + k` encoding with road IDs `11..=14`.
///
/// # Arguments
///
/// - `junction_id` - Identifier for the generated junction
/// - `lanes_per_road` - Number of parallel lanes on each arm
/// - `arrival_rate` - Arrival rate λ (vehicles/second) applied to every lane
///
/// # Layout
///
/// ```text
///             road 12 (N)
///                  │
/// road 13 (W) ── junction ── road 14 (E)
///                  │
///             road 11 (S)
/// ```
///
/// # Examples
///
/// ```rust
/// use junction_sim_core::topology::Junction;
/// use junction_sim_core::utils::generators::symmetric_four_arm_description;
///
/// let description = symmetric_four_arm_description(1, 2, 0.0);
/// let junction = Junction::build(description).unwrap();
/// assert_eq!(junction.get_lights().len(), 4);
/// // Opposite straights pair up; perpendicular straights conflict.
/// assert_eq!(junction.get_phases().len(), 2);
/// ```
pub fn symmetric_four_arm_description(
    junction_id: i64,
    lanes_per_road: usize,
    arrival_rate: f64,
) -> JunctionDescription {
    let sides = [
        (11i64, CompassSide::South, CompassSide::North),
        (12i64, CompassSide::North, CompassSide::South),
        (13i64, CompassSide::West, CompassSide::East),
        (14i64, CompassSide::East, CompassSide::West),
    ];

    let mut roads = Vec::with_capacity(sides.len());
    let mut lights = Vec::with_capacity(sides.len());
    for (index, (road_id, from_side, to_side)) in sides.into_iter().enumerate() {
        let lane_ids: Vec<i64> = (0..lanes_per_road)
            .map(|k| road_id * 10 + 1 + k as i64)
            .collect();
        roads.push(RoadDescription {
            id: road_id,
            from_side,
            to_side,
            lanes: lane_ids
                .iter()
                .map(|id| LaneDescription::new(*id).with_arrival_rate(arrival_rate))
                .collect(),
        });
        lights.push(LightDescription {
            id: TrafficLightID(index as i64 + 1),
            origins: lane_ids.clone(),
            destinations: lane_ids,
            initial_state: LightState::Red,
        });
    }

    JunctionDescription {
        id: junction_id,
        roads,
        lights,
    }
}
