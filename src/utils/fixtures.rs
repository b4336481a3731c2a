//! Reference junctions used across enumerator, controller and simulator tests.
use crate::topology::junction::{
    Junction, JunctionDescription, LaneDescription, LightDescription, RoadDescription,
};
use crate::topology::road::Road;
use crate::topology::sides::CompassSide;
use crate::traffic_lights::lights::{TrafficLight, TrafficLightID};
use crate::traffic_lights::states::LightState;

/// Description of the reference four-arm, two-lane junction.
///
/// Layout (road IDs with arrival sides, lane IDs rightmost first):
///
/// ```text
///                     N
///                12 ↓↓    ↑↑ 11
///               123,124  111,112
///                     │  │
///     13 →→ 135,136 ──┼──┼── 147,148 ←← 14
///                     │  │
///                     S
/// ```
///
/// Lights: 1: 111,112→111,112; 2: 135→135; 3: 136→112; 4: 124→124,148;
/// 5: 123→123,136; 6: 148→148,111; 7: 147→147.
pub fn reference_four_arm_description(arrival_rate: f64) -> JunctionDescription {
    let lane = |id: i64| LaneDescription::new(id).with_arrival_rate(arrival_rate);
    JunctionDescription {
        id: 1,
        roads: vec![
            RoadDescription {
                id: 11,
                from_side: CompassSide::South,
                to_side: CompassSide::North,
                lanes: vec![lane(111), lane(112)],
            },
            RoadDescription {
                id: 12,
                from_side: CompassSide::North,
                to_side: CompassSide::South,
                lanes: vec![lane(123), lane(124)],
            },
            RoadDescription {
                id: 13,
                from_side: CompassSide::West,
                to_side: CompassSide::East,
                lanes: vec![lane(135), lane(136)],
            },
            RoadDescription {
                id: 14,
                from_side: CompassSide::East,
                to_side: CompassSide::West,
                lanes: vec![lane(147), lane(148)],
            },
        ],
        lights: vec![
            LightDescription {
                id: TrafficLightID(1),
                origins: vec![111, 112],
                destinations: vec![111, 112],
                initial_state: LightState::Red,
            },
            LightDescription {
                id: TrafficLightID(2),
                origins: vec![135],
                destinations: vec![135],
                initial_state: LightState::Red,
            },
            LightDescription {
                id: TrafficLightID(3),
                origins: vec![136],
                destinations: vec![112],
                initial_state: LightState::Red,
            },
            LightDescription {
                id: TrafficLightID(4),
                origins: vec![124],
                destinations: vec![124, 148],
                initial_state: LightState::Red,
            },
            LightDescription {
                id: TrafficLightID(5),
                origins: vec![123],
                destinations: vec![123, 136],
                initial_state: LightState::Red,
            },
            LightDescription {
                id: TrafficLightID(6),
                origins: vec![148],
                destinations: vec![148, 111],
                initial_state: LightState::Red,
            },
            LightDescription {
                id: TrafficLightID(7),
                origins: vec![147],
                destinations: vec![147],
                initial_state: LightState::Red,
            },
        ],
    }
}

/// The reference junction without stochastic arrivals.
pub fn reference_four_arm_junction() -> Junction {
    Junction::build(reference_four_arm_description(0.0)).expect("reference fixture is valid")
}

/// The reference junction with the given arrival rate on every lane.
pub fn reference_four_arm_junction_with_arrivals(arrival_rate: f64) -> Junction {
    Junction::build(reference_four_arm_description(arrival_rate)).expect("reference fixture is valid")
}

/// The reference junction decomposed into raw parts, for code that runs
/// before a `Junction` aggregate exists (e.g. the phase enumerator).
pub fn reference_four_arm_parts() -> (Vec<Road>, Vec<TrafficLight>) {
    let junction = reference_four_arm_junction();
    (
        junction.get_roads().to_vec(),
        junction.get_lights().to_vec(),
    )
}

/// One road, one lane, one light (initially red): the minimal junction for
/// kinematics scenarios.
pub fn single_light_junction(arrival_rate: f64) -> Junction {
    Junction::build(JunctionDescription {
        id: 2,
        roads: vec![RoadDescription {
            id: 11,
            from_side: CompassSide::South,
            to_side: CompassSide::North,
            lanes: vec![LaneDescription::new(111).with_arrival_rate(arrival_rate)],
        }],
        lights: vec![LightDescription {
            id: TrafficLightID(1),
            origins: vec![111],
            destinations: vec![111],
            initial_state: LightState::Red,
        }],
    })
    .expect("single-light fixture is valid")
}
