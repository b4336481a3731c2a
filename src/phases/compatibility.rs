use crate::topology::junction::TopologyError;
use crate::topology::road::{road_of_lane, Road, RoadID};
use crate::topology::sides::Turn;
use crate::traffic_lights::lights::TrafficLight;

/// Looks up a road by ID in a plain slice.
///
/// The enumerator runs during junction construction, before the `Junction`
/// aggregate exists, so it works on the raw road slice.
fn find_road(roads: &[Road], id: RoadID) -> Option<&Road> {
    roads.iter().find(|road| road.get_id() == id)
}

/// The turn types a light permits, classified per destination road.
fn permitted_turns(
    roads: &[Road],
    light: &TrafficLight,
) -> Result<Vec<Turn>, TopologyError> {
    let origin_road = find_road(roads, light.origin_road()).ok_or_else(|| {
        TopologyError::UnknownOriginLane {
            light_id: light.get_id(),
            lane_id: light.get_origins()[0],
        }
    })?;
    let from_side = origin_road.get_from_side();

    let mut turns = Vec::new();
    for dest_road_id in light.destination_roads() {
        let dest_road =
            find_road(roads, dest_road_id).ok_or_else(|| TopologyError::UnknownDestinationLane {
                light_id: light.get_id(),
                lane_id: *light
                    .get_destinations()
                    .iter()
                    .find(|lane| road_of_lane(**lane) == dest_road_id)
                    .expect("destination road derived from destination lanes"),
            })?;
        turns.push(Turn::classify(from_side, dest_road.get_to_side()));
    }
    Ok(turns)
}

/// Sub-predicate 1: two lights with different origin roads must not share a
/// destination road.
fn no_merge_conflict(first: &TrafficLight, second: &TrafficLight) -> bool {
    if first.origin_road() == second.origin_road() {
        return true;
    }
    let second_dests = second.destination_roads();
    !first
        .destination_roads()
        .iter()
        .any(|road| second_dests.contains(road))
}

/// Sub-predicate 2: two lights must not both run straight-through on
/// perpendicular origin roads.
fn no_straight_cross_conflict(
    roads: &[Road],
    first: &TrafficLight,
    first_turns: &[Turn],
    second: &TrafficLight,
    second_turns: &[Turn],
) -> bool {
    let first_from = match find_road(roads, first.origin_road()) {
        Some(road) => road.get_from_side(),
        None => return true,
    };
    let second_from = match find_road(roads, second.origin_road()) {
        Some(road) => road.get_from_side(),
        None => return true,
    };
    if !first_from.is_perpendicular_to(second_from) {
        return true;
    }
    !(first_turns.contains(&Turn::Straight) && second_turns.contains(&Turn::Straight))
}

/// Sub-predicate 3: a light permitting a left turn tolerates only lights on
/// its own origin road or lights whose every movement is a right turn.
fn no_protected_left_conflict(
    first: &TrafficLight,
    first_turns: &[Turn],
    second: &TrafficLight,
    second_turns: &[Turn],
) -> bool {
    let only_right = |turns: &[Turn]| !turns.is_empty() && turns.iter().all(|t| *t == Turn::Right);

    if first_turns.contains(&Turn::Left) {
        return first.origin_road() == second.origin_road() || only_right(second_turns);
    }
    if second_turns.contains(&Turn::Left) {
        return first.origin_road() == second.origin_road() || only_right(first_turns);
    }
    true
}

/// The pairwise non-conflict predicate: all three sub-predicates must hold.
///
/// The relation is symmetric and reflexive; it is deliberately not transitive
/// (L1~L2 and L2~L3 do not imply L1~L3), which is why maximal phases require
/// clique enumeration rather than connected components.
pub fn are_compatible(
    roads: &[Road],
    first: &TrafficLight,
    second: &TrafficLight,
) -> Result<bool, TopologyError> {
    let first_turns = permitted_turns(roads, first)?;
    let second_turns = permitted_turns(roads, second)?;
    Ok(no_merge_conflict(first, second)
        && no_straight_cross_conflict(roads, first, &first_turns, second, &second_turns)
        && no_protected_left_conflict(first, &first_turns, second, &second_turns))
}

/// Explicit adjacency matrix of the compatibility graph over the junction's
/// lights, indexed by light position in the input slice.
#[derive(Debug, Clone)]
pub struct CompatibilityMatrix {
    size: usize,
    adjacency: Vec<bool>,
}

impl CompatibilityMatrix {
    /// Builds the matrix by evaluating the pairwise predicate for every
    /// unordered pair of lights.
    pub fn build(roads: &[Road], lights: &[TrafficLight]) -> Result<Self, TopologyError> {
        let size = lights.len();
        let mut matrix = CompatibilityMatrix {
            size,
            adjacency: vec![false; size * size],
        };
        for i in 0..size {
            matrix.set(i, i, true);
            for j in (i + 1)..size {
                let compatible = are_compatible(roads, &lights[i], &lights[j])?;
                matrix.set(i, j, compatible);
                matrix.set(j, i, compatible);
            }
        }
        Ok(matrix)
    }

    fn set(&mut self, i: usize, j: usize, value: bool) {
        self.adjacency[i * self.size + j] = value;
    }

    /// Whether lights `i` and `j` are compatible.
    pub fn get(&self, i: usize, j: usize) -> bool {
        self.adjacency[i * self.size + j]
    }

    /// Number of lights the matrix covers.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The neighbourhood of light `i` as a bitmask (self excluded).
    pub fn neighbours(&self, i: usize) -> u64 {
        let mut mask = 0u64;
        for j in 0..self.size {
            if j != i && self.get(i, j) {
                mask |= 1 << j;
            }
        }
        mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::fixtures::reference_four_arm_parts;

    fn light<'a>(lights: &'a [TrafficLight], id: i64) -> &'a TrafficLight {
        lights
            .iter()
            .find(|l| l.get_id().0 == id)
            .expect("fixture light")
    }

    #[test]
    fn test_merge_conflict_detected() {
        let (roads, lights) = reference_four_arm_parts();
        // Light 1 (road 11 straight onto 111/112) vs light 3 (road 13 left onto 111/112):
        // different origin roads pouring into road 11.
        let compatible = are_compatible(&roads, light(&lights, 1), light(&lights, 3)).unwrap();
        assert!(!compatible);
    }

    #[test]
    fn test_straight_cross_conflict_detected() {
        let (roads, lights) = reference_four_arm_parts();
        // Light 1 (S→N straight) vs light 2 (W→E straight): perpendicular
        // origin roads, both straight-through.
        let compatible = are_compatible(&roads, light(&lights, 1), light(&lights, 2)).unwrap();
        assert!(!compatible);
    }

    #[test]
    fn test_protected_left_conflict_detected() {
        let (roads, lights) = reference_four_arm_parts();
        // Light 3 turns left (W→N); light 7 runs straight from road 14.
        let compatible = are_compatible(&roads, light(&lights, 3), light(&lights, 7)).unwrap();
        assert!(!compatible);
    }

    #[test]
    fn test_left_turn_tolerates_same_road() {
        let (roads, lights) = reference_four_arm_parts();
        // Light 5 permits a left (N→E) but shares road 12 with light 4.
        let compatible = are_compatible(&roads, light(&lights, 4), light(&lights, 5)).unwrap();
        assert!(compatible);
    }

    #[test]
    fn test_opposite_straights_compatible() {
        let (roads, lights) = reference_four_arm_parts();
        // Lights 2 (W→E) and 7 (E→W) run straight on opposite roads.
        let compatible = are_compatible(&roads, light(&lights, 2), light(&lights, 7)).unwrap();
        assert!(compatible);
    }

    #[test]
    fn test_predicate_is_symmetric() {
        let (roads, lights) = reference_four_arm_parts();
        for first in &lights {
            for second in &lights {
                let forward = are_compatible(&roads, first, second).unwrap();
                let backward = are_compatible(&roads, second, first).unwrap();
                assert_eq!(
                    forward,
                    backward,
                    "asymmetry between lights {} and {}",
                    first.get_id(),
                    second.get_id()
                );
            }
        }
    }

    #[test]
    fn test_matrix_matches_predicate() {
        let (roads, lights) = reference_four_arm_parts();
        let matrix = CompatibilityMatrix::build(&roads, &lights).unwrap();
        assert_eq!(matrix.size(), lights.len());
        for i in 0..lights.len() {
            assert!(matrix.get(i, i), "relation must be reflexive");
            for j in 0..lights.len() {
                if i != j {
                    let expected = are_compatible(&roads, &lights[i], &lights[j]).unwrap();
                    assert_eq!(matrix.get(i, j), expected);
                }
            }
        }
    }
}
