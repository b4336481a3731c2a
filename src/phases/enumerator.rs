use crate::phases::compatibility::CompatibilityMatrix;
use crate::topology::junction::TopologyError;
use crate::topology::road::Road;
use crate::traffic_lights::lights::{TrafficLight, TrafficLightID};
use std::fmt;

/// A set of traffic lights held green together.
///
/// Light IDs are kept sorted so that a phase has a single canonical form and
/// can be used as a map key when the controller tracks per-phase state across
/// topology updates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Phase(Vec<TrafficLightID>);

impl Phase {
    /// Creates a phase from a list of light IDs, canonicalising the order.
    pub fn new(mut lights: Vec<TrafficLightID>) -> Self {
        lights.sort();
        lights.dedup();
        Phase(lights)
    }

    /// Returns the light IDs of the phase in ascending order.
    pub fn lights(&self) -> &[TrafficLightID] {
        &self.0
    }

    /// Whether the phase holds the given light green.
    pub fn contains(&self, id: TrafficLightID) -> bool {
        self.0.binary_search(&id).is_ok()
    }

    /// Number of lights in the phase.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the empty phase.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Phase {
    /// Formats the phase as `{1+4}`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (idx, light) in self.0.iter().enumerate() {
            if idx > 0 {
                write!(f, "+")?;
            }
            write!(f, "{}", light)?;
        }
        write!(f, "}}")
    }
}

/// Enumerates every maximal compatible phase of the junction.
///
/// Builds the compatibility adjacency matrix and enumerates its maximal
/// cliques with Bron-Kerbosch (pivoting variant). A junction has O(10)
/// lights, so exact enumeration is cheap; the result is sorted so the order
/// is stable across calls on the same topology.
///
/// An empty light set yields an empty phase set. A light with empty origins
/// is ill-formed and fails with a [`TopologyError`]. The function is pure:
/// no I/O and no mutation of its inputs.
pub fn maximal_phases(
    roads: &[Road],
    lights: &[TrafficLight],
) -> Result<Vec<Phase>, TopologyError> {
    if lights.is_empty() {
        return Ok(Vec::new());
    }
    for light in lights {
        if light.get_origins().is_empty() {
            return Err(TopologyError::LightWithoutOrigins(light.get_id()));
        }
    }

    let matrix = CompatibilityMatrix::build(roads, lights)?;
    let neighbourhoods: Vec<u64> = (0..lights.len()).map(|i| matrix.neighbours(i)).collect();

    let mut cliques: Vec<u64> = Vec::new();
    let all: u64 = if lights.len() == 64 {
        u64::MAX
    } else {
        (1u64 << lights.len()) - 1
    };
    bron_kerbosch(0, all, 0, &neighbourhoods, &mut cliques);

    let mut phases: Vec<Phase> = cliques
        .into_iter()
        .map(|mask| {
            let members = (0..lights.len())
                .filter(|i| mask & (1 << i) != 0)
                .map(|i| lights[i].get_id())
                .collect();
            Phase::new(members)
        })
        .collect();
    phases.sort();
    Ok(phases)
}

/// Bron-Kerbosch maximal-clique enumeration with pivoting over bitmask sets.
///
/// `current` is the clique under construction, `candidates` the vertices that
/// extend it, `excluded` the vertices already covered by earlier branches.
fn bron_kerbosch(
    current: u64,
    candidates: u64,
    excluded: u64,
    neighbourhoods: &[u64],
    cliques: &mut Vec<u64>,
) {
    if candidates == 0 && excluded == 0 {
        cliques.push(current);
        return;
    }

    // Pivot on the vertex covering the most candidates to prune branches.
    let mut pivot = usize::MAX;
    let mut best_cover = 0u32;
    let mut scan = candidates | excluded;
    while scan != 0 {
        let vertex = scan.trailing_zeros() as usize;
        scan &= scan - 1;
        let cover = (candidates & neighbourhoods[vertex]).count_ones();
        if pivot == usize::MAX || cover > best_cover {
            pivot = vertex;
            best_cover = cover;
        }
    }

    let mut branch = candidates & !neighbourhoods[pivot];
    let mut candidates = candidates;
    let mut excluded = excluded;
    while branch != 0 {
        let vertex = branch.trailing_zeros() as usize;
        branch &= branch - 1;
        let bit = 1u64 << vertex;
        bron_kerbosch(
            current | bit,
            candidates & neighbourhoods[vertex],
            excluded & neighbourhoods[vertex],
            neighbourhoods,
            cliques,
        );
        candidates &= !bit;
        excluded |= bit;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::fixtures::reference_four_arm_parts;

    #[test]
    fn test_empty_light_set() {
        let (roads, _) = reference_four_arm_parts();
        let phases = maximal_phases(&roads, &[]).unwrap();
        assert!(phases.is_empty());
    }

    #[test]
    fn test_light_with_empty_origins_rejected() {
        let (roads, mut lights) = reference_four_arm_parts();
        lights.push(
            TrafficLight::new(TrafficLightID(99))
                .with_origins(vec![])
                .with_destinations(vec![111])
                .build(),
        );
        let err = maximal_phases(&roads, &lights).unwrap_err();
        assert!(matches!(err, TopologyError::LightWithoutOrigins(_)));
    }

    #[test]
    fn test_reference_four_arm_phases() {
        let (roads, lights) = reference_four_arm_parts();
        let phases = maximal_phases(&roads, &lights).unwrap();

        let expected: Vec<Phase> = vec![
            Phase::new(vec![TrafficLightID(1), TrafficLightID(4)]),
            Phase::new(vec![TrafficLightID(2), TrafficLightID(3)]),
            Phase::new(vec![
                TrafficLightID(2),
                TrafficLightID(6),
                TrafficLightID(7),
            ]),
            Phase::new(vec![TrafficLightID(4), TrafficLightID(5)]),
        ];
        assert_eq!(phases, expected);
    }

    #[test]
    fn test_singleton_phase_is_not_maximal_when_extendable() {
        let (roads, lights) = reference_four_arm_parts();
        let phases = maximal_phases(&roads, &lights).unwrap();
        // The straight-only light 7 (origin lane 147) always appears together
        // with extensions, never as a singleton phase.
        let singleton = Phase::new(vec![TrafficLightID(7)]);
        assert!(!phases.contains(&singleton));
        assert!(phases
            .iter()
            .any(|phase| phase.contains(TrafficLightID(7)) && phase.len() > 1));
    }

    #[test]
    fn test_every_phase_is_maximal() {
        let (roads, lights) = reference_four_arm_parts();
        let phases = maximal_phases(&roads, &lights).unwrap();
        for phase in &phases {
            for light in &lights {
                if phase.contains(light.get_id()) {
                    continue;
                }
                // Adding any other light must break at least one pair.
                let extended_is_compatible = phase.lights().iter().all(|member| {
                    let member_light = lights
                        .iter()
                        .find(|l| l.get_id() == *member)
                        .expect("phase member exists");
                    crate::phases::compatibility::are_compatible(&roads, member_light, light)
                        .unwrap()
                });
                assert!(
                    !extended_is_compatible,
                    "phase {} can be extended with light {}",
                    phase,
                    light.get_id()
                );
            }
        }
    }

    #[test]
    fn test_stable_order_across_calls() {
        let (roads, lights) = reference_four_arm_parts();
        let first = maximal_phases(&roads, &lights).unwrap();
        let second = maximal_phases(&roads, &lights).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_phase_display() {
        let phase = Phase::new(vec![TrafficLightID(7), TrafficLightID(2), TrafficLightID(6)]);
        assert_eq!(phase.to_string(), "{2+6+7}");
    }
}
