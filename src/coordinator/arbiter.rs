use crate::coordinator::amber::AmberTimers;
use crate::coordinator::coordinator::DecisionFrame;
use crate::coordinator::exchange::ExchangeGuard;
use crate::topology::junction::Junction;
use crate::traffic_lights::lights::TrafficLightID;
use crate::traffic_lights::states::{LightState, SignalUpdate};
use crate::verbose::{
    is_verbose_level, verbose_log_with_fields, VerboseLevel, EVENT_AMBER_BEGIN,
    EVENT_EXCHANGE_RECOVERED, EVENT_SAFE_FALLBACK,
};
use indexmap::IndexMap;

/// Number of consecutive missed control exchanges that force all lights red.
const FALLBACK_AFTER_MISSES: u32 = 2;

/// Arbitrates controller decisions into the signal updates the simulator
/// ingests: the coordinator's single source of truth for light state.
///
/// Responsibilities:
/// - adopt each fresh decision frame exactly once (frames are seq-numbered),
/// - raise the amber flag on every light whose commanded state changed and
///   expire it after the configured duration of simulated time,
/// - watch the exchange cadence: a control period without a fresh frame
///   retains the previous board, two consecutive misses force every light
///   red, and the next fresh frame resumes normal operation.
#[derive(Debug)]
pub struct SignalArbiter {
    /// Latest commanded state per light.
    commanded: IndexMap<TrafficLightID, LightState>,
    amber: AmberTimers,
    guard: ExchangeGuard,
    /// Expected cadence of fresh frames, in simulated seconds.
    control_period: f64,
    /// Sequence number of the last adopted frame.
    last_seq: Option<u64>,
    /// Start of the current miss-detection window.
    miss_timer: f64,
}

impl SignalArbiter {
    /// Creates an arbiter with the junction's initial light states as the
    /// baseline board.
    pub fn new(junction: &Junction, amber_duration: f64, control_period: f64) -> Self {
        let mut commanded = IndexMap::new();
        for light in junction.get_lights() {
            commanded.insert(light.get_id(), light.get_initial_state());
        }
        SignalArbiter {
            commanded,
            amber: AmberTimers::new(amber_duration),
            guard: ExchangeGuard::new(FALLBACK_AFTER_MISSES),
            control_period,
            last_seq: None,
            miss_timer: 0.0,
        }
    }

    /// Rebases the board after a topology swap: surviving lights keep their
    /// commanded state, new lights start from their declared initial state.
    pub fn rebase(&mut self, junction: &Junction) {
        let mut commanded = IndexMap::new();
        for light in junction.get_lights() {
            let state = self
                .commanded
                .get(&light.get_id())
                .copied()
                .unwrap_or(light.get_initial_state());
            commanded.insert(light.get_id(), state);
        }
        self.commanded = commanded;
    }

    /// Whether the safe fallback (all lights red) is currently active.
    pub fn in_fallback(&self) -> bool {
        self.guard.in_fallback()
    }

    /// Produces the signal updates for the current sim tick.
    ///
    /// `frame` is whatever decision the control loop last published (the
    /// same frame may be seen across many sim ticks); `now` is simulated
    /// time.
    pub fn arbitrate(&mut self, frame: Option<&DecisionFrame>, now: f64) -> Vec<SignalUpdate> {
        let mut adopted = false;
        if let Some(frame) = frame {
            if self.last_seq != Some(frame.seq) {
                self.last_seq = Some(frame.seq);
                adopted = true;
                if self.guard.record_success() {
                    verbose_log_with_fields(
                        VerboseLevel::Main,
                        EVENT_EXCHANGE_RECOVERED,
                        "control exchange recovered, resuming controller decisions",
                        &[("seq", &frame.seq)],
                    );
                }
                for command in &frame.commands {
                    if let Some(state) = self.commanded.get_mut(&command.light) {
                        if *state != command.state {
                            *state = command.state;
                            self.amber.mark(command.light, now);
                            if is_verbose_level(VerboseLevel::Detailed) {
                                verbose_log_with_fields(
                                    VerboseLevel::Detailed,
                                    EVENT_AMBER_BEGIN,
                                    "light state changed, amber raised",
                                    &[("light", &command.light), ("state", &command.state)],
                                );
                            }
                        }
                    }
                }
            }
        }

        if adopted {
            self.miss_timer = now;
        } else {
            while now - self.miss_timer >= self.control_period {
                self.miss_timer += self.control_period;
                if self.guard.record_failure() {
                    for state in self.commanded.values_mut() {
                        *state = LightState::Red;
                    }
                    self.amber.clear();
                    verbose_log_with_fields(
                        VerboseLevel::Main,
                        EVENT_SAFE_FALLBACK,
                        "consecutive control misses, forcing all lights red",
                        &[("failures", &self.guard.failures())],
                    );
                }
            }
        }

        self.amber.expire(now);
        self.commanded
            .iter()
            .map(|(light, state)| SignalUpdate {
                light: *light,
                state: *state,
                in_amber: self.amber.is_amber(*light),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::junction::Junction;
    use crate::utils::generators::symmetric_four_arm_description;

    fn test_junction() -> Junction {
        Junction::build(symmetric_four_arm_description(3, 1, 0.0)).unwrap()
    }

    /// A decision frame holding the given lights green and all others red.
    fn frame(junction: &Junction, seq: u64, greens: &[i64]) -> DecisionFrame {
        DecisionFrame {
            seq,
            switched: true,
            commands: junction
                .get_lights()
                .iter()
                .map(|light| crate::control::LightCommand {
                    light: light.get_id(),
                    state: if greens.contains(&light.get_id().0) {
                        LightState::Green
                    } else {
                        LightState::Red
                    },
                })
                .collect(),
        }
    }

    fn state_of(updates: &[SignalUpdate], light: i64) -> SignalUpdate {
        *updates
            .iter()
            .find(|update| update.light.0 == light)
            .expect("light present")
    }

    #[test]
    fn test_adoption_raises_amber_for_changed_lights() {
        let junction = test_junction();
        let mut arbiter = SignalArbiter::new(&junction, 2.5, 0.1);

        let updates = arbiter.arbitrate(Some(&frame(&junction, 1, &[1, 2])), 0.1);
        let light_1 = state_of(&updates, 1);
        assert_eq!(light_1.state, LightState::Green);
        assert!(light_1.in_amber, "changed light must smooth through amber");
        // Light 3 stayed red: no amber.
        assert!(!state_of(&updates, 3).in_amber);

        // Amber expires after exactly the configured duration. Fresh frames
        // with unchanged commands keep the exchange healthy without
        // restarting the amber interval.
        let updates = arbiter.arbitrate(Some(&frame(&junction, 2, &[1, 2])), 2.5);
        assert!(state_of(&updates, 1).in_amber);
        let updates = arbiter.arbitrate(Some(&frame(&junction, 3, &[1, 2])), 2.61);
        assert!(!state_of(&updates, 1).in_amber);
        assert_eq!(state_of(&updates, 1).state, LightState::Green);
    }

    #[test]
    fn test_single_miss_retains_previous_board() {
        let junction = test_junction();
        let mut arbiter = SignalArbiter::new(&junction, 0.0, 0.1);
        arbiter.arbitrate(Some(&frame(&junction, 1, &[1, 2])), 0.1);

        // One control period without a fresh frame: board unchanged.
        let updates = arbiter.arbitrate(Some(&frame(&junction, 1, &[1, 2])), 0.21);
        assert_eq!(state_of(&updates, 1).state, LightState::Green);
        assert!(!arbiter.in_fallback());
    }

    #[test]
    fn test_two_misses_force_all_red_and_recovery_resumes() {
        let junction = test_junction();
        let mut arbiter = SignalArbiter::new(&junction, 0.0, 0.1);
        arbiter.arbitrate(Some(&frame(&junction, 1, &[1, 2])), 0.1);

        // Two consecutive periods without a fresh frame: safe fallback.
        arbiter.arbitrate(Some(&frame(&junction, 1, &[1, 2])), 0.21);
        let updates = arbiter.arbitrate(Some(&frame(&junction, 1, &[1, 2])), 0.31);
        assert!(arbiter.in_fallback());
        for light in [1, 2, 3, 4] {
            assert_eq!(state_of(&updates, light).state, LightState::Red);
        }

        // A fresh frame recovers automatically.
        let updates = arbiter.arbitrate(Some(&frame(&junction, 2, &[3, 4])), 0.41);
        assert!(!arbiter.in_fallback());
        assert_eq!(state_of(&updates, 3).state, LightState::Green);
        assert_eq!(state_of(&updates, 1).state, LightState::Red);
    }

    #[test]
    fn test_rebase_keeps_surviving_light_states() {
        let junction = test_junction();
        let mut arbiter = SignalArbiter::new(&junction, 0.0, 0.1);
        arbiter.arbitrate(Some(&frame(&junction, 1, &[1])), 0.1);

        let mut description = symmetric_four_arm_description(3, 1, 0.0);
        description.roads.truncate(2);
        description.lights.truncate(2);
        let shrunk = Junction::build(description).unwrap();
        arbiter.rebase(&shrunk);

        let updates = arbiter.arbitrate(Some(&frame(&junction, 1, &[1])), 0.15);
        assert_eq!(updates.len(), 2);
        assert_eq!(state_of(&updates, 1).state, LightState::Green);
    }
}
