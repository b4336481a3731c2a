use crate::traffic_lights::lights::{TrafficLight, TrafficLightID};
use indexmap::IndexMap;
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt;

/// Custom error types for `LightState`.
#[derive(Debug, Clone)]
pub enum LightStateError {
    /// Indicates that the provided state string is invalid.
    InvalidState(String),
}

impl fmt::Display for LightStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LightStateError::InvalidState(value) => {
                write!(f, "Invalid light state: '{}'", value)
            }
        }
    }
}

impl std::error::Error for LightStateError {}

lazy_static! {
    static ref STATE_CONVERTER: HashMap<&'static str, LightState> = {
        let mut m = HashMap::new();
        m.insert("red", LightState::Red);
        m.insert("green", LightState::Green);
        m.insert("r", LightState::Red);
        m.insert("g", LightState::Green);
        m
    };
}

/// Commanded state of a traffic light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightState {
    /// Vehicles must stop.
    Red,
    /// Vehicles may pass the junction.
    Green,
}

impl LightState {
    /// Converts a string representation to a `LightState`.
    ///
    /// # Example
    /// ```
    /// use junction_sim_core::traffic_lights::states::LightState;
    /// assert_eq!(LightState::from_str("green").unwrap(), LightState::Green);
    /// assert_eq!(LightState::from_str("r").unwrap(), LightState::Red);
    /// assert!(LightState::from_str("amber").is_err());
    /// ```
    pub fn from_str(state_str: &str) -> Result<Self, LightStateError> {
        STATE_CONVERTER
            .get(state_str)
            .copied()
            .ok_or(LightStateError::InvalidState(state_str.to_string()))
    }
}

impl fmt::Display for LightState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LightState::Red => "red",
            LightState::Green => "green",
        };
        write!(f, "{}", s)
    }
}

/// Runtime state of a signal head: the commanded state plus the transient
/// amber flag raised while the light is smoothing a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalState {
    pub state: LightState,
    pub in_amber: bool,
}

impl SignalState {
    /// True when the kinematic model must treat the light as stopping
    /// traffic: commanded red, or amber regardless of the commanded state.
    pub fn halts_traffic(&self) -> bool {
        self.state == LightState::Red || self.in_amber
    }
}

/// A single signal update: the target light, the commanded state and whether
/// the light is amber-smoothing the change.
///
/// Collaborators submitting plain `{light, state}` pairs use
/// [`SignalUpdate::commanded`], which leaves the amber flag down; the
/// coordinator raises amber itself when arbitrating controller decisions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalUpdate {
    pub light: TrafficLightID,
    pub state: LightState,
    pub in_amber: bool,
}

impl SignalUpdate {
    /// A plain commanded-state update with the amber flag down.
    pub fn commanded(light: TrafficLightID, state: LightState) -> Self {
        SignalUpdate {
            light,
            state,
            in_amber: false,
        }
    }
}

/// The per-junction board of runtime signal states.
///
/// This wraps an internal IndexMap<TrafficLightID, SignalState> so that
/// iteration order is the light registration order, keeping snapshot output
/// and simulation behaviour deterministic.
#[derive(Debug, Clone, Default)]
pub struct SignalBoard(IndexMap<TrafficLightID, SignalState>);

impl SignalBoard {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Creates a board seeded with every light's initial commanded state.
    pub fn from_lights(lights: &[TrafficLight]) -> Self {
        let mut board = IndexMap::with_capacity(lights.len());
        for light in lights {
            board.insert(
                light.get_id(),
                SignalState {
                    state: light.get_initial_state(),
                    in_amber: false,
                },
            );
        }
        Self(board)
    }

    /// Applies a batch of signal updates. Lights not mentioned in the batch
    /// keep their previous state; update IDs unknown to the board are ignored.
    pub fn apply(&mut self, updates: &[SignalUpdate]) {
        for update in updates {
            if let Some(signal) = self.0.get_mut(&update.light) {
                signal.state = update.state;
                signal.in_amber = update.in_amber;
            }
        }
    }

    /// Returns the runtime state of the given light.
    pub fn get(&self, id: TrafficLightID) -> Option<SignalState> {
        self.0.get(&id).copied()
    }

    /// Iterates over `(light, state)` pairs in registration order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, TrafficLightID, SignalState> {
        self.0.iter()
    }

    /// Number of lights on the board.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the board tracks no lights.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a SignalBoard {
    type Item = (&'a TrafficLightID, &'a SignalState);
    type IntoIter = indexmap::map::Iter<'a, TrafficLightID, SignalState>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traffic_lights::lights::TrafficLight;

    fn board_with_two_lights() -> SignalBoard {
        let lights = vec![
            TrafficLight::new(TrafficLightID(1))
                .with_origins(vec![111])
                .with_destinations(vec![111])
                .with_state(LightState::Red)
                .build(),
            TrafficLight::new(TrafficLightID(2))
                .with_origins(vec![123])
                .with_destinations(vec![123])
                .with_state(LightState::Green)
                .build(),
        ];
        SignalBoard::from_lights(&lights)
    }

    #[test]
    fn test_board_seeding() {
        let board = board_with_two_lights();
        assert_eq!(board.len(), 2);
        assert_eq!(board.get(TrafficLightID(1)).unwrap().state, LightState::Red);
        assert_eq!(
            board.get(TrafficLightID(2)).unwrap().state,
            LightState::Green
        );
    }

    #[test]
    fn test_apply_leaves_absent_lights_unchanged() {
        let mut board = board_with_two_lights();
        board.apply(&[SignalUpdate::commanded(TrafficLightID(1), LightState::Green)]);
        assert_eq!(
            board.get(TrafficLightID(1)).unwrap().state,
            LightState::Green
        );
        // Light 2 was not mentioned: unchanged.
        assert_eq!(
            board.get(TrafficLightID(2)).unwrap().state,
            LightState::Green
        );
    }

    #[test]
    fn test_apply_ignores_unknown_ids() {
        let mut board = board_with_two_lights();
        board.apply(&[SignalUpdate::commanded(TrafficLightID(99), LightState::Green)]);
        assert_eq!(board.len(), 2);
        assert!(board.get(TrafficLightID(99)).is_none());
    }

    #[test]
    fn test_amber_halts_traffic() {
        let green = SignalState {
            state: LightState::Green,
            in_amber: false,
        };
        let amber_green = SignalState {
            state: LightState::Green,
            in_amber: true,
        };
        let red = SignalState {
            state: LightState::Red,
            in_amber: false,
        };
        assert!(!green.halts_traffic());
        assert!(amber_green.halts_traffic());
        assert!(red.halts_traffic());
    }
}
