use crate::traffic_lights::lights::TrafficLightID;
use indexmap::IndexMap;

/// Per-light amber deadlines.
///
/// A light is marked when a decision changes its commanded state; the mark
/// expires after the configured duration of simulated time. While marked,
/// the kinematic model treats the light as red regardless of its commanded
/// state.
#[derive(Debug, Clone)]
pub struct AmberTimers {
    deadlines: IndexMap<TrafficLightID, f64>,
    duration: f64,
}

impl AmberTimers {
    /// Creates timers with the given amber duration in seconds.
    pub fn new(duration: f64) -> Self {
        AmberTimers {
            deadlines: IndexMap::new(),
            duration,
        }
    }

    /// Returns the configured amber duration.
    pub fn get_duration(&self) -> f64 {
        self.duration
    }

    /// Marks a light amber until `now + duration`. Re-marking restarts the
    /// interval.
    pub fn mark(&mut self, light: TrafficLightID, now: f64) {
        self.deadlines.insert(light, now + self.duration);
    }

    /// Drops every mark whose deadline has passed.
    pub fn expire(&mut self, now: f64) {
        self.deadlines.retain(|_, deadline| *deadline > now);
    }

    /// Whether the light is currently amber.
    pub fn is_amber(&self, light: TrafficLightID) -> bool {
        self.deadlines.contains_key(&light)
    }

    /// Drops all marks.
    pub fn clear(&mut self) {
        self.deadlines.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amber_lasts_exactly_the_duration() {
        let mut timers = AmberTimers::new(2.5);
        timers.mark(TrafficLightID(1), 10.0);
        timers.expire(10.0);
        assert!(timers.is_amber(TrafficLightID(1)));
        timers.expire(12.4);
        assert!(timers.is_amber(TrafficLightID(1)));
        timers.expire(12.5);
        assert!(!timers.is_amber(TrafficLightID(1)));
    }

    #[test]
    fn test_remark_restarts_interval() {
        let mut timers = AmberTimers::new(1.0);
        timers.mark(TrafficLightID(1), 0.0);
        timers.mark(TrafficLightID(1), 0.8);
        timers.expire(1.0);
        assert!(timers.is_amber(TrafficLightID(1)));
        timers.expire(1.8);
        assert!(!timers.is_amber(TrafficLightID(1)));
    }
}
