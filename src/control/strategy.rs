use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt;

/// Custom error types for strategy configuration.
#[derive(Debug, Clone)]
pub enum StrategyError {
    /// The supplied strategy identifier is not recognised.
    UnknownStrategy(String),
}

impl fmt::Display for StrategyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyError::UnknownStrategy(value) => {
                write!(f, "Unknown strategy: '{}'", value)
            }
        }
    }
}

impl std::error::Error for StrategyError {}

lazy_static! {
    static ref STRATEGY_CONVERTER: HashMap<&'static str, StrategyKind> = {
        let mut m = HashMap::new();
        m.insert("round_robin", StrategyKind::RoundRobin);
        m.insert("volume_based", StrategyKind::VolumeBased);
        m.insert("weighted_wait", StrategyKind::WeightedWait);
        m.insert("exponential_wait", StrategyKind::ExponentialWait);
        m.insert("smart_fair", StrategyKind::SmartFair);
        m.insert("adaptive_flow", StrategyKind::AdaptiveFlow);
        m
    };
}

/// The closed set of controller scoring strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Rotate through the enumerated phase list on a fixed period.
    RoundRobin,
    /// Serve the phase with the most vehicles on its origin lanes.
    VolumeBased,
    /// Exponential pressure `(N+1)^(avg_wait+1)`.
    WeightedWait,
    /// Exponential pressure `(N+1)^avg_wait`.
    ExponentialWait,
    /// Delay, volume and fairness pressure with hysteresis.
    SmartFair,
    /// SmartFair over exponentially smoothed waiting times.
    AdaptiveFlow,
}

impl StrategyKind {
    /// Parses a strategy identifier.
    ///
    /// # Example
    /// ```
    /// use junction_sim_core::control::StrategyKind;
    /// assert_eq!(StrategyKind::from_str("smart_fair").unwrap(), StrategyKind::SmartFair);
    /// assert!(StrategyKind::from_str("psychic").is_err());
    /// ```
    pub fn from_str(strategy_str: &str) -> Result<Self, StrategyError> {
        STRATEGY_CONVERTER
            .get(strategy_str)
            .copied()
            .ok_or(StrategyError::UnknownStrategy(strategy_str.to_string()))
    }

    /// Whether the strategy computes per-phase scores (everything but
    /// round-robin does).
    pub fn is_scored(self) -> bool {
        self != StrategyKind::RoundRobin
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StrategyKind::RoundRobin => "round_robin",
            StrategyKind::VolumeBased => "volume_based",
            StrategyKind::WeightedWait => "weighted_wait",
            StrategyKind::ExponentialWait => "exponential_wait",
            StrategyKind::SmartFair => "smart_fair",
            StrategyKind::AdaptiveFlow => "adaptive_flow",
        };
        write!(f, "{}", s)
    }
}

/// Per-strategy tunables.
///
/// Unused knobs are simply ignored by strategies that do not read them
/// (round-robin only reads `period`, smart_fair never reads `decay`, ...).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tunables {
    /// Weight of cumulative waiting time (delay pressure).
    pub alpha: f64,
    /// Weight of vehicle count (volume pressure).
    pub beta: f64,
    /// Weight of time since last service (fairness pressure).
    pub gamma: f64,
    /// Minimum score margin a challenger needs to unseat the active phase.
    pub hysteresis: f64,
    /// Round-robin rotation period in seconds.
    pub period: f64,
    /// Exponential smoothing factor ρ for adaptive_flow wait updates.
    pub decay: f64,
}

impl Default for Tunables {
    fn default() -> Self {
        Tunables {
            alpha: 1.0,
            beta: 5.0,
            gamma: 1.0,
            hysteresis: 10.0,
            period: 5.0,
            decay: 0.8,
        }
    }
}

impl Tunables {
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_hysteresis(mut self, hysteresis: f64) -> Self {
        self.hysteresis = hysteresis;
        self
    }

    pub fn with_period(mut self, period: f64) -> Self {
        self.period = period;
        self
    }

    pub fn with_decay(mut self, decay: f64) -> Self {
        self.decay = decay;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strategy_valid() {
        assert_eq!(
            StrategyKind::from_str("round_robin").unwrap(),
            StrategyKind::RoundRobin
        );
        assert_eq!(
            StrategyKind::from_str("volume_based").unwrap(),
            StrategyKind::VolumeBased
        );
        assert_eq!(
            StrategyKind::from_str("weighted_wait").unwrap(),
            StrategyKind::WeightedWait
        );
        assert_eq!(
            StrategyKind::from_str("exponential_wait").unwrap(),
            StrategyKind::ExponentialWait
        );
        assert_eq!(
            StrategyKind::from_str("smart_fair").unwrap(),
            StrategyKind::SmartFair
        );
        assert_eq!(
            StrategyKind::from_str("adaptive_flow").unwrap(),
            StrategyKind::AdaptiveFlow
        );
    }

    #[test]
    fn test_parse_strategy_invalid() {
        let result = StrategyKind::from_str("simulated_annealing");
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "Unknown strategy: 'simulated_annealing'"
        );
    }

    #[test]
    fn test_only_round_robin_is_unscored() {
        assert!(!StrategyKind::RoundRobin.is_scored());
        for kind in [
            StrategyKind::VolumeBased,
            StrategyKind::WeightedWait,
            StrategyKind::ExponentialWait,
            StrategyKind::SmartFair,
            StrategyKind::AdaptiveFlow,
        ] {
            assert!(kind.is_scored(), "{} should be score-based", kind);
        }
    }

    #[test]
    fn test_display_round_trip() {
        for name in [
            "round_robin",
            "volume_based",
            "weighted_wait",
            "exponential_wait",
            "smart_fair",
            "adaptive_flow",
        ] {
            let kind = StrategyKind::from_str(name).unwrap();
            assert_eq!(kind.to_string(), name);
        }
    }
}
