use std::fmt;
use std::sync::OnceLock;
use tracing::{debug, info, trace, Level};
use tracing_subscriber::{
    fmt as tracing_fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Hierarchical logging levels for simulation and control debugging.
///
/// Each level includes all lower levels. Output is JSON structured logging
/// via the `tracing` crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum VerboseLevel {
    /// No debug at all
    None = 0,
    /// Major lifecycle events - `info` level
    Main = 1,
    /// Per-tick summaries - `debug` level
    Additional = 2,
    /// Per-vehicle and per-phase operations - `debug` level
    Detailed = 3,
    /// Everything including traces - `trace` level
    All = 4,
}

impl fmt::Display for VerboseLevel {
    /// Formats the verbosity level for display.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use junction_sim_core::verbose::VerboseLevel;
    ///
    /// assert_eq!(format!("{}", VerboseLevel::None), "none");
    /// assert_eq!(format!("{}", VerboseLevel::Main), "main");
    /// assert_eq!(format!("{}", VerboseLevel::All), "all");
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VerboseLevel::None => "none",
            VerboseLevel::Main => "main",
            VerboseLevel::Additional => "additional",
            VerboseLevel::Detailed => "detailed",
            VerboseLevel::All => "all",
        };
        write!(f, "{}", s)
    }
}

impl From<VerboseLevel> for Level {
    fn from(level: VerboseLevel) -> Self {
        match level {
            VerboseLevel::None => Level::ERROR,
            VerboseLevel::Main => Level::INFO,
            VerboseLevel::Additional => Level::DEBUG,
            VerboseLevel::Detailed => Level::DEBUG,
            VerboseLevel::All => Level::TRACE,
        }
    }
}

// Event type constants
pub const EVENT_SIM_STEP: &str = "sim_step";
pub const EVENT_SPAWN_VEHICLES: &str = "spawn_vehicles";
pub const EVENT_SPAWN_VEHICLE: &str = "spawn_vehicle";
pub const EVENT_KINEMATIC_UPDATE: &str = "kinematic_update";
pub const EVENT_LANE_TRANSFER: &str = "lane_transfer";
pub const EVENT_VEHICLE_EXIT: &str = "vehicle_exit";
pub const EVENT_COLLISIONS: &str = "collisions";
pub const EVENT_SIGNALS_APPLY: &str = "signals_apply";
pub const EVENT_SNAPSHOT_PUBLISH: &str = "snapshot_publish";
pub const EVENT_CONTROL_TICK: &str = "control_tick";
pub const EVENT_PHASE_SCORES: &str = "phase_scores";
pub const EVENT_PHASE_SWITCH: &str = "phase_switch";
pub const EVENT_PHASE_HOLD: &str = "phase_hold";
pub const EVENT_AMBER_BEGIN: &str = "amber_begin";
pub const EVENT_AMBER_END: &str = "amber_end";
pub const EVENT_SAFE_FALLBACK: &str = "safe_fallback";
pub const EVENT_EXCHANGE_RECOVERED: &str = "exchange_recovered";
pub const EVENT_TOPOLOGY_SWAP: &str = "topology_swap";
pub const EVENT_STRATEGY_SWAP: &str = "strategy_swap";
pub const EVENT_COORDINATOR_START: &str = "coordinator_start";
pub const EVENT_COORDINATOR_STOP: &str = "coordinator_stop";
pub const EVENT_TICK_SKIPPED: &str = "tick_skipped";

// Global verbose level storage
static VERBOSE_LEVEL: OnceLock<VerboseLevel> = OnceLock::new();
static LOGGER_INITIALIZED: OnceLock<bool> = OnceLock::new();

/// Initialize the tracing logger once
pub fn init_logger() {
    if LOGGER_INITIALIZED.set(true).is_ok() {
        tracing_subscriber::registry()
            .with(
                tracing_fmt::layer()
                    .json()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(EnvFilter::from_default_env())
            .init();
    }
}

/// Sets the global verbose level and installs the tracing subscriber
pub fn set_verbose_level(level: VerboseLevel) {
    let _ = VERBOSE_LEVEL.set(level);
    init_logger();
}

/// Gets the current global verbose level
pub fn get_verbose_level() -> VerboseLevel {
    *VERBOSE_LEVEL.get().unwrap_or(&VerboseLevel::None)
}

/// Checks if current global verbose level is at least the specified level
pub fn is_verbose_level(level: VerboseLevel) -> bool {
    get_verbose_level() >= level
}

/// Logs a message if the global verbose level allows it
pub fn verbose_log(level: VerboseLevel, event: &str, message: &str) {
    if !is_verbose_level(level) {
        return;
    }

    match level {
        VerboseLevel::None => {}
        VerboseLevel::Main => {
            info!(event = event, message);
        }
        VerboseLevel::Additional | VerboseLevel::Detailed => {
            debug!(event = event, message);
        }
        VerboseLevel::All => {
            trace!(event = event, message);
        }
    }
}

/// Logs a message with additional fields using the global verbose level
pub fn verbose_log_with_fields(
    level: VerboseLevel,
    event: &str,
    message: &str,
    fields: &[(&str, &dyn fmt::Display)],
) {
    if !is_verbose_level(level) {
        return;
    }

    let mut field_map = std::collections::HashMap::new();
    for (key, value) in fields {
        field_map.insert(*key, format!("{}", value));
    }

    match level {
        VerboseLevel::None => {}
        VerboseLevel::Main => {
            info!(event = event, ?field_map, message);
        }
        VerboseLevel::Additional | VerboseLevel::Detailed => {
            debug!(event = event, ?field_map, message);
        }
        VerboseLevel::All => {
            trace!(event = event, ?field_map, message);
        }
    }
}

/// Convenience macro for global verbose logging
#[macro_export]
macro_rules! verbose_log {
    ($level:expr, $event:expr, $msg:literal) => {
        $crate::verbose::verbose_log($level, $event, $msg)
    };
    ($level:expr, $event:expr, $msg:literal, $($key:literal => $value:expr),+) => {
        $crate::verbose::verbose_log_with_fields(
            $level,
            $event,
            $msg,
            &[$(($key, &$value)),+]
        )
    };
}

impl VerboseLevel {
    /// Checks if this level is at least the minimum level
    pub fn is_at_least(self, min_level: VerboseLevel) -> bool {
        self >= min_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(VerboseLevel::Main.is_at_least(VerboseLevel::None));
        assert!(VerboseLevel::All.is_at_least(VerboseLevel::Detailed));
        assert!(!VerboseLevel::Main.is_at_least(VerboseLevel::Additional));
    }

    #[test]
    fn test_level_display() {
        assert_eq!(VerboseLevel::Additional.to_string(), "additional");
        assert_eq!(VerboseLevel::Detailed.to_string(), "detailed");
    }
}
