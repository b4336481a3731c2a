//! # Verbose Module
//!
//! Structured JSON logging for the simulation and control pipeline.
//!
//! Logging is gated by a global [`VerboseLevel`] so that headless batch runs
//! (thousands of steps per second) pay nothing when the gate is closed, while
//! interactive runs can stream per-event JSON lines via the `tracing` crate.
//!
//! ## Levels
//!
//! | Level | Maps to | Meaning |
//! |-------|---------|---------|
//! | `None` | - | No output at all |
//! | `Main` | `info` | Lifecycle, phase switches, fallback transitions |
//! | `Additional` | `debug` | Per-tick summaries |
//! | `Detailed` | `debug` | Per-vehicle operations |
//! | `All` | `trace` | Everything |
//!
//! ## Usage
//!
//! ```rust
//! use junction_sim_core::verbose::{VerboseLevel, set_verbose_level, verbose_log};
//! use junction_sim_core::verbose::EVENT_PHASE_SWITCH;
//!
//! set_verbose_level(VerboseLevel::Main);
//! verbose_log(VerboseLevel::Main, EVENT_PHASE_SWITCH, "controller picked a new phase");
//! ```
pub mod verbose;

pub use self::verbose::*;
