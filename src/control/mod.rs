//! # Control Module
//!
//! The adaptive traffic-light controller: each control tick it ingests an
//! observation snapshot, scores every enumerated phase, picks a winner and
//! emits the light states that hold that phase green.
//!
//! ## Strategies
//!
//! The controller is polymorphic over a closed set of scoring strategies,
//! expressed as a sum type rather than an inheritance chain:
//!
//! | Strategy | Score |
//! |----------|-------|
//! | `round_robin` | none - rotates through the phase list every `period` seconds |
//! | `volume_based` | vehicle count on the phase's origin lanes |
//! | `weighted_wait` | `(N+1)^(avg_wait+1)` |
//! | `exponential_wait` | `(N+1)^avg_wait` |
//! | `smart_fair` | `α·Σwait + β·N + γ·(t - last_served)` |
//! | `adaptive_flow` | smart_fair over exponentially smoothed waits |
//!
//! Score-based strategies apply hysteresis: the active phase is kept unless
//! the challenger beats it by at least the configured threshold, preventing
//! flicker when two scores cross by small margins.
//!
//! ## Time base
//!
//! The controller clocks itself from the snapshot's simulated time, never
//! from the wall clock, so control decisions are deterministic and
//! replayable against a recorded snapshot stream.
//!
//! ## Components
//!
//! - [`strategy::StrategyKind`] - The strategy sum type and its identifier parser
//! - [`strategy::Tunables`] - Scoring weights (α, β, γ, H, T, ρ)
//! - [`controller::Controller`] - Wait tracking, scoring, phase activation
//! - [`controller::PhaseDecision`] - The per-tick output: winner + light commands
pub mod controller;
pub mod strategy;

pub use self::controller::{Controller, LightCommand, PhaseDecision};
pub use self::strategy::{StrategyError, StrategyKind, Tunables};
