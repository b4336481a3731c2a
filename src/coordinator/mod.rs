//! # Coordinator Module
//!
//! The closed-loop coordinator: owns the simulator tick loop and the
//! controller decision loop, arbitrates the observation/actuation exchange
//! between them, and is the single source of truth for light state.
//!
//! ## Loop layout
//!
//! ```text
//!            watch<Arc<Junction>>           (topology swaps, atomic)
//!                 │        │
//!                 ▼        ▼
//!  ┌─ sim task ────────┐      ┌─ control task ─────┐
//!  │ interval(Δt)      │ ──▶  │ interval(Δt_ctrl)  │
//!  │ arbitrate signals │ snap │ Controller::decide │
//!  │ Simulator::step   │ ◀──  │ publish frame      │
//!  └───────────────────┘ deci └────────────────────┘
//! ```
//!
//! Both channels are single-slot (`tokio::sync::watch`): the simulator always
//! reads the latest complete decision, the controller always reads the latest
//! complete snapshot, and neither loop blocks on the other.
//!
//! ## Signal smoothing and failure handling
//!
//! The [`arbiter::SignalArbiter`] sits between the decision stream and the
//! simulator's signal board. It raises the amber flag on every light whose
//! state a fresh decision changed (amber behaves as red to the kinematics for
//! the configured duration) and watches the exchange cadence: one missed
//! control period retains the previous light state, two consecutive misses
//! force every light red, and the first fresh decision afterwards resumes
//! normal operation.
//!
//! ## Components
//!
//! - [`coordinator::Coordinator`] - Lifecycle (`start` / `stop`), topology and
//!   strategy intake, snapshot/decision fan-out
//! - [`coordinator::CoordinatorConfig`] - Cadences, amber duration, strategy
//! - [`arbiter::SignalArbiter`] - Amber smoothing + safe fallback
//! - [`amber::AmberTimers`] - Per-light amber deadlines
//! - [`exchange::ExchangeGuard`] - Consecutive-failure tracking
pub mod amber;
pub mod arbiter;
pub mod coordinator;
pub mod exchange;

pub use self::arbiter::SignalArbiter;
pub use self::coordinator::{
    Coordinator, CoordinatorConfig, CoordinatorError, DecisionFrame, RunState,
};
