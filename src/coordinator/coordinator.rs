use crate::control::controller::{Controller, LightCommand};
use crate::control::strategy::{StrategyError, StrategyKind, Tunables};
use crate::coordinator::arbiter::SignalArbiter;
use crate::simulation::config::SimulationConfig;
use crate::simulation::simulator::Simulator;
use crate::simulation::states::ObservationSnapshot;
use crate::topology::junction::{Junction, JunctionDescription, TopologyError};
use crate::verbose::{
    verbose_log_with_fields, VerboseLevel, EVENT_COORDINATOR_START, EVENT_COORDINATOR_STOP,
    EVENT_STRATEGY_SWAP, EVENT_TICK_SKIPPED, EVENT_TOPOLOGY_SWAP,
};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

/// Lifecycle state of the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Stopped,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Stopped => "stopped",
        };
        write!(f, "{}", s)
    }
}

/// Errors surfaced by the coordinator's public API.
///
/// Only construction-time and configuration errors reach the caller; runtime
/// faults are recovered inside the loops.
#[derive(Debug)]
pub enum CoordinatorError {
    /// `start` called in a state other than `Idle`.
    NotIdle,
    /// `stop` called in a state other than `Running`.
    NotRunning,
    /// Topology intake failed validation.
    Topology(TopologyError),
    /// Strategy intake carried an unknown identifier.
    Strategy(StrategyError),
}

impl fmt::Display for CoordinatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinatorError::NotIdle => write!(f, "Coordinator has already been started"),
            CoordinatorError::NotRunning => write!(f, "Coordinator is not running"),
            CoordinatorError::Topology(err) => write!(f, "Invalid topology: {}", err),
            CoordinatorError::Strategy(err) => write!(f, "Invalid strategy: {}", err),
        }
    }
}

impl std::error::Error for CoordinatorError {}

impl From<TopologyError> for CoordinatorError {
    fn from(err: TopologyError) -> Self {
        CoordinatorError::Topology(err)
    }
}

impl From<StrategyError> for CoordinatorError {
    fn from(err: StrategyError) -> Self {
        CoordinatorError::Strategy(err)
    }
}

/// One published controller decision, sequence-numbered so the sim side can
/// tell fresh frames from the one it already adopted.
#[derive(Debug, Clone)]
pub struct DecisionFrame {
    pub seq: u64,
    pub switched: bool,
    pub commands: Vec<LightCommand>,
}

/// Configuration of the closed loop.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Simulator knobs (time step, geometry, seed).
    simulation: SimulationConfig,
    /// Control loop cadence Δt_ctrl in seconds. Must not undercut the
    /// simulation time step.
    control_period: f64,
    /// Amber smoothing interval in seconds of simulated time.
    amber_duration: f64,
    /// Initial scoring strategy.
    strategy: StrategyKind,
    /// Initial strategy tunables.
    tunables: Tunables,
}

impl CoordinatorConfig {
    /// Creates a new `CoordinatorConfigBuilder` with reference defaults:
    /// 0.1 s control cadence, 2.5 s amber, smart_fair scoring.
    pub fn new() -> CoordinatorConfigBuilder {
        CoordinatorConfigBuilder {
            config: CoordinatorConfig {
                simulation: SimulationConfig::default(),
                control_period: 0.1,
                amber_duration: 2.5,
                strategy: StrategyKind::SmartFair,
                tunables: Tunables::default(),
            },
        }
    }

    pub fn get_simulation(&self) -> &SimulationConfig {
        &self.simulation
    }

    pub fn get_control_period(&self) -> f64 {
        self.control_period
    }

    pub fn get_amber_duration(&self) -> f64 {
        self.amber_duration
    }

    pub fn get_strategy(&self) -> StrategyKind {
        self.strategy
    }

    pub fn get_tunables(&self) -> Tunables {
        self.tunables
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        CoordinatorConfig::new().build()
    }
}

/// A builder for constructing `CoordinatorConfig` instances.
pub struct CoordinatorConfigBuilder {
    config: CoordinatorConfig,
}

impl CoordinatorConfigBuilder {
    pub fn with_simulation(mut self, simulation: SimulationConfig) -> Self {
        self.config.simulation = simulation;
        self
    }

    pub fn with_control_period(mut self, control_period: f64) -> Self {
        self.config.control_period = control_period;
        self
    }

    pub fn with_amber_duration(mut self, amber_duration: f64) -> Self {
        self.config.amber_duration = amber_duration;
        self
    }

    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.config.strategy = strategy;
        self
    }

    pub fn with_tunables(mut self, tunables: Tunables) -> Self {
        self.config.tunables = tunables;
        self
    }

    pub fn build(self) -> CoordinatorConfig {
        self.config
    }
}

/// Commands forwarded to the control loop.
enum ControlCommand {
    SetStrategy(StrategyKind, Tunables),
}

/// The closed-loop coordinator.
///
/// Owns the lifecycle of the simulator tick loop and the controller decision
/// loop. All cross-loop communication is message passing over single-slot
/// channels; a reader always sees the latest complete value and no loop ever
/// blocks on the other.
pub struct Coordinator {
    id: Uuid,
    state: RunState,
    config: CoordinatorConfig,
    topology_tx: watch::Sender<Arc<Junction>>,
    snapshot_tx: watch::Sender<Option<ObservationSnapshot>>,
    decision_tx: watch::Sender<Option<DecisionFrame>>,
    command_tx: mpsc::UnboundedSender<ControlCommand>,
    command_rx: Option<mpsc::UnboundedReceiver<ControlCommand>>,
    shutdown_tx: watch::Sender<bool>,
    /// Transient tick faults recovered inside the loops.
    tick_errors: Arc<AtomicU64>,
    sim_handle: Option<JoinHandle<()>>,
    control_handle: Option<JoinHandle<()>>,
}

impl Coordinator {
    /// Validates the topology description and builds an idle coordinator.
    pub fn build(
        description: JunctionDescription,
        config: CoordinatorConfig,
    ) -> Result<Self, CoordinatorError> {
        let junction = Arc::new(Junction::build(description)?);
        let (topology_tx, _) = watch::channel(junction);
        let (snapshot_tx, _) = watch::channel(None);
        let (decision_tx, _) = watch::channel(None);
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, _) = watch::channel(false);
        Ok(Coordinator {
            id: Uuid::new_v4(),
            state: RunState::Idle,
            config,
            topology_tx,
            snapshot_tx,
            decision_tx,
            command_tx,
            command_rx: Some(command_rx),
            shutdown_tx,
            tick_errors: Arc::new(AtomicU64::new(0)),
            sim_handle: None,
            control_handle: None,
        })
    }

    /// Returns the unique coordinator run identifier.
    pub fn get_id(&self) -> Uuid {
        self.id
    }

    /// Returns the lifecycle state.
    pub fn get_state(&self) -> RunState {
        self.state
    }

    /// Returns the junction currently in force.
    pub fn junction(&self) -> Arc<Junction> {
        self.topology_tx.borrow().clone()
    }

    /// Number of transient tick faults recovered so far.
    pub fn tick_error_count(&self) -> u64 {
        self.tick_errors.load(Ordering::Relaxed)
    }

    /// Subscribes to the observation snapshot stream (single-slot: a reader
    /// always sees the latest snapshot).
    pub fn snapshots(&self) -> watch::Receiver<Option<ObservationSnapshot>> {
        self.snapshot_tx.subscribe()
    }

    /// Subscribes to the controller decision stream.
    pub fn decisions(&self) -> watch::Receiver<Option<DecisionFrame>> {
        self.decision_tx.subscribe()
    }

    /// Selects the control strategy by identifier, with tunables.
    ///
    /// Unknown identifiers fail immediately; a valid choice is forwarded to
    /// the control loop and applied at its next tick boundary.
    pub fn set_strategy(&self, name: &str, tunables: Tunables) -> Result<(), CoordinatorError> {
        let kind = StrategyKind::from_str(name)?;
        let _ = self
            .command_tx
            .send(ControlCommand::SetStrategy(kind, tunables));
        Ok(())
    }

    /// Validates and publishes a new topology.
    ///
    /// The swap is atomic: both loops pick the new junction up at their next
    /// tick boundary, the controller re-keys its per-phase state, and phases
    /// absent from the new enumeration are discarded.
    pub fn update_topology(&self, description: JunctionDescription) -> Result<(), CoordinatorError> {
        let junction = Arc::new(Junction::build(description)?);
        verbose_log_with_fields(
            VerboseLevel::Main,
            EVENT_TOPOLOGY_SWAP,
            "topology update published",
            &[("junction", &junction.get_id())],
        );
        self.topology_tx.send_replace(junction);
        Ok(())
    }

    /// Transitions Idle → Running: acquires the simulator, the controller and
    /// both periodic tasks.
    pub async fn start(&mut self) -> Result<(), CoordinatorError> {
        if self.state != RunState::Idle {
            return Err(CoordinatorError::NotIdle);
        }
        let junction = self.junction();
        let simulator = Simulator::new(Arc::clone(&junction), self.config.get_simulation().clone());
        let controller = Controller::new(
            junction,
            self.config.get_strategy(),
            self.config.get_tunables(),
        );
        let command_rx = self
            .command_rx
            .take()
            .expect("command receiver consumed only once, on start");

        self.shutdown_tx.send_replace(false);
        verbose_log_with_fields(
            VerboseLevel::Main,
            EVENT_COORDINATOR_START,
            "closed loop starting",
            &[
                ("coordinator", &self.id),
                ("strategy", &self.config.get_strategy()),
            ],
        );

        self.sim_handle = Some(tokio::spawn(run_sim_loop(
            simulator,
            self.config.clone(),
            self.topology_tx.subscribe(),
            self.decision_tx.subscribe(),
            self.snapshot_tx.clone(),
            self.shutdown_tx.subscribe(),
            Arc::clone(&self.tick_errors),
        )));
        self.control_handle = Some(tokio::spawn(run_control_loop(
            controller,
            self.config.get_control_period(),
            self.topology_tx.subscribe(),
            self.snapshot_tx.subscribe(),
            self.decision_tx.clone(),
            command_rx,
            self.shutdown_tx.subscribe(),
        )));
        self.state = RunState::Running;
        Ok(())
    }

    /// Transitions Running → Stopped: signals cancellation and joins both
    /// tasks. Cancellation is observed at cycle boundaries, so no tick is
    /// ever cut in half.
    pub async fn stop(&mut self) -> Result<(), CoordinatorError> {
        if self.state != RunState::Running {
            return Err(CoordinatorError::NotRunning);
        }
        self.shutdown_tx.send_replace(true);
        if let Some(handle) = self.sim_handle.take() {
            let _ = handle.await;
        }
        if let Some(handle) = self.control_handle.take() {
            let _ = handle.await;
        }
        self.state = RunState::Stopped;
        verbose_log_with_fields(
            VerboseLevel::Main,
            EVENT_COORDINATOR_STOP,
            "closed loop stopped",
            &[("coordinator", &self.id)],
        );
        Ok(())
    }
}

/// The periodic simulation task: arbitrate signals, step, publish.
async fn run_sim_loop(
    mut simulator: Simulator,
    config: CoordinatorConfig,
    mut topology_rx: watch::Receiver<Arc<Junction>>,
    decision_rx: watch::Receiver<Option<DecisionFrame>>,
    snapshot_tx: watch::Sender<Option<ObservationSnapshot>>,
    mut shutdown_rx: watch::Receiver<bool>,
    tick_errors: Arc<AtomicU64>,
) {
    let mut arbiter = SignalArbiter::new(
        simulator.get_junction(),
        config.get_amber_duration(),
        config.get_control_period(),
    );
    let mut ticker =
        tokio::time::interval(Duration::from_secs_f64(config.get_simulation().get_time_step()));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                if topology_rx.has_changed().unwrap_or(false) {
                    let junction = topology_rx.borrow_and_update().clone();
                    simulator.set_junction(Arc::clone(&junction));
                    arbiter.rebase(&junction);
                }
                let frame = decision_rx.borrow().clone();
                let updates = arbiter.arbitrate(frame.as_ref(), simulator.sim_time());
                simulator.apply_signals(&updates);
                match simulator.step() {
                    Ok(snapshot) => {
                        snapshot_tx.send_replace(Some(snapshot));
                    }
                    Err(err) => {
                        tick_errors.fetch_add(1, Ordering::Relaxed);
                        tracing::warn!(error = %err, "simulation tick skipped");
                    }
                }
            }
        }
    }
}

/// The periodic control task: read the latest snapshot, decide, publish.
async fn run_control_loop(
    mut controller: Controller,
    control_period: f64,
    mut topology_rx: watch::Receiver<Arc<Junction>>,
    snapshot_rx: watch::Receiver<Option<ObservationSnapshot>>,
    decision_tx: watch::Sender<Option<DecisionFrame>>,
    mut command_rx: mpsc::UnboundedReceiver<ControlCommand>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(Duration::from_secs_f64(control_period));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let deadline = Duration::from_secs_f64(2.0 * control_period);
    let mut seq = 0u64;

    loop {
        tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                while let Ok(command) = command_rx.try_recv() {
                    match command {
                        ControlCommand::SetStrategy(kind, tunables) => {
                            controller.set_strategy(kind, tunables);
                            verbose_log_with_fields(
                                VerboseLevel::Main,
                                EVENT_STRATEGY_SWAP,
                                "control strategy swapped",
                                &[("strategy", &kind)],
                            );
                        }
                    }
                }
                if topology_rx.has_changed().unwrap_or(false) {
                    controller.retarget(topology_rx.borrow_and_update().clone());
                }
                let Some(snapshot) = snapshot_rx.borrow().clone() else {
                    continue;
                };
                let started = Instant::now();
                let decision = controller.decide(&snapshot);
                if started.elapsed() > deadline {
                    // Overran the tick budget: the decision is stale, discard it.
                    verbose_log_with_fields(
                        VerboseLevel::Main,
                        EVENT_TICK_SKIPPED,
                        "control tick overran its deadline, decision discarded",
                        &[("sim_time", &snapshot.sim_time)],
                    );
                    continue;
                }
                seq += 1;
                decision_tx.send_replace(Some(DecisionFrame {
                    seq,
                    switched: decision.switched,
                    commands: decision.commands,
                }));
            }
        }
    }
}
