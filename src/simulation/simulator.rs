use crate::agents::{Vehicle, VehicleID};
use crate::simulation::collisions::count_collisions;
use crate::simulation::config::SimulationConfig;
use crate::simulation::kinematics::{advance, gap_ahead};
use crate::simulation::spawn::{draw_arrivals, spawn_vehicle};
use crate::simulation::states::{
    LaneObservation, LightObservation, ObservationSnapshot, RoadObservation, VehicleObservation,
};
use crate::simulation::traffic::LaneTraffic;
use crate::simulation::transfer::{resolve_transfer, TransferOutcome};
use crate::topology::junction::Junction;
use crate::topology::road::LaneID;
use crate::traffic_lights::states::{SignalBoard, SignalUpdate};
use crate::utils::rand::seeded_rng;
use crate::verbose::{
    is_verbose_level, verbose_log_with_fields, VerboseLevel, EVENT_LANE_TRANSFER, EVENT_SIM_STEP,
    EVENT_SPAWN_VEHICLES, EVENT_VEHICLE_EXIT,
};
use rand::rngs::StdRng;
use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Per-tick faults of the simulator.
///
/// These are transient at the loop layer: the coordinator logs them, counts
/// them and skips the tick rather than terminating.
#[derive(Debug, Clone)]
pub enum SimulationError {
    /// Traffic references a lane the current junction does not know.
    UnknownLane(LaneID),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::UnknownLane(lane_id) => {
                write!(f, "Unknown lane '{}' in traffic state", lane_id)
            }
        }
    }
}

impl std::error::Error for SimulationError {}

/// The microscopic stepping engine.
///
/// Owns all per-tick mutable state: vehicle queues, the signal board and the
/// seeded RNG. The junction topology is held behind an `Arc` and never
/// mutated; a topology update swaps the whole handle between ticks.
pub struct Simulator {
    /// Immutable topology, shared with the control side.
    junction: Arc<Junction>,
    /// Time step, geometry and seeding knobs.
    config: SimulationConfig,
    /// Per-lane vehicle queues.
    traffic: LaneTraffic,
    /// Latest complete signal state set, cached between ingests.
    signals: SignalBoard,
    /// The only source of randomness in the simulation.
    rng: StdRng,
    /// Next identifier handed to a spawned vehicle.
    next_vehicle_id: VehicleID,
    /// Number of steps executed.
    steps: i64,
}

impl Simulator {
    /// Creates a simulator over the given junction.
    ///
    /// With a pinned seed the run is fully reproducible; without one the RNG
    /// is seeded from the operating system.
    pub fn new(junction: Arc<Junction>, config: SimulationConfig) -> Self {
        let rng = seeded_rng(config.get_seed());
        Simulator {
            traffic: LaneTraffic::from_junction(&junction),
            signals: SignalBoard::from_lights(junction.get_lights()),
            junction,
            config,
            rng,
            next_vehicle_id: 1,
            steps: 0,
        }
    }

    /// Returns the junction the simulator currently runs against.
    pub fn get_junction(&self) -> &Arc<Junction> {
        &self.junction
    }

    /// Returns the simulator configuration.
    pub fn get_config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Returns the cached signal board.
    pub fn get_signals(&self) -> &SignalBoard {
        &self.signals
    }

    /// Returns the number of executed steps.
    pub fn get_steps(&self) -> i64 {
        self.steps
    }

    /// Returns the simulated time in seconds.
    pub fn sim_time(&self) -> f64 {
        self.steps as f64 * self.config.get_time_step()
    }

    /// Ingests a batch of signal updates. IDs not present in the batch keep
    /// their previous state; IDs unknown to the junction are ignored.
    pub fn apply_signals(&mut self, updates: &[SignalUpdate]) {
        self.signals.apply(updates);
    }

    /// Swaps the junction topology between ticks.
    ///
    /// Vehicles on lanes that survive the swap are retained; vehicles on
    /// removed lanes are discarded. Signal states of surviving lights carry
    /// over, new lights start from their declared initial state.
    pub fn set_junction(&mut self, junction: Arc<Junction>) {
        let mut traffic = LaneTraffic::from_junction(&junction);
        let old_traffic = std::mem::replace(&mut self.traffic, LaneTraffic::new());
        for (lane_id, queue) in old_traffic.into_iter() {
            if let Some(new_queue) = traffic.vehicles_mut(lane_id) {
                *new_queue = queue;
            }
        }

        let mut signals = SignalBoard::from_lights(junction.get_lights());
        let carried: Vec<SignalUpdate> = self
            .signals
            .iter()
            .map(|(id, state)| SignalUpdate {
                light: *id,
                state: state.state,
                in_amber: state.in_amber,
            })
            .collect();
        signals.apply(&carried);

        self.junction = junction;
        self.traffic = traffic;
        self.signals = signals;
    }

    /// Places a caller-provided vehicle (e.g. priority traffic) at the tail
    /// of the given lane.
    pub fn inject_vehicle(&mut self, lane: LaneID, vehicle: Vehicle) -> Result<(), SimulationError> {
        if self.junction.get_lane(lane).is_none() {
            return Err(SimulationError::UnknownLane(lane));
        }
        self.next_vehicle_id = self.next_vehicle_id.max(vehicle.id + 1);
        self.traffic.push(lane, vehicle);
        Ok(())
    }

    /// Advances the junction by one time step.
    ///
    /// Pipeline: kinematic update of every vehicle against the cached signal
    /// states, lane transfers and despawns, Poisson spawning, collision
    /// counting, snapshot capture.
    pub fn step(&mut self) -> Result<ObservationSnapshot, SimulationError> {
        self.steps += 1;
        self.move_vehicles()?;
        self.transfer_vehicles();
        self.despawn_exited();
        self.spawn_arrivals();
        let collisions = count_collisions(
            &self.junction,
            &self.traffic,
            self.config.get_junction_span(),
        );
        if is_verbose_level(VerboseLevel::Additional) {
            verbose_log_with_fields(
                VerboseLevel::Additional,
                EVENT_SIM_STEP,
                "step executed",
                &[
                    ("step", &self.steps),
                    ("vehicles", &self.traffic.total()),
                    ("collisions", &collisions),
                ],
            );
        }
        Ok(self.capture_snapshot(collisions))
    }

    /// Kinematic update of every vehicle, lane by lane, using the signal
    /// state visible at tick start.
    fn move_vehicles(&mut self) -> Result<(), SimulationError> {
        let junction = Arc::clone(&self.junction);
        let time_step = self.config.get_time_step();
        for lane_id in self.traffic.lane_ids() {
            let (_, lane) = junction
                .get_lane(lane_id)
                .ok_or(SimulationError::UnknownLane(lane_id))?;
            let signal_halts = junction
                .get_light_by_origin_lane(lane_id)
                .and_then(|light| self.signals.get(light.get_id()))
                .is_some_and(|signal| signal.halts_traffic());
            let Some(queue) = self.traffic.vehicles_mut(lane_id) else {
                continue;
            };
            let gaps: Vec<f64> = (0..queue.len()).map(|i| gap_ahead(queue, i)).collect();
            for (index, vehicle) in queue.iter_mut().enumerate() {
                advance(vehicle, lane, signal_halts, gaps[index], time_step);
            }
        }
        Ok(())
    }

    /// Moves vehicles that reached the stop line into their destination lanes.
    fn transfer_vehicles(&mut self) {
        let junction = Arc::clone(&self.junction);
        let mut pending: Vec<(LaneID, Vehicle)> = Vec::new();
        for lane_id in self.traffic.lane_ids() {
            let Some(queue) = self.traffic.vehicles_mut(lane_id) else {
                continue;
            };
            let mut index = 0;
            while index < queue.len() {
                let ready = !queue[index].crossed && queue[index].distance <= 0.0;
                if !ready {
                    index += 1;
                    continue;
                }
                let outcome =
                    resolve_transfer(&junction, &self.config, &mut queue[index], &mut self.rng);
                match outcome {
                    TransferOutcome::Stay => {
                        index += 1;
                    }
                    TransferOutcome::Transfer {
                        destination,
                        distance,
                    } => {
                        let mut vehicle = queue.remove(index);
                        if is_verbose_level(VerboseLevel::Detailed) {
                            verbose_log_with_fields(
                                VerboseLevel::Detailed,
                                EVENT_LANE_TRANSFER,
                                "vehicle crossed the junction",
                                &[
                                    ("vehicle", &vehicle.id),
                                    ("from", &lane_id),
                                    ("to", &destination),
                                ],
                            );
                        }
                        vehicle.distance = distance;
                        vehicle.crossed = true;
                        pending.push((destination, vehicle));
                    }
                }
            }
        }
        for (destination, vehicle) in pending {
            self.traffic.push(destination, vehicle);
        }
    }

    /// Destroys vehicles that travelled past the exit threshold.
    fn despawn_exited(&mut self) {
        let exit_threshold = self.config.get_exit_threshold();
        for (_, queue) in &mut self.traffic {
            queue.retain(|vehicle| {
                let keep = vehicle.distance >= -exit_threshold;
                if !keep && is_verbose_level(VerboseLevel::Detailed) {
                    verbose_log_with_fields(
                        VerboseLevel::Detailed,
                        EVENT_VEHICLE_EXIT,
                        "vehicle left the junction",
                        &[("vehicle", &vehicle.id)],
                    );
                }
                keep
            });
        }
    }

    /// Draws Poisson arrivals for every lane with a positive arrival rate.
    fn spawn_arrivals(&mut self) {
        let junction = Arc::clone(&self.junction);
        let time_step = self.config.get_time_step();
        let mut spawned = 0u64;
        for road in junction.get_roads() {
            for lane in road.get_lanes() {
                let rate_per_tick = lane.get_arrival_rate() * time_step;
                let arrivals = draw_arrivals(&mut self.rng, rate_per_tick);
                for _ in 0..arrivals {
                    let vehicle =
                        spawn_vehicle(&junction, lane, self.next_vehicle_id, &mut self.rng);
                    self.next_vehicle_id += 1;
                    self.traffic.push(lane.get_id(), vehicle);
                    spawned += 1;
                }
            }
        }
        if spawned > 0 && is_verbose_level(VerboseLevel::Detailed) {
            verbose_log_with_fields(
                VerboseLevel::Detailed,
                EVENT_SPAWN_VEHICLES,
                "vehicles spawned",
                &[("count", &spawned), ("step", &self.steps)],
            );
        }
    }

    /// Captures the immutable observation snapshot for this step.
    fn capture_snapshot(&self, collisions: u32) -> ObservationSnapshot {
        let lights = self
            .signals
            .iter()
            .map(|(id, signal)| LightObservation {
                id: *id,
                state: signal.state,
                in_amber: signal.in_amber,
            })
            .collect();

        let mut roads = Vec::with_capacity(self.junction.get_roads().len());
        let mut lanes = Vec::new();
        for road in self.junction.get_roads() {
            let mut congestion = 0usize;
            for lane in road.get_lanes() {
                let vehicles: Vec<VehicleObservation> = self
                    .traffic
                    .vehicles(lane.get_id())
                    .map(|queue| {
                        queue
                            .iter()
                            .map(|vehicle| VehicleObservation {
                                id: vehicle.id,
                                distance: vehicle.distance,
                                velocity: vehicle.velocity,
                                kind: vehicle.kind,
                                destination: vehicle.destination_lane,
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                congestion += vehicles.len();
                lanes.push(LaneObservation {
                    id: lane.get_id(),
                    vehicles,
                });
            }
            roads.push(RoadObservation {
                id: road.get_id(),
                congestion,
            });
        }

        ObservationSnapshot {
            junction_id: self.junction.get_id(),
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis(),
            sim_time: self.sim_time(),
            step: self.steps,
            lights,
            roads,
            lanes,
            collisions,
        }
    }
}
