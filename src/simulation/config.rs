/// Configuration of the microscopic simulator.
///
/// The defaults match an interactive run at 30 frames per second; headless
/// batch runs typically pass a millisecond time step instead. All geometric
/// knobs derive from a single `lane_width` so the operator can recalibrate
/// the junction footprint without code changes.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Fixed time step Δt in seconds.
    time_step: f64,
    /// Width of a single lane, in distance units.
    lane_width: f64,
    /// A vehicle is destroyed once its stop-line distance falls below
    /// `-exit_threshold`.
    exit_threshold: f64,
    /// Vehicles within `junction_span` past the stop line participate in
    /// collision detection.
    junction_span: f64,
    /// RNG seed. `None` seeds from the operating system.
    seed: Option<u64>,
}

impl SimulationConfig {
    /// Creates a new `SimulationConfigBuilder` with default values.
    ///
    /// # Example
    /// ```
    /// use junction_sim_core::simulation::config::SimulationConfig;
    /// let config = SimulationConfig::new()
    ///     .with_time_step(0.001)
    ///     .with_seed(7)
    ///     .build();
    /// assert_eq!(config.get_time_step(), 0.001);
    /// ```
    pub fn new() -> SimulationConfigBuilder {
        SimulationConfigBuilder {
            config: SimulationConfig {
                time_step: 1.0 / 30.0,
                lane_width: 50.0,
                exit_threshold: 400.0,
                junction_span: 400.0,
                seed: None,
            },
        }
    }

    /// Returns the fixed time step Δt in seconds.
    pub fn get_time_step(&self) -> f64 {
        self.time_step
    }

    /// Returns the width of a single lane.
    pub fn get_lane_width(&self) -> f64 {
        self.lane_width
    }

    /// Returns the exit threshold.
    pub fn get_exit_threshold(&self) -> f64 {
        self.exit_threshold
    }

    /// Returns the collision-detection span past the stop line.
    pub fn get_junction_span(&self) -> f64 {
        self.junction_span
    }

    /// Returns the RNG seed, if pinned.
    pub fn get_seed(&self) -> Option<u64> {
        self.seed
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig::new().build()
    }
}

/// A builder for constructing `SimulationConfig` instances.
pub struct SimulationConfigBuilder {
    config: SimulationConfig,
}

impl SimulationConfigBuilder {
    /// Sets the fixed time step Δt in seconds.
    pub fn with_time_step(mut self, time_step: f64) -> Self {
        self.config.time_step = time_step;
        self
    }

    /// Sets the lane width.
    pub fn with_lane_width(mut self, lane_width: f64) -> Self {
        self.config.lane_width = lane_width;
        self
    }

    /// Sets the exit threshold.
    pub fn with_exit_threshold(mut self, exit_threshold: f64) -> Self {
        self.config.exit_threshold = exit_threshold;
        self
    }

    /// Sets the collision-detection span.
    pub fn with_junction_span(mut self, junction_span: f64) -> Self {
        self.config.junction_span = junction_span;
        self
    }

    /// Pins the RNG seed for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Builds and returns the final `SimulationConfig` instance.
    pub fn build(self) -> SimulationConfig {
        self.config
    }
}
