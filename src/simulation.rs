use crate::config::Parameters;
use crate::diagnostics;
use crate::error::Error;
use crate::geometry::Point;
use crate::init;
use crate::integrator;
use crate::mesh::Mesh;
use crate::restart::Snapshot;
use crate::sink::SnapshotSink;
use log::{debug, info, warn};

/// Lifecycle of a run. The phase only ever moves forward; `Done` is
/// terminal and nothing mutates after it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Loaded,
    Initialised,
    Running,
    Finalising,
    Done,
}

/// The orchestrator: owns the frozen mesh, the double-buffered
/// concentration column, and the snapshot sinks, and drives the integrator
/// across the configured time window. Every step performs the integrator
/// write, then the diagnostic, then the sink fan-out, in that order.
pub struct Simulation {
    mesh: Mesh,
    parameters: Parameters,
    dt: f64,
    oil: Vec<f64>,
    scratch: Vec<f64>,
    sinks: Vec<Box<dyn SnapshotSink>>,
    phase: Phase,
    step: u64,
}

impl Simulation {
    pub fn new(mesh: Mesh, parameters: Parameters) -> Self {
        let n = mesh.num_triangles();
        let dt = (parameters.t_end - parameters.t_start) / parameters.n_steps as f64;

        Self {
            mesh,
            parameters,
            dt,
            oil: vec![0.0; n],
            scratch: vec![0.0; n],
            sinks: Vec::new(),
            phase: Phase::Loaded,
            step: 0,
        }
    }

    pub fn add_sink(&mut self, sink: Box<dyn SnapshotSink>) {
        self.sinks.push(sink);
    }

    /// Seed a fresh spill centred on the given point.
    pub fn seed_spill(&mut self, center: Point) {
        assert_eq!(self.phase, Phase::Loaded, "a simulation is seeded exactly once");
        self.oil = init::gaussian(&self.mesh, center);
        self.phase = Phase::Initialised;
        info!("seeded oil spill at ({}, {})", center.x, center.y);
    }

    /// Seed from a solution checkpoint written by an earlier run.
    pub fn seed_from_snapshot(&mut self, snapshot: &Snapshot) -> Result<(), Error> {
        assert_eq!(self.phase, Phase::Loaded, "a simulation is seeded exactly once");
        self.oil = init::from_snapshot(&self.mesh, snapshot, self.parameters.t_start)?;
        self.phase = Phase::Initialised;
        info!("restarted from checkpoint at t = {}", self.parameters.t_start);
        Ok(())
    }

    /// Drive the integrator over the whole time window, fanning snapshots
    /// out at policy-selected steps and once more after the final step.
    pub fn run(&mut self) -> Result<(), Error> {
        assert_eq!(self.phase, Phase::Initialised, "run requires a seeded simulation");
        self.phase = Phase::Running;
        info!(
            "running {} steps from t = {} to t = {}, dt = {}",
            self.parameters.n_steps, self.parameters.t_start, self.parameters.t_end, self.dt
        );

        let mut oil_in_grounds = self.diagnostic();
        if self.wants_snapshot(0) {
            self.fan_out(0, self.parameters.t_start, oil_in_grounds, false);
        }

        for step in 1..=self.parameters.n_steps {
            integrator::advance(&self.mesh, &self.oil, &mut self.scratch, self.dt);
            integrator::validate(&self.mesh, &self.scratch, step)?;
            std::mem::swap(&mut self.oil, &mut self.scratch);
            self.step = step;

            oil_in_grounds = self.diagnostic();
            debug!(
                "t = {:.4} | oil in fishing grounds = {:.6}",
                self.time(),
                oil_in_grounds
            );

            if self.wants_snapshot(step) {
                self.fan_out(step, self.time(), oil_in_grounds, false);
            }
        }

        self.phase = Phase::Finalising;
        self.fan_out(self.step, self.time(), oil_in_grounds, true);
        self.phase = Phase::Done;
        info!(
            "run complete: {} steps, {} in the fishing grounds",
            self.parameters.n_steps, oil_in_grounds
        );
        Ok(())
    }

    /// The current concentration column, one value per triangle.
    pub fn oil(&self) -> &[f64] {
        &self.oil
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Simulation time after the steps taken so far.
    pub fn time(&self) -> f64 {
        self.parameters.t_start + self.step as f64 * self.dt
    }

    /// Oil mass currently inside the fishing grounds.
    pub fn diagnostic(&self) -> f64 {
        diagnostics::oil_in_region(&self.mesh, &self.oil, &self.parameters.fishing_grounds)
    }

    fn wants_snapshot(&self, step: u64) -> bool {
        match self.parameters.write_frequency {
            Some(k) => step == 0 || step == self.parameters.n_steps || step % k == 0,
            None => false,
        }
    }

    fn fan_out(&mut self, step: u64, time: f64, oil_in_grounds: f64, final_call: bool) {
        for sink in &mut self.sinks {
            let result = if final_call {
                sink.on_final(step, time, &self.oil, oil_in_grounds)
            } else {
                sink.on_step(step, time, &self.oil, oil_in_grounds)
            };
            if let Err(e) = result {
                warn!("snapshot sink failed at step {}: {}", step, e);
            }
        }
    }
}
