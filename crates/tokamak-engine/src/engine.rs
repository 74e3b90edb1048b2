// ─────────────────────────────────────────────────────────────────────
// SCPN Plant Balance — Relaxation Engine
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Worker thread, run lifecycle and the foreground simulator handle.
//!
//! Run contract:
//! - a parameter message starts a run from the cold seeds;
//! - the worker checks for newer parameters only between iterations,
//!   draining the channel to the latest message, so a restart is atomic
//!   at an iteration boundary and no run ever mixes two parameter sets;
//! - each iteration publishes one complete snapshot copy;
//! - a run ends when the iteration budget is exhausted or the
//!   convergence policy fires, then the worker goes idle.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tokamak_physics::balance::{self, BalanceParams};
use tokamak_physics::design::DesignPoint;
use tokamak_physics::geometry::map_geometry;
use tokamak_physics::impurity::{ImpurityDerived, ImpurityMix};
use tokamak_types::config::{DesignOverrides, EnvelopeKind, PlantConfig, PlantEnvelope};
use tokamak_types::error::{TokamakError, TokamakResult};
use tokamak_types::state::{
    Geometry, OperatingInputs, OperatingLevels, RunOutcome, RunState, ShapeLevels, Snapshot,
};

/// When a run counts as finished before its budget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConvergencePolicy {
    /// Always run the full budget.
    FixedBudget,
    /// Stop once the stored energy drifts less than `epsilon`
    /// (relative) across the last `window` iterations.
    RelativeChange { epsilon: f64, window: usize },
}

/// Engine run parameters. The 300-iteration budget and 100 ms pacing
/// reproduce the control-room cadence; tests shrink both.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub budget: u32,
    pub pacing: Duration,
    pub policy: ConvergencePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            budget: 300,
            pacing: Duration::from_millis(100),
            policy: ConvergencePolicy::FixedBudget,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> TokamakResult<()> {
        if self.budget == 0 {
            return Err(TokamakError::Engine(
                "iteration budget must be at least 1".to_string(),
            ));
        }
        if let ConvergencePolicy::RelativeChange { epsilon, window } = self.policy {
            if !(epsilon > 0.0) || window < 2 {
                return Err(TokamakError::Engine(format!(
                    "convergence policy needs epsilon > 0 and window >= 2, got {epsilon}/{window}"
                )));
            }
        }
        Ok(())
    }
}

pub type SnapshotCallback = Box<dyn Fn(Snapshot) + Send>;
pub type StateCallback = Box<dyn Fn(RunState) + Send>;

/// Observables shared between worker and foreground. Snapshots and
/// states are written whole under the lock; readers copy them out.
struct Shared {
    snapshot: Mutex<Option<Snapshot>>,
    state: Mutex<RunState>,
    outcome: Mutex<Option<RunOutcome>>,
}

impl Shared {
    fn new() -> Self {
        Shared {
            snapshot: Mutex::new(None),
            state: Mutex::new(RunState::Idle),
            outcome: Mutex::new(None),
        }
    }
}

/// Foreground handle: owns the configuration, the cached geometry and
/// design point, and the worker thread once started.
///
/// Setters take effect immediately on the cached design values and,
/// once the worker is started, begin a fresh run: immediately when
/// idle, at the next iteration boundary when one is in flight.
pub struct PlantSimulator {
    config: PlantConfig,
    engine: EngineConfig,
    shape: ShapeLevels,
    operating: OperatingLevels,
    mix: ImpurityMix,
    geometry: Geometry,
    design: DesignPoint,
    shared: Arc<Shared>,
    tx: Option<Sender<BalanceParams>>,
    worker: Option<JoinHandle<()>>,
    snapshot_cb: Option<SnapshotCallback>,
    state_cb: Option<StateCallback>,
}

impl PlantSimulator {
    pub fn new(config: PlantConfig) -> TokamakResult<Self> {
        config.validate()?;
        let shape = ShapeLevels::centered();
        let operating = OperatingLevels::default();
        let mix = ImpurityMix::reference_for_density(config.assumptions.n20);
        let mut sim = PlantSimulator {
            config,
            engine: EngineConfig::default(),
            shape,
            operating,
            mix,
            geometry: map_geometry(shape, &config.envelope),
            design: DesignPoint::quiescent(),
            shared: Arc::new(Shared::new()),
            tx: None,
            worker: None,
            snapshot_cb: None,
            state_cb: None,
        };
        sim.refresh();
        Ok(sim)
    }

    pub fn preset(kind: EnvelopeKind) -> Self {
        // Presets always validate.
        PlantSimulator::new(PlantConfig::preset(kind)).unwrap_or_else(|_| unreachable!())
    }

    pub fn with_engine_config(mut self, engine: EngineConfig) -> TokamakResult<Self> {
        engine.validate()?;
        self.engine = engine;
        Ok(self)
    }

    /// Called from the worker thread after each published snapshot.
    pub fn with_snapshot_callback<F: Fn(Snapshot) + Send + 'static>(mut self, f: F) -> Self {
        self.snapshot_cb = Some(Box::new(f));
        self
    }

    /// Called from the worker thread on each run-state transition.
    pub fn with_state_callback<F: Fn(RunState) + Send + 'static>(mut self, f: F) -> Self {
        self.state_cb = Some(Box::new(f));
        self
    }

    /// Spawn the worker thread. Must be called once before `run`.
    pub fn start(&mut self) -> TokamakResult<()> {
        if self.worker.is_some() {
            return Err(TokamakError::Engine("engine already started".to_string()));
        }
        let (tx, rx) = mpsc::channel();
        let shared = Arc::clone(&self.shared);
        let engine = self.engine;
        let snapshot_cb = self.snapshot_cb.take();
        let state_cb = self.state_cb.take();
        let handle = thread::Builder::new()
            .name("tokamak-balance".to_string())
            .spawn(move || worker_loop(rx, shared, engine, snapshot_cb, state_cb))
            .map_err(|e| TokamakError::Engine(format!("failed to spawn worker: {e}")))?;
        self.tx = Some(tx);
        self.worker = Some(handle);
        Ok(())
    }

    /// Begin a relaxation run with the current settings, restarting any
    /// run in flight.
    pub fn run(&self) -> TokamakResult<()> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| TokamakError::Engine("engine not started".to_string()))?;
        tx.send(self.balance_params())
            .map_err(|_| TokamakError::Engine("worker thread is gone".to_string()))
    }

    pub fn set_shape_levels(&mut self, levels: ShapeLevels) -> TokamakResult<()> {
        levels.validate()?;
        self.shape = levels;
        self.refresh();
        self.resend_if_started()
    }

    pub fn set_operating_levels(&mut self, levels: OperatingLevels) -> TokamakResult<()> {
        levels.validate()?;
        self.operating = levels;
        self.refresh();
        self.resend_if_started()
    }

    pub fn set_impurity_mix(&mut self, mix: ImpurityMix) -> TokamakResult<()> {
        mix.validate()?;
        self.mix = mix.rounded();
        self.refresh();
        self.resend_if_started()
    }

    /// Swap the plant envelope preset, carrying over the confinement
    /// and beta-limit tuning of the current envelope.
    pub fn set_envelope(&mut self, kind: EnvelopeKind) -> TokamakResult<()> {
        let current = self.config.envelope;
        self.config.envelope = PlantEnvelope {
            h_mult: current.h_mult,
            troy_c: current.troy_c,
            ..PlantEnvelope::preset(kind)
        };
        self.config.validate()?;
        self.refresh();
        self.resend_if_started()
    }

    pub fn set_design_overrides(&mut self, overrides: DesignOverrides) -> TokamakResult<()> {
        self.config.apply_overrides(overrides)?;
        self.refresh();
        self.resend_if_started()
    }

    pub fn config(&self) -> &PlantConfig {
        &self.config
    }

    pub fn shape_levels(&self) -> ShapeLevels {
        self.shape
    }

    pub fn operating_levels(&self) -> OperatingLevels {
        self.operating
    }

    pub fn operating_inputs(&self) -> OperatingInputs {
        self.config
            .ranges
            .resolve(self.operating, &self.config.envelope)
    }

    pub fn impurity_mix(&self) -> ImpurityMix {
        self.mix
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn design_point(&self) -> DesignPoint {
        self.design
    }

    /// Latest published snapshot, if any run has produced one.
    pub fn snapshot(&self) -> Option<Snapshot> {
        *self.shared.snapshot.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn run_state(&self) -> RunState {
        *self.shared.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn last_outcome(&self) -> Option<RunOutcome> {
        *self.shared.outcome.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn derived_mix(&self) -> ImpurityDerived {
        self.mix.derived()
    }

    fn refresh(&mut self) {
        self.geometry = map_geometry(self.shape, &self.config.envelope);
        let inputs = self.operating_inputs();
        self.design = DesignPoint::compute(
            &self.geometry,
            &self.config.envelope,
            &self.config.assumptions,
            &self.derived_mix(),
            inputs.p_in_mw,
        );
    }

    fn balance_params(&self) -> BalanceParams {
        BalanceParams::new(
            self.geometry,
            &self.design,
            self.operating_inputs(),
            self.derived_mix(),
            &self.config.envelope,
            &self.config.assumptions,
        )
    }

    // A parameter change while idle starts a run immediately; while
    // running it restarts at the next iteration boundary. Either way
    // exactly one run is active once the change settles.
    fn resend_if_started(&self) -> TokamakResult<()> {
        if self.tx.is_some() {
            self.run()?;
        }
        Ok(())
    }
}

impl Drop for PlantSimulator {
    fn drop(&mut self) {
        // Closing the channel wakes the worker; it exits at the next
        // iteration boundary.
        drop(self.tx.take());
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

fn worker_loop(
    rx: Receiver<BalanceParams>,
    shared: Arc<Shared>,
    engine: EngineConfig,
    snapshot_cb: Option<SnapshotCallback>,
    state_cb: Option<StateCallback>,
) {
    let set_state = |state: RunState| {
        *shared.state.lock().unwrap_or_else(|e| e.into_inner()) = state;
        if let Some(cb) = &state_cb {
            cb(state);
        }
    };
    let publish = |snap: Snapshot| {
        *shared.snapshot.lock().unwrap_or_else(|e| e.into_inner()) = Some(snap);
        if let Some(cb) = &snapshot_cb {
            cb(snap);
        }
    };

    'idle: loop {
        let Ok(mut params) = rx.recv() else {
            break;
        };
        'run: loop {
            // Only the most recent parameters matter.
            while let Ok(newer) = rx.try_recv() {
                params = newer;
            }
            set_state(RunState::Running);

            let mut snap = balance::seed(&params);
            let mut window = ConvergenceWindow::new(engine.policy);
            let mut outcome = RunOutcome::BudgetExhausted;

            while snap.iteration < engine.budget {
                thread::sleep(engine.pacing);
                match rx.try_recv() {
                    Ok(newer) => {
                        params = newer;
                        continue 'run;
                    }
                    Err(TryRecvError::Empty) => {}
                    Err(TryRecvError::Disconnected) => {
                        set_state(RunState::Idle);
                        return;
                    }
                }
                snap = balance::step(&snap, &params);
                publish(snap);
                if window.push(snap.w_mj) {
                    outcome = RunOutcome::Converged;
                    break;
                }
            }

            *shared.outcome.lock().unwrap_or_else(|e| e.into_inner()) = Some(outcome);
            set_state(RunState::Exhausted);
            set_state(RunState::Idle);
            continue 'idle;
        }
    }
}

/// Trailing window for the relative-change convergence test.
struct ConvergenceWindow {
    policy: ConvergencePolicy,
    recent: Vec<f64>,
}

impl ConvergenceWindow {
    fn new(policy: ConvergencePolicy) -> Self {
        ConvergenceWindow {
            policy,
            recent: Vec::new(),
        }
    }

    /// Returns true once the window is full and the relative spread of
    /// the tracked value is below epsilon.
    fn push(&mut self, value: f64) -> bool {
        let ConvergencePolicy::RelativeChange { epsilon, window } = self.policy else {
            return false;
        };
        self.recent.push(value);
        if self.recent.len() > window {
            self.recent.remove(0);
        }
        if self.recent.len() < window {
            return false;
        }
        let max = self.recent.iter().cloned().fold(f64::MIN, f64::max);
        let min = self.recent.iter().cloned().fold(f64::MAX, f64::min);
        max.is_finite() && max > 0.0 && (max - min) / max < epsilon
    }
}
