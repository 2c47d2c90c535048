//! Time-integration driver.

use super::attrs::DriverAttrs;
use super::Driver;
use crate::error::{DriveError, Result};
use crate::evolver::Evolver;
use crate::script::{ScriptBuilder, M0_NAME, MS_NAME};
use crate::system::System;

/// Instantaneous quantity computed without advancing the simulation.
///
/// The engine output to schedule is an explicit enumeration; field-like and
/// density-like quantities are captured per step, total energy only lands in
/// the data table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeriveQuantity {
    /// Effective field of the active evolver.
    EffectiveField,

    /// Total energy density over the mesh.
    EnergyDensity,

    /// Total energy (data table only).
    TotalEnergy,
}

impl DeriveQuantity {
    /// Engine output name to schedule per step, if any.
    pub fn schedule_target(&self, evolver_class: &str) -> Option<String> {
        match self {
            DeriveQuantity::EffectiveField => {
                Some(format!("{evolver_class}:evolver:Total field"))
            }
            DeriveQuantity::EnergyDensity => {
                Some("Oxs_TimeDriver::Total energy density".to_string())
            }
            DeriveQuantity::TotalEnergy => None,
        }
    }
}

/// What one time drive should do.
#[derive(Debug, Clone, Copy, PartialEq)]
enum TimeRun {
    /// Integrate for total time `t` over `n` stages.
    Evolve { t: f64, n: i64 },

    /// Compute an instantaneous quantity with a minimal step.
    Derive(DeriveQuantity),
}

/// Minimal simulated time substituted for derive runs.
const DERIVE_T: f64 = 1e-25;

/// Drives the engine's `Oxs_TimeDriver` stage construct.
#[derive(Debug, Clone)]
pub struct TimeDriver {
    run: TimeRun,
    evolver: Option<Evolver>,
    attrs: DriverAttrs,
}

impl TimeDriver {
    /// Attributes a time drive may set, beyond the required options.
    pub const ALLOWED_ATTRIBUTES: &'static [&'static str] = &[
        "evolver",
        "stopping_dm_dt",
        "stage_iteration_limit",
        "total_iteration_limit",
        "stage_count_check",
        "checkpoint_file",
        "checkpoint_interval",
        "checkpoint_disposal",
        "start_iteration",
        "start_stage",
        "start_stage_iteration",
        "start_stage_start_time",
        "start_stage_elapsed_time",
        "start_last_timestep",
        "normalize_aveM_output",
        "report_max_spin_angle",
        "report_wall_time",
    ];

    /// Drive for total simulated time `t` (seconds) over `n` stages.
    pub fn evolve(t: f64, n: i64) -> Self {
        Self {
            run: TimeRun::Evolve { t, n },
            evolver: None,
            attrs: DriverAttrs::new(),
        }
    }

    /// Compute an instantaneous quantity without advancing the simulation.
    pub fn derive(quantity: DeriveQuantity) -> Self {
        Self {
            run: TimeRun::Derive(quantity),
            evolver: None,
            attrs: DriverAttrs::new(),
        }
    }

    /// Use a specific evolver instead of the default Runge-Kutta one.
    pub fn with_evolver(mut self, evolver: Evolver) -> Self {
        self.evolver = Some(evolver);
        self
    }

    /// Attach optional attributes; unknown names are rejected here, before
    /// any value validation.
    pub fn with_attrs(mut self, attrs: DriverAttrs) -> Result<Self> {
        attrs.check_allowed("TimeDriver", Self::ALLOWED_ATTRIBUTES)?;
        self.attrs = attrs;
        Ok(self)
    }

    /// Effective (t, n) for this run.
    fn time_and_stages(&self) -> (f64, i64) {
        match self.run {
            TimeRun::Evolve { t, n } => (t, n),
            TimeRun::Derive(_) => (DERIVE_T, 1),
        }
    }

    /// The evolver actually used for this drive: the configured one or the
    /// Runge-Kutta default, with dynamics parameters pulled from the system.
    /// Missing Precession disables precession; missing Damping zeroes alpha.
    fn resolved_evolver(&self, system: &System) -> Result<Evolver> {
        let mut evolver = self.evolver.clone().unwrap_or_else(Evolver::runge_kutta);
        if !evolver.kind.is_time_evolver() {
            return Err(DriveError::UnsupportedEvolver(format!(
                "TimeDriver requires a RungeKutta or Euler evolver, got {}",
                evolver.kind.class_name()
            )));
        }

        match system.dynamics.gamma() {
            Some(gamma) => evolver.gamma_g = Some(gamma),
            None => evolver.do_precess = Some(false),
        }
        evolver.alpha = Some(system.dynamics.alpha().unwrap_or(0.0));

        Ok(evolver)
    }
}

impl Driver for TimeDriver {
    fn kind(&self) -> &'static str {
        "TimeDriver"
    }

    fn allowed_attributes(&self) -> &'static [&'static str] {
        Self::ALLOWED_ATTRIBUTES
    }

    fn validate(&self, system: &System) -> Result<()> {
        if let TimeRun::Evolve { t, n } = self.run {
            if t <= 0.0 {
                return Err(DriveError::InvalidOption(format!(
                    "positive simulation time expected (t > 0), got t={t}"
                )));
            }
            if n <= 0 {
                return Err(DriveError::InvalidOption(format!(
                    "positive integer number of stages expected (n > 0), got n={n}"
                )));
            }
        }
        self.resolved_evolver(system).map(|_| ())
    }

    fn emit_stage(&self, system: &System, script: &mut ScriptBuilder) -> Result<()> {
        self.resolved_evolver(system)?.emit(script)?;

        let (t, n) = self.time_and_stages();
        let evolver_ref = script.reference("evolver")?;
        let mesh_ref = script.reference("mesh")?;
        let ms_ref = script.reference(MS_NAME)?;
        let m0_ref = script.reference(M0_NAME)?;

        let mut mif = String::from("# TimeDriver\n");
        mif.push_str("Specify Oxs_TimeDriver {\n");
        mif.push_str(&format!("  evolver {evolver_ref}\n"));
        mif.push_str(&format!("  mesh {mesh_ref}\n"));
        mif.push_str(&format!("  Ms {ms_ref}\n"));
        mif.push_str(&format!("  m0 {m0_ref}\n"));
        mif.push_str(&format!("  stopping_time {:?}\n", t / n as f64));
        mif.push_str(&format!("  stage_count {n}\n"));
        if matches!(self.run, TimeRun::Derive(_)) {
            // A single iteration computes the quantity without evolving.
            mif.push_str("  total_iteration_limit 1\n");
            self.attrs.emit(
                Self::ALLOWED_ATTRIBUTES,
                &["evolver", "total_iteration_limit"],
                &mut mif,
            );
        } else {
            self.attrs.emit(Self::ALLOWED_ATTRIBUTES, &["evolver"], &mut mif);
        }
        mif.push_str("}\n\n");
        script.push_raw(&mif);
        Ok(())
    }

    fn emit_schedules(&self, system: &System, script: &mut ScriptBuilder) -> Result<()> {
        match self.run {
            TimeRun::Evolve { .. } => {
                script.push_raw("Schedule DataTable table Stage 1\n");
                script.push_raw("Schedule Oxs_TimeDriver::Magnetization mags Stage 1\n");
            }
            TimeRun::Derive(quantity) => {
                let evolver_class = self.resolved_evolver(system)?.kind.class_name();
                match quantity.schedule_target(evolver_class) {
                    Some(target) => {
                        script.push_raw(&format!("Schedule \"{target}\" archive Step 1\n"));
                    }
                    None => script.push_raw("Schedule DataTable table Stage 1\n"),
                }
            }
        }
        Ok(())
    }

    fn updates_state(&self) -> bool {
        matches!(self.run, TimeRun::Evolve { .. })
    }
}
