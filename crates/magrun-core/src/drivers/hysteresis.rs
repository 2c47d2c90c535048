//! Hysteresis driver: stepped external field with per-stage minimization.

use super::attrs::DriverAttrs;
use super::Driver;
use crate::error::{DriveError, Result};
use crate::evolver::{Evolver, EvolverKind};
use crate::script::{ScriptBuilder, M0_NAME, MS_NAME};
use crate::system::System;

/// One leg of a piecewise field path.
///
/// `n` is the number of field points along the leg; the engine counts
/// sub-intervals, so a valid leg needs `n > 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepStep {
    pub h_start: Vec<f64>,
    pub h_end: Vec<f64>,
    pub n: i64,
}

impl SweepStep {
    pub fn new(h_start: Vec<f64>, h_end: Vec<f64>, n: i64) -> Self {
        Self { h_start, h_end, n }
    }

    fn check(&self) -> Result<()> {
        for (label, h) in [("Hstart", &self.h_start), ("Hend", &self.h_end)] {
            if h.len() != 3 {
                return Err(DriveError::InvalidOption(format!(
                    "{label} must have 3 components, got {}",
                    h.len()
                )));
            }
        }
        if self.n <= 1 {
            return Err(DriveError::InvalidOption(format!(
                "field step count must satisfy n > 1 (the engine counts sub-intervals), got n={}",
                self.n
            )));
        }
        Ok(())
    }
}

/// Drives a hysteresis sweep: a stepped `Oxs_UZeeman` plus `Oxs_MinDriver`.
///
/// Configure either a symmetric loop (`hmin`/`hmax`/`n`, swept forward and
/// back) or an explicit list of sweep steps, never both.
#[derive(Debug, Clone, Default)]
pub struct HysteresisDriver {
    hmin: Option<Vec<f64>>,
    hmax: Option<Vec<f64>>,
    n: Option<i64>,
    hsteps: Option<Vec<SweepStep>>,
    evolver: Option<Evolver>,
    attrs: DriverAttrs,
}

impl HysteresisDriver {
    pub const ALLOWED_ATTRIBUTES: &'static [&'static str] = &[
        "evolver",
        "stopping_mxHxm",
        "stage_iteration_limit",
        "total_iteration_limit",
        "stage_count",
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

    pub fn new() -> Self {
        Self::default()
    }

    /// Symmetric loop from `hmin` to `hmax` and back, `n` points per leg.
    pub fn symmetric(hmin: Vec<f64>, hmax: Vec<f64>, n: i64) -> Self {
        Self {
            hmin: Some(hmin),
            hmax: Some(hmax),
            n: Some(n),
            ..Self::default()
        }
    }

    /// Explicit piecewise field path.
    pub fn stepped(hsteps: Vec<SweepStep>) -> Self {
        Self {
            hsteps: Some(hsteps),
            ..Self::default()
        }
    }

    pub fn with_evolver(mut self, evolver: Evolver) -> Self {
        self.evolver = Some(evolver);
        self
    }

    pub fn with_attrs(mut self, attrs: DriverAttrs) -> Result<Self> {
        attrs.check_allowed("HysteresisDriver", Self::ALLOWED_ATTRIBUTES)?;
        self.attrs = attrs;
        Ok(self)
    }

    /// Resolve the configured options into the ordered sweep legs.
    fn steps(&self) -> Result<Vec<SweepStep>> {
        let symmetric_given =
            self.hmin.is_some() || self.hmax.is_some() || self.n.is_some();

        if symmetric_given && self.hsteps.is_some() {
            return Err(DriveError::InvalidOption(
                "cannot define both (Hmin, Hmax, n) and Hsteps".to_string(),
            ));
        }

        let steps = if symmetric_given {
            let hmin = self
                .hmin
                .clone()
                .ok_or_else(|| DriveError::MissingOption("Hmin".to_string()))?;
            let hmax = self
                .hmax
                .clone()
                .ok_or_else(|| DriveError::MissingOption("Hmax".to_string()))?;
            let n = self
                .n
                .ok_or_else(|| DriveError::MissingOption("n".to_string()))?;
            vec![
                SweepStep::new(hmin.clone(), hmax.clone(), n),
                SweepStep::new(hmax, hmin, n),
            ]
        } else if let Some(hsteps) = &self.hsteps {
            hsteps.clone()
        } else {
            return Err(DriveError::MissingOption(
                "(Hmin, Hmax, n) or Hsteps must be defined".to_string(),
            ));
        };

        for step in &steps {
            step.check()?;
        }
        Ok(steps)
    }

    fn resolved_evolver(&self) -> Result<Evolver> {
        let evolver = self
            .evolver
            .clone()
            .unwrap_or_else(Evolver::conjugate_gradient);
        if evolver.kind != EvolverKind::ConjugateGradient {
            return Err(DriveError::UnsupportedEvolver(format!(
                "HysteresisDriver requires a ConjugateGradient evolver, got {}",
                evolver.kind.class_name()
            )));
        }
        Ok(evolver)
    }
}

impl Driver for HysteresisDriver {
    fn kind(&self) -> &'static str {
        "HysteresisDriver"
    }

    fn allowed_attributes(&self) -> &'static [&'static str] {
        Self::ALLOWED_ATTRIBUTES
    }

    fn validate(&self, _system: &System) -> Result<()> {
        self.steps()?;
        self.resolved_evolver().map(|_| ())
    }

    fn emit_stage(&self, _system: &System, script: &mut ScriptBuilder) -> Result<()> {
        let steps = self.steps()?;

        // Stepped external field. One Hrange row per leg; the engine counts
        // sub-intervals, hence n - 1.
        let mut mif = String::from("# UZeeman (hysteresis sweep)\n");
        mif.push_str("Specify Oxs_UZeeman {\n");
        mif.push_str("  Hrange {\n");
        for step in &steps {
            mif.push_str(&format!(
                "    {{{} {} {} {} {} {} {}}}\n",
                step.h_start[0],
                step.h_start[1],
                step.h_start[2],
                step.h_end[0],
                step.h_end[1],
                step.h_end[2],
                step.n - 1
            ));
        }
        mif.push_str("  }\n");
        mif.push_str("}\n\n");
        script.push_raw(&mif);

        self.resolved_evolver()?.emit(script)?;

        let evolver_ref = script.reference("evolver")?;
        let mesh_ref = script.reference("mesh")?;
        let ms_ref = script.reference(MS_NAME)?;
        let m0_ref = script.reference(M0_NAME)?;

        let mut mif = String::from("# MinDriver\n");
        mif.push_str("Specify Oxs_MinDriver {\n");
        mif.push_str(&format!("  evolver {evolver_ref}\n"));
        mif.push_str(&format!("  mesh {mesh_ref}\n"));
        mif.push_str(&format!("  Ms {ms_ref}\n"));
        mif.push_str(&format!("  m0 {m0_ref}\n"));
        self.attrs.emit(Self::ALLOWED_ATTRIBUTES, &["evolver"], &mut mif);
        mif.push_str("}\n\n");
        script.push_raw(&mif);
        Ok(())
    }

    fn emit_schedules(&self, _system: &System, script: &mut ScriptBuilder) -> Result<()> {
        script.push_raw("Schedule DataTable table Stage 1\n");
        script.push_raw("Schedule Oxs_MinDriver::Magnetization mags Stage 1\n");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::sample_system;
    use super::*;
    use crate::drivers::generate_script;
    use crate::error::ErrorKind;

    fn hmin() -> Vec<f64> {
        vec![0.0, 0.0, -1e6]
    }

    fn hmax() -> Vec<f64> {
        vec![0.0, 0.0, 1e6]
    }

    #[test]
    fn test_symmetric_sweep_emits_forward_and_back() {
        let system = sample_system();
        let driver = HysteresisDriver::symmetric(hmin(), hmax(), 20);
        let mif = generate_script(&system, &driver).unwrap();
        assert!(mif.contains("Specify Oxs_UZeeman {"));
        assert!(mif.contains("{0 0 -1000000 0 0 1000000 19}"));
        assert!(mif.contains("{0 0 1000000 0 0 -1000000 19}"));
        assert!(mif.contains("Specify Oxs_MinDriver {"));
        assert!(mif.contains("Oxs_CGEvolve:evolver"));
    }

    #[test]
    fn test_both_forms_rejected() {
        let driver = HysteresisDriver {
            hmin: Some(hmin()),
            hmax: Some(hmax()),
            n: Some(10),
            hsteps: Some(vec![SweepStep::new(hmin(), hmax(), 10)]),
            ..HysteresisDriver::default()
        };
        let err = driver.validate(&sample_system()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_neither_form_rejected() {
        let err = HysteresisDriver::new()
            .validate(&sample_system())
            .unwrap_err();
        assert!(matches!(err, DriveError::MissingOption(_)));
    }

    #[test]
    fn test_partial_symmetric_form_rejected() {
        let driver = HysteresisDriver {
            hmin: Some(hmin()),
            n: Some(10),
            ..HysteresisDriver::default()
        };
        let err = driver.validate(&sample_system()).unwrap_err();
        assert!(matches!(err, DriveError::MissingOption(name) if name == "Hmax"));
    }

    #[test]
    fn test_single_point_leg_rejected() {
        let driver = HysteresisDriver::stepped(vec![SweepStep::new(hmin(), hmax(), 1)]);
        let err = driver.validate(&sample_system()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_two_component_vector_rejected() {
        let driver = HysteresisDriver::stepped(vec![SweepStep::new(
            vec![0.0, -1e6],
            hmax(),
            10,
        )]);
        let err = driver.validate(&sample_system()).unwrap_err();
        assert!(matches!(err, DriveError::InvalidOption(msg) if msg.contains("Hstart")));
    }

    #[test]
    fn test_stepped_path_preserves_order() {
        let system = sample_system();
        let driver = HysteresisDriver::stepped(vec![
            SweepStep::new(vec![0.0, 0.0, 0.0], hmax(), 5),
            SweepStep::new(hmax(), hmin(), 11),
        ]);
        let mif = generate_script(&system, &driver).unwrap();
        let first = mif.find("{0 0 0 0 0 1000000 4}").unwrap();
        let second = mif.find("{0 0 1000000 0 0 -1000000 10}").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_time_evolver_rejected() {
        let driver = HysteresisDriver::symmetric(hmin(), hmax(), 10)
            .with_evolver(Evolver::runge_kutta());
        let err = driver.validate(&sample_system()).unwrap_err();
        assert!(matches!(err, DriveError::UnsupportedEvolver(_)));
    }

    #[test]
    fn test_unknown_attribute_rejected() {
        let err = HysteresisDriver::symmetric(hmin(), hmax(), 10)
            .with_attrs(DriverAttrs::new().set("myarg", 1i64))
            .unwrap_err();
        assert!(matches!(
            err,
            DriveError::UnknownAttribute { driver: "HysteresisDriver", .. }
        ));
    }

    #[test]
    fn test_stopping_criterion_attribute_emitted() {
        let system = sample_system();
        let driver = HysteresisDriver::symmetric(hmin(), hmax(), 10)
            .with_attrs(DriverAttrs::new().set("stopping_mxHxm", 0.01))
            .unwrap();
        let mif = generate_script(&system, &driver).unwrap();
        assert!(mif.contains("stopping_mxHxm 0.01"));
    }
}
