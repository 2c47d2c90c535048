//! Energy-minimization driver.

use super::attrs::DriverAttrs;
use super::Driver;
use crate::error::{DriveError, Result};
use crate::evolver::{Evolver, EvolverKind};
use crate::script::{ScriptBuilder, M0_NAME, MS_NAME};
use crate::system::System;

/// Drives the engine's `Oxs_MinDriver` with a conjugate-gradient evolver.
/// No time integration and no dynamics parameters are involved.
#[derive(Debug, Clone, Default)]
pub struct MinDriver {
    evolver: Option<Evolver>,
    attrs: DriverAttrs,
}

impl MinDriver {
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
        "normalize_aveM_output",
        "report_max_spin_angle",
        "report_wall_time",
    ];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_evolver(mut self, evolver: Evolver) -> Self {
        self.evolver = Some(evolver);
        self
    }

    pub fn with_attrs(mut self, attrs: DriverAttrs) -> Result<Self> {
        attrs.check_allowed("MinDriver", Self::ALLOWED_ATTRIBUTES)?;
        self.attrs = attrs;
        Ok(self)
    }

    fn resolved_evolver(&self) -> Result<Evolver> {
        let evolver = self
            .evolver
            .clone()
            .unwrap_or_else(Evolver::conjugate_gradient);
        if evolver.kind != EvolverKind::ConjugateGradient {
            return Err(DriveError::UnsupportedEvolver(format!(
                "MinDriver requires a ConjugateGradient evolver, got {}",
                evolver.kind.class_name()
            )));
        }
        Ok(evolver)
    }
}

impl Driver for MinDriver {
    fn kind(&self) -> &'static str {
        "MinDriver"
    }

    fn allowed_attributes(&self) -> &'static [&'static str] {
        Self::ALLOWED_ATTRIBUTES
    }

    fn validate(&self, _system: &System) -> Result<()> {
        self.resolved_evolver().map(|_| ())
    }

    fn emit_stage(&self, _system: &System, script: &mut ScriptBuilder) -> Result<()> {
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
