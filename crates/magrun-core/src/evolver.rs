//! Evolvers: the engine-side stepping methods and their coupling parameters.

use crate::error::Result;
use crate::script::ScriptBuilder;

/// Supported engine evolver kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvolverKind {
    /// `Oxs_RungeKuttaEvolve`, the default for time integration.
    RungeKutta,

    /// `Oxs_EulerEvolve`.
    Euler,

    /// `Oxs_CGEvolve`, used by energy minimization and hysteresis stages.
    ConjugateGradient,
}

impl EvolverKind {
    /// Engine class name.
    pub fn class_name(&self) -> &'static str {
        match self {
            EvolverKind::RungeKutta => "Oxs_RungeKuttaEvolve",
            EvolverKind::Euler => "Oxs_EulerEvolve",
            EvolverKind::ConjugateGradient => "Oxs_CGEvolve",
        }
    }

    /// Whether this evolver performs time integration.
    pub fn is_time_evolver(&self) -> bool {
        matches!(self, EvolverKind::RungeKutta | EvolverKind::Euler)
    }
}

/// One evolver instance with its dynamics parameters.
///
/// Unset parameters are omitted from the fragment; the engine applies its own
/// defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Evolver {
    pub kind: EvolverKind,
    pub gamma_g: Option<f64>,
    pub alpha: Option<f64>,
    pub do_precess: Option<bool>,
}

impl Evolver {
    pub fn new(kind: EvolverKind) -> Self {
        Self {
            kind,
            gamma_g: None,
            alpha: None,
            do_precess: None,
        }
    }

    pub fn runge_kutta() -> Self {
        Self::new(EvolverKind::RungeKutta)
    }

    pub fn euler() -> Self {
        Self::new(EvolverKind::Euler)
    }

    pub fn conjugate_gradient() -> Self {
        Self::new(EvolverKind::ConjugateGradient)
    }

    /// Emit the evolver fragment, defining the `evolver` name.
    pub fn emit(&self, script: &mut ScriptBuilder) -> Result<()> {
        let class = self.kind.class_name();
        let mut mif = format!("# {class}\n");
        mif.push_str(&format!("Specify {class}:evolver {{\n"));
        if let Some(do_precess) = self.do_precess {
            mif.push_str(&format!("  do_precess {}\n", if do_precess { 1 } else { 0 }));
        }
        if let Some(gamma_g) = self.gamma_g {
            mif.push_str(&format!("  gamma_G {gamma_g:?}\n"));
        }
        if let Some(alpha) = self.alpha {
            mif.push_str(&format!("  alpha {alpha:?}\n"));
        }
        mif.push_str("}\n\n");
        script.define("evolver", &mif);
        Ok(())
    }
}
