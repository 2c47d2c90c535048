//! The magnetic system under study.

use crate::dynamics::Dynamics;
use crate::energy::EnergyTerm;
use crate::error::{DriveError, Result};
use crate::field::Field;
use crate::script::ScriptBuilder;
use crate::table::DataTable;

/// In-memory model of one magnetic system.
///
/// The `name` doubles as the namespace for output files, so it must be a
/// plain path component. `drive_number` counts completed drives; it starts at
/// zero and is advanced only by the run coordinator after a fully successful
/// drive. At most one drive can be in flight per system: `drive()` takes the
/// system by exclusive borrow, which the borrow checker enforces statically.
#[derive(Debug, Clone)]
pub struct System {
    pub name: String,
    pub m: Field,
    pub energy: Vec<EnergyTerm>,
    pub dynamics: Dynamics,
    pub dt: Option<DataTable>,
    pub drive_number: u32,
}

impl System {
    /// Create a system with the given name and initial magnetisation.
    pub fn new(name: impl Into<String>, m: Field) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(DriveError::InvalidOption(
                "system name must not be empty".to_string(),
            ));
        }
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(DriveError::InvalidOption(format!(
                "system name '{name}' is not a valid path component"
            )));
        }
        Ok(Self {
            name,
            m,
            energy: Vec::new(),
            dynamics: Dynamics::new(),
            dt: None,
            drive_number: 0,
        })
    }

    /// Add an energy term.
    pub fn with_energy(mut self, term: EnergyTerm) -> Self {
        self.energy.push(term);
        self
    }

    /// Add a dynamics term; duplicate kinds are rejected.
    pub fn with_dynamics(mut self, term: crate::dynamics::DynamicsTerm) -> Result<Self> {
        self.dynamics.add(term)?;
        Ok(self)
    }

    /// Emit the system section of the script: mesh geometry followed by all
    /// energy terms. Defines the `atlas` and `mesh` names.
    pub fn emit(&self, script: &mut ScriptBuilder) {
        script.push_raw(&self.m.mesh.script());
        script.declare("atlas");
        script.declare("mesh");
        for term in &self.energy {
            script.push_raw(&term.script());
        }
    }
}
