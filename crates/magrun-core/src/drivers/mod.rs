//! Driver variants and full-script generation.
//!
//! Each variant validates its option set against the system, then contributes
//! the evolver and stage-driver fragments of the script. The document
//! sections have a fixed order because the engine resolves named references
//! only against earlier definitions.

mod attrs;
mod hysteresis;
mod min;
mod time;

pub use attrs::{AttrValue, DriverAttrs};
pub use hysteresis::{HysteresisDriver, SweepStep};
pub use min::MinDriver;
pub use time::{DeriveQuantity, TimeDriver};

use crate::error::Result;
use crate::script::{setup_m0, ScriptBuilder};
use crate::system::System;

/// Fixed output-destination declarations, emitted after the stage driver.
pub const DESTINATIONS: &str = "\
Destination table mmArchive
Destination mags mmArchive
Destination archive mmArchive

";

/// One stage-driver variant.
///
/// `allowed_attributes` is part of the public contract: tests enumerate it to
/// validate additions, and attribute rejection happens against it before any
/// other validation.
pub trait Driver {
    /// Variant type name, recorded in the run metadata.
    fn kind(&self) -> &'static str;

    /// The variant's attribute allow-list.
    fn allowed_attributes(&self) -> &'static [&'static str];

    /// Validate the option set against the system. Runs before any
    /// filesystem or process side effect.
    fn validate(&self, system: &System) -> Result<()>;

    /// Emit the evolver and stage-driver fragments.
    fn emit_stage(&self, system: &System, script: &mut ScriptBuilder) -> Result<()>;

    /// Emit the scheduling directives.
    fn emit_schedules(&self, system: &System, script: &mut ScriptBuilder) -> Result<()>;

    /// Whether results are re-imported into the system after the run.
    /// Derive-only drives leave the system state untouched.
    fn updates_state(&self) -> bool {
        true
    }
}

/// Assemble the complete script document for one drive.
///
/// Order: header, system fragment (geometry + energy terms), initial
/// magnetisation setup, evolver, stage driver, destinations, schedules.
pub fn generate_script(system: &System, driver: &dyn Driver) -> Result<String> {
    let mut script = ScriptBuilder::new();
    system.emit(&mut script);
    setup_m0(&system.m, &mut script)?;
    driver.emit_stage(system, &mut script)?;
    script.push_raw(DESTINATIONS);
    driver.emit_schedules(system, &mut script)?;
    Ok(script.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::DynamicsTerm;
    use crate::energy::EnergyTerm;
    use crate::field::Field;
    use crate::mesh::Mesh;

    pub(crate) fn sample_system() -> System {
        let mesh =
            Mesh::new([0.0, 0.0, 0.0], [50e-9, 25e-9, 5e-9], [5e-9, 5e-9, 5e-9]).unwrap();
        let m = Field::uniform(mesh, 8e5, [0.0, 0.0, 1.0]).unwrap();
        System::new("sample", m)
            .unwrap()
            .with_energy(EnergyTerm::Exchange { a: 1.3e-11 })
            .with_energy(EnergyTerm::Demag)
            .with_dynamics(DynamicsTerm::Precession { gamma: 2.211e5 })
            .unwrap()
            .with_dynamics(DynamicsTerm::Damping { alpha: 0.02 })
            .unwrap()
    }

    #[test]
    fn test_generated_script_section_order() {
        let system = sample_system();
        let driver = TimeDriver::evolve(1e-9, 10);
        let mif = generate_script(&system, &driver).unwrap();

        assert!(mif.starts_with("# MIF 2.1\n"));
        let mesh_pos = mif.find("Oxs_RectangularMesh:mesh").unwrap();
        let m0_pos = mif.find("Oxs_FileVectorField:m0").unwrap();
        let evolver_pos = mif.find("Oxs_RungeKuttaEvolve:evolver").unwrap();
        let driver_pos = mif.find("Specify Oxs_TimeDriver").unwrap();
        let dest_pos = mif.find("Destination table").unwrap();
        let sched_pos = mif.find("Schedule DataTable").unwrap();
        assert!(mesh_pos < m0_pos);
        assert!(m0_pos < evolver_pos);
        assert!(evolver_pos < driver_pos);
        assert!(driver_pos < dest_pos);
        assert!(dest_pos < sched_pos);
    }

    #[test]
    fn test_generated_script_references_resolve() {
        let system = sample_system();
        let driver = TimeDriver::evolve(1e-9, 10);
        let mif = generate_script(&system, &driver).unwrap();

        // Every :name used by the stage driver is defined earlier.
        for name in ["evolver", "mesh", "Ms", "m0"] {
            let def = mif.find(&format!(":{name} ")).or_else(|| mif.find(&format!(":{name}\n")));
            assert!(def.is_some(), "reference :{name} missing from script");
        }
    }
}
