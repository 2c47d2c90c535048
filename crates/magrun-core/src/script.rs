//! MIF document assembly with an explicit symbol table.
//!
//! The engine resolves named references (`:mesh`, `:m0`, `:evolver`) only
//! against definitions that appear earlier in the document, so the builder
//! records every defined name and refuses to emit a reference to a name that
//! has not been defined yet. Renaming a definition then breaks loudly at
//! script-generation time instead of silently desynchronising two sections.

use std::collections::BTreeSet;

use crate::error::{DriveError, Result};
use crate::field::Field;

/// Version header of every generated document.
pub const SCRIPT_HEADER: &str = "# MIF 2.1\n\n";

/// Name of the initial-magnetisation field definition.
pub const M0_NAME: &str = "m0";

/// Name of the saturation-magnetisation scalar field definition.
pub const MS_NAME: &str = "Ms";

/// File the initial magnetisation is serialized to inside the run directory.
pub const M0_FILENAME: &str = "m0.omf";

/// Incremental MIF document builder.
#[derive(Debug)]
pub struct ScriptBuilder {
    text: String,
    symbols: BTreeSet<String>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self {
            text: SCRIPT_HEADER.to_string(),
            symbols: BTreeSet::new(),
        }
    }

    /// Append an opaque fragment that defines no referenced names.
    pub fn push_raw(&mut self, fragment: &str) {
        self.text.push_str(fragment);
    }

    /// Append a fragment and record `name` as defined by it.
    pub fn define(&mut self, name: &str, fragment: &str) {
        self.symbols.insert(name.to_string());
        self.text.push_str(fragment);
    }

    /// Record `name` as defined without appending text (for names defined
    /// inside a fragment pushed separately).
    pub fn declare(&mut self, name: &str) {
        self.symbols.insert(name.to_string());
    }

    /// Produce a `:name` reference token, failing if `name` was not defined
    /// earlier in this document.
    pub fn reference(&self, name: &str) -> Result<String> {
        if !self.symbols.contains(name) {
            return Err(DriveError::UndefinedReference(name.to_string()));
        }
        Ok(format!(":{name}"))
    }

    /// Whether `name` has been defined.
    pub fn is_defined(&self, name: &str) -> bool {
        self.symbols.contains(name)
    }

    pub fn finish(self) -> String {
        self.text
    }
}

impl Default for ScriptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Emit the initial-magnetisation setup: `m0` read back from the serialized
/// field file, and `Ms` as a uniform scalar field with the field's norm.
///
/// The names registered here are the ones the stage-driver fragment later
/// references; they come from the same constants so the contract cannot
/// drift.
pub fn setup_m0(field: &Field, script: &mut ScriptBuilder) -> Result<()> {
    let atlas = script.reference("atlas")?;

    let mut mif = String::from("# Initial magnetisation\n");
    mif.push_str(&format!("Specify Oxs_FileVectorField:{M0_NAME} {{\n"));
    mif.push_str(&format!("  atlas {atlas}\n"));
    mif.push_str("  norm 1\n");
    mif.push_str(&format!("  file {M0_FILENAME}\n"));
    mif.push_str("}\n\n");
    script.define(M0_NAME, &mif);

    let mut mif = String::new();
    mif.push_str(&format!("Specify Oxs_UniformScalarField:{MS_NAME} {{\n"));
    mif.push_str(&format!("  value {:?}\n", field.norm));
    mif.push_str("}\n\n");
    script.define(MS_NAME, &mif);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Mesh;

    fn sample_field() -> Field {
        let mesh =
            Mesh::new([0.0, 0.0, 0.0], [10e-9, 10e-9, 5e-9], [5e-9, 5e-9, 5e-9]).unwrap();
        Field::uniform(mesh, 8e5, [0.0, 0.0, 1.0]).unwrap()
    }

    #[test]
    fn test_header_is_first() {
        let script = ScriptBuilder::new();
        assert!(script.finish().starts_with("# MIF 2.1\n"));
    }

    #[test]
    fn test_reference_requires_prior_definition() {
        let mut script = ScriptBuilder::new();
        let err = script.reference("evolver").unwrap_err();
        assert!(matches!(err, DriveError::UndefinedReference(_)));

        script.define("evolver", "Specify Oxs_RungeKuttaEvolve:evolver {}\n");
        assert_eq!(script.reference("evolver").unwrap(), ":evolver");
    }

    #[test]
    fn test_setup_m0_defines_names() {
        let mut script = ScriptBuilder::new();
        script.declare("atlas");
        setup_m0(&sample_field(), &mut script).unwrap();

        assert!(script.is_defined(M0_NAME));
        assert!(script.is_defined(MS_NAME));
        let text = script.finish();
        assert!(text.contains("Specify Oxs_FileVectorField:m0 {"));
        assert!(text.contains("file m0.omf"));
        assert!(text.contains("Specify Oxs_UniformScalarField:Ms {"));
        assert!(text.contains("value 800000.0"));
    }

    #[test]
    fn test_setup_m0_without_atlas_fails() {
        let mut script = ScriptBuilder::new();
        let err = setup_m0(&sample_field(), &mut script).unwrap_err();
        assert!(matches!(err, DriveError::UndefinedReference(name) if name == "atlas"));
    }
}
