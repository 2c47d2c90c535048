//! TOML system descriptions for the CLI.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use magrun_core::{DynamicsTerm, EnergyTerm, Field, Mesh, System};

/// On-disk description of a magnetic system.
#[derive(Debug, Deserialize)]
pub struct SystemConfig {
    pub name: String,
    pub mesh: MeshConfig,
    pub m0: InitialMagnetisation,
    #[serde(default)]
    pub energy: Vec<EnergyConfig>,
    #[serde(default)]
    pub dynamics: Option<DynamicsConfig>,
}

#[derive(Debug, Deserialize)]
pub struct MeshConfig {
    pub p1: [f64; 3],
    pub p2: [f64; 3],
    pub cell: [f64; 3],
}

#[derive(Debug, Deserialize)]
pub struct InitialMagnetisation {
    /// Saturation magnetisation (A/m).
    pub norm: f64,
    /// Initial direction, normalised on load.
    pub dir: [f64; 3],
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EnergyConfig {
    Exchange { a: f64 },
    Demag,
    Zeeman { h: [f64; 3] },
    UniaxialAnisotropy { k1: f64, axis: [f64; 3] },
}

#[derive(Debug, Deserialize)]
pub struct DynamicsConfig {
    pub gamma: Option<f64>,
    pub alpha: Option<f64>,
}

impl SystemConfig {
    /// Load a system description from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading system description {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("parsing system description {}", path.display()))
    }

    /// Build the in-memory system.
    pub fn into_system(self) -> Result<System> {
        let mesh = Mesh::new(self.mesh.p1, self.mesh.p2, self.mesh.cell)
            .context("invalid mesh")?;
        let m = Field::uniform(mesh, self.m0.norm, self.m0.dir)
            .context("invalid initial magnetisation")?;

        let mut system = System::new(self.name, m).context("invalid system name")?;

        for energy in self.energy {
            let term = match energy {
                EnergyConfig::Exchange { a } => EnergyTerm::Exchange { a },
                EnergyConfig::Demag => EnergyTerm::Demag,
                EnergyConfig::Zeeman { h } => EnergyTerm::Zeeman { h },
                EnergyConfig::UniaxialAnisotropy { k1, axis } => {
                    EnergyTerm::UniaxialAnisotropy { k1, axis }
                }
            };
            system = system.with_energy(term);
        }

        if let Some(dynamics) = self.dynamics {
            if let Some(gamma) = dynamics.gamma {
                system = system
                    .with_dynamics(DynamicsTerm::Precession { gamma })
                    .context("invalid dynamics")?;
            }
            if let Some(alpha) = dynamics.alpha {
                system = system
                    .with_dynamics(DynamicsTerm::Damping { alpha })
                    .context("invalid dynamics")?;
            }
        }

        Ok(system)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_TOML: &str = r#"
name = "sample"

[mesh]
p1 = [0.0, 0.0, 0.0]
p2 = [50e-9, 25e-9, 5e-9]
cell = [5e-9, 5e-9, 5e-9]

[m0]
norm = 8e5
dir = [0.0, 0.0, 1.0]

[[energy]]
kind = "exchange"
a = 1.3e-11

[[energy]]
kind = "demag"

[dynamics]
gamma = 2.211e5
alpha = 0.02
"#;

    #[test]
    fn test_parse_and_build_system() {
        let config: SystemConfig = toml::from_str(SAMPLE_TOML).unwrap();
        let system = config.into_system().unwrap();

        assert_eq!(system.name, "sample");
        assert_eq!(system.energy.len(), 2);
        assert_eq!(system.dynamics.gamma(), Some(2.211e5));
        assert_eq!(system.dynamics.alpha(), Some(0.02));
        assert_eq!(system.m.mesh.n(), [10, 5, 1]);
        assert_eq!(system.drive_number, 0);
    }

    #[test]
    fn test_minimal_config() {
        let toml = r#"
name = "bare"

[mesh]
p1 = [0.0, 0.0, 0.0]
p2 = [10e-9, 10e-9, 10e-9]
cell = [5e-9, 5e-9, 5e-9]

[m0]
norm = 1e5
dir = [1.0, 0.0, 0.0]
"#;
        let config: SystemConfig = toml::from_str(toml).unwrap();
        let system = config.into_system().unwrap();
        assert!(system.energy.is_empty());
        assert_eq!(system.dynamics.alpha(), None);
    }

    #[test]
    fn test_unknown_energy_kind_rejected() {
        let toml = r#"
name = "bad"

[mesh]
p1 = [0.0, 0.0, 0.0]
p2 = [10e-9, 10e-9, 10e-9]
cell = [5e-9, 5e-9, 5e-9]

[m0]
norm = 1e5
dir = [1.0, 0.0, 0.0]

[[energy]]
kind = "wormholes"
"#;
        assert!(toml::from_str::<SystemConfig>(toml).is_err());
    }
}
