//! Energy terms and their MIF fragments.
//!
//! The drive coordinator treats these fragments as opaque text; it only
//! concatenates them into the system section of the script.

/// Energy terms of the Hamiltonian.
#[derive(Debug, Clone, PartialEq)]
pub enum EnergyTerm {
    /// Symmetric exchange, constant `a` in J/m.
    Exchange { a: f64 },

    /// Demagnetisation (stray field).
    Demag,

    /// Static Zeeman field, `h` in A/m.
    Zeeman { h: [f64; 3] },

    /// Uniaxial magnetocrystalline anisotropy, `k1` in J/m^3.
    UniaxialAnisotropy { k1: f64, axis: [f64; 3] },
}

impl EnergyTerm {
    /// MIF `Specify` fragment for this term.
    pub fn script(&self) -> String {
        match self {
            EnergyTerm::Exchange { a } => {
                let mut mif = String::from("# UniformExchange\n");
                mif.push_str("Specify Oxs_UniformExchange {\n");
                mif.push_str(&format!("  A {a}\n"));
                mif.push_str("}\n\n");
                mif
            }
            EnergyTerm::Demag => "# Demag\nSpecify Oxs_Demag {}\n\n".to_string(),
            EnergyTerm::Zeeman { h } => {
                let mut mif = String::from("# FixedZeeman\n");
                mif.push_str("Specify Oxs_FixedZeeman {\n");
                mif.push_str("  field {\n");
                mif.push_str("    Oxs_UniformVectorField {\n");
                mif.push_str(&format!("      vector {{{} {} {}}}\n", h[0], h[1], h[2]));
                mif.push_str("    }\n");
                mif.push_str("  }\n");
                mif.push_str("}\n\n");
                mif
            }
            EnergyTerm::UniaxialAnisotropy { k1, axis } => {
                let mut mif = String::from("# UniaxialAnisotropy\n");
                mif.push_str("Specify Oxs_UniaxialAnisotropy {\n");
                mif.push_str(&format!("  K1 {k1}\n"));
                mif.push_str(&format!(
                    "  axis {{{} {} {}}}\n",
                    axis[0], axis[1], axis[2]
                ));
                mif.push_str("}\n\n");
                mif
            }
        }
    }
}
