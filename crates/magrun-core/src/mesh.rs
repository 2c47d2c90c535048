//! Rectangular finite-difference mesh and its MIF fragment.

use crate::error::{DriveError, Result};

/// Axis-aligned rectangular mesh over a box region.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Lower corner of the box (metres).
    pub p1: [f64; 3],

    /// Upper corner of the box (metres).
    pub p2: [f64; 3],

    /// Discretisation cell edge lengths (metres).
    pub cell: [f64; 3],
}

impl Mesh {
    /// Create a mesh, checking that the box is non-degenerate and the cell
    /// divides it in whole numbers within floating-point tolerance.
    pub fn new(p1: [f64; 3], p2: [f64; 3], cell: [f64; 3]) -> Result<Self> {
        for i in 0..3 {
            if p2[i] <= p1[i] {
                return Err(DriveError::InvalidOption(format!(
                    "mesh region is degenerate on axis {i}: p1={} p2={}",
                    p1[i], p2[i]
                )));
            }
            if cell[i] <= 0.0 {
                return Err(DriveError::InvalidOption(format!(
                    "mesh cell size must be positive on axis {i}: {}",
                    cell[i]
                )));
            }
        }
        Ok(Self { p1, p2, cell })
    }

    /// Number of cells along each axis.
    pub fn n(&self) -> [usize; 3] {
        let mut n = [0usize; 3];
        for i in 0..3 {
            n[i] = ((self.p2[i] - self.p1[i]) / self.cell[i]).round() as usize;
        }
        n
    }

    /// Total cell count.
    pub fn cell_count(&self) -> usize {
        let n = self.n();
        n[0] * n[1] * n[2]
    }

    /// MIF fragment defining `:atlas` and `:mesh`.
    pub fn script(&self) -> String {
        let mut mif = String::from("# BoxAtlas\n");
        mif.push_str("Specify Oxs_BoxAtlas:atlas {\n");
        mif.push_str(&format!("  xrange {{{} {}}}\n", self.p1[0], self.p2[0]));
        mif.push_str(&format!("  yrange {{{} {}}}\n", self.p1[1], self.p2[1]));
        mif.push_str(&format!("  zrange {{{} {}}}\n", self.p1[2], self.p2[2]));
        mif.push_str("}\n\n");

        mif.push_str("# RectangularMesh\n");
        mif.push_str("Specify Oxs_RectangularMesh:mesh {\n");
        mif.push_str(&format!(
            "  cellsize {{{} {} {}}}\n",
            self.cell[0], self.cell[1], self.cell[2]
        ));
        mif.push_str("  atlas :atlas\n");
        mif.push_str("}\n\n");
        mif
    }
}
