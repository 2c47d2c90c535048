//! Vector field sampled on a rectangular mesh.

use crate::error::{DriveError, Result};
use crate::mesh::Mesh;

/// A three-component vector field on a [`Mesh`], row-major with x fastest.
///
/// `data` holds full-length vectors (A/m for magnetisation); `norm` is the
/// saturation magnitude used when the field is referenced as `Ms` in a
/// script.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub mesh: Mesh,
    pub norm: f64,
    pub data: Vec<[f64; 3]>,
}

impl Field {
    /// Create a field from raw per-cell vectors.
    pub fn new(mesh: Mesh, norm: f64, data: Vec<[f64; 3]>) -> Result<Self> {
        if data.len() != mesh.cell_count() {
            return Err(DriveError::InvalidOption(format!(
                "field has {} values for a mesh with {} cells",
                data.len(),
                mesh.cell_count()
            )));
        }
        Ok(Self { mesh, norm, data })
    }

    /// Uniform field of magnitude `norm` pointing along `dir`.
    pub fn uniform(mesh: Mesh, norm: f64, dir: [f64; 3]) -> Result<Self> {
        let mag = (dir[0] * dir[0] + dir[1] * dir[1] + dir[2] * dir[2]).sqrt();
        if mag == 0.0 {
            return Err(DriveError::InvalidOption(
                "uniform field direction must be non-zero".to_string(),
            ));
        }
        let value = [
            dir[0] / mag * norm,
            dir[1] / mag * norm,
            dir[2] / mag * norm,
        ];
        let data = vec![value; mesh.cell_count()];
        Self::new(mesh, norm, data)
    }

    /// Mean vector value over all cells.
    pub fn mean(&self) -> [f64; 3] {
        let mut sum = [0.0f64; 3];
        for v in &self.data {
            sum[0] += v[0];
            sum[1] += v[1];
            sum[2] += v[2];
        }
        let n = self.data.len().max(1) as f64;
        [sum[0] / n, sum[1] / n, sum[2] / n]
    }
}
