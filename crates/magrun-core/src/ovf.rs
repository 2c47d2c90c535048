//! OVF 2.0 rectangular-mesh text codec.
//!
//! Covers the subset the drive round-trip needs: one segment, `valuedim: 3`,
//! `Data Text` blocks. The engine's binary OVF modes are not emitted by the
//! scripts magrun generates.

use std::fs;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{DriveError, Result};
use crate::field::Field;
use crate::mesh::Mesh;

/// Write `field` to `path` as OVF 2.0 rectangular text.
pub fn write(field: &Field, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    let mut w = BufWriter::new(file);

    let mesh = &field.mesh;
    let n = mesh.n();

    writeln!(w, "# OOMMF OVF 2.0")?;
    writeln!(w, "# Segment count: 1")?;
    writeln!(w, "# Begin: Segment")?;
    writeln!(w, "# Begin: Header")?;
    writeln!(w, "# Title: m")?;
    writeln!(w, "# meshtype: rectangular")?;
    writeln!(w, "# meshunit: m")?;
    writeln!(w, "# xmin: {}", mesh.p1[0])?;
    writeln!(w, "# ymin: {}", mesh.p1[1])?;
    writeln!(w, "# zmin: {}", mesh.p1[2])?;
    writeln!(w, "# xmax: {}", mesh.p2[0])?;
    writeln!(w, "# ymax: {}", mesh.p2[1])?;
    writeln!(w, "# zmax: {}", mesh.p2[2])?;
    writeln!(w, "# xbase: {}", mesh.p1[0] + mesh.cell[0] / 2.0)?;
    writeln!(w, "# ybase: {}", mesh.p1[1] + mesh.cell[1] / 2.0)?;
    writeln!(w, "# zbase: {}", mesh.p1[2] + mesh.cell[2] / 2.0)?;
    writeln!(w, "# xstepsize: {}", mesh.cell[0])?;
    writeln!(w, "# ystepsize: {}", mesh.cell[1])?;
    writeln!(w, "# zstepsize: {}", mesh.cell[2])?;
    writeln!(w, "# xnodes: {}", n[0])?;
    writeln!(w, "# ynodes: {}", n[1])?;
    writeln!(w, "# znodes: {}", n[2])?;
    writeln!(w, "# valuedim: 3")?;
    writeln!(w, "# valuelabels: m_x m_y m_z")?;
    writeln!(w, "# valueunits: A/m A/m A/m")?;
    writeln!(w, "# End: Header")?;
    writeln!(w, "# Begin: Data Text")?;
    for v in &field.data {
        writeln!(w, "{:.17e} {:.17e} {:.17e}", v[0], v[1], v[2])?;
    }
    writeln!(w, "# End: Data Text")?;
    writeln!(w, "# End: Segment")?;
    w.flush()?;
    Ok(())
}

/// Read an OVF 2.0 rectangular text file into a [`Field`].
///
/// The mesh is reconstructed from the header extents and step sizes. The
/// field norm is taken as the largest vector magnitude present, which for
/// engine snapshots is the saturation magnetisation.
pub fn read(path: &Path) -> Result<Field> {
    let text = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DriveError::MissingOutput(path.to_path_buf())
        } else {
            DriveError::MalformedOutput {
                path: path.to_path_buf(),
                reason: format!("cannot read snapshot: {e}"),
            }
        }
    })?;

    let mut header: std::collections::HashMap<String, String> = std::collections::HashMap::new();
    let mut data: Vec<[f64; 3]> = Vec::new();
    let mut in_data = false;

    for line in text.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix('#') {
            let rest = rest.trim();
            if rest.starts_with("Begin: Data") {
                if !rest.contains("Text") {
                    return Err(malformed(path, "only Data Text blocks are supported"));
                }
                in_data = true;
            } else if rest.starts_with("End: Data") {
                in_data = false;
            } else if let Some((key, value)) = rest.split_once(':') {
                header.insert(key.trim().to_lowercase(), value.trim().to_string());
            }
            continue;
        }
        if in_data && !line.is_empty() {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() != 3 {
                return Err(malformed(path, "data row does not have 3 components"));
            }
            let mut v = [0.0f64; 3];
            for (i, part) in parts.iter().enumerate() {
                v[i] = part
                    .parse()
                    .map_err(|_| malformed(path, "non-numeric data value"))?;
            }
            data.push(v);
        }
    }

    let get = |key: &str| -> Result<f64> {
        header
            .get(key)
            .ok_or_else(|| malformed(path, &format!("missing header key '{key}'")))?
            .parse()
            .map_err(|_| malformed(path, &format!("non-numeric header key '{key}'")))
    };

    let p1 = [get("xmin")?, get("ymin")?, get("zmin")?];
    let p2 = [get("xmax")?, get("ymax")?, get("zmax")?];
    let cell = [get("xstepsize")?, get("ystepsize")?, get("zstepsize")?];
    let mesh = Mesh::new(p1, p2, cell)
        .map_err(|e| malformed(path, &format!("inconsistent mesh header: {e}")))?;

    if data.len() != mesh.cell_count() {
        return Err(malformed(
            path,
            &format!(
                "data has {} rows, mesh header implies {}",
                data.len(),
                mesh.cell_count()
            ),
        ));
    }

    let norm = data
        .iter()
        .map(|v| (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt())
        .fold(0.0f64, f64::max);

    Field::new(mesh, norm, data)
}

fn malformed(path: &Path, reason: &str) -> DriveError {
    DriveError::MalformedOutput {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
