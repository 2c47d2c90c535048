//! Result ingestion: locate and load engine output for one drive.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{DriveError, Result};
use crate::field::Field;
use crate::ovf;
use crate::system::System;
use crate::table;

/// Extract the stage index from an engine snapshot file name.
///
/// The engine names snapshots `<system>-<driver>-Magnetization-...-<index>.omf`
/// with a zero-padded index. Returns `None` for files that do not follow the
/// convention (including the `m0.omf` we wrote ourselves).
pub fn snapshot_index(file_name: &str, system_name: &str) -> Option<u64> {
    let rest = file_name.strip_prefix(system_name)?;
    let rest = rest.strip_prefix('-')?;
    let stem = rest.strip_suffix(".omf")?;
    let index = stem.rsplit('-').next()?;
    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    index.parse().ok()
}

/// Find the final-stage snapshot in a run directory.
///
/// All candidates matching the naming convention are collected and the one
/// with the highest stage index wins; under the engine's fixed-width
/// zero-padded naming this matches lexicographic order, but the explicit
/// index keeps the rule honest. An empty candidate set is an ingestion
/// error, never a silent skip.
pub fn final_snapshot(dir: &Path, system_name: &str) -> Result<PathBuf> {
    let list_err = |e: std::io::Error| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DriveError::MissingOutput(dir.to_path_buf())
        } else {
            DriveError::MalformedOutput {
                path: dir.to_path_buf(),
                reason: format!("cannot list run directory: {e}"),
            }
        }
    };

    let mut candidates: Vec<(u64, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(list_err)? {
        let entry = entry.map_err(list_err)?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if let Some(index) = snapshot_index(name, system_name) {
            candidates.push((index, entry.path()));
        }
    }

    candidates.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    match candidates.pop() {
        Some((index, path)) => {
            debug!(index, path = %path.display(), "selected final snapshot");
            Ok(path)
        }
        None => Err(DriveError::MissingOutput(
            dir.join(format!("{system_name}-*.omf")),
        )),
    }
}

/// Load this drive's outputs into the system: the final magnetisation
/// snapshot into `m` and the scalar table into `dt`.
///
/// The mesh embedded in the snapshot header is discarded in favour of the
/// system's own mesh; the snapshot reader does not carry script semantics.
pub fn ingest(system: &mut System, dir: &Path) -> Result<()> {
    let snapshot = final_snapshot(dir, &system.name)?;
    let loaded = ovf::read(&snapshot)?;

    if loaded.data.len() != system.m.mesh.cell_count() {
        return Err(DriveError::MalformedOutput {
            path: snapshot,
            reason: format!(
                "snapshot has {} cells, system mesh has {}",
                loaded.data.len(),
                system.m.mesh.cell_count()
            ),
        });
    }
    let m = Field::new(system.m.mesh.clone(), loaded.norm, loaded.data)?;

    let table_path = dir.join(format!("{}.odt", system.name));
    let dt = table::read(&table_path)?;

    system.m = m;
    system.dt = Some(dt);
    Ok(())
}
