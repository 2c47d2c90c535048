//! Run lifecycle coordinator.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::info;

use crate::drivers::{generate_script, Driver};
use crate::engine::Engine;
use crate::error::Result;
use crate::ingest;
use crate::metadata::RunInfo;
use crate::ovf;
use crate::script::M0_FILENAME;
use crate::system::System;

/// Canonical file layout of one drive directory.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DrivePaths {
    dirname: PathBuf,
    script: PathBuf,
    m0: PathBuf,
    info: PathBuf,
}

impl DrivePaths {
    /// `<base>/<system-name>/drive-<n>/...`. Uniqueness per drive comes from
    /// the monotonic counter, not from probing the filesystem.
    fn new(base_dir: &Path, system: &System) -> Self {
        let dirname = base_dir
            .join(&system.name)
            .join(format!("drive-{}", system.drive_number));
        Self {
            script: dirname.join(format!("{}.mif", system.name)),
            m0: dirname.join(M0_FILENAME),
            info: dirname.join("info.json"),
            dirname,
        }
    }
}

/// Summary of one completed drive.
#[derive(Debug, Clone)]
pub struct DriveReport {
    /// The counter value this drive ran under.
    pub drive_number: u32,

    /// Directory holding the run artifacts.
    pub dirname: PathBuf,

    /// Wall-clock duration of the whole drive.
    pub duration_ms: u64,
}

/// Owns the end-to-end drive sequence: layout, script assembly, initial
/// state, metadata, engine invocation, ingestion, counter advancement.
#[derive(Debug, Clone, Default)]
pub struct DriveRunner {
    engine: Engine,
    base_dir: PathBuf,
}

impl DriveRunner {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            base_dir: PathBuf::from("."),
        }
    }

    /// Root under which `<system-name>/drive-<n>` directories are created.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Execute one drive of `system` with `driver`.
    ///
    /// Either fully completes (state updated where applicable, counter
    /// advanced by one) or returns an error with nothing committed.
    /// Validation failures leave no trace on disk; later failures leave the
    /// run directory in place for inspection, and a retry reuses the same
    /// `drive-<n>` slot because the counter only advances at the end. The
    /// exclusive borrow of `system` rules out concurrent drives on the same
    /// system.
    pub async fn drive(&self, system: &mut System, driver: &dyn Driver) -> Result<DriveReport> {
        let start = Instant::now();

        // Validation and script assembly both precede any side effect.
        driver.validate(system)?;
        let script_text = generate_script(system, driver)?;

        let paths = DrivePaths::new(&self.base_dir, system);
        info!(
            system = %system.name,
            drive = system.drive_number,
            driver = driver.kind(),
            dir = %paths.dirname.display(),
            "starting drive"
        );

        // Idempotent: a stale directory from a failed earlier attempt is
        // reused, not an error.
        fs::create_dir_all(&paths.dirname)?;

        fs::write(&paths.script, &script_text)?;
        ovf::write(&system.m, &paths.m0)?;
        RunInfo::now(driver.kind()).write(&paths.info)?;

        self.engine.run(&paths.script, &paths.dirname).await?;

        if driver.updates_state() {
            ingest::ingest(system, &paths.dirname)?;
        }

        // Sole commit point: the counter tracks completed drives only.
        system.drive_number += 1;

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            system = %system.name,
            drive = system.drive_number - 1,
            duration_ms,
            "drive completed"
        );

        Ok(DriveReport {
            drive_number: system.drive_number - 1,
            dirname: paths.dirname,
            duration_ms,
        })
    }
}
