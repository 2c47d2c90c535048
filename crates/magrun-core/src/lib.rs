//! magrun core library
//!
//! Drives micromagnetic simulations through an external OOMMF-compatible
//! engine: translates an in-memory [`System`] into a MIF script, runs the
//! engine as a subprocess, and re-imports the resulting magnetisation
//! snapshot and scalar table.
//!
//! The central entry point is [`DriveRunner::drive`], called with a driver
//! variant ([`TimeDriver`], [`MinDriver`], [`HysteresisDriver`]).

pub mod drivers;
pub mod dynamics;
pub mod energy;
pub mod engine;
pub mod error;
pub mod evolver;
pub mod field;
pub mod ingest;
pub mod mesh;
pub mod metadata;
pub mod ovf;
pub mod runner;
pub mod script;
pub mod system;
pub mod table;

pub use drivers::{
    generate_script, AttrValue, DeriveQuantity, Driver, DriverAttrs, HysteresisDriver, MinDriver,
    SweepStep, TimeDriver,
};
pub use dynamics::{Dynamics, DynamicsTerm};
pub use energy::EnergyTerm;
pub use engine::Engine;
pub use error::{DriveError, ErrorKind, Result};
pub use evolver::{Evolver, EvolverKind};
pub use field::Field;
pub use mesh::Mesh;
pub use metadata::RunInfo;
pub use runner::{DriveReport, DriveRunner};
pub use system::System;
pub use table::DataTable;
