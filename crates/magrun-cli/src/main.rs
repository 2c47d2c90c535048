//! magrun - drive micromagnetic simulations through an external engine.
//!
//! ## Commands
//!
//! - `time`: integrate the dynamics for a total time over n stages
//! - `min`: relax the system by energy minimization
//! - `hysteresis`: run a symmetric hysteresis sweep
//! - `derive`: compute an instantaneous quantity without evolving

mod config;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use magrun_core::{
    DeriveQuantity, DriveRunner, Driver, DriverAttrs, Engine, HysteresisDriver, MinDriver,
    TimeDriver,
};

use config::SystemConfig;

#[derive(Parser)]
#[command(name = "magrun")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Micromagnetic simulation drive coordinator", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML system description
    #[arg(short, long, global = true, default_value = "system.toml")]
    system: PathBuf,

    /// Engine executable (default: the stock `oommf` launcher)
    #[arg(long, global = true, env = "MAGRUN_ENGINE")]
    engine: Option<PathBuf>,

    /// Engine timeout in seconds (no timeout if omitted)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Directory under which run directories are created
    #[arg(long, global = true, default_value = ".")]
    base_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Integrate the dynamics equation
    Time {
        /// Total simulated time in seconds
        #[arg(short, long)]
        t: f64,

        /// Number of stages
        #[arg(short, long)]
        n: i64,
    },

    /// Relax the system by energy minimization
    Min {
        /// Torque stopping criterion (mxHxm)
        #[arg(long)]
        stopping_mxhxm: Option<f64>,
    },

    /// Symmetric hysteresis sweep from Hmin to Hmax and back
    Hysteresis {
        /// Minimum field, three components in A/m
        #[arg(long, num_args = 3, allow_negative_numbers = true)]
        hmin: Vec<f64>,

        /// Maximum field, three components in A/m
        #[arg(long, num_args = 3, allow_negative_numbers = true)]
        hmax: Vec<f64>,

        /// Number of field points per sweep leg
        #[arg(short, long)]
        n: i64,
    },

    /// Compute an instantaneous quantity without evolving the system
    Derive {
        /// Quantity to compute
        quantity: Quantity,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Quantity {
    EffectiveField,
    EnergyDensity,
    TotalEnergy,
}

impl From<Quantity> for DeriveQuantity {
    fn from(q: Quantity) -> Self {
        match q {
            Quantity::EffectiveField => DeriveQuantity::EffectiveField,
            Quantity::EnergyDensity => DeriveQuantity::EnergyDensity,
            Quantity::TotalEnergy => DeriveQuantity::TotalEnergy,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    let mut system = SystemConfig::load(&cli.system)?.into_system()?;
    info!(system = %system.name, drive = system.drive_number, "loaded system");

    let mut engine = match &cli.engine {
        Some(program) => Engine::new(program),
        None => Engine::default(),
    };
    if let Some(secs) = cli.timeout {
        engine = engine.with_timeout(Duration::from_secs(secs));
    }

    let driver: Box<dyn Driver> = match cli.command {
        Commands::Time { t, n } => Box::new(TimeDriver::evolve(t, n)),
        Commands::Min { stopping_mxhxm } => {
            let mut attrs = DriverAttrs::new();
            if let Some(value) = stopping_mxhxm {
                attrs = attrs.set("stopping_mxHxm", value);
            }
            Box::new(MinDriver::new().with_attrs(attrs)?)
        }
        Commands::Hysteresis { hmin, hmax, n } => {
            Box::new(HysteresisDriver::symmetric(hmin, hmax, n))
        }
        Commands::Derive { quantity } => Box::new(TimeDriver::derive(quantity.into())),
    };

    let runner = DriveRunner::new(engine).with_base_dir(&cli.base_dir);
    let report = runner
        .drive(&mut system, driver.as_ref())
        .await
        .with_context(|| format!("drive {} of '{}' failed", system.drive_number, system.name))?;

    info!(
        drive = report.drive_number,
        dir = %report.dirname.display(),
        duration_ms = report.duration_ms,
        "drive completed"
    );
    Ok(())
}
