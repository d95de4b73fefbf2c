//! Upstream producers of the two input feeds.
//!
//! Producers are treated as black boxes: their exit status is not interpreted, the
//! caller only checks that the expected artifacts exist afterwards.

use std::path::Path;
use std::process::Command;

use shc_core::config::ShcConfig;
use shc_core::error::{ShcError, ShcResult};

use crate::feed::{load_feed, FeedPaths, ForceConstantFeed};

pub trait VelocityCompactor {
    fn compact(&self, dump_file: &Path, velocity_file: &Path) -> ShcResult<()>;
}

pub trait ForceConstantCalculator {
    fn calculate(&self, in_file: &Path, prefix: &str, hstep: f64) -> ShcResult<()>;
}

/// Runs `<program> <dump> <out>`.
#[derive(Debug, Clone)]
pub struct CommandCompactor {
    program: String,
}

impl CommandCompactor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for CommandCompactor {
    fn default() -> Self {
        Self::new("compactify_vels")
    }
}

impl VelocityCompactor for CommandCompactor {
    fn compact(&self, dump_file: &Path, velocity_file: &Path) -> ShcResult<()> {
        let outcome = Command::new(&self.program)
            .arg(dump_file)
            .arg(velocity_file)
            .status();
        if !velocity_file.is_file() {
            return Err(ShcError::Producer(format!(
                "'{}' did not create {} ({})",
                self.program,
                velocity_file.display(),
                describe(outcome)
            )));
        }
        Ok(())
    }
}

/// Runs `<program> <in_file> <prefix> <hstep>`.
#[derive(Debug, Clone)]
pub struct CommandCalculator {
    program: String,
}

impl CommandCalculator {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for CommandCalculator {
    fn default() -> Self {
        Self::new("fc-calc")
    }
}

impl ForceConstantCalculator for CommandCalculator {
    fn calculate(&self, in_file: &Path, prefix: &str, hstep: f64) -> ShcResult<()> {
        let outcome = Command::new(&self.program)
            .arg(in_file)
            .arg(prefix)
            .arg(hstep.to_string())
            .status();
        let missing = FeedPaths::from_prefix(prefix).missing();
        if !missing.is_empty() {
            let names: Vec<String> = missing.iter().map(|p| p.display().to_string()).collect();
            return Err(ShcError::Producer(format!(
                "'{}' did not create {} ({})",
                self.program,
                names.join(", "),
                describe(outcome)
            )));
        }
        Ok(())
    }
}

fn describe(outcome: std::io::Result<std::process::ExitStatus>) -> String {
    match outcome {
        Ok(status) => format!("exit status {status}"),
        Err(err) => format!("could not run: {err}"),
    }
}

/// Makes sure both feeds are on disk, regenerating them where requested or missing,
/// and loads the force-constant feed.
pub fn prepare_inputs(
    config: &ShcConfig,
    compactor: &dyn VelocityCompactor,
    calculator: &dyn ForceConstantCalculator,
) -> ShcResult<ForceConstantFeed> {
    let velocity_file = Path::new(&config.velocity_file);
    let make_vels = config.recalc_vels || !velocity_file.is_file();
    let fc_paths = FeedPaths::from_prefix(&config.kij_prefix);
    let make_fc = config.recalc_fc || !fc_paths.exist();

    let dump_file = if make_vels {
        match config.dump_file.as_deref().map(Path::new) {
            Some(path) if path.is_file() => Some(path),
            _ => {
                return Err(ShcError::Config(format!(
                    "dump_file must name an existing velocity dump to create {}",
                    velocity_file.display()
                )))
            }
        }
    } else {
        None
    };
    let in_file = if make_fc {
        match config.lammps_in_file.as_deref() {
            Some(path) => Some(Path::new(path)),
            None => {
                return Err(ShcError::Config(format!(
                    "lammps_in_file is required to create the force constant feed '{}'",
                    config.kij_prefix
                )))
            }
        }
    } else {
        None
    };

    if let Some(dump) = dump_file {
        compactor.compact(dump, velocity_file)?;
    }
    if let Some(in_file) = in_file {
        calculator.calculate(in_file, &config.kij_prefix, config.hstep)?;
    }
    load_feed(&config.kij_prefix)
}
