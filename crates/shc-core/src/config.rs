use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ShcError, ShcResult};
use crate::projection::Projection;

/// Recognized options of a post-processing run.
///
/// Unknown keys are rejected when the configuration is deserialized.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShcConfig {
    pub velocity_file: String,
    pub kij_prefix: String,
    #[serde(default = "default_dt_md")]
    pub dt_md: f64,
    #[serde(default = "default_dn")]
    pub dn: usize,
    #[serde(default = "default_steps")]
    pub steps: usize,
    #[serde(default = "default_n_chunks")]
    pub n_chunks: usize,
    #[serde(default)]
    pub chunk_size: Option<usize>,
    #[serde(default = "default_one")]
    pub scale_factor: f64,
    #[serde(default = "default_one")]
    pub width_win: f64,
    #[serde(default = "default_hstep")]
    pub hstep: f64,
    #[serde(default)]
    pub backup_prefix: Option<String>,
    #[serde(default)]
    pub in_plane: bool,
    #[serde(default)]
    pub out_of_plane: bool,
    #[serde(default)]
    pub recalc_vels: bool,
    #[serde(default)]
    pub recalc_fc: bool,
    #[serde(default)]
    pub dump_file: Option<String>,
    #[serde(default)]
    pub lammps_in_file: Option<String>,
}

fn default_dt_md() -> f64 {
    1.0
}

fn default_dn() -> usize {
    10
}

fn default_steps() -> usize {
    500_000
}

fn default_n_chunks() -> usize {
    20
}

fn default_one() -> f64 {
    1.0
}

fn default_hstep() -> f64 {
    0.01
}

impl ShcConfig {
    pub fn new(velocity_file: impl Into<String>, kij_prefix: impl Into<String>) -> Self {
        Self {
            velocity_file: velocity_file.into(),
            kij_prefix: kij_prefix.into(),
            dt_md: default_dt_md(),
            dn: default_dn(),
            steps: default_steps(),
            n_chunks: default_n_chunks(),
            chunk_size: None,
            scale_factor: default_one(),
            width_win: default_one(),
            hstep: default_hstep(),
            backup_prefix: None,
            in_plane: false,
            out_of_plane: false,
            recalc_vels: false,
            recalc_fc: false,
            dump_file: None,
            lammps_in_file: None,
        }
    }

    pub fn from_json_str(content: &str) -> ShcResult<Self> {
        let cfg: ShcConfig = serde_json::from_str(content)
            .map_err(|err| ShcError::Config(format!("failed to read configuration: {err}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> ShcResult<Self> {
        let content = fs::read_to_string(path).map_err(|err| {
            ShcError::Config(format!(
                "failed to open configuration {}: {err}",
                path.display()
            ))
        })?;
        Self::from_json_str(&content)
    }

    /// Time between two stored velocity frames.
    pub fn sample_timestep(&self) -> f64 {
        self.dt_md * self.dn as f64
    }

    /// Timesteps per chunk, either given explicitly or `steps / dn / n_chunks`.
    pub fn chunk_size(&self) -> usize {
        match self.chunk_size {
            Some(size) => size,
            None => {
                if self.dn == 0 || self.n_chunks == 0 {
                    0
                } else {
                    self.steps / self.dn / self.n_chunks
                }
            }
        }
    }

    pub fn projection(&self) -> ShcResult<Projection> {
        Projection::from_flags(self.in_plane, self.out_of_plane)
    }

    pub fn validate(&self) -> ShcResult<()> {
        if self.velocity_file.trim().is_empty() {
            return Err(ShcError::Config("velocity_file cannot be empty".into()));
        }
        if self.kij_prefix.trim().is_empty() {
            return Err(ShcError::Config("kij_prefix cannot be empty".into()));
        }
        if !(self.dt_md.is_finite() && self.dt_md > 0.0) {
            return Err(ShcError::Config(format!(
                "dt_md must be a positive timestep, got {}",
                self.dt_md
            )));
        }
        if self.dn == 0 {
            return Err(ShcError::Config("dn must be > 0".into()));
        }
        if self.n_chunks == 0 {
            return Err(ShcError::Config("n_chunks must be > 0".into()));
        }
        if !(self.width_win.is_finite() && self.width_win > 0.0) {
            return Err(ShcError::Config(format!(
                "width_win must be a positive frequency width, got {}",
                self.width_win
            )));
        }
        if !(self.hstep.is_finite() && self.hstep > 0.0) {
            return Err(ShcError::Config(format!(
                "hstep must be a positive displacement, got {}",
                self.hstep
            )));
        }
        if !self.scale_factor.is_finite() {
            return Err(ShcError::Config("scale_factor must be finite".into()));
        }
        let chunk_size = self.chunk_size();
        if chunk_size < 2 {
            return Err(ShcError::Config(format!(
                "chunk size must be >= 2 timesteps, got {chunk_size} (steps={}, dn={}, n_chunks={})",
                self.steps, self.dn, self.n_chunks
            )));
        }
        self.projection()?;
        Ok(())
    }

    /// Fails with `Mismatch` naming the first option that changes per-chunk spectra
    /// between `earlier` (a checkpointed run) and `self`. Run length, backup and
    /// regeneration options may differ.
    pub fn check_resumable(&self, earlier: &ShcConfig) -> ShcResult<()> {
        let text = [
            ("velocity_file", &earlier.velocity_file, &self.velocity_file),
            ("kij_prefix", &earlier.kij_prefix, &self.kij_prefix),
        ];
        for (name, before, now) in text {
            if before != now {
                return Err(ShcError::Mismatch(format!(
                    "snapshot was taken with {name} '{before}' but the run uses '{now}'"
                )));
            }
        }
        let counts = [
            ("dn", earlier.dn, self.dn),
            ("chunk size", earlier.chunk_size(), self.chunk_size()),
        ];
        for (name, before, now) in counts {
            if before != now {
                return Err(ShcError::Mismatch(format!(
                    "snapshot was taken with {name} {before} but the run uses {now}"
                )));
            }
        }
        let reals = [
            ("dt_md", earlier.dt_md, self.dt_md),
            ("scale_factor", earlier.scale_factor, self.scale_factor),
            ("width_win", earlier.width_win, self.width_win),
            ("hstep", earlier.hstep, self.hstep),
        ];
        for (name, before, now) in reals {
            if (before - now).abs() > 1e-12 * before.abs().max(now.abs()) {
                return Err(ShcError::Mismatch(format!(
                    "snapshot was taken with {name} {before} but the run uses {now}"
                )));
            }
        }
        let (before, now) = (earlier.projection()?, self.projection()?);
        if before != now {
            return Err(ShcError::Mismatch(format!(
                "snapshot was taken with projection {before:?} but the run uses {now:?}"
            )));
        }
        Ok(())
    }
}
