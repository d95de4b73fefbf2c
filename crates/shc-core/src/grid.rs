use std::f64::consts::PI;

use crate::error::{ShcError, ShcResult};

/// Non-negative angular-frequency bins of a real FFT of `chunk_len` samples.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyGrid {
    chunk_len: usize,
    sample_timestep: f64,
    omega: Vec<f64>,
}

impl FrequencyGrid {
    pub fn new(chunk_len: usize, sample_timestep: f64) -> ShcResult<Self> {
        if chunk_len == 0 {
            return Err(ShcError::Config("chunk length must be > 0".into()));
        }
        if !(sample_timestep.is_finite() && sample_timestep > 0.0) {
            return Err(ShcError::Config(format!(
                "sample timestep must be positive, got {sample_timestep}"
            )));
        }
        let n_bins = chunk_len / 2 + 1;
        let span = chunk_len as f64 * sample_timestep;
        let omega = (0..n_bins).map(|i| 2.0 * PI * i as f64 / span).collect();
        Ok(Self {
            chunk_len,
            sample_timestep,
            omega,
        })
    }

    pub fn chunk_len(&self) -> usize {
        self.chunk_len
    }

    pub fn sample_timestep(&self) -> f64 {
        self.sample_timestep
    }

    pub fn len(&self) -> usize {
        self.omega.len()
    }

    pub fn is_empty(&self) -> bool {
        self.omega.is_empty()
    }

    pub fn omega(&self) -> &[f64] {
        &self.omega
    }

    /// Bin spacing in ordinary frequency units (ω₁ / 2π).
    pub fn spacing(&self) -> f64 {
        self.omega.get(1).map(|w| w / (2.0 * PI)).unwrap_or(0.0)
    }
}
