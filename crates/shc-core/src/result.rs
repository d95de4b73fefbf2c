use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Chunk-averaged spectral heat current on the angular-frequency grid.
///
/// All arrays share the grid length. `shc_error` is present only when more than one
/// chunk was averaged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralResult {
    pub omega: Vec<f64>,
    pub shc_smooth: Vec<f64>,
    pub shc_average: Vec<f64>,
    pub shc_error: Option<Vec<f64>>,
    pub n_chunks: usize,
    pub chunk_size: usize,
}

impl SpectralResult {
    pub fn len(&self) -> usize {
        self.omega.len()
    }

    pub fn is_empty(&self) -> bool {
        self.omega.is_empty()
    }

    /// Ordinary frequencies ω/2π.
    pub fn frequencies(&self) -> Vec<f64> {
        self.omega.iter().map(|w| w / (2.0 * PI)).collect()
    }

    /// Phonon transmission SHC / (k_B ΔT).
    pub fn transmission(&self, k_boltzmann: f64, delta_t: f64) -> Vec<f64> {
        let denom = k_boltzmann * delta_t;
        self.shc_smooth.iter().map(|v| v / denom).collect()
    }

    /// Spectral thermal conductance SHC / (A ΔT).
    pub fn conductance(&self, area: f64, delta_t: f64) -> Vec<f64> {
        let denom = area * delta_t;
        self.shc_smooth.iter().map(|v| v / denom).collect()
    }
}

/// Cumulative trapezoid integral of `y` over `x`, starting at 0.
pub fn accumulate(y: &[f64], x: &[f64]) -> Vec<f64> {
    let n = y.len().min(x.len());
    let mut out = Vec::with_capacity(n);
    let mut total = 0.0f64;
    for i in 0..n {
        if i > 0 {
            total += 0.5 * (y[i] + y[i - 1]) * (x[i] - x[i - 1]);
        }
        out.push(total);
    }
    out
}
