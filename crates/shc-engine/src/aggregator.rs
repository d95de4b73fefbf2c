use shc_core::error::{ShcError, ShcResult};

use crate::estimator::ChunkSpectrum;

/// Incremental chunk statistics: mean and mean-of-squares of the smoothed spectra and
/// mean of the raw spectra.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunningAggregator {
    mean: Vec<f64>,
    mean_sq: Vec<f64>,
    raw_mean: Vec<f64>,
    count: usize,
}

impl RunningAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the state of a previous run.
    pub fn from_parts(
        mean: Vec<f64>,
        mean_sq: Vec<f64>,
        raw_mean: Vec<f64>,
        count: usize,
    ) -> ShcResult<Self> {
        if mean.len() != mean_sq.len() || mean.len() != raw_mean.len() {
            return Err(ShcError::Mismatch(format!(
                "aggregator arrays differ in length ({}, {}, {})",
                mean.len(),
                mean_sq.len(),
                raw_mean.len()
            )));
        }
        if count == 0 {
            return Err(ShcError::NoData(
                "aggregator state needs at least one chunk".into(),
            ));
        }
        Ok(Self {
            mean,
            mean_sq,
            raw_mean,
            count,
        })
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn mean_sq(&self) -> &[f64] {
        &self.mean_sq
    }

    pub fn raw_mean(&self) -> &[f64] {
        &self.raw_mean
    }

    /// Folds chunk `k = count` in: `M ← (k·M + x) / (k + 1)`.
    ///
    /// A spectrum of a different length is only accepted into an empty aggregator.
    pub fn fold(&mut self, spectrum: &ChunkSpectrum) -> ShcResult<()> {
        let n = spectrum.len();
        if spectrum.smoothed.len() != n {
            return Err(ShcError::Mismatch(format!(
                "smoothed spectrum has {} bins, raw has {n}",
                spectrum.smoothed.len()
            )));
        }
        if self.count == 0 {
            self.reseed(spectrum);
            return Ok(());
        }
        if n != self.mean.len() {
            return Err(ShcError::Mismatch(format!(
                "chunk spectrum has {n} bins but {} chunks were averaged on {} bins",
                self.count,
                self.mean.len()
            )));
        }
        let k = self.count as f64;
        let inv = 1.0 / (k + 1.0);
        for i in 0..n {
            let s = spectrum.smoothed[i];
            self.mean[i] = (k * self.mean[i] + s) * inv;
            self.mean_sq[i] = (k * self.mean_sq[i] + s * s) * inv;
            self.raw_mean[i] = (k * self.raw_mean[i] + spectrum.raw[i]) * inv;
        }
        self.count += 1;
        Ok(())
    }

    /// Discards everything and restarts from `spectrum` alone.
    pub fn reseed(&mut self, spectrum: &ChunkSpectrum) {
        self.mean = spectrum.smoothed.clone();
        self.mean_sq = spectrum.smoothed.iter().map(|v| v * v).collect();
        self.raw_mean = spectrum.raw.clone();
        self.count = 1;
    }

    /// Standard error of the chunk mean, `sqrt(k/(k-1) (M2 - M²) / k)`; `None` for fewer
    /// than two chunks.
    pub fn standard_error(&self) -> Option<Vec<f64>> {
        if self.count < 2 {
            return None;
        }
        let k = self.count as f64;
        let factor = k / (k - 1.0);
        Some(
            self.mean
                .iter()
                .zip(self.mean_sq.iter())
                .map(|(m, m2)| {
                    let var = (factor * (m2 - m * m)).max(0.0);
                    (var / k).sqrt()
                })
                .collect(),
        )
    }
}
