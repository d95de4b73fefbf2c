use rustfft::num_complex::Complex64;

use shc_core::error::{ShcError, ShcResult};
use shc_core::grid::FrequencyGrid;
use shc_core::matrix::ComplexMatrix;
use shc_core::partition::ForceConstants;
use shc_core::projection::Projection;
use shc_core::smooth::Smoother;

use crate::transform::TransformedChunk;

/// Per-chunk spectral heat current, before and after smoothing.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkSpectrum {
    pub raw: Vec<f64>,
    pub smoothed: Vec<f64>,
}

impl ChunkSpectrum {
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

/// `-2 Im(v_L[:,i]ᵀ K conj(v_R[:,i])) / ω_i` for every bin `i ≥ 1`; bin 0 is 0.
pub fn spectral_current(
    left: &ComplexMatrix,
    right: &ComplexMatrix,
    kij: &ForceConstants,
    omega: &[f64],
) -> ShcResult<Vec<f64>> {
    if left.rows() != kij.rows() || right.rows() != kij.cols() {
        return Err(ShcError::Mismatch(format!(
            "velocity blocks {}/{} rows do not fit force constants {}x{}",
            left.rows(),
            right.rows(),
            kij.rows(),
            kij.cols()
        )));
    }
    let n_freq = omega.len();
    if left.cols() != n_freq || right.cols() != n_freq {
        return Err(ShcError::Mismatch(format!(
            "velocity spectra have {}/{} bins but the frequency grid has {n_freq}",
            left.cols(),
            right.cols()
        )));
    }

    let mut shc = vec![0.0f64; n_freq];
    let mut v_left = Vec::with_capacity(left.rows());
    let mut v_right_conj = Vec::with_capacity(right.rows());
    for (i, slot) in shc.iter_mut().enumerate().skip(1) {
        left.column_into(i, &mut v_left);
        right.column_into(i, &mut v_right_conj);
        for v in v_right_conj.iter_mut() {
            *v = v.conj();
        }
        let mut total = Complex64::new(0.0, 0.0);
        for (a, vl) in v_left.iter().enumerate() {
            let krow = kij.row(a);
            let mut kv = Complex64::new(0.0, 0.0);
            for (k, vr) in krow.iter().zip(v_right_conj.iter()) {
                kv += *vr * *k;
            }
            total += *vl * kv;
        }
        *slot = -2.0 * total.im / omega[i];
    }
    Ok(shc)
}

/// Contracts chunk spectra through the (projected) force constants, normalizes and
/// smooths the result.
#[derive(Debug, Clone)]
pub struct SpectralCurrentEstimator {
    kij: ForceConstants,
    scale_factor: f64,
    smoother: Smoother,
}

impl SpectralCurrentEstimator {
    pub fn new(
        kij: &ForceConstants,
        projection: Projection,
        scale_factor: f64,
        width_win: f64,
    ) -> Self {
        Self {
            kij: projection.apply_force_constants(kij),
            scale_factor,
            smoother: Smoother::new(width_win),
        }
    }


    pub fn estimate(&self, chunk: &TransformedChunk, grid: &FrequencyGrid) -> ShcResult<ChunkSpectrum> {
        let mut raw = spectral_current(&chunk.left, &chunk.right, &self.kij, grid.omega())?;
        let norm = self.scale_factor / (grid.chunk_len() as f64 * grid.sample_timestep());
        for v in raw.iter_mut() {
            *v *= norm;
        }
        let mut smoothed = if grid.len() > 1 {
            self.smoother.apply(&raw, grid.spacing())
        } else {
            raw.clone()
        };
        if let Some(first) = smoothed.first_mut() {
            *first = 0.0;
        }
        Ok(ChunkSpectrum { raw, smoothed })
    }
}
