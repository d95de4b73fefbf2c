use rustfft::num_complex::Complex64;
use rustfft::FftPlanner;

use shc_core::error::{ShcError, ShcResult};
use shc_core::matrix::ComplexMatrix;
use shc_core::partition::InterfacePartition;
use shc_core::projection::Projection;

/// Frequency-domain velocities of one chunk, rows laid out x,y,z per atom.
#[derive(Debug, Clone)]
pub struct TransformedChunk {
    pub left: ComplexMatrix,
    pub right: ComplexMatrix,
}

impl TransformedChunk {
    pub fn n_freq(&self) -> usize {
        self.left.cols()
    }
}

/// Turns a raw chunk (timestep-major, all degrees of freedom per timestep) into
/// scaled real-FFT spectra for the left and right atom groups.
pub struct ChunkTransformer {
    n_dof: usize,
    ids_left: Vec<usize>,
    ids_right: Vec<usize>,
    projection: Projection,
    sample_timestep: f64,
    planner: FftPlanner<f64>,
    buffer: Vec<Complex64>,
}

impl ChunkTransformer {
    pub fn new(partition: &InterfacePartition, projection: Projection, sample_timestep: f64) -> Self {
        Self {
            n_dof: partition.n_dof(),
            ids_left: partition.ids_left().to_vec(),
            ids_right: partition.ids_right().to_vec(),
            projection,
            sample_timestep,
            planner: FftPlanner::new(),
            buffer: Vec::new(),
        }
    }

    pub fn transform(&mut self, samples: &[f64], chunk_len: usize) -> ShcResult<TransformedChunk> {
        if chunk_len == 0 || samples.len() != chunk_len * self.n_dof {
            return Err(ShcError::Mismatch(format!(
                "chunk of {} samples does not hold {chunk_len} timesteps of {} degrees of freedom",
                samples.len(),
                self.n_dof
            )));
        }
        let left = self.side(samples, chunk_len, true);
        let right = self.side(samples, chunk_len, false);
        if self.projection.is_full() {
            return Ok(TransformedChunk { left, right });
        }
        Ok(TransformedChunk {
            left: self.projection.apply_velocities(&left),
            right: self.projection.apply_velocities(&right),
        })
    }

    fn side(&mut self, samples: &[f64], chunk_len: usize, left: bool) -> ComplexMatrix {
        let n_freq = chunk_len / 2 + 1;
        let fft = self.planner.plan_fft_forward(chunk_len);
        let ids = if left { &self.ids_left } else { &self.ids_right };
        let mut out = ComplexMatrix::zeros(3 * ids.len(), n_freq);
        for (a, &atom) in ids.iter().enumerate() {
            for axis in 0..3 {
                let dof = 3 * atom + axis;
                self.buffer.clear();
                self.buffer.extend(
                    (0..chunk_len).map(|t| Complex64::new(samples[t * self.n_dof + dof], 0.0)),
                );
                fft.process(&mut self.buffer);
                let row = out.row_mut(3 * a + axis);
                for (dst, src) in row.iter_mut().zip(self.buffer.iter()) {
                    *dst = *src * self.sample_timestep;
                }
            }
        }
        out
    }
}
