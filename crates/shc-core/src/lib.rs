#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod grid;
pub mod matrix;
pub mod partition;
pub mod projection;
pub mod result;
pub mod smooth;

pub use config::ShcConfig;
pub use error::{ShcError, ShcResult};
pub use grid::FrequencyGrid;
pub use matrix::ComplexMatrix;
pub use partition::{ForceConstants, InterfacePartition};
pub use projection::{Axis, Projection};
pub use result::{accumulate, SpectralResult};
pub use smooth::{gaussian_kernel, smooth, Smoother};
pub use rustfft::num_complex::Complex64;
