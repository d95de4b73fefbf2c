#![forbid(unsafe_code)]

pub mod aggregator;
pub mod estimator;
pub mod run;
pub mod streaming;
pub mod transform;

pub use aggregator::RunningAggregator;
pub use estimator::{spectral_current, ChunkSpectrum, SpectralCurrentEstimator};
pub use run::{RunSummary, SpectralRun, StopReason, StreamState};
pub use streaming::StreamEmitter;
pub use transform::{ChunkTransformer, TransformedChunk};
