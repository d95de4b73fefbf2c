use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::{Duration, Instant};

use shc_core::config::ShcConfig;
use shc_core::error::{ShcError, ShcResult};
use shc_core::grid::FrequencyGrid;
use shc_core::result::SpectralResult;
use shc_io::feed::ForceConstantFeed;
use shc_io::snapshot::{Snapshot, SNAPSHOT_VERSION};
use shc_io::velocity::VelocityReader;

use crate::aggregator::RunningAggregator;
use crate::estimator::{ChunkSpectrum, SpectralCurrentEstimator};
use crate::streaming::{
    duration_ms, ChunkProcessedEvent, RunCompleteEvent, RunStartedEvent, StreamEmitter,
};
use crate::transform::ChunkTransformer;

/// Reader state after the latest chunk attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Reading,
    ShortFirstChunk,
    ShortLaterChunk,
    Eof,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The requested number of chunks was processed.
    ChunkCount,
    EndOfStream,
    /// The first chunk was short; the run shrank to that one chunk.
    ShortFirstChunk,
    /// A later chunk was short and was discarded.
    ShortLaterChunk,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChunkCount => "chunk_count",
            Self::EndOfStream => "end_of_stream",
            Self::ShortFirstChunk => "short_first_chunk",
            Self::ShortLaterChunk => "short_later_chunk",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub result: SpectralResult,
    pub stop: StopReason,
    pub elapsed: Duration,
}

/// Chunked spectral heat-current estimation over one velocity stream.
///
/// The reader is consumed forward only; it is dropped with the run on every exit path.
pub struct SpectralRun<R: BufRead> {
    config: ShcConfig,
    reader: VelocityReader<R>,
    transformer: ChunkTransformer,
    estimator: SpectralCurrentEstimator,
    aggregator: RunningAggregator,
    grid: FrequencyGrid,
    chunk_size: usize,
    n_dof: usize,
    next_chunk: usize,
    first_chunk: usize,
    state: StreamState,
    stop: Option<StopReason>,
    emitter: StreamEmitter,
    samples: Vec<f64>,
    started: Instant,
}

impl SpectralRun<BufReader<File>> {
    pub fn open(config: ShcConfig, feed: &ForceConstantFeed) -> ShcResult<Self> {
        let reader = VelocityReader::open(Path::new(&config.velocity_file))?;
        Self::new(config, feed, reader)
    }
}

impl<R: BufRead> SpectralRun<R> {
    /// Validates the configuration and both feeds; nothing is computed yet.
    pub fn new(
        config: ShcConfig,
        feed: &ForceConstantFeed,
        reader: VelocityReader<R>,
    ) -> ShcResult<Self> {
        config.validate()?;
        let projection = config.projection()?;
        feed.kij.check_partition(&feed.partition)?;
        let sample_timestep = config.sample_timestep();
        reader
            .header()
            .check_against(&feed.partition, config.dt_md, sample_timestep)?;

        let chunk_size = config.chunk_size();
        let grid = FrequencyGrid::new(chunk_size, sample_timestep)?;
        let transformer = ChunkTransformer::new(&feed.partition, projection, sample_timestep);
        let estimator = SpectralCurrentEstimator::new(
            &feed.kij,
            projection,
            config.scale_factor,
            config.width_win,
        );
        Ok(Self {
            n_dof: feed.partition.n_dof(),
            config,
            reader,
            transformer,
            estimator,
            aggregator: RunningAggregator::new(),
            grid,
            chunk_size,
            next_chunk: 0,
            first_chunk: 0,
            state: StreamState::Reading,
            stop: None,
            emitter: StreamEmitter::disabled(),
            samples: Vec::new(),
            started: Instant::now(),
        })
    }

    /// Continues a checkpointed run: the chunks already folded into `snapshot` are
    /// skipped in the stream.
    pub fn resume(
        config: ShcConfig,
        feed: &ForceConstantFeed,
        reader: VelocityReader<R>,
        snapshot: &Snapshot,
    ) -> ShcResult<Self> {
        snapshot.validate()?;
        let mut run = Self::new(config, feed, reader)?;
        run.config.check_resumable(&snapshot.config)?;
        if snapshot.chunk_size != run.chunk_size {
            return Err(ShcError::Mismatch(format!(
                "snapshot was taken with chunk size {} but the run uses {}",
                snapshot.chunk_size, run.chunk_size
            )));
        }
        let grid = run.grid.omega();
        if let Some(i) = (0..grid.len())
            .find(|&i| (snapshot.omega[i] - grid[i]).abs() > 1e-9 * grid[i].abs().max(1.0))
        {
            return Err(ShcError::Mismatch(format!(
                "snapshot frequency bin {i} is {} but the run grid has {}",
                snapshot.omega[i], grid[i]
            )));
        }
        run.aggregator = RunningAggregator::from_parts(
            snapshot.shc_smooth.clone(),
            snapshot.shc_smooth2.clone(),
            snapshot.shc_average.clone(),
            snapshot.chunks_done,
        )?;
        let to_skip = snapshot.chunks_done * run.chunk_size * run.n_dof;
        let skipped = run.reader.skip_samples(to_skip)?;
        if skipped != to_skip {
            return Err(ShcError::Mismatch(format!(
                "velocity stream holds {skipped} samples but the snapshot covers {to_skip}"
            )));
        }
        run.next_chunk = snapshot.chunks_done;
        run.first_chunk = snapshot.chunks_done;
        Ok(run)
    }

    pub fn with_emitter(mut self, emitter: StreamEmitter) -> Self {
        self.emitter = emitter;
        self
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn grid(&self) -> &FrequencyGrid {
        &self.grid
    }

    pub fn aggregator(&self) -> &RunningAggregator {
        &self.aggregator
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunks_done(&self) -> usize {
        self.aggregator.count()
    }

    pub fn is_finished(&self) -> bool {
        self.state != StreamState::Reading
    }

    /// Attempts one chunk and returns the state entered.
    pub fn step(&mut self) -> ShcResult<StreamState> {
        if self.state != StreamState::Reading {
            self.state = StreamState::Done;
            return Ok(self.state);
        }
        if self.next_chunk >= self.config.n_chunks {
            self.stop.get_or_insert(StopReason::ChunkCount);
            self.state = StreamState::Done;
            return Ok(self.state);
        }
        if self.next_chunk == self.first_chunk {
            self.emitter.emit_run_started(&RunStartedEvent {
                n_dof: self.n_dof,
                chunk_size: self.chunk_size,
                n_freq: self.grid.len(),
                requested_chunks: self.config.n_chunks,
                first_chunk: self.first_chunk,
            });
        }

        let want = self.chunk_size * self.n_dof;
        let mut samples = std::mem::take(&mut self.samples);
        let got = self.reader.read_samples(want, &mut samples);
        let outcome = got.and_then(|got| self.advance(&samples, got, want));
        self.samples = samples;
        outcome
    }

    fn advance(&mut self, samples: &[f64], got: usize, want: usize) -> ShcResult<StreamState> {
        if got == 0 {
            self.stop = Some(StopReason::EndOfStream);
            self.state = StreamState::Eof;
            self.emitter
                .emit_stream_ended(StopReason::EndOfStream.as_str(), self.chunks_done(), 0);
            return Ok(self.state);
        }

        if got != want {
            if self.next_chunk == 0 && self.aggregator.is_empty() {
                let chunk_len = got / self.n_dof;
                if chunk_len < 2 {
                    return Err(ShcError::NoData(format!(
                        "velocity stream holds {got} samples, fewer than two timesteps of {} degrees of freedom",
                        self.n_dof
                    )));
                }
                self.chunk_size = chunk_len;
                self.grid = FrequencyGrid::new(chunk_len, self.config.sample_timestep())?;
                self.emitter
                    .emit_chunk_size_changed(self.chunk_size, self.grid.len());
                let spectrum = self.process(&samples[..chunk_len * self.n_dof])?;
                self.aggregator.reseed(&spectrum);
                self.next_chunk = 1;
                self.stop = Some(StopReason::ShortFirstChunk);
                self.state = StreamState::ShortFirstChunk;
                self.emit_chunk_done(0);
                self.emitter.emit_stream_ended(
                    StopReason::ShortFirstChunk.as_str(),
                    1,
                    got - chunk_len * self.n_dof,
                );
                return Ok(self.state);
            }
            self.stop = Some(StopReason::ShortLaterChunk);
            self.state = StreamState::ShortLaterChunk;
            self.emitter.emit_stream_ended(
                StopReason::ShortLaterChunk.as_str(),
                self.chunks_done(),
                got,
            );
            return Ok(self.state);
        }

        let spectrum = self.process(samples)?;
        self.aggregator.fold(&spectrum)?;
        let index = self.next_chunk;
        self.next_chunk += 1;
        self.emit_chunk_done(index);
        self.checkpoint();
        if self.next_chunk >= self.config.n_chunks {
            self.stop = Some(StopReason::ChunkCount);
            self.state = StreamState::Done;
        }
        Ok(self.state)
    }

    fn process(&mut self, samples: &[f64]) -> ShcResult<ChunkSpectrum> {
        let chunk = self.transformer.transform(samples, self.chunk_size)?;
        self.estimator.estimate(&chunk, &self.grid)
    }

    fn emit_chunk_done(&self, index: usize) {
        self.emitter.emit_chunk_processed(&ChunkProcessedEvent {
            chunk_index: index,
            requested_chunks: self.config.n_chunks,
            elapsed_ms: duration_ms(self.started.elapsed()),
        });
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            chunk_size: self.chunk_size,
            chunks_done: self.aggregator.count(),
            omega: self.grid.omega().to_vec(),
            shc_smooth: self.aggregator.mean().to_vec(),
            shc_smooth2: self.aggregator.mean_sq().to_vec(),
            shc_average: self.aggregator.raw_mean().to_vec(),
            config: self.config.clone(),
        }
    }

    fn checkpoint(&self) {
        let Some(prefix) = self.config.backup_prefix.as_deref() else {
            return;
        };
        if let Err(err) = self.snapshot().save(prefix) {
            self.emitter.emit_checkpoint_failed(prefix, &err.to_string());
        }
    }

    /// Drives the stream to completion and returns the chunk-averaged spectrum.
    pub fn run(mut self) -> ShcResult<RunSummary> {
        while !self.is_finished() {
            if let Err(err) = self.step() {
                self.emitter.emit_error(err.code(), &err.to_string());
                return Err(err);
            }
        }
        self.finish()
    }

    pub fn finish(self) -> ShcResult<RunSummary> {
        if self.aggregator.is_empty() {
            let err = ShcError::NoData(format!(
                "velocity stream {} ended before the first chunk of {} timesteps",
                self.config.velocity_file, self.chunk_size
            ));
            self.emitter.emit_error(err.code(), &err.to_string());
            return Err(err);
        }
        let stop = self.stop.unwrap_or(StopReason::ChunkCount);
        let result = SpectralResult {
            omega: self.grid.omega().to_vec(),
            shc_smooth: self.aggregator.mean().to_vec(),
            shc_average: self.aggregator.raw_mean().to_vec(),
            shc_error: self.aggregator.standard_error(),
            n_chunks: self.aggregator.count(),
            chunk_size: self.chunk_size,
        };
        let elapsed = self.started.elapsed();
        self.emitter.emit_run_complete(&RunCompleteEvent {
            n_chunks: result.n_chunks,
            n_freq: result.len(),
            stop: stop.as_str(),
            has_error: result.shc_error.is_some(),
            elapsed_ms: duration_ms(elapsed),
        });
        Ok(RunSummary {
            result,
            stop,
            elapsed,
        })
    }
}
