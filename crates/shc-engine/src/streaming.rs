//! NDJSON progress events on stderr.
//!
//! Event types:
//!   - run_started: stream geometry and requested chunk count
//!   - chunk_processed: one chunk folded into the running statistics
//!   - chunk_size_changed: a short first chunk shrank the frequency grid
//!   - stream_ended: the velocity stream stopped before the requested chunk count
//!   - checkpoint_failed: a best-effort snapshot could not be written
//!   - run_complete: final result envelope

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RunStartedEvent {
    pub n_dof: usize,
    pub chunk_size: usize,
    pub n_freq: usize,
    pub requested_chunks: usize,
    pub first_chunk: usize,
}

#[derive(Debug, Clone)]
pub struct ChunkProcessedEvent {
    pub chunk_index: usize,
    pub requested_chunks: usize,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone)]
pub struct RunCompleteEvent {
    pub n_chunks: usize,
    pub n_freq: usize,
    pub stop: &'static str,
    pub has_error: bool,
    pub elapsed_ms: u64,
}

/// Streaming emitter for NDJSON events.
///
/// Emits events to stderr when enabled; stdout is left to the caller.
#[derive(Debug, Clone, Copy)]
pub struct StreamEmitter {
    enabled: bool,
}

impl StreamEmitter {
    /// Create a new emitter.
    ///
    /// Pass `true` to enable NDJSON streaming to stderr.
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Create a disabled emitter (no output).
    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    /// Create an enabled emitter.
    pub fn enabled() -> Self {
        Self { enabled: true }
    }

    /// Check if streaming is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn emit_json(&self, json: &str) {
        if self.enabled {
            eprintln!("{}", json);
        }
    }

    /// Emit the run geometry before the first chunk is read.
    pub fn emit_run_started(&self, event: &RunStartedEvent) {
        let json = format!(
            r#"{{"event":"run_started","n_dof":{},"chunk_size":{},"n_freq":{},"requested_chunks":{},"first_chunk":{}}}"#,
            event.n_dof, event.chunk_size, event.n_freq, event.requested_chunks, event.first_chunk
        );
        self.emit_json(&json);
    }

    /// Emit a chunk folded into the running statistics, with percent of the requested count.
    pub fn emit_chunk_processed(&self, event: &ChunkProcessedEvent) {
        let progress_pct = if event.requested_chunks > 0 {
            (event.chunk_index + 1) as f64 / event.requested_chunks as f64 * 100.0
        } else {
            0.0
        };
        let json = format!(
            r#"{{"event":"chunk_processed","chunk_index":{},"requested_chunks":{},"elapsed_ms":{},"progress_pct":{:.1}}}"#,
            event.chunk_index, event.requested_chunks, event.elapsed_ms, progress_pct
        );
        self.emit_json(&json);
    }

    /// Emit the shrunken chunk length and bin count after a short first chunk.
    pub fn emit_chunk_size_changed(&self, chunk_size: usize, n_freq: usize) {
        let json = format!(
            r#"{{"event":"chunk_size_changed","chunk_size":{},"n_freq":{}}}"#,
            chunk_size, n_freq
        );
        self.emit_json(&json);
    }

    /// Emit an early end of the velocity stream.
    ///
    /// `discarded_samples` counts samples read but not folded into any chunk.
    pub fn emit_stream_ended(&self, reason: &str, n_chunks: usize, discarded_samples: usize) {
        let reason = serde_json::to_string(reason).unwrap_or("\"unknown\"".to_string());
        let json = format!(
            r#"{{"event":"stream_ended","reason":{},"n_chunks":{},"discarded_samples":{}}}"#,
            reason, n_chunks, discarded_samples
        );
        self.emit_json(&json);
    }

    /// Emit a snapshot write failure; the run continues.
    pub fn emit_checkpoint_failed(&self, prefix: &str, message: &str) {
        let prefix = serde_json::to_string(prefix).unwrap_or("null".to_string());
        let message = serde_json::to_string(message).unwrap_or("\"\"".to_string());
        let json = format!(
            r#"{{"event":"checkpoint_failed","prefix":{},"message":{}}}"#,
            prefix, message
        );
        self.emit_json(&json);
    }

    /// Emit the final result envelope.
    pub fn emit_run_complete(&self, event: &RunCompleteEvent) {
        let json = format!(
            r#"{{"event":"run_complete","n_chunks":{},"n_freq":{},"stop":"{}","has_error":{},"elapsed_ms":{}}}"#,
            event.n_chunks, event.n_freq, event.stop, event.has_error, event.elapsed_ms
        );
        self.emit_json(&json);
    }

    /// Emit an error event.
    pub fn emit_error(&self, code: &str, message: &str) {
        let code = serde_json::to_string(code).unwrap_or("\"unknown\"".to_string());
        let message = serde_json::to_string(message).unwrap_or("\"Unknown error\"".to_string());
        let json = format!(r#"{{"event":"error","code":{},"message":{}}}"#, code, message);
        self.emit_json(&json);
    }
}

pub(crate) fn duration_ms(d: Duration) -> u64 {
    d.as_millis().try_into().unwrap_or(u64::MAX)
}
