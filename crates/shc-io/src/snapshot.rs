use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use shc_core::config::ShcConfig;
use shc_core::error::{ShcError, ShcResult};

use crate::feed::write_json;

pub const SNAPSHOT_VERSION: u32 = 1;

/// Resumable state after the last completed chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub chunk_size: usize,
    pub chunks_done: usize,
    pub omega: Vec<f64>,
    pub shc_smooth: Vec<f64>,
    pub shc_smooth2: Vec<f64>,
    pub shc_average: Vec<f64>,
    pub config: ShcConfig,
}

impl Snapshot {
    pub fn path_for(prefix: &str) -> PathBuf {
        PathBuf::from(format!("{prefix}.snapshot.json"))
    }

    pub fn table_path_for(prefix: &str) -> PathBuf {
        PathBuf::from(format!("{prefix}.backup.txt"))
    }

    /// Writes the snapshot (through a temporary file) and the (omega, running mean) table.
    pub fn save(&self, prefix: &str) -> ShcResult<()> {
        let path = Self::path_for(prefix);
        let tmp = PathBuf::from(format!("{prefix}.snapshot.json.tmp"));
        write_json(&tmp, self)?;
        fs::rename(&tmp, &path)?;
        self.write_table(&Self::table_path_for(prefix))
    }

    fn write_table(&self, path: &Path) -> ShcResult<()> {
        let mut file = BufWriter::new(File::create(path)?);
        writeln!(file, "# chunks_done {}", self.chunks_done)?;
        for (w, s) in self.omega.iter().zip(self.shc_smooth.iter()) {
            writeln!(file, "{w:>23.16e} {s:>23.16e}")?;
        }
        file.flush()?;
        Ok(())
    }

    pub fn load(path: &Path) -> ShcResult<Self> {
        let file = File::open(path).map_err(|err| {
            ShcError::Config(format!("failed to open snapshot {}: {err}", path.display()))
        })?;
        let snapshot: Snapshot = serde_json::from_reader(BufReader::new(file))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn validate(&self) -> ShcResult<()> {
        if self.version != SNAPSHOT_VERSION {
            return Err(ShcError::Config(format!(
                "snapshot version {} is not supported (expected {SNAPSHOT_VERSION})",
                self.version
            )));
        }
        let n = self.omega.len();
        if n != self.chunk_size / 2 + 1
            || self.shc_smooth.len() != n
            || self.shc_smooth2.len() != n
            || self.shc_average.len() != n
        {
            return Err(ShcError::Mismatch(format!(
                "snapshot arrays do not match chunk size {} (omega={}, smooth={}, smooth2={}, average={})",
                self.chunk_size,
                n,
                self.shc_smooth.len(),
                self.shc_smooth2.len(),
                self.shc_average.len()
            )));
        }
        if self.chunks_done == 0 {
            return Err(ShcError::NoData("snapshot holds no completed chunks".into()));
        }
        Ok(())
    }
}
