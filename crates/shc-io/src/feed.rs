use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use shc_core::error::{ShcError, ShcResult};
use shc_core::partition::{ForceConstants, InterfacePartition};

/// Loaded force-constant feed: coupling matrix plus the atom partition it refers to.
#[derive(Debug, Clone)]
pub struct ForceConstantFeed {
    pub partition: InterfacePartition,
    pub kij: ForceConstants,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPaths {
    pub kij: PathBuf,
    pub ids_left: PathBuf,
    pub ids_right: PathBuf,
    pub ids_interface: PathBuf,
}

impl FeedPaths {
    pub fn from_prefix(prefix: &str) -> Self {
        Self {
            kij: PathBuf::from(format!("{prefix}.kij.json")),
            ids_left: PathBuf::from(format!("{prefix}.ids_l.json")),
            ids_right: PathBuf::from(format!("{prefix}.ids_r.json")),
            ids_interface: PathBuf::from(format!("{prefix}.ids_interface.json")),
        }
    }

    pub fn all(&self) -> [&Path; 4] {
        [
            self.kij.as_path(),
            self.ids_left.as_path(),
            self.ids_right.as_path(),
            self.ids_interface.as_path(),
        ]
    }

    pub fn exist(&self) -> bool {
        self.all().iter().all(|p| p.is_file())
    }

    pub fn missing(&self) -> Vec<PathBuf> {
        self.all()
            .iter()
            .filter(|p| !p.is_file())
            .map(|p| p.to_path_buf())
            .collect()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct MatrixFile {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

pub fn load_feed(prefix: &str) -> ShcResult<ForceConstantFeed> {
    let paths = FeedPaths::from_prefix(prefix);
    let matrix: MatrixFile = read_json(&paths.kij)?;
    let ids_left: Vec<usize> = read_json(&paths.ids_left)?;
    let ids_right: Vec<usize> = read_json(&paths.ids_right)?;
    let ids_interface: Vec<usize> = read_json(&paths.ids_interface)?;

    let kij = ForceConstants::from_row_major(matrix.rows, matrix.cols, matrix.data)?;
    if kij.rows() / 3 != ids_left.len() || kij.cols() / 3 != ids_right.len() {
        return Err(ShcError::Mismatch(format!(
            "sizes in {} ((3*{})x(3*{})) and ids_L/ids_R ({}/{}) do not match for prefix '{prefix}'",
            paths.kij.display(),
            kij.rows() / 3,
            kij.cols() / 3,
            ids_left.len(),
            ids_right.len()
        )));
    }
    let partition = InterfacePartition::new(ids_left, ids_right, ids_interface)?;
    kij.check_partition(&partition)?;
    Ok(ForceConstantFeed { partition, kij })
}

pub fn write_feed(prefix: &str, partition: &InterfacePartition, kij: &ForceConstants) -> ShcResult<()> {
    kij.check_partition(partition)?;
    let paths = FeedPaths::from_prefix(prefix);
    let matrix = MatrixFile {
        rows: kij.rows(),
        cols: kij.cols(),
        data: kij.data().to_vec(),
    };
    write_json(&paths.kij, &matrix)?;
    write_json(&paths.ids_left, &partition.ids_left())?;
    write_json(&paths.ids_right, &partition.ids_right())?;
    write_json(&paths.ids_interface, &partition.interface_ids())?;
    Ok(())
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> ShcResult<T> {
    let file = File::open(path).map_err(|err| {
        ShcError::Mismatch(format!(
            "failed to open force constant artifact {}: {err}",
            path.display()
        ))
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|err| {
        ShcError::Parse(format!(
            "invalid force constant artifact {}: {err}",
            path.display()
        ))
    })
}

pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> ShcResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}
