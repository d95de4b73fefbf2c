use crate::error::{ShcError, ShcResult};

/// Left/right atom groups across the interface.
///
/// `ids_left`/`ids_right` index atoms in the velocity file order; `interface_ids` are the
/// 0-based ids of those atoms as written by the upstream producer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfacePartition {
    ids_left: Vec<usize>,
    ids_right: Vec<usize>,
    interface_ids: Vec<usize>,
}

impl InterfacePartition {
    pub fn new(
        ids_left: Vec<usize>,
        ids_right: Vec<usize>,
        interface_ids: Vec<usize>,
    ) -> ShcResult<Self> {
        if ids_left.is_empty() || ids_right.is_empty() {
            return Err(ShcError::Mismatch(format!(
                "interface needs atoms on both sides (left={}, right={})",
                ids_left.len(),
                ids_right.len()
            )));
        }
        let n_atoms = ids_left.len() + ids_right.len();
        if interface_ids.len() != n_atoms {
            return Err(ShcError::Mismatch(format!(
                "interface id list has {} entries but left+right has {n_atoms} atoms",
                interface_ids.len()
            )));
        }
        let mut seen = vec![false; n_atoms];
        for &idx in ids_left.iter().chain(ids_right.iter()) {
            if idx >= n_atoms {
                return Err(ShcError::Mismatch(format!(
                    "interface atom index {idx} out of bounds for {n_atoms} atoms"
                )));
            }
            if seen[idx] {
                return Err(ShcError::Mismatch(format!(
                    "interface atom index {idx} appears more than once"
                )));
            }
            seen[idx] = true;
        }
        Ok(Self {
            ids_left,
            ids_right,
            interface_ids,
        })
    }

    pub fn ids_left(&self) -> &[usize] {
        &self.ids_left
    }

    pub fn ids_right(&self) -> &[usize] {
        &self.ids_right
    }

    pub fn interface_ids(&self) -> &[usize] {
        &self.interface_ids
    }

    pub fn n_left(&self) -> usize {
        self.ids_left.len()
    }

    pub fn n_right(&self) -> usize {
        self.ids_right.len()
    }

    pub fn n_atoms(&self) -> usize {
        self.ids_left.len() + self.ids_right.len()
    }

    pub fn n_dof(&self) -> usize {
        3 * self.n_atoms()
    }
}

/// Dense (3·NL) × (3·NR) coupling matrix, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct ForceConstants {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl ForceConstants {
    pub fn from_row_major(rows: usize, cols: usize, data: Vec<f64>) -> ShcResult<Self> {
        if rows % 3 != 0 || cols % 3 != 0 {
            return Err(ShcError::Mismatch(format!(
                "force constant matrix must have 3 rows/cols per atom, got {rows}x{cols}"
            )));
        }
        if data.len() != rows * cols {
            return Err(ShcError::Mismatch(format!(
                "force constant matrix {rows}x{cols} needs {} values, got {}",
                rows * cols,
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.cols;
        &self.data[start..start + self.cols]
    }

    pub(crate) fn zero_row(&mut self, row: usize) {
        let start = row * self.cols;
        for v in &mut self.data[start..start + self.cols] {
            *v = 0.0;
        }
    }

    /// Block counts must agree with the partition: 3 rows per left atom, 3 columns per
    /// right atom.
    pub fn check_partition(&self, partition: &InterfacePartition) -> ShcResult<()> {
        if self.rows / 3 != partition.n_left() || self.cols / 3 != partition.n_right() {
            return Err(ShcError::Mismatch(format!(
                "force constant matrix is (3*{})x(3*{}) but ids_L/ids_R have {}/{} atoms",
                self.rows / 3,
                self.cols / 3,
                partition.n_left(),
                partition.n_right()
            )));
        }
        Ok(())
    }
}
