use serde::{Deserialize, Serialize};

use crate::error::{ShcError, ShcResult};
use crate::matrix::ComplexMatrix;
use crate::partition::ForceConstants;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Axis of a degree-of-freedom row laid out as x,y,z per atom.
    pub fn of_row(row: usize) -> Self {
        match row % 3 {
            0 => Axis::X,
            1 => Axis::Y,
            _ => Axis::Z,
        }
    }
}

/// Restricts the heat current to a subset of Cartesian components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    Full,
    /// Keep x and y.
    InPlane,
    /// Keep z.
    OutOfPlane,
}

impl Projection {
    pub fn from_flags(in_plane: bool, out_of_plane: bool) -> ShcResult<Self> {
        match (in_plane, out_of_plane) {
            (false, false) => Ok(Projection::Full),
            (true, false) => Ok(Projection::InPlane),
            (false, true) => Ok(Projection::OutOfPlane),
            (true, true) => Err(ShcError::Config(
                "in_plane and out_of_plane projections cannot be requested together".into(),
            )),
        }
    }

    pub fn keeps(self, axis: Axis) -> bool {
        match self {
            Projection::Full => true,
            Projection::InPlane => axis != Axis::Z,
            Projection::OutOfPlane => axis == Axis::Z,
        }
    }

    pub fn is_full(self) -> bool {
        self == Projection::Full
    }

    /// Copy of `vels` with the rows of dropped axes zeroed.
    pub fn apply_velocities(self, vels: &ComplexMatrix) -> ComplexMatrix {
        let mut out = vels.clone();
        if self.is_full() {
            return out;
        }
        for row in 0..out.rows() {
            if !self.keeps(Axis::of_row(row)) {
                out.zero_row(row);
            }
        }
        out
    }

    /// Copy of `kij` with the left-side rows of dropped axes zeroed.
    pub fn apply_force_constants(self, kij: &ForceConstants) -> ForceConstants {
        let mut out = kij.clone();
        if self.is_full() {
            return out;
        }
        for row in 0..out.rows() {
            if !self.keeps(Axis::of_row(row)) {
                out.zero_row(row);
            }
        }
        out
    }
}
