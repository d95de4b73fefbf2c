use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use shc_core::error::{ShcError, ShcResult};
use shc_core::partition::InterfacePartition;

/// Header of a compact velocity file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VelocityHeader {
    pub n_atoms: usize,
    pub stride: usize,
    /// 1-based atom ids in file order.
    pub atom_ids: Vec<usize>,
}

impl VelocityHeader {
    /// Consistency checks against the force-constant side, run before any chunk is read.
    pub fn check_against(
        &self,
        partition: &InterfacePartition,
        dt_md: f64,
        sample_timestep: f64,
    ) -> ShcResult<()> {
        if self.n_atoms != partition.n_atoms() {
            return Err(ShcError::Mismatch(format!(
                "velocity file has {} atoms but the force constant feed has {} (NL={}, NR={})",
                self.n_atoms,
                partition.n_atoms(),
                partition.n_left(),
                partition.n_right()
            )));
        }
        let file_timestep = self.stride as f64 * dt_md;
        let tol = 1e-12 * sample_timestep.abs().max(file_timestep.abs());
        if (file_timestep - sample_timestep).abs() > tol {
            return Err(ShcError::Mismatch(format!(
                "velocity file dump stride {} with dt_md {dt_md} gives timestep {file_timestep}, \
                 configured sample timestep is {sample_timestep}",
                self.stride
            )));
        }
        for (pos, (&file_id, &iface)) in self
            .atom_ids
            .iter()
            .zip(partition.interface_ids().iter())
            .enumerate()
        {
            if file_id != iface + 1 {
                return Err(ShcError::Mismatch(format!(
                    "atom id {file_id} at position {pos} of the velocity file does not match \
                     interface atom {} of the force constant feed",
                    iface + 1
                )));
            }
        }
        Ok(())
    }
}

/// Forward-only reader over a compact velocity file.
///
/// Samples are whitespace separated and may span lines; only the current line is
/// buffered.
pub struct VelocityReader<R: BufRead> {
    inner: R,
    header: VelocityHeader,
    line: String,
    line_no: usize,
    pending: Vec<f64>,
    pending_pos: usize,
}

impl VelocityReader<BufReader<File>> {
    pub fn open(path: &Path) -> ShcResult<Self> {
        let file = File::open(path).map_err(|err| {
            ShcError::Io(std::io::Error::new(
                err.kind(),
                format!("failed to open velocity file {}: {err}", path.display()),
            ))
        })?;
        Self::new(BufReader::new(file))
    }
}

impl<R: BufRead> VelocityReader<R> {
    pub fn new(mut inner: R) -> ShcResult<Self> {
        let mut line = String::new();
        let mut line_no = 0usize;

        let n_atoms = header_value(&mut inner, &mut line, &mut line_no, "atom count")?;
        let stride = header_value(&mut inner, &mut line, &mut line_no, "dump stride")?;
        if !next_line(&mut inner, &mut line, &mut line_no)? {
            return Err(ShcError::Parse(
                "velocity file ends before the atom id list".into(),
            ));
        }

        let mut atom_ids = Vec::new();
        while atom_ids.len() < n_atoms {
            if !next_line(&mut inner, &mut line, &mut line_no)? {
                return Err(ShcError::Parse(format!(
                    "velocity file lists {} of {n_atoms} atom ids",
                    atom_ids.len()
                )));
            }
            for token in line.split_whitespace() {
                if atom_ids.len() == n_atoms {
                    return Err(ShcError::Parse(format!(
                        "unexpected token '{token}' after atom ids on line {line_no}"
                    )));
                }
                let id: usize = token.parse().map_err(|_| {
                    ShcError::Parse(format!("invalid atom id '{token}' on line {line_no}"))
                })?;
                atom_ids.push(id);
            }
        }
        // separator line; a missing one just means there are no samples
        next_line(&mut inner, &mut line, &mut line_no)?;

        Ok(Self {
            inner,
            header: VelocityHeader {
                n_atoms,
                stride,
                atom_ids,
            },
            line,
            line_no,
            pending: Vec::new(),
            pending_pos: 0,
        })
    }

    pub fn header(&self) -> &VelocityHeader {
        &self.header
    }

    /// Reads up to `count` samples into `out` (cleared first). Returns the number read;
    /// fewer than `count` means the stream ended.
    pub fn read_samples(&mut self, count: usize, out: &mut Vec<f64>) -> ShcResult<usize> {
        out.clear();
        out.reserve(count);
        while out.len() < count {
            if self.pending_pos == self.pending.len() && !self.refill()? {
                break;
            }
            let take = (count - out.len()).min(self.pending.len() - self.pending_pos);
            out.extend_from_slice(&self.pending[self.pending_pos..self.pending_pos + take]);
            self.pending_pos += take;
        }
        Ok(out.len())
    }

    /// Discards up to `count` samples. Returns the number skipped.
    pub fn skip_samples(&mut self, count: usize) -> ShcResult<usize> {
        let mut skipped = 0usize;
        while skipped < count {
            if self.pending_pos == self.pending.len() && !self.refill()? {
                break;
            }
            let take = (count - skipped).min(self.pending.len() - self.pending_pos);
            self.pending_pos += take;
            skipped += take;
        }
        Ok(skipped)
    }

    fn refill(&mut self) -> ShcResult<bool> {
        self.pending.clear();
        self.pending_pos = 0;
        while self.pending.is_empty() {
            if !next_line(&mut self.inner, &mut self.line, &mut self.line_no)? {
                return Ok(false);
            }
            for token in self.line.split_whitespace() {
                let value: f64 = token.parse().map_err(|_| {
                    ShcError::Parse(format!(
                        "invalid velocity sample '{token}' on line {}",
                        self.line_no
                    ))
                })?;
                self.pending.push(value);
            }
        }
        Ok(true)
    }
}

fn next_line<R: BufRead>(reader: &mut R, line: &mut String, line_no: &mut usize) -> ShcResult<bool> {
    line.clear();
    let n = reader.read_line(line)?;
    if n == 0 {
        return Ok(false);
    }
    *line_no += 1;
    Ok(true)
}

fn header_value<R: BufRead>(
    reader: &mut R,
    line: &mut String,
    line_no: &mut usize,
    what: &str,
) -> ShcResult<usize> {
    if !next_line(reader, line, line_no)? {
        return Err(ShcError::Parse(format!(
            "velocity file ends before the {what} header line"
        )));
    }
    let token = line.split_whitespace().nth(1).ok_or_else(|| {
        ShcError::Parse(format!(
            "header line {line_no} must have two tokens ({what})"
        ))
    })?;
    token.parse().map_err(|_| {
        ShcError::Parse(format!(
            "invalid {what} '{token}' on header line {line_no}"
        ))
    })
}
