use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use shc_core::error::ShcResult;
use shc_core::result::SpectralResult;

use crate::feed::write_json;

/// One row per frequency bin: omega, smoothed mean, unsmoothed mean and, when defined,
/// the standard error.
pub fn write_table(path: &Path, result: &SpectralResult) -> ShcResult<()> {
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(
        file,
        "# chunks {} chunk_size {} bins {}",
        result.n_chunks,
        result.chunk_size,
        result.len()
    )?;
    match &result.shc_error {
        Some(_) => writeln!(file, "# omega shc_smooth shc_average shc_error")?,
        None => writeln!(file, "# omega shc_smooth shc_average")?,
    }
    for i in 0..result.len() {
        write!(
            file,
            "{:>23.16e} {:>23.16e} {:>23.16e}",
            result.omega[i], result.shc_smooth[i], result.shc_average[i]
        )?;
        if let Some(err) = &result.shc_error {
            write!(file, " {:>23.16e}", err[i])?;
        }
        writeln!(file)?;
    }
    file.flush()?;
    Ok(())
}

pub fn write_result_json(path: &Path, result: &SpectralResult) -> ShcResult<()> {
    write_json(path, result)
}
