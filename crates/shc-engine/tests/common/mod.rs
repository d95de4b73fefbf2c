#![allow(dead_code)]

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use shc_core::config::ShcConfig;
use shc_core::partition::{ForceConstants, InterfacePartition};
use shc_io::feed::write_feed;

pub const INTERFACE_IDS: [usize; 4] = [10, 11, 12, 13];

/// NL = 2, NR = 2, K = `scale` · I (6×6).
pub fn two_by_two(scale: f64) -> (InterfacePartition, ForceConstants) {
    let partition =
        InterfacePartition::new(vec![0, 1], vec![2, 3], INTERFACE_IDS.to_vec()).unwrap();
    let mut data = vec![0.0; 36];
    for i in 0..6 {
        data[i * 6 + i] = scale;
    }
    let kij = ForceConstants::from_row_major(6, 6, data).unwrap();
    (partition, kij)
}

pub fn write_fc(dir: &Path, partition: &InterfacePartition, kij: &ForceConstants) -> String {
    let prefix = dir.join("fc").to_string_lossy().to_string();
    write_feed(&prefix, partition, kij).unwrap();
    prefix
}

/// Compact velocity file with one timestep (all degrees of freedom) per line.
pub fn write_velocity_file(
    path: &Path,
    file_ids: &[usize],
    stride: usize,
    n_dof: usize,
    samples: &[f64],
) {
    let mut text = String::new();
    writeln!(text, "Atoms: {}", file_ids.len()).unwrap();
    writeln!(text, "Stride: {stride}").unwrap();
    writeln!(text, "Atom ids:").unwrap();
    let ids: Vec<String> = file_ids.iter().map(|id| id.to_string()).collect();
    writeln!(text, "{}", ids.join(" ")).unwrap();
    writeln!(text, "------").unwrap();
    for step in samples.chunks(n_dof) {
        let row: Vec<String> = step.iter().map(|v| format!("{v:.17e}")).collect();
        writeln!(text, "{}", row.join(" ")).unwrap();
    }
    fs::write(path, text).unwrap();
}

/// 1-based ids matching `INTERFACE_IDS`.
pub fn file_ids() -> Vec<usize> {
    INTERFACE_IDS.iter().map(|id| id + 1).collect()
}

/// Left atoms move as cos(ω t), right atoms as sin(ω t) on every axis.
pub fn sinusoid(n_steps: usize, omega: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(n_steps * 12);
    for t in 0..n_steps {
        let phase = omega * t as f64;
        for atom in 0..4 {
            let v = if atom < 2 { phase.cos() } else { phase.sin() };
            out.extend_from_slice(&[v, v, v]);
        }
    }
    out
}

pub fn config(velocity_file: &Path, prefix: &str, chunk_size: usize, n_chunks: usize) -> ShcConfig {
    let mut cfg = ShcConfig::new(velocity_file.to_string_lossy(), prefix);
    cfg.dt_md = 1.0;
    cfg.dn = 1;
    cfg.chunk_size = Some(chunk_size);
    cfg.n_chunks = n_chunks;
    cfg.width_win = 0.1;
    cfg
}

pub fn velocity_path(dir: &Path) -> PathBuf {
    dir.join("vels.compact.dat")
}
