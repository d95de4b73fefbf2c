use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

mod common;
use common::{config, file_ids, sinusoid, two_by_two, velocity_path, write_fc, write_velocity_file};
use shc_core::error::ShcError;
use shc_engine::run::{SpectralRun, StopReason, StreamState};
use shc_io::feed::load_feed;
use shc_io::snapshot::Snapshot;
use shc_io::velocity::VelocityReader;

#[test]
fn single_tone_peaks_at_its_bin() {
    let dir = tempfile::tempdir().unwrap();
    let (partition, kij) = two_by_two(2.5);
    let prefix = write_fc(dir.path(), &partition, &kij);
    let vel = velocity_path(dir.path());
    let omega0 = 2.0 * PI * 2.0 / 8.0;
    write_velocity_file(&vel, &file_ids(), 1, 12, &sinusoid(32, omega0));

    let feed = load_feed(&prefix).unwrap();
    let summary = SpectralRun::open(config(&vel, &prefix, 8, 4), &feed)
        .unwrap()
        .run()
        .unwrap();
    let result = summary.result;
    assert_eq!(summary.stop, StopReason::ChunkCount);
    assert_eq!(result.n_chunks, 4);
    assert_eq!(result.len(), 5);
    assert_eq!(result.shc_smooth[0], 0.0);

    let peak = (1..result.len())
        .max_by(|&a, &b| {
            result.shc_smooth[a]
                .abs()
                .partial_cmp(&result.shc_smooth[b].abs())
                .unwrap()
        })
        .unwrap();
    assert_eq!(peak, 2);
    assert!((result.omega[peak] - omega0).abs() < 1e-12);
    // 6 dof · 2.5 · |4 · 4| = 240, then -2/ω₂ and 1/(8·1)
    let expected = -2.0 * 240.0 / omega0 / 8.0;
    assert!((result.shc_smooth[2] - expected).abs() < 1e-9 * expected.abs());
    for i in [1, 3, 4] {
        assert!(result.shc_smooth[i].abs() < 1e-9, "bin {i}: {}", result.shc_smooth[i]);
    }
    assert_eq!(result.shc_average, result.shc_smooth);
    let err = result.shc_error.expect("four chunks give an error estimate");
    assert!(err.iter().all(|e| e.abs() < 1e-4));
}

#[test]
fn short_later_chunk_is_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let (partition, kij) = two_by_two(1.0);
    let prefix = write_fc(dir.path(), &partition, &kij);
    let vel = velocity_path(dir.path());
    let mut rng = StdRng::seed_from_u64(11);
    let samples: Vec<f64> = (0..29 * 12).map(|_| rng.gen_range(-1.0..1.0)).collect();
    write_velocity_file(&vel, &file_ids(), 1, 12, &samples);

    let feed = load_feed(&prefix).unwrap();
    let mut run = SpectralRun::open(config(&vel, &prefix, 8, 5), &feed).unwrap();
    for _ in 0..3 {
        assert_eq!(run.step().unwrap(), StreamState::Reading);
    }
    let after_three = run.aggregator().clone();
    assert_eq!(after_three.count(), 3);
    assert_eq!(run.step().unwrap(), StreamState::ShortLaterChunk);
    assert_eq!(run.aggregator(), &after_three);
    assert_eq!(run.step().unwrap(), StreamState::Done);

    let summary = run.finish().unwrap();
    assert_eq!(summary.stop, StopReason::ShortLaterChunk);
    assert_eq!(summary.result.n_chunks, 3);
    assert_eq!(summary.result.chunk_size, 8);
    assert_eq!(summary.result.shc_smooth, after_three.mean());
    assert!(summary.result.shc_error.is_some());
}

#[test]
fn short_first_chunk_shrinks_grid() {
    let dir = tempfile::tempdir().unwrap();
    let (partition, kij) = two_by_two(1.0);
    let prefix = write_fc(dir.path(), &partition, &kij);
    let vel = velocity_path(dir.path());
    let mut rng = StdRng::seed_from_u64(3);
    let samples: Vec<f64> = (0..5 * 12).map(|_| rng.gen_range(-1.0..1.0)).collect();
    write_velocity_file(&vel, &file_ids(), 1, 12, &samples);

    let feed = load_feed(&prefix).unwrap();
    let summary = SpectralRun::open(config(&vel, &prefix, 8, 4), &feed)
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(summary.stop, StopReason::ShortFirstChunk);
    assert_eq!(summary.result.n_chunks, 1);
    assert_eq!(summary.result.chunk_size, 5);
    assert_eq!(summary.result.len(), 5 / 2 + 1);
    assert_eq!(summary.result.shc_smooth.len(), 3);
    assert_eq!(summary.result.shc_average.len(), 3);
    assert!(summary.result.shc_error.is_none());
    assert_eq!(summary.result.shc_smooth[0], 0.0);
    assert!((summary.result.omega[1] - 2.0 * PI / 5.0).abs() < 1e-12);
}

#[test]
fn end_of_stream_keeps_completed_chunks() {
    let dir = tempfile::tempdir().unwrap();
    let (partition, kij) = two_by_two(1.0);
    let prefix = write_fc(dir.path(), &partition, &kij);
    let vel = velocity_path(dir.path());
    write_velocity_file(&vel, &file_ids(), 1, 12, &sinusoid(16, 0.7));

    let feed = load_feed(&prefix).unwrap();
    let summary = SpectralRun::open(config(&vel, &prefix, 8, 6), &feed)
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(summary.stop, StopReason::EndOfStream);
    assert_eq!(summary.result.n_chunks, 2);
}

#[test]
fn empty_stream_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let (partition, kij) = two_by_two(1.0);
    let prefix = write_fc(dir.path(), &partition, &kij);
    let vel = velocity_path(dir.path());
    write_velocity_file(&vel, &file_ids(), 1, 12, &[]);

    let feed = load_feed(&prefix).unwrap();
    let err = SpectralRun::open(config(&vel, &prefix, 8, 2), &feed)
        .unwrap()
        .run()
        .unwrap_err();
    assert!(matches!(err, ShcError::NoData(_)));
}

#[test]
fn single_timestep_first_chunk_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let (partition, kij) = two_by_two(1.0);
    let prefix = write_fc(dir.path(), &partition, &kij);
    let vel = velocity_path(dir.path());
    write_velocity_file(&vel, &file_ids(), 1, 12, &sinusoid(1, 0.3));

    let feed = load_feed(&prefix).unwrap();
    let err = SpectralRun::open(config(&vel, &prefix, 8, 2), &feed)
        .unwrap()
        .run()
        .unwrap_err();
    assert!(matches!(err, ShcError::NoData(_)));
}

#[test]
fn atom_id_drift_fails_before_processing() {
    let dir = tempfile::tempdir().unwrap();
    let (partition, kij) = two_by_two(1.0);
    let prefix = write_fc(dir.path(), &partition, &kij);
    let vel = velocity_path(dir.path());
    let mut ids = file_ids();
    ids[2] += 1;
    write_velocity_file(&vel, &ids, 1, 12, &sinusoid(16, 0.3));

    let feed = load_feed(&prefix).unwrap();
    let err = SpectralRun::open(config(&vel, &prefix, 8, 2), &feed)
        .err()
        .expect("id mismatch must fail");
    assert!(matches!(err, ShcError::Mismatch(_)));
    assert!(err.to_string().contains("position 2"));
}

#[test]
fn header_count_and_stride_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let (partition, kij) = two_by_two(1.0);
    let prefix = write_fc(dir.path(), &partition, &kij);
    let feed = load_feed(&prefix).unwrap();

    let vel = velocity_path(dir.path());
    write_velocity_file(&vel, &file_ids(), 2, 12, &sinusoid(16, 0.3));
    let err = SpectralRun::open(config(&vel, &prefix, 8, 2), &feed)
        .err()
        .expect("stride mismatch must fail");
    assert!(err.to_string().contains("stride"));

    let mut ids = file_ids();
    ids.push(99);
    write_velocity_file(&vel, &ids, 1, 15, &[]);
    let err = SpectralRun::open(config(&vel, &prefix, 8, 2), &feed)
        .err()
        .expect("atom count mismatch must fail");
    assert!(matches!(err, ShcError::Mismatch(_)));
}

#[test]
fn both_projections_compute_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let (partition, kij) = two_by_two(1.0);
    let prefix = write_fc(dir.path(), &partition, &kij);
    let vel = velocity_path(dir.path());
    write_velocity_file(&vel, &file_ids(), 1, 12, &sinusoid(16, 0.3));

    let feed = load_feed(&prefix).unwrap();
    let mut cfg = config(&vel, &prefix, 8, 2);
    cfg.in_plane = true;
    cfg.out_of_plane = true;
    let err = SpectralRun::open(cfg, &feed).err().expect("config error");
    assert!(matches!(err, ShcError::Config(_)));
}

#[test]
fn in_and_out_of_plane_split_the_current() {
    let dir = tempfile::tempdir().unwrap();
    let (partition, kij) = two_by_two(1.5);
    let prefix = write_fc(dir.path(), &partition, &kij);
    let vel = velocity_path(dir.path());
    let mut rng = StdRng::seed_from_u64(5);
    let samples: Vec<f64> = (0..16 * 12).map(|_| rng.gen_range(-1.0..1.0)).collect();
    write_velocity_file(&vel, &file_ids(), 1, 12, &samples);
    let feed = load_feed(&prefix).unwrap();

    let run_with = |in_plane: bool, out_of_plane: bool| {
        let mut cfg = config(&vel, &prefix, 8, 2);
        cfg.in_plane = in_plane;
        cfg.out_of_plane = out_of_plane;
        SpectralRun::open(cfg, &feed).unwrap().run().unwrap().result
    };
    let full = run_with(false, false);
    let xy = run_with(true, false);
    let z = run_with(false, true);
    // K is diagonal, so the axes decouple and the parts add up
    for i in 0..full.len() {
        let sum = xy.shc_average[i] + z.shc_average[i];
        assert!((full.shc_average[i] - sum).abs() < 1e-9 * (1.0 + full.shc_average[i].abs()));
    }
}

#[test]
fn checkpoint_resume_matches_uninterrupted_run() {
    let dir = tempfile::tempdir().unwrap();
    let (partition, kij) = two_by_two(0.8);
    let prefix = write_fc(dir.path(), &partition, &kij);
    let vel = velocity_path(dir.path());
    let mut rng = StdRng::seed_from_u64(42);
    let samples: Vec<f64> = (0..32 * 12).map(|_| rng.gen_range(-1.0..1.0)).collect();
    write_velocity_file(&vel, &file_ids(), 1, 12, &samples);
    let feed = load_feed(&prefix).unwrap();

    let full = SpectralRun::open(config(&vel, &prefix, 8, 4), &feed)
        .unwrap()
        .run()
        .unwrap()
        .result;

    let backup = dir.path().join("backup").to_string_lossy().to_string();
    let mut first = config(&vel, &prefix, 8, 2);
    first.backup_prefix = Some(backup.clone());
    let partial = SpectralRun::open(first, &feed).unwrap().run().unwrap();
    assert_eq!(partial.result.n_chunks, 2);

    let snapshot = Snapshot::load(&Snapshot::path_for(&backup)).unwrap();
    assert_eq!(snapshot.chunks_done, 2);
    for (a, b) in snapshot.shc_smooth.iter().zip(partial.result.shc_smooth.iter()) {
        assert!((a - b).abs() < 1e-12);
    }
    assert!(Snapshot::table_path_for(&backup).is_file());

    let reader = VelocityReader::open(&vel).unwrap();
    let resumed = SpectralRun::resume(config(&vel, &prefix, 8, 4), &feed, reader, &snapshot)
        .unwrap()
        .run()
        .unwrap()
        .result;
    assert_eq!(resumed.n_chunks, 4);
    for i in 0..full.len() {
        assert!((resumed.shc_smooth[i] - full.shc_smooth[i]).abs() < 1e-12);
        assert!((resumed.shc_average[i] - full.shc_average[i]).abs() < 1e-12);
    }
    let (a, b) = (resumed.shc_error.unwrap(), full.shc_error.unwrap());
    for i in 0..a.len() {
        assert!((a[i] - b[i]).abs() < 1e-12);
    }
}

#[test]
fn resume_rejects_other_chunk_size() {
    let dir = tempfile::tempdir().unwrap();
    let (partition, kij) = two_by_two(1.0);
    let prefix = write_fc(dir.path(), &partition, &kij);
    let vel = velocity_path(dir.path());
    write_velocity_file(&vel, &file_ids(), 1, 12, &sinusoid(32, 0.4));
    let feed = load_feed(&prefix).unwrap();

    let backup = dir.path().join("bk").to_string_lossy().to_string();
    let mut cfg = config(&vel, &prefix, 8, 1);
    cfg.backup_prefix = Some(backup.clone());
    SpectralRun::open(cfg, &feed).unwrap().run().unwrap();
    let snapshot = Snapshot::load(&Snapshot::path_for(&backup)).unwrap();

    let reader = VelocityReader::open(&vel).unwrap();
    let err = SpectralRun::resume(config(&vel, &prefix, 4, 4), &feed, reader, &snapshot)
        .err()
        .expect("chunk size mismatch");
    assert!(matches!(err, ShcError::Mismatch(_)));
}

#[test]
fn resume_rejects_changed_spectral_options() {
    let dir = tempfile::tempdir().unwrap();
    let (partition, kij) = two_by_two(1.0);
    let prefix = write_fc(dir.path(), &partition, &kij);
    let vel = velocity_path(dir.path());
    write_velocity_file(&vel, &file_ids(), 1, 12, &sinusoid(32, 0.4));
    let feed = load_feed(&prefix).unwrap();

    let backup = dir.path().join("bk").to_string_lossy().to_string();
    let mut cfg = config(&vel, &prefix, 8, 2);
    cfg.backup_prefix = Some(backup.clone());
    SpectralRun::open(cfg, &feed).unwrap().run().unwrap();
    let snapshot = Snapshot::load(&Snapshot::path_for(&backup)).unwrap();

    let mut rescaled = config(&vel, &prefix, 8, 4);
    rescaled.scale_factor = 1000.0;
    rescaled.out_of_plane = true;
    let reader = VelocityReader::open(&vel).unwrap();
    let err = SpectralRun::resume(rescaled, &feed, reader, &snapshot)
        .err()
        .expect("scale change must be rejected");
    assert!(matches!(err, ShcError::Mismatch(_)));
    assert!(err.to_string().contains("scale_factor"));

    let mut smoothed = config(&vel, &prefix, 8, 4);
    smoothed.width_win = 0.5;
    let reader = VelocityReader::open(&vel).unwrap();
    let err = SpectralRun::resume(smoothed, &feed, reader, &snapshot)
        .err()
        .expect("smoothing change must be rejected");
    assert!(err.to_string().contains("width_win"));

    let mut shifted = snapshot.clone();
    shifted.omega[3] *= 1.5;
    let reader = VelocityReader::open(&vel).unwrap();
    let err = SpectralRun::resume(config(&vel, &prefix, 8, 4), &feed, reader, &shifted)
        .err()
        .expect("foreign frequency grid must be rejected");
    assert!(err.to_string().contains("frequency bin 3"));

    let reader = VelocityReader::open(&vel).unwrap();
    let mut longer = config(&vel, &prefix, 8, 4);
    longer.backup_prefix = Some(backup);
    let resumed = SpectralRun::resume(longer, &feed, reader, &snapshot)
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(resumed.result.n_chunks, 4);
}
