//! Crude duplicate-frame detection and removal.
//!
//! The detector performs a single sequential pass over a frame sequence,
//! scoring each adjacent pair with a similarity measure. Pairs above the
//! strategy's threshold mark the later frame as a duplicate *candidate*.
//! Candidates are then collapsed into maximal consecutive runs and only
//! runs of at least [`DEFAULT_MIN_RUN`] frames survive — isolated matches
//! are treated as false positives (two adjacent frames of slow motion can
//! score as identical without the video actually stalling).
//!
//! Two similarity measures are available and are *not* assumed to be
//! equivalent: grayscale histogram correlation (very strict threshold)
//! and a windowed structural-similarity score.

use std::{
    fs,
    path::{Path, PathBuf},
};

use image::GrayImage;
use tempfile::TempDir;

use crate::{
    error::FripperError,
    extract::{encode_frame_sequence, ensure_exists},
    probe::probe_frame_rate,
};

/// Minimum consecutive-run length for a candidate run to count as a real
/// duplicate stretch.
pub const DEFAULT_MIN_RUN: usize = 10;

/// Histogram-correlation similarity threshold.
pub const HISTOGRAM_THRESHOLD: f64 = 0.99999;

/// Structural-similarity threshold.
pub const SSIM_THRESHOLD: f64 = 0.99;

/// How two adjacent frames are scored for similarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimilarityStrategy {
    /// Pearson correlation of normalized 256-bin grayscale histograms.
    #[default]
    Histogram,
    /// Mean structural similarity over 8x8 grayscale windows.
    Ssim,
}

impl SimilarityStrategy {
    /// The similarity threshold at or above which a pair counts as a
    /// duplicate.
    pub fn threshold(&self) -> f64 {
        match self {
            SimilarityStrategy::Histogram => HISTOGRAM_THRESHOLD,
            SimilarityStrategy::Ssim => SSIM_THRESHOLD,
        }
    }

    /// Score two grayscale frames. Both measures return values in
    /// `(-1, 1]` where `1.0` is identical.
    pub fn score(&self, first: &GrayImage, second: &GrayImage) -> f64 {
        match self {
            SimilarityStrategy::Histogram => histogram_correlation(first, second),
            SimilarityStrategy::Ssim => structural_similarity(first, second),
        }
    }
}

/// Outcome of a duplicate-removal pass.
#[derive(Debug, Clone)]
pub struct DedupeReport {
    /// Frames compared (total frames in the source).
    pub total_frames: usize,
    /// Raw candidate indices before run filtering.
    pub candidates: Vec<usize>,
    /// Indices actually removed (candidates in sufficiently long runs).
    pub removed: Vec<usize>,
}

/// Sort candidate indices and keep only those belonging to maximal
/// consecutive runs of at least `min_length`.
///
/// ```
/// use fripper::dedupe::filter_consecutive;
///
/// let candidates = vec![1, 2, 3, 7, 8, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 30];
/// assert_eq!(
///     filter_consecutive(candidates, 10),
///     (20..=30).collect::<Vec<_>>(),
/// );
/// ```
pub fn filter_consecutive(mut indices: Vec<usize>, min_length: usize) -> Vec<usize> {
    if indices.is_empty() {
        return Vec::new();
    }
    indices.sort_unstable();

    let mut filtered = Vec::new();
    let mut run: Vec<usize> = vec![indices[0]];
    for &index in &indices[1..] {
        if index == run[run.len() - 1] + 1 {
            run.push(index);
        } else {
            if run.len() >= min_length {
                filtered.extend_from_slice(&run);
            }
            run.clear();
            run.push(index);
        }
    }
    if run.len() >= min_length {
        filtered.extend_from_slice(&run);
    }
    filtered
}

/// Pearson correlation of the two frames' normalized 256-bin histograms.
///
/// This is the `HISTCMP_CORREL` formulation: each histogram is compared
/// against its own mean, so uniform brightness shifts still register as
/// differences in distribution shape.
pub fn histogram_correlation(first: &GrayImage, second: &GrayImage) -> f64 {
    let histogram_of = |frame: &GrayImage| {
        let mut bins = [0.0f64; 256];
        for pixel in frame.pixels() {
            bins[pixel.0[0] as usize] += 1.0;
        }
        let norm = bins.iter().map(|count| count * count).sum::<f64>().sqrt();
        if norm > 0.0 {
            for bin in &mut bins {
                *bin /= norm;
            }
        }
        bins
    };

    let first_bins = histogram_of(first);
    let second_bins = histogram_of(second);

    let first_mean = first_bins.iter().sum::<f64>() / 256.0;
    let second_mean = second_bins.iter().sum::<f64>() / 256.0;

    let mut numerator = 0.0;
    let mut first_variance = 0.0;
    let mut second_variance = 0.0;
    for bin in 0..256 {
        let first_delta = first_bins[bin] - first_mean;
        let second_delta = second_bins[bin] - second_mean;
        numerator += first_delta * second_delta;
        first_variance += first_delta * first_delta;
        second_variance += second_delta * second_delta;
    }

    let denominator = (first_variance * second_variance).sqrt();
    if denominator == 0.0 {
        // Both histograms are flat; identical by any reading.
        1.0
    } else {
        numerator / denominator
    }
}

const SSIM_WINDOW: u32 = 8;

/// Mean structural similarity over non-overlapping 8x8 windows.
///
/// Uses the standard SSIM constants for 8-bit data. Frames of mismatched
/// dimensions score `0.0` (never duplicates).
pub fn structural_similarity(first: &GrayImage, second: &GrayImage) -> f64 {
    if first.dimensions() != second.dimensions() {
        return 0.0;
    }
    let (width, height) = first.dimensions();
    if width < SSIM_WINDOW || height < SSIM_WINDOW {
        return if first.as_raw() == second.as_raw() { 1.0 } else { 0.0 };
    }

    const C1: f64 = 6.5025; // (0.01 * 255)^2
    const C2: f64 = 58.5225; // (0.03 * 255)^2

    let mut total = 0.0;
    let mut windows = 0usize;
    for window_y in (0..height - SSIM_WINDOW + 1).step_by(SSIM_WINDOW as usize) {
        for window_x in (0..width - SSIM_WINDOW + 1).step_by(SSIM_WINDOW as usize) {
            let mut first_sum = 0.0;
            let mut second_sum = 0.0;
            let mut first_squares = 0.0;
            let mut second_squares = 0.0;
            let mut cross = 0.0;
            for y in window_y..window_y + SSIM_WINDOW {
                for x in window_x..window_x + SSIM_WINDOW {
                    let first_value = first.get_pixel(x, y).0[0] as f64;
                    let second_value = second.get_pixel(x, y).0[0] as f64;
                    first_sum += first_value;
                    second_sum += second_value;
                    first_squares += first_value * first_value;
                    second_squares += second_value * second_value;
                    cross += first_value * second_value;
                }
            }
            let count = (SSIM_WINDOW * SSIM_WINDOW) as f64;
            let first_mean = first_sum / count;
            let second_mean = second_sum / count;
            let first_variance = first_squares / count - first_mean * first_mean;
            let second_variance = second_squares / count - second_mean * second_mean;
            let covariance = cross / count - first_mean * second_mean;

            total += ((2.0 * first_mean * second_mean + C1) * (2.0 * covariance + C2))
                / ((first_mean * first_mean + second_mean * second_mean + C1)
                    * (first_variance + second_variance + C2));
            windows += 1;
        }
    }
    total / windows as f64
}

/// Scan a frame sequence for duplicate candidates.
///
/// Compares each adjacent pair with `strategy`, recording the index of the
/// *later* frame when the score reaches the threshold. `on_step` is called
/// once per comparison so callers can drive a progress display.
///
/// # Errors
///
/// [`FripperError::EmptyResultSet`] when the sequence has fewer than two
/// frames, or image decoding errors.
pub fn scan_duplicates(
    frames: &[PathBuf],
    strategy: SimilarityStrategy,
    mut on_step: impl FnMut(usize),
) -> Result<Vec<usize>, FripperError> {
    if frames.len() < 2 {
        return Err(FripperError::EmptyResultSet(format!(
            "{} frame(s) is not enough to compare",
            frames.len(),
        )));
    }

    let threshold = strategy.threshold();
    let mut candidates = Vec::new();
    let mut previous = image::open(&frames[0])?.to_luma8();
    for (index, path) in frames.iter().enumerate().skip(1) {
        let current = image::open(path)?.to_luma8();
        if strategy.score(&previous, &current) >= threshold {
            candidates.push(index);
        }
        previous = current;
        on_step(index);
    }
    log::debug!("{} duplicate candidates", candidates.len());
    Ok(candidates)
}

/// Remove duplicate runs from `video`, writing the rebuilt file to
/// `output`.
///
/// Rips every frame of the source into a scoped temporary directory at
/// its native frame rate, scans for duplicate runs, then re-encodes only
/// the surviving frames at the probed rate (lossless FFV1 in MKV, keeping
/// the source dimensions by construction). The temporary directory is
/// removed on every exit path.
///
/// # Errors
///
/// Unreadable source files fail during the rip or probe; a video with
/// fewer than two frames fails with [`FripperError::EmptyResultSet`]. In
/// both cases no output is produced.
pub fn remove_duplicates(
    video: &Path,
    output: &Path,
    strategy: SimilarityStrategy,
    min_run: usize,
    on_step: impl FnMut(usize),
) -> Result<DedupeReport, FripperError> {
    ensure_exists(video)?;
    let frame_rate = probe_frame_rate(video)?;

    let work_dir = TempDir::new()?;
    let rip_dir = work_dir.path().join("frames");
    fs::create_dir(&rip_dir)?;
    // No fps filter: one image per source frame.
    rip_all_frames(video, &rip_dir)?;

    let mut frames: Vec<PathBuf> = fs::read_dir(&rip_dir)?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .collect();
    frames.sort();

    let candidates = scan_duplicates(&frames, strategy, on_step)?;
    let removed = filter_consecutive(candidates.clone(), min_run);

    let keep_dir = work_dir.path().join("kept");
    fs::create_dir(&keep_dir)?;
    let mut kept = 0usize;
    for (index, frame) in frames.iter().enumerate() {
        if removed.binary_search(&index).is_ok() {
            continue;
        }
        kept += 1;
        let destination = keep_dir.join(format!("frame_{kept:06}.png"));
        // Hard links avoid copying frame data within the same filesystem.
        if fs::hard_link(frame, &destination).is_err() {
            fs::copy(frame, &destination)?;
        }
    }

    encode_frame_sequence(&keep_dir, "frame_%06d.png", frame_rate, output)?;
    log::info!(
        "removed {} of {} frames, rebuilt {}",
        removed.len(),
        frames.len(),
        output.display(),
    );

    Ok(DedupeReport {
        total_frames: frames.len(),
        candidates,
        removed,
    })
}

/// Rip every source frame losslessly, one PNG per frame.
fn rip_all_frames(video: &Path, output_directory: &Path) -> Result<(), FripperError> {
    ensure_exists(video)?;
    crate::extract::run_ffmpeg(vec![
        "-i".into(),
        video.into(),
        output_directory.join("frame_%06d.png").into(),
    ])
}
