//! Thumbnail generation utilities.
//!
//! Helpers for grabbing a small set of evenly spaced preview frames from a
//! video and compositing them into a contact-sheet grid. Positions are the
//! *inner* divisions of the duration — `k * duration / (n + 1)` for
//! `k = 1..=n` — so neither the first nor the last instant of the video is
//! sampled.

use std::path::{Path, PathBuf};

use image::{GenericImage, RgbImage, imageops};

use crate::{error::FripperError, extract::grab_frame, probe::probe_duration, timestamp::Timestamp};

/// Number of thumbnails grabbed by default.
pub const DEFAULT_THUMBNAIL_COUNT: usize = 4;

/// Compute `count` evenly spaced inner positions across `duration` seconds.
///
/// ```
/// use fripper::thumbnail::inner_positions;
///
/// let positions = inner_positions(10.0, 4);
/// assert_eq!(positions, vec![2.0, 4.0, 6.0, 8.0]);
/// ```
pub fn inner_positions(duration: f64, count: usize) -> Vec<f64> {
    (1..=count)
        .map(|k| k as f64 * duration / (count + 1) as f64)
        .collect()
}

/// Grab [`DEFAULT_THUMBNAIL_COUNT`] thumbnails from `video`.
///
/// Probes the duration, then grabs one frame per inner position. Returns
/// the produced paths in position order.
///
/// # Errors
///
/// Propagates probe and extraction failures; a single failed grab aborts
/// the batch.
pub fn grab_thumbnails(
    video: &Path,
    output_directory: Option<&Path>,
) -> Result<Vec<PathBuf>, FripperError> {
    let duration = probe_duration(video)?;
    let mut paths = Vec::with_capacity(DEFAULT_THUMBNAIL_COUNT);
    for position in inner_positions(duration, DEFAULT_THUMBNAIL_COUNT) {
        let timestamp = Timestamp::from_seconds(position.round());
        paths.push(grab_frame(video, timestamp, output_directory, None)?);
    }
    Ok(paths)
}

/// Composite thumbnail images into a two-column contact sheet.
///
/// Each image is halved, then placed left-to-right, top-to-bottom. All
/// inputs are resized to the dimensions of the first, so mixed sizes do
/// not tear the grid.
///
/// # Errors
///
/// [`FripperError::EmptyResultSet`] when `paths` is empty, or image
/// decoding errors.
pub fn thumbnail_grid(paths: &[PathBuf]) -> Result<RgbImage, FripperError> {
    let Some(first) = paths.first() else {
        return Err(FripperError::EmptyResultSet(
            "no thumbnails to composite".to_string(),
        ));
    };

    let first = image::open(first)?.to_rgb8();
    let cell_width = (first.width() / 2).max(1);
    let cell_height = (first.height() / 2).max(1);

    let columns = 2u32;
    let rows = (paths.len() as u32).div_ceil(columns);
    let mut sheet = RgbImage::new(cell_width * columns, cell_height * rows);

    for (index, path) in paths.iter().enumerate() {
        let thumbnail = imageops::resize(
            &image::open(path)?.to_rgb8(),
            cell_width,
            cell_height,
            imageops::FilterType::Triangle,
        );
        let column = index as u32 % columns;
        let row = index as u32 / columns;
        sheet.copy_from(&thumbnail, column * cell_width, row * cell_height)?;
    }
    Ok(sheet)
}
