//! Lightweight media probing via `ffprobe`.
//!
//! These helpers shell out to `ffprobe` for the two pieces of metadata the
//! rest of the crate needs: total duration (for evenly spaced thumbnail
//! offsets) and the video stream's frame rate (for rebuilding a video
//! after duplicate removal). Nothing is kept open between calls.

use std::{path::Path, process::Command};

use crate::{
    error::FripperError,
    extract::{capture_stdout, ensure_exists},
};

fn probe_entry(video: &Path, section: &str) -> Result<String, FripperError> {
    ensure_exists(video)?;

    let mut command = Command::new("ffprobe");
    command.args([
        "-v",
        "error",
        "-select_streams",
        "v:0",
        "-show_entries",
        section,
        "-of",
        "csv=p=0",
    ]);
    command.arg(video);
    Ok(capture_stdout(command, "ffprobe")?.trim().to_string())
}

fn unparsable(value: &str, what: &str) -> FripperError {
    FripperError::ExternalProcessFailure {
        program: "ffprobe".to_string(),
        status: "exit code 0".to_string(),
        stderr: format!("unparsable {what} output: {value:?}"),
    }
}

/// Probe the total duration of `video` in fractional seconds.
///
/// # Errors
///
/// [`FripperError::InputNotFound`] when the file does not exist, or
/// [`FripperError::ExternalProcessFailure`] when ffprobe fails or returns
/// output that does not parse as a number.
pub fn probe_duration(video: &Path) -> Result<f64, FripperError> {
    let value = probe_entry(video, "format=duration")?;
    value
        .parse::<f64>()
        .map_err(|_| unparsable(&value, "duration"))
}

/// Probe the real frame rate of the first video stream, as fractional
/// frames per second.
///
/// ffprobe reports the rate as a rational such as `30000/1001`; a plain
/// number is also accepted.
pub fn probe_frame_rate(video: &Path) -> Result<f64, FripperError> {
    let value = probe_entry(video, "stream=r_frame_rate")?;

    let rate = match value.split_once('/') {
        Some((numerator, denominator)) => {
            let numerator: f64 = numerator
                .parse()
                .map_err(|_| unparsable(&value, "frame rate"))?;
            let denominator: f64 = denominator
                .parse()
                .map_err(|_| unparsable(&value, "frame rate"))?;
            if denominator == 0.0 {
                return Err(unparsable(&value, "frame rate"));
            }
            numerator / denominator
        }
        None => value
            .parse()
            .map_err(|_| unparsable(&value, "frame rate"))?,
    };
    Ok(rate)
}
