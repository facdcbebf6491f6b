//! Error types for the `fripper` crate.
//!
//! This module defines [`FripperError`], the unified error type returned by
//! all fallible operations in the crate. Errors carry enough context to
//! diagnose the problem without additional logging at the call site: input
//! paths, the external program that failed, captured stderr, and the
//! offending timestamp strings.

use std::{io::Error as IoError, path::PathBuf};

use image::ImageError;
use thiserror::Error;

use crate::timestamp::Timestamp;

/// The unified error type for all `fripper` operations.
///
/// Every public method that can fail returns `Result<T, FripperError>`.
///
/// Errors fall into two propagation classes. Setup errors (frame ripping
/// into a fresh session directory, probing an unreadable file) are fatal to
/// the operation that raised them. Command-boundary errors inside an
/// interactive browsing session (a single failed clip extraction) are
/// reported and the session continues.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FripperError {
    /// The input media file does not exist.
    ///
    /// Checked before any external process is invoked.
    #[error("input file not found: {path}")]
    InputNotFound {
        /// Path that was checked.
        path: PathBuf,
    },

    /// An external `ffmpeg` or `ffprobe` process exited non-zero, or
    /// produced output that could not be interpreted.
    #[error("{program} failed ({status}): {stderr}")]
    ExternalProcessFailure {
        /// The program that was invoked (`ffmpeg` or `ffprobe`).
        program: String,
        /// Exit status description (`exit code 1`, `killed by signal`, ...).
        status: String,
        /// Captured stderr, trimmed.
        stderr: String,
    },

    /// A timestamp string did not match the strict `HH:MM:SS.mmm` form.
    ///
    /// Rejected before any command line is built from it.
    #[error("invalid timestamp (expected HH:MM:SS.mmm): {0:?}")]
    InvalidTimestampFormat(String),

    /// A clip interval's end mark is not strictly after its start mark.
    #[error("invalid clip interval: end ({end}) must be after start ({start})")]
    InvalidInterval {
        /// The start mark.
        start: Timestamp,
        /// The end mark.
        end: Timestamp,
    },

    /// An operation that should have produced frames produced none.
    ///
    /// Raised when a rip yields an empty sequence or duplicate detection is
    /// attempted on a single-frame or unreadable video.
    #[error("no frames to work with: {0}")]
    EmptyResultSet(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// An error from the `image` crate while loading or compositing frames.
    #[error("image processing error: {0}")]
    Image(#[from] ImageError),
}
