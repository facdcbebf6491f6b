//! Scoped frame sequences for one browsing session.
//!
//! [`FrameSequence`] materializes a video into an ordered set of image
//! files inside a temporary directory that lives exactly as long as the
//! session: the directory is created on setup, filled by a single
//! `ffmpeg` rip, and removed on every exit path when the sequence is
//! dropped.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::{error::FripperError, extract::rip_frames, timestamp::Timestamp};

/// The filename pattern handed to ffmpeg for session rips.
const FRAME_PATTERN: &str = "frame_%05d.jpg";

/// An ordered collection of extracted frame files, scoped to a temporary
/// directory.
///
/// Frames are indexed from zero internally; [`display_number`]
/// (FrameSequence::display_number) gives the 1-based number shown to the
/// operator.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use fripper::{FrameSequence, FripperError};
///
/// let sequence = FrameSequence::materialize(Path::new("video.mp4"), 4, None, None, false)?;
/// println!("{} frames extracted", sequence.len());
/// // Temp directory removed when `sequence` is dropped.
/// # Ok::<(), FripperError>(())
/// ```
#[derive(Debug)]
pub struct FrameSequence {
    temp_dir: TempDir,
    frames: Vec<PathBuf>,
    fps: u32,
    start: Option<Timestamp>,
}

impl FrameSequence {
    /// Rip `video` into a fresh temporary directory at `fps` frames per
    /// second and collect the produced files in name order.
    ///
    /// `start` windows the rip to begin at that offset, with an optional
    /// `duration` in seconds; `nvidia` requests CUDA decoding.
    ///
    /// Setup failures here are fatal to the session: a missing input,
    /// ffmpeg exiting non-zero, or a rip that produces no frames at all
    /// ([`FripperError::EmptyResultSet`]).
    pub fn materialize(
        video: &Path,
        fps: u32,
        start: Option<Timestamp>,
        duration: Option<f64>,
        nvidia: bool,
    ) -> Result<Self, FripperError> {
        let temp_dir = TempDir::new()?;
        rip_frames(video, temp_dir.path(), FRAME_PATTERN, fps, start, duration, nvidia)?;

        let mut frames: Vec<PathBuf> = std::fs::read_dir(temp_dir.path())?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .collect();
        frames.sort();

        if frames.is_empty() {
            return Err(FripperError::EmptyResultSet(format!(
                "ripping {} produced no frames",
                video.display(),
            )));
        }
        log::debug!(
            "materialized {} frames in {}",
            frames.len(),
            temp_dir.path().display(),
        );

        Ok(Self {
            temp_dir,
            frames,
            fps,
            start,
        })
    }

    /// Number of frames in the sequence.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// `true` when the sequence holds no frames.
    ///
    /// Cannot happen for a successfully materialized sequence; provided
    /// for API completeness.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Path of the frame at `index`, or `None` out of range.
    pub fn path(&self, index: usize) -> Option<&Path> {
        self.frames.get(index).map(PathBuf::as_path)
    }

    /// 1-based frame number for operator-facing display.
    pub fn display_number(&self, index: usize) -> usize {
        index + 1
    }

    /// Extraction rate the sequence was ripped at.
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Start offset of the rip, if any.
    ///
    /// Frame-relative timestamps must be shifted by this offset to address
    /// the source video absolutely.
    pub fn start_offset(&self) -> Option<Timestamp> {
        self.start
    }

    /// The scoped directory holding the frame files.
    pub fn directory(&self) -> &Path {
        self.temp_dir.path()
    }
}
