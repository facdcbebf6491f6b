//! # fripper
//!
//! Browse, grab, clip, and dedupe video frames via external `ffmpeg` and
//! `ffprobe` processes.
//!
//! `fripper` rips a video into a scoped temporary directory of frame
//! images and drives an interactive browser over them: step or scrub
//! through frames, mark clip in/out points, drag a crop rectangle, and
//! fire frame/clip extraction into a background worker without stalling
//! the input loop. A separate pass detects and removes runs of duplicated
//! frames.
//!
//! The crate never decodes video itself — every media operation is a
//! parameter substitution into an `ffmpeg`/`ffprobe` command line run as a
//! blocking subprocess.
//!
//! ## Quick Start
//!
//! ### Grab a single frame
//!
//! ```no_run
//! use std::path::Path;
//! use fripper::{Timestamp, extract::grab_frame};
//!
//! let timestamp: Timestamp = "00:00:05.000".parse().unwrap();
//! let saved = grab_frame(Path::new("video.mp4"), timestamp, None, None).unwrap();
//! println!("saved {}", saved.display()); // video_00-00-05-000.jpg
//! ```
//!
//! ### Browse a frame sequence
//!
//! ```no_run
//! use std::{path::Path, sync::atomic::AtomicBool};
//! use fripper::{
//!     BrowserSession, ExtractionDispatcher, FrameSequence, TerminalSurface,
//!     keymap::terminal_default_keymap, run_browser,
//! };
//!
//! let video = Path::new("video.mp4");
//! let sequence = FrameSequence::materialize(video, 4, None, None, false).unwrap();
//! let mut session =
//!     BrowserSession::new(video, sequence.fps(), sequence.len(), sequence.start_offset());
//! let mut surface = TerminalSurface::new().unwrap();
//! let dispatcher = ExtractionDispatcher::spawn().unwrap();
//! let interrupted = AtomicBool::new(false);
//!
//! run_browser(
//!     &mut session,
//!     &sequence,
//!     &mut surface,
//!     &terminal_default_keymap(),
//!     &dispatcher,
//!     &interrupted,
//! )
//! .unwrap();
//! // The frame directory is removed when `sequence` drops.
//! ```
//!
//! ### Remove duplicate frames
//!
//! ```no_run
//! use std::path::Path;
//! use fripper::dedupe::{self, SimilarityStrategy};
//!
//! let report = dedupe::remove_duplicates(
//!     Path::new("input.mp4"),
//!     Path::new("output.mkv"),
//!     SimilarityStrategy::Histogram,
//!     dedupe::DEFAULT_MIN_RUN,
//!     |_| {},
//! )
//! .unwrap();
//! println!("removed {} of {} frames", report.removed.len(), report.total_frames);
//! ```
//!
//! ## Requirements
//!
//! `ffmpeg` and `ffprobe` must be installed and reachable on `PATH`.
//!
//! ## Logging
//!
//! The library reports through the [`log`](https://crates.io/crates/log)
//! facade; attach any subscriber to see extraction traces and background
//! worker results.

pub mod browser;
pub mod crop;
pub mod dedupe;
pub mod dispatch;
pub mod display;
pub mod error;
pub mod extract;
pub mod keymap;
pub mod probe;
pub mod session;
pub mod thumbnail;
pub mod timestamp;

pub use browser::{
    BrowserAction, BrowserCommand, BrowserEvent, BrowserSession, run_browser,
};
pub use crop::CropRect;
pub use dedupe::{DedupeReport, SimilarityStrategy};
pub use dispatch::ExtractionDispatcher;
pub use display::{DisplaySurface, FrameOverlay, MouseInput, MousePhase, SurfaceEvent, TerminalSurface};
pub use error::FripperError;
pub use keymap::KeyMap;
pub use session::FrameSequence;
pub use timestamp::Timestamp;
