//! Background extraction dispatch.
//!
//! Clip and frame extraction block on external ffmpeg processes for
//! multiple seconds, so they must run off the event-processing path. The
//! event loop posts [`BrowserCommand`]s onto an unbounded channel; a
//! single detached worker thread consumes them in order and runs the
//! blocking calls. Completion order relative to subsequent UI events is
//! unspecified, results are reported through the `log` channel, and
//! worker failures never feed back into browser state.
//!
//! The worker is daemon-style: dropping the dispatcher closes the channel
//! and lets the worker drain what it has, but process exit does not wait
//! for it.

use std::thread;

use crossbeam_channel::{Sender, unbounded};

use crate::{browser::BrowserCommand, error::FripperError, extract};

/// A fire-and-forget job queue for extraction commands.
///
/// # Example
///
/// ```no_run
/// use std::path::PathBuf;
/// use fripper::{BrowserCommand, ExtractionDispatcher, Timestamp};
///
/// let dispatcher = ExtractionDispatcher::spawn().unwrap();
/// dispatcher.submit(BrowserCommand::GrabFrame {
///     video: PathBuf::from("video.mp4"),
///     timestamp: Timestamp::from_seconds(5.0),
///     crop: None,
/// });
/// // Extraction proceeds in the background; the call returns immediately.
/// ```
pub struct ExtractionDispatcher {
    sender: Sender<BrowserCommand>,
}

impl ExtractionDispatcher {
    /// Start the worker thread and return a handle for submitting jobs.
    ///
    /// # Errors
    ///
    /// [`FripperError::Io`] when the OS refuses to spawn the worker
    /// thread.
    pub fn spawn() -> Result<Self, FripperError> {
        let (sender, receiver) = unbounded::<BrowserCommand>();
        thread::Builder::new()
            .name("fripper-extract".to_string())
            .spawn(move || {
                for command in receiver {
                    if let Err(error) = run_command(&command) {
                        log::warn!("background extraction failed: {error}");
                    }
                }
            })?;
        Ok(Self { sender })
    }

    /// Queue a command for background execution. Never blocks.
    pub fn submit(&self, command: BrowserCommand) {
        log::debug!("dispatching {command:?}");
        // Send only fails when the worker is gone; at that point the
        // process is shutting down and the job is moot.
        let _ = self.sender.send(command);
    }
}

fn run_command(command: &BrowserCommand) -> Result<(), FripperError> {
    match command {
        BrowserCommand::GrabFrame {
            video,
            timestamp,
            crop,
        } => {
            let path = extract::grab_frame(video, *timestamp, None, *crop)?;
            log::info!("grabbed frame: {}", path.display());
        }
        BrowserCommand::ExtractClip {
            video,
            start,
            end,
            crop,
        } => {
            let path = extract::extract_clip(video, *start, *end, None, *crop)?;
            log::info!("extracted clip: {}", path.display());
        }
        BrowserCommand::ExtractClipFrames {
            video,
            start,
            frame_count,
            fps,
            crop,
        } => {
            let path =
                extract::extract_clip_frames(video, *start, *frame_count, *fps, None, *crop)?;
            log::info!("extracted {}-frame clip: {}", frame_count, path.display());
        }
        BrowserCommand::ZoomSplit { video, start, fps } => {
            extract::spawn_split(video, *start, *fps)?;
        }
        BrowserCommand::ClipWalk {
            video,
            start,
            clips,
            clip_seconds,
            step_seconds,
        } => {
            let mut clip_start = *start;
            for _ in 0..*clips {
                let clip_end = clip_start.add_seconds(*clip_seconds);
                let path = extract::extract_clip(video, clip_start, clip_end, None, None)?;
                log::info!("extracted walk clip: {}", path.display());
                clip_start = clip_start.add_seconds(*step_seconds);
            }
        }
    }
    Ok(())
}
