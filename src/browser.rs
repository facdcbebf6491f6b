//! The interactive frame-browser state machine.
//!
//! [`BrowserSession`] owns every piece of mutable browsing state — current
//! frame index, optional in/out marks, optional crop rectangle, drag
//! state — and processes one external event at a time through
//! [`apply`](BrowserSession::apply). Events either mutate state (frame
//! navigation, marking, dragging) or produce a [`BrowserCommand`]
//! describing a side effect for the caller to dispatch; the machine itself
//! never performs I/O and never blocks, which keeps it testable and
//! backend-agnostic.
//!
//! The drag lifecycle is a two-state machine, `Idle` ↔ `Dragging`,
//! orthogonal to frame navigation: marks and a finalized crop rectangle
//! persist across navigation until explicitly cleared or overwritten.

use std::{
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use crate::{
    crop::CropRect,
    dispatch::ExtractionDispatcher,
    display::{DisplaySurface, FrameOverlay, MousePhase, SurfaceEvent},
    error::FripperError,
    keymap::KeyMap,
    session::FrameSequence,
    timestamp::Timestamp,
};

/// Frame count of a fixed-length clip grabbed with
/// [`BrowserAction::ExtractClipFrames`].
pub const CLIP_FRAME_COUNT: u32 = 33;
/// Frame rate the fixed-length clip is phrased in.
pub const CLIP_FRAME_RATE: u32 = 16;

/// Extraction rate of a nested fine-grained split session.
pub const ZOOM_SPLIT_FPS: u32 = 60;
/// Seconds the nested split rewinds before the current frame.
pub const ZOOM_SPLIT_REWIND_SECONDS: u64 = 1;

/// Number of clips emitted by one [`BrowserAction::MarkWalk`].
pub const WALK_CLIP_COUNT: u32 = 20;
/// Length of each walked clip in seconds.
pub const WALK_CLIP_SECONDS: u64 = 5;
/// Seconds the start mark advances between walked clips.
pub const WALK_STEP_SECONDS: u64 = 4;

/// The fixed set of logical actions a display backend can trigger.
///
/// Backends map their raw key codes onto these through a [`KeyMap`],
/// resolved once at startup, so the state machine never sees a concrete
/// key-encoding scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrowserAction {
    /// Terminate the browsing loop.
    Quit,
    /// Step one frame back.
    PrevFrame,
    /// Step one frame forward.
    NextFrame,
    /// Set the clip start mark at the current frame.
    MarkStart,
    /// Set the clip end mark at the current frame.
    MarkEnd,
    /// Extract the current frame as a still image.
    GrabFrame,
    /// Extract the clip between the two marks.
    ExtractClip,
    /// Extract a fixed-frame-count clip from the start mark.
    ExtractClipFrames,
    /// Emit a batch of overlapping clips walking forward from the start
    /// mark.
    MarkWalk,
    /// Open a nested high-rate split session rewound slightly before the
    /// current frame.
    ZoomSplit,
    /// Clear the crop rectangle.
    DeleteCrop,
}

/// One external input event, as seen by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserEvent {
    /// A logical action resolved from a key press.
    Action(BrowserAction),
    /// Jump straight to a frame index (scrub slider).
    Seek(usize),
    /// Mouse button pressed at image pixel `(x, y)`; enters `Dragging`.
    DragStart { x: u32, y: u32 },
    /// Mouse moved while dragging. `square` pins the rectangle to a fixed
    /// 512x512 size.
    DragMove { x: u32, y: u32, square: bool },
    /// Mouse button released; the rectangle is normalized, clamped to the
    /// frame bounds, and finalized.
    DragEnd { x: u32, y: u32, square: bool },
}

/// A side-effecting command produced by the state machine.
///
/// Commands carry owned copies of every parameter they need, so they can
/// be shipped to a background worker without sharing state with the event
/// loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserCommand {
    /// Extract a single frame.
    GrabFrame {
        /// Source video.
        video: PathBuf,
        /// Absolute position to grab at.
        timestamp: Timestamp,
        /// Optional crop applied during extraction.
        crop: Option<CropRect>,
    },
    /// Extract the clip between two absolute timestamps.
    ExtractClip {
        /// Source video.
        video: PathBuf,
        /// Clip start.
        start: Timestamp,
        /// Clip end; strictly after `start`.
        end: Timestamp,
        /// Optional crop applied during extraction.
        crop: Option<CropRect>,
    },
    /// Extract a clip sized by frame count.
    ExtractClipFrames {
        /// Source video.
        video: PathBuf,
        /// Clip start.
        start: Timestamp,
        /// Number of frames at `fps` the clip should span.
        frame_count: u32,
        /// Frame rate the count is phrased in.
        fps: u32,
        /// Optional crop applied during extraction.
        crop: Option<CropRect>,
    },
    /// Spawn a nested interactive split session over the same video.
    ZoomSplit {
        /// Source video.
        video: PathBuf,
        /// Where the nested rip begins; one second before the current
        /// frame, clamped at zero.
        start: Timestamp,
        /// Extraction rate of the nested session.
        fps: u32,
    },
    /// Extract `clips` overlapping clips, each `clip_seconds` long, with
    /// the start advancing `step_seconds` between them.
    ClipWalk {
        /// Source video.
        video: PathBuf,
        /// Start of the first clip.
        start: Timestamp,
        /// Number of clips to emit.
        clips: u32,
        /// Length of each clip.
        clip_seconds: u64,
        /// Forward step between consecutive clip starts.
        step_seconds: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragState {
    Idle,
    Dragging {
        origin: (u32, u32),
        corner: Option<(u32, u32)>,
    },
}

/// All mutable state of one interactive browsing session.
///
/// Constructed once per invocation and owned exclusively by the event
/// loop; background workers only ever receive owned [`BrowserCommand`]
/// parameter copies.
#[derive(Debug)]
pub struct BrowserSession {
    video: PathBuf,
    fps: u32,
    start_offset: Option<Timestamp>,
    total_frames: usize,
    frame_width: u32,
    frame_height: u32,
    current_frame: usize,
    mark_start: Option<Timestamp>,
    mark_end: Option<Timestamp>,
    crop: Option<CropRect>,
    drag: DragState,
    running: bool,
}

impl BrowserSession {
    /// Create a session over `total_frames` frames extracted from `video`
    /// at `fps`, optionally offset into the source by `start_offset`.
    pub fn new(
        video: &Path,
        fps: u32,
        total_frames: usize,
        start_offset: Option<Timestamp>,
    ) -> Self {
        Self {
            video: video.to_path_buf(),
            fps,
            start_offset,
            total_frames,
            frame_width: 0,
            frame_height: 0,
            current_frame: 0,
            mark_start: None,
            mark_end: None,
            crop: None,
            drag: DragState::Idle,
            running: true,
        }
    }

    /// Record the pixel dimensions of the displayed frames.
    ///
    /// Crop rectangles are clamped against these bounds when a drag is
    /// finalized. Called by the driver after the first frame is decoded.
    pub fn set_frame_dimensions(&mut self, width: u32, height: u32) {
        self.frame_width = width;
        self.frame_height = height;
    }

    /// Index of the frame currently shown.
    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    /// Total number of frames in the session.
    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    /// `false` once a quit event has been processed.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The finalized crop rectangle, if any.
    pub fn crop(&self) -> Option<CropRect> {
        self.crop
    }

    /// The clip start mark, if set. Absolute in the source video.
    pub fn mark_start(&self) -> Option<Timestamp> {
        self.mark_start
    }

    /// The clip end mark, if set. Absolute in the source video.
    pub fn mark_end(&self) -> Option<Timestamp> {
        self.mark_end
    }

    /// The rectangle to draw right now: the in-flight drag preview while
    /// dragging, otherwise the finalized crop.
    pub fn visible_rect(&self) -> Option<CropRect> {
        match self.drag {
            DragState::Dragging {
                origin,
                corner: Some(corner),
            } => CropRect::from_drag(origin, corner, self.frame_width, self.frame_height),
            DragState::Dragging { corner: None, .. } => None,
            DragState::Idle => self.crop,
        }
    }

    /// Absolute timestamp of the current frame.
    ///
    /// The frame-relative timestamp (`index / fps`) shifted by the
    /// session's start offset when the rip did not begin at zero.
    pub fn current_timestamp(&self) -> Timestamp {
        let relative = Timestamp::from_frame(self.current_frame, self.fps);
        match self.start_offset {
            Some(offset) => relative + offset,
            None => relative,
        }
    }

    /// Process one external event.
    ///
    /// Navigation and marking mutate state and return `Ok(None)`.
    /// Extraction events return `Ok(Some(command))` for the caller to
    /// dispatch off the event-processing path. Guard violations are
    /// silently ignored (navigating past either end, extracting a clip
    /// without both marks) except for an inverted interval, which fails
    /// with [`FripperError::InvalidInterval`] so the operator can fix the
    /// marks.
    pub fn apply(
        &mut self,
        event: BrowserEvent,
    ) -> Result<Option<BrowserCommand>, FripperError> {
        match event {
            BrowserEvent::Action(action) => self.apply_action(action),
            BrowserEvent::Seek(index) => {
                if index < self.total_frames {
                    self.current_frame = index;
                }
                Ok(None)
            }
            BrowserEvent::DragStart { x, y } => {
                self.drag = DragState::Dragging {
                    origin: (x, y),
                    corner: None,
                };
                Ok(None)
            }
            BrowserEvent::DragMove { x, y, square } => {
                if let DragState::Dragging { origin, corner } = &mut self.drag {
                    *corner = Some(if square {
                        CropRect::snapped_corner(*origin)
                    } else {
                        (x, y)
                    });
                }
                Ok(None)
            }
            BrowserEvent::DragEnd { x, y, square } => {
                if let DragState::Dragging { origin, .. } = self.drag {
                    let corner = if square {
                        CropRect::snapped_corner(origin)
                    } else {
                        (x, y)
                    };
                    self.crop =
                        CropRect::from_drag(origin, corner, self.frame_width, self.frame_height);
                    self.drag = DragState::Idle;
                    if let Some(rect) = self.crop {
                        log::debug!(
                            "crop finalized: {:?} {:?}",
                            rect.top_left,
                            rect.bottom_right,
                        );
                    }
                }
                Ok(None)
            }
        }
    }

    fn apply_action(
        &mut self,
        action: BrowserAction,
    ) -> Result<Option<BrowserCommand>, FripperError> {
        match action {
            BrowserAction::Quit => {
                self.running = false;
            }
            BrowserAction::PrevFrame => {
                self.current_frame = self.current_frame.saturating_sub(1);
            }
            BrowserAction::NextFrame => {
                if self.current_frame + 1 < self.total_frames {
                    self.current_frame += 1;
                }
            }
            BrowserAction::MarkStart => {
                self.mark_start = Some(self.current_timestamp());
                log::info!("start mark: {}", self.current_timestamp());
            }
            BrowserAction::MarkEnd => {
                self.mark_end = Some(self.current_timestamp());
                log::info!("end mark: {}", self.current_timestamp());
            }
            BrowserAction::DeleteCrop => {
                self.crop = None;
                log::info!("crop box deleted");
            }
            BrowserAction::GrabFrame => {
                return Ok(Some(BrowserCommand::GrabFrame {
                    video: self.video.clone(),
                    timestamp: self.current_timestamp(),
                    crop: self.crop,
                }));
            }
            BrowserAction::ExtractClip => {
                if let (Some(start), Some(end)) = (self.mark_start, self.mark_end) {
                    if end <= start {
                        return Err(FripperError::InvalidInterval { start, end });
                    }
                    return Ok(Some(BrowserCommand::ExtractClip {
                        video: self.video.clone(),
                        start,
                        end,
                        crop: self.crop,
                    }));
                }
            }
            BrowserAction::ExtractClipFrames => {
                if let Some(start) = self.mark_start {
                    return Ok(Some(BrowserCommand::ExtractClipFrames {
                        video: self.video.clone(),
                        start,
                        frame_count: CLIP_FRAME_COUNT,
                        fps: CLIP_FRAME_RATE,
                        crop: self.crop,
                    }));
                }
            }
            BrowserAction::ZoomSplit => {
                return Ok(Some(BrowserCommand::ZoomSplit {
                    video: self.video.clone(),
                    start: self
                        .current_timestamp()
                        .saturating_sub_seconds(ZOOM_SPLIT_REWIND_SECONDS),
                    fps: ZOOM_SPLIT_FPS,
                }));
            }
            BrowserAction::MarkWalk => {
                if let Some(start) = self.mark_start {
                    // The mark ends up past the walked region, ready for
                    // the next batch.
                    self.mark_start =
                        Some(start.add_seconds(WALK_CLIP_COUNT as u64 * WALK_STEP_SECONDS));
                    return Ok(Some(BrowserCommand::ClipWalk {
                        video: self.video.clone(),
                        start,
                        clips: WALK_CLIP_COUNT,
                        clip_seconds: WALK_CLIP_SECONDS,
                        step_seconds: WALK_STEP_SECONDS,
                    }));
                }
            }
        }
        Ok(None)
    }
}

/// Drive a browsing session against a display surface until quit or
/// interrupt.
///
/// One interactive tick: poll the surface for an event, translate it
/// through the key map, feed it to the state machine, and hand any
/// produced command to the dispatcher. Frame images are decoded lazily and
/// cached until navigation changes the index. Command-boundary errors
/// (a rejected interval, an unreadable frame file) are logged and the loop
/// continues; only surface failures are fatal.
///
/// `interrupted` is typically wired to a SIGINT handler; the loop observes
/// it on its next iteration and winds down, releasing the scoped frame
/// directory with everything else.
pub fn run_browser<S: DisplaySurface>(
    session: &mut BrowserSession,
    sequence: &FrameSequence,
    surface: &mut S,
    keymap: &KeyMap<S::KeyCode>,
    dispatcher: &ExtractionDispatcher,
    interrupted: &AtomicBool,
) -> Result<(), FripperError> {
    let mut cached: Option<(usize, image::RgbImage)> = None;
    let mut dirty = true;

    while session.is_running() {
        if interrupted.load(Ordering::Relaxed) {
            log::info!("interrupt received, exiting gracefully");
            break;
        }

        if dirty {
            let index = session.current_frame();
            if cached.as_ref().map(|(cached_index, _)| *cached_index) != Some(index) {
                match sequence.path(index) {
                    Some(path) => match image::open(path) {
                        Ok(decoded) => {
                            let frame = decoded.to_rgb8();
                            session.set_frame_dimensions(frame.width(), frame.height());
                            cached = Some((index, frame));
                        }
                        Err(error) => log::warn!("could not decode frame {index}: {error}"),
                    },
                    None => log::warn!("invalid frame index {index}"),
                }
            }
            if let Some((_, frame)) = &cached {
                let label = format!(
                    "Frame: {}/{}",
                    sequence.display_number(session.current_frame()),
                    session.total_frames(),
                );
                surface.show_frame(
                    frame,
                    &FrameOverlay {
                        label: &label,
                        rect: session.visible_rect(),
                        slider: Some((session.current_frame(), session.total_frames())),
                    },
                )?;
            }
            dirty = false;
        }

        let Some(event) = surface.poll_event(Duration::from_millis(50))? else {
            continue;
        };
        let browser_event = match event {
            SurfaceEvent::Key(code) => match keymap.resolve(&code) {
                Some(action) => BrowserEvent::Action(action),
                None => continue,
            },
            SurfaceEvent::Seek(index) => BrowserEvent::Seek(index),
            SurfaceEvent::Mouse(mouse) => match mouse.phase {
                MousePhase::Down => BrowserEvent::DragStart {
                    x: mouse.x,
                    y: mouse.y,
                },
                MousePhase::Move => BrowserEvent::DragMove {
                    x: mouse.x,
                    y: mouse.y,
                    square: mouse.shift,
                },
                MousePhase::Up => BrowserEvent::DragEnd {
                    x: mouse.x,
                    y: mouse.y,
                    square: mouse.shift,
                },
            },
            SurfaceEvent::Redraw => {
                dirty = true;
                continue;
            }
        };

        match session.apply(browser_event) {
            Ok(Some(command)) => dispatcher.submit(command),
            Ok(None) => {}
            // A failed command never terminates the session.
            Err(error) => log::warn!("{error}"),
        }
        dirty = true;
    }
    Ok(())
}
