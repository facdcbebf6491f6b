//! Display and input surfaces.
//!
//! [`DisplaySurface`] is the seam between the browser core and whatever is
//! actually drawing pixels: it shows an image buffer with an overlay,
//! and polls for raw input events (key codes, mouse button/move/up with
//! pixel coordinates and a shift flag). The core maps key codes to
//! actions through a [`KeyMap`](crate::KeyMap) and never assumes a
//! concrete encoding scheme.
//!
//! [`TerminalSurface`] is the shipped backend. It renders frames into the
//! terminal as half-block truecolor cells (one character covers two
//! vertically stacked pixels), captures mouse events, draws a scrub
//! slider on the bottom row, and translates cell coordinates back into
//! image-pixel coordinates. Terminal state — raw mode, alternate screen,
//! mouse capture — is restored when the surface is dropped, on every exit
//! path.

use std::{
    hash::Hash,
    io::{BufWriter, Stdout, Write, stdout},
    time::Duration,
};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers, MouseButton,
        MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use image::{Rgb, RgbImage, imageops};

use crate::{crop::CropRect, error::FripperError};

/// Overlay drawn on top of a frame.
pub struct FrameOverlay<'a> {
    /// Status text, e.g. `Frame: 12/40`.
    pub label: &'a str,
    /// Rectangle to outline, in image-pixel coordinates.
    pub rect: Option<CropRect>,
    /// Scrub slider as `(current_index, total_frames)`.
    pub slider: Option<(usize, usize)>,
}

/// Which phase of a mouse drag an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MousePhase {
    /// Button pressed.
    Down,
    /// Moved with the button held.
    Move,
    /// Button released.
    Up,
}

/// One mouse event, already translated into image-pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseInput {
    /// Drag phase.
    pub phase: MousePhase,
    /// Horizontal position in image pixels.
    pub x: u32,
    /// Vertical position in image pixels.
    pub y: u32,
    /// Whether shift was held (fixed-square crop snap).
    pub shift: bool,
}

/// One polled input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent<K> {
    /// A raw key code, to be resolved through a key map.
    Key(K),
    /// A mouse event over the image area.
    Mouse(MouseInput),
    /// A request to jump to a frame index (click on the slider).
    Seek(usize),
    /// The surface needs the current frame drawn again (resize).
    Redraw,
}

/// A rectangular image display with raw input polling.
pub trait DisplaySurface {
    /// The backend's raw key code type, resolvable through a
    /// [`KeyMap`](crate::KeyMap).
    type KeyCode: Eq + Hash;

    /// Show `frame` with `overlay` drawn on top.
    fn show_frame(
        &mut self,
        frame: &RgbImage,
        overlay: &FrameOverlay<'_>,
    ) -> Result<(), FripperError>;

    /// Wait up to `timeout` for one input event.
    ///
    /// Returns `Ok(None)` when no event arrived in time.
    fn poll_event(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<SurfaceEvent<Self::KeyCode>>, FripperError>;
}

const OVERLAY_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Geometry of the most recent render, kept to translate mouse cells back
/// into image pixels and slider clicks into frame indices.
#[derive(Debug, Clone, Copy, Default)]
struct RenderGeometry {
    image_width: u32,
    image_height: u32,
    display_columns: u16,
    slider_row: u16,
    total_frames: usize,
}

/// Crossterm-backed terminal display.
///
/// Rendering uses the upper-half-block character `▀` with independent
/// foreground (top pixel) and background (bottom pixel) colors, giving a
/// vertical resolution of two pixels per terminal row.
pub struct TerminalSurface {
    writer: BufWriter<Stdout>,
    geometry: RenderGeometry,
}

impl TerminalSurface {
    /// Take over the terminal: raw mode, alternate screen, hidden cursor,
    /// mouse capture.
    pub fn new() -> Result<Self, FripperError> {
        terminal::enable_raw_mode()?;
        let mut writer = BufWriter::with_capacity(1 << 20, stdout());
        execute!(writer, EnterAlternateScreen, Hide, EnableMouseCapture)?;
        Ok(Self {
            writer,
            geometry: RenderGeometry::default(),
        })
    }

    /// Map a terminal cell to image-pixel coordinates using the last
    /// render's scaling.
    fn cell_to_pixel(&self, column: u16, row: u16) -> (u32, u32) {
        let geometry = &self.geometry;
        if geometry.display_columns == 0 || geometry.slider_row == 0 {
            return (0, 0);
        }
        let display_pixel_rows = geometry.slider_row as u32 * 2;
        let x = column as u32 * geometry.image_width / geometry.display_columns as u32;
        let y = row as u32 * 2 * geometry.image_height / display_pixel_rows;
        (x.min(geometry.image_width), y.min(geometry.image_height))
    }

    /// Map a click column on the slider row to a frame index.
    fn slider_to_index(&self, column: u16) -> usize {
        let geometry = &self.geometry;
        if geometry.total_frames == 0 || geometry.display_columns <= 1 {
            return 0;
        }
        let span = (geometry.display_columns - 1) as usize;
        (column as usize * (geometry.total_frames - 1) + span / 2) / span
    }
}

impl DisplaySurface for TerminalSurface {
    type KeyCode = KeyCode;

    fn show_frame(
        &mut self,
        frame: &RgbImage,
        overlay: &FrameOverlay<'_>,
    ) -> Result<(), FripperError> {
        let (columns, rows) = terminal::size()?;
        // Bottom row is reserved for the slider.
        let image_rows = rows.saturating_sub(1).max(1);

        let mut scaled = imageops::resize(
            frame,
            columns.max(1) as u32,
            image_rows as u32 * 2,
            imageops::FilterType::Nearest,
        );
        if let Some(rect) = overlay.rect {
            outline_rect(&mut scaled, rect, frame.width(), frame.height());
        }

        queue!(self.writer, Clear(ClearType::All))?;
        for row in 0..image_rows {
            queue!(self.writer, MoveTo(0, row))?;
            for column in 0..columns {
                let top = scaled.get_pixel(column as u32, row as u32 * 2).0;
                let bottom = scaled.get_pixel(column as u32, row as u32 * 2 + 1).0;
                queue!(
                    self.writer,
                    SetForegroundColor(Color::Rgb {
                        r: top[0],
                        g: top[1],
                        b: top[2],
                    }),
                    SetBackgroundColor(Color::Rgb {
                        r: bottom[0],
                        g: bottom[1],
                        b: bottom[2],
                    }),
                    Print('▀'),
                )?;
            }
        }
        queue!(self.writer, ResetColor)?;

        // Status label over the top-left corner.
        queue!(
            self.writer,
            MoveTo(0, 0),
            SetForegroundColor(Color::Green),
            Print(overlay.label),
            ResetColor,
        )?;

        let slider_row = image_rows;
        let mut total_frames = self.geometry.total_frames;
        if let Some((current, total)) = overlay.slider {
            queue!(self.writer, MoveTo(0, slider_row))?;
            let knob = if total > 1 {
                (current * (columns.saturating_sub(1)) as usize) / (total - 1)
            } else {
                0
            };
            for column in 0..columns as usize {
                let glyph = if column == knob { '█' } else { '─' };
                queue!(self.writer, Print(glyph))?;
            }
            total_frames = total;
        }
        self.writer.flush()?;

        self.geometry = RenderGeometry {
            image_width: frame.width(),
            image_height: frame.height(),
            display_columns: columns,
            slider_row,
            total_frames,
        };
        Ok(())
    }

    fn poll_event(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<SurfaceEvent<KeyCode>>, FripperError> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        let surface_event = match event::read()? {
            Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                SurfaceEvent::Key(key.code)
            }
            Event::Mouse(mouse) => {
                let shift = mouse.modifiers.contains(KeyModifiers::SHIFT);
                let phase = match mouse.kind {
                    MouseEventKind::Down(MouseButton::Left) => {
                        if mouse.row >= self.geometry.slider_row && self.geometry.slider_row > 0 {
                            return Ok(Some(SurfaceEvent::Seek(
                                self.slider_to_index(mouse.column),
                            )));
                        }
                        MousePhase::Down
                    }
                    MouseEventKind::Drag(MouseButton::Left) => MousePhase::Move,
                    MouseEventKind::Up(MouseButton::Left) => MousePhase::Up,
                    _ => return Ok(None),
                };
                let (x, y) = self.cell_to_pixel(mouse.column, mouse.row);
                SurfaceEvent::Mouse(MouseInput { phase, x, y, shift })
            }
            Event::Resize(..) => SurfaceEvent::Redraw,
            _ => return Ok(None),
        };
        Ok(Some(surface_event))
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        let _ = execute!(self.writer, DisableMouseCapture, Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Draw the rectangle outline into the scaled buffer, translating from
/// source-image coordinates.
fn outline_rect(scaled: &mut RgbImage, rect: CropRect, source_width: u32, source_height: u32) {
    if source_width == 0 || source_height == 0 {
        return;
    }
    let scale_x = |x: u32| (x * (scaled.width() - 1) / source_width.max(1)).min(scaled.width() - 1);
    let scale_y =
        |y: u32| (y * (scaled.height() - 1) / source_height.max(1)).min(scaled.height() - 1);

    let left = scale_x(rect.top_left.0);
    let right = scale_x(rect.bottom_right.0);
    let top = scale_y(rect.top_left.1);
    let bottom = scale_y(rect.bottom_right.1);

    for x in left..=right {
        scaled.put_pixel(x, top, OVERLAY_COLOR);
        scaled.put_pixel(x, bottom, OVERLAY_COLOR);
    }
    for y in top..=bottom {
        scaled.put_pixel(left, y, OVERLAY_COLOR);
        scaled.put_pixel(right, y, OVERLAY_COLOR);
    }
}
