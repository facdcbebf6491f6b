//! Millisecond-precision timestamps and frame-index arithmetic.
//!
//! [`Timestamp`] is the value type every extraction command is phrased in.
//! Its canonical serialized form is `HH:MM:SS.mmm` — hours unbounded,
//! minutes and seconds two digits, milliseconds three digits — which is
//! exactly what `ffmpeg -ss`/`-to` accept. Subtraction clamps at zero so a
//! timestamp never serializes as negative.
//!
//! A timestamp is convertible to and from a frame index through the
//! extraction frame rate: `timestamp = frame_index / fps` seconds.
//!
//! # Example
//!
//! ```
//! use fripper::Timestamp;
//!
//! let ts: Timestamp = "00:01:30.250".parse().unwrap();
//! assert_eq!(ts.to_string(), "00:01:30.250");
//! assert_eq!(ts.add_seconds(30).to_string(), "00:02:00.250");
//! assert_eq!(Timestamp::from_frame(12, 4).to_string(), "00:00:03.000");
//! ```

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    ops::Add,
    str::FromStr,
};

use crate::error::FripperError;

const MILLIS_PER_SECOND: u64 = 1_000;
const MILLIS_PER_MINUTE: u64 = 60 * MILLIS_PER_SECOND;
const MILLIS_PER_HOUR: u64 = 60 * MILLIS_PER_MINUTE;

/// An elapsed-time value with millisecond precision.
///
/// Internally a non-negative count of milliseconds, so arithmetic cannot
/// produce a negative serialization by construction:
/// [`saturating_sub_seconds`](Timestamp::saturating_sub_seconds) clamps at
/// `00:00:00.000`. Addition has no upper clamp; callers are responsible for
/// keeping results inside the video duration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    milliseconds: u64,
}

impl Timestamp {
    /// The zero timestamp, `00:00:00.000`.
    pub const ZERO: Timestamp = Timestamp { milliseconds: 0 };

    /// Create a timestamp from a raw millisecond count.
    pub fn from_millis(milliseconds: u64) -> Self {
        Self { milliseconds }
    }

    /// Create a timestamp from fractional seconds.
    ///
    /// The fractional remainder is truncated (not rounded) to three digits,
    /// so `0.9999` seconds becomes `00:00:00.999`.
    pub fn from_seconds(seconds: f64) -> Self {
        let clamped = seconds.max(0.0);
        Self {
            milliseconds: (clamped * MILLIS_PER_SECOND as f64).floor() as u64,
        }
    }

    /// Convert a frame index in a sequence extracted at `fps` frames per
    /// second into the corresponding timestamp.
    pub fn from_frame(frame_index: usize, fps: u32) -> Self {
        Self::from_seconds(frame_index as f64 / fps as f64)
    }

    /// Convert this timestamp back into a frame index at `fps` frames per
    /// second, rounding to the nearest frame.
    pub fn frame_number(&self, fps: u32) -> usize {
        (self.as_seconds() * fps as f64).round() as usize
    }

    /// Total elapsed time as fractional seconds.
    pub fn as_seconds(&self) -> f64 {
        self.milliseconds as f64 / MILLIS_PER_SECOND as f64
    }

    /// Raw millisecond count.
    pub fn as_millis(&self) -> u64 {
        self.milliseconds
    }

    /// Subtract whole seconds, clamping at [`Timestamp::ZERO`] rather than
    /// going negative.
    #[must_use]
    pub fn saturating_sub_seconds(&self, seconds: u64) -> Self {
        Self {
            milliseconds: self
                .milliseconds
                .saturating_sub(seconds * MILLIS_PER_SECOND),
        }
    }

    /// Add whole seconds. No upper clamp is applied.
    #[must_use]
    pub fn add_seconds(&self, seconds: u64) -> Self {
        Self {
            milliseconds: self.milliseconds + seconds * MILLIS_PER_SECOND,
        }
    }

    /// Render the timestamp with colons and periods replaced by dashes,
    /// suitable for embedding in an output filename.
    ///
    /// `00:00:05.000` becomes `00-00-05-000`.
    pub fn filesystem_safe(&self) -> String {
        self.to_string().replace([':', '.'], "-")
    }
}

impl Display for Timestamp {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        let hours = self.milliseconds / MILLIS_PER_HOUR;
        let minutes = (self.milliseconds % MILLIS_PER_HOUR) / MILLIS_PER_MINUTE;
        let seconds = (self.milliseconds % MILLIS_PER_MINUTE) / MILLIS_PER_SECOND;
        let milliseconds = self.milliseconds % MILLIS_PER_SECOND;
        write!(
            formatter,
            "{hours:02}:{minutes:02}:{seconds:02}.{milliseconds:03}"
        )
    }
}

impl Add for Timestamp {
    type Output = Timestamp;

    /// Pairwise addition of two timestamps.
    ///
    /// Used to translate a frame-relative offset into an absolute position
    /// when frame extraction began at a non-zero start offset.
    fn add(self, other: Timestamp) -> Timestamp {
        Timestamp {
            milliseconds: self.milliseconds + other.milliseconds,
        }
    }
}

impl FromStr for Timestamp {
    type Err = FripperError;

    /// Parse a strict `HH:MM:SS.mmm` string.
    ///
    /// Hours may exceed two digits but every field must be present, every
    /// character must be an ASCII digit, and minutes/seconds/milliseconds
    /// must be exactly two, two, and three digits wide. Anything else fails
    /// with [`FripperError::InvalidTimestampFormat`].
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let malformed = || FripperError::InvalidTimestampFormat(input.to_string());

        let mut colon_fields = input.split(':');
        let hours_field = colon_fields.next().ok_or_else(malformed)?;
        let minutes_field = colon_fields.next().ok_or_else(malformed)?;
        let rest = colon_fields.next().ok_or_else(malformed)?;
        if colon_fields.next().is_some() {
            return Err(malformed());
        }

        let (seconds_field, millis_field) = rest.split_once('.').ok_or_else(malformed)?;

        let all_digits = |field: &str| field.bytes().all(|byte| byte.is_ascii_digit());
        if hours_field.is_empty()
            || !all_digits(hours_field)
            || minutes_field.len() != 2
            || !all_digits(minutes_field)
            || seconds_field.len() != 2
            || !all_digits(seconds_field)
            || millis_field.len() != 3
            || !all_digits(millis_field)
        {
            return Err(malformed());
        }

        let hours: u64 = hours_field.parse().map_err(|_| malformed())?;
        let minutes: u64 = minutes_field.parse().map_err(|_| malformed())?;
        let seconds: u64 = seconds_field.parse().map_err(|_| malformed())?;
        let milliseconds: u64 = millis_field.parse().map_err(|_| malformed())?;

        if minutes > 59 || seconds > 59 {
            return Err(malformed());
        }

        Ok(Timestamp {
            milliseconds: hours * MILLIS_PER_HOUR
                + minutes * MILLIS_PER_MINUTE
                + seconds * MILLIS_PER_SECOND
                + milliseconds,
        })
    }
}
