//! External `ffmpeg` process invocation.
//!
//! Every media operation in this crate is a parameter substitution into an
//! `ffmpeg` command line, executed as a blocking subprocess. Calls are
//! synchronous and unbounded; there are no retries. The input path is
//! checked before any process is spawned ([`FripperError::InputNotFound`])
//! and a non-zero exit maps to [`FripperError::ExternalProcessFailure`]
//! with the captured stderr.
//!
//! Long-running operations (clip extraction) are expected to be dispatched
//! through [`ExtractionDispatcher`](crate::ExtractionDispatcher) so the
//! interactive event loop never blocks on them.

use std::{
    env,
    ffi::OsString,
    io,
    path::{Path, PathBuf},
    process::Command,
};

use crate::{crop::CropRect, error::FripperError, timestamp::Timestamp};

/// Check that `path` exists, failing with [`FripperError::InputNotFound`]
/// otherwise.
///
/// Called before every external process invocation so missing-file errors
/// surface as a clear taxonomy variant instead of ffmpeg's own stderr.
pub fn ensure_exists(path: &Path) -> Result<(), FripperError> {
    if path.exists() {
        Ok(())
    } else {
        Err(FripperError::InputNotFound {
            path: path.to_path_buf(),
        })
    }
}

/// Run a prepared command, capturing output and mapping failure.
fn run_capture(mut command: Command, program: &str) -> Result<Vec<u8>, FripperError> {
    log::debug!("invoking {program}: {command:?}");
    let output = command.output()?;
    if output.status.success() {
        Ok(output.stdout)
    } else {
        let status = match output.status.code() {
            Some(code) => format!("exit code {code}"),
            None => "killed by signal".to_string(),
        };
        Err(FripperError::ExternalProcessFailure {
            program: program.to_string(),
            status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

pub(crate) fn run_ffmpeg(arguments: Vec<OsString>) -> Result<(), FripperError> {
    let mut command = Command::new("ffmpeg");
    command.args(arguments);
    run_capture(command, "ffmpeg").map(|_| ())
}

/// Derive the output path `<directory>/<video stem>_<safe timestamp><extension>`.
///
/// When no directory is given the current working directory is used,
/// matching the original tool's behaviour of dropping grabbed media next
/// to wherever the operator ran it.
fn timestamped_output_path(
    video: &Path,
    timestamp: Timestamp,
    directory: Option<&Path>,
    extension: &str,
) -> Result<PathBuf, FripperError> {
    let stem = video
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame".to_string());
    let filename = format!("{stem}_{}{extension}", timestamp.filesystem_safe());

    let directory = match directory {
        Some(directory) => {
            if !directory.is_dir() {
                return Err(FripperError::Io(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("output directory does not exist: {}", directory.display()),
                )));
            }
            directory.to_path_buf()
        }
        None => env::current_dir()?,
    };
    Ok(directory.join(filename))
}

/// Extract sequentially numbered frames from `video` into `output_directory`.
///
/// Runs `ffmpeg -i video -vf fps=N <directory>/<pattern>`, where `pattern`
/// is an image-sequence pattern such as `frame_%05d.jpg`. With a `start`
/// offset the rip is windowed with `-ss start [-t duration]`; with `nvidia`
/// set, CUDA hardware decoding is requested.
///
/// # Errors
///
/// [`FripperError::InputNotFound`] when `video` does not exist, or
/// [`FripperError::ExternalProcessFailure`] when ffmpeg exits non-zero. No
/// partial-result recovery is attempted.
pub fn rip_frames(
    video: &Path,
    output_directory: &Path,
    pattern: &str,
    fps: u32,
    start: Option<Timestamp>,
    duration: Option<f64>,
    nvidia: bool,
) -> Result<(), FripperError> {
    ensure_exists(video)?;

    let mut arguments: Vec<OsString> = Vec::new();
    if nvidia {
        arguments.extend(["-hwaccel".into(), "cuda".into()]);
    }
    if let Some(start) = start {
        arguments.extend(["-ss".into(), start.to_string().into()]);
        if let Some(duration) = duration {
            arguments.extend(["-t".into(), format!("{duration}").into()]);
        }
    }
    arguments.extend([
        "-i".into(),
        video.into(),
        "-vf".into(),
        format!("fps={fps}").into(),
        output_directory.join(pattern).into(),
    ]);

    run_ffmpeg(arguments)?;
    log::info!("frames extracted to {}", output_directory.display());
    Ok(())
}

/// Extract a single frame at `timestamp` and save it as a JPEG.
///
/// The output is named `<video stem>_<safe timestamp>.jpg` — colons and
/// periods in the timestamp replaced with dashes — inside
/// `output_directory` or, when `None`, the current working directory. An
/// optional crop rectangle is applied as an ffmpeg `crop` filter.
///
/// Returns the path the frame was written to.
pub fn grab_frame(
    video: &Path,
    timestamp: Timestamp,
    output_directory: Option<&Path>,
    crop: Option<CropRect>,
) -> Result<PathBuf, FripperError> {
    ensure_exists(video)?;
    let output_path = timestamped_output_path(video, timestamp, output_directory, ".jpg")?;

    run_ffmpeg(grab_frame_arguments(video, timestamp, crop, &output_path))?;
    log::info!("frame saved to {}", output_path.display());
    Ok(output_path)
}

fn grab_frame_arguments(
    video: &Path,
    timestamp: Timestamp,
    crop: Option<CropRect>,
    output_path: &Path,
) -> Vec<OsString> {
    let mut arguments: Vec<OsString> = vec![
        "-ss".into(),
        timestamp.to_string().into(),
        "-i".into(),
        video.into(),
        "-frames:v".into(),
        "1".into(),
        // Lower value = higher JPEG quality.
        "-q:v".into(),
        "2".into(),
    ];
    if let Some(crop) = crop {
        arguments.extend(["-vf".into(), crop.filter_expression().into()]);
    }
    // ffmpeg silently ignores options after the last output file, so -y
    // must come before the path or overwrites prompt and fail on EOF.
    arguments.extend(["-y".into(), output_path.into()]);
    arguments
}

/// Extract the clip between `start` and `end` into a new media file.
///
/// The output keeps the source container extension and is named
/// `<video stem>_<safe start>.<ext>`. Without a crop the streams are
/// copied verbatim (`-c copy`, no re-encode); a crop forces re-encoding
/// through `libx264`/`aac` because stream copy cannot apply filters.
///
/// Returns the path of the produced clip.
pub fn extract_clip(
    video: &Path,
    start: Timestamp,
    end: Timestamp,
    output_directory: Option<&Path>,
    crop: Option<CropRect>,
) -> Result<PathBuf, FripperError> {
    if end <= start {
        return Err(FripperError::InvalidInterval { start, end });
    }
    ensure_exists(video)?;

    let extension = video
        .extension()
        .map(|extension| format!(".{}", extension.to_string_lossy()))
        .unwrap_or_else(|| ".mp4".to_string());
    let output_path = timestamped_output_path(video, start, output_directory, &extension)?;

    run_ffmpeg(extract_clip_arguments(video, start, end, crop, &output_path))?;
    log::info!("clip saved to {}", output_path.display());
    Ok(output_path)
}

fn extract_clip_arguments(
    video: &Path,
    start: Timestamp,
    end: Timestamp,
    crop: Option<CropRect>,
    output_path: &Path,
) -> Vec<OsString> {
    let mut arguments: Vec<OsString> = vec![
        "-i".into(),
        video.into(),
        "-ss".into(),
        start.to_string().into(),
        "-to".into(),
        end.to_string().into(),
    ];
    match crop {
        Some(crop) => arguments.extend([
            "-vf".into(),
            crop.filter_expression().into(),
            "-c:v".into(),
            "libx264".into(),
            "-c:a".into(),
            "aac".into(),
        ]),
        None => arguments.extend(["-c".into(), "copy".into()]),
    }
    arguments.extend(["-y".into(), output_path.into()]);
    arguments
}

/// Extract a clip sized by frame count rather than an end mark.
///
/// The duration is `frame_count / fps` seconds from `start`. Always
/// re-encodes, since the clip length is phrased in frames of the target
/// rate rather than source keyframe boundaries.
pub fn extract_clip_frames(
    video: &Path,
    start: Timestamp,
    frame_count: u32,
    fps: u32,
    output_directory: Option<&Path>,
    crop: Option<CropRect>,
) -> Result<PathBuf, FripperError> {
    ensure_exists(video)?;

    let extension = video
        .extension()
        .map(|extension| format!(".{}", extension.to_string_lossy()))
        .unwrap_or_else(|| ".mp4".to_string());
    let output_path = timestamped_output_path(video, start, output_directory, &extension)?;

    run_ffmpeg(clip_frames_arguments(video, start, frame_count, fps, crop, &output_path))?;
    log::info!("clip saved to {}", output_path.display());
    Ok(output_path)
}

fn clip_frames_arguments(
    video: &Path,
    start: Timestamp,
    frame_count: u32,
    fps: u32,
    crop: Option<CropRect>,
    output_path: &Path,
) -> Vec<OsString> {
    let duration = frame_count as f64 / fps as f64;
    let mut arguments: Vec<OsString> = vec![
        "-i".into(),
        video.into(),
        "-ss".into(),
        start.to_string().into(),
        "-t".into(),
        format!("{duration}").into(),
    ];
    if let Some(crop) = crop {
        arguments.extend(["-vf".into(), crop.filter_expression().into()]);
    }
    arguments.extend([
        "-c:v".into(),
        "libx264".into(),
        "-c:a".into(),
        "aac".into(),
        "-y".into(),
        output_path.into(),
    ]);
    arguments
}

/// Spawn a nested `fripper split` process for fine-grained browsing
/// around `start`.
///
/// The child is a fresh invocation of the current executable and is left
/// running detached; it takes over the terminal with its own session and
/// cleans up its own frame directory.
pub fn spawn_split(video: &Path, start: Timestamp, fps: u32) -> Result<(), FripperError> {
    ensure_exists(video)?;

    let child = Command::new(env::current_exe()?)
        .arg("split")
        .arg(video)
        .args(["--fps", &fps.to_string(), "--start", &start.to_string()])
        .spawn()?;
    log::info!("nested split started at {start} (pid {})", child.id());
    Ok(())
}

/// Re-encode an image sequence into a lossless FFV1/MKV video.
///
/// `pattern` is an image-sequence pattern (e.g. `frame_%06d.png`) relative
/// to `frame_directory`; `fps` should be the probed rate of the source so
/// the rebuilt video keeps its original timing.
pub fn encode_frame_sequence(
    frame_directory: &Path,
    pattern: &str,
    fps: f64,
    output_path: &Path,
) -> Result<(), FripperError> {
    ensure_exists(frame_directory)?;

    run_ffmpeg(vec![
        "-framerate".into(),
        format!("{fps}").into(),
        "-i".into(),
        frame_directory.join(pattern).into(),
        "-c:v".into(),
        "ffv1".into(),
        "-y".into(),
        output_path.into(),
    ])?;
    log::info!("video rebuilt at {}", output_path.display());
    Ok(())
}

pub(crate) fn capture_stdout(command: Command, program: &str) -> Result<String, FripperError> {
    let stdout = run_capture(command, program)?;
    Ok(String::from_utf8_lossy(&stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use std::ffi::OsStr;

    use super::*;

    fn position(arguments: &[OsString], needle: &str) -> usize {
        arguments
            .iter()
            .position(|argument| argument.as_os_str() == OsStr::new(needle))
            .unwrap_or_else(|| panic!("{needle} missing from {arguments:?}"))
    }

    #[test]
    fn grab_arguments_put_the_overwrite_flag_before_the_output() {
        let arguments = grab_frame_arguments(
            Path::new("video.mp4"),
            Timestamp::ZERO,
            None,
            Path::new("out.jpg"),
        );
        assert_eq!(arguments.last().map(OsString::as_os_str), Some(OsStr::new("out.jpg")));
        assert_eq!(position(&arguments, "-y"), arguments.len() - 2);
    }

    #[test]
    fn clip_arguments_put_the_overwrite_flag_before_the_output() {
        let start = Timestamp::from_seconds(1.0);
        let end = Timestamp::from_seconds(2.0);
        let arguments =
            extract_clip_arguments(Path::new("video.mp4"), start, end, None, Path::new("o.mp4"));
        assert_eq!(arguments.last().map(OsString::as_os_str), Some(OsStr::new("o.mp4")));
        assert_eq!(position(&arguments, "-y"), arguments.len() - 2);
    }

    #[test]
    fn clip_frames_arguments_put_the_overwrite_flag_before_the_output() {
        let arguments = clip_frames_arguments(
            Path::new("video.mp4"),
            Timestamp::ZERO,
            33,
            16,
            None,
            Path::new("o.mp4"),
        );
        assert_eq!(arguments.last().map(OsString::as_os_str), Some(OsStr::new("o.mp4")));
        assert_eq!(position(&arguments, "-y"), arguments.len() - 2);
    }

    #[test]
    fn clip_arguments_stream_copy_without_a_crop() {
        let start = Timestamp::ZERO;
        let end = Timestamp::from_seconds(5.0);
        let copied =
            extract_clip_arguments(Path::new("v.mp4"), start, end, None, Path::new("o.mp4"));
        assert!(position(&copied, "-c") < position(&copied, "-y"));

        let crop = crate::crop::CropRect::from_drag((0, 0), (100, 100), 1920, 1080).unwrap();
        let encoded =
            extract_clip_arguments(Path::new("v.mp4"), start, end, Some(crop), Path::new("o.mp4"));
        assert!(position(&encoded, "libx264") < position(&encoded, "-y"));
        assert!(position(&encoded, "-vf") < position(&encoded, "libx264"));
    }
}
