//! Error handling tests.
//!
//! These verify that missing inputs and malformed parameters surface as
//! the right taxonomy variants before any external process is spawned.

use std::path::Path;

use fripper::{
    FrameSequence, Timestamp,
    extract::{extract_clip, grab_frame},
    probe::probe_duration,
};

#[test]
fn grab_frame_checks_the_input_first() {
    let result = grab_frame(
        Path::new("this_file_does_not_exist.mp4"),
        Timestamp::ZERO,
        None,
        None,
    );
    let message = result.unwrap_err().to_string();
    assert!(
        message.contains("input file not found"),
        "missing input should fail before ffmpeg runs: {message}",
    );
}

#[test]
fn probe_checks_the_input_first() {
    let result = probe_duration(Path::new("this_file_does_not_exist.mp4"));
    assert!(result.is_err());
}

#[test]
fn sequence_materialization_checks_the_input_first() {
    let result = FrameSequence::materialize(
        Path::new("this_file_does_not_exist.mp4"),
        4,
        None,
        None,
        false,
    );
    let message = result.unwrap_err().to_string();
    assert!(message.contains("input file not found"), "{message}");
}

#[test]
fn inverted_clip_interval_is_rejected_before_any_process() {
    // The interval check fires even for a missing file: validation comes
    // before existence checks or command construction.
    let start: Timestamp = "00:00:10.000".parse().unwrap();
    let end: Timestamp = "00:00:05.000".parse().unwrap();
    let result = extract_clip(
        Path::new("this_file_does_not_exist.mp4"),
        start,
        end,
        None,
        None,
    );
    let message = result.unwrap_err().to_string();
    assert!(
        message.contains("invalid clip interval"),
        "inverted interval should be its own variant: {message}",
    );
}

#[test]
fn equal_marks_are_an_invalid_interval() {
    let mark: Timestamp = "00:00:05.000".parse().unwrap();
    let result = extract_clip(
        Path::new("this_file_does_not_exist.mp4"),
        mark,
        mark,
        None,
        None,
    );
    assert!(result.is_err(), "end must be strictly after start");
}

#[test]
fn grab_frame_rejects_missing_output_directory() {
    let directory = tempfile::tempdir().expect("failed to create temp dir");
    let video = directory.path().join("real.mp4");
    std::fs::write(&video, b"not really a video").expect("failed to write stub");

    let result = grab_frame(
        &video,
        Timestamp::ZERO,
        Some(Path::new("missing_output_directory")),
        None,
    );
    let message = result.unwrap_err().to_string();
    // The destination is not an input; the error must name it as the
    // output directory.
    assert!(
        message.contains("output directory does not exist"),
        "{message}",
    );
    assert!(!message.contains("input file not found"), "{message}");
}
