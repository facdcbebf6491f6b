//! Timestamp arithmetic tests.
//!
//! These exercise the parse/format round trip, the frame-index duality,
//! and the clamping behaviour of subtraction.

use fripper::Timestamp;

#[test]
fn formats_canonical_form() {
    assert_eq!(Timestamp::ZERO.to_string(), "00:00:00.000");
    assert_eq!(Timestamp::from_seconds(3661.5).to_string(), "01:01:01.500");
    assert_eq!(Timestamp::from_millis(125).to_string(), "00:00:00.125");
}

#[test]
fn milliseconds_truncate_not_round() {
    // 0.9999 seconds is 999.9 ms; the fractional digit is dropped.
    assert_eq!(Timestamp::from_seconds(0.9999).to_string(), "00:00:00.999");
}

#[test]
fn hours_are_unbounded() {
    let ts = Timestamp::from_seconds(100.0 * 3600.0);
    assert_eq!(ts.to_string(), "100:00:00.000");
}

#[test]
fn parse_round_trip() {
    for text in ["00:00:00.000", "00:01:30.250", "12:59:59.999"] {
        let parsed: Timestamp = text.parse().expect("canonical form should parse");
        assert_eq!(parsed.to_string(), text);
    }
}

#[test]
fn parse_rejects_malformed_input() {
    for text in [
        "",
        "5",
        "00:00:05",
        "00:00:05.00",
        "00:00:05.0000",
        "00:0:05.000",
        "00:00:5.000",
        "aa:bb:cc.ddd",
        "00:61:00.000",
        "00:00:61.000",
        "-0:00:01.000",
        "00:00:01,000",
    ] {
        let result: Result<Timestamp, _> = text.parse();
        assert!(result.is_err(), "{text:?} should be rejected");
        let message = result.unwrap_err().to_string();
        assert!(
            message.contains("invalid timestamp"),
            "error should name the taxonomy variant: {message}",
        );
    }
}

#[test]
fn frame_index_round_trip() {
    // For all indices and a positive rate, converting to a timestamp and
    // back lands on the same frame.
    for fps in [1u32, 4, 24, 30, 60] {
        for index in 0..200usize {
            let ts = Timestamp::from_frame(index, fps);
            assert_eq!(
                ts.frame_number(fps),
                index,
                "index {index} at {fps} fps should round-trip",
            );
        }
    }
}

#[test]
fn subtraction_clamps_at_zero() {
    let ts: Timestamp = "00:00:02.000".parse().unwrap();
    let floored = ts.saturating_sub_seconds(5);
    assert_eq!(floored.to_string(), "00:00:00.000");
    // Idempotent at the floor.
    assert_eq!(floored.saturating_sub_seconds(5), Timestamp::ZERO);
}

#[test]
fn addition_of_two_timestamps() {
    let lhs: Timestamp = "00:00:10.000".parse().unwrap();
    let rhs: Timestamp = "00:00:05.500".parse().unwrap();
    assert_eq!((lhs + rhs).to_string(), "00:00:15.500");
}

#[test]
fn add_seconds_has_no_upper_clamp() {
    let ts: Timestamp = "00:59:30.000".parse().unwrap();
    assert_eq!(ts.add_seconds(45).to_string(), "01:00:15.000");
}

#[test]
fn filesystem_safe_replaces_separators() {
    let ts: Timestamp = "00:00:05.000".parse().unwrap();
    assert_eq!(ts.filesystem_safe(), "00-00-05-000");
}
