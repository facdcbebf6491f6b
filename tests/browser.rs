//! Browser state machine tests.
//!
//! The machine is pure — events in, optional commands out — so these
//! tests drive it directly without any display surface or ffmpeg process.

use std::path::{Path, PathBuf};

use fripper::{
    BrowserCommand, BrowserEvent, BrowserSession, CropRect, Timestamp,
    browser::{self, BrowserAction},
};

fn session() -> BrowserSession {
    let mut session = BrowserSession::new(Path::new("video.mp4"), 4, 40, None);
    session.set_frame_dimensions(1920, 1080);
    session
}

fn action(session: &mut BrowserSession, action: BrowserAction) -> Option<BrowserCommand> {
    session
        .apply(BrowserEvent::Action(action))
        .expect("action should not fail")
}

#[test]
fn navigation_respects_bounds() {
    let mut session = session();
    assert_eq!(session.current_frame(), 0);

    // Prev at frame zero stays put.
    action(&mut session, BrowserAction::PrevFrame);
    assert_eq!(session.current_frame(), 0);

    action(&mut session, BrowserAction::NextFrame);
    assert_eq!(session.current_frame(), 1);

    // Next at the last frame stays put.
    session.apply(BrowserEvent::Seek(39)).unwrap();
    action(&mut session, BrowserAction::NextFrame);
    assert_eq!(session.current_frame(), 39);
}

#[test]
fn seek_out_of_range_is_ignored() {
    let mut session = session();
    session.apply(BrowserEvent::Seek(10)).unwrap();
    assert_eq!(session.current_frame(), 10);

    session.apply(BrowserEvent::Seek(40)).unwrap();
    assert_eq!(session.current_frame(), 10, "seek past the end is a no-op");
}

#[test]
fn quit_stops_the_session() {
    let mut session = session();
    assert!(session.is_running());
    action(&mut session, BrowserAction::Quit);
    assert!(!session.is_running());
}

#[test]
fn marks_use_frame_timestamps() {
    let mut session = session();
    session.apply(BrowserEvent::Seek(8)).unwrap();
    action(&mut session, BrowserAction::MarkStart);
    // Frame 8 at 4 fps is 2 seconds.
    assert_eq!(session.mark_start().unwrap().to_string(), "00:00:02.000");

    session.apply(BrowserEvent::Seek(20)).unwrap();
    action(&mut session, BrowserAction::MarkEnd);
    assert_eq!(session.mark_end().unwrap().to_string(), "00:00:05.000");
}

#[test]
fn marks_shift_by_start_offset() {
    let offset: Timestamp = "00:01:00.000".parse().unwrap();
    let mut session = BrowserSession::new(Path::new("video.mp4"), 4, 40, Some(offset));
    session.apply(BrowserEvent::Seek(8)).unwrap();

    let command = session
        .apply(BrowserEvent::Action(BrowserAction::GrabFrame))
        .unwrap()
        .expect("grab always produces a command");
    match command {
        BrowserCommand::GrabFrame { timestamp, .. } => {
            assert_eq!(timestamp.to_string(), "00:01:02.000");
        }
        other => panic!("expected GrabFrame, got {other:?}"),
    }
}

#[test]
fn clip_requires_both_marks() {
    let mut session = session();
    assert!(action(&mut session, BrowserAction::ExtractClip).is_none());

    action(&mut session, BrowserAction::MarkStart);
    assert!(
        action(&mut session, BrowserAction::ExtractClip).is_none(),
        "one mark is not enough",
    );

    session.apply(BrowserEvent::Seek(20)).unwrap();
    action(&mut session, BrowserAction::MarkEnd);
    let command = action(&mut session, BrowserAction::ExtractClip)
        .expect("both marks set should produce a clip command");
    match command {
        BrowserCommand::ExtractClip { start, end, video, .. } => {
            assert_eq!(start.to_string(), "00:00:00.000");
            assert_eq!(end.to_string(), "00:00:05.000");
            assert_eq!(video, PathBuf::from("video.mp4"));
        }
        other => panic!("expected ExtractClip, got {other:?}"),
    }
}

#[test]
fn inverted_interval_is_rejected() {
    let mut session = session();
    session.apply(BrowserEvent::Seek(20)).unwrap();
    action(&mut session, BrowserAction::MarkStart);
    session.apply(BrowserEvent::Seek(4)).unwrap();
    action(&mut session, BrowserAction::MarkEnd);

    let result = session.apply(BrowserEvent::Action(BrowserAction::ExtractClip));
    let message = result.unwrap_err().to_string();
    assert!(
        message.contains("invalid clip interval"),
        "error should name the interval: {message}",
    );
    // The session survives and the marks stay for correction.
    assert!(session.is_running());
    assert!(session.mark_start().is_some());
    assert!(session.mark_end().is_some());
}

#[test]
fn drag_lifecycle_finalizes_a_normalized_rect() {
    let mut session = session();
    session.apply(BrowserEvent::DragStart { x: 400, y: 300 }).unwrap();
    session
        .apply(BrowserEvent::DragMove {
            x: 100,
            y: 100,
            square: false,
        })
        .unwrap();
    // Live preview is normalized too.
    let preview = session.visible_rect().expect("drag in flight shows a rect");
    assert_eq!(preview.top_left, (100, 100));

    session
        .apply(BrowserEvent::DragEnd {
            x: 100,
            y: 100,
            square: false,
        })
        .unwrap();
    let rect = session.crop().expect("drag end finalizes the crop");
    assert_eq!(rect.top_left, (100, 100));
    assert_eq!(rect.bottom_right, (400, 300));
}

#[test]
fn square_drag_snaps_to_fixed_size() {
    let mut session = session();
    session.apply(BrowserEvent::DragStart { x: 100, y: 100 }).unwrap();
    session
        .apply(BrowserEvent::DragEnd {
            x: 150,
            y: 150,
            square: true,
        })
        .unwrap();
    let rect = session.crop().unwrap();
    assert_eq!(rect.pixel_width(), CropRect::SNAP_EDGE);
    assert_eq!(rect.pixel_height(), CropRect::SNAP_EDGE);
}

#[test]
fn crop_persists_across_navigation_until_deleted() {
    let mut session = session();
    session.apply(BrowserEvent::DragStart { x: 0, y: 0 }).unwrap();
    session
        .apply(BrowserEvent::DragEnd {
            x: 200,
            y: 200,
            square: false,
        })
        .unwrap();
    assert!(session.crop().is_some());

    action(&mut session, BrowserAction::NextFrame);
    session.apply(BrowserEvent::Seek(30)).unwrap();
    assert!(session.crop().is_some(), "navigation keeps the crop");

    action(&mut session, BrowserAction::DeleteCrop);
    assert!(session.crop().is_none());
}

#[test]
fn crop_rides_along_on_extraction_commands() {
    let mut session = session();
    session.apply(BrowserEvent::DragStart { x: 10, y: 20 }).unwrap();
    session
        .apply(BrowserEvent::DragEnd {
            x: 110,
            y: 220,
            square: false,
        })
        .unwrap();

    match action(&mut session, BrowserAction::GrabFrame).unwrap() {
        BrowserCommand::GrabFrame { crop, .. } => {
            assert_eq!(crop.unwrap().filter_expression(), "crop=100:200:10:20");
        }
        other => panic!("expected GrabFrame, got {other:?}"),
    }
}

#[test]
fn fixed_length_clip_needs_a_start_mark() {
    let mut session = session();
    assert!(action(&mut session, BrowserAction::ExtractClipFrames).is_none());

    action(&mut session, BrowserAction::MarkStart);
    match action(&mut session, BrowserAction::ExtractClipFrames).unwrap() {
        BrowserCommand::ExtractClipFrames {
            frame_count, fps, ..
        } => {
            assert_eq!(frame_count, browser::CLIP_FRAME_COUNT);
            assert_eq!(fps, browser::CLIP_FRAME_RATE);
        }
        other => panic!("expected ExtractClipFrames, got {other:?}"),
    }
}

#[test]
fn mark_walk_advances_the_start_mark() {
    let mut session = session();
    session.apply(BrowserEvent::Seek(8)).unwrap();
    action(&mut session, BrowserAction::MarkStart);

    match action(&mut session, BrowserAction::MarkWalk).unwrap() {
        BrowserCommand::ClipWalk {
            start,
            clips,
            clip_seconds,
            step_seconds,
            ..
        } => {
            assert_eq!(start.to_string(), "00:00:02.000");
            assert_eq!(clips, browser::WALK_CLIP_COUNT);
            assert_eq!(clip_seconds, browser::WALK_CLIP_SECONDS);
            assert_eq!(step_seconds, browser::WALK_STEP_SECONDS);
        }
        other => panic!("expected ClipWalk, got {other:?}"),
    }
    // 20 clips stepping 4 seconds: the mark lands 80 seconds later.
    assert_eq!(session.mark_start().unwrap().to_string(), "00:01:22.000");
}

#[test]
fn zoom_split_rewinds_one_second_from_the_current_frame() {
    let mut session = session();
    session.apply(BrowserEvent::Seek(8)).unwrap();

    match action(&mut session, BrowserAction::ZoomSplit).unwrap() {
        BrowserCommand::ZoomSplit { start, fps, video } => {
            // Frame 8 at 4 fps is 2 seconds; the nested session starts at 1.
            assert_eq!(start.to_string(), "00:00:01.000");
            assert_eq!(fps, browser::ZOOM_SPLIT_FPS);
            assert_eq!(video, PathBuf::from("video.mp4"));
        }
        other => panic!("expected ZoomSplit, got {other:?}"),
    }
}

#[test]
fn zoom_split_at_the_first_frame_clamps_to_zero() {
    let mut session = session();
    match action(&mut session, BrowserAction::ZoomSplit).unwrap() {
        BrowserCommand::ZoomSplit { start, .. } => {
            assert_eq!(start, Timestamp::ZERO, "rewind cannot go negative");
        }
        other => panic!("expected ZoomSplit, got {other:?}"),
    }
}
