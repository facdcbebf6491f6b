//! Thumbnail position and contact-sheet tests.

use fripper::thumbnail::{inner_positions, thumbnail_grid};
use image::RgbImage;

#[test]
fn positions_divide_the_duration_evenly() {
    assert_eq!(inner_positions(10.0, 4), vec![2.0, 4.0, 6.0, 8.0]);
    assert_eq!(inner_positions(100.0, 1), vec![50.0]);
}

#[test]
fn positions_exclude_the_endpoints() {
    let duration = 37.5;
    let positions = inner_positions(duration, 4);
    assert_eq!(positions.len(), 4);
    for position in &positions {
        assert!(*position > 0.0 && *position < duration);
    }
    // Monotonically increasing.
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn grid_composites_four_thumbnails_at_half_size() {
    let directory = tempfile::tempdir().expect("failed to create temp dir");
    let mut paths = Vec::new();
    for index in 0u8..4 {
        let path = directory.path().join(format!("thumb_{index}.png"));
        RgbImage::from_pixel(320, 240, image::Rgb([index * 60, 0, 0]))
            .save(&path)
            .expect("failed to write thumbnail");
        paths.push(path);
    }

    let sheet = thumbnail_grid(&paths).expect("grid should composite");
    // 2x2 grid of half-sized cells reproduces the source dimensions.
    assert_eq!(sheet.dimensions(), (320, 240));
    // Top-left cell carries the first thumbnail's color.
    assert_eq!(sheet.get_pixel(10, 10).0, [0, 0, 0]);
    // Bottom-right cell carries the last thumbnail's color.
    assert_eq!(sheet.get_pixel(200, 180).0[0], 180);
}

#[test]
fn grid_rejects_empty_input() {
    let result = thumbnail_grid(&[]);
    assert!(result.is_err());
    let message = result.unwrap_err().to_string();
    assert!(
        message.contains("no frames to work with"),
        "empty input should be an empty result set: {message}",
    );
}
