//! JPEG writer tests.

use image::{DynamicImage, GenericImageView, Rgb, RgbImage, Rgba, RgbaImage};
use scenegrab::{ExtractedFrame, FrameIdentifier, FrameWriter, SceneGrabError, write_jpeg};

fn noisy_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        let value = (x.wrapping_mul(7919) ^ y.wrapping_mul(104_729)) as u8;
        Rgb([value, value.wrapping_mul(3), value.wrapping_add(91)])
    }))
}

fn frame(scene: u32, sample: u32) -> ExtractedFrame {
    ExtractedFrame {
        image: DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 24, Rgb([10, 200, 30]))),
        timestamp: "00:01".to_string(),
        identifier: FrameIdentifier::new(scene, sample),
        seconds: 1.5,
        frame_number: 15,
    }
}

#[test]
fn written_jpeg_decodes_with_same_dimensions() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let path = temporary_directory.path().join("out.jpg");

    write_jpeg(&noisy_image(64, 48), &path, 95).expect("Failed to write JPEG");

    let decoded = image::open(&path).expect("Failed to decode JPEG");
    assert_eq!(decoded.dimensions(), (64, 48));
}

#[test]
fn rgba_input_is_converted() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let path = temporary_directory.path().join("rgba.jpg");
    let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([1, 2, 3, 128])));

    write_jpeg(&image, &path, 80).expect("Failed to write JPEG");
    assert!(image::open(&path).is_ok());
}

#[test]
fn lower_quality_gives_smaller_file() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let low = temporary_directory.path().join("low.jpg");
    let high = temporary_directory.path().join("high.jpg");
    let image = noisy_image(128, 128);

    write_jpeg(&image, &low, 10).expect("Failed to write JPEG");
    write_jpeg(&image, &high, 100).expect("Failed to write JPEG");

    let low_size = std::fs::metadata(&low).expect("metadata").len();
    let high_size = std::fs::metadata(&high).expect("metadata").len();
    assert!(low_size < high_size, "{low_size} >= {high_size}");
}

#[test]
fn missing_directory_is_a_write_error() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let path = temporary_directory.path().join("missing").join("out.jpg");

    let result = write_jpeg(&noisy_image(8, 8), &path, 95);
    match result {
        Err(SceneGrabError::WriteError { path: failed, .. }) => assert_eq!(failed, path),
        other => panic!("Expected WriteError, got {other:?}"),
    }
}

#[test]
fn encoder_rejection_is_a_write_error() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let path = temporary_directory.path().join("too_wide.jpg");
    let image = DynamicImage::ImageRgb8(RgbImage::new(70_000, 1));

    match write_jpeg(&image, &path, 95) {
        Err(SceneGrabError::WriteError { path: failed, reason }) => {
            assert_eq!(failed, path);
            assert!(!reason.is_empty());
        }
        other => panic!("Expected WriteError, got {other:?}"),
    }
}

#[test]
fn frame_writer_names_files_by_identifier() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let mut writer = FrameWriter::new(temporary_directory.path());

    let saved = writer.save(&frame(7, 2)).expect("Frame should be saved");

    assert_eq!(saved, temporary_directory.path().join("scene_0007_frame_02.jpg"));
    assert!(saved.exists());
    assert_eq!(writer.written(), 1);
    assert_eq!(writer.failed(), 0);
}

#[test]
fn frame_writer_counts_failures_and_continues() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let mut broken = FrameWriter::new(temporary_directory.path().join("does_not_exist"));
    assert!(broken.save(&frame(1, 1)).is_none());
    assert!(broken.save(&frame(1, 2)).is_none());
    assert_eq!(broken.failed(), 2);
    assert_eq!(broken.written(), 0);

    let mut writer = FrameWriter::new(temporary_directory.path()).with_quality(0);
    assert!(writer.save(&frame(2, 1)).is_some());
}
