//! Command-line behaviour of the `scenegrab` binary.

use std::{path::Path, process::Command};

fn scenegrab() -> Command {
    Command::new(env!("CARGO_BIN_EXE_scenegrab"))
}

#[test]
fn missing_video_exits_with_failure() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output_directory = temporary_directory.path().join("frames");

    let output = scenegrab()
        .arg("--video")
        .arg(temporary_directory.path().join("missing.mp4"))
        .arg("--outdir")
        .arg(&output_directory)
        .output()
        .expect("Failed to run scenegrab");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Video file not found"), "stdout: {stdout}");
    assert!(stdout.contains(" - ERROR - "), "stdout: {stdout}");
    assert!(!output_directory.exists());
}

#[test]
fn missing_arguments_are_a_usage_error() {
    let output = scenegrab().output().expect("Failed to run scenegrab");
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn invalid_quality_is_rejected() {
    let output = scenegrab()
        .args(["--video", "a.mp4", "--outdir", "out", "--quality", "0"])
        .output()
        .expect("Failed to run scenegrab");
    assert!(!output.status.success());
}

#[test]
fn writes_one_frame_per_scene() {
    let video = "tests/fixtures/three_scenes.mp4";
    if !Path::new(video).exists() {
        return;
    }

    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output_directory = temporary_directory.path().join("frames");

    let output = scenegrab()
        .args(["--video", video, "--manifest", "--outdir"])
        .arg(&output_directory)
        .output()
        .expect("Failed to run scenegrab");

    assert!(output.status.success(), "{output:?}");
    for scene in 1..=3 {
        let name = format!("scene_{scene:04}_frame_01.jpg");
        assert!(output_directory.join(&name).exists(), "missing {name}");
    }
    assert!(output_directory.join("manifest.json").exists());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("RESULTS:"), "stdout: {stdout}");
    assert!(stdout.contains("Scenes detected: 3"), "stdout: {stdout}");
}
