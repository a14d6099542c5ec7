//! Sample timestamp selection tests.

use std::num::NonZeroU32;

use scenegrab::{Scene, sample_points, sample_timestamps};

fn count(n: u32) -> NonZeroU32 {
    NonZeroU32::new(n).expect("non-zero")
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn single_sample_is_midpoint() {
    let points = sample_points(2.0, 6.0, count(1));
    assert_eq!(points, vec![4.0]);
}

#[test]
fn two_samples_are_quartiles() {
    let points = sample_points(10.0, 20.0, count(2));
    assert_eq!(points.len(), 2);
    assert_close(points[0], 12.5);
    assert_close(points[1], 17.5);
}

#[test]
fn many_samples_are_evenly_spaced() {
    let points = sample_points(0.0, 5.0, count(4));
    let expected = [1.0, 2.0, 3.0, 4.0];
    assert_eq!(points.len(), expected.len());
    for (actual, expected) in points.iter().zip(expected) {
        assert_close(*actual, expected);
    }
}

#[test]
fn samples_stay_strictly_inside_scene() {
    for n in 1..=12 {
        let points = sample_points(3.0, 7.5, count(n));
        assert_eq!(points.len(), n as usize);
        assert!(points.iter().all(|&t| t > 3.0 && t < 7.5), "n = {n}: {points:?}");
        assert!(points.windows(2).all(|pair| pair[0] < pair[1]), "n = {n}: {points:?}");
    }
}

#[test]
fn samples_are_symmetric_around_midpoint() {
    for n in 1..=9 {
        let points = sample_points(1.0, 9.0, count(n));
        for (front, back) in points.iter().zip(points.iter().rev()) {
            assert_close(front + back, 10.0);
        }
    }
}

#[test]
fn timestamps_follow_scene_bounds() {
    let scene = Scene::from_frames(20, 50, 10.0);
    let timestamps = sample_timestamps(&scene, count(1));
    assert_eq!(timestamps.len(), 1);
    assert_close(timestamps[0].seconds, 3.5);
    assert_eq!(timestamps[0].frame_index(10.0), 35);
}

#[test]
fn frame_index_floors() {
    let scene = Scene::from_frames(0, 20, 10.0);
    let timestamps = sample_timestamps(&scene, count(3));
    let frames: Vec<u64> = timestamps.iter().map(|t| t.frame_index(10.0)).collect();
    assert_eq!(frames, vec![5, 10, 15]);
}
