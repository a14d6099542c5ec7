//! Sample timestamp selection.
//!
//! Picks the points inside a scene where frames are extracted. The policy
//! is fixed so output is reproducible across runs:
//!
//! | frames | timestamps |
//! |--------|------------|
//! | 1 | midpoint |
//! | 2 | first and third quartile |
//! | N ≥ 3 | `start + duration · i / (N + 1)` for `i = 1..=N` |
//!
//! Scene boundaries themselves are never sampled.

use std::num::NonZeroU32;

use crate::{conversion::seconds_to_frame_number, scene::Scene};

/// A point in time chosen for extraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleTimestamp {
    /// Time in seconds from the start of the video.
    pub seconds: f64,
}

impl SampleTimestamp {
    /// Frame containing this timestamp: `floor(seconds × fps)`.
    pub fn frame_index(&self, frames_per_second: f64) -> u64 {
        seconds_to_frame_number(self.seconds, frames_per_second)
    }
}

/// Sample points for a `[start, end)` range, ascending.
///
/// ```
/// use std::num::NonZeroU32;
///
/// let points = scenegrab::sample_points(2.0, 6.0, NonZeroU32::new(3).unwrap());
/// assert_eq!(points, vec![3.0, 4.0, 5.0]);
/// ```
pub fn sample_points(start: f64, end: f64, count: NonZeroU32) -> Vec<f64> {
    let duration = end - start;
    match count.get() {
        1 => vec![(start + end) / 2.0],
        2 => vec![start + duration * 0.25, start + duration * 0.75],
        n => {
            let divisions = f64::from(n + 1);
            (1..=n)
                .map(|i| start + duration * f64::from(i) / divisions)
                .collect()
        }
    }
}

/// Sample timestamps for a scene.
pub fn sample_timestamps(scene: &Scene, count: NonZeroU32) -> Vec<SampleTimestamp> {
    sample_points(scene.start_seconds, scene.end_seconds, count)
        .into_iter()
        .map(|seconds| SampleTimestamp { seconds })
        .collect()
}
