//! Video stream metadata.
//!
//! [`VideoMetadata`] is extracted once when a [`VideoFile`](crate::VideoFile)
//! is opened and cached for the lifetime of the handle.

use std::time::Duration;

/// Metadata for the video stream selected from a file.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second (approximate for variable-frame-rate content).
    pub frames_per_second: f64,
    /// Total number of frames.
    ///
    /// Taken from the stream header when present, otherwise estimated from
    /// duration and frame rate.
    pub frame_count: u64,
    /// Duration of the container.
    pub duration: Duration,
    /// Presentation time of the stream's first frame, in seconds.
    ///
    /// Frame numbers count from this point, so frame 0 is always the first
    /// decoded frame even in streams that start late (e.g. MPEG-TS).
    pub start_seconds: f64,
    /// Codec name (e.g. `"h264"`, `"vp9"`).
    pub codec: String,
    /// Index of the stream inside the container.
    pub stream_index: usize,
}

impl VideoMetadata {
    /// Duration in seconds as a float.
    pub fn duration_seconds(&self) -> f64 {
        self.duration.as_secs_f64()
    }
}
