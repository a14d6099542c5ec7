//! # scenegrab
//!
//! Detect scenes in a video file and extract representative still frames
//! from each of them.
//!
//! The crate is a linear batch pipeline built on FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate:
//!
//! 1. [`detect_scenes`] scans the video once and returns contiguous
//!    [`Scene`] ranges, cutting wherever the HSV content difference between
//!    consecutive frames reaches the threshold.
//! 2. [`sample_timestamps`] picks sample points inside each scene.
//! 3. [`FrameExtractor`] seeks to those points and decodes the frames.
//! 4. [`FrameWriter`] encodes each frame as
//!    `scene_{NNNN}_frame_{MM}.jpg` in the output directory.
//!
//! [`pipeline::run`] wires the stages together and returns a
//! [`RunSummary`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use scenegrab::{CancellationToken, ExtractionConfig, FfmpegBackend, SceneGrabError};
//!
//! let config = ExtractionConfig::new("input.mp4", "frames")
//!     .with_threshold(27.0)
//!     .with_frames_per_scene(3)
//!     .validate()?;
//!
//! let mut backend = FfmpegBackend::new();
//! let summary = scenegrab::pipeline::run(&config, &mut backend, &CancellationToken::new(), None)?;
//! println!("{summary}");
//! # Ok::<(), SceneGrabError>(())
//! ```
//!
//! ## Detecting scenes only
//!
//! ```no_run
//! use scenegrab::{DetectionOptions, SceneGrabError};
//!
//! let scenes = scenegrab::detect_scenes("input.mp4", &DetectionOptions::default(), None)?;
//! for scene in &scenes {
//!     println!("{:.2}s - {:.2}s", scene.start_seconds, scene.end_seconds);
//! }
//! # Ok::<(), SceneGrabError>(())
//! ```
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod configuration;
mod conversion;
pub mod error;
pub mod extract;
pub mod ffmpeg;
pub mod frame;
pub mod manifest;
pub mod metadata;
pub mod pipeline;
pub mod progress;
pub mod sampler;
pub mod scene;
pub mod video;
pub mod writer;

pub use configuration::ExtractionConfig;
pub use conversion::format_timestamp;
pub use error::SceneGrabError;
pub use extract::FrameExtractor;
pub use ffmpeg::{FfmpegLogLevel, get_ffmpeg_log_level, set_ffmpeg_log_level};
pub use frame::{ExtractedFrame, FrameIdentifier};
pub use manifest::Manifest;
pub use metadata::VideoMetadata;
pub use pipeline::{FfmpegBackend, MediaBackend, RunSummary};
pub use progress::{CancellationToken, ProgressCallback, ProgressInfo};
pub use sampler::{SampleTimestamp, sample_points, sample_timestamps};
pub use scene::{CutDetector, DetectionOptions, Scene, content_score, detect_scenes};
pub use video::VideoFile;
pub use writer::{FrameWriter, write_jpeg};
