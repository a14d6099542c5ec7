//! Run configuration.
//!
//! [`ExtractionConfig`] is a builder that collects every setting of a run
//! (input, output, detector sensitivity, sampling density, encoding) into
//! one immutable value. [`validate`](ExtractionConfig::validate) checks it
//! once at startup; the pipeline never re-reads loose arguments.
//!
//! # Example
//!
//! ```
//! use scenegrab::ExtractionConfig;
//!
//! let config = ExtractionConfig::new("input.mp4", "frames")
//!     .with_threshold(20.0)
//!     .with_frames_per_scene(2)
//!     .validate()
//!     .unwrap();
//!
//! assert_eq!(config.frames_per_scene.get(), 2);
//! assert_eq!(config.jpeg_quality, 95);
//! ```

use std::num::NonZeroU32;
use std::path::PathBuf;

use crate::error::SceneGrabError;
use crate::scene::DetectionOptions;

/// Default content-change threshold.
pub const DEFAULT_THRESHOLD: f64 = 30.0;

/// Default number of frames sampled from every scene.
pub const DEFAULT_FRAMES_PER_SCENE: u32 = 1;

/// Default minimum scene length, in frames.
pub const DEFAULT_MIN_SCENE_LENGTH: u64 = 15;

/// Default JPEG quality.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Settings for one extraction run.
///
/// Construct with [`ExtractionConfig::new`], adjust with the `with_*`
/// methods, then call [`validate`](ExtractionConfig::validate).
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionConfig {
    /// Video file to analyse.
    pub video: PathBuf,
    /// Directory the JPEG files are written into. Created if missing.
    pub output_directory: PathBuf,
    /// Content-change threshold. Larger values detect fewer cuts.
    /// Default: 30.0.
    pub threshold: f64,
    /// How many frames to extract from every scene. Default: 1.
    pub frames_per_scene: NonZeroU32,
    /// Minimum number of frames between two cuts. Default: 15.
    pub min_scene_length: u64,
    /// JPEG quality, 1 to 100. Default: 95.
    pub jpeg_quality: u8,
    /// Write `manifest.json` next to the frames. Default: `false`.
    pub write_manifest: bool,
}

impl ExtractionConfig {
    /// Create a configuration with default settings for the given input
    /// video and output directory.
    pub fn new(video: impl Into<PathBuf>, output_directory: impl Into<PathBuf>) -> Self {
        Self {
            video: video.into(),
            output_directory: output_directory.into(),
            threshold: DEFAULT_THRESHOLD,
            frames_per_scene: NonZeroU32::new(DEFAULT_FRAMES_PER_SCENE).unwrap_or(NonZeroU32::MIN),
            min_scene_length: DEFAULT_MIN_SCENE_LENGTH,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            write_manifest: false,
        }
    }

    /// Set the content-change threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the number of frames sampled per scene.
    ///
    /// Zero is clamped to 1.
    #[must_use]
    pub fn with_frames_per_scene(mut self, count: u32) -> Self {
        self.frames_per_scene = NonZeroU32::new(count).unwrap_or(NonZeroU32::MIN);
        self
    }

    /// Set the minimum scene length in frames.
    #[must_use]
    pub fn with_min_scene_length(mut self, frames: u64) -> Self {
        self.min_scene_length = frames;
        self
    }

    /// Set the JPEG quality.
    #[must_use]
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    /// Enable or disable the JSON manifest.
    #[must_use]
    pub fn with_manifest(mut self, enabled: bool) -> Self {
        self.write_manifest = enabled;
        self
    }

    /// Check every field and return the configuration unchanged if it is
    /// usable.
    ///
    /// # Errors
    ///
    /// Returns [`SceneGrabError::InvalidConfiguration`] when the threshold is
    /// negative or not finite, the JPEG quality is outside 1..=100, or either
    /// path is empty.
    pub fn validate(self) -> Result<Self, SceneGrabError> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(SceneGrabError::InvalidConfiguration(format!(
                "threshold must be a non-negative number, got {}",
                self.threshold
            )));
        }

        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(SceneGrabError::InvalidConfiguration(format!(
                "JPEG quality must be between 1 and 100, got {}",
                self.jpeg_quality
            )));
        }

        if self.video.as_os_str().is_empty() {
            return Err(SceneGrabError::InvalidConfiguration(
                "video path is empty".to_string(),
            ));
        }

        if self.output_directory.as_os_str().is_empty() {
            return Err(SceneGrabError::InvalidConfiguration(
                "output directory is empty".to_string(),
            ));
        }

        Ok(self)
    }

    /// Detector settings derived from this configuration.
    pub fn detection_options(&self) -> DetectionOptions {
        DetectionOptions::new()
            .threshold(self.threshold)
            .min_scene_length(self.min_scene_length)
    }
}
