//! Extracted frames and their identifiers.

use std::fmt::{Display, Formatter, Result as FmtResult};

use image::DynamicImage;

/// Deterministic name of an extracted frame.
///
/// Renders as `scene_{scene:04}_frame_{sample:02}`. Both indices are
/// 1-based: `scene` counts detected scenes, `sample` counts samples within
/// one scene. The rendered string is the output file stem.
///
/// ```
/// use scenegrab::FrameIdentifier;
///
/// let id = FrameIdentifier::new(12, 3);
/// assert_eq!(id.to_string(), "scene_0012_frame_03");
/// assert_eq!(id.file_name(), "scene_0012_frame_03.jpg");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameIdentifier {
    /// 1-based scene index.
    pub scene: u32,
    /// 1-based sample index within the scene.
    pub sample: u32,
}

impl FrameIdentifier {
    /// Identifier for the `sample`-th frame of the `scene`-th scene.
    pub fn new(scene: u32, sample: u32) -> Self {
        Self { scene, sample }
    }

    /// Output file name (`{identifier}.jpg`).
    pub fn file_name(&self) -> String {
        format!("{self}.jpg")
    }
}

impl Display for FrameIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "scene_{:04}_frame_{:02}", self.scene, self.sample)
    }
}

/// A decoded frame ready to be written.
#[derive(Debug, Clone)]
pub struct ExtractedFrame {
    /// Decoded RGB raster.
    pub image: DynamicImage,
    /// Display timestamp (`MM:SS`) of the sample point.
    pub timestamp: String,
    /// File-name identifier.
    pub identifier: FrameIdentifier,
    /// Sample point in seconds.
    pub seconds: f64,
    /// Frame index the sample point was decoded from.
    pub frame_number: u64,
}
