//! JPEG output.
//!
//! [`FrameWriter`] is the last stage of the pipeline. Failures stop here:
//! a frame that cannot be encoded or written is logged and counted, and
//! the caller moves on to the next one.

use std::{
    borrow::Cow,
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use image::{DynamicImage, RgbImage, codecs::jpeg::JpegEncoder};

use crate::{
    configuration::DEFAULT_JPEG_QUALITY, error::SceneGrabError, frame::ExtractedFrame,
};

/// Writes extracted frames as `{output_directory}/{identifier}.jpg`.
///
/// The output directory must already exist.
#[derive(Debug, Clone)]
pub struct FrameWriter {
    output_directory: PathBuf,
    quality: u8,
    written: u64,
    failed: u64,
}

impl FrameWriter {
    /// Writer for `output_directory` at the default quality (95).
    pub fn new(output_directory: impl Into<PathBuf>) -> Self {
        Self {
            output_directory: output_directory.into(),
            quality: DEFAULT_JPEG_QUALITY,
            written: 0,
            failed: 0,
        }
    }

    /// Set the JPEG quality (clamped to 1..=100).
    #[must_use]
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(1, 100);
        self
    }

    /// Where a frame would be written.
    pub fn path_for(&self, frame: &ExtractedFrame) -> PathBuf {
        self.output_directory.join(frame.identifier.file_name())
    }

    /// Encode and write one frame.
    ///
    /// Returns the written path, or `None` after logging the failure.
    pub fn save(&mut self, frame: &ExtractedFrame) -> Option<PathBuf> {
        let path = self.path_for(frame);
        match write_jpeg(&frame.image, &path, self.quality) {
            Ok(()) => {
                self.written += 1;
                log::info!("Saved frame: {}", path.display());
                Some(path)
            }
            Err(error) => {
                self.failed += 1;
                log::error!("Failed to save frame {}: {error}", frame.identifier);
                None
            }
        }
    }

    /// Frames written successfully.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Frames that failed to encode or write.
    pub fn failed(&self) -> u64 {
        self.failed
    }
}

/// Encode `image` as JPEG at `quality` and write it to `path`.
///
/// Images that are not RGB8 are converted first.
///
/// # Errors
///
/// Returns [`SceneGrabError::WriteError`] naming `path` if the file cannot
/// be created, encoded or flushed.
pub fn write_jpeg(image: &DynamicImage, path: &Path, quality: u8) -> Result<(), SceneGrabError> {
    let write_error = |reason: String| SceneGrabError::WriteError {
        path: path.to_path_buf(),
        reason,
    };

    let rgb: Cow<'_, RgbImage> = match image {
        DynamicImage::ImageRgb8(rgb) => Cow::Borrowed(rgb),
        other => Cow::Owned(other.to_rgb8()),
    };

    let file = File::create(path).map_err(|error| write_error(error.to_string()))?;
    let mut writer = BufWriter::new(file);

    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut writer, quality))
        .map_err(|error| write_error(error.to_string()))?;
    writer
        .flush()
        .map_err(|error| write_error(error.to_string()))?;

    Ok(())
}
