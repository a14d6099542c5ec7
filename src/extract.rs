//! Frame extraction.
//!
//! [`FrameExtractor`] decodes the frames at a scene's sample timestamps.
//! One [`VideoFile`] handle is kept open across calls for the same path and
//! re-opened only when the path changes; every decode seeks on its own, so
//! reuse does not change which frames come back or in what order.

use std::path::Path;

use crate::{
    conversion::format_timestamp,
    error::SceneGrabError,
    frame::{ExtractedFrame, FrameIdentifier},
    progress::CancellationToken,
    sampler::SampleTimestamp,
    video::VideoFile,
};

/// Decodes frames at sample timestamps.
///
/// # Example
///
/// ```no_run
/// use std::num::NonZeroU32;
///
/// use scenegrab::{DetectionOptions, FrameExtractor};
///
/// let scenes = scenegrab::detect_scenes("input.mp4", &DetectionOptions::default(), None)?;
/// let mut extractor = FrameExtractor::new();
/// for (index, scene) in scenes.iter().enumerate() {
///     let samples = scenegrab::sample_timestamps(scene, NonZeroU32::MIN);
///     let frames = extractor.extract("input.mp4", index as u32 + 1, &samples, None)?;
///     for frame in frames {
///         frame.image.save(frame.identifier.file_name())?;
///     }
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Default)]
pub struct FrameExtractor {
    video: Option<VideoFile>,
}

impl FrameExtractor {
    /// Create an extractor with no open handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the frame at each timestamp of scene `scene_number` (1-based).
    ///
    /// Results keep the order of `timestamps`. A timestamp that fails to
    /// decode is logged and left out; its sample index is not reused, so
    /// identifiers stay tied to their sample position.
    ///
    /// # Errors
    ///
    /// - Any [`VideoFile::open`] error if the video cannot be opened.
    /// - [`SceneGrabError::Cancelled`] if `cancel` fires between frames.
    pub fn extract<P: AsRef<Path>>(
        &mut self,
        path: P,
        scene_number: u32,
        timestamps: &[SampleTimestamp],
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<ExtractedFrame>, SceneGrabError> {
        let video = self.video_for(path.as_ref())?;
        let frames_per_second = video.metadata().frames_per_second;
        let mut frames = Vec::with_capacity(timestamps.len());

        for (position, sample) in timestamps.iter().enumerate() {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                return Err(SceneGrabError::Cancelled);
            }

            let identifier = FrameIdentifier::new(scene_number, position as u32 + 1);
            let frame_number = sample.frame_index(frames_per_second);

            match video.frame(frame_number) {
                Ok(image) => {
                    let timestamp = format_timestamp(sample.seconds);
                    log::info!(
                        "Extracted frame {identifier} at {timestamp} (frame {frame_number})"
                    );
                    frames.push(ExtractedFrame {
                        image,
                        timestamp,
                        identifier,
                        seconds: sample.seconds,
                        frame_number,
                    });
                }
                Err(error) => {
                    log::warn!(
                        "Could not extract frame {} of scene {scene_number} at {:.2}s: {error}",
                        position + 1,
                        sample.seconds,
                    );
                }
            }
        }

        Ok(frames)
    }

    /// Close the open handle, if any.
    pub fn close(&mut self) {
        self.video = None;
    }

    fn video_for(&mut self, path: &Path) -> Result<&mut VideoFile, SceneGrabError> {
        let video = match self.video.take() {
            Some(video) if video.path() == path => video,
            _ => VideoFile::open(path)?,
        };
        Ok(self.video.insert(video))
    }
}
