//! Video file handle.
//!
//! [`VideoFile`] owns an FFmpeg demuxer context for one file. It probes the
//! best video stream on open, caches its [`VideoMetadata`], and decodes
//! single frames by seeking. The demuxer is closed when the handle is
//! dropped, so every early return or `?` releases it.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{
    codec::{context::Context as CodecContext, decoder::Video as VideoDecoder},
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    util::error::EAGAIN,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::{DynamicImage, RgbImage};

use crate::{
    conversion::{frame_number_to_seek_timestamp, packed_rgb, pts_to_frame_number},
    error::SceneGrabError,
    metadata::VideoMetadata,
};

/// An open video file.
///
/// # Example
///
/// ```no_run
/// use scenegrab::VideoFile;
///
/// let mut video = VideoFile::open("input.mp4")?;
/// println!("{:.2} fps", video.metadata().frames_per_second);
/// let image = video.frame(42)?;
/// image.save("frame_42.png")?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct VideoFile {
    pub(crate) input_context: Input,
    pub(crate) metadata: VideoMetadata,
    path: PathBuf,
}

impl Debug for VideoFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoFile")
            .field("path", &self.path)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl VideoFile {
    /// Open a video file and probe its best video stream.
    ///
    /// # Errors
    ///
    /// - [`SceneGrabError::NotFound`] if `path` does not exist.
    /// - [`SceneGrabError::FileOpen`] if FFmpeg cannot open or parse it.
    /// - [`SceneGrabError::NoVideoStream`] if it has no video stream.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SceneGrabError> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            return Err(SceneGrabError::NotFound(path));
        }

        log::debug!("Opening video file: {}", path.display());

        ffmpeg_next::init().map_err(|error| SceneGrabError::FileOpen {
            path: path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| SceneGrabError::FileOpen {
                path: path.clone(),
                reason: error.to_string(),
            })?;

        let metadata = probe_video_stream(&input_context, &path)?;

        log::debug!(
            "Opened {}: stream={}, {}x{}, {:.3} fps, codec={}, ~{} frames, {:.2}s",
            path.display(),
            metadata.stream_index,
            metadata.width,
            metadata.height,
            metadata.frames_per_second,
            metadata.codec,
            metadata.frame_count,
            metadata.duration_seconds(),
        );

        Ok(Self {
            input_context,
            metadata,
            path,
        })
    }

    /// Cached metadata of the selected video stream.
    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    /// Path the handle was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decode a single frame by frame number (0-indexed).
    ///
    /// Seeks to the nearest keyframe before the target and decodes forward
    /// until a frame at or after the target is reached.
    ///
    /// # Errors
    ///
    /// - [`SceneGrabError::FrameOutOfRange`] if `frame_number` is not below
    ///   the frame count.
    /// - [`SceneGrabError::VideoDecodeError`] if decoding fails or the stream
    ///   ends before the target.
    pub fn frame(&mut self, frame_number: u64) -> Result<DynamicImage, SceneGrabError> {
        let total_frames = self.metadata.frame_count;
        if total_frames > 0 && frame_number >= total_frames {
            return Err(SceneGrabError::FrameOutOfRange {
                frame_number,
                total_frames,
            });
        }

        let video_stream_index = self.metadata.stream_index;
        let frames_per_second = self.metadata.frames_per_second;
        let start_seconds = self.metadata.start_seconds;
        let (width, height) = (self.metadata.width, self.metadata.height);

        let (mut decoder, time_base) = self.decoder()?;
        let mut converter = RgbConverter::new(width, height);

        let seek_timestamp =
            frame_number_to_seek_timestamp(frame_number, frames_per_second, start_seconds);
        self.input_context
            .seek(seek_timestamp, ..seek_timestamp)
            .map_err(|error| {
                SceneGrabError::VideoDecodeError(format!(
                    "Seek to frame {frame_number} failed: {error}"
                ))
            })?;

        let mut decoded_frame = VideoFrame::empty();

        for (stream, packet) in self.input_context.packets() {
            if stream.index() != video_stream_index {
                continue;
            }

            decoder
                .send_packet(&packet)
                .map_err(|error| SceneGrabError::VideoDecodeError(error.to_string()))?;

            if receive_until(&mut decoder, &mut decoded_frame, |pts| {
                pts_to_frame_number(pts, time_base, frames_per_second, start_seconds)
                    >= frame_number
            })? {
                return converter.convert(&decoded_frame).map(DynamicImage::ImageRgb8);
            }
        }

        decoder
            .send_eof()
            .map_err(|error| SceneGrabError::VideoDecodeError(error.to_string()))?;
        if receive_until(&mut decoder, &mut decoded_frame, |pts| {
            pts_to_frame_number(pts, time_base, frames_per_second, start_seconds) >= frame_number
        })? {
            return converter.convert(&decoded_frame).map(DynamicImage::ImageRgb8);
        }

        Err(SceneGrabError::VideoDecodeError(format!(
            "Could not locate frame {frame_number} in the video stream"
        )))
    }

    /// Build a fresh decoder for the selected stream.
    pub(crate) fn decoder(
        &self,
    ) -> Result<(VideoDecoder, ffmpeg_next::Rational), SceneGrabError> {
        let stream = self
            .input_context
            .stream(self.metadata.stream_index)
            .ok_or(SceneGrabError::NoVideoStream)?;
        let time_base = stream.time_base();
        let decoder_context = CodecContext::from_parameters(stream.parameters())?;
        let decoder = decoder_context.decoder().video()?;
        Ok((decoder, time_base))
    }
}

impl Drop for VideoFile {
    fn drop(&mut self) {
        log::debug!("Releasing video file: {}", self.path.display());
    }
}

/// Pull the next decoded frame into `decoded_frame`.
///
/// `Ok(false)` means the decoder wants another packet or has been fully
/// drained. Any other decoder failure is an error.
pub(crate) fn receive_frame(
    decoder: &mut VideoDecoder,
    decoded_frame: &mut VideoFrame,
) -> Result<bool, SceneGrabError> {
    match decoder.receive_frame(decoded_frame) {
        Ok(()) => Ok(true),
        Err(error) if is_drained(&error) => Ok(false),
        Err(error) => Err(SceneGrabError::VideoDecodeError(error.to_string())),
    }
}

fn is_drained(error: &ffmpeg_next::Error) -> bool {
    match error {
        ffmpeg_next::Error::Eof => true,
        ffmpeg_next::Error::Other { errno } => *errno == EAGAIN,
        _ => false,
    }
}

/// Drain decoded frames until one's timestamp satisfies `reached`. The
/// matching frame is left in `decoded_frame`.
fn receive_until(
    decoder: &mut VideoDecoder,
    decoded_frame: &mut VideoFrame,
    reached: impl Fn(i64) -> bool,
) -> Result<bool, SceneGrabError> {
    while receive_frame(decoder, decoded_frame)? {
        let pts = decoded_frame
            .timestamp()
            .or_else(|| decoded_frame.pts())
            .unwrap_or(0);
        if reached(pts) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// `AV_NOPTS_VALUE`: the stream does not report a start time.
const NO_PTS: i64 = i64::MIN;

fn probe_video_stream(input_context: &Input, path: &Path) -> Result<VideoMetadata, SceneGrabError> {
    let stream = input_context
        .streams()
        .best(Type::Video)
        .ok_or(SceneGrabError::NoVideoStream)?;
    let stream_index = stream.index();

    let decoder_context = CodecContext::from_parameters(stream.parameters()).map_err(|error| {
        SceneGrabError::FileOpen {
            path: path.to_path_buf(),
            reason: format!("Failed to read codec parameters for stream {stream_index}: {error}"),
        }
    })?;
    let decoder = decoder_context
        .decoder()
        .video()
        .map_err(|error| SceneGrabError::FileOpen {
            path: path.to_path_buf(),
            reason: format!("Failed to create video decoder for stream {stream_index}: {error}"),
        })?;

    let duration_microseconds = input_context.duration();
    let duration = if duration_microseconds > 0 {
        Duration::from_micros(duration_microseconds as u64)
    } else {
        Duration::ZERO
    };

    let frame_rate = stream.avg_frame_rate();
    let frames_per_second = if frame_rate.denominator() != 0 && frame_rate.numerator() != 0 {
        frame_rate.numerator() as f64 / frame_rate.denominator() as f64
    } else {
        let rate = stream.rate();
        if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            0.0
        }
    };

    if frames_per_second <= 0.0 {
        return Err(SceneGrabError::FileOpen {
            path: path.to_path_buf(),
            reason: "video stream reports no frame rate".to_string(),
        });
    }

    let time_base = stream.time_base();
    let start_seconds = match stream.start_time() {
        NO_PTS => 0.0,
        start if time_base.denominator() != 0 => {
            start as f64 * f64::from(time_base.numerator()) / f64::from(time_base.denominator())
        }
        _ => 0.0,
    };

    let frame_count = if stream.frames() > 0 {
        stream.frames() as u64
    } else {
        (duration.as_secs_f64() * frames_per_second) as u64
    };

    let codec = decoder
        .codec()
        .map(|codec| codec.name().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    Ok(VideoMetadata {
        width: decoder.width(),
        height: decoder.height(),
        frames_per_second,
        frame_count,
        duration,
        start_seconds,
        codec,
        stream_index,
    })
}

/// Converts decoded frames of any pixel format to packed RGB24 at a fixed
/// output size.
///
/// The scaling context is built from the first frame it sees, since a
/// decoder's advertised format can differ from what it actually emits.
pub(crate) struct RgbConverter {
    scaler: Option<ScalingContext>,
    source: (Pixel, u32, u32),
    width: u32,
    height: u32,
    rgb_frame: VideoFrame,
}

impl RgbConverter {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            scaler: None,
            source: (Pixel::None, 0, 0),
            width,
            height,
            rgb_frame: VideoFrame::empty(),
        }
    }

    /// Scale `frame` and copy it into a tightly-packed [`RgbImage`].
    pub(crate) fn convert(&mut self, frame: &VideoFrame) -> Result<RgbImage, SceneGrabError> {
        let source = (frame.format(), frame.width(), frame.height());
        if self.scaler.is_none() || self.source != source {
            self.scaler = Some(ScalingContext::get(
                source.0,
                source.1,
                source.2,
                Pixel::RGB24,
                self.width,
                self.height,
                ScalingFlags::BILINEAR,
            )?);
            self.source = source;
        }

        if let Some(scaler) = self.scaler.as_mut() {
            scaler.run(frame, &mut self.rgb_frame)?;
        }

        let buffer = packed_rgb(&self.rgb_frame, self.width, self.height);
        RgbImage::from_raw(self.width, self.height, buffer).ok_or_else(|| {
            SceneGrabError::VideoDecodeError(
                "Failed to construct RGB image from decoded frame data".to_string(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use ffmpeg_next::{Error, util::error::EAGAIN};

    use super::is_drained;

    #[test]
    fn again_and_end_of_stream_mean_drained() {
        assert!(is_drained(&Error::Eof));
        assert!(is_drained(&Error::Other { errno: EAGAIN }));
    }

    #[test]
    fn decoder_failures_are_not_drained() {
        assert!(!is_drained(&Error::InvalidData));
        assert!(!is_drained(&Error::Bug));
    }
}
