//! Scene detection.
//!
//! Scans a video once and splits it into contiguous [`Scene`] ranges. Every
//! decoded frame is downscaled, converted to HSV and compared against the
//! previous frame; when the mean channel difference reaches the threshold a
//! new scene begins at that frame.
//!
//! # Example
//!
//! ```no_run
//! use scenegrab::{DetectionOptions, SceneGrabError};
//!
//! let options = DetectionOptions::new().threshold(27.0);
//! let scenes = scenegrab::detect_scenes("input.mp4", &options, None)?;
//! for (index, scene) in scenes.iter().enumerate() {
//!     println!(
//!         "scene {}: {:.2}s - {:.2}s ({} frames)",
//!         index + 1,
//!         scene.start_seconds,
//!         scene.end_seconds,
//!         scene.frame_len(),
//!     );
//! }
//! # Ok::<(), SceneGrabError>(())
//! ```

use std::path::Path;

use ffmpeg_next::frame::Video as VideoFrame;
use image::RgbImage;

use crate::{
    configuration::{DEFAULT_MIN_SCENE_LENGTH, DEFAULT_THRESHOLD},
    conversion::frame_number_to_seconds,
    error::SceneGrabError,
    progress::CancellationToken,
    video::{RgbConverter, VideoFile, receive_frame},
};

/// Width breakpoints and the downscale factor applied at or above each.
const DOWNSCALE_FACTORS: [(u32, u32); 7] = [
    (3200, 12),
    (2100, 8),
    (1700, 6),
    (1200, 5),
    (900, 4),
    (600, 3),
    (400, 2),
];

/// A contiguous time range of the video between two cuts.
///
/// `end_frame` is exclusive, so consecutive scenes share a boundary:
/// `scenes[i].end_frame == scenes[i + 1].start_frame`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scene {
    /// Start of the scene in seconds.
    pub start_seconds: f64,
    /// End of the scene in seconds.
    pub end_seconds: f64,
    /// First frame of the scene.
    pub start_frame: u64,
    /// First frame after the scene.
    pub end_frame: u64,
}

impl Scene {
    /// Build a scene from a frame range. An `end_frame` before
    /// `start_frame` is raised to it, giving an empty scene.
    pub fn from_frames(start_frame: u64, end_frame: u64, frames_per_second: f64) -> Self {
        let end_frame = end_frame.max(start_frame);
        Self {
            start_seconds: frame_number_to_seconds(start_frame, frames_per_second),
            end_seconds: frame_number_to_seconds(end_frame, frames_per_second),
            start_frame,
            end_frame,
        }
    }

    /// Split `total_frames` frames into scenes at the given cut frames.
    ///
    /// Cuts must be ascending. Cuts at frame 0 or at/after `total_frames`
    /// are ignored. Without usable cuts the whole video is one scene; with
    /// no frames there are no scenes.
    pub fn from_cuts(cuts: &[u64], total_frames: u64, frames_per_second: f64) -> Vec<Scene> {
        if total_frames == 0 {
            return Vec::new();
        }

        let mut scenes = Vec::with_capacity(cuts.len() + 1);
        let mut start = 0;
        for &cut in cuts {
            if cut <= start || cut >= total_frames {
                continue;
            }
            scenes.push(Scene::from_frames(start, cut, frames_per_second));
            start = cut;
        }
        scenes.push(Scene::from_frames(start, total_frames, frames_per_second));
        scenes
    }

    /// Length in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }

    /// Length in frames.
    pub fn frame_len(&self) -> u64 {
        self.end_frame.saturating_sub(self.start_frame)
    }
}

/// Scene detector settings.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionOptions {
    /// Minimum content score that marks a cut. Default: 30.0.
    ///
    /// Scores are the mean absolute HSV difference between consecutive
    /// frames on an 8-bit scale, so the useful range is roughly 0 to 100.
    pub threshold: f64,
    /// Minimum number of frames between two cuts. Default: 15.
    pub min_scene_length: u64,
    /// Integer downscale factor applied before scoring. `None` picks one
    /// from the frame width.
    pub downscale: Option<u32>,
}

impl Default for DetectionOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            min_scene_length: DEFAULT_MIN_SCENE_LENGTH,
            downscale: None,
        }
    }
}

impl DetectionOptions {
    /// Detector settings with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum score required for a cut.
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the minimum number of frames between cuts.
    pub fn min_scene_length(mut self, frames: u64) -> Self {
        self.min_scene_length = frames;
        self
    }

    /// Force a downscale factor (values below 1 are treated as 1).
    pub fn downscale(mut self, factor: u32) -> Self {
        self.downscale = Some(factor.max(1));
        self
    }

    fn downscale_factor(&self, width: u32) -> u32 {
        self.downscale.unwrap_or_else(|| {
            DOWNSCALE_FACTORS
                .iter()
                .find(|(min_width, _)| width >= *min_width)
                .map(|(_, factor)| *factor)
                .unwrap_or(1)
        })
    }
}

/// Detect scenes in the video at `path`.
///
/// Decodes every frame of the best video stream once. The video handle is
/// released before this function returns, on success and on error.
///
/// # Errors
///
/// - [`SceneGrabError::NotFound`] / [`SceneGrabError::FileOpen`] if the
///   video cannot be opened.
/// - [`SceneGrabError::VideoDecodeError`] if decoding fails mid-scan. No
///   partial scene list is returned.
/// - [`SceneGrabError::Cancelled`] if `cancel` fires during the scan.
pub fn detect_scenes<P: AsRef<Path>>(
    path: P,
    options: &DetectionOptions,
    cancel: Option<&CancellationToken>,
) -> Result<Vec<Scene>, SceneGrabError> {
    let path = path.as_ref();
    log::info!("Analysing scenes in video: {}", path.display());

    let mut video = VideoFile::open(path)?;
    let scenes = scan(&mut video, options, cancel)?;

    log::info!("Found {} scene(s)", scenes.len());
    Ok(scenes)
}

fn scan(
    video: &mut VideoFile,
    options: &DetectionOptions,
    cancel: Option<&CancellationToken>,
) -> Result<Vec<Scene>, SceneGrabError> {
    let metadata = video.metadata().clone();
    let factor = options.downscale_factor(metadata.width);
    let width = metadata.width.div_ceil(factor).max(1);
    let height = metadata.height.div_ceil(factor).max(1);

    log::debug!(
        "Detecting scenes (stream={}, threshold={}, min_scene_length={}, downscale={} -> {}x{})",
        metadata.stream_index,
        options.threshold,
        options.min_scene_length,
        factor,
        width,
        height,
    );

    let (mut decoder, _) = video.decoder()?;
    let mut converter = RgbConverter::new(width, height);
    let mut detector = CutDetector::new(options);
    let mut decoded_frame = VideoFrame::empty();

    for (stream, packet) in video.input_context.packets() {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(SceneGrabError::Cancelled);
        }

        if stream.index() != metadata.stream_index {
            continue;
        }

        decoder
            .send_packet(&packet)
            .map_err(|error| SceneGrabError::VideoDecodeError(error.to_string()))?;

        while receive_frame(&mut decoder, &mut decoded_frame)? {
            detector.push(&converter.convert(&decoded_frame)?);
        }
    }

    decoder
        .send_eof()
        .map_err(|error| SceneGrabError::VideoDecodeError(error.to_string()))?;
    while receive_frame(&mut decoder, &mut decoded_frame)? {
        detector.push(&converter.convert(&decoded_frame)?);
    }

    log::debug!(
        "Scanned {} frame(s), {} cut(s)",
        detector.frame_count(),
        detector.cuts().len()
    );

    Ok(detector.into_scenes(metadata.frames_per_second))
}

/// Incremental content detector.
///
/// Frames are pushed in decode order and numbered from 0. A cut is placed
/// at frame `n` when its [`content_score`] against frame `n - 1` reaches
/// the threshold and at least `min_scene_length` frames have passed since
/// the previous cut. The first frame counts as the previous cut, so no cut
/// can land inside the first `min_scene_length` frames.
///
/// ```
/// use image::{Rgb, RgbImage};
/// use scenegrab::{CutDetector, DetectionOptions};
///
/// let mut detector = CutDetector::new(&DetectionOptions::new().min_scene_length(2));
/// let black = RgbImage::from_pixel(4, 4, Rgb([0, 0, 0]));
/// let white = RgbImage::from_pixel(4, 4, Rgb([255, 255, 255]));
/// for frame in [&black, &black, &white, &white] {
///     detector.push(frame);
/// }
/// assert_eq!(detector.cuts(), &[2]);
/// ```
#[derive(Debug, Clone)]
pub struct CutDetector {
    threshold: f64,
    min_scene_length: u64,
    previous: Option<Vec<[u8; 3]>>,
    last_cut: u64,
    frame_count: u64,
    cuts: Vec<u64>,
}

impl CutDetector {
    /// Detector using the threshold and minimum scene length of `options`.
    pub fn new(options: &DetectionOptions) -> Self {
        Self {
            threshold: options.threshold,
            min_scene_length: options.min_scene_length,
            previous: None,
            last_cut: 0,
            frame_count: 0,
            cuts: Vec::new(),
        }
    }

    /// Score the next frame. Returns its frame number if a cut was placed
    /// there.
    pub fn push(&mut self, frame: &RgbImage) -> Option<u64> {
        let frame_number = self.frame_count;
        let current = to_hsv(frame);
        let mut cut = None;

        if let Some(previous) = &self.previous {
            let score = hsv_distance(previous, &current);
            log::trace!("frame {frame_number}: content score {score:.3}");

            if score >= self.threshold && frame_number - self.last_cut >= self.min_scene_length {
                log::debug!("Cut at frame {frame_number} (score {score:.2})");
                self.cuts.push(frame_number);
                self.last_cut = frame_number;
                cut = Some(frame_number);
            }
        }

        self.previous = Some(current);
        self.frame_count += 1;
        cut
    }

    /// Frames pushed so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Cut frames found so far, ascending.
    pub fn cuts(&self) -> &[u64] {
        &self.cuts
    }

    /// Split the frames pushed so far into scenes.
    pub fn into_scenes(self, frames_per_second: f64) -> Vec<Scene> {
        Scene::from_cuts(&self.cuts, self.frame_count, frames_per_second)
    }
}

/// Content-change score between two frames of equal size.
///
/// Both frames are converted to HSV (hue 0..180, saturation and value
/// 0..256); the score is the average over the three channels of the mean
/// absolute per-pixel difference. Frames of different sizes score 255.
///
/// ```
/// use image::{Rgb, RgbImage};
///
/// let black = RgbImage::from_pixel(4, 4, Rgb([0, 0, 0]));
/// let white = RgbImage::from_pixel(4, 4, Rgb([255, 255, 255]));
/// assert_eq!(scenegrab::content_score(&black, &black), 0.0);
/// assert_eq!(scenegrab::content_score(&black, &white), 85.0);
/// ```
pub fn content_score(previous: &RgbImage, current: &RgbImage) -> f64 {
    if previous.dimensions() != current.dimensions() {
        return 255.0;
    }
    hsv_distance(&to_hsv(previous), &to_hsv(current))
}

fn hsv_distance(previous: &[[u8; 3]], current: &[[u8; 3]]) -> f64 {
    if previous.len() != current.len() {
        return 255.0;
    }
    if current.is_empty() {
        return 0.0;
    }

    let mut sums = [0u64; 3];
    for (a, b) in previous.iter().zip(current) {
        for channel in 0..3 {
            sums[channel] += u64::from(a[channel].abs_diff(b[channel]));
        }
    }

    let pixels = current.len() as f64;
    sums.iter().map(|&sum| sum as f64 / pixels).sum::<f64>() / 3.0
}

fn to_hsv(frame: &RgbImage) -> Vec<[u8; 3]> {
    frame.pixels().map(|pixel| rgb_to_hsv(pixel.0)).collect()
}

/// 8-bit RGB to HSV with hue halved into 0..180.
fn rgb_to_hsv([r, g, b]: [u8; 3]) -> [u8; 3] {
    let (r, g, b) = (f32::from(r), f32::from(g), f32::from(b));
    let value = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = value - min;

    let saturation = if value > 0.0 { delta * 255.0 / value } else { 0.0 };

    let mut hue = if delta == 0.0 {
        0.0
    } else if value == r {
        60.0 * (g - b) / delta
    } else if value == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    if hue < 0.0 {
        hue += 360.0;
    }

    [
        ((hue / 2.0).round() as u8).min(179),
        saturation.round() as u8,
        value as u8,
    ]
}
