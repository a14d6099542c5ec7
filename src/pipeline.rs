//! Run orchestration.
//!
//! [`run`] drives one extraction: validate the input, prepare the output
//! directory, detect scenes once, then sample, extract and write every
//! scene in order. Failures are sorted by where they happen:
//!
//! - a missing input, a detector error or cancellation aborts the run;
//! - a scene whose frames cannot be extracted at all is logged and skipped;
//! - a single frame that fails to decode or write is logged and skipped.
//!
//! The FFmpeg work sits behind [`MediaBackend`] so the orchestration can be
//! driven by any source of scenes and frames.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use crate::{
    configuration::ExtractionConfig,
    error::SceneGrabError,
    extract::FrameExtractor,
    frame::ExtractedFrame,
    manifest::Manifest,
    progress::{CancellationToken, ProgressCallback, ProgressInfo},
    sampler::{SampleTimestamp, sample_timestamps},
    scene::{DetectionOptions, Scene},
    writer::FrameWriter,
};

/// Source of scenes and decoded frames for [`run`].
pub trait MediaBackend {
    /// Detect the scenes of `video`.
    fn detect_scenes(
        &mut self,
        video: &Path,
        options: &DetectionOptions,
        cancel: &CancellationToken,
    ) -> Result<Vec<Scene>, SceneGrabError>;

    /// Decode the frames of scene `scene_number` (1-based) at `timestamps`.
    ///
    /// Frames that fail individually are left out of the result.
    fn extract_frames(
        &mut self,
        video: &Path,
        scene_number: u32,
        timestamps: &[SampleTimestamp],
        cancel: &CancellationToken,
    ) -> Result<Vec<ExtractedFrame>, SceneGrabError>;
}

/// [`MediaBackend`] backed by FFmpeg.
#[derive(Debug, Default)]
pub struct FfmpegBackend {
    extractor: FrameExtractor,
}

impl FfmpegBackend {
    /// Create a backend with no open video handle.
    pub fn new() -> Self {
        Self::default()
    }
}

impl MediaBackend for FfmpegBackend {
    fn detect_scenes(
        &mut self,
        video: &Path,
        options: &DetectionOptions,
        cancel: &CancellationToken,
    ) -> Result<Vec<Scene>, SceneGrabError> {
        crate::scene::detect_scenes(video, options, Some(cancel))
    }

    fn extract_frames(
        &mut self,
        video: &Path,
        scene_number: u32,
        timestamps: &[SampleTimestamp],
        cancel: &CancellationToken,
    ) -> Result<Vec<ExtractedFrame>, SceneGrabError> {
        self.extractor
            .extract(video, scene_number, timestamps, Some(cancel))
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Scenes returned by the detector.
    pub scenes_detected: usize,
    /// Frames requested from every scene.
    pub frames_per_scene: u32,
    /// Frames written to disk.
    pub frames_written: u64,
    /// Requested frames the extractor could not decode.
    pub frames_skipped: u64,
    /// Decoded frames that failed to encode or write.
    pub frames_failed: u64,
    /// Where the frames were written.
    pub output_directory: PathBuf,
    /// Path of `manifest.json`, when one was written.
    pub manifest: Option<PathBuf>,
}

impl RunSummary {
    fn empty(config: &ExtractionConfig) -> Self {
        Self {
            scenes_detected: 0,
            frames_per_scene: config.frames_per_scene.get(),
            frames_written: 0,
            frames_skipped: 0,
            frames_failed: 0,
            output_directory: config.output_directory.clone(),
            manifest: None,
        }
    }
}

impl Display for RunSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(f, "Scenes detected: {}", self.scenes_detected)?;
        writeln!(f, "Frames per scene: {}", self.frames_per_scene)?;
        writeln!(f, "Frames written: {}", self.frames_written)?;
        if self.frames_skipped > 0 {
            writeln!(f, "Frames skipped: {}", self.frames_skipped)?;
        }
        if self.frames_failed > 0 {
            writeln!(f, "Frames failed: {}", self.frames_failed)?;
        }
        if let Some(manifest) = &self.manifest {
            writeln!(f, "Manifest: {}", manifest.display())?;
        }
        write!(f, "Output directory: {}", self.output_directory.display())
    }
}

/// Run the whole pipeline for `config`.
///
/// # Errors
///
/// - [`SceneGrabError::NotFound`] if the video does not exist. Nothing is
///   created on disk in that case.
/// - [`SceneGrabError::IoError`] if the output directory cannot be created.
/// - Any error from [`MediaBackend::detect_scenes`].
/// - [`SceneGrabError::Cancelled`] if `cancel` fires at any point before
///   the run completes, including while the last frames or the manifest
///   are written. Frames written so far stay on disk.
pub fn run<B: MediaBackend + ?Sized>(
    config: &ExtractionConfig,
    backend: &mut B,
    cancel: &CancellationToken,
    progress: Option<&dyn ProgressCallback>,
) -> Result<RunSummary, SceneGrabError> {
    if !config.video.exists() {
        return Err(SceneGrabError::NotFound(config.video.clone()));
    }

    fs::create_dir_all(&config.output_directory)?;
    log::info!("Output directory: {}", config.output_directory.display());

    let scenes = backend.detect_scenes(&config.video, &config.detection_options(), cancel)?;

    let mut summary = RunSummary::empty(config);
    summary.scenes_detected = scenes.len();

    if scenes.is_empty() {
        log::warn!("No scenes detected in {}", config.video.display());
        return Ok(summary);
    }

    let mut writer =
        FrameWriter::new(&config.output_directory).with_quality(config.jpeg_quality);
    let mut manifest = config.write_manifest.then(|| Manifest::new(config));
    let started = Instant::now();
    let total = scenes.len();

    if let Some(callback) = progress {
        callback.on_start(total as u64);
    }

    for (index, scene) in scenes.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(SceneGrabError::Cancelled);
        }

        let scene_number = u32::try_from(index + 1).unwrap_or(u32::MAX);
        log::info!(
            "Processing scene {}/{}: {:.2}s - {:.2}s",
            scene_number,
            total,
            scene.start_seconds,
            scene.end_seconds,
        );

        let timestamps = sample_timestamps(scene, config.frames_per_scene);
        let requested = timestamps.len() as u64;

        if let Some(manifest) = manifest.as_mut() {
            manifest.begin_scene(scene_number, scene);
        }

        match backend.extract_frames(&config.video, scene_number, &timestamps, cancel) {
            Ok(frames) => {
                summary.frames_skipped += requested.saturating_sub(frames.len() as u64);
                for frame in &frames {
                    if cancel.is_cancelled() {
                        return Err(SceneGrabError::Cancelled);
                    }
                    if let Some(path) = writer.save(frame)
                        && let Some(manifest) = manifest.as_mut()
                    {
                        manifest.record_frame(frame, &path);
                    }
                }
            }
            Err(SceneGrabError::Cancelled) => return Err(SceneGrabError::Cancelled),
            Err(error) => {
                log::error!("Failed to extract frames from scene {scene_number}: {error}");
                summary.frames_skipped += requested;
            }
        }

        if let Some(callback) = progress {
            callback.on_progress(&ProgressInfo {
                scenes_done: index as u64 + 1,
                scenes_total: total as u64,
                frames_written: writer.written(),
                elapsed: started.elapsed(),
            });
        }
    }

    if let Some(callback) = progress {
        callback.on_finish();
    }

    summary.frames_written = writer.written();
    summary.frames_failed = writer.failed();

    if cancel.is_cancelled() {
        return Err(SceneGrabError::Cancelled);
    }

    if let Some(manifest) = &manifest {
        match manifest.write(&config.output_directory) {
            Ok(path) => {
                log::info!("Manifest written: {}", path.display());
                summary.manifest = Some(path);
            }
            Err(error) => log::error!("{error}"),
        }
    }

    if cancel.is_cancelled() {
        return Err(SceneGrabError::Cancelled);
    }

    log_summary(&summary);
    Ok(summary)
}

fn log_summary(summary: &RunSummary) {
    log::info!("{}", "=".repeat(50));
    log::info!("RESULTS:");
    for line in summary.to_string().lines() {
        log::info!("{line}");
    }
    log::info!("{}", "=".repeat(50));
}
