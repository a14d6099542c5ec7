//! JSON manifest of a run.
//!
//! When enabled, the pipeline records every scene and every written frame
//! and saves the result as `manifest.json` in the output directory, so
//! downstream tools can map image files back to scene boundaries and
//! timestamps without parsing file names.

use std::path::{Path, PathBuf};

use serde_json::{Value, json};

use crate::{
    configuration::ExtractionConfig, error::SceneGrabError, frame::ExtractedFrame, scene::Scene,
};

/// File name of the manifest inside the output directory.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Accumulates scenes and frames for `manifest.json`.
#[derive(Debug, Clone)]
pub struct Manifest {
    video: PathBuf,
    threshold: f64,
    frames_per_scene: u32,
    scenes: Vec<Value>,
}

impl Manifest {
    /// Empty manifest for a run with `config`.
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            video: config.video.clone(),
            threshold: config.threshold,
            frames_per_scene: config.frames_per_scene.get(),
            scenes: Vec::new(),
        }
    }

    /// Start a new scene entry. Frames recorded afterwards belong to it.
    pub fn begin_scene(&mut self, scene_number: u32, scene: &Scene) {
        self.scenes.push(json!({
            "scene": scene_number,
            "start_seconds": scene.start_seconds,
            "end_seconds": scene.end_seconds,
            "start_frame": scene.start_frame,
            "end_frame": scene.end_frame,
            "frames": [],
        }));
    }

    /// Record a written frame under the current scene.
    pub fn record_frame(&mut self, frame: &ExtractedFrame, path: &Path) {
        let entry = json!({
            "id": frame.identifier.to_string(),
            "file": path.file_name().map(|name| name.to_string_lossy().into_owned()),
            "timestamp": frame.timestamp,
            "seconds": frame.seconds,
            "frame_number": frame.frame_number,
        });

        if let Some(frames) = self
            .scenes
            .last_mut()
            .and_then(|scene| scene.get_mut("frames"))
            .and_then(Value::as_array_mut)
        {
            frames.push(entry);
        }
    }

    /// Number of frames recorded so far.
    pub fn frame_count(&self) -> usize {
        self.scenes
            .iter()
            .filter_map(|scene| scene.get("frames").and_then(Value::as_array))
            .map(Vec::len)
            .sum()
    }

    /// The manifest as a JSON value.
    pub fn to_json(&self) -> Value {
        json!({
            "video": self.video.display().to_string(),
            "threshold": self.threshold,
            "frames_per_scene": self.frames_per_scene,
            "scene_count": self.scenes.len(),
            "frame_count": self.frame_count(),
            "scenes": self.scenes,
        })
    }

    /// Write `manifest.json` into `output_directory` and return its path.
    ///
    /// # Errors
    ///
    /// Returns [`SceneGrabError::WriteError`] if the file cannot be written.
    pub fn write(&self, output_directory: &Path) -> Result<PathBuf, SceneGrabError> {
        let path = output_directory.join(MANIFEST_FILE_NAME);
        let body = serde_json::to_string_pretty(&self.to_json()).map_err(|error| {
            SceneGrabError::WriteError {
                path: path.clone(),
                reason: error.to_string(),
            }
        })?;
        std::fs::write(&path, body).map_err(|error| SceneGrabError::WriteError {
            path: path.clone(),
            reason: error.to_string(),
        })?;
        Ok(path)
    }
}
