//! Error types for the `scenegrab` crate.
//!
//! This module defines [`SceneGrabError`], the error type returned by every
//! fallible stage of the pipeline. The orchestrator matches on the variant
//! to decide whether a failure aborts the run or only skips a frame.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use thiserror::Error;

/// The unified error type for all `scenegrab` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SceneGrabError {
    /// The input video does not exist.
    #[error("Video file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The video file exists but could not be opened by FFmpeg.
    #[error("Failed to open video file at {}: {reason}", path.display())]
    FileOpen {
        /// Path that was passed to [`crate::VideoFile::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A video frame could not be decoded.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// The requested frame number is past the end of the video.
    #[error("Frame {frame_number} is out of range (video has {total_frames} frames)")]
    FrameOutOfRange {
        /// The frame number that was requested.
        frame_number: u64,
        /// The total number of frames in the video.
        total_frames: u64,
    },

    /// A frame could not be encoded or written to disk.
    #[error("Failed to write frame to {}: {reason}", path.display())]
    WriteError {
        /// Destination of the failed write.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },

    /// A configuration value was rejected by [`crate::ExtractionConfig::validate`].
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// The run was interrupted via a [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,
}

impl From<FfmpegError> for SceneGrabError {
    fn from(error: FfmpegError) -> Self {
        SceneGrabError::FfmpegError(error.to_string())
    }
}
