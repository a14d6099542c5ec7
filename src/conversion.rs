//! Frame, time and pixel-buffer conversions shared by detection and
//! extraction.

use ffmpeg_next::{Rational, frame::Video as VideoFrame};

/// Packed RGB24 bytes of a scaled frame, with FFmpeg's row padding removed.
pub(crate) fn packed_rgb(rgb_frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let row_len = width as usize * 3;
    let rows = height as usize;
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);

    if stride == row_len {
        return data[..row_len * rows].to_vec();
    }

    data.chunks(stride)
        .take(rows)
        .flat_map(|row| &row[..row_len])
        .copied()
        .collect()
}

/// Frame index containing `seconds`: `floor(seconds × fps)`.
///
/// Negative or non-finite inputs clamp to frame 0.
pub(crate) fn seconds_to_frame_number(seconds: f64, frames_per_second: f64) -> u64 {
    let frame = (seconds * frames_per_second).floor();
    if frame.is_finite() && frame > 0.0 {
        frame as u64
    } else {
        0
    }
}

/// Start time of a frame in seconds.
pub(crate) fn frame_number_to_seconds(frame_number: u64, frames_per_second: f64) -> f64 {
    if frames_per_second > 0.0 {
        frame_number as f64 / frames_per_second
    } else {
        0.0
    }
}

fn pts_to_seconds(pts: i64, time_base: Rational) -> f64 {
    if time_base.denominator() == 0 {
        return 0.0;
    }
    pts as f64 * f64::from(time_base.numerator()) / f64::from(time_base.denominator())
}

/// Frame number a decoded PTS lands on, rounded to the nearest frame.
///
/// `start_seconds` is the stream start time; a frame at that time is 0.
pub(crate) fn pts_to_frame_number(
    pts: i64,
    time_base: Rational,
    frames_per_second: f64,
    start_seconds: f64,
) -> u64 {
    let frame = ((pts_to_seconds(pts, time_base) - start_seconds) * frames_per_second).round();
    if frame.is_finite() && frame > 0.0 {
        frame as u64
    } else {
        0
    }
}

/// Seek target for a frame, in microseconds (`AV_TIME_BASE`).
///
/// Container-level seeks ignore the stream time base but use absolute
/// presentation time, so the stream start time is added back.
pub(crate) fn frame_number_to_seek_timestamp(
    frame_number: u64,
    frames_per_second: f64,
    start_seconds: f64,
) -> i64 {
    ((frame_number_to_seconds(frame_number, frames_per_second) + start_seconds) * 1_000_000.0)
        as i64
}

/// Format seconds as `MM:SS`, truncating both fields.
///
/// Minutes are not wrapped into hours, so a 75-minute mark reads `75:00`.
///
/// ```
/// assert_eq!(scenegrab::format_timestamp(75.9), "01:15");
/// assert_eq!(scenegrab::format_timestamp(0.4), "00:00");
/// ```
pub fn format_timestamp(seconds: f64) -> String {
    let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    let minutes = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{minutes:02}:{secs:02}")
}
