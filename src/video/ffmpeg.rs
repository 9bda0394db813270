//! Frame source for container formats (MP4, AVI, MOV, ...), decoded by the
//! `ffprobe` and `ffmpeg` command-line tools.
//!
//! Frames are extracted one at a time by frame number, so random access
//! works but stepping through a long clip re-decodes from the start.

use std::path::{Path, PathBuf};
use std::process::Command;

use image::RgbImage;
use serde::Deserialize;

use super::{VideoError, VideoSource};
use crate::viewport::Size;

/// Top-level ffprobe JSON output (`-print_format json -show_format -show_streams`).
#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    /// e.g. "30/1" or "24000/1001"
    r_frame_rate: Option<String>,
    duration: Option<String>,
    nb_frames: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Frame count and size of the first video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StreamInfo {
    frame_count: usize,
    size: Size,
}

impl StreamInfo {
    fn from_json(json: &str) -> Result<Self, String> {
        let probe: ProbeOutput =
            serde_json::from_str(json).map_err(|e| format!("bad ffprobe output: {e}"))?;

        let stream = probe
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .ok_or("no video stream")?;

        let (Some(width), Some(height)) = (stream.width, stream.height) else {
            return Err("video stream has no frame size".to_string());
        };
        if width == 0 || height == 0 {
            return Err(format!("video stream has an empty frame size {width}x{height}"));
        }

        Ok(Self {
            frame_count: total_frames(stream, probe.format.as_ref()),
            size: Size::new(width, height),
        })
    }
}

/// Frame count from `nb_frames`, else estimated from duration and frame rate.
fn total_frames(stream: &ProbeStream, format: Option<&ProbeFormat>) -> usize {
    if let Some(n) = stream.nb_frames.as_deref().and_then(|n| n.parse().ok()) {
        return n;
    }

    let duration = stream
        .duration
        .as_deref()
        .or_else(|| format.and_then(|f| f.duration.as_deref()))
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);
    let fps = stream
        .r_frame_rate
        .as_deref()
        .map(parse_fraction)
        .unwrap_or(0.0);

    if duration > 0.0 && fps > 0.0 {
        (duration * fps).round() as usize
    } else {
        0
    }
}

/// Parse a fraction string like `"30/1"` into a float.
fn parse_fraction(s: &str) -> f64 {
    match s.split_once('/') {
        Some((num, den)) => {
            let num = num.parse::<f64>().unwrap_or(0.0);
            let den = den.parse::<f64>().unwrap_or(0.0);
            if den > 0.0 { num / den } else { 0.0 }
        }
        None => s.parse::<f64>().unwrap_or(0.0),
    }
}

/// Run a tool and return its stdout, or a message describing the failure.
fn run(command: &mut Command) -> Result<Vec<u8>, String> {
    let program = command.get_program().to_string_lossy().into_owned();
    let output = command
        .output()
        .map_err(|e| format!("{program} is not available: {e}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "{program} failed (exit code {:?}): {}",
            output.status.code(),
            stderr.trim()
        ));
    }
    Ok(output.stdout)
}

/// A video file decoded through ffmpeg.
#[derive(Debug)]
pub struct FfmpegVideo {
    path: PathBuf,
    info: StreamInfo,
    /// Most recently decoded frame, reused on redraws of the same index.
    cached: Option<(usize, RgbImage)>,
}

impl FfmpegVideo {
    /// Probe `path` with ffprobe.
    pub fn open(path: &Path) -> Result<Self, VideoError> {
        let stdout = run(Command::new("ffprobe")
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path))
        .map_err(|message| VideoError::open(path, message))?;

        let info = StreamInfo::from_json(&String::from_utf8_lossy(&stdout))
            .map_err(|message| VideoError::open(path, message))?;
        if info.frame_count == 0 {
            return Err(VideoError::NoFrames {
                path: path.to_path_buf(),
            });
        }

        log::info!(
            "Probed {:?}: {} frames of {}",
            path,
            info.frame_count,
            info.size
        );
        Ok(Self {
            path: path.to_path_buf(),
            info,
            cached: None,
        })
    }

    fn extract(&self, index: usize) -> Result<RgbImage, VideoError> {
        log::debug!("Extracting frame {} of {:?}", index, self.path);
        let raw = run(Command::new("ffmpeg")
            .args(["-v", "error", "-i"])
            .arg(&self.path)
            .args([
                "-vf",
                &format!("select=eq(n\\,{index})"),
                "-frames:v",
                "1",
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgb24",
                "-",
            ]))
        .map_err(|message| VideoError::decode(index, message))?;

        if raw.is_empty() {
            return Err(VideoError::decode(index, "ffmpeg returned no frame data"));
        }

        let Size { width, height } = self.info.size;
        let length = raw.len();
        RgbImage::from_raw(width, height, raw).ok_or_else(|| {
            VideoError::decode(
                index,
                format!("got {length} bytes, expected an {width}x{height} RGB frame"),
            )
        })
    }
}

impl VideoSource for FfmpegVideo {
    fn frame_count(&self) -> usize {
        self.info.frame_count
    }

    fn frame_size(&self) -> Size {
        self.info.size
    }

    fn read_frame(&mut self, index: usize) -> Result<RgbImage, VideoError> {
        if index >= self.info.frame_count {
            return Err(VideoError::FrameOutOfRange {
                index,
                frame_count: self.info.frame_count,
            });
        }
        if let Some((_, image)) = self.cached.as_ref().filter(|(i, _)| *i == index) {
            return Ok(image.clone());
        }

        let image = self.extract(index)?;
        self.cached = Some((index, image.clone()));
        Ok(image)
    }

    fn describe(&self) -> String {
        format!(
            "{} frames of {} from {:?}",
            self.info.frame_count, self.info.size, self.path
        )
    }
}
