//! Video thumbnail extraction through an external `ffmpeg`.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Grid width of generated thumbnails.
pub const THUMBNAIL_WIDTH: u32 = 300;

#[async_trait]
pub trait ThumbnailExtractor: Send + Sync {
    /// JPEG bytes of one representative frame, or `None` when no frame could be
    /// produced. Failures are never fatal to an upload.
    async fn extract(&self, video: &Path) -> Option<Vec<u8>>;
}

/// Thumbnailing turned off.
pub struct NoThumbnails;

#[async_trait]
impl ThumbnailExtractor for NoThumbnails {
    async fn extract(&self, _video: &Path) -> Option<Vec<u8>> {
        None
    }
}

pub struct FfmpegThumbnailer {
    ffmpeg: PathBuf,
    ffprobe: Option<PathBuf>,
}

/// Seek to 10% of the duration, capped at one second.
pub fn seek_position(duration: Option<f64>) -> f64 {
    match duration {
        Some(d) if d.is_finite() && d > 0.0 => (d * 0.1).min(1.0),
        _ => 0.0,
    }
}

impl FfmpegThumbnailer {
    /// Locate `ffmpeg` (and `ffprobe` if present) on the `PATH`.
    pub fn detect() -> Option<Self> {
        let ffmpeg = which::which("ffmpeg").ok()?;
        let ffprobe = which::which("ffprobe").ok();
        tracing::info!(ffmpeg = %ffmpeg.display(), has_ffprobe = ffprobe.is_some(), "Video thumbnails enabled");
        Some(FfmpegThumbnailer { ffmpeg, ffprobe })
    }

    pub fn with_paths(ffmpeg: PathBuf, ffprobe: Option<PathBuf>) -> Self {
        FfmpegThumbnailer { ffmpeg, ffprobe }
    }

    async fn duration(&self, video: &Path) -> Option<f64> {
        let ffprobe = self.ffprobe.as_ref()?;
        let output = Command::new(ffprobe)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(video)
            .stdin(Stdio::null())
            .output()
            .await
            .ok()?;
        if !output.status.success() {
            return None;
        }
        String::from_utf8_lossy(&output.stdout).trim().parse::<f64>().ok()
    }

    async fn grab_frame(&self, video: &Path, seek: f64) -> Result<Vec<u8>, String> {
        let output_file = tempfile::Builder::new()
            .suffix(".jpg")
            .tempfile()
            .map_err(|e| format!("Failed to create temp file: {}", e))?;

        let output = Command::new(&self.ffmpeg)
            .arg("-ss")
            .arg(format!("{:.3}", seek))
            .arg("-i")
            .arg(video)
            .args(["-frames:v", "1"])
            .arg("-vf")
            .arg(format!("scale={}:-2", THUMBNAIL_WIDTH))
            .args(["-q:v", "5", "-y"])
            .arg(output_file.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| format!("Failed to execute ffmpeg: {}", e))?;

        if !output.status.success() {
            return Err(format!(
                "ffmpeg failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        let bytes = tokio::fs::read(output_file.path())
            .await
            .map_err(|e| format!("Failed to read thumbnail: {}", e))?;
        if bytes.is_empty() {
            return Err("ffmpeg produced an empty frame".into());
        }
        Ok(bytes)
    }
}

#[async_trait]
impl ThumbnailExtractor for FfmpegThumbnailer {
    async fn extract(&self, video: &Path) -> Option<Vec<u8>> {
        let seek = seek_position(self.duration(video).await);
        match self.grab_frame(video, seek).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!(video = %video.display(), error = %e, "Thumbnail extraction failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seek_position() {
        assert_eq!(seek_position(Some(30.0)), 1.0);
        assert!((seek_position(Some(4.0)) - 0.4).abs() < 1e-9);
        assert_eq!(seek_position(None), 0.0);
        assert_eq!(seek_position(Some(f64::NAN)), 0.0);
    }

    #[tokio::test]
    async fn test_missing_binary_yields_none() {
        let thumbnailer = FfmpegThumbnailer::with_paths(
            PathBuf::from("/nonexistent/ffmpeg"),
            Some(PathBuf::from("/nonexistent/ffprobe")),
        );
        assert!(thumbnailer.extract(Path::new("clip.mp4")).await.is_none());
    }
}
