//! Still-frame extraction for uploaded videos.

use async_trait::async_trait;
use bytes::Bytes;
use keepsake_core::AppError;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Offset of the extracted frame.
pub const THUMBNAIL_TIMESTAMP: &str = "00:00:01";
/// Output dimensions of generated thumbnails.
pub const THUMBNAIL_SIZE: (u32, u32) = (320, 240);

#[derive(Debug, thiserror::Error)]
pub enum ThumbnailError {
    #[error("failed to prepare thumbnail workspace: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to call ffmpeg: {0}")]
    Spawn(std::io::Error),

    #[error("ffmpeg exited with code {0}")]
    NonZeroExit(i32),

    #[error("ffmpeg exited by signal")]
    Signal,

    #[error("ffmpeg timed out after {0:?}")]
    Timeout(Duration),

    #[error("ffmpeg produced no frame")]
    EmptyOutput,
}

impl From<ThumbnailError> for AppError {
    fn from(err: ThumbnailError) -> Self {
        AppError::ThumbnailGenerationFailed(err.to_string())
    }
}

/// Produces a JPEG still from video bytes.
#[async_trait]
pub trait ThumbnailGenerator: Send + Sync {
    async fn generate(&self, video: &[u8], extension: &str) -> Result<Bytes, ThumbnailError>;
}

/// Thumbnail generator shelling out to ffmpeg.
#[derive(Debug, Clone)]
pub struct FfmpegThumbnailer {
    ffmpeg_path: String,
    timeout: Duration,
}

impl FfmpegThumbnailer {
    pub fn new(ffmpeg_path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            timeout,
        }
    }
}

#[async_trait]
impl ThumbnailGenerator for FfmpegThumbnailer {
    #[tracing::instrument(skip(self, video), fields(size_bytes = video.len()))]
    async fn generate(&self, video: &[u8], extension: &str) -> Result<Bytes, ThumbnailError> {
        let workdir = tempfile::TempDir::new()?;
        let input = workdir.path().join(format!("input.{}", extension));
        let output = workdir.path().join("thumbnail.jpg");
        tokio::fs::write(&input, video).await?;

        let (width, height) = THUMBNAIL_SIZE;
        let mut child = Command::new(&self.ffmpeg_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .arg("-nostdin")
            .arg("-y")
            .args(["-ss", THUMBNAIL_TIMESTAMP])
            .arg("-i")
            .arg(&input)
            .args(["-frames:v", "1"])
            .arg("-vf")
            .arg(format!("scale={}:{}", width, height))
            .arg(&output)
            .spawn()
            .map_err(ThumbnailError::Spawn)?;

        let exit_status = match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(status) => status.map_err(ThumbnailError::Spawn)?,
            Err(_) => {
                let _ = child.kill().await;
                return Err(ThumbnailError::Timeout(self.timeout));
            }
        };

        match exit_status.code() {
            Some(0) => {}
            Some(code) => return Err(ThumbnailError::NonZeroExit(code)),
            None => return Err(ThumbnailError::Signal),
        }

        let jpeg = match tokio::fs::read(&output).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ThumbnailError::EmptyOutput)
            }
            Err(e) => return Err(ThumbnailError::Io(e)),
        };
        if jpeg.is_empty() {
            return Err(ThumbnailError::EmptyOutput);
        }

        tracing::debug!(thumbnail_bytes = jpeg.len(), "Video thumbnail extracted");
        Ok(Bytes::from(jpeg))
    }
}
