// In-memory engine for tests: no network, no yt-dlp.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Mutex;

use super::traits::{
    DownloadRequest, EngineOutput, RawFormat, RawVideoInfo, VideoExtractionEngine,
};
use crate::downloader::errors::DownloadError;

pub const FAKE_BYTES: &[u8] = b"fake video bytes";

/// What `download` does
#[derive(Debug, Clone)]
pub enum FakeArtifact {
    /// Write the file and report its path
    Reported(&'static str),
    /// Write the file but print nothing (forces the directory scan)
    Unreported(&'static str),
    /// Report a path that was never written, write nothing
    Phantom,
    /// Exit with this stderr
    Fails(&'static str),
}

pub struct FakeEngine {
    info: Result<RawVideoInfo, &'static str>,
    artifact: FakeArtifact,
    pub requests: Mutex<Vec<DownloadRequest>>,
}

impl FakeEngine {
    pub fn new(info: RawVideoInfo, artifact: FakeArtifact) -> Self {
        Self {
            info: Ok(info),
            artifact,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(stderr: &'static str) -> Self {
        Self {
            info: Err(stderr),
            artifact: FakeArtifact::Fails(stderr),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn output_dirs(&self) -> Vec<PathBuf> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.output_dir.clone())
            .collect()
    }
}

#[async_trait]
impl VideoExtractionEngine for FakeEngine {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn extract(&self, _url: &str) -> Result<RawVideoInfo, DownloadError> {
        self.info
            .clone()
            .map_err(DownloadError::from_engine_stderr)
    }

    async fn download(
        &self,
        _url: &str,
        request: &DownloadRequest,
    ) -> Result<EngineOutput, DownloadError> {
        self.requests.lock().unwrap().push(request.clone());

        match &self.artifact {
            FakeArtifact::Reported(name) => {
                let path = request.output_dir.join(name);
                std::fs::write(&path, FAKE_BYTES)?;
                Ok(EngineOutput {
                    predicted_path: Some(path),
                })
            }
            FakeArtifact::Unreported(name) => {
                std::fs::write(request.output_dir.join(name), FAKE_BYTES)?;
                Ok(EngineOutput::default())
            }
            FakeArtifact::Phantom => Ok(EngineOutput {
                predicted_path: Some(request.output_dir.join("never-written.mp4")),
            }),
            FakeArtifact::Fails(stderr) => Err(DownloadError::from_engine_stderr(stderr)),
        }
    }
}

pub fn format(id: &str, ext: &str, height: Option<u32>, acodec: &str) -> RawFormat {
    RawFormat {
        format_id: id.to_string(),
        ext: ext.to_string(),
        height,
        vcodec: Some(if height.is_some() { "avc1" } else { "none" }.to_string()),
        acodec: Some(acodec.to_string()),
        filesize: height.map(|h| h as u64 * 10_000),
        filesize_approx: None,
    }
}

pub fn video_info(title: &str, formats: Vec<RawFormat>) -> RawVideoInfo {
    RawVideoInfo {
        id: "vid123".to_string(),
        title: title.to_string(),
        uploader: "Uploader".to_string(),
        duration_seconds: 95,
        thumbnail: "https://img.example/vid123.jpg".to_string(),
        webpage_url: "https://video.example/watch/vid123".to_string(),
        formats,
    }
}

/// 360p progressive, 720p video-only, 1080p video-only, plus an audio track
pub fn sample_formats() -> Vec<RawFormat> {
    vec![
        format("140", "m4a", None, "mp4a.40.2"),
        format("18", "mp4", Some(360), "mp4a.40.2"),
        format("136", "mp4", Some(720), "none"),
        format("247", "webm", Some(720), "none"),
        format("137", "mp4", Some(1080), "none"),
    ]
}
