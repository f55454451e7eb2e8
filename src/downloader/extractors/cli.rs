// CLI engine - uses the native `yt-dlp` binary
//
// Advantages:
// - Faster than Python mode
// - No Python dependency
//
// Disadvantages:
// - More likely to trigger YouTube bot detection

use async_trait::async_trait;
use std::process::Command as StdCommand;

use super::traits::{
    DownloadRequest, EngineConfig, EngineOutput, RawVideoInfo, VideoExtractionEngine,
};
use super::ytdlp::Launcher;
use crate::downloader::errors::DownloadError;

/// CLI-based engine using the yt-dlp binary
pub struct CliEngine {
    launcher: Launcher,
    config: EngineConfig,
}

impl CliEngine {
    pub fn new(config: EngineConfig) -> Self {
        let ytdlp_path = config.ytdlp_path.clone().unwrap_or_else(Self::find_ytdlp);
        Self {
            launcher: Launcher::new(ytdlp_path, &[]),
            config,
        }
    }

    /// Find yt-dlp binary
    fn find_ytdlp() -> String {
        let common_paths = [
            "/opt/homebrew/bin/yt-dlp", // Homebrew on Apple Silicon
            "/usr/local/bin/yt-dlp",    // Homebrew on Intel Mac, pip --user on Linux
            "/usr/bin/yt-dlp",          // System installation
        ];

        for path in common_paths {
            if std::path::Path::new(path).exists() {
                return path.to_string();
            }
        }

        // Try to find via `which`
        if let Ok(output) = StdCommand::new("which").arg("yt-dlp").output() {
            if output.status.success() {
                if let Ok(path) = String::from_utf8(output.stdout) {
                    let trimmed = path.trim();
                    if !trimmed.is_empty() {
                        return trimmed.to_string();
                    }
                }
            }
        }

        "yt-dlp".to_string()
    }

    /// Check if yt-dlp binary is available
    fn has_ytdlp_binary(&self) -> bool {
        match StdCommand::new(&self.launcher.program)
            .arg("--version")
            .output()
        {
            Ok(out) => out.status.success(),
            Err(_) => false,
        }
    }
}

#[async_trait]
impl VideoExtractionEngine for CliEngine {
    fn name(&self) -> &'static str {
        "cli-yt-dlp"
    }

    fn is_available(&self) -> bool {
        self.has_ytdlp_binary()
    }

    async fn extract(&self, url: &str) -> Result<RawVideoInfo, DownloadError> {
        self.launcher.extract(self.name(), url, &self.config).await
    }

    async fn download(
        &self,
        url: &str,
        request: &DownloadRequest,
    ) -> Result<EngineOutput, DownloadError> {
        self.launcher
            .download(self.name(), url, request, &self.config)
            .await
    }
}
