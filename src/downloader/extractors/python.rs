// Python engine - uses `python3 -m yt_dlp`
//
// Advantages:
// - Better at bypassing YouTube bot detection
// - Picks up whatever yt-dlp version pip installed
//
// Disadvantages:
// - Requires Python 3 and the yt_dlp module

use async_trait::async_trait;
use std::process::Command as StdCommand;

use super::traits::{
    DownloadRequest, EngineConfig, EngineOutput, RawVideoInfo, VideoExtractionEngine,
};
use super::ytdlp::Launcher;
use crate::downloader::errors::DownloadError;

/// Python-based engine using the yt_dlp module
pub struct PythonEngine {
    python_cmd: String,
    launcher: Launcher,
    config: EngineConfig,
}

impl PythonEngine {
    pub fn new(config: EngineConfig) -> Self {
        let python_cmd = config.python_cmd.clone().unwrap_or_else(Self::find_python);
        Self {
            launcher: Launcher::new(python_cmd.clone(), &["-m", "yt_dlp"]),
            python_cmd,
            config,
        }
    }

    /// Find Python interpreter
    fn find_python() -> String {
        let candidates = ["python3", "/opt/homebrew/bin/python3", "/usr/local/bin/python3", "python"];

        for cmd in candidates {
            if let Ok(output) = StdCommand::new(cmd).arg("--version").output() {
                if output.status.success() {
                    return cmd.to_string();
                }
            }
        }

        "python3".to_string()
    }

    /// Check if yt_dlp module is installed
    fn has_ytdlp_module(&self) -> bool {
        match StdCommand::new(&self.python_cmd)
            .args(["-c", "import yt_dlp"])
            .output()
        {
            Ok(out) => out.status.success(),
            Err(_) => false,
        }
    }
}

#[async_trait]
impl VideoExtractionEngine for PythonEngine {
    fn name(&self) -> &'static str {
        "python-yt-dlp"
    }

    fn is_available(&self) -> bool {
        self.has_ytdlp_module()
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
