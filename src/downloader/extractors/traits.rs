// VideoExtractionEngine trait and common types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::identity::IdentityPool;
use crate::downloader::errors::DownloadError;

/// Which backend drives yt-dlp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractorMode {
    /// Python module yt_dlp (`python3 -m yt_dlp`)
    Python,
    /// CLI binary yt-dlp
    Cli,
    /// Python module if installed, binary otherwise
    #[default]
    Auto,
}

impl fmt::Display for ExtractorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Python => write!(f, "python"),
            Self::Cli => write!(f, "cli"),
            Self::Auto => write!(f, "auto"),
        }
    }
}

impl FromStr for ExtractorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "python" => Ok(Self::Python),
            "cli" => Ok(Self::Cli),
            "auto" => Ok(Self::Auto),
            other => Err(format!("unknown engine '{}', expected python, cli or auto", other)),
        }
    }
}

/// Engine configuration, fixed at construction time
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Backend selection
    pub mode: ExtractorMode,
    /// Python interpreter override (python backend)
    pub python_cmd: Option<String>,
    /// yt-dlp binary override (cli backend)
    pub ytdlp_path: Option<String>,
    /// Client signatures rotated per invocation
    pub identities: IdentityPool,
    /// SOCKS5/HTTP proxy URL
    pub proxy: Option<String>,
    /// Path to cookies.txt file
    pub cookies_path: Option<PathBuf>,
    /// YouTube player client (android, web, tv)
    pub player_client: Option<String>,
    /// Skip TLS certificate checks in the engine. Off unless asked for.
    pub insecure_skip_tls_verify: bool,
    /// Socket timeout handed to yt-dlp, in seconds
    pub socket_timeout_secs: u64,
    /// Upper bound for a metadata query
    pub info_timeout_secs: u64,
    /// Upper bound for a download
    pub download_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: ExtractorMode::Auto,
            python_cmd: None,
            ytdlp_path: None,
            identities: IdentityPool::default(),
            proxy: None,
            cookies_path: None,
            player_client: None,
            insecure_skip_tls_verify: false,
            socket_timeout_secs: 30,
            info_timeout_secs: 60,
            download_timeout_secs: 1800,
        }
    }
}

impl EngineConfig {
    pub fn with_mode(mut self, mode: ExtractorMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_python_cmd(mut self, cmd: Option<String>) -> Self {
        self.python_cmd = cmd;
        self
    }

    pub fn with_ytdlp_path(mut self, path: Option<String>) -> Self {
        self.ytdlp_path = path;
        self
    }

    pub fn with_identities(mut self, identities: IdentityPool) -> Self {
        self.identities = identities;
        self
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_cookies_path(mut self, path: Option<PathBuf>) -> Self {
        self.cookies_path = path;
        self
    }

    pub fn with_player_client(mut self, client: Option<String>) -> Self {
        self.player_client = client;
        self
    }

    pub fn with_insecure_skip_tls_verify(mut self, enabled: bool) -> Self {
        self.insecure_skip_tls_verify = enabled;
        self
    }

    pub fn with_timeouts(mut self, info_secs: u64, download_secs: u64) -> Self {
        self.info_timeout_secs = info_secs;
        self.download_timeout_secs = download_secs;
        self
    }
}

/// One format as reported by yt-dlp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFormat {
    /// Format ID (e.g., "137", "18")
    pub format_id: String,
    /// File extension (mp4, webm, m4a)
    pub ext: String,
    /// Video height in pixels
    pub height: Option<u32>,
    /// Video codec (avc1, vp9, av01, none)
    pub vcodec: Option<String>,
    /// Audio codec (mp4a, opus, none)
    pub acodec: Option<String>,
    /// File size in bytes
    pub filesize: Option<u64>,
    /// Approximate file size (when exact is unknown)
    pub filesize_approx: Option<u64>,
}

impl RawFormat {
    /// Exact size if known, else the engine's estimate
    pub fn effective_size(&self) -> Option<u64> {
        self.filesize.or(self.filesize_approx)
    }

    /// Muxed audio present. Missing codec info counts as present.
    pub fn has_audio(&self) -> bool {
        self.acodec.as_deref().map_or(true, |a| a != "none")
    }
}

/// Video info with all formats, as reported by yt-dlp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawVideoInfo {
    pub id: String,
    pub title: String,
    pub uploader: String,
    pub duration_seconds: u64,
    pub thumbnail: String,
    pub webpage_url: String,
    pub formats: Vec<RawFormat>,
}

/// What to download and where
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    /// yt-dlp format selection expression
    pub format_spec: String,
    /// Directory the engine writes into
    pub output_dir: PathBuf,
    /// Container used when the engine has to merge streams
    pub merge_container: String,
}

/// What the engine reported after a successful download
#[derive(Debug, Clone, Default)]
pub struct EngineOutput {
    /// Final file path as printed by the engine, if any
    pub predicted_path: Option<PathBuf>,
}

/// Capability interface over a video-extraction backend
#[async_trait]
pub trait VideoExtractionEngine: Send + Sync {
    /// Name of the backend (for logging)
    fn name(&self) -> &'static str;

    /// Check if this backend can run on this machine
    fn is_available(&self) -> bool;

    /// Query metadata and formats without downloading
    async fn extract(&self, url: &str) -> Result<RawVideoInfo, DownloadError>;

    /// Materialize one format into `request.output_dir`
    async fn download(
        &self,
        url: &str,
        request: &DownloadRequest,
    ) -> Result<EngineOutput, DownloadError>;
}
