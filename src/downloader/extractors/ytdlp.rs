// yt-dlp invocation shared by both backends
//
// The python module and the native binary take the same arguments and print
// the same JSON; only the program being launched differs.

use std::path::PathBuf;

use tracing::debug;

use super::traits::{DownloadRequest, EngineConfig, EngineOutput, RawFormat, RawVideoInfo};
use crate::downloader::errors::DownloadError;
use crate::downloader::utils::{is_youtube_url, run_output_with_timeout};

/// Output template inside the scratch directory. Ids are filesystem-safe;
/// titles are not.
const OUTPUT_TEMPLATE: &str = "%(id)s.%(ext)s";

/// How to launch yt-dlp: program plus any leading arguments
#[derive(Debug, Clone)]
pub struct Launcher {
    pub program: String,
    pub prefix: Vec<String>,
}

impl Launcher {
    pub fn new(program: impl Into<String>, prefix: &[&str]) -> Self {
        Self {
            program: program.into(),
            prefix: prefix.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub async fn extract(
        &self,
        engine: &'static str,
        url: &str,
        config: &EngineConfig,
    ) -> Result<RawVideoInfo, DownloadError> {
        let args = self.with_prefix(info_args(url, config));
        debug!(engine, program = %self.program, args = %args.join(" "), "Running metadata query");

        let output = run_output_with_timeout(&self.program, args, config.info_timeout_secs).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DownloadError::from_engine_stderr(&stderr));
        }

        parse_info_json(&output.stdout)
    }

    pub async fn download(
        &self,
        engine: &'static str,
        url: &str,
        request: &DownloadRequest,
        config: &EngineConfig,
    ) -> Result<EngineOutput, DownloadError> {
        let args = self.with_prefix(download_args(url, request, config));
        debug!(engine, program = %self.program, args = %args.join(" "), "Running download");

        let output =
            run_output_with_timeout(&self.program, args, config.download_timeout_secs).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DownloadError::from_engine_stderr(&stderr));
        }

        Ok(EngineOutput {
            predicted_path: parse_printed_path(&output.stdout),
        })
    }

    fn with_prefix(&self, args: Vec<String>) -> Vec<String> {
        self.prefix.iter().cloned().chain(args).collect()
    }
}

/// Arguments common to every invocation
fn common_args(url: &str, config: &EngineConfig) -> Vec<String> {
    let mut args = vec![
        "--no-playlist".to_string(),
        "--no-warnings".to_string(),
        "--no-progress".to_string(),
        "--socket-timeout".to_string(),
        config.socket_timeout_secs.to_string(),
    ];

    args.extend(config.identities.pick().to_args());

    if is_youtube_url(url) {
        if let Some(client) = &config.player_client {
            args.push("--extractor-args".to_string());
            args.push(format!("youtube:player_client={}", client));
        }
    }

    if let Some(path) = &config.cookies_path {
        args.push("--cookies".to_string());
        args.push(path.to_string_lossy().into_owned());
    }

    if let Some(proxy) = &config.proxy {
        args.push("--proxy".to_string());
        args.push(proxy.clone());
    }

    if config.insecure_skip_tls_verify {
        args.push("--no-check-certificates".to_string());
    }

    args
}

pub fn info_args(url: &str, config: &EngineConfig) -> Vec<String> {
    let mut args = vec!["--dump-json".to_string(), "--skip-download".to_string()];
    args.extend(common_args(url, config));
    args.push("--".to_string());
    args.push(url.to_string());
    args
}

pub fn download_args(url: &str, request: &DownloadRequest, config: &EngineConfig) -> Vec<String> {
    let mut args = vec![
        "-f".to_string(),
        request.format_spec.clone(),
        "--merge-output-format".to_string(),
        request.merge_container.clone(),
        "-P".to_string(),
        request.output_dir.to_string_lossy().into_owned(),
        "-o".to_string(),
        OUTPUT_TEMPLATE.to_string(),
        "--no-part".to_string(),
        "--no-mtime".to_string(),
        "--print".to_string(),
        "after_move:filepath".to_string(),
    ];
    args.extend(common_args(url, config));
    args.push("--".to_string());
    args.push(url.to_string());
    args
}

/// Parse `--dump-json` output
pub fn parse_info_json(stdout: &[u8]) -> Result<RawVideoInfo, DownloadError> {
    let json_str = String::from_utf8_lossy(stdout);
    let json: serde_json::Value = serde_json::from_str(json_str.trim())
        .map_err(|e| DownloadError::engine(format!("invalid JSON from engine: {}", e)))?;

    let uploader = json["uploader"]
        .as_str()
        .or_else(|| json["channel"].as_str())
        .unwrap_or("Unknown");

    Ok(RawVideoInfo {
        id: json["id"].as_str().unwrap_or("unknown").to_string(),
        title: json["title"].as_str().unwrap_or("Unknown").to_string(),
        uploader: uploader.to_string(),
        duration_seconds: json["duration"].as_f64().filter(|d| *d > 0.0).unwrap_or(0.0) as u64,
        thumbnail: json["thumbnail"].as_str().unwrap_or("").to_string(),
        webpage_url: json["webpage_url"].as_str().unwrap_or("").to_string(),
        formats: parse_formats(&json),
    })
}

/// Formats array; a video without one (direct media links) has no formats.
fn parse_formats(json: &serde_json::Value) -> Vec<RawFormat> {
    let Some(formats_array) = json["formats"].as_array() else {
        return Vec::new();
    };

    formats_array
        .iter()
        .map(|f| RawFormat {
            format_id: f["format_id"].as_str().unwrap_or("").to_string(),
            ext: f["ext"].as_str().unwrap_or("").to_string(),
            height: f["height"]
                .as_u64()
                .or_else(|| f["height"].as_f64().map(|h| h as u64))
                .and_then(|h| u32::try_from(h).ok()),
            vcodec: f["vcodec"].as_str().map(|s| s.to_string()),
            acodec: f["acodec"].as_str().map(|s| s.to_string()),
            filesize: f["filesize"].as_u64(),
            filesize_approx: f["filesize_approx"]
                .as_u64()
                .or_else(|| f["filesize_approx"].as_f64().map(|s| s as u64)),
        })
        .collect()
}

/// `--print after_move:filepath` writes the final path as the last line.
pub fn parse_printed_path(stdout: &[u8]) -> Option<PathBuf> {
    let text = String::from_utf8_lossy(stdout);
    text.lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .filter(|l| *l != "NA")
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::super::identity::IdentityPool;
    use super::*;

    const SAMPLE: &str = r#"{
        "id": "abc123",
        "title": "Sample clip",
        "channel": "Some Channel",
        "duration": 63.4,
        "thumbnail": "https://img.example/abc.jpg",
        "webpage_url": "https://www.youtube.com/watch?v=abc123",
        "formats": [
            {"format_id": "139", "ext": "m4a", "vcodec": "none", "acodec": "mp4a.40.5", "filesize": 1000},
            {"format_id": "18", "ext": "mp4", "height": 360, "vcodec": "avc1.42001E", "acodec": "mp4a.40.2", "filesize_approx": 2500.7},
            {"format_id": "22", "ext": "mp4", "height": 720.0, "vcodec": "avc1.64001F", "acodec": "none"}
        ]
    }"#;

    fn config() -> EngineConfig {
        EngineConfig::default().with_identities(IdentityPool::from_user_agents(["ua/test"]))
    }

    #[test]
    fn test_parse_info_json() {
        let info = parse_info_json(SAMPLE.as_bytes()).unwrap();
        assert_eq!(info.id, "abc123");
        assert_eq!(info.uploader, "Some Channel");
        assert_eq!(info.duration_seconds, 63);
        assert_eq!(info.formats.len(), 3);
        assert_eq!(info.formats[0].height, None);
        assert_eq!(info.formats[1].effective_size(), Some(2500));
        assert_eq!(info.formats[2].height, Some(720));
        assert!(!info.formats[2].has_audio());
    }

    #[test]
    fn test_parse_info_json_defaults() {
        let info = parse_info_json(br#"{"id": "x"}"#).unwrap();
        assert_eq!(info.title, "Unknown");
        assert_eq!(info.uploader, "Unknown");
        assert_eq!(info.duration_seconds, 0);
        assert!(info.formats.is_empty());
    }

    #[test]
    fn test_parse_info_json_rejects_garbage() {
        let err = parse_info_json(b"not json").unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[test]
    fn test_parse_printed_path() {
        assert_eq!(
            parse_printed_path(b"/tmp/job-1/abc.mp4\n"),
            Some(PathBuf::from("/tmp/job-1/abc.mp4"))
        );
        assert_eq!(parse_printed_path(b"NA\n"), None);
        assert_eq!(parse_printed_path(b""), None);
    }

    #[test]
    fn test_info_args_end_with_url_after_separator() {
        let args = info_args("https://example.com/v", &config());
        assert_eq!(args[0], "--dump-json");
        let n = args.len();
        assert_eq!(args[n - 2], "--");
        assert_eq!(args[n - 1], "https://example.com/v");
        assert!(args.contains(&"ua/test".to_string()));
        assert!(!args.contains(&"--no-check-certificates".to_string()));
    }

    #[test]
    fn test_tls_flag_is_opt_in() {
        let cfg = config().with_insecure_skip_tls_verify(true);
        let args = info_args("https://example.com/v", &cfg);
        assert!(args.contains(&"--no-check-certificates".to_string()));
    }

    #[test]
    fn test_download_args() {
        let request = DownloadRequest {
            format_spec: "22+bestaudio".to_string(),
            output_dir: PathBuf::from("/scratch/job-1"),
            merge_container: "mp4".to_string(),
        };
        let cfg = config()
            .with_proxy(Some("socks5://127.0.0.1:1080".to_string()))
            .with_player_client(Some("web".to_string()));
        let args = download_args("https://youtu.be/abc", &request, &cfg);

        let pos = |flag: &str| args.iter().position(|a| a == flag).unwrap();
        assert_eq!(args[pos("-f") + 1], "22+bestaudio");
        assert_eq!(args[pos("-P") + 1], "/scratch/job-1");
        assert_eq!(args[pos("--print") + 1], "after_move:filepath");
        assert_eq!(args[pos("--proxy") + 1], "socks5://127.0.0.1:1080");
        assert_eq!(args[pos("--extractor-args") + 1], "youtube:player_client=web");
    }

    #[test]
    fn test_player_client_only_for_youtube() {
        let cfg = config().with_player_client(Some("web".to_string()));
        let args = info_args("https://vimeo.com/1", &cfg);
        assert!(!args.contains(&"--extractor-args".to_string()));
    }
}
