// Helper functions shared by the engine backends and the orchestrator

use lazy_static::lazy_static;
use regex::Regex;
use std::io::ErrorKind;
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::Command as TokioCommand;
use tokio::time::{timeout, Duration};

use super::errors::DownloadError;

lazy_static! {
    static ref UNSAFE_FILENAME_CHARS: Regex = Regex::new(r"[^A-Za-z0-9_.-]").unwrap();
}

/// Fallback stem when a title has no usable characters at all
const FALLBACK_STEM: &str = "video";

/// Run command with timeout (shared utility)
///
/// The child is killed if the timeout fires or if the returned future is
/// dropped (client went away mid-request).
pub async fn run_output_with_timeout(
    program: &str,
    args: Vec<String>,
    timeout_secs: u64,
) -> Result<std::process::Output, DownloadError> {
    let mut child = TokioCommand::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => DownloadError::EngineUnavailable(format!("{} not found", program)),
            _ => DownloadError::EngineUnavailable(format!("failed to start {}: {}", program, e)),
        })?;

    let mut stdout_pipe = child
        .stdout
        .take()
        .ok_or_else(|| DownloadError::engine(format!("failed to capture stdout from {}", program)))?;
    let mut stderr_pipe = child
        .stderr
        .take()
        .ok_or_else(|| DownloadError::engine(format!("failed to capture stderr from {}", program)))?;

    let stdout_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stdout_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });
    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stderr_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });

    match timeout(Duration::from_secs(timeout_secs), child.wait()).await {
        Ok(status_res) => {
            let status = status_res
                .map_err(|e| DownloadError::engine(format!("failed to wait for {}: {}", program, e)))?;
            let stdout = join_pipe(stdout_task, "stdout").await?;
            let stderr = join_pipe(stderr_task, "stderr").await?;
            Ok(std::process::Output { status, stdout, stderr })
        }
        Err(_) => {
            let _ = child.kill().await;
            stdout_task.abort();
            stderr_task.abort();
            Err(DownloadError::timed_out(timeout_secs))
        }
    }
}

async fn join_pipe(
    task: tokio::task::JoinHandle<std::io::Result<Vec<u8>>>,
    name: &str,
) -> Result<Vec<u8>, DownloadError> {
    task.await
        .map_err(|e| DownloadError::engine(format!("{} task failed: {}", name, e)))?
        .map_err(|e| DownloadError::engine(format!("failed to read {}: {}", name, e)))
}

pub fn is_youtube_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.contains("youtube.com") || lower.contains("youtu.be")
}

/// Filesystem- and header-safe file name for a video title.
///
/// Words are split on whitespace, characters outside `[A-Za-z0-9_.-]` are
/// dropped, and the surviving words are joined with `_`.
pub fn safe_filename(title: &str, extension: &str) -> String {
    let stem = title
        .split_whitespace()
        .map(|word| UNSAFE_FILENAME_CHARS.replace_all(word, "").into_owned())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("_");

    let stem = if stem.is_empty() { FALLBACK_STEM } else { stem.as_str() };
    let extension = UNSAFE_FILENAME_CHARS.replace_all(extension, "");

    if extension.is_empty() {
        stem.to_string()
    } else {
        format!("{}.{}", stem, extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_filename_example() {
        assert_eq!(safe_filename("Foo: Bar?! (Live)", "mp4"), "Foo_Bar_Live.mp4");
    }

    #[test]
    fn test_safe_filename_keeps_allowed_chars() {
        assert_eq!(safe_filename("clip_01-final.v2", "mp4"), "clip_01-final.v2.mp4");
        assert_eq!(safe_filename("  many   spaces\there ", "webm"), "many_spaces_here.webm");
    }

    #[test]
    fn test_safe_filename_never_empty() {
        assert_eq!(safe_filename("???", "mp4"), "video.mp4");
        assert_eq!(safe_filename("日本語 タイトル", "mp4"), "video.mp4");
        assert_eq!(safe_filename("", "mp4"), "video.mp4");
    }

    #[test]
    fn test_safe_filename_only_allowed_chars() {
        let name = safe_filename("a/b\\c\"d'e;f <g>|h*", "mp4");
        assert!(name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-'));
        assert_eq!(name, "abcdef_gh.mp4");
    }

    #[test]
    fn test_youtube_detection() {
        assert!(is_youtube_url("https://www.YouTube.com/watch?v=x"));
        assert!(is_youtube_url("https://youtu.be/x"));
        assert!(!is_youtube_url("https://vimeo.com/1"));
    }

    #[tokio::test]
    async fn test_missing_program_is_engine_unavailable() {
        let err = run_output_with_timeout("definitely-not-a-real-binary-xyz", vec![], 5)
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::EngineUnavailable(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_kills_child() {
        let err = run_output_with_timeout("sleep", vec!["5".to_string()], 1)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("timed out after 1s"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_output_is_captured() {
        let out = run_output_with_timeout("sh", vec!["-c".into(), "echo hi; echo oops >&2".into()], 5)
            .await
            .unwrap();
        assert!(out.status.success());
        assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "hi");
        assert_eq!(String::from_utf8_lossy(&out.stderr).trim(), "oops");
    }
}
