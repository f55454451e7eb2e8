// DownloadOrchestrator - resolve, select, materialize, stream
//
// Flow for one request:
// 1. MetadataResolver -> (VideoMetadata, StreamCatalog)
// 2. FormatSelector picks a stream (no scratch dir exists yet)
// 3. TransientStorage hands out a scratch dir, owned by a DownloadJob
// 4. Engine downloads into it; the artifact is located and opened
// 5. The job moves into the body stream and is released after the last chunk
//
// Every early return drops the job, which removes the scratch dir.

use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Bytes;
use futures_util::Stream;
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};

use super::catalog::StreamCatalog;
use super::errors::DownloadError;
use super::extractors::{DownloadRequest, VideoExtractionEngine};
use super::format_selector::FormatSelector;
use super::metadata::MetadataResolver;
use super::models::{StreamDescriptor, VideoMetadata};
use super::storage::{ScratchDir, TransientStorage};
use super::utils::safe_filename;

/// Leftovers of an interrupted download, never served
const PARTIAL_SUFFIXES: &[&str] = &[".part", ".ytdl"];

pub struct DownloadOrchestrator {
    resolver: MetadataResolver,
    engine: Arc<dyn VideoExtractionEngine>,
    storage: TransientStorage,
    container: String,
}

impl DownloadOrchestrator {
    pub fn new(
        engine: Arc<dyn VideoExtractionEngine>,
        storage: TransientStorage,
        container: impl Into<String>,
    ) -> Self {
        let container = container.into();
        Self {
            resolver: MetadataResolver::new(engine.clone(), container.clone()),
            engine,
            storage,
            container,
        }
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    pub async fn resolve(&self, url: &str) -> Result<(VideoMetadata, StreamCatalog), DownloadError> {
        self.resolver.resolve(url).await
    }

    /// Run the whole pipeline for one request and open the resulting file
    pub async fn fetch(&self, url: &str, requested: &str) -> Result<PreparedDownload, DownloadError> {
        let url = url.trim();
        let (metadata, catalog) = self.resolve(url).await?;
        let stream = FormatSelector::select(&catalog, requested)?.clone();

        info!(
            url,
            requested,
            selected = %stream.resolution_label,
            format = %stream.id,
            "Selected stream"
        );

        let scratch = self.storage.acquire().await?;
        let mut job = DownloadJob {
            scratch,
            stream,
            artifact: None,
        };

        let artifact = self
            .materialize(url, &metadata.title, &job.stream, &job.scratch)
            .await?;
        job.artifact = Some(artifact.path.clone());

        let file = File::open(&artifact.path).await?;
        info!(
            url,
            job = %job.scratch.job_id(),
            size = artifact.size_bytes,
            filename = %artifact.filename,
            "Artifact ready"
        );

        Ok(PreparedDownload {
            job,
            file,
            artifact,
            container: self.container.clone(),
        })
    }

    /// Download `stream` into `scratch` and locate the file the engine produced
    pub async fn materialize(
        &self,
        url: &str,
        title: &str,
        stream: &StreamDescriptor,
        scratch: &ScratchDir,
    ) -> Result<MaterializedArtifact, DownloadError> {
        let request = DownloadRequest {
            format_spec: FormatSelector::format_spec(stream),
            output_dir: scratch.path().to_path_buf(),
            merge_container: self.container.clone(),
        };

        debug!(
            url,
            job = %scratch.job_id(),
            format = %request.format_spec,
            engine = self.engine.name(),
            "Starting download"
        );
        let output = self.engine.download(url, &request).await?;

        let path = locate_artifact(output.predicted_path.as_deref(), scratch.path()).await?;
        let size_bytes = tokio::fs::metadata(&path).await?.len();

        Ok(MaterializedArtifact {
            path,
            size_bytes,
            filename: safe_filename(title, &self.container),
        })
    }
}

/// Find the downloaded file inside `dir`.
///
/// The engine-printed path wins when it names a regular file inside `dir`;
/// otherwise the first regular file by name, skipping partial downloads.
pub async fn locate_artifact(predicted: Option<&Path>, dir: &Path) -> Result<PathBuf, DownloadError> {
    if let Some(path) = predicted {
        if path.starts_with(dir) && is_regular_file(path).await {
            return Ok(path.to_path_buf());
        }
        debug!(predicted = %path.display(), "Predicted path missing, scanning directory");
    }

    let mut candidates = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if PARTIAL_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
            continue;
        }
        candidates.push(entry.path());
    }

    candidates.sort();
    candidates
        .into_iter()
        .next()
        .ok_or_else(|| DownloadError::ArtifactNotFound(dir.to_path_buf()))
}

async fn is_regular_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

/// One request's download: owns the scratch dir until the job ends
#[derive(Debug)]
pub struct DownloadJob {
    scratch: ScratchDir,
    stream: StreamDescriptor,
    artifact: Option<PathBuf>,
}

impl DownloadJob {
    pub fn stream(&self) -> &StreamDescriptor {
        &self.stream
    }

    pub fn scratch_path(&self) -> &Path {
        self.scratch.path()
    }

    /// Dropping the scratch handle queues its removal on the blocking pool
    fn finish(self) {
        debug!(
            job = %self.scratch.job_id(),
            stream = %self.stream.resolution_label,
            artifact = ?self.artifact,
            "Job finished"
        );
    }
}

/// Located file plus what the response needs to describe it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedArtifact {
    pub path: PathBuf,
    pub size_bytes: u64,
    /// Sanitized, derived from the title
    pub filename: String,
}

/// Open artifact waiting to be streamed
#[derive(Debug)]
pub struct PreparedDownload {
    job: DownloadJob,
    file: File,
    artifact: MaterializedArtifact,
    container: String,
}

impl PreparedDownload {
    pub fn artifact(&self) -> &MaterializedArtifact {
        &self.artifact
    }

    pub fn job(&self) -> &DownloadJob {
        &self.job
    }

    pub fn size_bytes(&self) -> u64 {
        self.artifact.size_bytes
    }

    pub fn content_type(&self) -> String {
        format!("video/{}", self.container)
    }

    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.artifact.filename)
    }

    /// Hand the file and the job over to a byte stream
    pub fn into_stream(self) -> ArtifactStream {
        ArtifactStream {
            inner: ReaderStream::new(self.file),
            job: Some(self.job),
        }
    }
}

/// File contents as a stream; the job is released at EOF, or on drop if the
/// client goes away first.
pub struct ArtifactStream {
    inner: ReaderStream<File>,
    job: Option<DownloadJob>,
}

impl Stream for ArtifactStream {
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let polled = Pin::new(&mut this.inner).poll_next(cx);

        match &polled {
            Poll::Ready(None) => {
                if let Some(job) = this.job.take() {
                    job.finish();
                }
            }
            Poll::Ready(Some(Err(e))) => {
                warn!(error = %e, "Failed reading artifact");
            }
            _ => {}
        }

        polled
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl Drop for ArtifactStream {
    fn drop(&mut self) {
        if let Some(job) = self.job.take() {
            debug!(job = %job.scratch.job_id(), "Stream dropped before EOF");
        }
    }
}
