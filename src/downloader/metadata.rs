// MetadataResolver - engine info query to (VideoMetadata, StreamCatalog)

use std::sync::Arc;

use tracing::{debug, info};

use super::catalog::StreamCatalog;
use super::errors::DownloadError;
use super::extractors::VideoExtractionEngine;
use super::models::VideoMetadata;

#[derive(Clone)]
pub struct MetadataResolver {
    engine: Arc<dyn VideoExtractionEngine>,
    container: String,
}

impl MetadataResolver {
    pub fn new(engine: Arc<dyn VideoExtractionEngine>, container: impl Into<String>) -> Self {
        Self {
            engine,
            container: container.into(),
        }
    }

    /// Query the engine without downloading
    pub async fn resolve(&self, url: &str) -> Result<(VideoMetadata, StreamCatalog), DownloadError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(DownloadError::InvalidRequest("url must not be empty".to_string()));
        }

        info!(url, engine = self.engine.name(), "Resolving video info");
        let raw = self.engine.extract(url).await?;

        let metadata = VideoMetadata::from_raw(&raw);
        let catalog = StreamCatalog::from_raw_formats(&raw.formats, &self.container);
        debug!(
            url,
            video = %metadata.id,
            page = %metadata.webpage_url,
            raw_formats = raw.formats.len(),
            streams = catalog.len(),
            "Built stream catalog"
        );

        Ok((metadata, catalog))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::extractors::fake::{self, FakeArtifact, FakeEngine};
    use crate::downloader::extractors::BlockingReason;

    fn resolver(engine: FakeEngine) -> MetadataResolver {
        MetadataResolver::new(Arc::new(engine), "mp4")
    }

    #[tokio::test]
    async fn test_resolve_builds_metadata_and_catalog() {
        let engine = FakeEngine::new(
            fake::video_info("A Title", fake::sample_formats()),
            FakeArtifact::Phantom,
        );
        let (meta, catalog) = resolver(engine).resolve("https://video.example/v").await.unwrap();

        assert_eq!(meta.title, "A Title");
        assert_eq!(meta.author, "Uploader");
        assert_eq!(meta.duration_seconds, 95);
        let labels: Vec<_> = catalog.iter().map(|s| s.resolution_label.clone()).collect();
        assert_eq!(labels, vec!["1080p", "720p", "360p"]);
    }

    #[tokio::test]
    async fn test_blank_url_is_rejected_before_engine() {
        let err = resolver(FakeEngine::failing("ERROR: should not run"))
            .resolve("   ")
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_engine_failure_is_extraction_error() {
        let err = resolver(FakeEngine::failing("ERROR: [generic] Video unavailable"))
            .resolve("https://video.example/gone")
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::Extraction { .. }));
        assert_eq!(err.reason(), Some(BlockingReason::VideoUnavailable));
    }
}
