// Common data models for the relay

use serde::{Deserialize, Serialize};

use super::extractors::{RawFormat, RawVideoInfo};

/// Descriptive metadata for one video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    /// Engine video ID
    #[serde(skip)]
    pub id: String,
    /// Video title
    pub title: String,
    /// Channel / uploader name
    pub author: String,
    /// Duration in seconds
    pub duration_seconds: u64,
    /// Thumbnail URL
    pub thumbnail_url: String,
    /// Canonical page URL
    #[serde(skip)]
    pub webpage_url: String,
}

impl VideoMetadata {
    pub fn from_raw(raw: &RawVideoInfo) -> Self {
        Self {
            id: raw.id.clone(),
            title: raw.title.clone(),
            author: raw.uploader.clone(),
            duration_seconds: raw.duration_seconds,
            thumbnail_url: raw.thumbnail.clone(),
            webpage_url: raw.webpage_url.clone(),
        }
    }
}

/// One downloadable encoding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamDescriptor {
    /// Engine format ID (e.g., "137", "18")
    pub id: String,
    /// "{height}p"
    pub resolution_label: String,
    #[serde(skip)]
    pub height_pixels: u32,
    /// File extension (mp4, webm)
    pub container: String,
    /// Exact size if known, else the engine's estimate
    pub approx_size_bytes: Option<u64>,
    /// Progressive (audio muxed in)
    #[serde(skip)]
    pub has_audio: bool,
}

impl StreamDescriptor {
    /// Map a raw format into a descriptor.
    ///
    /// Returns `None` unless the format has a positive height and uses `container`.
    pub fn from_raw(format: &RawFormat, container: &str) -> Option<Self> {
        let height = format.height.filter(|h| *h > 0)?;
        if !format.ext.eq_ignore_ascii_case(container) {
            return None;
        }

        Some(Self {
            id: format.format_id.clone(),
            resolution_label: format!("{}p", height),
            height_pixels: height,
            container: format.ext.to_ascii_lowercase(),
            approx_size_bytes: format.effective_size(),
            has_audio: format.has_audio(),
        })
    }
}
