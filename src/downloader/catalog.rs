// StreamCatalog - normalized view of the encodings a video offers
//
// Invariants:
// - at most one entry per resolution label (first seen in engine order wins)
// - sorted by height, highest first (stable)

use serde::Serialize;
use std::collections::HashSet;

use super::extractors::RawFormat;
use super::models::StreamDescriptor;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StreamCatalog {
    streams: Vec<StreamDescriptor>,
}

impl StreamCatalog {
    /// Build from engine formats, keeping only `container` encodings with a known height
    pub fn from_raw_formats(formats: &[RawFormat], container: &str) -> Self {
        Self::from_streams(
            formats
                .iter()
                .filter_map(|f| StreamDescriptor::from_raw(f, container)),
        )
    }

    pub fn from_streams(streams: impl IntoIterator<Item = StreamDescriptor>) -> Self {
        let mut seen = HashSet::new();
        let mut streams: Vec<StreamDescriptor> = streams
            .into_iter()
            .filter(|s| seen.insert(s.resolution_label.clone()))
            .collect();

        // sort_by is stable
        streams.sort_by(|a, b| b.height_pixels.cmp(&a.height_pixels));

        Self { streams }
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StreamDescriptor> {
        self.streams.iter()
    }

    /// Highest resolution available
    pub fn best(&self) -> Option<&StreamDescriptor> {
        self.streams.first()
    }

    /// Exact match on resolution label
    pub fn find(&self, label: &str) -> Option<&StreamDescriptor> {
        self.streams.iter().find(|s| s.resolution_label == label)
    }

    pub fn as_slice(&self) -> &[StreamDescriptor] {
        &self.streams
    }
}
