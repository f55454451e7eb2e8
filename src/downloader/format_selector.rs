// FormatSelector - resolve a requested quality against a StreamCatalog
//
// Policy:
// 1. Exact label match
// 2. Otherwise the highest resolution available
// 3. Empty catalog is an error
//
// Also builds the yt-dlp format expression for the chosen stream.

use super::catalog::StreamCatalog;
use super::errors::DownloadError;
use super::models::StreamDescriptor;

pub struct FormatSelector;

impl FormatSelector {
    /// Pick the stream for `requested` (e.g. "720p", "720", " 720P ")
    pub fn select<'a>(
        catalog: &'a StreamCatalog,
        requested: &str,
    ) -> Result<&'a StreamDescriptor, DownloadError> {
        let label = Self::normalize_label(requested);

        catalog
            .find(&label)
            .or_else(|| catalog.best())
            .ok_or(DownloadError::StreamNotFound)
    }

    /// Trim, lowercase, and add the "p" suffix to bare numbers
    pub fn normalize_label(requested: &str) -> String {
        let label = requested.trim().to_ascii_lowercase();
        if !label.is_empty() && label.chars().all(|c| c.is_ascii_digit()) {
            format!("{}p", label)
        } else {
            label
        }
    }

    /// yt-dlp format expression for a stream
    ///
    /// Video-only streams are paired with the best audio track (m4a first so
    /// the merge stays in an mp4-compatible container).
    pub fn format_spec(stream: &StreamDescriptor) -> String {
        let fallback = format!(
            "best[height<={}][ext={}]",
            stream.height_pixels, stream.container
        );

        if stream.has_audio {
            format!("{}/{}", stream.id, fallback)
        } else {
            format!(
                "{id}+bestaudio[ext=m4a]/{id}+bestaudio/{fallback}",
                id = stream.id,
                fallback = fallback
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(height: u32, has_audio: bool) -> StreamDescriptor {
        StreamDescriptor {
            id: format!("f{}", height),
            resolution_label: format!("{}p", height),
            height_pixels: height,
            container: "mp4".to_string(),
            approx_size_bytes: None,
            has_audio,
        }
    }

    fn catalog(heights: &[u32]) -> StreamCatalog {
        StreamCatalog::from_streams(heights.iter().map(|h| stream(*h, false)))
    }

    #[test]
    fn test_exact_match() {
        let catalog = catalog(&[480, 720, 1080]);
        let chosen = FormatSelector::select(&catalog, "720p").unwrap();
        assert_eq!(chosen.resolution_label, "720p");
    }

    #[test]
    fn test_missing_resolution_falls_back_to_highest() {
        let catalog = catalog(&[360, 480]);
        let chosen = FormatSelector::select(&catalog, "1080p").unwrap();
        assert_eq!(chosen.resolution_label, "480p");

        let catalog = self::catalog(&[360, 1080, 720]);
        let chosen = FormatSelector::select(&catalog, "240p").unwrap();
        assert_eq!(chosen.resolution_label, "1080p");
    }

    #[test]
    fn test_empty_catalog_is_not_found() {
        let empty = StreamCatalog::default();
        let result = FormatSelector::select(&empty, "720p");
        assert!(matches!(result, Err(DownloadError::StreamNotFound)));
    }

    #[test]
    fn test_requested_label_is_normalized() {
        let catalog = catalog(&[480, 720, 1080]);
        for requested in ["720", " 720P ", "720p"] {
            let chosen = FormatSelector::select(&catalog, requested).unwrap();
            assert_eq!(chosen.resolution_label, "720p", "request {:?}", requested);
        }

        assert_eq!(FormatSelector::normalize_label(""), "");
        assert_eq!(FormatSelector::normalize_label("best"), "best");
    }

    #[test]
    fn test_result_is_always_in_catalog() {
        let catalog = catalog(&[144, 360, 720]);
        for requested in ["144p", "360p", "720p", "4k", "", "999p"] {
            let chosen = FormatSelector::select(&catalog, requested).unwrap();
            assert!(catalog.iter().any(|s| s == chosen));
        }
    }

    #[test]
    fn test_format_spec_for_video_only_pairs_audio() {
        assert_eq!(
            FormatSelector::format_spec(&stream(720, false)),
            "f720+bestaudio[ext=m4a]/f720+bestaudio/best[height<=720][ext=mp4]"
        );
    }

    #[test]
    fn test_format_spec_for_progressive() {
        assert_eq!(
            FormatSelector::format_spec(&stream(360, true)),
            "f360/best[height<=360][ext=mp4]"
        );
    }
}
