// Engine diagnostics - classifies yt-dlp failures
//
// yt-dlp reports every failure as free-form stderr. We map the text onto a
// small set of reasons so the HTTP layer can return something more useful
// than a raw stack of ERROR lines.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Why the video host (or the engine) refused to hand over the video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockingReason {
    /// The engine has no extractor for this URL, or it is not a URL at all
    UnsupportedUrl,

    /// DRM-protected or paid content
    DrmProtected,

    /// Requires a channel membership
    MembersOnly,

    /// Age-restricted content requiring login
    AgeRestricted,

    /// Private video requiring authorization
    PrivateVideo,

    /// Video deleted or unavailable
    VideoUnavailable,

    /// Geographic restriction
    GeoBlocked,

    /// Rate limiting (429 or similar)
    RateLimited,

    /// Bot detection triggered
    BotDetection,

    /// HTTP 403 Forbidden - general access denied
    Http403Forbidden,

    /// Network timeout, or the engine ran past its time bound
    NetworkTimeout,

    /// Anything else the engine printed
    Unknown,
}

impl BlockingReason {
    /// Permanent restrictions: asking again will not help
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedUrl | Self::DrmProtected | Self::VideoUnavailable | Self::PrivateVideo
        )
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::UnsupportedUrl => "Unsupported or malformed URL",
            Self::DrmProtected => "DRM-protected content",
            Self::MembersOnly => "Members-only content",
            Self::AgeRestricted => "Age-restricted content",
            Self::PrivateVideo => "Private video",
            Self::VideoUnavailable => "Video unavailable",
            Self::GeoBlocked => "Geographic restriction",
            Self::RateLimited => "Rate limited by the video host",
            Self::BotDetection => "Bot detection triggered",
            Self::Http403Forbidden => "Access denied (HTTP 403)",
            Self::NetworkTimeout => "Network timeout",
            Self::Unknown => "Unknown extraction failure",
        }
    }
}

/// Patterns checked in order of specificity; first hit wins.
const PATTERNS: &[(BlockingReason, &[&str])] = &[
    (
        BlockingReason::UnsupportedUrl,
        &["unsupported url", "is not a valid url", "no such host", "name or service not known"],
    ),
    (
        BlockingReason::DrmProtected,
        &[
            "drm",
            "widevine",
            "playready",
            "fairplay",
            "encrypted media",
            "requires purchase",
            "rental",
            "pay to watch",
        ],
    ),
    (
        BlockingReason::MembersOnly,
        &["members only", "members-only", "join this channel", "available to members"],
    ),
    (
        BlockingReason::AgeRestricted,
        &["age-restricted", "sign in to confirm your age", "age_verification"],
    ),
    (
        BlockingReason::PrivateVideo,
        &["private video", "video is private", "sign in if you've been granted access"],
    ),
    (
        BlockingReason::VideoUnavailable,
        &[
            "video unavailable",
            "video has been removed",
            "no longer available",
            "video is unavailable",
        ],
    ),
    (
        BlockingReason::GeoBlocked,
        &["available in your country", "blocked in your country", "geo restrict"],
    ),
    (
        BlockingReason::RateLimited,
        &["429", "rate limit", "too many requests"],
    ),
    (
        BlockingReason::BotDetection,
        &["not a bot", "captcha", "unusual traffic"],
    ),
    (BlockingReason::Http403Forbidden, &["403", "forbidden"]),
    (
        BlockingReason::NetworkTimeout,
        &["timeout", "timed out", "connection refused", "network unreachable"],
    ),
];

lazy_static! {
    static ref ERROR_LINE_RE: Regex = Regex::new(r"(?m)^ERROR:\s*(.+?)\s*$").unwrap();
}

/// Classify engine output. Returns `None` only for empty input.
pub fn diagnose_error(error: &str) -> Option<BlockingReason> {
    if error.trim().is_empty() {
        return None;
    }

    let lower = error.to_lowercase();
    let reason = PATTERNS
        .iter()
        .find(|(_, needles)| needles.iter().any(|n| lower.contains(n)))
        .map(|(reason, _)| *reason)
        .unwrap_or(BlockingReason::Unknown);

    Some(reason)
}

/// Pick the line worth showing to a caller: the first `ERROR:` line if there
/// is one, otherwise the last non-empty line.
pub fn headline(stderr: &str) -> String {
    if let Some(caps) = ERROR_LINE_RE.captures(stderr) {
        if let Some(m) = caps.get(1) {
            return m.as_str().to_string();
        }
    }

    stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("extraction engine failed without output")
        .to_string()
}
