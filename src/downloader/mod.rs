// Downloader module - metadata, stream selection, and download orchestration

pub mod catalog;
pub mod errors;
pub mod extractors;
pub mod format_selector;
pub mod metadata;
pub mod models;
pub mod orchestrator;
pub mod storage;
pub mod utils;

pub use catalog::StreamCatalog;
pub use errors::DownloadError;
pub use format_selector::FormatSelector;
pub use metadata::MetadataResolver;
pub use models::{StreamDescriptor, VideoMetadata};
pub use orchestrator::{DownloadOrchestrator, PreparedDownload};
pub use storage::{ScratchDir, TransientStorage};
