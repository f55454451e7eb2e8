// Extraction engines - yt-dlp behind one capability trait
//
// Two backends:
// - Python mode: `python3 -m yt_dlp` (better for YouTube, avoids bot detection)
// - CLI mode: native `yt-dlp` binary (faster, no Python dependency)
//
// The backend is picked once from configuration; see `selection`.

mod cli;
pub mod diagnostics;
mod identity;
mod python;
mod selection;
mod traits;
mod ytdlp;

#[cfg(test)]
pub mod fake;

pub use cli::CliEngine;
pub use diagnostics::{diagnose_error, BlockingReason};
pub use identity::{ClientIdentity, IdentityPool};
pub use python::PythonEngine;
pub use selection::build_engine;
pub use traits::{
    DownloadRequest, EngineConfig, EngineOutput, ExtractorMode, RawFormat, RawVideoInfo,
    VideoExtractionEngine,
};
