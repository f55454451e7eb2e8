// Engine selection
//
// Strategy for `auto`: the Python module is preferred when installed (better
// anti-bot behaviour), otherwise the native binary. The choice is made once at
// startup; requests never switch backends.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::cli::CliEngine;
use super::python::PythonEngine;
use super::traits::{EngineConfig, ExtractorMode, VideoExtractionEngine};
use crate::downloader::errors::DownloadError;

/// Build the backend named by `config.mode`.
///
/// An explicitly requested backend that is missing is still returned (with a
/// warning) so the service can start and report the problem per request;
/// `auto` fails only when neither backend is installed.
pub fn build_engine(config: EngineConfig) -> Result<Arc<dyn VideoExtractionEngine>, DownloadError> {
    debug!(mode = %config.mode, "Selecting engine");
    match config.mode {
        ExtractorMode::Python => Ok(checked(Arc::new(PythonEngine::new(config)))),
        ExtractorMode::Cli => Ok(checked(Arc::new(CliEngine::new(config)))),
        ExtractorMode::Auto => {
            let python = PythonEngine::new(config.clone());
            if python.is_available() {
                info!(engine = python.name(), "Auto-selected engine");
                return Ok(Arc::new(python));
            }

            let cli = CliEngine::new(config);
            if cli.is_available() {
                info!(engine = cli.name(), "Auto-selected engine (python yt_dlp module not installed)");
                return Ok(Arc::new(cli));
            }

            Err(DownloadError::EngineUnavailable(
                "neither the python yt_dlp module nor the yt-dlp binary is installed".to_string(),
            ))
        }
    }
}

fn checked(engine: Arc<dyn VideoExtractionEngine>) -> Arc<dyn VideoExtractionEngine> {
    if engine.is_available() {
        info!(engine = engine.name(), "Using configured engine");
    } else {
        warn!(engine = engine.name(), "Configured engine is not installed; requests will fail");
    }
    engine
}
