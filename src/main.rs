use anyhow::Result;
use clap::Parser;
use tracing::debug;

use video_relay_lib::config::Config;
use video_relay_lib::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse before tracing so --help works without logs
    let config = Config::parse();
    init_logging(config.verbose, config.quiet);
    debug!(
        host = %config.host,
        port = config.port,
        engine = %config.engine,
        proxy = ?config.redacted_proxy(),
        cookies = ?config.cookies,
        "Configuration parsed"
    );

    video_relay_lib::run(config).await
}
