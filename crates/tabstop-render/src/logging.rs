//! Logging setup for hosts embedding the renderer

use tracing::Level;

/// Parse a level name, falling back to INFO for anything unknown
pub fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Install a stderr subscriber at `level`
///
/// Returns false when a global subscriber was already installed, which is
/// harmless: tests call this repeatedly.
pub fn init_logging(level: &str) -> bool {
    tracing_subscriber::fmt()
        .with_max_level(parse_level(level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
