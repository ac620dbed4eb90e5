//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Initialize logging with a default level filter (e.g. `"debug"`).
///
/// `RUST_LOG` still overrides the default when set. Unknown level strings
/// fall back to `info`. Safe to call more than once; later calls are ignored.
pub fn init_with_level(level: &str) {
    let filter = level.parse::<log::LevelFilter>().unwrap_or(log::LevelFilter::Info);
    let _ = env_logger::Builder::new()
        .filter_level(filter)
        .parse_default_env()
        .try_init();
}
