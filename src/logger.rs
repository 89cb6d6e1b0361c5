use log::LevelFilter;
use simple_logger::SimpleLogger;

/// Diagnostics go to standard error so they never mix with rendered
/// events. `RUST_LOG` overrides the level.
pub fn init(debug: bool) -> Result<(), log::SetLoggerError> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    SimpleLogger::new().with_level(level).env().init()
}
