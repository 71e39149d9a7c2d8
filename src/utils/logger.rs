// src/utils/logger.rs

use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::sync::OnceLock;

static LOGGER: OnceLock<ConsoleLogger> = OnceLock::new();

struct ConsoleLogger {
    level: LevelFilter,
}

/// Install the stderr logger. Fails if another logger is already set.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    let logger = LOGGER.get_or_init(|| ConsoleLogger { level });
    log::set_logger(logger).map(|()| log::set_max_level(level))
}

/// Map a `-v` count to a level filter (0 = warn, 1 = info, 2 = debug, 3+ = trace).
pub fn level_for_verbosity(count: u8) -> LevelFilter {
    match count {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn tag(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARN ",
        Level::Info => "INFO ",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            // Format: "[WARN ] crysgraph::tensor: message"
            let mut err = std::io::stderr().lock();
            let _ = writeln!(
                err,
                "[{}] {}: {}",
                tag(record.level()),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(level_for_verbosity(0), LevelFilter::Warn);
        assert_eq!(level_for_verbosity(1), LevelFilter::Info);
        assert_eq!(level_for_verbosity(2), LevelFilter::Debug);
        assert_eq!(level_for_verbosity(7), LevelFilter::Trace);
    }

    #[test]
    fn test_enabled_respects_level() {
        use log::Log;
        let logger = ConsoleLogger { level: LevelFilter::Info };
        let info = Metadata::builder().level(Level::Info).build();
        let debug = Metadata::builder().level(Level::Debug).build();
        assert!(logger.enabled(&info));
        assert!(!logger.enabled(&debug));
    }
}
