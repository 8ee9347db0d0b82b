use anyhow::{Result, anyhow};
use colored::Colorize;
use log::{Level, LevelFilter, Metadata, Record};

pub struct MinimalLogger;

static LOGGER: MinimalLogger = MinimalLogger;

impl MinimalLogger {
    /// Install the logger with the level chosen on the command line.
    ///
    /// # Errors
    /// Fails if a logger is already installed.
    pub fn init(level: LevelFilter) -> Result<()> {
        log::set_logger(&LOGGER)
            .map(|()| log::set_max_level(level))
            .map_err(|e| anyhow!("Failed to install logger: {e}"))
    }
}

impl log::Log for MinimalLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let level_string = match record.level() {
            Level::Error => record.level().to_string().red(),
            Level::Warn => record.level().to_string().yellow(),
            Level::Info => record.level().to_string().cyan(),
            Level::Debug => record.level().to_string().purple(),
            Level::Trace => record.level().to_string().normal(),
        };

        // Keep stdout for command output.
        eprintln!("{:<5} {}", level_string, record.args());
    }

    fn flush(&self) {}
}

/// Log level for the `--verbose` count and `--quiet` flag.
pub fn level_filter(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_an_error() {
        // Only this test installs the logger, so the first call succeeds.
        MinimalLogger::init(LevelFilter::Warn).unwrap();
        let err = MinimalLogger::init(LevelFilter::Warn).unwrap_err();
        assert!(err.to_string().contains("Failed to install logger"));
        assert_eq!(log::max_level(), LevelFilter::Warn);
    }

    #[test]
    fn test_level_filter() {
        assert_eq!(level_filter(0, false), LevelFilter::Warn);
        assert_eq!(level_filter(1, false), LevelFilter::Info);
        assert_eq!(level_filter(2, false), LevelFilter::Debug);
        assert_eq!(level_filter(5, false), LevelFilter::Trace);
        assert_eq!(level_filter(3, true), LevelFilter::Error);
    }
}
