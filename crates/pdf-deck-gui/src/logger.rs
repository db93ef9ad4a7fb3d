use chrono::{DateTime, Local};
use log::{Level, LevelFilter, Metadata, Record};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: Level,
    pub message: String,
}

/// Log sink that keeps the most recent records for the presenter window
#[derive(Clone)]
pub struct AppLogger {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
    max_entries: usize,
    level: LevelFilter,
}

impl AppLogger {
    pub fn new(max_entries: usize, level: LevelFilter) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::new())),
            max_entries: max_entries.max(1),
            level,
        }
    }

    /// Install a clone of this logger as the global `log` backend
    pub fn init(&self) -> Result<(), log::SetLoggerError> {
        log::set_boxed_logger(Box::new(self.clone()))?;
        log::set_max_level(self.level);
        Ok(())
    }

    pub fn latest(&self) -> Option<LogEntry> {
        self.lock().back().cloned()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl log::Log for AppLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let entry = LogEntry {
            timestamp: Local::now(),
            level: record.level(),
            message: record.args().to_string(),
        };

        let mut entries = self.lock();
        entries.push_back(entry);
        while entries.len() > self.max_entries {
            entries.pop_front();
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;

    fn emit(logger: &AppLogger, level: Level, message: &str) {
        logger.log(
            &Record::builder()
                .args(format_args!("{message}"))
                .level(level)
                .build(),
        );
    }

    #[test]
    fn test_keeps_only_recent_entries() {
        let logger = AppLogger::new(3, LevelFilter::Info);
        for n in 0..5 {
            emit(&logger, Level::Info, &format!("message {n}"));
        }
        assert_eq!(logger.len(), 3);
        assert_eq!(logger.latest().unwrap().message, "message 4");
    }

    #[test]
    fn test_filters_below_level() {
        let logger = AppLogger::new(10, LevelFilter::Warn);
        emit(&logger, Level::Info, "quiet");
        emit(&logger, Level::Debug, "quieter");
        assert!(logger.latest().is_none());

        emit(&logger, Level::Error, "loud");
        let latest = logger.latest().unwrap();
        assert_eq!(latest.level, Level::Error);
        assert_eq!(latest.message, "loud");
    }

    #[test]
    fn test_clones_share_entries() {
        let logger = AppLogger::new(10, LevelFilter::Info);
        let installed = logger.clone();
        emit(&installed, Level::Warn, "from worker");
        assert_eq!(logger.latest().unwrap().message, "from worker");
    }
}
