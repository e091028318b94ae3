//! In-memory log backend.
use std::sync::Mutex;

use super::subscriber::STAGE_TARGET;
use super::types::Log;

/// Severity of a captured message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Stage header.
    Stage,
    /// Informational message.
    Info,
    /// Debug message.
    Debug,
    /// Warning.
    Warn,
    /// Error.
    Error,
}

/// A single captured log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Severity.
    pub level: Level,
    /// Message text as logged.
    pub message: String,
}

impl LogEntry {
    /// Re-emit this entry through [`tracing`].
    fn replay(&self) {
        let msg = &self.message;
        match self.level {
            Level::Stage => tracing::info!(target: STAGE_TARGET, "{msg}"),
            Level::Info => tracing::info!("{msg}"),
            Level::Debug => tracing::debug!("{msg}"),
            Level::Warn => tracing::warn!("{msg}"),
            Level::Error => tracing::error!("{msg}"),
        }
    }
}

/// Implement the methods of [`Log`] by capturing each message as a
/// [`LogEntry`] with the corresponding [`Level`].
macro_rules! capture_log_methods {
    ($($method:ident => $level:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                if let Ok(mut guard) = self.entries.lock() {
                    guard.push(LogEntry {
                        level: Level::$level,
                        message: msg.to_string(),
                    });
                }
            }
        )+
    };
}

/// Log backend that keeps every message in memory.
///
/// Used by library callers that want to inspect what a projection reported,
/// and by tests asserting on warnings. Captured entries can be forwarded to
/// the global subscriber later with [`flush`](Self::flush).
#[derive(Debug, Default)]
pub struct MemoryLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all captured entries in order.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().map_or_else(|_| Vec::new(), |g| g.clone())
    }

    /// Messages captured at `level`, in order.
    #[must_use]
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.level == level)
            .map(|e| e.message)
            .collect()
    }

    /// Captured warnings, in order.
    #[must_use]
    pub fn warnings(&self) -> Vec<String> {
        self.messages(Level::Warn)
    }

    /// Replay all captured entries through [`tracing`] and clear the buffer.
    pub fn flush(&self) {
        let entries = match self.entries.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(_) => return,
        };
        for entry in &entries {
            entry.replay();
        }
    }
}

impl Log for MemoryLog {
    capture_log_methods! {
        stage => Stage,
        info  => Info,
        debug => Debug,
        warn  => Warn,
        error => Error,
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::isolated_logger;
    use std::fs;

    #[test]
    fn captures_in_order() {
        let log = MemoryLog::new();
        log.stage("stage-1");
        log.info("info-1");
        log.warn("warn-1");
        let entries = log.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].level, Level::Stage);
        assert_eq!(entries[2].message, "warn-1");
    }

    #[test]
    fn warnings_filters_by_level() {
        let log = MemoryLog::new();
        log.info("fine");
        log.warn("a");
        log.debug("noise");
        log.warn("b");
        assert_eq!(log.warnings(), vec!["a", "b"]);
    }

    #[test]
    fn flush_replays_to_file_and_clears() {
        let (logger, _tmp, _guard) = isolated_logger();
        let log = MemoryLog::new();
        let marker = format!("mem-marker-{}", std::process::id());
        log.warn(&marker);

        let path = logger.log_path().expect("log path");
        let before = fs::read_to_string(path).unwrap();
        assert!(!before.contains(&marker));

        log.flush();
        let after = fs::read_to_string(path).unwrap();
        assert!(after.contains(&format!("warn: {marker}")));
        assert!(log.entries().is_empty());
    }
}
