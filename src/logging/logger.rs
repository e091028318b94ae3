//! Console and log-file logger with warning accounting.
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::file::log_path;
use super::subscriber::{
    COUNTS_TARGET, STAGE_TARGET, SUMMARY_TARGET, describe_counts, encode_counts,
};
use super::types::Log;

/// Implement the methods of [`Log`] by delegating to inherent methods of the
/// same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger that emits through [`tracing`].
///
/// Every message, debug included, also lands in the run log at
/// `$XDG_CACHE_HOME/modlink/modlink.log` regardless of the verbose flag.
#[derive(Debug)]
pub struct Logger {
    log_file: Option<PathBuf>,
    warnings: AtomicUsize,
}

impl Logger {
    /// Create a new logger.
    ///
    /// The run log is opened by [`init_subscriber`](super::subscriber::init_subscriber);
    /// the logger only remembers where it is.
    #[must_use]
    pub fn new() -> Self {
        Self {
            log_file: log_path(),
            warnings: AtomicUsize::new(0),
        }
    }

    /// Return the log file path, if available.
    #[must_use]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Number of warnings logged so far.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.warnings.load(Ordering::Relaxed)
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        self.warnings.fetch_add(1, Ordering::Relaxed);
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Report counters for `scope`. The console shows them as prose, the run
    /// log keeps them as `label=value` pairs and adds them to the run totals.
    pub fn counts(&self, scope: &str, counts: &[(&str, usize)]) {
        let encoded = encode_counts(counts);
        tracing::info!(
            target: COUNTS_TARGET,
            scope,
            counts = encoded.as_str(),
            "{scope}: {}",
            describe_counts(counts)
        );
    }

    /// Close the run: the warning count on the console when non-zero, and an
    /// `end` line with the counter totals in the run log.
    pub fn print_summary(&self) {
        let warnings = self.warning_count();
        if warnings > 0 {
            tracing::info!(target: SUMMARY_TARGET, "{warnings} warning(s)");
        } else {
            tracing::debug!(target: SUMMARY_TARGET, "{warnings} warning(s)");
        }
        if let Some(path) = &self.log_file {
            self.debug(&format!("log: {}", path.display()));
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error);

    fn counts(&self, scope: &str, counts: &[(&str, usize)]) {
        self.counts(scope, counts);
    }
}
