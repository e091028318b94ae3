//! The [`Log`] trait shared by every logging backend.

/// Abstraction over logging backends.
///
/// Both [`Logger`](super::logger::Logger) (console and run log) and
/// [`MemoryLog`](super::memory::MemoryLog) (captured in memory) implement
/// this trait, so projection and VCS code can report progress without
/// knowing where the output goes.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);

    /// Report labelled counters for `scope`, e.g. a module's projection
    /// tallies.
    ///
    /// The default renders them as one info line, `scope: 3 created, 1 removed`.
    fn counts(&self, scope: &str, counts: &[(&str, usize)]) {
        self.info(&format!(
            "{scope}: {}",
            super::subscriber::describe_counts(counts)
        ));
    }
}
