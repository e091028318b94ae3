//! The persistent run log.
//!
//! Every run appends to `$XDG_CACHE_HOME/modlink/modlink.log`
//! (`~/.cache/modlink/modlink.log` when unset). A run opens with a `#` header
//! naming the command and closes with an `end` line carrying the totals of
//! every counter reported during the run, so the file reads like:
//!
//! ```text
//! # 2026-10-19T08:14:02Z modlink 0.3.0 update
//! 08:14:02 == Updating core
//! 08:14:03 counts core created=1 unchanged=2 replaced=0 missing=0 removed=0
//! 08:14:03 counts core swept=1
//! 08:14:03 end 0 warning(s) created=1 unchanged=2 replaced=0 missing=0 removed=0 swept=1
//! ```
//!
//! Once the file grows past [`ROTATE_AT`] bytes it is moved to
//! `modlink.log.old` before the next run starts.
use std::fs;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::{COUNTS_TARGET, EventFields, STAGE_TARGET, SUMMARY_TARGET};

/// Size past which the log is rotated.
pub(super) const ROTATE_AT: u64 = 512 * 1024;

/// Location of the run log, creating its directory if needed.
pub(super) fn log_path() -> Option<PathBuf> {
    let cache = std::env::var_os("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var_os("HOME")
                .or_else(|| std::env::var_os("USERPROFILE"))
                .map(|home| PathBuf::from(home).join(".cache"))
        })?;
    let dir = cache.join("modlink");
    fs::create_dir_all(&dir).ok()?;
    Some(dir.join("modlink.log"))
}

#[derive(Debug)]
struct RunLogState {
    file: fs::File,
    /// Counter totals in the order the labels were first reported.
    totals: Vec<(String, usize)>,
}

impl RunLogState {
    fn add_counts(&mut self, encoded: &str) {
        for (label, value) in encoded
            .split_whitespace()
            .filter_map(|pair| pair.split_once('='))
        {
            let Ok(value) = value.parse::<usize>() else {
                continue;
            };
            match self.totals.iter_mut().find(|(l, _)| l == label) {
                Some((_, total)) => *total += value,
                None => self.totals.push((label.to_string(), value)),
            }
        }
    }

    fn totals_line(&self) -> String {
        self.totals
            .iter()
            .map(|(label, total)| format!("{label}={total}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A [`tracing_subscriber::Layer`] that appends events to the run log and
/// keeps running totals of every counter event.
#[derive(Debug)]
pub(super) struct RunLogLayer {
    state: Mutex<RunLogState>,
}

impl RunLogLayer {
    /// Rotate the log if it is too large, append the run header for
    /// `command`, and return a layer writing to it.
    ///
    /// Returns `None` when the log cannot be opened; logging to the console
    /// still works in that case.
    pub(super) fn open(command: &str) -> Option<Self> {
        let path = log_path()?;
        if fs::metadata(&path).is_ok_and(|m| m.len() > ROTATE_AT) {
            fs::rename(&path, path.with_extension("log.old")).ok()?;
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .ok()?;
        let version = option_env!("MODLINK_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
        writeln!(
            file,
            "# {} modlink {version} {command}",
            chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
        )
        .ok()?;

        Some(Self {
            state: Mutex::new(RunLogState {
                file,
                totals: Vec::new(),
            }),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for RunLogLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let metadata = event.metadata();
        let fields = EventFields::of(event);
        let Ok(mut state) = self.state.lock() else {
            return;
        };

        let body = match (*metadata.level(), metadata.target()) {
            (_, COUNTS_TARGET) => {
                let encoded = fields.counts.unwrap_or_default();
                state.add_counts(&encoded);
                format!("counts {} {encoded}", fields.scope.unwrap_or_default())
            }
            (_, SUMMARY_TARGET) => format!("end {} {}", fields.message, state.totals_line()),
            (tracing::Level::INFO, STAGE_TARGET) => format!("== {}", fields.message),
            (tracing::Level::ERROR, _) => format!("error: {}", fields.message),
            (tracing::Level::WARN, _) => format!("warn: {}", fields.message),
            (tracing::Level::INFO, _) => fields.message,
            _ => format!("debug: {}", fields.message),
        };

        let stamp = chrono::Utc::now().format("%H:%M:%S");
        writeln!(state.file, "{stamp} {}", body.trim_end()).ok();
    }
}
