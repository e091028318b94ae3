//! Global subscriber: console output plus the run log.
use std::fmt::Write as _;

use super::file::RunLogLayer;

/// Tracing target used for stage headers.
pub(super) const STAGE_TARGET: &str = "modlink::stage";

/// Tracing target for counter events emitted by [`Log::counts`](super::Log::counts).
pub(super) const COUNTS_TARGET: &str = "modlink::counts";

/// Tracing target for the closing event of a run.
pub(super) const SUMMARY_TARGET: &str = "modlink::summary";

/// Environment variable that overrides the console filter (`EnvFilter` syntax).
pub const LOG_ENV: &str = "MODLINK_LOG";

/// Render `counts` as `label=value` pairs, the form the run log stores.
pub(super) fn encode_counts(counts: &[(&str, usize)]) -> String {
    let mut out = String::new();
    for (label, value) in counts {
        if !out.is_empty() {
            out.push(' ');
        }
        let _ = write!(out, "{label}={value}");
    }
    out
}

/// Render `counts` for a person: `3 created, 1 removed`.
pub(super) fn describe_counts(counts: &[(&str, usize)]) -> String {
    counts
        .iter()
        .map(|(label, value)| format!("{value} {label}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// The fields modlink attaches to its events.
#[derive(Debug, Default)]
pub(super) struct EventFields {
    pub(super) message: String,
    pub(super) scope: Option<String>,
    pub(super) counts: Option<String>,
}

impl EventFields {
    pub(super) fn of(event: &tracing::Event<'_>) -> Self {
        let mut fields = Self::default();
        event.record(&mut fields);
        fields
    }

    fn slot(&mut self, name: &str) -> Option<&mut String> {
        match name {
            "message" => Some(&mut self.message),
            "scope" => Some(self.scope.get_or_insert_with(String::new)),
            "counts" => Some(self.counts.get_or_insert_with(String::new)),
            _ => None,
        }
    }
}

impl tracing::field::Visit for EventFields {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if let Some(slot) = self.slot(field.name()) {
            *slot = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if let Some(slot) = self.slot(field.name()) {
            *slot = value.to_string();
        }
    }
}

/// Console formatter: coloured level tags, `==>` stage headers, and
/// indented body lines.
struct ConsoleFormat;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormat
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let msg = EventFields::of(event).message;

        match (*metadata.level(), metadata.target()) {
            (tracing::Level::ERROR, _) => writeln!(writer, "\x1b[31merror\x1b[0m {msg}"),
            (tracing::Level::WARN, _) => writeln!(writer, "\x1b[33mwarn\x1b[0m  {msg}"),
            (tracing::Level::INFO, STAGE_TARGET) => {
                writeln!(writer, "\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m")
            }
            (_, SUMMARY_TARGET) => writeln!(writer, "\x1b[33m{msg}\x1b[0m"),
            (tracing::Level::INFO, _) => writeln!(writer, "  {msg}"),
            _ => writeln!(writer, "  \x1b[2m{msg}\x1b[0m"),
        }
    }
}

/// Initialise the global [`tracing`] subscriber.
///
/// Console output goes through [`ConsoleFormat`]: warnings and errors on
/// stderr, everything else on stdout, filtered at `info` (`debug` when
/// `verbose`) unless [`LOG_ENV`] says otherwise. Every event down to `debug`
/// is also appended to the run log (see [`RunLogLayer`]).
/// Must be called once at program startup, before any logging.
pub fn init_subscriber(verbose: bool, command: &str) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        EnvFilter, Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let default_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let console_filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::default().add_directive(default_level.into()));

    let console = fmt::layer()
        .event_format(ConsoleFormat)
        .with_writer(
            std::io::stderr
                .with_max_level(tracing::Level::WARN)
                .and(std::io::stdout.with_min_level(tracing::Level::INFO)),
        )
        .with_filter(console_filter);

    let run_log = RunLogLayer::open(command).map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console)
        .with(run_log)
        .init();
}
