//! Logging: a console sink and a persistent file sink behind one layer.
//!
//! The tool emits six kinds of events (stage headers, plain info, simulate
//! plans, debug detail, warnings, errors). A single [`tracing`] layer
//! classifies each event once and routes it: styled to the console (stderr
//! for warnings and errors, stdout for the rest; debug only when verbose)
//! and as a plain tagged line to `DR/.peridot/log/peridot.log`, which always
//! records everything.
//!
//! Commands receive an explicit [`Logger`] handle instead of talking to a
//! process-wide singleton; the only global piece is the tracing dispatcher
//! itself.

use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::sync::Mutex;

use crate::paths;

/// Event target marking a major section header.
const STAGE_TARGET: &str = "peridot::stage";
/// Event target marking a planned-but-not-performed action.
const SIMULATE_TARGET: &str = "peridot::simulate";

/// Thin façade over the [`tracing`] macros, passed down to the engines.
#[derive(Debug, Default, Clone, Copy)]
pub struct Logger;

impl Logger {
    /// Create a new logger handle.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (console only when verbose; always in the file).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: "peridot::stage", "{msg}");
    }

    /// Log a planned action during a simulated run.
    pub fn simulate(&self, msg: &str) {
        tracing::info!(target: "peridot::simulate", "{msg}");
    }
}

/// What a [`Logger`] method said about an event, recovered from its level
/// and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Stage,
    Info,
    Simulate,
    Debug,
    Warn,
    Error,
}

impl Kind {
    fn classify(meta: &tracing::Metadata<'_>) -> Self {
        match *meta.level() {
            tracing::Level::ERROR => Self::Error,
            tracing::Level::WARN => Self::Warn,
            tracing::Level::INFO if meta.target() == STAGE_TARGET => Self::Stage,
            tracing::Level::INFO if meta.target() == SIMULATE_TARGET => Self::Simulate,
            tracing::Level::INFO => Self::Info,
            _ => Self::Debug,
        }
    }

    /// Tag used for the plain log-file line.
    const fn tag(self) -> &'static str {
        match self {
            Self::Stage => "stage",
            Self::Info => "info",
            Self::Simulate => "simulate",
            Self::Debug => "debug",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Console rendering of `msg` for this kind of event.
    fn console_line(self, msg: &str) -> String {
        match self {
            Self::Stage => format!("\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m"),
            Self::Info => format!("  {msg}"),
            Self::Simulate => format!("  \x1b[33m[simulate]\x1b[0m {msg}"),
            Self::Debug => format!("  \x1b[2m{msg}\x1b[0m"),
            Self::Warn => format!("\x1b[33mwarning:\x1b[0m {msg}"),
            Self::Error => format!("\x1b[31merror:\x1b[0m {msg}"),
        }
    }

    const fn goes_to_stderr(self) -> bool {
        matches!(self, Self::Warn | Self::Error)
    }
}

/// Pull the formatted message out of an event.
fn message_of(event: &tracing::Event<'_>) -> String {
    struct Message(String);

    impl tracing::field::Visit for Message {
        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
            if field.name() == "message" {
                use std::fmt::Write as _;
                let _ = write!(self.0, "{value:?}");
            }
        }
    }

    let mut visitor = Message(String::new());
    event.record(&mut visitor);
    visitor.0
}

/// The one layer behind both sinks.
struct PeridotLayer {
    /// Show debug events on the console.
    verbose: bool,
    /// Open log file; `None` degrades to console-only logging.
    file: Option<Mutex<fs::File>>,
}

impl PeridotLayer {
    fn new(verbose: bool, dotfiles_dir: Option<&Path>) -> Self {
        Self {
            verbose,
            file: dotfiles_dir.and_then(open_log_file).map(Mutex::new),
        }
    }
}

/// Open (or create) the log file under `dotfiles_dir` in append mode and
/// stamp a session header.
fn open_log_file(dotfiles_dir: &Path) -> Option<fs::File> {
    let path = paths::log_file(dotfiles_dir);
    fs::create_dir_all(path.parent()?).ok()?;
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .ok()?;
    let started = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
    writeln!(file, "-- peridot {} session {started} --", env!("CARGO_PKG_VERSION")).ok()?;
    Some(file)
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for PeridotLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let kind = Kind::classify(event.metadata());
        let msg = message_of(event);

        // The file records every kind, regardless of console verbosity.
        if let Some(file) = &self.file
            && let Ok(mut f) = file.lock()
        {
            let ts = chrono::Utc::now().format("%H:%M:%S");
            writeln!(f, "[{ts}] [{}] {msg}", kind.tag()).ok();
        }

        if kind == Kind::Debug && !self.verbose {
            return;
        }
        let line = kind.console_line(&msg);
        if kind.goes_to_stderr() {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }
}

/// Initialise the global [`tracing`] subscriber.
///
/// When a dotfiles root is given, the persistent file sink is attached to
/// it. Must be called once at program startup, before any logging.
pub fn init_subscriber(verbose: bool, dotfiles_dir: Option<&Path>) {
    use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

    tracing_subscriber::registry()
        .with(PeridotLayer::new(verbose, dotfiles_dir))
        .init();
}
