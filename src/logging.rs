//! Process-wide logging: one session log file per `init`, an optional
//! console sink, and a runtime-adjustable level.
//!
//! The `tracing` subscriber is installed once per process. `init` and
//! `shutdown` only swap the writers behind it, so the system can be
//! restarted (tests do this) without reinstalling the global subscriber.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, OnceLock, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, reload};

const MAX_LOG_FILES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Critical,
    Off,
}

impl LogLevel {
    /// `tracing` has no level above error, so critical maps onto it.
    fn directive(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error | LogLevel::Critical => "error",
            LogLevel::Off => "off",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Empty means the platform default, see [`default_log_dir`].
    pub dir: PathBuf,
    pub level: LogLevel,
    pub console: bool,
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("cannot create log directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("cannot open session log file: {0}")]
    Appender(#[from] InitError),
}

struct Session {
    path: PathBuf,
    _guard: WorkerGuard,
}

static SESSION: Mutex<Option<Session>> = Mutex::new(None);
static FILE_WRITER: RwLock<Option<NonBlocking>> = RwLock::new(None);
static CONSOLE: AtomicBool = AtomicBool::new(false);
static FILTER: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

pub fn init(options: LogOptions) -> Result<(), LoggingError> {
    let mut session = SESSION.lock().unwrap_or_else(|e| e.into_inner());
    if session.is_some() {
        return Ok(());
    }

    let dir = if options.dir.as_os_str().is_empty() {
        default_log_dir()
    } else {
        options.dir
    };
    std::fs::create_dir_all(&dir).map_err(|source| LoggingError::CreateDir {
        path: dir.clone(),
        source,
    })?;

    let prefix = session_prefix();
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(&prefix)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(&dir)?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    *FILE_WRITER.write().unwrap_or_else(|e| e.into_inner()) = Some(writer);
    CONSOLE.store(options.console, Ordering::Relaxed);
    if !install_subscriber(options.level) {
        set_global_level(options.level);
    }

    *session = Some(Session {
        path: dir.join(prefix),
        _guard: guard,
    });
    drop(session);

    tracing::info!(target: "aknet::logging", dir = %dir.display(), "logging initialized");
    Ok(())
}

/// Flushes and detaches the session file. Safe without a prior `init`.
pub fn shutdown() {
    let mut session = SESSION.lock().unwrap_or_else(|e| e.into_inner());
    FILE_WRITER
        .write()
        .unwrap_or_else(|e| e.into_inner())
        .take();
    CONSOLE.store(false, Ordering::Relaxed);
    // Dropping the guard drains the non-blocking worker.
    session.take();
}

#[cfg(test)]
pub(crate) fn is_initialized() -> bool {
    SESSION.lock().unwrap_or_else(|e| e.into_inner()).is_some()
}

/// Path prefix of the current session file; the appender appends the
/// rotation date and `.log`.
pub fn session_path() -> Option<PathBuf> {
    SESSION
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .as_ref()
        .map(|session| session.path.clone())
}

pub fn set_global_level(level: LogLevel) {
    let Some(handle) = FILTER.get() else {
        return;
    };
    if let Err(err) = handle.modify(|filter| *filter = EnvFilter::new(level.directive())) {
        tracing::warn!(target: "aknet::logging", "cannot change log level: {err}");
    }
}

pub fn default_log_dir() -> PathBuf {
    if let Some(project_dirs) = directories::ProjectDirs::from("", "", "aknet") {
        return project_dirs.data_dir().join("logs");
    }

    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("logs")
}

fn session_prefix() -> String {
    format!("aknet_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"))
}

/// `RUST_LOG` wins over the configured level when it holds a valid directive.
fn base_filter(level: LogLevel, env_directive: Option<String>) -> EnvFilter {
    env_directive
        .filter(|directive| !directive.trim().is_empty())
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| EnvFilter::new(level.directive()))
}

/// Returns `false` when a subscriber from an earlier session is reused.
fn install_subscriber(level: LogLevel) -> bool {
    if FILTER.get().is_some() {
        return false;
    }

    let filter = base_filter(level, std::env::var(EnvFilter::DEFAULT_ENV).ok());
    let (filter, handle) = reload::Layer::new(filter);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(SessionWriter);
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(io::stderr.with_filter(|_| CONSOLE.load(Ordering::Relaxed)));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init();

    match installed {
        Ok(()) => {
            let _ = FILTER.set(handle);
        }
        Err(err) => {
            // Another subscriber owns the process; keep the session file
            // bookkeeping but leave routing to it.
            let _ = writeln!(io::stderr(), "aknet: logging subscriber not installed: {err}");
        }
    }
    true
}

/// Routes formatted lines to whichever session file is active.
struct SessionWriter;

enum SessionSink {
    File(NonBlocking),
    Discard,
}

impl<'a> MakeWriter<'a> for SessionWriter {
    type Writer = SessionSink;

    fn make_writer(&'a self) -> Self::Writer {
        match FILE_WRITER.read().unwrap_or_else(|e| e.into_inner()).as_ref() {
            Some(writer) => SessionSink::File(writer.clone()),
            None => SessionSink::Discard,
        }
    }
}

impl Write for SessionSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            SessionSink::File(writer) => writer.write(buf),
            SessionSink::Discard => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            SessionSink::File(writer) => writer.flush(),
            SessionSink::Discard => Ok(()),
        }
    }
}

/// Whether `path` looks like a session log written by [`init`].
#[cfg(test)]
pub(crate) fn is_session_log(path: &std::path::Path) -> bool {
    let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    name.starts_with("aknet_") && path.extension().is_some_and(|ext| ext == "log")
}

/// Serializes tests that touch the process-wide logging state.
#[cfg(test)]
pub(crate) fn test_guard() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: Mutex<()> = Mutex::new(());
    LOCK.lock().unwrap_or_else(|e| e.into_inner())
}
