use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;

use crate::logging::{self, LogOptions};
use crate::settings::{AppSettings, Settings, SettingsConfig};

#[derive(Debug, Clone, Default)]
pub struct CoreConfig {
    pub log: LogOptions,
    pub settings: SettingsConfig,
}

/// Owns the process-wide services: logging and settings.
#[derive(Debug)]
pub struct Core {
    settings: Mutex<Settings>,
    running: AtomicBool,
}

impl Core {
    pub fn init(config: CoreConfig) -> Result<Self> {
        let CoreConfig { log, mut settings } = config;

        if settings.base_dir.as_os_str().is_empty() {
            settings.base_dir = if log.dir.as_os_str().is_empty() {
                logging::default_log_dir()
            } else {
                log.dir.clone()
            };
        }

        logging::init(log)?;
        if let Some(session) = logging::session_path() {
            tracing::debug!(target: "core", session = %session.display(), "session log opened");
        }

        tracing::info!(
            target: "core",
            "aknet - v{} by {}",
            env!("CARGO_PKG_VERSION"),
            env!("CARGO_PKG_AUTHORS")
        );
        tracing::info!(target: "core", "Initializing core module...");

        let settings = match open_settings(settings) {
            Ok(settings) => settings,
            Err(err) => {
                tracing::error!(target: "core", "Initializing core module - failed: {err:#}");
                logging::shutdown();
                return Err(err);
            }
        };

        tracing::info!(target: "core", "Initializing core module - done.");

        Ok(Self {
            settings: Mutex::new(settings),
            running: AtomicBool::new(true),
        })
    }

    pub fn test_function(&self) {
        tracing::info!(target: "core", "Core test function called");
    }

    pub fn settings_snapshot(&self) -> Result<Arc<AppSettings>> {
        Ok(self.lock_settings().snapshot()?)
    }

    /// Idempotent; only the first call tears anything down.
    pub fn shutdown(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }

        tracing::info!(target: "core", "Core shutdown called");
        self.lock_settings().shutdown();
        logging::shutdown();
    }

    fn lock_settings(&self) -> std::sync::MutexGuard<'_, Settings> {
        self.settings.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn open_settings(config: SettingsConfig) -> Result<Settings> {
    let settings = Settings::open(config)?;
    if settings.path().is_file() {
        let snapshot = settings.snapshot()?;
        logging::set_global_level(snapshot.general.log_level);
        tracing::info!(target: "core", level = ?snapshot.general.log_level, "log level taken from settings");
    }
    Ok(settings)
}

impl Drop for Core {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;

    fn config(dir: &std::path::Path) -> CoreConfig {
        CoreConfig {
            log: LogOptions {
                dir: dir.to_path_buf(),
                level: LogLevel::Trace,
                console: false,
            },
            settings: SettingsConfig::default(),
        }
    }

    #[test]
    fn init_and_shutdown_complete_without_error() {
        let _guard = logging::test_guard();
        let temp = tempfile::tempdir().unwrap();

        let core = Core::init(config(temp.path())).unwrap();
        assert!(logging::is_initialized());
        core.test_function();
        core.shutdown();

        assert!(!logging::is_initialized());
    }

    #[test]
    fn double_shutdown_is_safe() {
        let _guard = logging::test_guard();
        let temp = tempfile::tempdir().unwrap();

        let core = Core::init(config(temp.path())).unwrap();
        core.shutdown();
        core.shutdown();
        drop(core);
        assert!(!logging::is_initialized());
    }

    #[test]
    fn settings_without_a_file_are_defaults() {
        let _guard = logging::test_guard();
        let temp = tempfile::tempdir().unwrap();

        let core = Core::init(config(temp.path())).unwrap();
        let snapshot = core.settings_snapshot().unwrap();
        assert_eq!(snapshot.audio.buffer_size, 256);
        assert_eq!(snapshot.general.log_level, LogLevel::Info);
    }

    #[test]
    fn settings_file_is_read_from_the_log_directory() {
        let _guard = logging::test_guard();
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(
            temp.path().join("aknet_settings.json"),
            r#"{ "general": { "log_level": "warn" }, "audio": { "buffer_size": 512 } }"#,
        )
        .unwrap();

        let core = Core::init(config(temp.path())).unwrap();
        let snapshot = core.settings_snapshot().unwrap();
        assert_eq!(snapshot.audio.buffer_size, 512);
        assert_eq!(snapshot.general.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_function_writes_to_the_session_log() {
        let _guard = logging::test_guard();
        let temp = tempfile::tempdir().unwrap();

        let core = Core::init(config(temp.path())).unwrap();
        core.test_function();
        core.shutdown();

        let contents: String = std::fs::read_dir(temp.path())
            .unwrap()
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| logging::is_session_log(path))
            .map(|path| std::fs::read_to_string(path).unwrap())
            .collect();
        assert!(contents.contains("Core test function called"));
        assert!(contents.contains("Initializing core module - done."));
    }

    #[test]
    fn failed_init_releases_the_logging_session() {
        let _guard = logging::test_guard();
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("aknet_settings.json"), "{ not json").unwrap();

        let result = Core::init(config(temp.path()));
        assert!(result.is_err());
        assert!(!logging::is_initialized());

        let logged: String = std::fs::read_dir(temp.path())
            .unwrap()
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| logging::is_session_log(path))
            .map(|path| std::fs::read_to_string(path).unwrap())
            .collect();
        assert!(logged.contains("Initializing core module - failed"));
    }
}
