use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logging::LogLevel;

pub const DEFAULT_FILE_NAME: &str = "aknet_settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub schema_version: u32,
    pub general: GeneralSettings,
    pub audio: AudioSettings,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub sampling_rate: u32,
    pub buffer_size: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            schema_version: 1,
            general: GeneralSettings::default(),
            audio: AudioSettings::default(),
        }
    }
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            sampling_rate: 48_000,
            buffer_size: 256,
        }
    }
}

/// Where the settings file lives.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    pub base_dir: PathBuf,
    pub file_name: String,
    pub schema_version: u32,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::new(),
            file_name: DEFAULT_FILE_NAME.to_string(),
            schema_version: 1,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("a base directory must be provided for the settings file")]
    MissingBaseDir,

    #[error("cannot read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug)]
pub struct Settings {
    config: SettingsConfig,
    closed: bool,
}

impl Settings {
    pub fn open(mut config: SettingsConfig) -> Result<Self, SettingsError> {
        if config.base_dir.as_os_str().is_empty() {
            return Err(SettingsError::MissingBaseDir);
        }

        if config.file_name.is_empty() {
            config.file_name = DEFAULT_FILE_NAME.to_string();
        }

        tracing::debug!(target: "settings", path = %config.base_dir.join(&config.file_name).display(), "settings opened");
        Ok(Self {
            config,
            closed: false,
        })
    }

    pub fn path(&self) -> PathBuf {
        self.config.base_dir.join(&self.config.file_name)
    }

    /// Active settings: the file on disk if present, compiled defaults otherwise.
    /// After `shutdown` only the compiled defaults are returned.
    pub fn snapshot(&self) -> Result<Arc<AppSettings>, SettingsError> {
        let path = self.path();
        if self.closed || !path.is_file() {
            return Ok(Arc::new(AppSettings {
                schema_version: self.config.schema_version,
                ..AppSettings::default()
            }));
        }

        let raw = fs::read_to_string(&path).map_err(|source| SettingsError::Io {
            path: path.clone(),
            source,
        })?;
        let settings: AppSettings =
            serde_json::from_str(&raw).map_err(|source| SettingsError::Parse { path, source })?;

        if settings.schema_version != self.config.schema_version {
            tracing::warn!(
                target: "settings",
                found = settings.schema_version,
                expected = self.config.schema_version,
                "settings schema version differs"
            );
        }

        Ok(Arc::new(settings))
    }

    pub fn shutdown(&mut self) {
        self.config = SettingsConfig::default();
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_dir: PathBuf, file_name: &str) -> SettingsConfig {
        SettingsConfig {
            base_dir,
            file_name: file_name.to_string(),
            schema_version: 1,
        }
    }

    #[test]
    fn missing_base_dir_is_rejected() {
        let err = Settings::open(config(PathBuf::new(), "test")).unwrap_err();
        assert!(matches!(err, SettingsError::MissingBaseDir));
    }

    #[test]
    fn empty_file_name_uses_default() {
        let temp = tempfile::tempdir().unwrap();
        let settings = Settings::open(config(temp.path().to_path_buf(), "")).unwrap();
        assert_eq!(settings.path(), temp.path().join("aknet_settings.json"));
    }

    #[test]
    fn unspecified_file_name_uses_default() {
        let temp = tempfile::tempdir().unwrap();
        let settings = Settings::open(SettingsConfig {
            base_dir: temp.path().to_path_buf(),
            ..SettingsConfig::default()
        })
        .unwrap();
        assert_eq!(settings.path(), temp.path().join("aknet_settings.json"));
    }

    #[test]
    fn default_snapshot_values() {
        let temp = tempfile::tempdir().unwrap();
        let settings = Settings::open(config(temp.path().to_path_buf(), "aknet_test_settings")).unwrap();

        let snapshot = settings.snapshot().unwrap();
        assert_eq!(snapshot.schema_version, 1);
        assert_eq!(snapshot.general.log_level, LogLevel::Info);
        assert_eq!(snapshot.audio.sampling_rate, 48_000);
        assert_eq!(snapshot.audio.buffer_size, 256);
    }

    #[test]
    fn file_on_disk_overrides_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let settings = Settings::open(config(temp.path().to_path_buf(), "")).unwrap();
        fs::write(
            settings.path(),
            r#"{ "general": { "log_level": "debug" }, "audio": { "buffer_size": 512 } }"#,
        )
        .unwrap();

        let snapshot = settings.snapshot().unwrap();
        assert_eq!(snapshot.general.log_level, LogLevel::Debug);
        assert_eq!(snapshot.audio.buffer_size, 512);
        assert_eq!(snapshot.audio.sampling_rate, 48_000);
        assert_eq!(snapshot.schema_version, 1);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let settings = Settings::open(config(temp.path().to_path_buf(), "")).unwrap();
        fs::write(settings.path(), "{ not json").unwrap();

        assert!(matches!(settings.snapshot(), Err(SettingsError::Parse { .. })));
    }

    #[test]
    fn shutdown_resets_config() {
        let temp = tempfile::tempdir().unwrap();
        let mut settings = Settings::open(config(temp.path().to_path_buf(), "custom.json")).unwrap();
        settings.shutdown();
        assert_eq!(settings.path(), PathBuf::from(DEFAULT_FILE_NAME));
    }

    #[test]
    fn snapshot_after_shutdown_is_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let mut settings = Settings::open(config(temp.path().to_path_buf(), "")).unwrap();
        fs::write(settings.path(), r#"{ "audio": { "buffer_size": 512 } }"#).unwrap();
        assert_eq!(settings.snapshot().unwrap().audio.buffer_size, 512);

        settings.shutdown();
        let snapshot = settings.snapshot().unwrap();
        assert_eq!(*snapshot, AppSettings::default());
    }
}
