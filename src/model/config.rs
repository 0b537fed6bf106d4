use anyhow::{Result, anyhow, bail};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_core::CoreConfig;
use crate::logging::{LogLevel, LogOptions};
use crate::settings::SettingsConfig;

const DEFAULTS: &str = include_str!("../../config/default.toml");

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub settings: SettingsConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub dir: PathBuf,
    pub level: LogLevel,
    pub console: bool,
}

#[derive(Debug, Deserialize)]
pub struct UiConfig {
    pub tick_ms: u64,
}

impl AppConfig {
    /// Load configuration with layering: defaults → user config.
    pub fn load() -> Result<Self> {
        let mut config = Self::parse(DEFAULTS)?;

        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "aknet") {
            let config_path = proj_dirs.config_dir().join("config.toml");
            if config_path.exists() {
                let user_str = fs::read_to_string(&config_path)?;
                config = Self::parse(&user_str)?;
            }
        }

        config.logging.dir = expand_tilde(&config.logging.dir)?;
        config.settings.base_dir = expand_tilde(&config.settings.base_dir)?;

        Ok(config)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(raw)?;
        if config.ui.tick_ms == 0 {
            bail!("ui.tick_ms must be at least 1");
        }
        Ok(config)
    }

    pub fn core_config(&self) -> CoreConfig {
        CoreConfig {
            log: LogOptions {
                dir: self.logging.dir.clone(),
                level: self.logging.level,
                console: self.logging.console,
            },
            settings: self.settings.clone(),
        }
    }
}

fn expand_tilde(path: &Path) -> Result<PathBuf> {
    let text = path.to_string_lossy();
    if !text.starts_with('~') {
        return Ok(path.to_path_buf());
    }

    let home = dirs_home().ok_or_else(|| anyhow!("cannot determine home directory"))?;
    Ok(PathBuf::from(text.replacen('~', &home.to_string_lossy(), 1)))
}

fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_defaults_parse() {
        let config = AppConfig::parse(DEFAULTS).unwrap();
        assert_eq!(config.logging.level, LogLevel::Info);
        assert!(!config.logging.console);
        assert!(config.logging.dir.as_os_str().is_empty());
        assert_eq!(config.settings.file_name, "aknet_settings.json");
        assert_eq!(config.settings.schema_version, 1);
        assert_eq!(config.ui.tick_ms, 50);
    }

    #[test]
    fn missing_settings_fields_take_defaults() {
        let config = AppConfig::parse(
            r#"
            [logging]
            dir = "/var/log/aknet"
            level = "trace"
            console = true

            [settings]
            base_dir = "/etc/aknet"

            [ui]
            tick_ms = 100
            "#,
        )
        .unwrap();

        assert_eq!(config.settings.base_dir, PathBuf::from("/etc/aknet"));
        assert_eq!(config.settings.file_name, "aknet_settings.json");

        let core = config.core_config();
        assert_eq!(core.log.dir, PathBuf::from("/var/log/aknet"));
        assert_eq!(core.log.level, LogLevel::Trace);
        assert!(core.log.console);
    }

    #[test]
    fn unknown_level_is_rejected() {
        let raw = DEFAULTS.replace("level = \"info\"", "level = \"loud\"");
        assert!(AppConfig::parse(&raw).is_err());
    }

    #[test]
    fn zero_tick_is_rejected() {
        let raw = DEFAULTS.replace("tick_ms = 50", "tick_ms = 0");
        let err = AppConfig::parse(&raw).unwrap_err();
        assert!(err.to_string().contains("tick_ms"));
    }

    #[test]
    fn tilde_expands_to_home() {
        let expanded = expand_tilde(Path::new("~/logs")).unwrap();
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.ends_with("logs"));

        let plain = expand_tilde(Path::new("/tmp/logs")).unwrap();
        assert_eq!(plain, PathBuf::from("/tmp/logs"));
    }
}
