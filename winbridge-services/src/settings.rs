// SPDX-License-Identifier: MIT OR Apache-2.0
use anyhow::Result;
use serde::Deserialize;
use smol::fs;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use xdg::BaseDirectories;

/// Errors produced while reading a single settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Failed to read the settings file.
    #[error("Failed to read settings file {0}: {1}")]
    ReadError(PathBuf, std::io::Error),

    /// Failed to parse TOML settings.
    #[error("Failed to parse settings: {0}")]
    ParseError(String),
}

/// The main configuration structure for the bridge.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralSettings,
    /// Mouse and wheel settings (input config)
    #[serde(default)]
    pub mouse: MouseSettings,
    /// Application lifecycle settings
    #[serde(default)]
    pub application: ApplicationSettings,
    /// Frame pacing settings
    #[serde(default)]
    pub display: DisplaySettings,
    /// Any other sections are captured here
    #[serde(flatten)]
    pub other: HashMap<String, toml::Value>,
}

impl Config {
    /// Parse a configuration from TOML text.
    pub fn from_toml(content: &str) -> std::result::Result<Self, SettingsError> {
        toml::from_str(content).map_err(|e| SettingsError::ParseError(e.to_string()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneralSettings {
    /// Log at debug level when no explicit `log_level` is set.
    pub debug: Option<bool>,
    /// A log filter in `env_logger` syntax, e.g. `info` or `winbridge_core=trace`.
    pub log_level: Option<String>,
}

impl GeneralSettings {
    /// The log filter these settings ask for, if any.
    pub fn log_filter(&self) -> Option<&str> {
        match (self.log_level.as_deref(), self.debug) {
            (Some(level), _) if !level.trim().is_empty() => Some(level),
            (_, Some(true)) => Some("debug"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MouseSettings {
    pub natural_scrolling: Option<bool>,
    /// Maximum time between two presses that still counts as a double click.
    pub double_click_interval_ms: Option<u64>,
    /// Maximum per-axis travel between two presses that still counts as a double click.
    pub double_click_distance: Option<f64>,
    /// Lines scrolled per wheel notch.
    pub wheel_scroll_lines: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationSettings {
    pub quit_on_last_window_closed: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DisplaySettings {
    pub frame_timeout_ms: Option<u64>,
    pub fallback_refresh_rate: Option<f64>,
    pub idle_frames_before_pause: Option<u32>,
}

/// Registry for managing bridge settings.
pub struct SettingsRegistry {
    config: Config,
}

impl SettingsRegistry {
    /// Create a registry holding only built-in defaults, without touching the filesystem.
    pub fn empty() -> Self {
        Self {
            config: Config {
                general: GeneralSettings {
                    debug: Some(false),
                    log_level: None,
                },
                mouse: MouseSettings {
                    natural_scrolling: Some(false),
                    ..Default::default()
                },
                application: ApplicationSettings::default(),
                display: DisplaySettings::default(),
                other: HashMap::new(),
            },
        }
    }

    /// Create a new SettingsRegistry and load configuration from standard locations.
    pub async fn new() -> Result<Self> {
        let mut registry = Self::empty();
        registry.load().await?;
        Ok(registry)
    }

    /// Load configuration from standard locations in precedence order.
    ///
    /// Order (later overrides earlier):
    /// 1. System Data: /usr/share/winbridge-0/config.toml (and XDG_DATA_DIRS)
    /// 2. System Config: /etc/winbridge-0/config.toml (and XDG_CONFIG_DIRS)
    /// 3. User Config: ~/.config/winbridge-0/config.toml (XDG_CONFIG_HOME)
    pub async fn load(&mut self) -> Result<()> {
        let xdg_dirs = BaseDirectories::with_prefix("winbridge-0")?;

        self.load_config_type(&xdg_dirs, "config.toml").await;
        self.load_config_type(&xdg_dirs, "input.toml").await;

        Ok(())
    }

    async fn load_config_type(&mut self, xdg_dirs: &BaseDirectories, filename: &str) {
        for path in xdg_dirs.find_data_files(filename).rev() {
            self.load_file(&path).await;
        }

        for path in xdg_dirs.find_config_files(filename).rev() {
            self.load_file(&path).await;
        }

        if let Some(user_config_path) = xdg_dirs.find_config_file(filename) {
            self.load_file(&user_config_path).await;
        } else {
            let user_config_path = xdg_dirs.get_config_home().join(filename);
            if user_config_path.exists() {
                self.load_file(&user_config_path).await;
            }
        }
    }

    async fn load_file(&mut self, path: &Path) {
        log::info!("Loading config from: {:?}", path);
        match fs::read_to_string(path).await {
            Ok(content) => match Config::from_toml(&content) {
                Ok(loaded_config) => {
                    self.merge(loaded_config);
                },
                Err(e) => {
                    log::error!("Failed to parse config file {:?}: {}", path, e);
                },
            },
            Err(e) => {
                log::warn!("Failed to read config file {:?}: {}", path, e);
            },
        }
    }

    /// Merge a loaded config into the current config. Values present in `other` win.
    pub fn merge(&mut self, other: Config) {
        if let Some(debug) = other.general.debug {
            self.config.general.debug = Some(debug);
        }
        if other.general.log_level.is_some() {
            self.config.general.log_level = other.general.log_level;
        }

        let mouse = &mut self.config.mouse;
        if let Some(natural) = other.mouse.natural_scrolling {
            mouse.natural_scrolling = Some(natural);
        }
        if other.mouse.double_click_interval_ms.is_some() {
            mouse.double_click_interval_ms = other.mouse.double_click_interval_ms;
        }
        if other.mouse.double_click_distance.is_some() {
            mouse.double_click_distance = other.mouse.double_click_distance;
        }
        if other.mouse.wheel_scroll_lines.is_some() {
            mouse.wheel_scroll_lines = other.mouse.wheel_scroll_lines;
        }

        if other.application.quit_on_last_window_closed.is_some() {
            self.config.application.quit_on_last_window_closed =
                other.application.quit_on_last_window_closed;
        }

        let display = &mut self.config.display;
        if other.display.frame_timeout_ms.is_some() {
            display.frame_timeout_ms = other.display.frame_timeout_ms;
        }
        if other.display.fallback_refresh_rate.is_some() {
            display.fallback_refresh_rate = other.display.fallback_refresh_rate;
        }
        if other.display.idle_frames_before_pause.is_some() {
            display.idle_frames_before_pause = other.display.idle_frames_before_pause;
        }

        self.config.other.extend(other.other);
    }

    /// Get the current configuration.
    pub fn get(&self) -> &Config {
        &self.config
    }

    /// Load configuration from multiple custom paths asynchronously.
    pub async fn load_from_paths_async(&mut self, paths: Vec<PathBuf>) -> Vec<Result<()>> {
        let mut results = Vec::new();

        for path in paths {
            let result = async {
                let content = fs::read_to_string(&path)
                    .await
                    .map_err(|e| SettingsError::ReadError(path.clone(), e))?;
                let loaded_config = Config::from_toml(&content)?;

                self.merge(loaded_config);
                Ok::<(), anyhow::Error>(())
            }
            .await;

            results.push(result);
        }

        results
    }
}

impl Default for SettingsRegistry {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_boolean_override() {
        let mut registry = SettingsRegistry::empty();
        registry.config.application.quit_on_last_window_closed = Some(true);

        let new_config = Config::from_toml(
            r#"
            [mouse]
            natural_scrolling = true

            [application]
            quit_on_last_window_closed = false
            "#,
        )
        .unwrap();

        registry.merge(new_config);

        assert_eq!(registry.get().mouse.natural_scrolling, Some(true));
        assert_eq!(registry.get().application.quit_on_last_window_closed, Some(false));
    }

    #[test]
    fn test_merge_keeps_unset_values() {
        let mut registry = SettingsRegistry::empty();
        registry.merge(
            Config::from_toml("[mouse]\ndouble_click_interval_ms = 250\n").unwrap(),
        );
        registry.merge(Config::from_toml("[mouse]\ndouble_click_distance = 8.0\n").unwrap());

        let mouse = &registry.get().mouse;
        assert_eq!(mouse.double_click_interval_ms, Some(250));
        assert_eq!(mouse.double_click_distance, Some(8.0));
    }

    #[test]
    fn test_unknown_sections_are_captured() {
        let config = Config::from_toml("[plugins]\nenabled = true\n").unwrap();
        assert!(config.other.contains_key("plugins"));
    }

    #[test]
    fn test_log_filter() {
        let mut registry = SettingsRegistry::empty();
        assert_eq!(registry.get().general.log_filter(), None);

        registry.merge(Config::from_toml("[general]\ndebug = true\n").unwrap());
        assert_eq!(registry.get().general.log_filter(), Some("debug"));

        registry.merge(Config::from_toml("[general]\nlog_level = \"winbridge_core=trace\"\n").unwrap());
        assert_eq!(registry.get().general.log_filter(), Some("winbridge_core=trace"));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            Config::from_toml("[mouse\n"),
            Err(SettingsError::ParseError(_))
        ));
    }
}
