//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Config file: `--config <path>` if given, else `$XDG_CONFIG_HOME/domtree/domtree.toml`
//! 3. Environment variables: `DOMTREE_*` prefix, `__` between section and key

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::session::DEFAULT_AUTH_SOURCE;
use crate::application::{ApplicationError, ReportFormat};
use crate::domain::DEFAULT_MARKER;

/// Tree rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenderConfig {
    /// Indentation marker repeated once per depth level
    pub marker: char,
    /// Colorize CLI output
    pub color: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER,
            color: true,
        }
    }
}

/// Report export settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReportSettings {
    /// Directory for reports written without an explicit output path
    pub output_dir: PathBuf,
    pub format: ReportFormat,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            format: ReportFormat::Markdown,
        }
    }
}

/// Session factory settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionSettings {
    /// MongoDB authSource used when a session config gives none
    pub default_auth_source: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            default_auth_source: DEFAULT_AUTH_SOURCE.to_string(),
        }
    }
}

/// Unified configuration for domtree.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub render: RenderConfig,
    pub report: ReportSettings,
    pub session: SessionSettings,
}

/// Raw settings for intermediate parsing (`None` means "not specified, inherit").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RawSettings {
    pub render: RawRenderConfig,
    pub report: RawReportSettings,
    pub session: RawSessionSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RawRenderConfig {
    pub marker: Option<char>,
    pub color: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RawReportSettings {
    pub output_dir: Option<PathBuf>,
    pub format: Option<ReportFormat>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RawSessionSettings {
    pub default_auth_source: Option<String>,
}

/// Get the XDG config directory for domtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "domtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("domtree.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

/// Expand `~`, `$VAR` and `${VAR}`; unresolvable input is returned unchanged.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

fn parse_marker(value: &str) -> Result<char, ApplicationError> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(marker), None) => Ok(marker),
        _ => Err(ApplicationError::Config {
            message: format!("render.marker must be a single character, got '{}'", value),
        }),
    }
}

impl Settings {
    /// Overlay a file layer: scalars in `raw` win when present.
    fn merge_with(&self, raw: &RawSettings) -> Self {
        Self {
            render: RenderConfig {
                marker: raw.render.marker.unwrap_or(self.render.marker),
                color: raw.render.color.unwrap_or(self.render.color),
            },
            report: ReportSettings {
                output_dir: raw
                    .report
                    .output_dir
                    .clone()
                    .unwrap_or_else(|| self.report.output_dir.clone()),
                format: raw.report.format.unwrap_or(self.report.format),
            },
            session: SessionSettings {
                default_auth_source: raw
                    .session
                    .default_auth_source
                    .clone()
                    .unwrap_or_else(|| self.session.default_auth_source.clone()),
            },
        }
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.report.output_dir.to_string_lossy().as_ref());
        self.report.output_dir = PathBuf::from(expanded);
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_path` - Explicit config file; replaces the global file when given
    ///   and must exist.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Explicit or global config file
        match config_path {
            Some(path) => {
                let raw = load_raw_settings(path)?;
                current = current.merge_with(&raw);
            }
            None => {
                if let Some(global_path) = global_config_path() {
                    if global_path.exists() {
                        debug!("loading global config {}", global_path.display());
                        let raw = load_raw_settings(&global_path)?;
                        current = current.merge_with(&raw);
                    }
                }
            }
        }

        // 3. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();
        Ok(current)
    }

    /// Apply DOMTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("DOMTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("render.marker") {
            settings.render.marker = parse_marker(&val)?;
        }
        if let Ok(val) = config.get_bool("render.color") {
            settings.render.color = val;
        }
        if let Ok(val) = config.get_string("report.output_dir") {
            settings.report.output_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get::<ReportFormat>("report.format") {
            settings.report.format = val;
        }
        if let Ok(val) = config.get_string("session.default_auth_source") {
            settings.session.default_auth_source = val;
        }

        Ok(settings)
    }

    /// Render settings as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.render.marker, '-');
        assert!(settings.render.color);
        assert_eq!(settings.report.format, ReportFormat::Markdown);
        assert_eq!(settings.session.default_auth_source, "admin");
    }

    #[test]
    fn test_merge_keeps_unspecified() {
        let raw: RawSettings = toml::from_str("[render]\nmarker = \"*\"\n").unwrap();
        let merged = Settings::default().merge_with(&raw);
        assert_eq!(merged.render.marker, '*');
        assert!(merged.render.color);
        assert_eq!(merged.report.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_parse_marker() {
        assert_eq!(parse_marker("+").unwrap(), '+');
        assert!(parse_marker("--").is_err());
        assert!(parse_marker("").is_err());
    }

    #[test]
    fn test_to_toml_round_trips_marker() {
        let text = Settings::default().to_toml().unwrap();
        assert!(text.contains("marker = \"-\""));
    }
}
