/*
 * This file is part of Fanlord.
 *
 * Copyright (C) 2025 Fanlord contributors
 *
 * Fanlord is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Fanlord is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Fanlord. If not, see <https://www.gnu.org/licenses/>.
 */

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FanError, Result};
use crate::i18n::Language;

pub const TOOL_ENV: &str = "FANLORD_TOOL";

#[cfg(windows)]
pub const DEFAULT_TOOL_NAME: &str = "IPMICFG-Win.exe";
#[cfg(not(windows))]
pub const DEFAULT_TOOL_NAME: &str = "IPMICFG-Linux.x86_64";

pub const DEFAULT_SLIDER_STEP: u8 = 5;
const MAX_SLIDER_STEP: u8 = 25;

fn default_slider_step() -> u8 { DEFAULT_SLIDER_STEP }

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SavedConfig {
    /// Path to the vendor IPMI tool
    #[serde(default)]
    pub tool_path: Option<PathBuf>,
    #[serde(default)]
    pub language: Option<Language>,
    /// Keyboard step for the duty sliders
    #[serde(default = "default_slider_step")]
    pub slider_step: u8,
}

impl Default for SavedConfig {
    fn default() -> Self {
        Self {
            tool_path: None,
            language: None,
            slider_step: DEFAULT_SLIDER_STEP,
        }
    }
}

pub fn config_path() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        return Path::new(&xdg).join("fanlord").join("config.json");
    }
    if let Ok(home) = env::var("HOME") {
        return Path::new(&home)
            .join(".config")
            .join("fanlord")
            .join("config.json");
    }
    PathBuf::from("/etc/fanlord/config.json")
}

pub fn validate_config(cfg: &SavedConfig) -> Result<()> {
    if cfg.slider_step == 0 || cfg.slider_step > MAX_SLIDER_STEP {
        return Err(FanError::Config(format!(
            "slider_step must be 1..={} (got {})",
            MAX_SLIDER_STEP, cfg.slider_step
        )));
    }
    if let Some(p) = &cfg.tool_path {
        if p.as_os_str().is_empty() {
            return Err(FanError::Config("tool_path must not be empty".to_string()));
        }
    }
    Ok(())
}

pub fn try_load_config_from(path: &Path) -> Result<SavedConfig> {
    let data = fs::read_to_string(path)?;
    let cfg: SavedConfig = serde_json::from_str(&data)?;
    validate_config(&cfg)?;
    Ok(cfg)
}

/// Missing or invalid config falls back to defaults.
pub fn load_saved_config() -> Option<SavedConfig> {
    try_load_config_from(&config_path()).ok()
}

pub fn save_config_to(path: &Path, cfg: &SavedConfig) -> Result<()> {
    validate_config(cfg)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(cfg)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn save_config(cfg: &SavedConfig) -> Result<PathBuf> {
    let path = config_path();
    save_config_to(&path, cfg)?;
    Ok(path)
}

/// Platform tool name next to the running executable.
pub fn default_tool_path() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_TOOL_NAME)))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TOOL_NAME))
}

/// `--tool`, then `FANLORD_TOOL`, then config, then the default location.
pub fn resolve_tool_path(cli: Option<&Path>, cfg: &SavedConfig) -> PathBuf {
    if let Some(p) = cli {
        return p.to_path_buf();
    }
    if let Ok(p) = env::var(TOOL_ENV) {
        if !p.trim().is_empty() {
            return PathBuf::from(p);
        }
    }
    if let Some(p) = &cfg.tool_path {
        return p.clone();
    }
    default_tool_path()
}

/// `--lang`, then config, then system locale.
pub fn resolve_language(cli: Option<Language>, cfg: &SavedConfig) -> Language {
    cli.or(cfg.language).unwrap_or_else(Language::detect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = SavedConfig::default();
        assert_eq!(cfg.slider_step, 5);
        assert!(validate_config(&cfg).is_ok());
    }

    #[test]
    fn test_validate_slider_step_bounds() {
        let mut cfg = SavedConfig::default();
        cfg.slider_step = 0;
        assert!(matches!(validate_config(&cfg), Err(FanError::Config(_))));
        cfg.slider_step = 26;
        assert!(validate_config(&cfg).is_err());
        cfg.slider_step = 25;
        assert!(validate_config(&cfg).is_ok());
    }

    #[test]
    fn test_validate_empty_tool_path() {
        let cfg = SavedConfig { tool_path: Some(PathBuf::new()), ..SavedConfig::default() };
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn test_load_partial_config_fills_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "language": "japanese" }}"#).unwrap();
        let cfg = try_load_config_from(file.path()).unwrap();
        assert_eq!(cfg.language, Some(Language::Japanese));
        assert_eq!(cfg.slider_step, DEFAULT_SLIDER_STEP);
        assert!(cfg.tool_path.is_none());
    }

    #[test]
    fn test_load_rejects_unknown_fields() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "tool": "/opt/ipmicfg" }}"#).unwrap();
        assert!(matches!(try_load_config_from(file.path()), Err(FanError::Json(_))));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(try_load_config_from(&dir.path().join("nope.json")), Err(FanError::Io(_))));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fanlord").join("config.json");
        let cfg = SavedConfig {
            tool_path: Some(PathBuf::from("/opt/supermicro/IPMICFG-Linux.x86_64")),
            language: Some(Language::Chinese),
            slider_step: 10,
        };
        save_config_to(&path, &cfg).unwrap();
        assert_eq!(try_load_config_from(&path).unwrap(), cfg);
    }

    #[test]
    fn test_save_refuses_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = SavedConfig { slider_step: 0, ..SavedConfig::default() };
        assert!(save_config_to(&dir.path().join("c.json"), &cfg).is_err());
        assert!(!dir.path().join("c.json").exists());
    }

    #[test]
    #[serial]
    fn test_config_path_with_xdg() {
        env::set_var("XDG_CONFIG_HOME", "/custom/config");
        let path = config_path();
        assert_eq!(path, PathBuf::from("/custom/config/fanlord/config.json"));
        env::remove_var("XDG_CONFIG_HOME");
    }

    #[test]
    #[serial]
    fn test_resolve_tool_path_precedence() {
        let cfg = SavedConfig { tool_path: Some(PathBuf::from("/from/config")), ..SavedConfig::default() };

        env::set_var(TOOL_ENV, "/from/env");
        assert_eq!(resolve_tool_path(Some(Path::new("/from/cli")), &cfg), PathBuf::from("/from/cli"));
        assert_eq!(resolve_tool_path(None, &cfg), PathBuf::from("/from/env"));

        env::remove_var(TOOL_ENV);
        assert_eq!(resolve_tool_path(None, &cfg), PathBuf::from("/from/config"));

        let fallback = resolve_tool_path(None, &SavedConfig::default());
        assert!(fallback.ends_with(DEFAULT_TOOL_NAME));
    }

    #[test]
    #[serial]
    fn test_resolve_language_precedence() {
        let cfg = SavedConfig { language: Some(Language::Chinese), ..SavedConfig::default() };
        assert_eq!(resolve_language(Some(Language::Japanese), &cfg), Language::Japanese);
        assert_eq!(resolve_language(None, &cfg), Language::Chinese);

        env::remove_var("LC_ALL");
        env::remove_var("LC_MESSAGES");
        env::set_var("LANG", "ja_JP.UTF-8");
        assert_eq!(resolve_language(None, &SavedConfig::default()), Language::Japanese);
        env::remove_var("LANG");
    }
}
