use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use tracing::warn;

use crate::{
    domain::{LoaderTiming, TriggerTexts, DOWNLOAD_TEXT, NAVIGATION_TEXT, SUBMIT_TEXT},
    error::SettingsError,
    markers::MountConfig,
};

pub const SETTINGS_FILE: &str = "loader.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoaderSettings {
    pub show_delay_ms: u64,
    pub min_visible_ms: u64,
    pub skip_unload_window_ms: u64,
    pub navigation_text: String,
    pub submit_text: String,
    pub download_text: String,
    pub default_animation: Option<String>,
    pub success_animation: Option<String>,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        let timing = LoaderTiming::default();
        Self {
            show_delay_ms: timing.show_delay.as_millis() as u64,
            min_visible_ms: timing.min_visible.as_millis() as u64,
            skip_unload_window_ms: timing.skip_unload_window.as_millis() as u64,
            navigation_text: NAVIGATION_TEXT.into(),
            submit_text: SUBMIT_TEXT.into(),
            download_text: DOWNLOAD_TEXT.into(),
            default_animation: None,
            success_animation: None,
        }
    }
}

impl LoaderSettings {
    pub fn from_toml_str(raw: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let raw = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn timing(&self) -> LoaderTiming {
        LoaderTiming {
            show_delay: Duration::from_millis(self.show_delay_ms),
            min_visible: Duration::from_millis(self.min_visible_ms),
            skip_unload_window: Duration::from_millis(self.skip_unload_window_ms),
        }
    }

    pub fn texts(&self) -> TriggerTexts {
        TriggerTexts {
            navigation: self.navigation_text.clone(),
            submit: self.submit_text.clone(),
            download: self.download_text.clone(),
        }
    }

    pub fn mount(&self) -> MountConfig {
        MountConfig {
            default_animation: self.default_animation.clone(),
            success_animation: self.success_animation.clone(),
        }
    }

    /// Applies `APP__LOADER_*` overrides from `lookup`. Values that do not
    /// parse leave the current setting untouched.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        override_millis(&mut self.show_delay_ms, lookup("APP__LOADER_SHOW_DELAY_MS"));
        override_millis(&mut self.min_visible_ms, lookup("APP__LOADER_MIN_VISIBLE_MS"));
        override_millis(
            &mut self.skip_unload_window_ms,
            lookup("APP__LOADER_SKIP_UNLOAD_WINDOW_MS"),
        );

        if let Some(v) = lookup("APP__LOADER_NAVIGATION_TEXT") {
            self.navigation_text = v;
        }
        if let Some(v) = lookup("APP__LOADER_SUBMIT_TEXT") {
            self.submit_text = v;
        }
        if let Some(v) = lookup("APP__LOADER_DOWNLOAD_TEXT") {
            self.download_text = v;
        }
        if let Some(v) = lookup("APP__LOADER_ANIMATION") {
            self.default_animation = Some(v).filter(|path| !path.is_empty());
        }
        if let Some(v) = lookup("APP__LOADER_SUCCESS_ANIMATION") {
            self.success_animation = Some(v).filter(|path| !path.is_empty());
        }
    }
}

fn override_millis(slot: &mut u64, raw: Option<String>) {
    let Some(raw) = raw else {
        return;
    };
    match raw.trim().parse::<u64>() {
        Ok(parsed) => *slot = parsed,
        Err(error) => warn!(value = %raw, %error, "ignoring unparsable loader timing override"),
    }
}

/// Loads settings from `path` (or `loader.toml` in the working directory)
/// and then the process environment. A missing or malformed file falls back
/// to defaults.
pub fn load_settings(path: Option<PathBuf>) -> LoaderSettings {
    let path = path.unwrap_or_else(|| PathBuf::from(SETTINGS_FILE));

    let mut settings = if path.exists() {
        LoaderSettings::from_file(&path).unwrap_or_else(|error| {
            warn!(path = %path.display(), %error, "falling back to default loader settings");
            LoaderSettings::default()
        })
    } else {
        LoaderSettings::default()
    };

    settings.apply_overrides(|key| std::env::var(key).ok());
    settings
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
