use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

pub const NAVIGATION_TEXT: &str = "Cargando...";
pub const SUBMIT_TEXT: &str = "Procesando...";
pub const DOWNLOAD_TEXT: &str = "Descargando...";

pub const SHOW_DELAY: Duration = Duration::from_millis(150);
pub const MIN_VISIBLE: Duration = Duration::from_millis(350);
pub const SKIP_UNLOAD_WINDOW: Duration = Duration::from_millis(1000);

/// Which animation the indicator plays while visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    #[default]
    Loading,
    Check,
}

impl IndicatorKind {
    /// Parses a `data-loader-type` value. Only `check` selects the success
    /// animation; every other value falls back to the looping one.
    pub fn from_attr(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("check") {
            Self::Check
        } else {
            Self::Loading
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Check => "check",
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to display the indicator.
///
/// `text: None` keeps whatever label is currently pending.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShowRequest {
    pub text: Option<String>,
    pub kind: IndicatorKind,
    pub immediate: bool,
}

impl ShowRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            kind: IndicatorKind::Loading,
            immediate: false,
        }
    }

    pub fn kind(mut self, kind: IndicatorKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn immediate(mut self) -> Self {
        self.immediate = true;
        self
    }
}

/// Debounce and minimum-duration windows used by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderTiming {
    pub show_delay: Duration,
    pub min_visible: Duration,
    pub skip_unload_window: Duration,
}

impl Default for LoaderTiming {
    fn default() -> Self {
        Self {
            show_delay: SHOW_DELAY,
            min_visible: MIN_VISIBLE,
            skip_unload_window: SKIP_UNLOAD_WINDOW,
        }
    }
}

/// Point-in-time view of the controller, for hosts and tests.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoaderSnapshot {
    pub active: bool,
    pub text: Option<String>,
    pub kind: IndicatorKind,
    pub show_pending: bool,
    pub hide_pending: bool,
    pub skip_next_unload: bool,
}

/// Labels used when the page triggers the indicator on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerTexts {
    pub navigation: String,
    pub submit: String,
    pub download: String,
}

impl Default for TriggerTexts {
    fn default() -> Self {
        Self {
            navigation: NAVIGATION_TEXT.into(),
            submit: SUBMIT_TEXT.into(),
            download: DOWNLOAD_TEXT.into(),
        }
    }
}
