//! Element data-attribute contract shared by the page and the loader.
//!
//! Keys are stored in dataset form (`loaderType`), and may be given either way:
//! `data-loader-type` and `loaderType` address the same entry.

use std::collections::BTreeMap;

use crate::domain::IndicatorKind;

pub const ATTR_LOADER: &str = "loader";
pub const ATTR_LOADER_TYPE: &str = "loaderType";
pub const ATTR_LOADER_TEXT: &str = "loaderText";
pub const ATTR_DOWNLOAD: &str = "download";
pub const ATTR_ANIMATION: &str = "animation";
pub const ATTR_SUCCESS_ANIMATION: &str = "successAnimation";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementData {
    entries: BTreeMap<String, String>,
}

impl ElementData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut data = Self::new();
        for (key, value) in pairs {
            data.set(key.as_ref(), value);
        }
        data
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.entries.insert(dataset_key(key), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(&dataset_key(key)).map(String::as_str)
    }

    /// Like [`get`](Self::get) but treats an empty value as absent.
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|value| !value.is_empty())
    }

    pub fn marker(&self) -> LoaderMarker {
        self.get(ATTR_LOADER)
            .map(LoaderMarker::from_attr)
            .unwrap_or_default()
    }

    pub fn loader_kind(&self) -> Option<IndicatorKind> {
        self.non_empty(ATTR_LOADER_TYPE).map(IndicatorKind::from_attr)
    }

    pub fn loader_text(&self) -> Option<&str> {
        self.non_empty(ATTR_LOADER_TEXT)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `data-foo-bar` / `foo-bar` / `fooBar` → `fooBar`.
fn dataset_key(raw: &str) -> String {
    let raw = raw.strip_prefix("data-").unwrap_or(raw);
    let mut key = String::with_capacity(raw.len());
    let mut upper_next = false;
    for ch in raw.chars() {
        if ch == '-' {
            upper_next = true;
        } else if upper_next {
            key.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            key.push(ch);
        }
    }
    key
}

/// Value of the `data-loader` opt-out marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoaderMarker {
    #[default]
    Auto,
    Off,
    Ajax,
}

impl LoaderMarker {
    pub fn from_attr(value: &str) -> Self {
        match value.trim() {
            "off" => Self::Off,
            "ajax" => Self::Ajax,
            _ => Self::Auto,
        }
    }

    pub fn suppresses_trigger(self) -> bool {
        self != Self::Auto
    }
}

/// Configuration carried by the indicator's host element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountConfig {
    pub default_animation: Option<String>,
    pub success_animation: Option<String>,
}

impl MountConfig {
    pub fn from_element(data: &ElementData) -> Self {
        Self {
            default_animation: data.non_empty(ATTR_ANIMATION).map(str::to_owned),
            success_animation: data.non_empty(ATTR_SUCCESS_ANIMATION).map(str::to_owned),
        }
    }

    /// Animation asset for `kind`; `check` falls back to the default when no
    /// success animation is configured.
    pub fn animation_for(&self, kind: IndicatorKind) -> Option<&str> {
        match (kind, self.success_animation.as_deref()) {
            (IndicatorKind::Check, Some(success)) => Some(success),
            _ => self.default_animation.as_deref(),
        }
    }

    /// Only the success animation plays once; the default always loops.
    pub fn loops_for(&self, kind: IndicatorKind) -> bool {
        !(kind == IndicatorKind::Check && self.success_animation.is_some())
    }
}

/// An activated anchor, as seen by the delegated click listener.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkActivation {
    pub href: String,
    pub target: Option<String>,
    /// The anchor carries a `download` attribute.
    pub download_attr: bool,
    pub data: ElementData,
}

impl LinkActivation {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            ..Self::default()
        }
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn download(mut self) -> Self {
        self.download_attr = true;
        self
    }

    pub fn data(mut self, data: ElementData) -> Self {
        self.data = data;
        self
    }
}

/// A submitted form together with the control that submitted it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSubmission {
    pub form: ElementData,
    pub submitter: Option<ElementData>,
}

impl FormSubmission {
    pub fn new(form: ElementData) -> Self {
        Self {
            form,
            submitter: None,
        }
    }

    pub fn submitted_by(mut self, submitter: ElementData) -> Self {
        self.submitter = Some(submitter);
        self
    }
}

#[cfg(test)]
#[path = "tests/markers_tests.rs"]
mod tests;
