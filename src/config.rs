use crate::error::TocError;
use serde::{Deserialize, Serialize};
use std::{
    fs::{read_to_string, write},
    path::{Path, PathBuf},
};

/// CSS selectors locating the page elements the outline cooperates with.
///
/// Every element is optional on the page; a selector that matches nothing disables only the
/// feature that needs it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    /// Container holding the article body and its `h1`..`h6` headings.
    pub content: String,
    pub sidebar: String,
    /// Outline list inside the sidebar (and inside the mobile drawer).
    pub list: String,
    pub drawer: String,
    pub toggle: String,
    pub overlay: String,
    pub close: String,
    pub progress: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Selectors {
            content: ".post-content".to_string(),
            sidebar: ".toc-sidebar".to_string(),
            list: ".toc-list".to_string(),
            drawer: ".mobile-toc-drawer".to_string(),
            toggle: ".mobile-toc-toggle".to_string(),
            overlay: ".mobile-toc-overlay".to_string(),
            close: ".mobile-toc-close".to_string(),
            progress: ".reading-progress-fill".to_string(),
        }
    }
}

impl Selectors {
    /// Class name of the content container, without the leading `.`.
    ///
    /// Returns `None` when the content selector isn't a plain class selector.
    pub fn content_class(&self) -> Option<&str> {
        let class = self.content.strip_prefix('.')?;
        let plain = !class.is_empty()
            && class
                .chars()
                .all(|c| c.is_alphanumeric() || c == '-' || c == '_');
        plain.then_some(class)
    }

    /// Selector list matching every heading inside the content container.
    pub fn headings(&self) -> String {
        (1..=6)
            .map(|level| format!("{} h{level}", self.content))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Layout constants for the outline and the scroll-driven page widgets.
///
/// Distances are CSS pixels, durations are milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineConfig {
    /// Height reserved for the fixed site header when scrolling to a heading.
    pub header_offset: f64,
    /// A heading counts as passed once the scroll offset is within this distance above it.
    pub active_lookback: f64,
    /// How long scroll-driven tracking stays suspended after a programmatic scroll.
    pub settle_duration_ms: f64,
    pub resize_debounce_ms: f64,
    pub back_to_top_threshold: f64,
    /// Reading starts when the article top is this fraction of the viewport below the top edge.
    pub progress_start_ratio: f64,
    /// Reading ends when the article bottom is this fraction of the viewport below the top edge.
    pub progress_end_ratio: f64,
    pub selectors: Selectors,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        OutlineConfig {
            header_offset: 100.0,
            active_lookback: 150.0,
            settle_duration_ms: 1000.0,
            resize_debounce_ms: 250.0,
            back_to_top_threshold: 300.0,
            progress_start_ratio: 0.3,
            progress_end_ratio: 0.7,
            selectors: Selectors::default(),
        }
    }
}

impl OutlineConfig {
    pub fn validate(&self) -> Result<(), TocError> {
        let distances = [
            ("header_offset", self.header_offset),
            ("active_lookback", self.active_lookback),
            ("settle_duration_ms", self.settle_duration_ms),
            ("resize_debounce_ms", self.resize_debounce_ms),
            ("back_to_top_threshold", self.back_to_top_threshold),
        ];
        for (name, value) in distances {
            if !value.is_finite() || value < 0.0 {
                return Err(TocError::Config(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        let ratios = [
            ("progress_start_ratio", self.progress_start_ratio),
            ("progress_end_ratio", self.progress_end_ratio),
        ];
        for (name, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(TocError::Config(format!(
                    "{name} must be within 0.0..=1.0, got {value}"
                )));
            }
        }
        if self.selectors.content.trim().is_empty() {
            return Err(TocError::Config(
                "selectors.content must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl std::str::FromStr for OutlineConfig {
    type Err = TocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: OutlineConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

pub trait ConfigProvider {
    fn load(&self) -> Result<OutlineConfig, TocError>;
    fn store(&self, config: &OutlineConfig) -> Result<(), TocError>;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TomlConfigProvider {
    path: PathBuf,
}

impl TomlConfigProvider {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        TomlConfigProvider {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ConfigProvider for TomlConfigProvider {
    fn load(&self) -> Result<OutlineConfig, TocError> {
        tracing::debug!("Attempting to read outline config from: {:?}", &self.path);
        if !self.path.exists() {
            tracing::debug!("Config file not found, using default outline config.");
            return Ok(OutlineConfig::default());
        }
        read_to_string(&self.path)?.parse()
    }

    fn store(&self, config: &OutlineConfig) -> Result<(), TocError> {
        tracing::debug!("Attempting to write outline config to: {:?}", &self.path);
        config.validate()?;
        let toml_string = toml::to_string(config)?;
        write(&self.path, toml_string)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: OutlineConfig = "header_offset = 64.0\n[selectors]\nlist = \".outline\"\n"
            .parse()
            .unwrap();
        assert_eq!(config.header_offset, 64.0);
        assert_eq!(config.active_lookback, 150.0);
        assert_eq!(config.selectors.list, ".outline");
        assert_eq!(config.selectors.content, ".post-content");
    }

    #[test]
    fn rejects_negative_distances() {
        let err = "settle_duration_ms = -1.0".parse::<OutlineConfig>().unwrap_err();
        assert!(matches!(err, TocError::Config(_)));
    }

    #[test]
    fn heading_selector_covers_all_levels() {
        let selectors = Selectors::default();
        assert_eq!(
            selectors.headings(),
            ".post-content h1, .post-content h2, .post-content h3, \
             .post-content h4, .post-content h5, .post-content h6"
        );
        assert_eq!(selectors.content_class(), Some("post-content"));
    }

    #[test]
    fn content_class_requires_plain_class_selector() {
        let selectors = Selectors {
            content: "article > .body".to_string(),
            ..Default::default()
        };
        assert_eq!(selectors.content_class(), None);
    }
}
