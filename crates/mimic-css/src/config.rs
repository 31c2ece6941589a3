//! Engine configuration.
//!
//! Everything an embedder picks before styling a document: the browser
//! personality and its feature overrides, the window geometry, and the
//! URL fragment for `:target`. Usually read from JSON.

use serde::{Deserialize, Serialize};

use crate::browser::BrowserVersion;
use crate::error::ConfigError;
use crate::media::DEFAULT_MEDIA_CACHE_CAPACITY;
use crate::oracle::Screen;

fn default_browser() -> String {
    "chrome".to_string()
}

const fn default_media_cache_capacity() -> usize {
    DEFAULT_MEDIA_CACHE_CAPACITY
}

/// Settings for a [`crate::StyleEngine`].
///
/// ```json
/// {
///   "browser": "firefox",
///   "enable-features": ["missing-image-zero-size"],
///   "screen": { "inner-width": 800, "inner-height": 600 },
///   "target": "section-2"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EngineConfig {
    /// Personality name (`chrome`, `edge`, `firefox`, `internet-explorer`).
    #[serde(default = "default_browser")]
    pub browser: String,
    /// Feature flags switched on in addition to the personality's own.
    pub enable_features: Vec<String>,
    /// Feature flags switched off.
    pub disable_features: Vec<String>,
    /// Window geometry.
    pub screen: Screen,
    /// Fragment of the document URL.
    pub target: Option<String>,
    /// Upper bound on cached media lists.
    #[serde(default = "default_media_cache_capacity")]
    pub media_cache_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            browser: default_browser(),
            enable_features: Vec::new(),
            disable_features: Vec::new(),
            screen: Screen::default(),
            target: None,
            media_cache_capacity: DEFAULT_MEDIA_CACHE_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration; missing fields take their defaults.
    ///
    /// # Errors
    /// [`ConfigError::Json`] for malformed input.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// The personality with the configured overrides applied. Disabling
    /// happens after enabling.
    ///
    /// # Errors
    /// [`ConfigError::UnknownBrowser`] or [`ConfigError::UnknownFeature`].
    pub fn browser_version(&self) -> Result<BrowserVersion, ConfigError> {
        let mut browser = BrowserVersion::from_name(&self.browser)?;
        for name in &self.enable_features {
            browser.set_feature_by_name(name, true)?;
        }
        for name in &self.disable_features {
            browser.set_feature_by_name(name, false)?;
        }
        Ok(browser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{Feature, FeatureOracle};

    #[test]
    fn test_empty_object_is_default() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.browser_version().unwrap().name(), "chrome");
    }

    #[test]
    fn test_feature_overrides() {
        let config = EngineConfig::from_json(
            r#"{
                "browser": "firefox",
                "enable-features": ["missing-image-zero-size"],
                "disable-features": ["input-height-17"],
                "screen": { "inner-width": 800 }
            }"#,
        )
        .unwrap();
        let browser = config.browser_version().unwrap();
        assert!(browser.has_feature(Feature::MissingImageZeroSize));
        assert!(!browser.has_feature(Feature::InputHeight17));
        assert_eq!(config.screen.inner_width, 800);
        assert_eq!(config.screen.inner_height, 605);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            EngineConfig::from_json("{\"browser\": 3}"),
            Err(ConfigError::Json(_))
        ));

        let config = EngineConfig {
            browser: "netscape".to_string(),
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.browser_version(),
            Err(ConfigError::UnknownBrowser(_))
        ));

        let config = EngineConfig {
            enable_features: vec!["blink-tag".to_string()],
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.browser_version(),
            Err(ConfigError::UnknownFeature(_))
        ));
    }
}
