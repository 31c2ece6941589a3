//! Browser personalities
//!
//! A personality is a named bundle of feature flags plus a few numeric
//! constants. The engine never branches on the personality name; every
//! quirk is expressed as a [`Feature`] and consulted through
//! [`FeatureOracle`].

use std::collections::BTreeSet;
use std::str::FromStr;

use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::ConfigError;
use crate::selector::SelectorLevel;

/// A quirk or default that differs between personalities.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum Feature {
    /// Text inputs are 169px wide.
    #[strum(serialize = "input-text-width-169")]
    InputTextWidth169,
    /// Text inputs are 143px wide.
    #[strum(serialize = "input-text-width-143")]
    InputTextWidth143,
    /// Single-line inputs are 17px high instead of 21px.
    #[strum(serialize = "input-height-17")]
    InputHeight17,
    /// Checkboxes and radio buttons are 10px instead of 13px.
    LegacyCheckboxSize,
    /// An unset `background-color` computes to `transparent` rather than
    /// `rgba(0, 0, 0, 0)`.
    BackgroundTransparentKeyword,
    /// The default `font-family` is `"Times New Roman"` rather than `serif`.
    FontFamilyTimesNewRoman,
    /// Text width is estimated as half the font height per character
    /// instead of the fixed pixels-per-character constant.
    TextWidthFromFontHeight,
    /// Images without `width`/`height` attributes are 0x0 instead of 24x24.
    MissingImageZeroSize,
    /// Level 4 pseudo-classes (`:placeholder-shown`, `:focus-within`, ...)
    /// are accepted by selector validation.
    SelectorsLevel4,
    /// Only CSS 2 selectors are accepted by selector validation.
    LegacySelectorsOnly,
}

/// Boolean capability oracle consulted for personality-dependent behavior.
pub trait FeatureOracle {
    /// Whether the active personality has `feature`.
    fn has_feature(&self, feature: Feature) -> bool;
}

/// A named browser personality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserVersion {
    name: String,
    features: BTreeSet<Feature>,
    pixels_per_char: i32,
}

impl BrowserVersion {
    /// Create a personality from scratch.
    #[must_use]
    pub fn new(name: &str, features: &[Feature], pixels_per_char: i32) -> Self {
        Self {
            name: name.to_string(),
            features: features.iter().copied().collect(),
            pixels_per_char,
        }
    }

    /// A current Chromium-like personality.
    #[must_use]
    pub fn chrome() -> Self {
        Self::new(
            "chrome",
            &[
                Feature::InputTextWidth169,
                Feature::FontFamilyTimesNewRoman,
                Feature::SelectorsLevel4,
            ],
            10,
        )
    }

    /// A current Firefox-like personality.
    #[must_use]
    pub fn firefox() -> Self {
        Self::new(
            "firefox",
            &[
                Feature::InputHeight17,
                Feature::TextWidthFromFontHeight,
                Feature::SelectorsLevel4,
            ],
            10,
        )
    }

    /// A legacy Internet Explorer-like personality.
    #[must_use]
    pub fn internet_explorer() -> Self {
        Self::new(
            "internet-explorer",
            &[
                Feature::InputTextWidth143,
                Feature::LegacyCheckboxSize,
                Feature::BackgroundTransparentKeyword,
                Feature::FontFamilyTimesNewRoman,
                Feature::MissingImageZeroSize,
            ],
            10,
        )
    }

    /// Look up a built-in personality by name (`chrome`, `firefox`,
    /// `internet-explorer`/`ie`).
    ///
    /// # Errors
    /// [`ConfigError::UnknownBrowser`] for any other name.
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "chrome" | "edge" => Ok(Self::chrome()),
            "firefox" => Ok(Self::firefox()),
            "internet-explorer" | "ie" => Ok(Self::internet_explorer()),
            _ => Err(ConfigError::UnknownBrowser(name.to_string())),
        }
    }

    /// The personality's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fixed width of one character of text in pixels.
    #[must_use]
    pub const fn pixels_per_char(&self) -> i32 {
        self.pixels_per_char
    }

    /// Active features in a stable order.
    pub fn features(&self) -> impl Iterator<Item = Feature> + '_ {
        self.features.iter().copied()
    }

    /// Builder: turn a feature on.
    #[must_use]
    pub fn with_feature(mut self, feature: Feature) -> Self {
        let _ = self.features.insert(feature);
        self
    }

    /// Builder: turn a feature off.
    #[must_use]
    pub fn without_feature(mut self, feature: Feature) -> Self {
        let _ = self.features.remove(&feature);
        self
    }

    /// Builder: toggle a feature by its kebab-case name.
    ///
    /// # Errors
    /// [`ConfigError::UnknownFeature`] if no feature has that name.
    pub fn set_feature_by_name(&mut self, name: &str, enabled: bool) -> Result<(), ConfigError> {
        let feature =
            Feature::from_str(name).map_err(|_| ConfigError::UnknownFeature(name.to_string()))?;
        if enabled {
            let _ = self.features.insert(feature);
        } else {
            let _ = self.features.remove(&feature);
        }
        Ok(())
    }

    /// The newest selector level accepted by validation.
    #[must_use]
    pub fn selector_level(&self) -> SelectorLevel {
        if self.has_feature(Feature::LegacySelectorsOnly) {
            SelectorLevel::Css2
        } else if self.has_feature(Feature::SelectorsLevel4) {
            SelectorLevel::Css4
        } else {
            SelectorLevel::Css3
        }
    }
}

impl Default for BrowserVersion {
    fn default() -> Self {
        Self::chrome()
    }
}

impl FeatureOracle for BrowserVersion {
    fn has_feature(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }
}
