//! [Media Queries Level 4](https://www.w3.org/TR/mediaqueries-4/)
//!
//! Media lists are kept as text in the stylesheet model and parsed on
//! demand through a [`MediaQueryCache`], since the same few lists are
//! evaluated over and over during a cascade.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use log::debug;
use mimic_common::warning::warn_once;

use crate::oracle::Viewport;
use crate::values::{DEFAULT_FONT_SIZE_PX, LengthContext, parse_length};

/// Default bound on cached media lists.
pub const DEFAULT_MEDIA_CACHE_CAPACITY: usize = 256;

/// A media feature test such as `(min-width: 600px)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFeature {
    /// Feature name, lower-cased, including any `min-`/`max-` prefix.
    pub name: String,
    /// The value after the colon, if any.
    pub value: Option<String>,
}

/// One query of a comma-separated media list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaQuery {
    /// Leading `not`.
    pub negated: bool,
    /// Media type, `all` when omitted.
    pub media_type: String,
    /// Feature tests joined by `and`.
    pub features: Vec<MediaFeature>,
}

/// [§ 2.1 Combining Media Queries](https://www.w3.org/TR/mediaqueries-4/#mq-list)
///
/// "A media query list is true if any of its component media queries are
/// true, and false only if all of its component media queries are false."
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaQueryList {
    /// Queries in source order; empty means the list applies to all media.
    pub queries: Vec<MediaQuery>,
}

/// Read a media list. Never fails: a malformed query simply never matches.
#[must_use]
pub fn parse_media_list(text: &str) -> MediaQueryList {
    MediaQueryList {
        queries: text
            .split(',')
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(parse_media_query)
            .collect(),
    }
}

fn parse_media_query(text: &str) -> MediaQuery {
    let text = text.to_ascii_lowercase();
    let mut features = Vec::new();
    let mut outside = String::new();
    let mut rest = text.as_str();
    while let Some(open) = rest.find('(') {
        outside.push_str(&rest[..open]);
        outside.push(' ');
        let Some(close) = rest[open..].find(')') else {
            // Unterminated feature: keep it so the query fails to match.
            features.push(MediaFeature {
                name: rest[open + 1..].trim().to_string(),
                value: None,
            });
            rest = "";
            break;
        };
        let inner = &rest[open + 1..open + close];
        features.push(match inner.split_once(':') {
            Some((name, value)) => MediaFeature {
                name: name.trim().to_string(),
                value: Some(value.trim().to_string()),
            },
            None => MediaFeature {
                name: inner.trim().to_string(),
                value: None,
            },
        });
        rest = &rest[open + close + 1..];
    }
    outside.push_str(rest);

    let mut words: Vec<&str> = outside
        .split_ascii_whitespace()
        .filter(|w| *w != "and")
        .collect();
    let mut negated = false;
    match words.first() {
        Some(&"not") => {
            negated = true;
            let _ = words.remove(0);
        }
        Some(&"only") => {
            let _ = words.remove(0);
        }
        _ => {}
    }
    let media_type = if words.is_empty() {
        "all".to_string()
    } else {
        words.join(" ")
    };
    MediaQuery {
        negated,
        media_type,
        features,
    }
}

impl MediaQueryList {
    /// Whether the list applies to the given viewport.
    #[must_use]
    pub fn is_active(&self, viewport: &dyn Viewport) -> bool {
        self.queries.is_empty() || self.queries.iter().any(|q| q.is_active(viewport))
    }
}

impl MediaQuery {
    /// Whether this single query applies.
    #[must_use]
    pub fn is_active(&self, viewport: &dyn Viewport) -> bool {
        let type_matches = match self.media_type.as_str() {
            "all" => true,
            "screen" => !viewport.is_print(),
            "print" => viewport.is_print(),
            _ => false,
        };
        let result = type_matches && self.features.iter().all(|f| f.is_active(viewport));
        result != self.negated
    }
}

/// Length in a media feature: `em`/`rem` are 16px and `1%` is 0.16px.
fn feature_length(value: &str, viewport: &dyn Viewport) -> Option<f64> {
    let cx = LengthContext {
        dpi: viewport.dpi(),
        percent_base: DEFAULT_FONT_SIZE_PX,
        viewport_width: f64::from(viewport.inner_width()),
        viewport_height: f64::from(viewport.inner_height()),
    };
    parse_length(value).map(|len| len.to_px(&cx))
}

/// [§ 4.3 resolution](https://www.w3.org/TR/mediaqueries-4/#resolution)
fn resolution_dpi(value: &str) -> Option<f64> {
    let value = value.trim();
    let split = value
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(value.len());
    let number: f64 = value[..split].trim().parse().ok()?;
    match &value[split..] {
        "dpi" => Some(number),
        "dpcm" => Some(number * 2.54),
        "dppx" | "x" => Some(number * 96.0),
        _ => None,
    }
}

fn compare(prefix: &str, actual: f64, limit: Option<f64>) -> bool {
    let Some(limit) = limit else {
        return false;
    };
    match prefix {
        "min-" => actual >= limit,
        "max-" => actual <= limit,
        _ => (actual - limit).abs() < f64::EPSILON,
    }
}

impl MediaFeature {
    /// Evaluate against the viewport. Unknown features are false.
    #[must_use]
    pub fn is_active(&self, viewport: &dyn Viewport) -> bool {
        let (prefix, base) = self
            .name
            .strip_prefix("min-")
            .map(|base| ("min-", base))
            .or_else(|| self.name.strip_prefix("max-").map(|base| ("max-", base)))
            .unwrap_or(("", self.name.as_str()));

        let Some(value) = &self.value else {
            // Boolean context: true for features that have a non-zero value.
            return prefix.is_empty()
                && matches!(
                    base,
                    "width" | "height" | "device-width" | "device-height" | "orientation" | "resolution" | "color"
                );
        };

        match base {
            "width" => compare(prefix, f64::from(viewport.inner_width()), feature_length(value, viewport)),
            "height" => compare(prefix, f64::from(viewport.inner_height()), feature_length(value, viewport)),
            "device-width" => compare(prefix, f64::from(viewport.screen_width()), feature_length(value, viewport)),
            "device-height" => compare(prefix, f64::from(viewport.screen_height()), feature_length(value, viewport)),
            "resolution" => compare(prefix, viewport.dpi(), resolution_dpi(value)),
            "orientation" if prefix.is_empty() => {
                let portrait = viewport.inner_height() >= viewport.inner_width();
                match value.as_str() {
                    "portrait" => portrait,
                    "landscape" => !portrait,
                    _ => false,
                }
            }
            _ => {
                warn_once("CSS", &format!("unsupported media feature '{}'", self.name));
                false
            }
        }
    }
}

/// Bounded parse cache for media lists, safe to share between threads.
#[derive(Debug)]
pub struct MediaQueryCache {
    entries: Mutex<HashMap<String, Arc<MediaQueryList>>>,
    capacity: usize,
}

impl Default for MediaQueryCache {
    fn default() -> Self {
        Self::new(DEFAULT_MEDIA_CACHE_CAPACITY)
    }
}

impl MediaQueryCache {
    /// A cache holding at most `capacity` lists; it is emptied when full.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<MediaQueryList>>> {
        // A poisoned cache only holds parse results; keep using it.
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// The parsed form of `text`, parsing on a miss.
    #[must_use]
    pub fn get(&self, text: &str) -> Arc<MediaQueryList> {
        let key = text.trim();
        let mut entries = self.lock();
        if let Some(hit) = entries.get(key) {
            return Arc::clone(hit);
        }
        let parsed = Arc::new(parse_media_list(key));
        if entries.len() >= self.capacity {
            debug!("media query cache full ({} entries), clearing", entries.len());
            entries.clear();
        }
        let _ = entries.insert(key.to_string(), Arc::clone(&parsed));
        parsed
    }

    /// Parse (or fetch) and evaluate in one step.
    #[must_use]
    pub fn is_active(&self, text: &str, viewport: &dyn Viewport) -> bool {
        text.trim().is_empty() || self.get(text).is_active(viewport)
    }

    /// Number of cached lists.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop all cached lists.
    pub fn clear(&self) {
        self.lock().clear();
    }
}
