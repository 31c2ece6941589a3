//! Shorthand decomposition
//!
//! [§ 4 Borders](https://www.w3.org/TR/css-backgrounds-3/#borders) and
//! [§ 3.10 background](https://www.w3.org/TR/css-backgrounds-3/#background)
//!
//! The components of `border` and `background` may appear in any order,
//! so each longhand is recovered by looking for the first component of
//! the right kind.

use super::color::parse_color;
use super::length::parse_length;
use super::split_components;

/// [§ 4.2 Line Patterns: the border-style properties](https://www.w3.org/TR/css-backgrounds-3/#border-style)
const BORDER_STYLES: &[&str] = &[
    "none", "hidden", "dotted", "dashed", "solid", "double", "groove", "ridge", "inset", "outset",
];

const BORDER_WIDTH_KEYWORDS: &[&str] = &["thin", "medium", "thick"];

const REPEAT_KEYWORDS: &[&str] = &["repeat", "repeat-x", "repeat-y", "no-repeat", "space", "round"];

const ATTACHMENT_KEYWORDS: &[&str] = &["scroll", "fixed", "local"];

const POSITION_KEYWORDS: &[&str] = &["left", "right", "top", "bottom", "center"];

/// The longhand components found in a `border` (or `border-<side>`) value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BorderParts<'a> {
    /// `border-*-width` component.
    pub width: Option<&'a str>,
    /// `border-*-style` component.
    pub style: Option<&'a str>,
    /// `border-*-color` component.
    pub color: Option<&'a str>,
}

/// Split `border: 1px solid red` into width, style and color.
#[must_use]
pub fn decompose_border(value: &str) -> BorderParts<'_> {
    let mut parts = BorderParts::default();
    for component in split_components(value) {
        if parts.style.is_none() && is_border_style(component) {
            parts.style = Some(component);
        } else if parts.width.is_none() && is_border_width(component) {
            parts.width = Some(component);
        } else if parts.color.is_none() && parse_color(component).is_some() {
            parts.color = Some(component);
        }
    }
    parts
}

/// The border style component of a border shorthand value.
#[must_use]
pub fn find_border_style(value: &str) -> Option<&str> {
    decompose_border(value).style
}

/// The border width component of a border shorthand value.
#[must_use]
pub fn find_border_width(value: &str) -> Option<&str> {
    decompose_border(value).width
}

fn is_border_style(component: &str) -> bool {
    BORDER_STYLES.iter().any(|s| s.eq_ignore_ascii_case(component))
}

fn is_border_width(component: &str) -> bool {
    BORDER_WIDTH_KEYWORDS
        .iter()
        .any(|s| s.eq_ignore_ascii_case(component))
        || parse_length(component).is_some_and(|len| len.value >= 0.0)
}

/// The longhand components found in a `background` value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackgroundParts {
    /// `background-color` component.
    pub color: Option<String>,
    /// `background-image` component.
    pub image: Option<String>,
    /// `background-repeat` component.
    pub repeat: Option<String>,
    /// `background-attachment` component.
    pub attachment: Option<String>,
    /// `background-position` components, joined with a space.
    pub position: Option<String>,
}

/// Split `background: url(x.png) no-repeat left top #fff` into longhands.
#[must_use]
pub fn decompose_background(value: &str) -> BackgroundParts {
    let mut parts = BackgroundParts::default();
    let mut position: Vec<&str> = Vec::new();

    for component in split_components(value) {
        let lower = component.to_ascii_lowercase();
        if lower.starts_with("url(") || lower == "none" || lower.contains("gradient(") {
            if parts.image.is_none() {
                parts.image = Some(component.to_string());
            }
        } else if REPEAT_KEYWORDS.contains(&lower.as_str()) {
            if parts.repeat.is_none() {
                parts.repeat = Some(lower);
            }
        } else if ATTACHMENT_KEYWORDS.contains(&lower.as_str()) {
            if parts.attachment.is_none() {
                parts.attachment = Some(lower);
            }
        } else if POSITION_KEYWORDS.contains(&lower.as_str()) || parse_length(component).is_some()
        {
            position.push(component);
        } else if parts.color.is_none() && parse_color(component).is_some() {
            parts.color = Some(component.to_string());
        }
    }

    if !position.is_empty() {
        parts.position = Some(position.join(" "));
    }
    parts
}
