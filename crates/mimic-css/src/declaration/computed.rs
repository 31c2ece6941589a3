//! Computed style: the cascaded local values of one element (or one of
//! its pseudo-elements) plus the read-only declaration view over them.
//!
//! [§ 4.4 Computed Values](https://www.w3.org/TR/css-cascade-4/#computed)

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use mimic_dom::NodeId;
use serde::Serialize;
use strum::IntoEnumIterator;

use super::{Priority, StyleDeclaration, StyleEntry, serialize_entries};
use crate::browser::BrowserVersion;
use crate::definition::Definition;
use crate::engine::StyleEngine;
use crate::layout::GeometryCache;
use crate::values::{BoxSide, pixel_string, to_rgb_color};

/// Value reported for every property of an element outside the document.
pub const DETACHED: &str = "";

/// Cascade output for one (element, pseudo-element) pair.
///
/// Owned by the engine cache and shared through `Rc`; the geometry memo
/// cells fill in lazily as layout getters are called.
#[derive(Debug)]
pub struct ComputedStyle {
    node: NodeId,
    pseudo_element: Option<String>,
    attached: bool,
    pub(crate) properties: BTreeMap<String, StyleEntry>,
    pub(crate) geometry: GeometryCache,
}

impl ComputedStyle {
    /// An empty style for `node`.
    #[must_use]
    pub fn new(node: NodeId, pseudo_element: Option<String>, attached: bool) -> Self {
        Self {
            node,
            pseudo_element,
            attached,
            properties: BTreeMap::new(),
            geometry: GeometryCache::default(),
        }
    }

    /// The element.
    #[must_use]
    pub const fn node(&self) -> NodeId {
        self.node
    }

    /// The pseudo-element, if this style is for one.
    #[must_use]
    pub fn pseudo_element(&self) -> Option<&str> {
        self.pseudo_element.as_deref()
    }

    /// Whether the element was in the document when the style was built.
    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.attached
    }

    /// The winning entry for a property name.
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&StyleEntry> {
        self.properties.get(name)
    }

    /// All winning entries by name.
    #[must_use]
    pub const fn properties(&self) -> &BTreeMap<String, StyleEntry> {
        &self.properties
    }

    /// The locally cascaded value of `definition`, consulting every
    /// shorthand that can supply it and taking the highest-ranked one.
    /// Empty when nothing local applies.
    #[must_use]
    pub fn local_value(&self, definition: Definition) -> String {
        definition
            .sources()
            .into_iter()
            .filter_map(|(source, component)| {
                self.properties
                    .get(source.name())
                    .map(|entry| (entry, component))
            })
            .max_by_key(|(entry, _)| entry.rank())
            .and_then(|(entry, component)| component.extract(&entry.value))
            .unwrap_or_default()
    }
}

/// Lower-case a resolved value unless case matters for it.
fn normalize_value(definition: Definition, value: String) -> String {
    if definition == Definition::Content || value.to_ascii_lowercase().contains("url(") {
        value
    } else {
        value.to_ascii_lowercase()
    }
}

/// Read-only declaration over a [`ComputedStyle`], with access to the
/// engine for inheritance and layout.
#[derive(Clone)]
pub struct ComputedDeclaration<'e> {
    pub(crate) engine: &'e StyleEngine<'e>,
    pub(crate) style: Rc<ComputedStyle>,
}

impl fmt::Debug for ComputedDeclaration<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComputedDeclaration")
            .field("node", &self.style.node())
            .field("pseudo_element", &self.style.pseudo_element())
            .field("properties", &self.style.properties().len())
            .finish_non_exhaustive()
    }
}

/// Serializable dump of every resolved longhand plus the box geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleSnapshot {
    /// Arena index of the element.
    pub node: usize,
    /// Pseudo-element, if any.
    pub pseudo_element: Option<String>,
    /// Resolved value of every longhand, defaults applied.
    pub properties: BTreeMap<String, String>,
    /// `calculated_width()`
    pub width: i32,
    /// `calculated_height()`
    pub height: i32,
    /// `top_with(false, false, false)`
    pub top: i32,
    /// `left_with(false, false, false)`
    pub left: i32,
}

impl<'e> ComputedDeclaration<'e> {
    pub(crate) const fn new(engine: &'e StyleEngine<'e>, style: Rc<ComputedStyle>) -> Self {
        Self { engine, style }
    }

    /// The element.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.style.node()
    }

    /// The pseudo-element, if this style is for one.
    #[must_use]
    pub fn pseudo_element(&self) -> Option<&str> {
        self.style.pseudo_element()
    }

    /// Whether the element is in the document.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.style.is_attached()
    }

    /// The underlying cascade result.
    #[must_use]
    pub fn style(&self) -> &ComputedStyle {
        &self.style
    }

    /// [§ 7 Inheritance](https://www.w3.org/TR/css-cascade-4/#inheriting)
    ///
    /// Resolve `definition` for this element:
    /// - outside the document: [`DETACHED`]
    /// - a local value other than `inherit`: that value, lower-cased
    ///   unless it is `content` or contains a `url(`
    /// - `inherit`, or nothing local for an inherited property: the same
    ///   lookup on the parent element (a pseudo-element's parent is its
    ///   element), iteratively
    /// - otherwise the personality's default if `apply_default` is set
    #[must_use]
    pub fn resolve(&self, definition: Definition, apply_default: bool) -> String {
        if !self.style.is_attached() {
            return DETACHED.to_string();
        }
        let tree = self.engine.tree();
        let mut current = Rc::clone(&self.style);
        loop {
            let value = current.local_value(definition);
            let explicit_inherit = value.trim().eq_ignore_ascii_case("inherit");
            if !value.is_empty() && !explicit_inherit {
                return normalize_value(definition, value);
            }
            if !explicit_inherit && !definition.is_inherited() {
                break;
            }
            let parent = if current.pseudo_element().is_some() {
                Some(current.node())
            } else {
                tree.parent_element(current.node())
            };
            match parent {
                Some(parent) => current = self.engine.style_data(parent, None),
                None => break,
            }
        }
        if apply_default {
            definition.default_value(self.engine.browser()).to_string()
        } else {
            String::new()
        }
    }

    /// Computed `display`.
    #[must_use]
    pub fn display(&self) -> String {
        self.resolve(Definition::Display, true)
    }

    /// Computed `position`.
    #[must_use]
    pub fn position(&self) -> String {
        self.resolve(Definition::Position, true)
    }

    /// Computed `float`.
    #[must_use]
    pub fn float(&self) -> String {
        self.resolve(Definition::Float, true)
    }

    /// Computed `box-sizing`.
    #[must_use]
    pub fn box_sizing(&self) -> String {
        self.resolve(Definition::BoxSizing, true)
    }

    /// Computed `font-size`.
    #[must_use]
    pub fn font_size(&self) -> String {
        self.resolve(Definition::FontSize, true)
    }

    /// Computed `font-family`.
    #[must_use]
    pub fn font_family(&self) -> String {
        self.resolve(Definition::FontFamily, true)
    }

    /// Computed `visibility`.
    #[must_use]
    pub fn visibility(&self) -> String {
        self.resolve(Definition::Visibility, true)
    }

    /// Computed `overflow-x`, falling back to `overflow`.
    #[must_use]
    pub fn overflow_x(&self) -> String {
        self.resolve(Definition::OverflowX, true)
    }

    /// Computed `overflow-y`, falling back to `overflow`.
    #[must_use]
    pub fn overflow_y(&self) -> String {
        self.resolve(Definition::OverflowY, true)
    }

    /// Computed `color` as `rgb(...)`.
    #[must_use]
    pub fn color(&self) -> String {
        to_rgb_color(&self.resolve(Definition::Color, true))
    }

    /// Computed `background-color` as `rgb(...)`, `rgba(...)` or the
    /// personality's transparent keyword.
    #[must_use]
    pub fn background_color(&self) -> String {
        let value = self.resolve(Definition::BackgroundColor, true);
        if value == "transparent" {
            value
        } else {
            to_rgb_color(&value)
        }
    }

    /// Computed `background-image`.
    #[must_use]
    pub fn background_image(&self) -> String {
        self.resolve(Definition::BackgroundImage, true)
    }

    /// Computed `margin-<side>`.
    #[must_use]
    pub fn margin(&self, side: BoxSide) -> String {
        self.resolve(Definition::margin(side), true)
    }

    /// Computed `padding-<side>`.
    #[must_use]
    pub fn padding(&self, side: BoxSide) -> String {
        self.resolve(Definition::padding(side), true)
    }

    /// Computed `border-<side>-style`.
    #[must_use]
    pub fn border_style(&self, side: BoxSide) -> String {
        self.resolve(Definition::border_style(side), true)
    }

    /// Computed `border-<side>-color` as `rgb(...)`.
    #[must_use]
    pub fn border_color(&self, side: BoxSide) -> String {
        to_rgb_color(&self.resolve(Definition::border_color(side), true))
    }

    /// Computed `border-<side>-width` in pixels; `0px` when the side has
    /// no visible border style.
    #[must_use]
    pub fn border_width(&self, side: BoxSide) -> String {
        pixel_string(self.border_px(side))
    }

    /// Resolved values and geometry in one serializable value.
    #[must_use]
    pub fn snapshot(&self) -> StyleSnapshot {
        let properties = Definition::iter()
            .filter(|def| !def.is_shorthand())
            .map(|def| (def.name().to_string(), self.resolve(def, true)))
            .collect();
        StyleSnapshot {
            node: self.node().0,
            pseudo_element: self.pseudo_element().map(str::to_string),
            properties,
            width: self.calculated_width(),
            height: self.calculated_height(),
            top: self.top_with(false, false, false),
            left: self.left_with(false, false, false),
        }
    }
}

impl StyleDeclaration for ComputedDeclaration<'_> {
    fn browser(&self) -> &BrowserVersion {
        self.engine.browser()
    }

    fn entry(&self, name: &str) -> Option<StyleEntry> {
        self.style
            .entry(&name.trim().to_ascii_lowercase())
            .cloned()
    }

    fn property_map(&self) -> BTreeMap<String, StyleEntry> {
        self.style.properties().clone()
    }

    fn get_text(&self) -> String {
        serialize_entries(self.style.properties().values())
    }

    fn set_text(&mut self, _text: &str) {}

    fn set(&mut self, _name: &str, _value: &str, _priority: Priority) {}

    fn remove(&mut self, _name: &str) -> String {
        String::new()
    }

    fn length(&self) -> usize {
        self.style.properties().len()
    }

    fn item(&self, index: usize) -> String {
        self.style
            .properties()
            .keys()
            .nth(index)
            .cloned()
            .unwrap_or_default()
    }
}
