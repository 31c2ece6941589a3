//! CSS Cascading
//!
//! This module merges declarations into a [`ComputedStyle`] per
//! [CSS Cascading and Inheritance Level 4](https://www.w3.org/TR/css-cascade-4/).
//!
//! Sources are applied lowest-origin first: the element kind's built-in
//! values, then every matching rule of every stylesheet in document
//! order, then the element's `style` attribute. The merge keeps the
//! winner per property name, so the application order only breaks ties.

use log::trace;
use mimic_dom::NodeId;

use crate::declaration::{ComputedStyle, Priority, StyleEntry, block_entries};
use crate::element_kind::ElementKind;
use crate::engine::StyleEngine;
use crate::selector::{ComplexSelector, Specificity};
use crate::stylesheet::DeclarationBlock;

impl ComputedStyle {
    /// [§ 6.4 Cascade Sorting Order](https://www.w3.org/TR/css-cascade-4/#cascade-sort)
    ///
    /// Merge one entry:
    /// - an existing `!important` entry only yields to an important one of
    ///   at least the same specificity
    /// - otherwise the incoming entry wins if it is important or at least
    ///   as specific
    pub fn apply_entry(&mut self, incoming: StyleEntry) {
        let replace = match self.properties.get(&incoming.name) {
            None => true,
            Some(existing) if existing.is_important() => {
                incoming.is_important() && incoming.specificity >= existing.specificity
            }
            Some(existing) => {
                incoming.is_important() || incoming.specificity >= existing.specificity
            }
        };
        if replace {
            let _ = self.properties.insert(incoming.name.clone(), incoming);
        }
    }

    /// Merge every effective declaration of `block` at `specificity`.
    pub fn apply_rule(
        &mut self,
        block: &DeclarationBlock,
        selector: Option<&ComplexSelector>,
        specificity: Specificity,
    ) {
        if let Some(selector) = selector {
            trace!("{:?}: applying '{selector}' {specificity:?}", self.node());
        }
        for entry in block_entries(block, specificity) {
            self.apply_entry(entry);
        }
    }

    /// Seed a built-in value; never overrides anything already present.
    pub fn set_default(&mut self, name: &str, value: &str) {
        if !self.properties.contains_key(name) {
            let entry = StyleEntry::new(name, value, Priority::Normal, Specificity::BUILT_IN);
            let _ = self.properties.insert(name.to_string(), entry);
        }
    }
}

/// [§ 6 Cascading](https://www.w3.org/TR/css-cascade-4/#cascading)
///
/// Build the style of `node` (or of its `pseudo` element). Detached
/// nodes and non-elements get an empty style.
pub(crate) fn compute(engine: &StyleEngine<'_>, node: NodeId, pseudo: Option<&str>) -> ComputedStyle {
    let tree = engine.tree();
    let attached = tree.is_attached(node);
    let mut style = ComputedStyle::new(node, pseudo.map(str::to_string), attached);
    if !attached {
        return style;
    }
    let Some(element) = tree.as_element(node) else {
        return style;
    };

    if pseudo.is_none() {
        let kind = ElementKind::of(element);
        style.set_default("display", kind.default_display());
        for &(name, value) in kind.default_declarations() {
            style.set_default(name, value);
        }
    }

    for matched in engine.matching_rules(node, pseudo) {
        style.apply_rule(matched.block, Some(matched.selector), matched.specificity);
    }

    // [§ 6.1 Cascade Origins](https://www.w3.org/TR/css-cascade-4/#cascading-origins)
    // The style attribute outranks every selector.
    if pseudo.is_none()
        && let Some(text) = element.attribute("style")
    {
        let block = DeclarationBlock::parse(text);
        style.apply_rule(&block, None, Specificity::STYLE_ATTRIBUTE);
    }

    style
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, value: &str, important: bool, specificity: Specificity) -> StyleEntry {
        let priority = if important {
            Priority::Important
        } else {
            Priority::Normal
        };
        StyleEntry::new(name, value, priority, specificity)
    }

    fn value(style: &ComputedStyle, name: &str) -> String {
        style.entry(name).map(|e| e.value.clone()).unwrap_or_default()
    }

    #[test]
    fn test_specificity_decides() {
        let mut style = ComputedStyle::new(NodeId(1), None, true);
        style.apply_entry(entry("color", "red", false, Specificity::new(1, 0, 0)));
        style.apply_entry(entry("color", "blue", false, Specificity::new(0, 1, 0)));
        assert_eq!(value(&style, "color"), "red");

        style.apply_entry(entry("color", "green", false, Specificity::new(1, 0, 0)));
        assert_eq!(value(&style, "color"), "green");
    }

    #[test]
    fn test_important_wins_over_specificity() {
        let mut style = ComputedStyle::new(NodeId(1), None, true);
        style.apply_entry(entry("color", "red", true, Specificity::new(0, 1, 0)));
        style.apply_entry(entry("color", "blue", false, Specificity::STYLE_ATTRIBUTE));
        assert_eq!(value(&style, "color"), "red");

        style.apply_entry(entry("color", "navy", true, Specificity::new(0, 0, 1)));
        assert_eq!(value(&style, "color"), "red");

        style.apply_entry(entry("color", "teal", true, Specificity::STYLE_ATTRIBUTE));
        assert_eq!(value(&style, "color"), "teal");
    }

    #[test]
    fn test_defaults_only_fill_gaps() {
        let mut style = ComputedStyle::new(NodeId(1), None, true);
        style.apply_entry(entry("display", "flex", false, Specificity::new(0, 0, 1)));
        style.set_default("display", "block");
        style.set_default("margin-top", "8px");
        assert_eq!(value(&style, "display"), "flex");
        assert_eq!(value(&style, "margin-top"), "8px");

        // Any selector beats a built-in value.
        style.apply_entry(entry("margin-top", "0", false, Specificity::new(0, 0, 0)));
        assert_eq!(value(&style, "margin-top"), "0");
    }

    #[test]
    fn test_apply_rule_uses_last_declaration() {
        let mut style = ComputedStyle::new(NodeId(1), None, true);
        let block = DeclarationBlock::parse("color: red; color: blue; margin: 1px");
        style.apply_rule(&block, None, Specificity::new(0, 1, 0));
        assert_eq!(value(&style, "color"), "blue");
        assert_eq!(value(&style, "margin"), "1px");
    }
}
