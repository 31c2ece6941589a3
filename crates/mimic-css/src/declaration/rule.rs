//! A stylesheet rule's declaration block as a declaration.

use std::collections::BTreeMap;

use super::{Priority, StyleDeclaration, StyleEntry, block_entries, serialize_entries};
use crate::browser::BrowserVersion;
use crate::selector::Specificity;
use crate::stylesheet::DeclarationBlock;

/// Wraps one declaration block. Entries are synthesized on demand and
/// carry the style-attribute specificity, since outside a cascade there
/// is nothing to rank them against but each other.
#[derive(Debug)]
pub struct RuleStyle<'a> {
    block: &'a mut DeclarationBlock,
    browser: &'a BrowserVersion,
}

impl<'a> RuleStyle<'a> {
    /// View a declaration block.
    pub const fn new(block: &'a mut DeclarationBlock, browser: &'a BrowserVersion) -> Self {
        Self { block, browser }
    }

    fn entries(&self) -> Vec<StyleEntry> {
        block_entries(self.block, Specificity::STYLE_ATTRIBUTE)
    }
}

impl StyleDeclaration for RuleStyle<'_> {
    fn browser(&self) -> &BrowserVersion {
        self.browser
    }

    fn entry(&self, name: &str) -> Option<StyleEntry> {
        let name = name.trim().to_ascii_lowercase();
        self.entries().into_iter().find(|e| e.name == name)
    }

    fn property_map(&self) -> BTreeMap<String, StyleEntry> {
        self.entries()
            .into_iter()
            .map(|e| (e.name.clone(), e))
            .collect()
    }

    fn get_text(&self) -> String {
        serialize_entries(&self.entries())
    }

    fn set_text(&mut self, text: &str) {
        *self.block = DeclarationBlock::parse(text);
    }

    fn set(&mut self, name: &str, value: &str, priority: Priority) {
        self.block.set(name, value, priority == Priority::Important);
    }

    fn remove(&mut self, name: &str) -> String {
        self.block.remove(name).map(|d| d.value).unwrap_or_default()
    }

    fn length(&self) -> usize {
        self.block.len()
    }

    fn item(&self, index: usize) -> String {
        self.block
            .effective()
            .get(index)
            .map(|d| d.name.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::Definition;

    #[test]
    fn test_rule_round_trip() {
        let mut block = DeclarationBlock::parse("padding: 4px; color: blue !important");
        let browser = BrowserVersion::chrome();
        let mut style = RuleStyle::new(&mut block, &browser);
        assert_eq!(style.get_pair(Definition::PaddingLeft, Definition::Padding), "4px");
        assert_eq!(style.get_priority("color"), Priority::Important);
        style.set("color", "green", Priority::Normal);
        assert_eq!(style.get_text(), "padding: 4px; color: green;");
        style.set_text("width: 5px");
        assert_eq!(style.length(), 1);
        assert_eq!(style.item(0), "width");
        assert_eq!(block.get("width").map(|d| d.value.as_str()), Some("5px"));
    }
}
