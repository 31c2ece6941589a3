//! The `style` attribute as a declaration.

use std::collections::BTreeMap;

use mimic_dom::{DomTree, NodeId};

use super::{Priority, StyleDeclaration, StyleEntry, block_entries, serialize_entries};
use crate::browser::BrowserVersion;
use crate::selector::Specificity;
use crate::stylesheet::DeclarationBlock;

/// Reads and rewrites an element's `style` attribute.
///
/// The attribute text is the only state: every read parses it, every
/// write re-serializes the whole block back into it.
#[derive(Debug)]
pub struct InlineStyle<'a> {
    tree: &'a mut DomTree,
    node: NodeId,
    browser: &'a BrowserVersion,
}

impl<'a> InlineStyle<'a> {
    /// View `node`'s style attribute.
    pub const fn new(tree: &'a mut DomTree, node: NodeId, browser: &'a BrowserVersion) -> Self {
        Self {
            tree,
            node,
            browser,
        }
    }

    /// The element this declaration belongs to.
    #[must_use]
    pub const fn node(&self) -> NodeId {
        self.node
    }

    fn block(&self) -> DeclarationBlock {
        DeclarationBlock::parse(self.tree.attribute(self.node, "style").unwrap_or_default())
    }

    fn entries(&self) -> Vec<StyleEntry> {
        block_entries(&self.block(), Specificity::STYLE_ATTRIBUTE)
    }

    fn write(&mut self, block: &DeclarationBlock) {
        self.tree.set_attribute(self.node, "style", &block.to_css_text());
    }
}

impl StyleDeclaration for InlineStyle<'_> {
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
        self.tree.set_attribute(self.node, "style", text);
    }

    fn set(&mut self, name: &str, value: &str, priority: Priority) {
        let mut block = self.block();
        block.set(name, value, priority == Priority::Important);
        self.write(&block);
    }

    fn remove(&mut self, name: &str) -> String {
        let mut block = self.block();
        let removed = block.remove(name).map(|d| d.value).unwrap_or_default();
        self.write(&block);
        removed
    }

    fn length(&self) -> usize {
        self.entries().len()
    }

    fn item(&self, index: usize) -> String {
        self.entries()
            .into_iter()
            .nth(index)
            .map(|e| e.name)
            .unwrap_or_default()
    }
}
