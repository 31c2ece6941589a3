//! Per-stylesheet rule index.
//!
//! Each selector of each style rule (including rules nested in `@media`)
//! gets a document-order ordinal and lands in one bucket: keyed by the
//! subject's tag name when the subject is a bare type selector, keyed by
//! class when the subject is a single class, otherwise in a catch-all.
//! A query only looks at the buckets an element could hit, then restores
//! document order by ordinal.

use std::collections::HashMap;

use log::{debug, trace};
use mimic_dom::NodeId;

use crate::selector::{ComplexSelector, MatchContext, Specificity};
use crate::stylesheet::{DeclarationBlock, Rule, StyleRule, Stylesheet};

/// Imports nested deeper than this are ignored.
const MAX_IMPORT_DEPTH: usize = 16;

/// Position of one selector of one style rule within a sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Document-order position among all indexed selectors.
    pub ordinal: usize,
    /// Rule indices from the top level down through `@media` blocks.
    pub path: Vec<usize>,
    /// Index of the selector within the rule's selector list.
    pub selector: usize,
}

/// Buckets of [`IndexEntry`] for one stylesheet.
#[derive(Debug, Default)]
pub struct RuleIndex {
    by_tag: HashMap<String, Vec<IndexEntry>>,
    by_class: HashMap<String, Vec<IndexEntry>>,
    other: Vec<IndexEntry>,
    imports: Vec<usize>,
    len: usize,
}

impl RuleIndex {
    /// Index all rules of a sheet.
    #[must_use]
    pub fn build(rules: &[Rule]) -> Self {
        let mut index = Self::default();
        let mut path = Vec::new();
        index.add_rules(rules, &mut path);
        debug!(
            "built rule index: {} selectors ({} by tag, {} by class, {} other), {} imports",
            index.len,
            index.by_tag.len(),
            index.by_class.len(),
            index.other.len(),
            index.imports.len()
        );
        index
    }

    fn add_rules(&mut self, rules: &[Rule], path: &mut Vec<usize>) {
        for (i, rule) in rules.iter().enumerate() {
            path.push(i);
            match rule {
                Rule::Style(style) => {
                    for (selector_index, selector) in style.selectors.selectors().iter().enumerate() {
                        let entry = IndexEntry {
                            ordinal: self.len,
                            path: path.clone(),
                            selector: selector_index,
                        };
                        self.len += 1;
                        self.bucket_for(selector).push(entry);
                    }
                }
                Rule::Media(media) => self.add_rules(&media.rules, path),
                // Only top-level imports are honored.
                Rule::Import(_) if path.len() == 1 => self.imports.push(i),
                Rule::Import(_) => {}
            }
            let _ = path.pop();
        }
    }

    fn bucket_for(&mut self, selector: &ComplexSelector) -> &mut Vec<IndexEntry> {
        let subject = &selector.subject;
        if subject.pseudo_element.is_some() {
            return &mut self.other;
        }
        if let Some(tag) = &subject.element
            && subject.conditions.is_empty()
        {
            return self.by_tag.entry(tag.to_ascii_lowercase()).or_default();
        }
        if let Some(class) = subject.single_class() {
            return self.by_class.entry(class.to_string()).or_default();
        }
        &mut self.other
    }

    /// Number of indexed selectors.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether nothing is indexed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Positions of top-level `@import` rules.
    #[must_use]
    pub fn imports(&self) -> &[usize] {
        &self.imports
    }

    /// Entries an element with this tag and these classes could match, in
    /// document order.
    #[must_use]
    pub fn candidates(&self, tag: &str, classes: &[&str]) -> Vec<&IndexEntry> {
        let mut out: Vec<&IndexEntry> = Vec::new();
        if let Some(bucket) = self.by_tag.get(&tag.to_ascii_lowercase()) {
            out.extend(bucket);
        }
        for class in classes {
            if let Some(bucket) = self.by_class.get(*class) {
                out.extend(bucket);
            }
        }
        out.extend(&self.other);
        out.sort_by_key(|entry| entry.ordinal);
        out.dedup_by_key(|entry| entry.ordinal);
        out
    }
}

/// One rule that applies to an element.
#[derive(Debug, Clone, Copy)]
pub struct MatchedRule<'s> {
    /// The most specific selector of the rule that matched.
    pub selector: &'s ComplexSelector,
    /// The rule's declarations.
    pub block: &'s DeclarationBlock,
    /// Specificity of `selector`.
    pub specificity: Specificity,
}

fn resolve_path<'s>(
    rules: &'s [Rule],
    path: &[usize],
    media_active: &dyn Fn(&str) -> bool,
) -> Option<&'s StyleRule> {
    let (&last, parents) = path.split_last()?;
    let mut rules = rules;
    for &i in parents {
        match rules.get(i)? {
            Rule::Media(media) if media_active(&media.media) => rules = &media.rules,
            _ => return None,
        }
    }
    match rules.get(last)? {
        Rule::Style(style) => Some(style),
        _ => None,
    }
}

impl Stylesheet {
    /// Append to `out` every rule of this sheet (imports first) that
    /// applies to `node`, in document order.
    ///
    /// A rule with several matching selectors is reported once, with the
    /// highest specificity among them. `media_active` decides media lists.
    pub fn collect_matches<'s>(
        &'s self,
        cx: &MatchContext<'_>,
        node: NodeId,
        media_active: &dyn Fn(&str) -> bool,
        out: &mut Vec<MatchedRule<'s>>,
    ) {
        self.collect_matches_at_depth(cx, node, media_active, out, 0);
    }

    fn collect_matches_at_depth<'s>(
        &'s self,
        cx: &MatchContext<'_>,
        node: NodeId,
        media_active: &dyn Fn(&str) -> bool,
        out: &mut Vec<MatchedRule<'s>>,
        depth: usize,
    ) {
        if self.is_disabled() || !media_active(self.media()) {
            return;
        }
        let Some(element) = cx.tree.as_element(node) else {
            return;
        };
        let index = self.index();

        for &position in index.imports() {
            if let Some(Rule::Import(import)) = self.rules().get(position)
                && let Some(sheet) = &import.sheet
                && media_active(&import.media)
            {
                if depth >= MAX_IMPORT_DEPTH {
                    trace!("import depth limit reached at {}", import.href);
                    continue;
                }
                sheet.collect_matches_at_depth(cx, node, media_active, out, depth + 1);
            }
        }

        let own_start = out.len();
        for entry in index.candidates(element.local_name(), &element.class_list()) {
            let Some(rule) = resolve_path(self.rules(), &entry.path, media_active) else {
                continue;
            };
            let Some(selector) = rule.selectors.selectors().get(entry.selector) else {
                continue;
            };
            if !selector.matches(cx, node) {
                continue;
            }
            let specificity = selector.specificity();
            if out.len() > own_start
                && let Some(previous) = out.last_mut()
                && std::ptr::eq(previous.block, &rule.block)
            {
                if specificity > previous.specificity {
                    previous.specificity = specificity;
                    previous.selector = selector;
                }
                continue;
            }
            out.push(MatchedRule {
                selector,
                block: &rule.block,
                specificity,
            });
        }
    }
}
