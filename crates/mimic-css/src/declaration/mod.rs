//! Style declarations
//!
//! [CSSOM § 6.6 CSSStyleDeclaration](https://www.w3.org/TR/cssom-1/#the-cssstyledeclaration-interface)
//!
//! One read/write interface over three backing stores:
//! - [`InlineStyle`]: an element's `style` attribute
//! - [`RuleStyle`]: a stylesheet rule's declaration block
//! - [`ComputedDeclaration`]: the cascaded result for an element (read-only)

pub mod computed;
pub mod inline;
pub mod rule;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

pub use computed::{ComputedDeclaration, ComputedStyle, DETACHED, StyleSnapshot};
pub use inline::InlineStyle;
pub use rule::RuleStyle;

use crate::browser::BrowserVersion;
use crate::definition::Definition;
use crate::selector::Specificity;
use crate::stylesheet::DeclarationBlock;
use crate::values::{box_side_value, split_components};

/// `!important` or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// A normal declaration.
    #[default]
    Normal,
    /// `!important`
    Important,
}

impl Priority {
    /// The CSSOM spelling: `""` or `"important"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "",
            Self::Important => "important",
        }
    }

    /// Read the CSSOM spelling; anything but `important` is normal.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        if text.trim().eq_ignore_ascii_case("important") {
            Self::Important
        } else {
            Self::Normal
        }
    }
}

/// Source of sequence numbers; strictly increasing for the process lifetime.
static SEQUENCE: AtomicU64 = AtomicU64::new(0);

fn next_sequence() -> u64 {
    SEQUENCE.fetch_add(1, Ordering::Relaxed)
}

/// One property value as seen by the cascade.
///
/// Entries are immutable; the sequence number records creation order so
/// that among equal importance and specificity the later one wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleEntry {
    /// Property name.
    pub name: String,
    /// Value text.
    pub value: String,
    /// Importance.
    pub priority: Priority,
    /// Specificity of the rule it came from.
    pub specificity: Specificity,
    /// Creation order.
    pub sequence: u64,
}

impl StyleEntry {
    /// Create an entry with the next sequence number.
    #[must_use]
    pub fn new(name: &str, value: &str, priority: Priority, specificity: Specificity) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            priority,
            specificity,
            sequence: next_sequence(),
        }
    }

    /// Whether the entry is `!important`.
    #[must_use]
    pub fn is_important(&self) -> bool {
        self.priority == Priority::Important
    }

    /// Total order used when two entries compete for one property:
    /// importance, then specificity, then creation order.
    #[must_use]
    pub fn rank(&self) -> (Priority, Specificity, u64) {
        (self.priority, self.specificity, self.sequence)
    }
}

/// The operations every declaration variant supports.
///
/// Read-only variants implement the mutators as no-ops.
pub trait StyleDeclaration {
    /// The personality supplying defaults.
    fn browser(&self) -> &BrowserVersion;

    /// The effective entry for `name`, if declared.
    fn entry(&self, name: &str) -> Option<StyleEntry>;

    /// All effective entries keyed by name.
    fn property_map(&self) -> BTreeMap<String, StyleEntry>;

    /// Serialized declarations.
    fn get_text(&self) -> String;

    /// Replace all declarations by parsing `text`.
    fn set_text(&mut self, text: &str);

    /// Set one property; an empty value removes it.
    fn set(&mut self, name: &str, value: &str, priority: Priority);

    /// Remove one property, returning its previous value or `""`.
    fn remove(&mut self, name: &str) -> String;

    /// Number of declared properties.
    fn length(&self) -> usize;

    /// Name of the `index`-th property, or `""` when out of range.
    fn item(&self, index: usize) -> String;

    /// The declared value of `name`, or `""`.
    fn get(&self, name: &str) -> String {
        self.entry(name).map(|e| e.value).unwrap_or_default()
    }

    /// The priority of `name`; normal when not declared.
    fn get_priority(&self, name: &str) -> Priority {
        self.entry(name).map(|e| e.priority).unwrap_or_default()
    }

    /// The declared value of `definition`, falling back to its default
    /// when empty and `apply_default` is set.
    fn get_with_default(&self, definition: Definition, apply_default: bool) -> String {
        let value = self.get(definition.name());
        if value.is_empty() && apply_default {
            definition.default_value(self.browser()).to_string()
        } else {
            value
        }
    }

    /// Read `longhand`, consulting `shorthand` as well: the longhand wins
    /// if it ranks at least as high; otherwise the shorthand's value is
    /// expanded to the longhand's side (1 value: all sides; 2: vertical
    /// and horizontal; 3: top, horizontal, bottom; 4: clockwise).
    fn get_pair(&self, longhand: Definition, shorthand: Definition) -> String {
        let long = self.entry(longhand.name());
        let short = self.entry(shorthand.name());
        match (long, short) {
            (None, None) => String::new(),
            (Some(long), None) => long.value,
            (Some(long), Some(short)) if long.rank() >= short.rank() => long.value,
            (_, Some(short)) => match longhand.box_side() {
                Some(side) => box_side_value(&split_components(&short.value), side)
                    .unwrap_or_default()
                    .to_string(),
                None => short.value,
            },
        }
    }
}

/// Entries for the effective declarations of a block, in order of first
/// appearance. Each winner carries a sequence number reflecting its own
/// source position, so a later shorthand outranks an earlier longhand.
pub(crate) fn block_entries(block: &DeclarationBlock, specificity: Specificity) -> Vec<StyleEntry> {
    let mut entries: Vec<StyleEntry> = Vec::new();
    for decl in block.declarations() {
        let priority = if decl.important {
            Priority::Important
        } else {
            Priority::Normal
        };
        let entry = StyleEntry::new(&decl.name, &decl.value, priority, specificity);
        match entries.iter_mut().find(|e| e.name == entry.name) {
            Some(existing) => {
                if entry.is_important() || !existing.is_important() {
                    *existing = entry;
                }
            }
            None => entries.push(entry),
        }
    }
    entries
}

/// Serialize entries in the CSSOM text form.
pub(crate) fn serialize_entries<'e>(entries: impl IntoIterator<Item = &'e StyleEntry>) -> String {
    entries
        .into_iter()
        .map(|e| {
            if e.is_important() {
                format!("{}: {} !important;", e.name, e.value)
            } else {
                format!("{}: {};", e.name, e.value)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_increases() {
        let a = StyleEntry::new("color", "red", Priority::Normal, Specificity::new(0, 0, 1));
        let b = StyleEntry::new("color", "red", Priority::Normal, Specificity::new(0, 0, 1));
        assert!(b.sequence > a.sequence);
        assert!(b.rank() > a.rank());
    }

    #[test]
    fn test_rank_orders_importance_first() {
        let important = StyleEntry::new("color", "a", Priority::Important, Specificity::new(0, 0, 0));
        let specific = StyleEntry::new("color", "b", Priority::Normal, Specificity::STYLE_ATTRIBUTE);
        assert!(important.rank() > specific.rank());
    }

    #[test]
    fn test_block_entries_keep_source_order_ranks() {
        let block = DeclarationBlock::parse("margin-top: 1px; margin: 5px; margin-top: 2px");
        let entries = block_entries(&block, Specificity::STYLE_ATTRIBUTE);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "margin-top");
        assert_eq!(entries[0].value, "2px");
        assert!(entries[0].rank() > entries[1].rank());
    }

    #[test]
    fn test_priority_text() {
        assert_eq!(Priority::parse("IMPORTANT"), Priority::Important);
        assert_eq!(Priority::parse(""), Priority::Normal);
        assert_eq!(Priority::Important.as_str(), "important");
    }
}
