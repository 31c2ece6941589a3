//! CSS Selector model, reading, matching and validation
//!
//! This module implements the subset of
//! [Selectors Level 4](https://www.w3.org/TR/selectors-4/) a browser
//! emulator needs in order to decide which rules apply to an element.
//!
//! - [`parser`] turns selector text into a [`SelectorList`]
//! - [`matching`] tests a selector against a node of a [`mimic_dom::DomTree`]
//! - [`nth`] implements the `An+B` microsyntax
//! - [`validate`] checks a parsed list against a [`SelectorLevel`]

pub mod matching;
pub mod nth;
pub mod parser;
pub mod validate;

use std::fmt;

use serde::Serialize;

pub use matching::{ElementState, MatchContext};
pub use nth::Nth;
pub use parser::{parse_selector, parse_selector_list};
pub use validate::{SelectorLevel, validate};

/// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeSelector {
    /// `[attr]` "Represents an element with the att attribute"
    Exists(String),
    /// `[attr=value]` exact value.
    Equals(String, String),
    /// `[attr~=value]` one of the whitespace-separated words.
    Includes(String, String),
    /// `[attr|=value]` exactly `value` or starting with `value-`.
    DashMatch(String, String),
    /// `[attr^=value]` prefix.
    PrefixMatch(String, String),
    /// `[attr$=value]` suffix.
    SuffixMatch(String, String),
    /// `[attr*=value]` substring.
    SubstringMatch(String, String),
}

impl AttributeSelector {
    /// The attribute name being tested.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Exists(name)
            | Self::Equals(name, _)
            | Self::Includes(name, _)
            | Self::DashMatch(name, _)
            | Self::PrefixMatch(name, _)
            | Self::SuffixMatch(name, _)
            | Self::SubstringMatch(name, _) => name,
        }
    }

    /// Whether this uses one of the level 3 substring operators.
    #[must_use]
    pub const fn is_substring_operator(&self) -> bool {
        matches!(
            self,
            Self::PrefixMatch(..) | Self::SuffixMatch(..) | Self::SubstringMatch(..)
        )
    }
}

/// Which sibling count an `:nth-*()` pseudo-class uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NthKind {
    /// `:nth-child()`
    Child,
    /// `:nth-last-child()`
    LastChild,
    /// `:nth-of-type()`
    OfType,
    /// `:nth-last-of-type()`
    LastOfType,
}

impl NthKind {
    /// The pseudo-class name without the colon.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Child => "nth-child",
            Self::LastChild => "nth-last-child",
            Self::OfType => "nth-of-type",
            Self::LastOfType => "nth-last-of-type",
        }
    }
}

/// [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoClass {
    /// `:root`
    Root,
    /// `:first-child`
    FirstChild,
    /// `:last-child`
    LastChild,
    /// `:only-child`
    OnlyChild,
    /// `:first-of-type`
    FirstOfType,
    /// `:last-of-type`
    LastOfType,
    /// `:only-of-type`
    OnlyOfType,
    /// `:nth-child()` and friends.
    ///
    /// `formula` is `None` when the argument could not be read; such a
    /// selector never matches and fails validation.
    Nth {
        /// Which sibling count to use.
        kind: NthKind,
        /// The parsed formula.
        formula: Option<Nth>,
        /// The raw argument text.
        argument: String,
    },
    /// `:empty`
    Empty,
    /// `:checked`
    Checked,
    /// `:disabled`
    Disabled,
    /// `:enabled`
    Enabled,
    /// `:required`
    Required,
    /// `:optional`
    Optional,
    /// `:valid`
    Valid,
    /// `:invalid`
    Invalid,
    /// `:focus`
    Focus,
    /// `:focus-within`
    FocusWithin,
    /// `:hover`
    Hover,
    /// `:active`
    Active,
    /// `:target`
    Target,
    /// `:link`
    Link,
    /// `:any-link`
    AnyLink,
    /// `:visited`
    Visited,
    /// `:read-only`
    ReadOnly,
    /// `:read-write`
    ReadWrite,
    /// `:indeterminate`
    Indeterminate,
    /// `:placeholder-shown`
    PlaceholderShown,
    /// A pseudo-class this engine does not know. Never matches.
    Unknown(String),
}

impl PseudoClass {
    /// Map a lower-cased name without arguments to a pseudo-class.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "root" => Self::Root,
            "first-child" => Self::FirstChild,
            "last-child" => Self::LastChild,
            "only-child" => Self::OnlyChild,
            "first-of-type" => Self::FirstOfType,
            "last-of-type" => Self::LastOfType,
            "only-of-type" => Self::OnlyOfType,
            "empty" => Self::Empty,
            "checked" => Self::Checked,
            "disabled" => Self::Disabled,
            "enabled" => Self::Enabled,
            "required" => Self::Required,
            "optional" => Self::Optional,
            "valid" => Self::Valid,
            "invalid" => Self::Invalid,
            "focus" => Self::Focus,
            "focus-within" => Self::FocusWithin,
            "hover" => Self::Hover,
            "active" => Self::Active,
            "target" => Self::Target,
            "link" => Self::Link,
            "any-link" => Self::AnyLink,
            "visited" => Self::Visited,
            "read-only" => Self::ReadOnly,
            "read-write" => Self::ReadWrite,
            "indeterminate" => Self::Indeterminate,
            "placeholder-shown" => Self::PlaceholderShown,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// The pseudo-class name without the colon or arguments.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Root => "root",
            Self::FirstChild => "first-child",
            Self::LastChild => "last-child",
            Self::OnlyChild => "only-child",
            Self::FirstOfType => "first-of-type",
            Self::LastOfType => "last-of-type",
            Self::OnlyOfType => "only-of-type",
            Self::Nth { kind, .. } => kind.name(),
            Self::Empty => "empty",
            Self::Checked => "checked",
            Self::Disabled => "disabled",
            Self::Enabled => "enabled",
            Self::Required => "required",
            Self::Optional => "optional",
            Self::Valid => "valid",
            Self::Invalid => "invalid",
            Self::Focus => "focus",
            Self::FocusWithin => "focus-within",
            Self::Hover => "hover",
            Self::Active => "active",
            Self::Target => "target",
            Self::Link => "link",
            Self::AnyLink => "any-link",
            Self::Visited => "visited",
            Self::ReadOnly => "read-only",
            Self::ReadWrite => "read-write",
            Self::Indeterminate => "indeterminate",
            Self::PlaceholderShown => "placeholder-shown",
            Self::Unknown(name) => name,
        }
    }
}

/// One condition of a compound selector other than its element name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// `#id`
    Id(String),
    /// `.class`
    Class(String),
    /// `[attr...]`
    Attribute(AttributeSelector),
    /// `:lang(xx)`
    Lang(String),
    /// `:not(list)`
    Not(SelectorList),
    /// Any other pseudo-class.
    PseudoClass(PseudoClass),
}

/// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
///
/// "A compound selector is a sequence of simple selectors that are not
/// separated by a combinator, and represents a set of simultaneous
/// conditions on a single element."
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompoundSelector {
    /// Type selector; `None` for `*` or an implied universal selector.
    pub element: Option<String>,
    /// Id, class, attribute and pseudo-class conditions.
    pub conditions: Vec<Condition>,
    /// Pseudo-element name without colons, lower-cased (`before`, `after`).
    pub pseudo_element: Option<String>,
}

impl CompoundSelector {
    /// True if nothing at all constrains the element.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.element.is_none() && self.conditions.is_empty() && self.pseudo_element.is_none()
    }

    /// The single class this compound is keyed on, if it is exactly `.name`.
    #[must_use]
    pub fn single_class(&self) -> Option<&str> {
        match self.conditions.as_slice() {
            [Condition::Class(class)] if self.element.is_none() => Some(class),
            _ => None,
        }
    }
}

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `A B`
    Descendant,
    /// `A > B`; A must be an element, never the document or a fragment.
    Child,
    /// `A + B`
    NextSibling,
    /// `A ~ B`
    SubsequentSibling,
}

/// [§ 4.3 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
///
/// Example: `div.container > ul.nav li`
/// ```text
/// [div.container] --(Child)--> [ul.nav] --(Descendant)--> [li]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    /// The rightmost compound selector.
    pub subject: CompoundSelector,

    /// Chain of (combinator, compound) pairs going left from the subject.
    ///
    /// For `A > B C`: subject C, combinators `[(Descendant, B), (Child, A)]`.
    pub combinators: Vec<(Combinator, CompoundSelector)>,
}

/// A comma-separated group of complex selectors.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectorList(pub Vec<ComplexSelector>);

impl SelectorList {
    /// The complex selectors in source order.
    #[must_use]
    pub fn selectors(&self) -> &[ComplexSelector] {
        &self.0
    }
}

/// Which part of the cascade a declaration came from.
///
/// Compared before the selector counts, so a built-in default always
/// loses to any stylesheet rule and the style attribute beats both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    /// Browser built-in defaults seeded per element kind.
    #[default]
    BuiltIn,
    /// A stylesheet rule.
    Rule,
    /// The element's `style` attribute.
    StyleAttribute,
}

/// [§ 17 Calculating Specificity](https://www.w3.org/TR/selectors-4/#specificity-rules)
/// "count the number of ID selectors in the selector (= A)
///  count the number of class selectors, attributes selectors, and
///  pseudo-classes in the selector (= B)
///  count the number of type selectors and pseudo-elements in the selector (= C)"
///
/// Field order gives the derived ordering: origin first, then A, B, C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Specificity {
    /// Cascade origin.
    pub origin: Origin,
    /// A
    pub ids: u32,
    /// B
    pub classes: u32,
    /// C
    pub types: u32,
}

impl Specificity {
    /// Built-in default declarations.
    pub const BUILT_IN: Self = Self {
        origin: Origin::BuiltIn,
        ids: 0,
        classes: 0,
        types: 0,
    };

    /// The element's own `style` attribute.
    pub const STYLE_ATTRIBUTE: Self = Self {
        origin: Origin::StyleAttribute,
        ids: 0,
        classes: 0,
        types: 0,
    };

    /// A stylesheet rule with (A, B, C) counts.
    #[must_use]
    pub const fn new(ids: u32, classes: u32, types: u32) -> Self {
        Self {
            origin: Origin::Rule,
            ids,
            classes,
            types,
        }
    }

    const fn add(self, other: Self) -> Self {
        Self {
            origin: self.origin,
            ids: self.ids + other.ids,
            classes: self.classes + other.classes,
            types: self.types + other.types,
        }
    }
}

impl ComplexSelector {
    /// [§ 17](https://www.w3.org/TR/selectors-4/#specificity-rules)
    #[must_use]
    pub fn specificity(&self) -> Specificity {
        self.combinators
            .iter()
            .fold(compound_specificity(&self.subject), |acc, (_, compound)| {
                acc.add(compound_specificity(compound))
            })
    }

    /// Compounds from the subject leftwards.
    pub fn compounds(&self) -> impl Iterator<Item = &CompoundSelector> {
        std::iter::once(&self.subject).chain(self.combinators.iter().map(|(_, c)| c))
    }
}

fn compound_specificity(compound: &CompoundSelector) -> Specificity {
    let mut spec = Specificity::new(0, 0, 0);
    if compound.element.is_some() {
        spec.types += 1;
    }
    if compound.pseudo_element.is_some() {
        spec.types += 1;
    }
    for condition in &compound.conditions {
        match condition {
            Condition::Id(_) => spec.ids += 1,
            // "The specificity of a :not() pseudo-class is replaced by the
            // specificity of the most specific complex selector in its
            // selector list argument."
            Condition::Not(list) => {
                if let Some(max) = list.0.iter().map(ComplexSelector::specificity).max() {
                    spec = spec.add(max);
                }
            }
            Condition::Class(_)
            | Condition::Attribute(_)
            | Condition::Lang(_)
            | Condition::PseudoClass(_) => spec.classes += 1,
        }
    }
    spec
}

// Serialization back to selector text, used for diagnostics and `matching_rules`.

impl fmt::Display for AttributeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, op, value) = match self {
            Self::Exists(name) => return write!(f, "[{name}]"),
            Self::Equals(n, v) => (n, "=", v),
            Self::Includes(n, v) => (n, "~=", v),
            Self::DashMatch(n, v) => (n, "|=", v),
            Self::PrefixMatch(n, v) => (n, "^=", v),
            Self::SuffixMatch(n, v) => (n, "$=", v),
            Self::SubstringMatch(n, v) => (n, "*=", v),
        };
        write!(f, "[{name}{op}\"{value}\"]")
    }
}

impl fmt::Display for CompoundSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.element {
            Some(name) => f.write_str(name)?,
            None if self.conditions.is_empty() && self.pseudo_element.is_none() => {
                f.write_str("*")?;
            }
            None => {}
        }
        for condition in &self.conditions {
            match condition {
                Condition::Id(id) => write!(f, "#{id}")?,
                Condition::Class(class) => write!(f, ".{class}")?,
                Condition::Attribute(attr) => write!(f, "{attr}")?,
                Condition::Lang(lang) => write!(f, ":lang({lang})")?,
                Condition::Not(list) => write!(f, ":not({list})")?,
                Condition::PseudoClass(PseudoClass::Nth { kind, argument, .. }) => {
                    write!(f, ":{}({argument})", kind.name())?;
                }
                Condition::PseudoClass(pc) => write!(f, ":{}", pc.name())?,
            }
        }
        if let Some(pseudo) = &self.pseudo_element {
            write!(f, "::{pseudo}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ComplexSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (combinator, compound) in self.combinators.iter().rev() {
            let sep = match combinator {
                Combinator::Descendant => " ",
                Combinator::Child => " > ",
                Combinator::NextSibling => " + ",
                Combinator::SubsequentSibling => " ~ ",
            };
            write!(f, "{compound}{sep}")?;
        }
        write!(f, "{}", self.subject)
    }
}

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, selector) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{selector}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec_of(text: &str) -> Specificity {
        parse_selector(text).unwrap().specificity()
    }

    #[test]
    fn test_specificity_counts() {
        assert_eq!(spec_of("div"), Specificity::new(0, 0, 1));
        assert_eq!(spec_of(".a.b"), Specificity::new(0, 2, 0));
        assert_eq!(spec_of("#x div.y:first-child"), Specificity::new(1, 2, 1));
        assert_eq!(spec_of("p::before"), Specificity::new(0, 0, 2));
        assert_eq!(spec_of("*"), Specificity::new(0, 0, 0));
    }

    #[test]
    fn test_not_takes_most_specific_argument() {
        assert_eq!(spec_of("div:not(.a, #b)"), Specificity::new(1, 0, 1));
    }

    #[test]
    fn test_origin_dominates_counts() {
        assert!(Specificity::BUILT_IN < Specificity::new(0, 0, 0));
        assert!(Specificity::new(9, 9, 9) < Specificity::STYLE_ATTRIBUTE);
    }

    #[test]
    fn test_display_round_trips_shape() {
        let list = parse_selector_list("ul > li.a:nth-child(2n+1), a[href^='http']").unwrap();
        assert_eq!(
            list.to_string(),
            "ul > li.a:nth-child(2n+1), a[href^=\"http\"]"
        );
    }
}
