//! Selector validation against the level a personality supports.
//!
//! Matching never fails; scripts calling `querySelector` need an
//! invalid selector to surface as an error instead, and which selectors
//! count as invalid depends on the browser being emulated.

use serde::Serialize;

use super::{
    AttributeSelector, Combinator, ComplexSelector, CompoundSelector, Condition, PseudoClass,
    SelectorList,
};
use crate::error::SelectorError;

/// Selector feature level, ordered oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SelectorLevel {
    /// CSS 2.1 selectors.
    Css2,
    /// Selectors Level 3.
    Css3,
    /// Selectors Level 4.
    Css4,
}

impl PseudoClass {
    /// The first selector level defining this pseudo-class, or `None` if
    /// it is unknown at every level.
    #[must_use]
    pub const fn introduced_in(&self) -> Option<SelectorLevel> {
        Some(match self {
            Self::FirstChild | Self::Link | Self::Visited | Self::Hover | Self::Active | Self::Focus => {
                SelectorLevel::Css2
            }
            Self::Root
            | Self::LastChild
            | Self::OnlyChild
            | Self::FirstOfType
            | Self::LastOfType
            | Self::OnlyOfType
            | Self::Nth { .. }
            | Self::Empty
            | Self::Checked
            | Self::Disabled
            | Self::Enabled
            | Self::Target
            | Self::Indeterminate
            | Self::Required
            | Self::Optional
            | Self::Valid
            | Self::Invalid => SelectorLevel::Css3,
            Self::FocusWithin
            | Self::AnyLink
            | Self::ReadOnly
            | Self::ReadWrite
            | Self::PlaceholderShown => SelectorLevel::Css4,
            Self::Unknown(_) => return None,
        })
    }
}

/// Check every selector of `list` against `level`.
///
/// # Errors
/// The first problem found, in source order.
pub fn validate(list: &SelectorList, level: SelectorLevel) -> Result<(), SelectorError> {
    list.0.iter().try_for_each(|selector| validate_complex(selector, level))
}

fn validate_complex(selector: &ComplexSelector, level: SelectorLevel) -> Result<(), SelectorError> {
    for (combinator, _) in &selector.combinators {
        if *combinator == Combinator::SubsequentSibling && level < SelectorLevel::Css3 {
            return Err(SelectorError::UnsupportedConstruct {
                construct: "~ combinator".to_string(),
                level,
            });
        }
    }
    // A pseudo-element is only allowed on the subject.
    if selector
        .combinators
        .iter()
        .any(|(_, compound)| compound.pseudo_element.is_some())
    {
        return Err(SelectorError::Syntax {
            selector: selector.to_string(),
            reason: "pseudo-element must be on the last compound".to_string(),
        });
    }
    selector
        .compounds()
        .try_for_each(|compound| validate_compound(compound, level))
}

fn validate_compound(compound: &CompoundSelector, level: SelectorLevel) -> Result<(), SelectorError> {
    for condition in &compound.conditions {
        match condition {
            Condition::Attribute(attr) if attr.is_substring_operator() && level < SelectorLevel::Css3 => {
                return Err(SelectorError::UnsupportedConstruct {
                    construct: attribute_operator(attr).to_string(),
                    level,
                });
            }
            Condition::Not(inner) => {
                if level < SelectorLevel::Css3 {
                    return Err(unsupported("not", level));
                }
                // Level 3 only allows a single simple selector inside :not().
                if level == SelectorLevel::Css3
                    && inner.0.iter().any(|s| !s.combinators.is_empty())
                {
                    return Err(SelectorError::UnsupportedConstruct {
                        construct: "complex selector inside :not()".to_string(),
                        level,
                    });
                }
                validate(inner, level)?;
            }
            Condition::PseudoClass(pseudo) => validate_pseudo_class(pseudo, level)?,
            _ => {}
        }
    }
    Ok(())
}

fn validate_pseudo_class(pseudo: &PseudoClass, level: SelectorLevel) -> Result<(), SelectorError> {
    match pseudo.introduced_in() {
        Some(introduced) if introduced <= level => {}
        _ => return Err(unsupported(pseudo.name(), level)),
    }
    if let PseudoClass::Nth {
        kind,
        formula: None,
        argument,
    } = pseudo
    {
        return Err(SelectorError::MalformedNth {
            name: kind.name().to_string(),
            argument: argument.clone(),
        });
    }
    Ok(())
}

fn unsupported(name: &str, level: SelectorLevel) -> SelectorError {
    SelectorError::UnsupportedPseudoClass {
        name: name.to_string(),
        level,
    }
}

const fn attribute_operator(attr: &AttributeSelector) -> &'static str {
    match attr {
        AttributeSelector::PrefixMatch(..) => "^= attribute operator",
        AttributeSelector::SuffixMatch(..) => "$= attribute operator",
        _ => "*= attribute operator",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::parse_selector_list;

    fn check(text: &str, level: SelectorLevel) -> Result<(), SelectorError> {
        validate(&parse_selector_list(text).unwrap(), level)
    }

    #[test]
    fn test_levels_gate_pseudo_classes() {
        assert!(check("a:hover", SelectorLevel::Css2).is_ok());
        assert!(check("li:last-child", SelectorLevel::Css2).is_err());
        assert!(check("li:last-child", SelectorLevel::Css3).is_ok());
        assert!(check("input:placeholder-shown", SelectorLevel::Css3).is_err());
        assert!(check("input:placeholder-shown", SelectorLevel::Css4).is_ok());
    }

    #[test]
    fn test_unknown_pseudo_class_is_invalid() {
        assert_eq!(
            check("a:bogus", SelectorLevel::Css4),
            Err(SelectorError::UnsupportedPseudoClass {
                name: "bogus".into(),
                level: SelectorLevel::Css4
            })
        );
    }

    #[test]
    fn test_malformed_nth() {
        assert!(matches!(
            check("li:nth-child(foo)", SelectorLevel::Css4),
            Err(SelectorError::MalformedNth { .. })
        ));
        assert!(check("li:nth-child(2n+1)", SelectorLevel::Css3).is_ok());
    }

    #[test]
    fn test_not_argument_rules() {
        assert!(check("p:not(.a)", SelectorLevel::Css3).is_ok());
        assert!(check("p:not(div .a)", SelectorLevel::Css3).is_err());
        assert!(check("p:not(div .a)", SelectorLevel::Css4).is_ok());
        assert!(check("p:not(:bogus)", SelectorLevel::Css4).is_err());
    }

    #[test]
    fn test_constructs_gated_at_css2() {
        assert!(check("h1 ~ p", SelectorLevel::Css2).is_err());
        assert!(check("a[href^=x]", SelectorLevel::Css2).is_err());
        assert!(check("a[href=x]", SelectorLevel::Css2).is_ok());
    }

    #[test]
    fn test_pseudo_element_only_on_subject() {
        assert!(check("p::before span", SelectorLevel::Css4).is_err());
    }
}
