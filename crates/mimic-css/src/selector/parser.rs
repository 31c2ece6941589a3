//! Reading selector text into a [`SelectorList`].
//!
//! [§ 4 Selector syntax](https://www.w3.org/TR/selectors-4/#syntax)
//!
//! The reader is a single left-to-right pass over the characters, in the
//! same spirit as the CSS tokenizer's consume-a-token loop: simple
//! selectors accumulate into the current compound, and a combinator
//! flushes it.

use std::iter::Peekable;
use std::str::Chars;

use super::{
    AttributeSelector, Combinator, ComplexSelector, CompoundSelector, Condition, Nth, NthKind,
    PseudoClass, SelectorList,
};
use crate::error::SelectorError;

/// Pseudo-elements that may be written with a single colon.
const LEGACY_PSEUDO_ELEMENTS: [&str; 4] = ["before", "after", "first-line", "first-letter"];

/// Check if a character can start an identifier.
/// [§ 4.3.10 ident-start code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
const fn is_ident_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// Check if a character can continue an identifier.
/// [§ 4.3.9 ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
const fn is_ident_char(c: char) -> bool {
    is_ident_start_char(c) || c.is_ascii_digit() || c == '-'
}

fn syntax(selector: &str, reason: &str) -> SelectorError {
    SelectorError::Syntax {
        selector: selector.to_string(),
        reason: reason.to_string(),
    }
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while chars.peek().is_some_and(char::is_ascii_whitespace) {
        let _ = chars.next();
    }
}

fn consume_ident(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut ident = String::new();
    while let Some(&ch) = chars.peek() {
        if !is_ident_char(ch) {
            break;
        }
        ident.push(ch);
        let _ = chars.next();
    }
    ident
}

/// Split on `separator` outside parentheses, brackets and quotes.
fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth -= 1,
            (None, _) if c == separator && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Parse an attribute value inside `[attr=value]`.
/// Handles both quoted (`"val"`, `'val'`) and unquoted ident values.
fn parse_attr_value(chars: &mut Peekable<Chars<'_>>) -> Option<String> {
    skip_whitespace(chars);

    match chars.peek().copied() {
        Some(q @ ('"' | '\'')) => {
            let _ = chars.next();
            let mut val = String::new();
            for ch in chars.by_ref() {
                if ch == q {
                    return Some(val);
                }
                val.push(ch);
            }
            None // unterminated string
        }
        Some(_) => {
            let mut val = String::new();
            while let Some(&ch) = chars.peek() {
                if !(is_ident_char(ch) || ch == '.') {
                    break;
                }
                val.push(ch);
                let _ = chars.next();
            }
            if val.is_empty() { None } else { Some(val) }
        }
        None => None,
    }
}

/// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// Called after the opening `[` has been consumed.
fn parse_attribute(
    raw: &str,
    chars: &mut Peekable<Chars<'_>>,
) -> Result<AttributeSelector, SelectorError> {
    skip_whitespace(chars);
    let name = consume_ident(chars);
    if name.is_empty() {
        return Err(syntax(raw, "expected attribute name"));
    }
    skip_whitespace(chars);

    let op = match chars.next() {
        Some(']') => return Ok(AttributeSelector::Exists(name)),
        Some('=') => '=',
        Some(c @ ('~' | '|' | '^' | '$' | '*')) => {
            if chars.next() != Some('=') {
                return Err(syntax(raw, "expected '=' in attribute selector"));
            }
            c
        }
        _ => return Err(syntax(raw, "malformed attribute selector")),
    };

    let value =
        parse_attr_value(chars).ok_or_else(|| syntax(raw, "expected attribute value"))?;
    skip_whitespace(chars);
    // [§ 6.3 Case-sensitivity](https://www.w3.org/TR/selectors-4/#attribute-case)
    // The `i`/`s` flags are accepted and ignored.
    if chars.peek().is_some_and(|c| matches!(c, 'i' | 'I' | 's' | 'S')) {
        let _ = chars.next();
        skip_whitespace(chars);
    }
    if chars.next() != Some(']') {
        return Err(syntax(raw, "unterminated attribute selector"));
    }

    Ok(match op {
        '~' => AttributeSelector::Includes(name, value),
        '|' => AttributeSelector::DashMatch(name, value),
        '^' => AttributeSelector::PrefixMatch(name, value),
        '$' => AttributeSelector::SuffixMatch(name, value),
        '*' => AttributeSelector::SubstringMatch(name, value),
        _ => AttributeSelector::Equals(name, value),
    })
}

/// Consume a balanced `( ... )` argument; the opening paren must be next.
fn consume_arguments(raw: &str, chars: &mut Peekable<Chars<'_>>) -> Result<String, SelectorError> {
    let _ = chars.next();
    let mut depth = 1u32;
    let mut argument = String::new();
    for ch in chars.by_ref() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(argument.trim().to_string());
                }
            }
            _ => {}
        }
        argument.push(ch);
    }
    Err(syntax(raw, "unbalanced parentheses"))
}

/// [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
/// [§ 11 Pseudo-elements](https://www.w3.org/TR/selectors-4/#pseudo-elements)
///
/// Called after the first `:` has been consumed.
fn parse_pseudo(
    raw: &str,
    chars: &mut Peekable<Chars<'_>>,
    compound: &mut CompoundSelector,
) -> Result<(), SelectorError> {
    let double_colon = chars.peek() == Some(&':');
    if double_colon {
        let _ = chars.next();
    }

    let name = consume_ident(chars).to_ascii_lowercase();
    if name.is_empty() {
        return Err(syntax(raw, "expected pseudo-class name"));
    }
    let argument = if chars.peek() == Some(&'(') {
        Some(consume_arguments(raw, chars)?)
    } else {
        None
    };

    if double_colon || (argument.is_none() && LEGACY_PSEUDO_ELEMENTS.contains(&name.as_str())) {
        if compound.pseudo_element.is_some() {
            return Err(syntax(raw, "more than one pseudo-element"));
        }
        compound.pseudo_element = Some(name);
        return Ok(());
    }

    let condition = match (name.as_str(), argument) {
        ("not", Some(argument)) => Condition::Not(parse_selector_list(&argument)?),
        ("lang", Some(argument)) => {
            let lang = argument.trim_matches(|c| c == '"' || c == '\'').trim();
            if lang.is_empty() {
                return Err(syntax(raw, "empty :lang() argument"));
            }
            Condition::Lang(lang.to_string())
        }
        (nth @ ("nth-child" | "nth-last-child" | "nth-of-type" | "nth-last-of-type"), Some(argument)) => {
            let kind = match nth {
                "nth-child" => NthKind::Child,
                "nth-last-child" => NthKind::LastChild,
                "nth-of-type" => NthKind::OfType,
                _ => NthKind::LastOfType,
            };
            Condition::PseudoClass(PseudoClass::Nth {
                kind,
                formula: Nth::parse(&argument),
                argument,
            })
        }
        (_, Some(_)) => Condition::PseudoClass(PseudoClass::Unknown(name.clone())),
        (_, None) => Condition::PseudoClass(PseudoClass::from_name(&name)),
    };
    compound.conditions.push(condition);
    Ok(())
}

/// Parse a comma-separated selector group.
///
/// # Errors
/// [`SelectorError::Syntax`] if any member cannot be read.
pub fn parse_selector_list(raw: &str) -> Result<SelectorList, SelectorError> {
    if raw.trim().is_empty() {
        return Err(syntax(raw, "empty selector"));
    }
    split_top_level(raw, ',')
        .into_iter()
        .map(parse_selector)
        .collect::<Result<Vec<_>, _>>()
        .map(SelectorList)
}

/// Parse a single complex selector.
///
/// Supports type, universal, class, id and attribute selectors,
/// pseudo-classes (with `:not()`, `:lang()` and `:nth-*()` arguments),
/// pseudo-elements, and the four combinators.
///
/// # Errors
/// [`SelectorError::Syntax`] on anything that cannot be read. Unknown
/// pseudo-class names are *not* a syntax error here; they are kept as
/// [`PseudoClass::Unknown`] and rejected by validation.
pub fn parse_selector(raw: &str) -> Result<ComplexSelector, SelectorError> {
    /// Flush current compound selector into the compounds list.
    /// Returns true if a non-empty compound was flushed.
    fn flush_compound(
        universal: &mut bool,
        compound: &mut CompoundSelector,
        compounds: &mut Vec<CompoundSelector>,
    ) -> bool {
        if compound.is_empty() && !*universal {
            return false;
        }
        *universal = false;
        compounds.push(std::mem::take(compound));
        true
    }

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(syntax(raw, "empty selector"));
    }

    // Parse left-to-right, collecting compounds and the combinators between
    // them; reversed at the end so the subject comes first.
    let mut compounds: Vec<CompoundSelector> = Vec::new();
    let mut combinators_between: Vec<Combinator> = Vec::new();

    let mut chars = trimmed.chars().peekable();
    let mut current = CompoundSelector::default();
    // `*` leaves `element` at None but still makes the compound non-empty.
    let mut universal = false;

    while let Some(c) = chars.next() {
        if current.pseudo_element.is_some() && !matches!(c, ':' | ' ' | '\t' | '\n' | '\r' | '>' | '+' | '~') {
            return Err(syntax(raw, "unexpected input after pseudo-element"));
        }
        match c {
            '.' => {
                let class = consume_ident(&mut chars);
                if class.is_empty() {
                    return Err(syntax(raw, "expected class name after '.'"));
                }
                current.conditions.push(Condition::Class(class));
            }
            '#' => {
                let id = consume_ident(&mut chars);
                if id.is_empty() {
                    return Err(syntax(raw, "expected id after '#'"));
                }
                current.conditions.push(Condition::Id(id));
            }
            '*' => {
                if universal || current.element.is_some() || !current.conditions.is_empty() {
                    return Err(syntax(raw, "misplaced '*'"));
                }
                universal = true;
            }
            '[' => {
                let attr = parse_attribute(raw, &mut chars)?;
                current.conditions.push(Condition::Attribute(attr));
            }
            ':' => parse_pseudo(raw, &mut chars, &mut current)?,

            // [§ 16.1 Descendant combinator](https://www.w3.org/TR/selectors-4/#descendant-combinators)
            // Whitespace is a descendant combinator unless an explicit one follows.
            ' ' | '\t' | '\n' | '\r' => {
                skip_whitespace(&mut chars);
                match chars.peek() {
                    None | Some('>' | '+' | '~') => {}
                    Some(_) => {
                        if !flush_compound(&mut universal, &mut current, &mut compounds) {
                            return Err(syntax(raw, "combinator without left-hand side"));
                        }
                        combinators_between.push(Combinator::Descendant);
                    }
                }
            }

            '>' | '+' | '~' => {
                if !flush_compound(&mut universal, &mut current, &mut compounds) {
                    return Err(syntax(raw, "combinator without left-hand side"));
                }
                skip_whitespace(&mut chars);
                combinators_between.push(match c {
                    '>' => Combinator::Child,
                    '+' => Combinator::NextSibling,
                    _ => Combinator::SubsequentSibling,
                });
            }

            // [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
            _ if is_ident_start_char(c) || c == '-' => {
                if universal || current.element.is_some() || !current.conditions.is_empty() {
                    return Err(syntax(raw, "type selector must come first in a compound"));
                }
                let mut name = String::from(c);
                name.push_str(&consume_ident(&mut chars));
                current.element = Some(name);
            }

            other => {
                return Err(syntax(raw, &format!("unexpected character '{other}'")));
            }
        }
    }

    if !flush_compound(&mut universal, &mut current, &mut compounds)
        || compounds.len() != combinators_between.len() + 1
    {
        return Err(syntax(raw, "dangling combinator"));
    }

    let mut compounds = compounds.into_iter().rev();
    let subject = compounds
        .next()
        .ok_or_else(|| syntax(raw, "empty selector"))?;
    let combinators = combinators_between.into_iter().rev().zip(compounds).collect();

    Ok(ComplexSelector {
        subject,
        combinators,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_selectors() {
        let sel = parse_selector("div.note#main").unwrap();
        assert_eq!(sel.subject.element.as_deref(), Some("div"));
        assert_eq!(
            sel.subject.conditions,
            vec![
                Condition::Class("note".into()),
                Condition::Id("main".into())
            ]
        );
        assert!(sel.combinators.is_empty());
    }

    #[test]
    fn test_parse_combinator_chain_order() {
        let sel = parse_selector("div > ul li + a ~ b").unwrap();
        assert_eq!(sel.subject.element.as_deref(), Some("b"));
        let chain: Vec<_> = sel
            .combinators
            .iter()
            .map(|(comb, compound)| (*comb, compound.element.clone().unwrap()))
            .collect();
        assert_eq!(
            chain,
            vec![
                (Combinator::SubsequentSibling, "a".to_string()),
                (Combinator::NextSibling, "li".to_string()),
                (Combinator::Descendant, "ul".to_string()),
                (Combinator::Child, "div".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_attributes() {
        let sel = parse_selector("a[href^='http'][ data-x ][lang|=en i]").unwrap();
        assert_eq!(
            sel.subject.conditions,
            vec![
                Condition::Attribute(AttributeSelector::PrefixMatch("href".into(), "http".into())),
                Condition::Attribute(AttributeSelector::Exists("data-x".into())),
                Condition::Attribute(AttributeSelector::DashMatch("lang".into(), "en".into())),
            ]
        );
    }

    #[test]
    fn test_parse_pseudo_elements() {
        assert_eq!(
            parse_selector("p::before").unwrap().subject.pseudo_element.as_deref(),
            Some("before")
        );
        assert_eq!(
            parse_selector("p:after").unwrap().subject.pseudo_element.as_deref(),
            Some("after")
        );
        assert!(parse_selector("p::before.x").is_err());
    }

    #[test]
    fn test_parse_functional_pseudo_classes() {
        let sel = parse_selector("li:nth-child( 2n + 1 ):not(.a, #b):lang(fr)").unwrap();
        assert!(matches!(
            &sel.subject.conditions[0],
            Condition::PseudoClass(PseudoClass::Nth { formula: Some(_), .. })
        ));
        assert!(matches!(&sel.subject.conditions[1], Condition::Not(list) if list.0.len() == 2));
        assert_eq!(sel.subject.conditions[2], Condition::Lang("fr".into()));
    }

    #[test]
    fn test_unknown_pseudo_class_is_kept() {
        let sel = parse_selector("a:fancy").unwrap();
        assert_eq!(
            sel.subject.conditions,
            vec![Condition::PseudoClass(PseudoClass::Unknown("fancy".into()))]
        );
    }

    #[test]
    fn test_parse_errors() {
        for bad in ["", "> p", "div >", "a[", "a[href=", "p:", ".", "div..x", "a$b", "*div"] {
            assert!(parse_selector(bad).is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn test_list_split_respects_parens() {
        let list = parse_selector_list("a:not(.x, .y), b").unwrap();
        assert_eq!(list.0.len(), 2);
    }
}
