//! Parsed stylesheet model.
//!
//! Stylesheets arrive already parsed; this module only defines the shape
//! the engine consumes, plus two small readers it needs on its own: the
//! declaration-block reader (for `style` attributes and `set_text`) and
//! the selector reader re-exported from [`crate::selector`].

use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::Serialize;

use crate::error::SelectorError;
use crate::index::RuleIndex;
use crate::selector::{SelectorList, parse_selector_list};

/// [§ 2.1 Declarations](https://www.w3.org/TR/css-syntax-3/#declaration)
///
/// A single `name: value [!important]` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    /// Property name, lower-cased (custom properties keep their case).
    pub name: String,
    /// Value text with `!important` stripped.
    pub value: String,
    /// Whether `!important` was present.
    pub important: bool,
}

impl Declaration {
    /// Create a declaration.
    #[must_use]
    pub fn new(name: &str, value: &str, important: bool) -> Self {
        Self {
            name: normalize_name(name),
            value: value.trim().to_string(),
            important,
        }
    }
}

fn normalize_name(name: &str) -> String {
    let name = name.trim();
    if name.starts_with("--") {
        name.to_string()
    } else {
        name.to_ascii_lowercase()
    }
}

/// An ordered list of declarations, as found between `{` and `}` or in a
/// `style` attribute.
///
/// Several declarations may share a name; the effective one is the last
/// `!important` declaration if there is one, otherwise the last one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclarationBlock {
    declarations: Vec<Declaration>,
}

impl DeclarationBlock {
    /// An empty block.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a block from `name: value; ...` text.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self {
            declarations: parse_declarations(text),
        }
    }

    /// All declarations in source order, duplicates included.
    #[must_use]
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    /// The winning declaration per name, in order of first appearance.
    #[must_use]
    pub fn effective(&self) -> Vec<&Declaration> {
        let mut winners: Vec<&Declaration> = Vec::new();
        for decl in &self.declarations {
            match winners.iter_mut().find(|w| w.name == decl.name) {
                Some(winner) => {
                    if decl.important || !winner.important {
                        *winner = decl;
                    }
                }
                None => winners.push(decl),
            }
        }
        winners
    }

    /// The winning declaration for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Declaration> {
        let name = normalize_name(name);
        self.effective().into_iter().find(|d| d.name == name)
    }

    /// Replace every declaration named `name` with a single one at the
    /// position of the first. An empty value removes the property.
    pub fn set(&mut self, name: &str, value: &str, important: bool) {
        let decl = Declaration::new(name, value, important);
        if decl.value.is_empty() {
            let _ = self.remove(name);
            return;
        }
        match self.declarations.iter().position(|d| d.name == decl.name) {
            Some(first) => {
                let name = decl.name.clone();
                self.declarations[first] = decl;
                let mut index = 0;
                self.declarations.retain(|d| {
                    let keep = index <= first || d.name != name;
                    index += 1;
                    keep
                });
            }
            None => self.declarations.push(decl),
        }
    }

    /// Remove every declaration named `name`, returning the one that was
    /// effective.
    pub fn remove(&mut self, name: &str) -> Option<Declaration> {
        let removed = self.get(name).cloned();
        let name = normalize_name(name);
        self.declarations.retain(|d| d.name != name);
        removed
    }

    /// Number of distinct property names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.effective().len()
    }

    /// Whether the block has no declarations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Serialize as `name: value; other: value !important;`.
    #[must_use]
    pub fn to_css_text(&self) -> String {
        self.effective()
            .iter()
            .map(|d| {
                if d.important {
                    format!("{}: {} !important;", d.name, d.value)
                } else {
                    format!("{}: {};", d.name, d.value)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for DeclarationBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css_text())
    }
}

fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

/// [§ 5.4.5 Consume a list of declarations](https://www.w3.org/TR/css-syntax-3/#consume-list-of-declarations)
///
/// Split on `;` outside parentheses and quotes, then on the first `:`.
/// Entries without a name or a value are dropped.
#[must_use]
pub fn parse_declarations(text: &str) -> Vec<Declaration> {
    let text = strip_comments(text);
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = (depth - 1).max(0),
            (None, ';') if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);

    parts
        .into_iter()
        .filter_map(|part| {
            let (name, value) = part.split_once(':')?;
            let name = name.trim();
            let mut value = value.trim();
            let mut important = false;
            if let Some(bang) = value.rfind('!')
                && value[bang + 1..].trim().eq_ignore_ascii_case("important")
            {
                important = true;
                value = value[..bang].trim_end();
            }
            if name.is_empty() || value.is_empty() {
                return None;
            }
            Some(Declaration::new(name, value, important))
        })
        .collect()
}

/// [§ 6.4 Style rules](https://www.w3.org/TR/css-syntax-3/#style-rules)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    /// The prelude, read as a selector list.
    pub selectors: SelectorList,
    /// The rule's declarations.
    pub block: DeclarationBlock,
}

/// `@import url(...) media;` with the imported sheet if it has loaded.
#[derive(Debug, Clone)]
pub struct ImportRule {
    /// The import URL as written.
    pub href: String,
    /// Media list text; empty means all.
    pub media: String,
    /// The loaded sheet; `None` while loading or after a failure.
    pub sheet: Option<Arc<Stylesheet>>,
}

/// `@media list { rules }`
#[derive(Debug, Clone)]
pub struct MediaRule {
    /// Media list text.
    pub media: String,
    /// Nested rules.
    pub rules: Vec<Rule>,
}

/// A top-level or nested rule.
#[derive(Debug, Clone)]
pub enum Rule {
    /// A style rule.
    Style(StyleRule),
    /// An `@import` rule.
    Import(ImportRule),
    /// An `@media` block.
    Media(MediaRule),
}

impl Rule {
    /// Build a style rule from selector and declaration text.
    ///
    /// # Errors
    /// If the selector text cannot be read.
    pub fn style(selectors: &str, declarations: &str) -> Result<Self, SelectorError> {
        Ok(Self::Style(StyleRule {
            selectors: parse_selector_list(selectors)?,
            block: DeclarationBlock::parse(declarations),
        }))
    }

    /// Build an `@media` block.
    #[must_use]
    pub fn media(media: &str, rules: Vec<Self>) -> Self {
        Self::Media(MediaRule {
            media: media.trim().to_string(),
            rules,
        })
    }

    /// Build an `@import` rule.
    #[must_use]
    pub fn import(href: &str, media: &str, sheet: Option<Arc<Stylesheet>>) -> Self {
        Self::Import(ImportRule {
            href: href.to_string(),
            media: media.trim().to_string(),
            sheet,
        })
    }
}

/// A parsed stylesheet.
///
/// The rule index is built on the first match query and cached; adding a
/// rule through [`Stylesheet::push_rule`] discards it.
#[derive(Debug, Default)]
pub struct Stylesheet {
    href: Option<String>,
    media: String,
    disabled: bool,
    rules: Vec<Rule>,
    index: OnceLock<RuleIndex>,
}

impl Clone for Stylesheet {
    fn clone(&self) -> Self {
        Self {
            href: self.href.clone(),
            media: self.media.clone(),
            disabled: self.disabled,
            rules: self.rules.clone(),
            index: OnceLock::new(),
        }
    }
}

impl Stylesheet {
    /// An empty, enabled stylesheet applying to all media.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: where the sheet was loaded from.
    #[must_use]
    pub fn with_href(mut self, href: &str) -> Self {
        self.href = Some(href.to_string());
        self
    }

    /// Builder: the owner node's media list (`<link media=...>`).
    #[must_use]
    pub fn with_media(mut self, media: &str) -> Self {
        self.media = media.trim().to_string();
        self
    }

    /// Builder: append a style rule.
    ///
    /// # Errors
    /// If the selector text cannot be read.
    pub fn style_rule(mut self, selectors: &str, declarations: &str) -> Result<Self, SelectorError> {
        self.push_rule(Rule::style(selectors, declarations)?);
        Ok(self)
    }

    /// Builder: append an `@media` block.
    #[must_use]
    pub fn media_rule(mut self, media: &str, rules: Vec<Rule>) -> Self {
        self.push_rule(Rule::media(media, rules));
        self
    }

    /// Builder: append an `@import` rule.
    #[must_use]
    pub fn import_rule(mut self, href: &str, media: &str, sheet: Option<Arc<Self>>) -> Self {
        self.push_rule(Rule::import(href, media, sheet));
        self
    }

    /// Append a rule and drop the cached index.
    pub fn push_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
        self.index = OnceLock::new();
    }

    /// Enable or disable the whole sheet.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Whether the sheet is disabled.
    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// The sheet's own media list text.
    #[must_use]
    pub fn media(&self) -> &str {
        &self.media
    }

    /// The sheet's URL, if any.
    #[must_use]
    pub fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }

    /// Top-level rules in document order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The rule index, built on first use.
    pub fn index(&self) -> &RuleIndex {
        self.index.get_or_init(|| RuleIndex::build(&self.rules))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_declarations() {
        let decls = parse_declarations(
            "Color: red; background: url(a;b.png) no-repeat; width: 10px ! IMPORTANT; ; bogus",
        );
        assert_eq!(
            decls,
            vec![
                Declaration::new("color", "red", false),
                Declaration::new("background", "url(a;b.png) no-repeat", false),
                Declaration::new("width", "10px", true),
            ]
        );
    }

    #[test]
    fn test_comments_are_ignored() {
        let decls = parse_declarations("/* x */ color: /* y */ blue");
        assert_eq!(decls, vec![Declaration::new("color", "blue", false)]);
    }

    #[test]
    fn test_effective_prefers_important() {
        let block = DeclarationBlock::parse("color: red !important; color: blue; width: 1px; width: 2px");
        assert_eq!(block.get("color").map(|d| d.value.as_str()), Some("red"));
        assert_eq!(block.get("width").map(|d| d.value.as_str()), Some("2px"));
        assert_eq!(block.len(), 2);
        assert_eq!(block.to_css_text(), "color: red !important; width: 2px;");
    }

    #[test]
    fn test_set_and_remove_keep_order() {
        let mut block = DeclarationBlock::parse("color: red; width: 1px; color: green");
        block.set("color", "blue", false);
        assert_eq!(block.to_css_text(), "color: blue; width: 1px;");
        block.set("height", "3px", true);
        assert_eq!(block.to_css_text(), "color: blue; width: 1px; height: 3px !important;");
        assert_eq!(block.remove("width").map(|d| d.value), Some("1px".to_string()));
        block.set("color", "", false);
        assert_eq!(block.to_css_text(), "height: 3px !important;");
    }

    #[test]
    fn test_push_rule_resets_index() {
        let mut sheet = Stylesheet::new().style_rule("p", "color: red").unwrap();
        assert_eq!(sheet.index().len(), 1);
        sheet.push_rule(Rule::style("div, span", "color: blue").unwrap());
        assert_eq!(sheet.index().len(), 3);
    }
}
