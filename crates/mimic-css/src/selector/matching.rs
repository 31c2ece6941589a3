//! Selector matching against a [`DomTree`].
//!
//! [§ 4.1 Selector Matching](https://www.w3.org/TR/selectors-4/#match-a-selector-against-an-element)
//!
//! Matching walks right-to-left: the subject compound is tested against
//! the element, then each combinator moves to candidate elements for the
//! next compound, backtracking over descendant and sibling candidates.

use mimic_dom::{DomTree, ElementData, NodeId};

use super::{
    AttributeSelector, Combinator, ComplexSelector, CompoundSelector, Condition, NthKind,
    PseudoClass, SelectorList, Specificity,
};

/// Dynamic element state that user interaction would normally drive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementState {
    /// The focused element.
    pub focus: Option<NodeId>,
    /// The element under the pointer; its ancestors are hovered too.
    pub hover: Option<NodeId>,
    /// The element being activated; its ancestors are active too.
    pub active: Option<NodeId>,
    /// The document URL's fragment, without `#`.
    pub target: Option<String>,
}

/// Everything matching needs besides the selector and the element.
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    /// The document.
    pub tree: &'a DomTree,
    /// Interaction state.
    pub state: &'a ElementState,
    /// The pseudo-element being queried, normalized (`before`, `after`).
    pub pseudo_element: Option<&'a str>,
}

impl<'a> MatchContext<'a> {
    /// Context for the element itself (no pseudo-element).
    #[must_use]
    pub const fn new(tree: &'a DomTree, state: &'a ElementState) -> Self {
        Self {
            tree,
            state,
            pseudo_element: None,
        }
    }

    /// Same context, querying `pseudo` instead.
    #[must_use]
    pub const fn with_pseudo_element(self, pseudo: Option<&'a str>) -> Self {
        Self {
            pseudo_element: pseudo,
            ..self
        }
    }
}

/// `"::before"`, `":before"` and `"before"` all name the same
/// pseudo-element; an empty name means the element itself.
#[must_use]
pub fn normalize_pseudo_element(name: &str) -> Option<String> {
    let name = name.trim().trim_start_matches(':');
    if name.is_empty() {
        None
    } else {
        Some(name.to_ascii_lowercase())
    }
}

impl SelectorList {
    /// Whether any selector in the list matches.
    #[must_use]
    pub fn matches(&self, cx: &MatchContext<'_>, node: NodeId) -> bool {
        self.0.iter().any(|s| s.matches(cx, node))
    }

    /// Highest specificity among the matching selectors.
    #[must_use]
    pub fn matching_specificity(&self, cx: &MatchContext<'_>, node: NodeId) -> Option<Specificity> {
        self.0
            .iter()
            .filter(|s| s.matches(cx, node))
            .map(ComplexSelector::specificity)
            .max()
    }
}

impl ComplexSelector {
    /// Match against `node`, honoring the queried pseudo-element.
    ///
    /// A selector naming a pseudo-element only applies when exactly that
    /// pseudo-element is queried; a selector without one applies to the
    /// element and to all of its pseudo-elements.
    #[must_use]
    pub fn matches(&self, cx: &MatchContext<'_>, node: NodeId) -> bool {
        if let Some(pseudo) = &self.subject.pseudo_element
            && cx.pseudo_element != Some(pseudo.as_str())
        {
            return false;
        }
        compound_matches(&self.subject, cx, node) && matches_chain(&self.combinators, cx, node)
    }
}

fn matches_chain(chain: &[(Combinator, CompoundSelector)], cx: &MatchContext<'_>, node: NodeId) -> bool {
    let Some(((combinator, compound), rest)) = chain.split_first() else {
        return true;
    };
    if compound.pseudo_element.is_some() {
        return false;
    }
    let tree = cx.tree;
    let candidate_matches =
        |candidate: NodeId| compound_matches(compound, cx, candidate) && matches_chain(rest, cx, candidate);

    match combinator {
        Combinator::Descendant => {
            let mut current = tree.parent_element(node);
            while let Some(ancestor) = current {
                if candidate_matches(ancestor) {
                    return true;
                }
                current = tree.parent_element(ancestor);
            }
            false
        }
        // parent_element() is None for a document or fragment parent.
        Combinator::Child => tree.parent_element(node).is_some_and(candidate_matches),
        Combinator::NextSibling => tree.prev_element_sibling(node).is_some_and(candidate_matches),
        Combinator::SubsequentSibling => {
            let mut current = tree.prev_element_sibling(node);
            while let Some(sibling) = current {
                if candidate_matches(sibling) {
                    return true;
                }
                current = tree.prev_element_sibling(sibling);
            }
            false
        }
    }
}

fn compound_matches(compound: &CompoundSelector, cx: &MatchContext<'_>, node: NodeId) -> bool {
    let Some(element) = cx.tree.as_element(node) else {
        return false;
    };
    if let Some(name) = &compound.element {
        let same = if cx.tree.is_html() {
            element.local_name().eq_ignore_ascii_case(name)
        } else {
            element.local_name() == name
        };
        if !same {
            return false;
        }
    }
    compound
        .conditions
        .iter()
        .all(|condition| condition_matches(condition, cx, node, element))
}

fn condition_matches(
    condition: &Condition,
    cx: &MatchContext<'_>,
    node: NodeId,
    element: &ElementData,
) -> bool {
    match condition {
        Condition::Id(id) => element.id() == Some(id.as_str()),
        Condition::Class(class) => element.has_class(class),
        Condition::Attribute(attr) => attribute_matches(attr, cx.tree, element),
        Condition::Lang(lang) => lang_matches(cx.tree, node, lang),
        Condition::Not(list) => !list.matches(cx, node),
        Condition::PseudoClass(pseudo) => pseudo_class_matches(pseudo, cx, node, element),
    }
}

fn attribute_value<'e>(tree: &DomTree, element: &'e ElementData, name: &str) -> Option<&'e str> {
    if tree.is_html() {
        element.attribute(name)
    } else {
        element.attrs.get(name).map(String::as_str)
    }
}

fn attribute_matches(attr: &AttributeSelector, tree: &DomTree, element: &ElementData) -> bool {
    let Some(actual) = attribute_value(tree, element, attr.name()) else {
        return false;
    };
    match attr {
        AttributeSelector::Exists(_) => true,
        AttributeSelector::Equals(_, v) => actual == v,
        AttributeSelector::Includes(_, v) => {
            !v.is_empty() && actual.split_ascii_whitespace().any(|word| word == v)
        }
        AttributeSelector::DashMatch(_, v) => {
            actual == v || actual.strip_prefix(v.as_str()).is_some_and(|rest| rest.starts_with('-'))
        }
        AttributeSelector::PrefixMatch(_, v) => !v.is_empty() && actual.starts_with(v.as_str()),
        AttributeSelector::SuffixMatch(_, v) => !v.is_empty() && actual.ends_with(v.as_str()),
        AttributeSelector::SubstringMatch(_, v) => !v.is_empty() && actual.contains(v.as_str()),
    }
}

/// [§ 7.2 :lang()](https://www.w3.org/TR/selectors-4/#the-lang-pseudo)
///
/// The element's language comes from the nearest `lang` attribute on the
/// element or an ancestor.
fn lang_matches(tree: &DomTree, node: NodeId, lang: &str) -> bool {
    let declared = std::iter::once(node)
        .chain(tree.ancestors(node))
        .find_map(|id| tree.attribute(id, "lang"));
    declared.is_some_and(|value| {
        value.eq_ignore_ascii_case(lang)
            || (value.len() > lang.len()
                && value.is_char_boundary(lang.len())
                && value[..lang.len()].eq_ignore_ascii_case(lang)
                && value[lang.len()..].starts_with('-'))
    })
}

/// 1-based position among element siblings, optionally counting only
/// same-named ones, from the start or from the end.
fn sibling_index(tree: &DomTree, node: NodeId, of_type: bool, from_end: bool) -> i32 {
    let name = tree.local_name(node).unwrap_or_default();
    let same_kind = |sibling: NodeId| !of_type || tree.local_name(sibling) == Some(name);
    let mut index = 1;
    let mut current = if from_end {
        tree.next_element_sibling(node)
    } else {
        tree.prev_element_sibling(node)
    };
    while let Some(sibling) = current {
        if same_kind(sibling) {
            index += 1;
        }
        current = if from_end {
            tree.next_element_sibling(sibling)
        } else {
            tree.prev_element_sibling(sibling)
        };
    }
    index
}

fn is_form_control(name: &str) -> bool {
    matches!(
        name,
        "button" | "input" | "select" | "textarea" | "optgroup" | "option" | "fieldset"
    )
}

fn input_type(element: &ElementData) -> String {
    element
        .attribute("type")
        .unwrap_or("text")
        .trim()
        .to_ascii_lowercase()
}

/// Text-entry input types; the others are buttons, toggles or pickers.
fn is_text_input(element: &ElementData) -> bool {
    element.local_name().eq_ignore_ascii_case("input")
        && matches!(
            input_type(element).as_str(),
            "text" | "search" | "url" | "tel" | "email" | "password" | "number"
        )
}

fn is_checkable(element: &ElementData) -> bool {
    element.local_name().eq_ignore_ascii_case("input")
        && matches!(input_type(element).as_str(), "checkbox" | "radio")
}

fn control_value(tree: &DomTree, node: NodeId, element: &ElementData) -> String {
    if element.local_name().eq_ignore_ascii_case("textarea") {
        tree.text_content(node)
    } else {
        element.attribute("value").unwrap_or_default().to_string()
    }
}

/// [§ 4.1.3 Constraint validation](https://html.spec.whatwg.org/multipage/form-control-infrastructure.html#constraints)
///
/// `Some(valid)` for elements that take part in validation, `None` for
/// everything else.
fn validity(tree: &DomTree, node: NodeId) -> Option<bool> {
    let element = tree.as_element(node)?;
    let name = element.local_name().to_ascii_lowercase();
    match name.as_str() {
        "input" | "textarea" | "select" => {
            if element.has_attribute("disabled") {
                return Some(true);
            }
            let value = control_value(tree, node, element);
            if element.has_attribute("required") {
                let missing = if is_checkable(element) {
                    !element.has_attribute("checked")
                } else if name == "select" {
                    !tree.element_children(node).any(|opt| {
                        tree.as_element(opt).is_some_and(|o| {
                            o.has_attribute("selected")
                                && !o.attribute("value").is_some_and(str::is_empty)
                        })
                    })
                } else {
                    value.is_empty()
                };
                if missing {
                    return Some(false);
                }
            }
            if let Some(max) = element.attribute("maxlength").and_then(|m| m.trim().parse::<usize>().ok())
                && value.chars().count() > max
            {
                return Some(false);
            }
            if name == "input" && input_type(element) == "email" && !value.is_empty() {
                let valid = value
                    .split_once('@')
                    .is_some_and(|(user, host)| !user.is_empty() && !host.is_empty());
                return Some(valid);
            }
            Some(true)
        }
        "form" | "fieldset" => Some(
            descendants(tree, node)
                .filter_map(|d| validity(tree, d))
                .all(|valid| valid),
        ),
        _ => None,
    }
}

fn descendants(tree: &DomTree, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    let mut stack: Vec<NodeId> = tree.children(node).iter().rev().copied().collect();
    std::iter::from_fn(move || {
        let next = stack.pop()?;
        stack.extend(tree.children(next).iter().rev().copied());
        Some(next)
    })
}

fn is_self_or_ancestor_of(tree: &DomTree, node: NodeId, target: Option<NodeId>) -> bool {
    target.is_some_and(|t| t == node || tree.is_descendant_of(t, node))
}

fn is_read_write(element: &ElementData) -> bool {
    let editable_control = (is_text_input(element)
        || element.local_name().eq_ignore_ascii_case("textarea"))
        && !element.has_attribute("readonly")
        && !element.has_attribute("disabled");
    editable_control
        || element
            .attribute("contenteditable")
            .is_some_and(|v| v.is_empty() || v.eq_ignore_ascii_case("true"))
}

fn pseudo_class_matches(
    pseudo: &PseudoClass,
    cx: &MatchContext<'_>,
    node: NodeId,
    element: &ElementData,
) -> bool {
    let tree = cx.tree;
    let name = element.local_name().to_ascii_lowercase();
    match pseudo {
        // [§ 14.1 :root](https://www.w3.org/TR/selectors-4/#the-root-pseudo)
        PseudoClass::Root => tree.parent(node) == Some(NodeId::ROOT),

        // [§ 14.4 Child-indexed pseudo-classes](https://www.w3.org/TR/selectors-4/#child-index)
        PseudoClass::FirstChild => tree.prev_element_sibling(node).is_none(),
        PseudoClass::LastChild => tree.next_element_sibling(node).is_none(),
        PseudoClass::OnlyChild => {
            tree.prev_element_sibling(node).is_none() && tree.next_element_sibling(node).is_none()
        }
        PseudoClass::FirstOfType => sibling_index(tree, node, true, false) == 1,
        PseudoClass::LastOfType => sibling_index(tree, node, true, true) == 1,
        PseudoClass::OnlyOfType => {
            sibling_index(tree, node, true, false) == 1 && sibling_index(tree, node, true, true) == 1
        }
        PseudoClass::Nth { kind, formula, .. } => formula.is_some_and(|nth| {
            let index = match kind {
                NthKind::Child => sibling_index(tree, node, false, false),
                NthKind::LastChild => sibling_index(tree, node, false, true),
                NthKind::OfType => sibling_index(tree, node, true, false),
                NthKind::LastOfType => sibling_index(tree, node, true, true),
            };
            nth.matches(index)
        }),

        // [§ 14.2 :empty](https://www.w3.org/TR/selectors-4/#the-empty-pseudo)
        // Comments do not count; any text node does, even whitespace.
        PseudoClass::Empty => !tree
            .children(node)
            .iter()
            .any(|&c| tree.as_element(c).is_some() || tree.as_text(c).is_some()),

        // [§ 13 Input pseudo-classes](https://www.w3.org/TR/selectors-4/#input-pseudos)
        PseudoClass::Checked => {
            (is_checkable(element) && element.has_attribute("checked"))
                || (name == "option" && element.has_attribute("selected"))
        }
        PseudoClass::Disabled => is_form_control(&name) && element.has_attribute("disabled"),
        PseudoClass::Enabled => is_form_control(&name) && !element.has_attribute("disabled"),
        PseudoClass::Required => {
            matches!(name.as_str(), "input" | "select" | "textarea")
                && element.has_attribute("required")
        }
        PseudoClass::Optional => {
            matches!(name.as_str(), "input" | "select" | "textarea")
                && !element.has_attribute("required")
        }
        PseudoClass::Valid => validity(tree, node) == Some(true),
        PseudoClass::Invalid => validity(tree, node) == Some(false),
        PseudoClass::ReadWrite => is_read_write(element),
        PseudoClass::ReadOnly => !is_read_write(element),
        PseudoClass::Indeterminate => {
            (is_checkable(element) && element.has_attribute("indeterminate"))
                || (name == "progress" && !element.has_attribute("value"))
        }
        PseudoClass::PlaceholderShown => {
            (is_text_input(element) || name == "textarea")
                && element.attribute("placeholder").is_some_and(|p| !p.is_empty())
                && control_value(tree, node, element).is_empty()
        }

        // [§ 9 User action pseudo-classes](https://www.w3.org/TR/selectors-4/#useraction-pseudos)
        PseudoClass::Focus => cx.state.focus == Some(node),
        PseudoClass::FocusWithin => is_self_or_ancestor_of(tree, node, cx.state.focus),
        PseudoClass::Hover => is_self_or_ancestor_of(tree, node, cx.state.hover),
        PseudoClass::Active => is_self_or_ancestor_of(tree, node, cx.state.active),

        // [§ 8 Location pseudo-classes](https://www.w3.org/TR/selectors-4/#location)
        // Every link is treated as unvisited.
        PseudoClass::Link | PseudoClass::AnyLink => {
            matches!(name.as_str(), "a" | "area" | "link") && element.has_attribute("href")
        }
        PseudoClass::Visited => false,
        PseudoClass::Target => cx
            .state
            .target
            .as_deref()
            .is_some_and(|fragment| !fragment.is_empty() && element.id() == Some(fragment)),

        PseudoClass::Unknown(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::parse_selector;

    fn element(tree: &mut DomTree, parent: NodeId, data: ElementData) -> NodeId {
        let id = tree.create_element(data);
        tree.append_child(parent, id);
        id
    }

    fn matches(tree: &DomTree, selector: &str, node: NodeId) -> bool {
        let state = ElementState::default();
        parse_selector(selector)
            .unwrap()
            .matches(&MatchContext::new(tree, &state), node)
    }

    #[test]
    fn test_descendant_backtracks() {
        // <div class=a><div class=b><div class=b><p>
        let mut tree = DomTree::new();
        let a = element(&mut tree, NodeId::ROOT, ElementData::new("div").with_attr("class", "a"));
        let b1 = element(&mut tree, a, ElementData::new("div").with_attr("class", "b"));
        let b2 = element(&mut tree, b1, ElementData::new("div").with_attr("class", "b"));
        let p = element(&mut tree, b2, ElementData::new("p"));
        assert!(matches(&tree, ".a > .b p", p));
        assert!(!matches(&tree, ".a > .a p", p));
    }

    #[test]
    fn test_child_of_document_is_not_matched() {
        let mut tree = DomTree::new();
        let html = element(&mut tree, NodeId::ROOT, ElementData::new("html"));
        assert!(!matches(&tree, "* > html", html));
        assert!(matches(&tree, "html:root", html));
    }

    #[test]
    fn test_type_case_depends_on_document() {
        let mut html = DomTree::new();
        let div = element(&mut html, NodeId::ROOT, ElementData::new("DIV"));
        assert!(matches(&html, "div", div));

        let mut xml = DomTree::new_xml();
        let item = element(&mut xml, NodeId::ROOT, ElementData::new("Item"));
        assert!(!matches(&xml, "item", item));
        assert!(matches(&xml, "Item", item));
    }

    #[test]
    fn test_empty_counts_whitespace_text() {
        let mut tree = DomTree::new();
        let a = element(&mut tree, NodeId::ROOT, ElementData::new("div"));
        let b = element(&mut tree, NodeId::ROOT, ElementData::new("div"));
        let space = tree.create_text(" ");
        tree.append_child(b, space);
        assert!(matches(&tree, "div:empty", a));
        assert!(!matches(&tree, "div:empty", b));
    }

    #[test]
    fn test_lang_inherits() {
        let mut tree = DomTree::new();
        let html = element(&mut tree, NodeId::ROOT, ElementData::new("html").with_attr("lang", "en-US"));
        let p = element(&mut tree, html, ElementData::new("p"));
        assert!(matches(&tree, "p:lang(en)", p));
        assert!(!matches(&tree, "p:lang(fr)", p));
    }

    #[test]
    fn test_form_state() {
        let mut tree = DomTree::new();
        let form = element(&mut tree, NodeId::ROOT, ElementData::new("form"));
        let required = element(
            &mut tree,
            form,
            ElementData::new("input").with_attr("required", ""),
        );
        let checked = element(
            &mut tree,
            form,
            ElementData::new("input")
                .with_attr("type", "checkbox")
                .with_attr("checked", ""),
        );
        assert!(matches(&tree, "input:invalid", required));
        assert!(matches(&tree, "form:invalid", form));
        assert!(matches(&tree, ":checked", checked));
        assert!(matches(&tree, "input:read-write", required));
        assert!(matches(&tree, "input:read-only", checked));
    }

    #[test]
    fn test_pseudo_element_queries() {
        let mut tree = DomTree::new();
        let p = element(&mut tree, NodeId::ROOT, ElementData::new("p"));
        let state = ElementState::default();
        let plain = MatchContext::new(&tree, &state);
        let before = plain.with_pseudo_element(Some("before"));
        let sel = parse_selector("p::before").unwrap();
        assert!(!sel.matches(&plain, p));
        assert!(sel.matches(&before, p));
        assert!(!sel.matches(&plain.with_pseudo_element(Some("after")), p));
        assert!(parse_selector("p").unwrap().matches(&before, p));
    }

    #[test]
    fn test_normalize_pseudo_element() {
        assert_eq!(normalize_pseudo_element("::Before").as_deref(), Some("before"));
        assert_eq!(normalize_pseudo_element(":after").as_deref(), Some("after"));
        assert_eq!(normalize_pseudo_element(""), None);
    }
}
