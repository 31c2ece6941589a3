//! Arena DOM tree consumed by the mimic style engine.
//!
//! The style engine never owns DOM nodes. It refers to them through
//! [`NodeId`] handles into a [`DomTree`], which exposes the narrow
//! capability set the cascade and the layout approximation need:
//! parent/sibling/child navigation, local names, attributes, attachment
//! state and text content.
//!
//! # Design
//!
//! All nodes live in one vector and every relationship is an index, so
//! computed styles can hold non-owning handles without lifetimes or
//! reference cycles.

use std::collections::HashMap;

/// Map of attribute names to values for an element.
pub type AttributesMap = HashMap<String, String>;

/// A type-safe index into the DOM tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The document node is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
///
/// "A document is said to be an XML document if its type is "xml";
/// otherwise an HTML document."
///
/// Type selectors compare names case-insensitively only in HTML documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentKind {
    /// An HTML document (ASCII case-insensitive element and attribute names).
    #[default]
    Html,
    /// An XML document (case-sensitive names).
    Xml,
}

/// A node in the arena.
#[derive(Debug, Clone)]
pub struct Node {
    /// What kind of node this is.
    pub node_type: NodeType,
    /// Parent node, `None` for the document and for detached nodes.
    pub parent: Option<NodeId>,
    /// Children in tree order.
    pub children: Vec<NodeId>,
    /// Next sibling in the parent's child list.
    pub next_sibling: Option<NodeId>,
    /// Previous sibling in the parent's child list.
    pub prev_sibling: Option<NodeId>,
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
#[derive(Debug, Clone)]
pub enum NodeType {
    /// The document node, root of every attached subtree.
    Document,
    /// [§ 4.7 Interface DocumentFragment](https://dom.spec.whatwg.org/#interface-documentfragment)
    ///
    /// A parentless container. Elements inside a fragment are not attached
    /// and a fragment never counts as a parent element for selectors.
    DocumentFragment,
    /// An element.
    Element(ElementData),
    /// A text node.
    Text(String),
    /// A comment node.
    Comment(String),
}

/// Element-specific data: local name and attribute list.
#[derive(Debug, Clone)]
pub struct ElementData {
    /// The element's local name as written by the parser.
    pub tag_name: String,
    /// The element's attributes.
    pub attrs: AttributesMap,
}

impl ElementData {
    /// Create element data with no attributes.
    #[must_use]
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_string(),
            attrs: AttributesMap::new(),
        }
    }

    /// Builder-style attribute setter.
    #[must_use]
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        let _ = self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    /// The element's local name.
    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.tag_name
    }

    /// Look up an attribute, falling back to an ASCII case-insensitive
    /// comparison of the name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        if let Some(value) = self.attrs.get(name) {
            return Some(value.as_str());
        }
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Whether the attribute is present.
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// The element's `id` attribute, if present.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    /// [§ 3.2.6 Global attributes](https://html.spec.whatwg.org/multipage/dom.html#global-attributes)
    ///
    /// "The class attribute, if specified, must have a value that is a set
    /// of space-separated tokens."
    ///
    /// Class names in attribute order with duplicates removed.
    #[must_use]
    pub fn class_list(&self) -> Vec<&str> {
        let mut classes: Vec<&str> = Vec::new();
        if let Some(list) = self.attribute("class") {
            for class in list.split_ascii_whitespace() {
                if !classes.contains(&class) {
                    classes.push(class);
                }
            }
        }
        classes
    }

    /// Whether the class list contains `class`.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|list| list.split_ascii_whitespace().any(|c| c == class))
    }
}

/// Elements whose text is never rendered.
const NON_RENDERED: &[&str] = &[
    "head", "script", "style", "template", "title", "noscript", "meta", "link",
];

/// Elements that start a new line in the visible text.
const LINE_BREAKING: &[&str] = &[
    "address", "blockquote", "div", "dl", "dt", "dd", "fieldset", "form", "h1", "h2", "h3",
    "h4", "h5", "h6", "hr", "li", "ol", "p", "pre", "section", "table", "tr", "ul",
];

/// Arena-based DOM tree.
///
/// [§ 4 Nodes](https://dom.spec.whatwg.org/#nodes)
///
/// The document node lives at [`NodeId::ROOT`]. Nodes allocated with
/// [`DomTree::alloc`] are detached until appended under the document.
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
    kind: DocumentKind,
}

impl DomTree {
    /// Create an HTML document containing only the document node.
    #[must_use]
    pub fn new() -> Self {
        Self::with_kind(DocumentKind::Html)
    }

    /// Create an XML document containing only the document node.
    #[must_use]
    pub fn new_xml() -> Self {
        Self::with_kind(DocumentKind::Xml)
    }

    fn with_kind(kind: DocumentKind) -> Self {
        let document = Node {
            node_type: NodeType::Document,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
        };
        Self {
            nodes: vec![document],
            kind,
        }
    }

    /// Whether this is an HTML or an XML document.
    #[must_use]
    pub const fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// Whether element names compare ASCII case-insensitively.
    #[must_use]
    pub fn is_html(&self) -> bool {
        self.kind == DocumentKind::Html
    }

    /// The document node.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Number of nodes in the arena, attached or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the document node is allocated on construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new, detached node.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            node_type,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
        });
        id
    }

    /// Allocate a detached element.
    pub fn create_element(&mut self, element: ElementData) -> NodeId {
        self.alloc(NodeType::Element(element))
    }

    /// Allocate a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeType::Text(text.to_string()))
    }

    /// Allocate a document fragment.
    pub fn create_fragment(&mut self) -> NodeId {
        self.alloc(NodeType::DocumentFragment)
    }

    /// [§ 4.2.2 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// Appends `child` as the last child of `parent`. A child that already
    /// has a parent is removed from it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent.0 >= self.nodes.len() || child.0 >= self.nodes.len() || parent == child {
            return;
        }
        self.remove_child(child);

        let prev_last_child = self.nodes[parent.0].children.last().copied();
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);

        if let Some(prev_id) = prev_last_child {
            self.nodes[prev_id.0].next_sibling = Some(child);
            self.nodes[child.0].prev_sibling = Some(prev_id);
        }
    }

    /// [§ 4.2.3 Remove](https://dom.spec.whatwg.org/#concept-node-remove)
    ///
    /// Detach `child` from its parent, if it has one.
    pub fn remove_child(&mut self, child: NodeId) {
        let Some(parent) = self.parent(child) else {
            return;
        };
        let prev = self.nodes[child.0].prev_sibling.take();
        let next = self.nodes[child.0].next_sibling.take();
        if let Some(prev) = prev {
            self.nodes[prev.0].next_sibling = next;
        }
        if let Some(next) = next {
            self.nodes[next.0].prev_sibling = prev;
        }
        self.nodes[parent.0].children.retain(|&c| c != child);
        self.nodes[child.0].parent = None;
    }

    /// Set (or replace) an attribute on an element. No-op for other nodes.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        let html = self.is_html();
        if let Some(NodeType::Element(data)) = self.nodes.get_mut(id.0).map(|n| &mut n.node_type) {
            let key = if html {
                name.to_ascii_lowercase()
            } else {
                name.to_string()
            };
            let _ = data.attrs.insert(key, value.to_string());
        }
    }

    /// Remove an attribute from an element, returning its old value.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<String> {
        match self.nodes.get_mut(id.0).map(|n| &mut n.node_type) {
            Some(NodeType::Element(data)) => {
                let key = data
                    .attrs
                    .keys()
                    .find(|key| key.eq_ignore_ascii_case(name))
                    .cloned()?;
                data.attrs.remove(&key)
            }
            _ => None,
        }
    }

    /// Parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Parent of a node if that parent is an element.
    #[must_use]
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|&p| self.as_element(p).is_some())
    }

    /// Children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Element children of a node, in tree order.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.as_element(c).is_some())
    }

    /// First child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.first().copied())
    }

    /// Last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.last().copied())
    }

    /// Next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// Closest preceding sibling that is an element.
    #[must_use]
    pub fn prev_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.preceding_siblings(id)
            .find(|&s| self.as_element(s).is_some())
    }

    /// Closest following sibling that is an element.
    #[must_use]
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.next_sibling(id);
        while let Some(sibling) = current {
            if self.as_element(sibling).is_some() {
                return Some(sibling);
            }
            current = self.next_sibling(sibling);
        }
        None
    }

    /// Ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Preceding siblings, nearest first.
    #[must_use]
    pub fn preceding_siblings(&self, id: NodeId) -> PrecedingSiblingIterator<'_> {
        PrecedingSiblingIterator {
            tree: self,
            current: self.prev_sibling(id),
        }
    }

    /// Check if `descendant` is a descendant of `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// [§ 4.2.1 Document tree](https://dom.spec.whatwg.org/#in-a-document-tree)
    ///
    /// "An element is in a document tree if its root is a document."
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        if id == NodeId::ROOT {
            return true;
        }
        self.ancestors(id).last() == Some(NodeId::ROOT)
    }

    /// Element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Text if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Local name of an element node.
    #[must_use]
    pub fn local_name(&self, id: NodeId) -> Option<&str> {
        self.as_element(id).map(ElementData::local_name)
    }

    /// Attribute value of an element node.
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.as_element(id).and_then(|e| e.attribute(name))
    }

    /// [§ 4.4 textContent](https://dom.spec.whatwg.org/#dom-node-textcontent)
    ///
    /// Concatenation of all descendant text nodes in tree order.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(text) = self.as_text(id) {
            out.push_str(text);
            return out;
        }
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            if let Some(text) = self.as_text(node) {
                out.push_str(text);
            }
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// Text as a user would see it: non-rendered elements are skipped,
    /// whitespace runs collapse to one space, `<br>` and block-level
    /// elements break lines.
    #[must_use]
    pub fn visible_text(&self, id: NodeId) -> String {
        let mut raw = String::new();
        self.collect_visible(id, &mut raw);
        raw.split('\n')
            .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn collect_visible(&self, id: NodeId, out: &mut String) {
        match self.get(id).map(|n| &n.node_type) {
            Some(NodeType::Text(text)) => out.push_str(text),
            Some(NodeType::Element(data)) => {
                let name = data.tag_name.to_ascii_lowercase();
                if NON_RENDERED.contains(&name.as_str()) {
                    return;
                }
                if name == "br" {
                    out.push('\n');
                    return;
                }
                let breaks = LINE_BREAKING.contains(&name.as_str());
                if breaks {
                    out.push('\n');
                }
                for &child in self.children(id) {
                    self.collect_visible(child, out);
                }
                if breaks {
                    out.push('\n');
                }
            }
            Some(NodeType::Document | NodeType::DocumentFragment) => {
                for &child in self.children(id) {
                    self.collect_visible(child, out);
                }
            }
            Some(NodeType::Comment(_)) | None => {}
        }
    }

    /// [§ 3.1.1 The document element](https://html.spec.whatwg.org/multipage/dom.html#the-html-element-2)
    ///
    /// "The document element of a document is the element whose parent is
    /// that document, if it exists; otherwise null."
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.element_children(NodeId::ROOT).next()
    }

    /// [§ 3.1.3 The body element](https://html.spec.whatwg.org/multipage/dom.html#the-body-element-2)
    ///
    /// "The body element of a document is the first of the html element's
    /// children that is either a body element or a frameset element."
    #[must_use]
    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.element_children(html).find(|&id| {
            self.local_name(id).is_some_and(|name| {
                name.eq_ignore_ascii_case("body") || name.eq_ignore_ascii_case("frameset")
            })
        })
    }

    /// Find the first element with the given `id` attribute, in tree order.
    #[must_use]
    pub fn element_by_id(&self, id_value: &str) -> Option<NodeId> {
        let mut stack = vec![NodeId::ROOT];
        while let Some(node) = stack.pop() {
            if self.as_element(node).and_then(ElementData::id) == Some(id_value) {
                return Some(node);
            }
            stack.extend(self.children(node).iter().rev().copied());
        }
        None
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Iterator over preceding siblings of a node.
pub struct PrecedingSiblingIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for PrecedingSiblingIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.prev_sibling(id);
        Some(id)
    }
}
