//! # Document Tree
//!
//! Nodes live in a single arena owned by [`Document`] and are addressed by
//! [`NodeId`]. Removing a node only detaches it from its parent, so an id
//! handed out once never points at a different node later. Traversals start
//! from the root and therefore never visit detached nodes.

use serde::{Deserialize, Serialize};

use crate::style::InlineStyle;
use crate::text::decode_entities;

/// Stable handle to a node inside one [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A single `name="value"` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Lowercased attribute name
    pub name: String,
    /// Value as written in the source (entities are not decoded)
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercased tag name
    pub name: String,
    pub attributes: Vec<Attribute>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_lowercase(),
            attributes: Vec::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|a| a.name.eq_ignore_ascii_case(name))
        {
            Some(attr) => attr.value = value,
            None => self
                .attributes
                .push(Attribute::new(name.to_ascii_lowercase(), value)),
        }
    }

    /// Returns true if the attribute was present
    pub fn remove_attribute(&mut self, name: &str) -> bool {
        let before = self.attributes.len();
        self.attributes.retain(|a| !a.name.eq_ignore_ascii_case(name));
        before != self.attributes.len()
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Document,
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub data: NodeData,
}

/// Arena-backed HTML document
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document containing only the root node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Document,
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.nodes.get(id.0).map(|n| &n.data) {
            Some(NodeData::Element(el)) => Some(el),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match self.nodes.get_mut(id.0).map(|n| &mut n.data) {
            Some(NodeData::Element(el)) => Some(el),
            _ => None,
        }
    }

    /// True if `id` is an element with tag `name`
    pub fn is_element(&self, id: NodeId, name: &str) -> bool {
        self.element(id).map(|el| el.is(name)).unwrap_or(false)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.push(NodeData::Element(Element::new(name)))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData::Text(text.into()))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData::Comment(text.into()))
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
        });
        id
    }

    /// Append `child` as the last child of `parent`, detaching it first
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let index = self.children(parent).len();
        self.insert_child(parent, index, child);
    }

    /// Insert `child` at `index` under `parent` (clamped to the child count)
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        if parent == child || child == self.root() || self.is_ancestor(child, parent) {
            return;
        }
        self.detach(child);
        let Some(parent_node) = self.nodes.get_mut(parent.0) else {
            return;
        };
        let index = index.min(parent_node.children.len());
        parent_node.children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Detach a node (and its subtree) from the tree
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        self.nodes[parent.0].children.retain(|c| *c != id);
        self.nodes[id.0].parent = None;
    }

    /// Remove a node from the tree; alias of [`Document::detach`]
    pub fn remove(&mut self, id: NodeId) {
        self.detach(id);
    }

    /// True if the node is reachable from the root
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.root() {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    fn is_ancestor(&self, ancestor: NodeId, of: NodeId) -> bool {
        let mut current = self.parent(of);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Pre-order list of every node below `id` (excluding `id`)
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Every attached element, in document order
    pub fn elements(&self) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|id| self.element(*id).is_some())
            .collect()
    }

    /// Every attached element whose tag is one of `names`, in document order
    pub fn elements_by_tags(&self, names: &[&str]) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|id| {
                self.element(*id)
                    .map(|el| names.contains(&el.name.as_str()))
                    .unwrap_or(false)
            })
            .collect()
    }

    pub fn elements_by_tag(&self, name: &str) -> Vec<NodeId> {
        self.elements_by_tags(&[name])
    }

    pub fn first_by_tag(&self, name: &str) -> Option<NodeId> {
        self.elements_by_tag(name).into_iter().next()
    }

    /// Lookup by `id` attribute
    pub fn element_by_id(&self, value: &str) -> Option<NodeId> {
        self.elements()
            .into_iter()
            .find(|id| self.attribute(*id, "id") == Some(value))
    }

    pub fn html_element(&self) -> Option<NodeId> {
        self.children(self.root())
            .iter()
            .copied()
            .find(|id| self.is_element(*id, "html"))
    }

    pub fn head(&self) -> Option<NodeId> {
        let html = self.html_element()?;
        self.children(html)
            .iter()
            .copied()
            .find(|id| self.is_element(*id, "head"))
    }

    pub fn body(&self) -> Option<NodeId> {
        let html = self.html_element()?;
        self.children(html)
            .iter()
            .copied()
            .find(|id| self.is_element(*id, "body"))
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.attribute(name))
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        if let Some(el) = self.element_mut(id) {
            el.set_attribute(name, value);
        }
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> bool {
        self.element_mut(id)
            .map(|el| el.remove_attribute(name))
            .unwrap_or(false)
    }

    /// Parsed view of the `style` attribute
    pub fn inline_style(&self, id: NodeId) -> InlineStyle {
        InlineStyle::parse(self.attribute(id, "style").unwrap_or(""))
    }

    /// Set (`Some`) or clear (`None` / empty) one inline style property.
    ///
    /// The `style` attribute is dropped once no declarations remain.
    pub fn set_style_property(&mut self, id: NodeId, property: &str, value: Option<&str>) {
        let mut style = self.inline_style(id);
        match value {
            Some(v) if !v.trim().is_empty() => style.set(property, v),
            _ => style.remove(property),
        }
        self.write_inline_style(id, &style);
    }

    pub fn write_inline_style(&mut self, id: NodeId, style: &InlineStyle) {
        if style.is_empty() {
            self.remove_attribute(id, "style");
        } else {
            self.set_attribute(id, "style", style.to_string());
        }
    }

    /// Raw text of the subtree, exactly as stored
    pub fn raw_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(NodeData::Text(t)) = self.node(id).map(|n| &n.data) {
            out.push_str(t);
        }
        for child in self.descendants(id) {
            if let Some(NodeData::Text(t)) = self.node(child).map(|n| &n.data) {
                out.push_str(t);
            }
        }
        out
    }

    /// Decoded text of the subtree, like the DOM `textContent`
    pub fn text_content(&self, id: NodeId) -> String {
        decode_entities(&self.raw_text(id))
    }

    /// Decoded text a reader would see: skips `script`, `style`, `template`,
    /// `noscript` and `head` subtrees
    pub fn visible_text(&self, id: NodeId) -> String {
        const HIDDEN: [&str; 5] = ["script", "style", "template", "noscript", "head"];
        let mut out = String::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            match self.node(next).map(|n| &n.data) {
                Some(NodeData::Text(t)) => out.push_str(t),
                Some(NodeData::Element(el)) if HIDDEN.contains(&el.name.as_str()) => continue,
                _ => {}
            }
            stack.extend(self.children(next).iter().rev().copied());
        }
        decode_entities(&out)
    }

    /// Replace every child of `id` with one text node
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        for child in self.children(id).to_vec() {
            self.detach(child);
        }
        let text = text.into();
        if !text.is_empty() {
            let node = self.create_text(text);
            self.append_child(id, node);
        }
    }

    /// The `tag` element carrying `id="<marker>"` inside `head`
    pub fn head_element(&self, tag: &str, marker: &str) -> Option<NodeId> {
        let head = self.head()?;
        self.descendants(head)
            .into_iter()
            .find(|id| self.is_element(*id, tag) && self.attribute(*id, "id") == Some(marker))
    }

    /// Find the element carrying `id="<marker>"` under `head`, creating it as
    /// the last child of `head` when missing. Used for injected style blocks.
    pub fn ensure_head_element(&mut self, tag: &str, marker: &str) -> Option<NodeId> {
        if let Some(existing) = self.head_element(tag, marker) {
            return Some(existing);
        }
        let head = self.head()?;
        let el = self.create_element(tag);
        self.set_attribute(el, "id", marker);
        self.append_child(head, el);
        Some(el)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn test_removed_ids_stay_valid_but_detached() {
        let mut doc = parse("<div><img src=\"a.png\"></div>");
        let img = doc.elements_by_tag("img")[0];
        doc.remove(img);

        assert!(!doc.is_attached(img));
        assert_eq!(doc.attribute(img, "src"), Some("a.png"));
        assert!(doc.elements_by_tag("img").is_empty());
    }

    #[test]
    fn test_insert_refuses_cycles() {
        let mut doc = parse("<div id=\"outer\"><p id=\"inner\"></p></div>");
        let outer = doc.element_by_id("outer").unwrap();
        let inner = doc.element_by_id("inner").unwrap();

        doc.append_child(inner, outer);

        assert_eq!(doc.parent(inner), Some(outer));
        assert!(doc.is_attached(outer));
    }

    #[test]
    fn test_style_property_round_trip() {
        let mut doc = parse("<img style=\"width: 10px\">");
        let img = doc.elements_by_tag("img")[0];

        doc.set_style_property(img, "height", Some("auto"));
        assert_eq!(doc.attribute(img, "style"), Some("width: 10px; height: auto"));

        doc.set_style_property(img, "width", None);
        doc.set_style_property(img, "height", Some(""));
        assert_eq!(doc.attribute(img, "style"), None);
    }

    #[test]
    fn test_visible_text_skips_scripts_and_head() {
        let doc = parse(
            "<head><title>T</title></head><body>Hi &amp; bye<script>var x = 1;</script></body>",
        );
        let root = doc.root();
        assert_eq!(doc.visible_text(root), "Hi & bye");
    }

    #[test]
    fn test_ensure_head_element_is_idempotent() {
        let mut doc = parse("<p>x</p>");
        let first = doc.ensure_head_element("style", "__marker__").unwrap();
        let second = doc.ensure_head_element("style", "__marker__").unwrap();

        assert_eq!(first, second);
        assert_eq!(doc.elements_by_tag("style").len(), 1);
    }

    #[test]
    fn test_ensure_head_element_ignores_body_lookalikes() {
        let mut doc = parse("<div id=\"__marker__\">keep</div>");
        let div = doc.element_by_id("__marker__").unwrap();
        let style = doc.ensure_head_element("style", "__marker__").unwrap();

        assert_ne!(style, div);
        assert_eq!(doc.parent(style), doc.head());
        assert_eq!(doc.head_element("style", "__marker__"), Some(style));
        assert_eq!(doc.text_content(div), "keep");
        assert!(doc.children(style).is_empty());
    }
}
