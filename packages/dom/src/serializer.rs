use std::fmt::Write;

use crate::node::{Document, NodeData, NodeId};
use crate::tokenizer::RAW_TEXT_ELEMENTS;

/// Prefix written in front of every exported document
pub const DOCTYPE: &str = "<!DOCTYPE html>";

const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// Text of a raw-text element with every `</name` broken up, so the element
/// cannot be closed from inside its own content
fn escape_raw_text(text: &str, name: &str) -> String {
    let closing = format!("</{}", name);
    let lower = text.to_ascii_lowercase();
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (at, _) in lower.match_indices(&closing) {
        out.push_str(&text[last..at]);
        out.push_str("<\\/");
        last = at + 2;
    }
    out.push_str(&text[last..]);
    out
}

/// Comment text that cannot end the comment early
fn escape_comment(text: &str) -> String {
    let text = text.replace("--!>", "--! >").replace("-->", "-- >");
    if text.starts_with('>') || text.starts_with("->") {
        format!(" {}", text)
    } else {
        text
    }
}

impl Document {
    /// Full document: doctype line followed by the `<html>` element
    pub fn serialize(&self) -> String {
        format!("{}\n{}", DOCTYPE, self.to_html())
    }

    /// Outer HTML of the `<html>` element, without a doctype
    pub fn to_html(&self) -> String {
        match self.html_element() {
            Some(html) => self.outer_html(html),
            None => self.inner_html(self.root()),
        }
    }

    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(id) {
            self.write_node(*child, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        match &node.data {
            NodeData::Document => {
                for child in &node.children {
                    self.write_node(*child, out);
                }
            }
            NodeData::Text(text) => out.push_str(text),
            NodeData::Comment(text) => {
                let _ = write!(out, "<!--{}-->", escape_comment(text));
            }
            NodeData::Element(el) => {
                out.push('<');
                out.push_str(&el.name);
                for attr in &el.attributes {
                    let _ = write!(out, " {}=\"{}\"", attr.name, attr.value.replace('"', "&quot;"));
                }
                out.push('>');
                if is_void_element(&el.name) {
                    return;
                }
                let raw = RAW_TEXT_ELEMENTS.contains(&el.name.as_str());
                for child in &node.children {
                    match self.node(*child).map(|n| &n.data) {
                        Some(NodeData::Text(text)) if raw => {
                            out.push_str(&escape_raw_text(text, &el.name))
                        }
                        _ => self.write_node(*child, out),
                    }
                }
                let _ = write!(out, "</{}>", el.name);
            }
        }
    }
}
