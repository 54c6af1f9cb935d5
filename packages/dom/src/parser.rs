//! # Tree Builder
//!
//! Builds a [`Document`] from tokens with a small open-element stack.
//!
//! Recovery rules:
//! - void elements and self-closing tags are never pushed
//! - an end tag with no matching open element is ignored
//! - `li`, `p`, `option`, `tr`, `td`/`th` and `dt`/`dd` close a still-open
//!   sibling of the same kind (`tr` also closes open cells)
//! - the result is always normalized to `html > (head, body)`

use tracing::debug;

use crate::node::{Document, NodeData, NodeId};
use crate::serializer::is_void_element;
use crate::tokenizer::{tokenize, Token};

/// Elements that belong in `head` when found outside `body`
const METADATA_ELEMENTS: [&str; 5] = ["title", "meta", "link", "style", "base"];

/// Parse an HTML string. Never fails.
pub fn parse(source: &str) -> Document {
    let mut doc = Document::new();
    let mut stack: Vec<NodeId> = vec![doc.root()];

    for token in tokenize(source) {
        let current = stack.last().copied().unwrap_or(doc.root());
        match token {
            // The serializer always writes its own doctype
            Token::Doctype(_) => {}
            Token::Comment(text) => {
                let node = doc.create_comment(text);
                doc.append_child(current, node);
            }
            Token::Text(text) => {
                let node = doc.create_text(text);
                doc.append_child(current, node);
            }
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                let mut parent = current;
                while parent != doc.root() && closes_open_element(&doc, parent, &name) {
                    stack.pop();
                    parent = stack.last().copied().unwrap_or(doc.root());
                }
                let node = doc.create_element(&name);
                if let Some(el) = doc.element_mut(node) {
                    el.attributes = attributes;
                }
                doc.append_child(parent, node);
                if !self_closing && !is_void_element(&name) {
                    stack.push(node);
                }
            }
            Token::EndTag { name } => {
                let open = stack
                    .iter()
                    .rposition(|id| doc.is_element(*id, &name));
                if let Some(index) = open {
                    stack.truncate(index);
                }
                if stack.is_empty() {
                    stack.push(doc.root());
                }
            }
        }
    }

    normalize(&mut doc);
    debug!(nodes = doc.descendants(doc.root()).len(), "Parsed document");
    doc
}

fn closes_open_element(doc: &Document, open: NodeId, incoming: &str) -> bool {
    let Some(open) = doc.element(open) else {
        return false;
    };
    let closes: &[&str] = match incoming {
        "li" => &["li"],
        "p" => &["p"],
        "option" => &["option"],
        "tr" => &["tr", "td", "th"],
        "td" | "th" => &["td", "th"],
        "dt" | "dd" => &["dt", "dd"],
        _ => &[],
    };
    closes.contains(&open.name.as_str())
}

/// Guarantee the `html > (head, body)` skeleton
fn normalize(doc: &mut Document) {
    let root = doc.root();

    let html = match doc.html_element() {
        Some(html) => html,
        None => {
            let html = doc.create_element("html");
            for child in doc.children(root).to_vec() {
                doc.append_child(html, child);
            }
            doc.append_child(root, html);
            html
        }
    };

    // Anything left beside <html> (other than comments and whitespace) moves
    // inside it
    for child in doc.children(root).to_vec() {
        if child == html || is_blank_text(doc, child) {
            continue;
        }
        let is_comment = matches!(
            doc.node(child).map(|n| &n.data),
            Some(NodeData::Comment(_))
        );
        if !is_comment {
            doc.append_child(html, child);
        }
    }

    let head = match doc.head() {
        Some(head) => head,
        None => {
            let head = doc.create_element("head");
            doc.insert_child(html, 0, head);
            head
        }
    };

    let body = match doc.body() {
        Some(body) => body,
        None => {
            let body = doc.create_element("body");
            doc.append_child(html, body);
            body
        }
    };

    // Stray nodes before <body> are prepended to it, later ones appended
    let mut body_index = 0;
    let mut after_body = false;
    for child in doc.children(html).to_vec() {
        if child == body {
            after_body = true;
            continue;
        }
        if child == head {
            continue;
        }
        let is_metadata = doc
            .element(child)
            .map(|el| METADATA_ELEMENTS.contains(&el.name.as_str()))
            .unwrap_or(false);
        if is_metadata {
            doc.append_child(head, child);
        } else if is_blank_text(doc, child) {
            continue;
        } else if after_body {
            doc.append_child(body, child);
        } else {
            doc.insert_child(body, body_index, child);
            body_index += 1;
        }
    }
}

fn is_blank_text(doc: &Document, id: NodeId) -> bool {
    matches!(
        doc.node(id).map(|n| &n.data),
        Some(NodeData::Text(t)) if t.trim().is_empty()
    )
}
