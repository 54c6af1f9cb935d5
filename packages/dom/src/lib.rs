//! # Listing DOM
//!
//! Arena-backed HTML tree used by the listing editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ tokenizer: html text → tokens               │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ parser: tokens → Document (html/head/body)  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ Document: NodeId-addressed edits + queries  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ serializer: Document → `<!DOCTYPE html>` +  │
//! │ outer html                                  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Parsing never fails. Listing templates are pasted from all kinds of
//! sources, so the tree builder recovers from anything it does not
//! understand instead of rejecting it. Text and attribute values are kept as
//! written, which makes `parse(serialize(doc))` a fixed point.
//!
//! ## Usage
//!
//! ```rust
//! use listing_dom::parse;
//!
//! let mut doc = parse("<p>Hello <img src=\"a.png\"></p>");
//! let img = doc.elements_by_tag("img")[0];
//! doc.set_attribute(img, "alt", "A product");
//! assert!(doc.serialize().starts_with("<!DOCTYPE html>\n<html>"));
//! ```

mod layout;
mod node;
mod parser;
mod serializer;
mod style;
mod text;
mod tokenizer;

pub use layout::{AttributeLayout, ImageGeometry, LayoutSource, StaticLayout};
pub use node::{Attribute, Document, Element, Node, NodeData, NodeId};
pub use parser::parse;
pub use serializer::{is_void_element, DOCTYPE};
pub use style::InlineStyle;
pub use text::decode_entities;
pub use tokenizer::{tokenize, Token};
