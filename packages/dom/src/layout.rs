//! # Layout Source
//!
//! The tree alone does not know how big an image is on screen. That belongs
//! to whatever renders the document, so geometry is read through the
//! [`LayoutSource`] port. Missing measurements are reported as zero, the same
//! way a browser reports an unloaded image.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::node::{Document, NodeId};

/// Rendered box plus intrinsic size of an image element
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageGeometry {
    pub rendered_width: f64,
    pub rendered_height: f64,
    pub natural_width: u32,
    pub natural_height: u32,
}

impl ImageGeometry {
    pub fn new(rendered_width: f64, rendered_height: f64, natural_width: u32, natural_height: u32) -> Self {
        Self {
            rendered_width,
            rendered_height,
            natural_width,
            natural_height,
        }
    }

    /// Intrinsic width / height, when both are known
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.natural_width > 0 && self.natural_height > 0 {
            Some(self.natural_width as f64 / self.natural_height as f64)
        } else {
            None
        }
    }
}

/// Source of rendered geometry for elements of a mounted document
pub trait LayoutSource {
    fn image_geometry(&self, doc: &Document, node: NodeId) -> ImageGeometry;
}

/// Geometry derived from markup alone: inline `px` sizes, then `width` /
/// `height` attributes for the rendered box, and `data-natural-width` /
/// `data-natural-height` for the intrinsic size.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeLayout;

impl LayoutSource for AttributeLayout {
    fn image_geometry(&self, doc: &Document, node: NodeId) -> ImageGeometry {
        let style = doc.inline_style(node);
        let dimension = |property: &str| -> f64 {
            style
                .get(property)
                .and_then(parse_px)
                .or_else(|| doc.attribute(node, property).and_then(parse_px))
                .unwrap_or(0.0)
        };
        let natural = |attr: &str| -> u32 {
            doc.attribute(node, attr)
                .and_then(|v| v.trim().parse::<u32>().ok())
                .unwrap_or(0)
        };

        ImageGeometry {
            rendered_width: dimension("width"),
            rendered_height: dimension("height"),
            natural_width: natural("data-natural-width"),
            natural_height: natural("data-natural-height"),
        }
    }
}

/// Fixed geometry table, for hosts that measure ahead of time and for tests.
/// Nodes without an entry fall back to [`AttributeLayout`].
#[derive(Debug, Clone, Default)]
pub struct StaticLayout {
    entries: HashMap<NodeId, ImageGeometry>,
}

impl StaticLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, node: NodeId, geometry: ImageGeometry) -> Self {
        self.entries.insert(node, geometry);
        self
    }

    pub fn insert(&mut self, node: NodeId, geometry: ImageGeometry) {
        self.entries.insert(node, geometry);
    }
}

impl LayoutSource for StaticLayout {
    fn image_geometry(&self, doc: &Document, node: NodeId) -> ImageGeometry {
        match self.entries.get(&node) {
            Some(geometry) => *geometry,
            None => AttributeLayout.image_geometry(doc, node),
        }
    }
}

fn parse_px(value: &str) -> Option<f64> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value).trim();
    number.parse::<f64>().ok().filter(|n| n.is_finite() && *n >= 0.0)
}
