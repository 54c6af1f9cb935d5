//! # Image Transform Engine
//!
//! Computes the attribute and inline-style changes for one image from a set
//! of [`ImageOptions`] and the image's current geometry, then writes them to
//! the document. Nothing outside the target element is touched.

use std::fmt;
use std::str::FromStr;

use listing_dom::{Document, ImageGeometry, LayoutSource, NodeId};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_FIT: &str = "cover";
pub const DEFAULT_POSITION: &str = "center center";

/// How the image box is sized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeMode {
    /// Explicit width, height follows
    Width,
    /// Explicit height, width follows
    Height,
    /// Intrinsic size governs
    Natural,
    /// Freeze the current rendered size
    #[default]
    Preserve,
}

impl FromStr for SizeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "width" => Ok(SizeMode::Width),
            "height" => Ok(SizeMode::Height),
            "natural" => Ok(SizeMode::Natural),
            "preserve" => Ok(SizeMode::Preserve),
            other => Err(format!("unknown size mode '{}'", other)),
        }
    }
}

impl fmt::Display for SizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SizeMode::Width => "width",
            SizeMode::Height => "height",
            SizeMode::Natural => "natural",
            SizeMode::Preserve => "preserve",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageOptions {
    /// Replacement source
    pub src: Option<String>,
    /// Replacement alt text; `Some("")` clears it
    pub alt: Option<String>,
    pub mode: SizeMode,
    pub width: Option<f64>,
    pub height: Option<f64>,
    /// `object-fit`, defaults to `cover`
    pub fit: Option<String>,
    /// `object-position`, defaults to `center center`
    pub position: Option<String>,
}

/// Changes for a single image element
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePatch {
    pub src: Option<String>,
    pub alt: Option<String>,
    /// Inline style properties; `None` clears the property
    pub styles: Vec<(&'static str, Option<String>)>,
}

fn px(value: f64) -> String {
    format!("{}px", value)
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Compute the patch for an image currently rendered at `geometry`
pub fn compute_patch(options: &ImageOptions, geometry: &ImageGeometry) -> ImagePatch {
    let fit = non_blank(&options.fit).unwrap_or_else(|| DEFAULT_FIT.to_string());
    let position = non_blank(&options.position).unwrap_or_else(|| DEFAULT_POSITION.to_string());

    let mut styles: Vec<(&'static str, Option<String>)> = vec![
        ("object-fit", Some(fit)),
        ("object-position", Some(position)),
    ];

    let current_width = geometry.rendered_width;
    let current_height = geometry.rendered_height;
    match options.mode {
        SizeMode::Width => {
            styles.push(("width", Some(px(options.width.unwrap_or(current_width)))));
            styles.push(("height", Some("auto".to_string())));
        }
        SizeMode::Height => {
            styles.push(("height", Some(px(options.height.unwrap_or(current_height)))));
            styles.push(("width", Some("auto".to_string())));
        }
        SizeMode::Natural => {
            styles.push(("width", None));
            styles.push(("height", None));
        }
        SizeMode::Preserve => {
            let width = (current_width > 0.0).then(|| px(current_width));
            let height = if current_height > 0.0 {
                px(current_height)
            } else {
                "auto".to_string()
            };
            styles.push(("width", width));
            styles.push(("height", Some(height)));
        }
    }

    ImagePatch {
        src: non_blank(&options.src),
        alt: options.alt.clone(),
        styles,
    }
}

/// Write a patch to an element
pub fn apply_patch(doc: &mut Document, node: NodeId, patch: &ImagePatch) {
    if let Some(src) = &patch.src {
        doc.set_attribute(node, "src", src.as_str());
    }
    if let Some(alt) = &patch.alt {
        doc.set_attribute(node, "alt", alt.as_str());
    }
    for (property, value) in &patch.styles {
        doc.set_style_property(node, property, value.as_deref());
    }
}

/// Measure one image and apply `options` to it
pub fn apply_image_options(
    doc: &mut Document,
    node: NodeId,
    options: &ImageOptions,
    layout: &dyn LayoutSource,
) {
    let geometry = layout.image_geometry(doc, node);
    let patch = compute_patch(options, &geometry);
    apply_patch(doc, node, &patch);
}

/// Apply the same options to every image, each measured on its own.
/// Returns the number of images changed.
pub fn apply_to_all(doc: &mut Document, options: &ImageOptions, layout: &dyn LayoutSource) -> usize {
    let images = doc.elements_by_tag("img");
    // Measure everything first so earlier writes cannot skew later geometry
    let patches: Vec<(NodeId, ImagePatch)> = images
        .iter()
        .map(|id| (*id, compute_patch(options, &layout.image_geometry(doc, *id))))
        .collect();
    for (id, patch) in &patches {
        apply_patch(doc, *id, patch);
    }
    debug!(count = patches.len(), "Applied image options to all images");
    patches.len()
}

/// Result of deleting an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// Parent that was removed because the image was its only child
    pub removed_parent: Option<NodeId>,
}

/// Remove an image. A parent left without children is removed as well, one
/// level only.
pub fn delete_image(doc: &mut Document, node: NodeId) -> DeleteOutcome {
    let parent = doc.parent(node);
    doc.remove(node);

    let removed_parent = parent.filter(|p| {
        doc.element(*p).is_some()
            && !doc.is_element(*p, "body")
            && !doc.is_element(*p, "html")
            && doc.children(*p).is_empty()
    });
    if let Some(p) = removed_parent {
        doc.remove(p);
    }
    DeleteOutcome { removed_parent }
}

/// Keeps width and height at the image's intrinsic ratio while either field
/// is edited. Rebind after every reload.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AspectLock {
    pub enabled: bool,
    ratio: Option<f64>,
}

impl AspectLock {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ratio: None,
        }
    }

    pub fn bind(&mut self, geometry: &ImageGeometry) {
        self.ratio = geometry.aspect_ratio();
    }

    pub fn unbind(&mut self) {
        self.ratio = None;
    }

    pub fn ratio(&self) -> Option<f64> {
        self.ratio
    }

    /// Height to show after the width field changed
    pub fn height_for_width(&self, width: f64) -> Option<f64> {
        match (self.enabled, self.ratio) {
            (true, Some(ratio)) => Some((width / ratio).round()),
            _ => None,
        }
    }

    /// Width to show after the height field changed
    pub fn width_for_height(&self, height: f64) -> Option<f64> {
        match (self.enabled, self.ratio) {
            (true, Some(ratio)) => Some((height * ratio).round()),
            _ => None,
        }
    }
}
