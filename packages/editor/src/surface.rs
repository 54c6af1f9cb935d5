//! # Rendering Surface Port
//!
//! The editable view is owned by the host. The session only needs to hand it
//! markup, get back the mounted tree once it is ready, and ask it how big
//! images are.

use listing_dom::{parse, AttributeLayout, Document, ImageGeometry, LayoutSource, NodeId};

use crate::errors::EditorError;

/// A host view that mounts documents asynchronously
#[allow(async_fn_in_trait)]
pub trait RenderSurface: LayoutSource {
    /// Mount `html` and resolve with the live tree once the view is ready
    async fn mount(&self, html: &str) -> Result<Document, EditorError>;
}

/// Surface without a renderer: mounting is parsing, geometry comes from
/// markup attributes. Used by the CLI and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessSurface;

impl LayoutSource for HeadlessSurface {
    fn image_geometry(&self, doc: &Document, node: NodeId) -> ImageGeometry {
        AttributeLayout.image_geometry(doc, node)
    }
}

impl RenderSurface for HeadlessSurface {
    async fn mount(&self, html: &str) -> Result<Document, EditorError> {
        Ok(parse(html))
    }
}
