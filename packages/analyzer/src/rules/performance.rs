use listing_dom::{Document, LayoutSource};

use super::AnalysisRule;
use crate::finding::{Category, Finding};

const MAX_NATURAL_DIMENSION: u32 = 1600;
const MAX_IMAGES: usize = 12;
const MAX_STYLESHEET_CHARS: usize = 20_000;

/// Flags the document once if any image is intrinsically oversized
pub struct LargeImageRule;

impl AnalysisRule for LargeImageRule {
    fn name(&self) -> &'static str {
        "perf-large-image"
    }

    fn description(&self) -> &'static str {
        "Images should not exceed 1600px in either natural dimension"
    }

    fn category(&self) -> Category {
        Category::Performance
    }

    fn check(&self, doc: &Document, layout: &dyn LayoutSource) -> Vec<Finding> {
        let oversized = doc.elements_by_tag("img").into_iter().any(|id| {
            let geometry = layout.image_geometry(doc, id);
            geometry.natural_width > MAX_NATURAL_DIMENSION
                || geometry.natural_height > MAX_NATURAL_DIMENSION
        });

        if oversized {
            vec![Finding::performance(
                self.name(),
                15,
                "Resize large images (>1600px).",
            )]
        } else {
            Vec::new()
        }
    }
}

pub struct ImageCountRule;

impl AnalysisRule for ImageCountRule {
    fn name(&self) -> &'static str {
        "perf-image-count"
    }

    fn description(&self) -> &'static str {
        "Listings should carry at most 12 images"
    }

    fn category(&self) -> Category {
        Category::Performance
    }

    fn check(&self, doc: &Document, _layout: &dyn LayoutSource) -> Vec<Finding> {
        if doc.elements_by_tag("img").len() > MAX_IMAGES {
            vec![Finding::performance(
                self.name(),
                10,
                "Too many images; consider fewer or optimize.",
            )]
        } else {
            Vec::new()
        }
    }
}

/// One deduction per oversized `<style>` block
pub struct StylesheetSizeRule;

impl AnalysisRule for StylesheetSizeRule {
    fn name(&self) -> &'static str {
        "perf-stylesheet-size"
    }

    fn description(&self) -> &'static str {
        "Style blocks should stay under 20000 characters"
    }

    fn category(&self) -> Category {
        Category::Performance
    }

    fn check(&self, doc: &Document, _layout: &dyn LayoutSource) -> Vec<Finding> {
        doc.elements_by_tag("style")
            .into_iter()
            .filter(|id| doc.raw_text(*id).chars().count() > MAX_STYLESHEET_CHARS)
            .map(|_| Finding::performance(self.name(), 10, "Stylesheet is very large."))
            .collect()
    }
}

pub struct HeadingsForReadabilityRule;

impl AnalysisRule for HeadingsForReadabilityRule {
    fn name(&self) -> &'static str {
        "perf-headings"
    }

    fn description(&self) -> &'static str {
        "Long copy should be broken up with h1-h3 headings"
    }

    fn category(&self) -> Category {
        Category::Performance
    }

    fn check(&self, doc: &Document, _layout: &dyn LayoutSource) -> Vec<Finding> {
        if doc.elements_by_tags(&["h1", "h2", "h3"]).is_empty() {
            vec![Finding::performance(self.name(), 5, "Add headings for readability.")]
        } else {
            Vec::new()
        }
    }
}
