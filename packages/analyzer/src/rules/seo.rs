use listing_dom::{Document, LayoutSource};

use super::AnalysisRule;
use crate::finding::{Category, Finding};

// Text lengths are measured in UTF-16 code units, as browsers report them
const MAX_TITLE_CHARS: usize = 60;
const MIN_BODY_TEXT_CHARS: usize = 150;
const ALT_PENALTY_PER_IMAGE: u32 = 2;
const ALT_PENALTY_CAP: u32 = 15;

/// Title presence and length
pub struct TitleRule;

impl AnalysisRule for TitleRule {
    fn name(&self) -> &'static str {
        "seo-title"
    }

    fn description(&self) -> &'static str {
        "Documents need a <title> of at most 60 characters"
    }

    fn category(&self) -> Category {
        Category::Seo
    }

    fn check(&self, doc: &Document, _layout: &dyn LayoutSource) -> Vec<Finding> {
        let title = doc
            .first_by_tag("title")
            .map(|id| doc.text_content(id))
            .unwrap_or_default();

        if title.is_empty() {
            vec![Finding::seo(self.name(), 20, "Add a <title> tag.")]
        } else if title.encode_utf16().count() > MAX_TITLE_CHARS {
            vec![Finding::seo(self.name(), 5, "Shorten the title (≤60 chars).")]
        } else {
            Vec::new()
        }
    }
}

pub struct MetaDescriptionRule;

impl AnalysisRule for MetaDescriptionRule {
    fn name(&self) -> &'static str {
        "seo-meta-description"
    }

    fn description(&self) -> &'static str {
        "Documents need a non-empty <meta name=\"description\">"
    }

    fn category(&self) -> Category {
        Category::Seo
    }

    fn check(&self, doc: &Document, _layout: &dyn LayoutSource) -> Vec<Finding> {
        let meta = doc
            .elements_by_tag("meta")
            .into_iter()
            .find(|id| doc.attribute(*id, "name") == Some("description"));
        let has_content = meta
            .and_then(|id| doc.attribute(id, "content"))
            .map(|content| !content.trim().is_empty())
            .unwrap_or(false);

        if has_content {
            Vec::new()
        } else {
            vec![Finding::seo(
                self.name(),
                15,
                "Add a meta description (≤155 chars).",
            )]
        }
    }
}

/// At least one top-level heading
pub struct HeadingRule;

impl AnalysisRule for HeadingRule {
    fn name(&self) -> &'static str {
        "seo-heading"
    }

    fn description(&self) -> &'static str {
        "Documents need an <h1> or <h2>"
    }

    fn category(&self) -> Category {
        Category::Seo
    }

    fn check(&self, doc: &Document, _layout: &dyn LayoutSource) -> Vec<Finding> {
        if doc.elements_by_tags(&["h1", "h2"]).is_empty() {
            vec![Finding::seo(self.name(), 10, "Add an H1/H2 heading.")]
        } else {
            Vec::new()
        }
    }
}

pub struct ImageAltRule;

impl AnalysisRule for ImageAltRule {
    fn name(&self) -> &'static str {
        "seo-image-alt"
    }

    fn description(&self) -> &'static str {
        "Images need non-blank alt text"
    }

    fn category(&self) -> Category {
        Category::Seo
    }

    fn check(&self, doc: &Document, _layout: &dyn LayoutSource) -> Vec<Finding> {
        let missing = doc
            .elements_by_tag("img")
            .into_iter()
            .filter(|id| doc.attribute(*id, "alt").unwrap_or("").trim().is_empty())
            .count();

        if missing == 0 {
            return Vec::new();
        }
        let penalty = (missing as u32)
            .saturating_mul(ALT_PENALTY_PER_IMAGE)
            .min(ALT_PENALTY_CAP);
        vec![Finding::seo(
            self.name(),
            penalty,
            format!("{missing} image(s) missing alt text."),
        )]
    }
}

/// One deduction per link without text
pub struct EmptyAnchorRule;

impl AnalysisRule for EmptyAnchorRule {
    fn name(&self) -> &'static str {
        "seo-anchor-text"
    }

    fn description(&self) -> &'static str {
        "Links need anchor text"
    }

    fn category(&self) -> Category {
        Category::Seo
    }

    fn check(&self, doc: &Document, _layout: &dyn LayoutSource) -> Vec<Finding> {
        doc.elements_by_tag("a")
            .into_iter()
            .filter(|id| doc.text_content(*id).trim().is_empty())
            .map(|_| Finding::seo(self.name(), 2, "Some links lack anchor text."))
            .collect()
    }
}

pub struct BodyTextRule;

impl AnalysisRule for BodyTextRule {
    fn name(&self) -> &'static str {
        "seo-body-text"
    }

    fn description(&self) -> &'static str {
        "Listings need at least 150 characters of visible text"
    }

    fn category(&self) -> Category {
        Category::Seo
    }

    fn check(&self, doc: &Document, _layout: &dyn LayoutSource) -> Vec<Finding> {
        let length = doc
            .body()
            .map(|body| doc.visible_text(body).trim().encode_utf16().count())
            .unwrap_or(0);

        if length < MIN_BODY_TEXT_CHARS {
            vec![Finding::seo(self.name(), 10, "Add more descriptive text.")]
        } else {
            Vec::new()
        }
    }
}
