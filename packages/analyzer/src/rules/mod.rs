mod performance;
mod seo;

pub use performance::{HeadingsForReadabilityRule, ImageCountRule, LargeImageRule, StylesheetSizeRule};
pub use seo::{
    BodyTextRule, EmptyAnchorRule, HeadingRule, ImageAltRule, MetaDescriptionRule, TitleRule,
};

use crate::finding::{Category, Finding};
use listing_dom::{Document, LayoutSource};

/// Trait for implementing scoring rules
pub trait AnalysisRule {
    /// Unique identifier for this rule
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    fn category(&self) -> Category;

    /// Inspect the document and report deductions
    fn check(&self, doc: &Document, layout: &dyn LayoutSource) -> Vec<Finding>;
}

/// Ordered set of rules. Findings are reported in registration order, which
/// fixes the order of tips.
pub struct RuleRegistry {
    rules: Vec<Box<dyn AnalysisRule>>,
}

impl RuleRegistry {
    /// Create a new registry with all built-in rules, SEO rules first
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(TitleRule),
                Box::new(MetaDescriptionRule),
                Box::new(HeadingRule),
                Box::new(ImageAltRule),
                Box::new(EmptyAnchorRule),
                Box::new(BodyTextRule),
                Box::new(LargeImageRule),
                Box::new(ImageCountRule),
                Box::new(StylesheetSizeRule),
                Box::new(HeadingsForReadabilityRule),
            ],
        }
    }

    /// Get all registered rules
    pub fn rules(&self) -> &[Box<dyn AnalysisRule>] {
        &self.rules
    }

    /// Create an empty registry
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Add a custom rule to the registry
    pub fn add_rule(&mut self, rule: Box<dyn AnalysisRule>) {
        self.rules.push(rule);
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rules", &format!("{} rules", self.rules.len()))
            .finish()
    }
}
