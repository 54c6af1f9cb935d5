use listing_dom::Document;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::passes::{RemoveActiveContent, ResponsiveBase, StripEventHandlers, StripKeyframes};

/// One step of the sanitization pipeline
pub trait SanitizePass: std::fmt::Debug {
    /// Stable identifier used in logs
    fn name(&self) -> &'static str;

    /// Rewrite the document, recording what changed in `report`
    fn apply(&self, doc: &mut Document, report: &mut SanitizeReport);
}

/// What a sanitization run changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizeReport {
    pub removed_elements: usize,
    pub removed_attributes: usize,
    pub stripped_keyframes: usize,
    /// True when the responsive baseline block had to be created
    pub inserted_responsive_base: bool,
}

impl SanitizeReport {
    pub fn is_clean(&self) -> bool {
        self.removed_elements == 0 && self.removed_attributes == 0 && self.stripped_keyframes == 0
    }
}

/// Ordered pipeline of passes
#[derive(Debug)]
pub struct Sanitizer {
    passes: Vec<Box<dyn SanitizePass>>,
}

impl Sanitizer {
    /// The full marketplace-safe pipeline
    pub fn new() -> Self {
        Self {
            passes: vec![
                Box::new(RemoveActiveContent),
                Box::new(StripEventHandlers::default()),
                Box::new(StripKeyframes),
                Box::new(ResponsiveBase),
            ],
        }
    }

    /// Only the event-handler pass plus the responsive baseline
    pub fn handlers_only() -> Self {
        Self {
            passes: vec![Box::new(StripEventHandlers::handlers_only()), Box::new(ResponsiveBase)],
        }
    }

    pub fn passes(&self) -> &[Box<dyn SanitizePass>] {
        &self.passes
    }

    pub fn run(&self, doc: &mut Document) -> SanitizeReport {
        let mut report = SanitizeReport::default();
        for pass in &self.passes {
            debug!(pass = pass.name(), "Running sanitize pass");
            pass.apply(doc, &mut report);
        }
        info!(
            removed_elements = report.removed_elements,
            removed_attributes = report.removed_attributes,
            stripped_keyframes = report.stripped_keyframes,
            "Sanitization complete"
        );
        report
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the full pipeline
pub fn sanitize(doc: &mut Document) -> SanitizeReport {
    Sanitizer::new().run(doc)
}

/// Remove inline `on*` handlers and ensure the responsive baseline, leaving
/// every element in place
pub fn strip_event_handlers(doc: &mut Document) -> SanitizeReport {
    Sanitizer::handlers_only().run(doc)
}
