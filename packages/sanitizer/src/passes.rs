use listing_dom::Document;
use tracing::debug;

use crate::keyframes::strip_keyframes;
use crate::sanitizer::{SanitizePass, SanitizeReport};

/// Elements that are removed together with their subtree
pub const REMOVED_ELEMENTS: [&str; 5] = ["script", "iframe", "form", "object", "embed"];

/// `id` of the injected responsive baseline block
pub const RESPONSIVE_BASE_ID: &str = "__responsive_base__";

pub const RESPONSIVE_BASE_CSS: &str = "html{font-size:clamp(15px,1.1vw,16px)}img{max-width:100%;height:auto;display:block}*{box-sizing:border-box}@media(prefers-reduced-motion:reduce){*{transition:none!important;animation:none!important}}";

/// Non-handler attributes that start playback or embed documents
const ACTIVE_ATTRIBUTES: [&str; 2] = ["autoplay", "srcdoc"];

#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveActiveContent;

impl SanitizePass for RemoveActiveContent {
    fn name(&self) -> &'static str {
        "remove-active-content"
    }

    fn apply(&self, doc: &mut Document, report: &mut SanitizeReport) {
        // Document order visits an outer match before anything nested in it;
        // nested matches are already detached with their ancestor
        for id in doc.elements_by_tags(&REMOVED_ELEMENTS) {
            if doc.is_attached(id) {
                doc.remove(id);
                report.removed_elements += 1;
            }
        }
    }
}

/// Drops `on*` attributes. The full pipeline also drops `autoplay` and
/// `srcdoc`.
#[derive(Debug, Clone, Copy)]
pub struct StripEventHandlers {
    active_attributes: bool,
}

impl StripEventHandlers {
    pub fn handlers_only() -> Self {
        Self {
            active_attributes: false,
        }
    }

    fn should_strip(&self, name: &str) -> bool {
        let lower = name.to_ascii_lowercase();
        lower.starts_with("on")
            || (self.active_attributes && ACTIVE_ATTRIBUTES.contains(&lower.as_str()))
    }
}

impl Default for StripEventHandlers {
    fn default() -> Self {
        Self {
            active_attributes: true,
        }
    }
}

impl SanitizePass for StripEventHandlers {
    fn name(&self) -> &'static str {
        "strip-event-handlers"
    }

    fn apply(&self, doc: &mut Document, report: &mut SanitizeReport) {
        for id in doc.elements() {
            let Some(el) = doc.element_mut(id) else {
                continue;
            };
            let before = el.attributes.len();
            el.attributes.retain(|attr| !self.should_strip(&attr.name));
            let removed = before - el.attributes.len();
            if removed > 0 {
                debug!(element = %el.name, removed, "Stripped attributes");
                report.removed_attributes += removed;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StripKeyframes;

impl SanitizePass for StripKeyframes {
    fn name(&self) -> &'static str {
        "strip-keyframes"
    }

    fn apply(&self, doc: &mut Document, report: &mut SanitizeReport) {
        for id in doc.elements_by_tag("style") {
            let css = doc.raw_text(id);
            let (stripped, removed) = strip_keyframes(&css);
            if removed > 0 {
                doc.set_text(id, stripped);
                report.stripped_keyframes += removed;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResponsiveBase;

impl SanitizePass for ResponsiveBase {
    fn name(&self) -> &'static str {
        "responsive-base"
    }

    fn apply(&self, doc: &mut Document, report: &mut SanitizeReport) {
        if ensure_responsive_base(doc) {
            report.inserted_responsive_base = true;
        }
    }
}

/// Make sure the responsive baseline block exists under `head` with the
/// canonical CSS. Returns true when the block was created.
pub fn ensure_responsive_base(doc: &mut Document) -> bool {
    let existed = doc.head_element("style", RESPONSIVE_BASE_ID).is_some();
    let Some(style) = doc.ensure_head_element("style", RESPONSIVE_BASE_ID) else {
        return false;
    };
    if doc.raw_text(style) != RESPONSIVE_BASE_CSS {
        doc.set_text(style, RESPONSIVE_BASE_CSS);
    }
    !existed
}

#[cfg(test)]
mod tests {
    use super::*;
    use listing_dom::parse;

    fn run(pass: &dyn SanitizePass, source: &str) -> (Document, SanitizeReport) {
        let mut doc = parse(source);
        let mut report = SanitizeReport::default();
        pass.apply(&mut doc, &mut report);
        (doc, report)
    }

    #[test]
    fn test_nested_active_content_counts_once() {
        let (doc, report) = run(
            &RemoveActiveContent,
            "<form><iframe src=\"x\"></iframe><input></form><object><embed src=\"y\"></object>",
        );

        assert_eq!(report.removed_elements, 2);
        assert!(doc.elements_by_tags(&REMOVED_ELEMENTS).is_empty());
    }

    #[test]
    fn test_handler_names_are_case_insensitive() {
        let (doc, report) = run(
            &StripEventHandlers::default(),
            "<video autoplay OnPlay=\"a()\" src=\"v.mp4\"></video><a onMouseOver=\"b()\" href=\"#\">x</a>",
        );

        assert_eq!(report.removed_attributes, 3);
        let video = doc.first_by_tag("video").unwrap();
        assert_eq!(doc.attribute(video, "src"), Some("v.mp4"));
        assert!(!doc.serialize().to_ascii_lowercase().contains(" on"));
    }

    #[test]
    fn test_handlers_only_keeps_autoplay() {
        let (doc, report) = run(
            &StripEventHandlers::handlers_only(),
            "<video autoplay onplay=\"a()\"></video>",
        );

        assert_eq!(report.removed_attributes, 1);
        let video = doc.first_by_tag("video").unwrap();
        assert!(doc.element(video).unwrap().has_attribute("autoplay"));
    }

    #[test]
    fn test_keyframes_removed_from_every_style_block() {
        let (doc, report) = run(
            &StripKeyframes,
            "<style>@keyframes a{to{opacity:1}}</style><body><style>p{}@keyframes b{}</style></body>",
        );

        assert_eq!(report.stripped_keyframes, 2);
        assert!(!doc.serialize().contains("@keyframes"));
    }

    #[test]
    fn test_responsive_base_refreshes_tampered_css() {
        let mut doc = parse("<p>x</p>");
        assert!(ensure_responsive_base(&mut doc));

        let style = doc.element_by_id(RESPONSIVE_BASE_ID).unwrap();
        doc.set_text(style, "img{}");
        assert!(!ensure_responsive_base(&mut doc));

        assert_eq!(doc.raw_text(style), RESPONSIVE_BASE_CSS);
        assert_eq!(doc.parent(style), doc.head());
    }

    #[test]
    fn test_responsive_base_leaves_body_ids_alone() {
        let mut doc = parse("<div id=\"__responsive_base__\"><p>Shoes</p></div>");
        let div = doc.elements_by_tag("div")[0];
        assert!(ensure_responsive_base(&mut doc));

        assert_eq!(doc.text_content(div), "Shoes");
        let style = doc.head_element("style", RESPONSIVE_BASE_ID).unwrap();
        assert_eq!(doc.raw_text(style), RESPONSIVE_BASE_CSS);
    }
}
