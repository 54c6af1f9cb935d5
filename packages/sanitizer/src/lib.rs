//! # Listing Sanitizer
//!
//! Marketplaces reject listings that carry active content. The sanitizer
//! rewrites a [`listing_dom::Document`] in place so that it passes:
//!
//! 1. remove `script`, `iframe`, `form`, `object` and `embed` elements
//! 2. drop `on*` event handler attributes, `autoplay` and `srcdoc`
//! 3. strip `@keyframes` blocks from every `<style>`
//! 4. insert (or refresh) the responsive baseline `<style>` block
//!
//! The order is fixed: attribute and style passes only ever see nodes that
//! survived the removal pass. Every pass is idempotent, so sanitizing twice
//! yields the same document as sanitizing once.
//!
//! ```rust
//! use listing_dom::parse;
//! use listing_sanitizer::sanitize;
//!
//! let mut doc = parse("<img src=\"a.png\" onerror=\"steal()\"><script>x()</script>");
//! let report = sanitize(&mut doc);
//! assert_eq!(report.removed_elements, 1);
//! assert!(!doc.serialize().contains("onerror"));
//! ```

mod keyframes;
mod passes;
mod sanitizer;

pub use keyframes::strip_keyframes;
pub use passes::{
    ensure_responsive_base, RemoveActiveContent, ResponsiveBase, StripEventHandlers,
    StripKeyframes, REMOVED_ELEMENTS, RESPONSIVE_BASE_CSS, RESPONSIVE_BASE_ID,
};
pub use sanitizer::{sanitize, strip_event_handlers, SanitizePass, SanitizeReport, Sanitizer};
