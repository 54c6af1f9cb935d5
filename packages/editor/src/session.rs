//! # Document Session
//!
//! Holds the document currently mounted in the rendering surface, its
//! baseline, the accent colour and the selected image.
//!
//! ## Loading
//!
//! Mounting is asynchronous, so a load is split in two:
//!
//! 1. [`DocumentSession::begin_load`] records the request and hands out a
//!    [`LoadTicket`] carrying a fresh generation number
//! 2. [`DocumentSession::complete_load`] installs the mounted tree, but only
//!    if the ticket is still the latest one issued
//!
//! A completion from an older load is discarded, so the session always ends
//! in the state of the most recently started load regardless of the order
//! in which mounts finish.
//!
//! ## Selection
//!
//! The selected image is an [`ImageRef`]: a node id tagged with the load
//! generation it belongs to. Every load clears it, and a ref from an older
//! generation never resolves.

use listing_analyzer::{analyze_with, Analysis, AnalyzeOptions};
use listing_dom::{Document, LayoutSource, NodeId, DOCTYPE};
use listing_sanitizer::{sanitize, strip_event_handlers, SanitizeReport};
use tracing::{debug, info};

use crate::ai::{alt_text_prompt, TextGenerator};
use crate::config::EditorConfig;
use crate::errors::EditorError;
use crate::history::HistoryManager;
use crate::image::{self, AspectLock, DeleteOutcome, ImageOptions};
use crate::storage::KeyValueStore;
use crate::surface::RenderSurface;
use crate::templates::{TemplateStore, UNTITLED};

/// `id` of the injected accent style block
pub const ACCENT_STYLE_ID: &str = "__accent_style__";

/// Outline drawn around the selected image
pub const SELECTION_OUTLINE: &str = "2px solid #16a34a";

/// Document mounted when a reset has nothing else to show
pub const FALLBACK_DOCUMENT: &str =
    "<!DOCTYPE html><html><head><meta charset=\"utf-8\"></head><body></body></html>";

pub const DEFAULT_ZOOM: u16 = 100;
pub const MIN_ZOOM: u16 = 25;
pub const MAX_ZOOM: u16 = 400;

fn breaks_declaration(c: char) -> bool {
    matches!(c, '<' | '>' | '{' | '}' | ';' | '"' | '\'' | '\\') || c.is_control()
}

/// Stylesheet mapping the theme variables to one colour
pub fn accent_css(color: &str) -> String {
    format!(
        ":root{{--green-600:{c};--green-700:{c};--green-500:{c}}} .feature-icon,.benefit-icon{{color:{c}!important}} .table-comparison th{{background:{c}!important}}",
        c = color
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    Loading,
    Loaded,
}

/// A started load waiting for its mount to finish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub html: String,
}

/// Image selection that only resolves within the load that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageRef {
    pub generation: u64,
    pub node: NodeId,
}

/// A pending ALT text request for the selected image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AltTextRequest {
    pub image: ImageRef,
    pub prompt: String,
}

/// Single editing session over one rendering surface
#[derive(Debug)]
pub struct DocumentSession {
    current_name: Option<String>,
    baseline_html: Option<String>,
    /// Markup most recently handed to the surface
    current_html: String,
    accent: String,
    default_accent: String,
    state: SessionState,
    document: Option<Document>,
    /// Latest generation issued by `begin_load`
    generation: u64,
    /// Generation of the mounted document
    mounted: u64,
    selection: Option<ImageRef>,
    aspect: AspectLock,
    zoom: u16,
}

impl DocumentSession {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            current_name: None,
            baseline_html: None,
            current_html: String::new(),
            accent: config.default_accent.clone(),
            default_accent: config.default_accent.clone(),
            state: SessionState::Empty,
            document: None,
            generation: 0,
            mounted: 0,
            selection: None,
            aspect: AspectLock::default(),
            zoom: DEFAULT_ZOOM,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current_name.as_deref()
    }

    pub fn baseline_html(&self) -> Option<&str> {
        self.baseline_html.as_deref()
    }

    pub fn accent(&self) -> &str {
        &self.accent
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn zoom(&self) -> u16 {
        self.zoom
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// Mutable access to the live tree, for in-place edits made by the host
    pub fn document_mut(&mut self) -> Option<&mut Document> {
        self.document.as_mut()
    }

    fn loaded(&self) -> Result<&Document, EditorError> {
        self.document.as_ref().ok_or(EditorError::NotLoaded)
    }

    fn loaded_mut(&mut self) -> Result<&mut Document, EditorError> {
        self.document.as_mut().ok_or(EditorError::NotLoaded)
    }

    // ---- Loading ----

    /// Start loading a named document. The markup becomes the new baseline.
    pub fn begin_load(&mut self, html: &str, name: Option<&str>) -> LoadTicket {
        self.baseline_html = Some(html.to_string());
        self.current_name = name.map(str::to_string);
        self.issue(html)
    }

    /// Start mounting markup without touching the name or baseline
    fn issue(&mut self, html: &str) -> LoadTicket {
        self.generation += 1;
        self.current_html = html.to_string();
        self.selection = None;
        self.aspect.unbind();
        self.state = SessionState::Loading;
        debug!(generation = self.generation, "Load started");
        LoadTicket {
            generation: self.generation,
            html: html.to_string(),
        }
    }

    /// Install a mounted tree. Returns false (and changes nothing) when a
    /// newer load has started since `ticket` was issued.
    pub fn complete_load(&mut self, ticket: &LoadTicket, document: Document) -> bool {
        if ticket.generation != self.generation {
            debug!(
                stale = ticket.generation,
                latest = self.generation,
                "Discarding stale load"
            );
            return false;
        }
        self.document = Some(document);
        self.mounted = ticket.generation;
        self.selection = None;
        self.state = SessionState::Loaded;
        self.inject_accent();
        info!(
            generation = ticket.generation,
            name = self.current_name.as_deref().unwrap_or(UNTITLED),
            "Document loaded"
        );
        true
    }

    /// Mount a ticket's markup on `surface` and complete the load
    pub async fn mount<R: RenderSurface>(
        &mut self,
        surface: &R,
        ticket: LoadTicket,
    ) -> Result<bool, EditorError> {
        let document = surface.mount(&ticket.html).await?;
        Ok(self.complete_load(&ticket, document))
    }

    /// Load a named document and wait for the surface
    pub async fn load<R: RenderSurface>(
        &mut self,
        surface: &R,
        html: &str,
        name: Option<&str>,
    ) -> Result<bool, EditorError> {
        let ticket = self.begin_load(html, name);
        self.mount(surface, ticket).await
    }

    /// Mount markup edited in the code view. The baseline is kept.
    pub fn apply_code(&mut self, html: &str) -> LoadTicket {
        self.issue(html)
    }

    /// Reload the baseline (or the current markup when there is none) and
    /// restore the default accent and zoom
    pub fn reset_to_baseline(&mut self) -> LoadTicket {
        self.accent = self.default_accent.clone();
        self.zoom = DEFAULT_ZOOM;
        let html = match (&self.baseline_html, self.current_html.is_empty()) {
            (Some(baseline), _) => baseline.clone(),
            (None, false) => self.current_html.clone(),
            (None, true) => FALLBACK_DOCUMENT.to_string(),
        };
        info!("Resetting to baseline");
        self.issue(&html)
    }

    // ---- Output ----

    /// Full document read from the live tree, with a doctype
    pub fn serialize(&self) -> Result<String, EditorError> {
        Ok(self.loaded()?.serialize())
    }

    /// Download name for the current document
    pub fn export_file_name(&self) -> String {
        format!("{}.html", self.current_name.as_deref().unwrap_or("edited"))
    }

    /// Sanitize the live document and serialize it. Returns the download
    /// name and markup.
    pub fn export_safe(&mut self) -> Result<(String, String), EditorError> {
        self.sanitize()?;
        let name = format!(
            "{}-ebay-safe.html",
            self.current_name.as_deref().unwrap_or("edited")
        );
        Ok((name, self.serialize()?))
    }

    /// Persist the live document under `name` and make it the baseline
    pub fn save_as<S: KeyValueStore>(
        &mut self,
        store: &TemplateStore<S>,
        name: &str,
    ) -> Result<String, EditorError> {
        let html = self.serialize()?;
        store.save(name, &html)?;
        store.set_last_selected(name);
        self.current_name = Some(name.to_string());
        self.baseline_html = Some(html.clone());
        Ok(html)
    }

    // ---- Theme ----

    /// Set the accent colour and push it into the mounted document.
    /// Values that could escape the CSS declaration are rejected.
    pub fn set_accent(&mut self, color: &str) -> Result<(), EditorError> {
        let color = color.trim();
        if color.is_empty() || color.chars().any(breaks_declaration) {
            return Err(EditorError::InvalidAccent(color.to_string()));
        }
        self.accent = color.to_string();
        self.inject_accent();
        Ok(())
    }

    fn inject_accent(&mut self) {
        let css = accent_css(&self.accent);
        let Some(doc) = self.document.as_mut() else {
            return;
        };
        if let Some(style) = doc.ensure_head_element("style", ACCENT_STYLE_ID) {
            doc.set_text(style, css);
        }
    }

    pub fn set_zoom(&mut self, percent: u16) {
        self.zoom = percent.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Zoom as a scale factor
    pub fn zoom_scale(&self) -> f64 {
        f64::from(self.zoom) / 100.0
    }

    // ---- Safety and analysis ----

    pub fn sanitize(&mut self) -> Result<SanitizeReport, EditorError> {
        let report = sanitize(self.loaded_mut()?);
        self.drop_detached_selection();
        Ok(report)
    }

    /// Remove inline event handlers only
    pub fn strip_event_handlers(&mut self) -> Result<SanitizeReport, EditorError> {
        Ok(strip_event_handlers(self.loaded_mut()?))
    }

    pub fn analyze(&self, layout: &dyn LayoutSource) -> Result<Analysis, EditorError> {
        Ok(analyze_with(self.loaded()?, layout, AnalyzeOptions::default()))
    }

    // ---- Selection ----

    /// Select an image, moving the highlight to it
    pub fn select_image(
        &mut self,
        node: NodeId,
        layout: &dyn LayoutSource,
    ) -> Result<ImageRef, EditorError> {
        let generation = self.mounted;
        let doc = self.loaded_mut()?;
        if !doc.is_element(node, "img") || !doc.is_attached(node) {
            return Err(EditorError::NotFound(format!("image node {}", node.index())));
        }

        for img in doc.elements_by_tag("img") {
            if doc.inline_style(img).get("outline").is_some() {
                doc.set_style_property(img, "outline", None);
            }
        }
        doc.set_style_property(node, "outline", Some(SELECTION_OUTLINE));

        let geometry = layout.image_geometry(doc, node);
        self.aspect.bind(&geometry);

        let image = ImageRef { generation, node };
        self.selection = Some(image);
        debug!(node = node.index(), generation, "Selected image");
        Ok(image)
    }

    /// Drop the selection and its highlight
    pub fn clear_selection(&mut self) {
        if let Some(node) = self.selected_image() {
            if let Some(doc) = self.document.as_mut() {
                doc.set_style_property(node, "outline", None);
            }
        }
        self.selection = None;
        self.aspect.unbind();
    }

    /// The selected image, if it still belongs to the mounted document
    pub fn selected_image(&self) -> Option<NodeId> {
        let selection = self.selection?;
        self.resolve(selection)
    }

    fn resolve(&self, image: ImageRef) -> Option<NodeId> {
        if self.state != SessionState::Loaded || image.generation != self.mounted {
            return None;
        }
        let doc = self.document.as_ref()?;
        doc.is_attached(image.node).then_some(image.node)
    }

    fn require_selection(&self) -> Result<NodeId, EditorError> {
        self.selected_image().ok_or(EditorError::NoSelection)
    }

    fn drop_detached_selection(&mut self) {
        if self.selected_image().is_none() {
            self.selection = None;
        }
    }

    pub fn aspect_lock(&self) -> &AspectLock {
        &self.aspect
    }

    pub fn set_aspect_locked(&mut self, enabled: bool) {
        self.aspect.enabled = enabled;
    }

    // ---- Image edits ----

    pub fn apply_image_options(
        &mut self,
        options: &ImageOptions,
        layout: &dyn LayoutSource,
    ) -> Result<(), EditorError> {
        let node = self.require_selection()?;
        let doc = self.loaded_mut()?;
        image::apply_image_options(doc, node, options, layout);
        Ok(())
    }

    /// Apply one option set to every image in the document
    pub fn apply_image_options_to_all(
        &mut self,
        options: &ImageOptions,
        layout: &dyn LayoutSource,
    ) -> Result<usize, EditorError> {
        let doc = self.loaded_mut()?;
        Ok(image::apply_to_all(doc, options, layout))
    }

    /// Drop every inline style of the selected image
    pub fn reset_image_style(&mut self) -> Result<(), EditorError> {
        let node = self.require_selection()?;
        self.loaded_mut()?.remove_attribute(node, "style");
        Ok(())
    }

    pub fn delete_selected_image(&mut self) -> Result<DeleteOutcome, EditorError> {
        let node = self.require_selection()?;
        let outcome = image::delete_image(self.loaded_mut()?, node);
        self.selection = None;
        self.aspect.unbind();
        info!(node = node.index(), "Deleted image");
        Ok(outcome)
    }

    // ---- ALT text ----

    /// Prompt for the selected image's ALT text
    pub fn alt_text_request(&self) -> Result<AltTextRequest, EditorError> {
        let node = self.require_selection()?;
        let selection = self.selection.ok_or(EditorError::NoSelection)?;
        let src = self.loaded()?.attribute(node, "src").unwrap_or("");
        Ok(AltTextRequest {
            image: selection,
            prompt: alt_text_prompt(src),
        })
    }

    /// Apply a generated ALT text if the image it was generated for is still
    /// selected in the same load. Returns whether it was applied.
    pub fn apply_alt_text(&mut self, image: ImageRef, text: &str) -> bool {
        if self.selection != Some(image) {
            return false;
        }
        let Some(node) = self.resolve(image) else {
            return false;
        };
        match self.document.as_mut() {
            Some(doc) => {
                doc.set_attribute(node, "alt", text.trim());
                true
            }
            None => false,
        }
    }

    /// Generate and apply ALT text for the selected image
    pub async fn generate_alt_text<G: TextGenerator>(
        &mut self,
        generator: &G,
        model: &str,
    ) -> Result<String, EditorError> {
        let request = self.alt_text_request()?;
        let text = generator.generate(&request.prompt, model).await?;
        let text = text.trim().to_string();
        self.apply_alt_text(request.image, &text);
        Ok(text)
    }

    // ---- History ----

    /// Label used for snapshots of the current document
    pub fn snapshot_label(&self) -> String {
        self.current_name
            .clone()
            .unwrap_or_else(|| UNTITLED.to_string())
    }

    /// Record the live document (without doctype) in `history`
    pub fn snapshot<S: KeyValueStore>(
        &self,
        history: &HistoryManager<S>,
        label: &str,
    ) -> Result<usize, EditorError> {
        let html = self.loaded()?.to_html();
        Ok(history.snapshot(label, &html))
    }

    /// Start loading a stored snapshot. The baseline is kept.
    pub fn restore_snapshot<S: KeyValueStore>(
        &mut self,
        history: &HistoryManager<S>,
        index: usize,
    ) -> Result<LoadTicket, EditorError> {
        let html = history.restore(index)?;
        info!(index, "Restoring snapshot");
        Ok(self.issue(&format!("{}\n{}", DOCTYPE, html)))
    }

    /// Visible text of the body, for writer prompts
    pub fn page_text(&self) -> String {
        self.document
            .as_ref()
            .and_then(|doc| doc.body().map(|body| doc.visible_text(body)))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use listing_dom::{parse, AttributeLayout};

    fn loaded(html: &str) -> DocumentSession {
        let mut session = DocumentSession::new(&EditorConfig::default());
        let ticket = session.begin_load(html, Some("Shoes"));
        assert!(session.complete_load(&ticket, parse(&ticket.html)));
        session
    }

    #[test]
    fn test_stale_completion_is_discarded() {
        let mut session = DocumentSession::new(&EditorConfig::default());
        let a = session.begin_load("<p>A</p>", Some("A"));
        let b = session.begin_load("<p>B</p>", Some("B"));

        assert!(session.complete_load(&b, parse(&b.html)));
        assert!(!session.complete_load(&a, parse(&a.html)));

        let html = session.serialize().unwrap();
        assert!(html.contains("<p>B</p>"));
        assert!(!html.contains("<p>A</p>"));
        assert_eq!(session.current_name(), Some("B"));
    }

    #[test]
    fn test_accent_injected_once() {
        let mut session = loaded("<p>x</p>");
        session.set_accent("#ff0000").unwrap();
        session.set_accent("#0000ff").unwrap();

        let doc = session.document().unwrap();
        let styles: Vec<_> = doc
            .elements_by_tag("style")
            .into_iter()
            .filter(|id| doc.attribute(*id, "id") == Some(ACCENT_STYLE_ID))
            .collect();
        assert_eq!(styles.len(), 1);
        assert_eq!(doc.raw_text(styles[0]), accent_css("#0000ff"));
    }

    #[test]
    fn test_accent_cannot_close_style_block() {
        let mut session = loaded("<p>x</p>");
        session.set_accent("rgb(22, 163, 74)").unwrap();

        let hostile = "red}</style><script>x()</script><style>";
        assert!(matches!(
            session.set_accent(hostile),
            Err(EditorError::InvalidAccent(_))
        ));
        assert_eq!(session.accent(), "rgb(22, 163, 74)");

        let (_, html) = session.export_safe().unwrap();
        assert!(!html.contains("<script"));
        assert!(html.contains(&accent_css("rgb(22, 163, 74)")));
    }

    #[test]
    fn test_selection_moves_highlight() {
        let mut session = loaded("<img id=\"a\" src=\"a.png\"><img id=\"b\" src=\"b.png\">");
        let doc = session.document().unwrap();
        let a = doc.element_by_id("a").unwrap();
        let b = doc.element_by_id("b").unwrap();

        session.select_image(a, &AttributeLayout).unwrap();
        session.select_image(b, &AttributeLayout).unwrap();
        session.select_image(b, &AttributeLayout).unwrap();

        let doc = session.document().unwrap();
        assert_eq!(doc.inline_style(a).get("outline"), None);
        assert_eq!(doc.inline_style(b).get("outline"), Some(SELECTION_OUTLINE));
        assert_eq!(session.selected_image(), Some(b));
    }

    #[test]
    fn test_selecting_non_image_fails() {
        let mut session = loaded("<p id=\"p\">x</p>");
        let p = session.document().unwrap().element_by_id("p").unwrap();
        assert!(matches!(
            session.select_image(p, &AttributeLayout),
            Err(EditorError::NotFound(_))
        ));
    }

    #[test]
    fn test_reload_invalidates_selection() {
        let mut session = loaded("<img src=\"a.png\">");
        let img = session.document().unwrap().first_by_tag("img").unwrap();
        let image = session.select_image(img, &AttributeLayout).unwrap();

        let ticket = session.apply_code("<img src=\"a.png\">");
        assert_eq!(session.selected_image(), None);
        session.complete_load(&ticket, parse(&ticket.html));

        assert_eq!(session.selected_image(), None);
        assert!(!session.apply_alt_text(image, "A red shoe"));
        assert!(matches!(session.reset_image_style(), Err(EditorError::NoSelection)));
    }

    #[test]
    fn test_reset_restores_baseline_accent_and_zoom() {
        let mut session = loaded("<p>base</p>");
        session.set_accent("#123456").unwrap();
        session.set_zoom(150);
        let edited = session.apply_code("<p>edited</p>");
        session.complete_load(&edited, parse(&edited.html));

        let ticket = session.reset_to_baseline();
        assert_eq!(ticket.html, "<p>base</p>");
        session.complete_load(&ticket, parse(&ticket.html));

        assert_eq!(session.accent(), "#16a34a");
        assert_eq!(session.zoom(), DEFAULT_ZOOM);
        assert!(session.serialize().unwrap().contains(&accent_css("#16a34a")));
    }

    #[test]
    fn test_reset_without_anything_uses_fallback() {
        let mut session = DocumentSession::new(&EditorConfig::default());
        assert_eq!(session.reset_to_baseline().html, FALLBACK_DOCUMENT);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut session = DocumentSession::new(&EditorConfig::default());
        session.set_zoom(5);
        assert_eq!(session.zoom(), MIN_ZOOM);
        session.set_zoom(1000);
        assert_eq!(session.zoom_scale(), 4.0);
    }

    #[test]
    fn test_export_names() {
        let mut session = loaded("<script>x()</script><p>ok</p>");
        assert_eq!(session.export_file_name(), "Shoes.html");

        let (name, html) = session.export_safe().unwrap();
        assert_eq!(name, "Shoes-ebay-safe.html");
        assert!(!html.contains("<script"));
        assert!(html.starts_with("<!DOCTYPE html>\n<html>"));
    }

    #[test]
    fn test_unloaded_session_reports_not_loaded() {
        let mut session = DocumentSession::new(&EditorConfig::default());
        assert_eq!(session.export_file_name(), "edited.html");
        assert!(matches!(session.serialize(), Err(EditorError::NotLoaded)));
        assert!(matches!(session.sanitize(), Err(EditorError::NotLoaded)));
    }

    #[test]
    fn test_aspect_lock_rebinds_on_select() {
        let mut session = loaded("<img src=\"a.png\" data-natural-width=\"800\" data-natural-height=\"400\">");
        session.set_aspect_locked(true);
        let img = session.document().unwrap().first_by_tag("img").unwrap();

        assert_eq!(session.aspect_lock().height_for_width(200.0), None);
        session.select_image(img, &AttributeLayout).unwrap();
        assert_eq!(session.aspect_lock().height_for_width(200.0), Some(100.0));
    }
}
