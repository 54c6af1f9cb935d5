//! # Listing Editor
//!
//! Editing engine for HTML product listings.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ templates: saved + admin templates → html   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ session: load → mounted Document            │
//! │  - Latest load wins                         │
//! │  - Image selection, accent, reset           │
//! │  - Sanitize / analyze / export              │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ history: bounded snapshots of the document  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Persistence goes through [`KeyValueStore`]; rendering goes through
//! [`RenderSurface`]; text generation goes through [`TextGenerator`].
//!
//! ## Usage
//!
//! ```rust
//! use listing_editor::{DocumentSession, EditorConfig, HeadlessSurface};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), listing_editor::EditorError> {
//! let mut session = DocumentSession::new(&EditorConfig::default());
//! session
//!     .load(&HeadlessSurface, "<h1>Shoes</h1>", Some("Shoes"))
//!     .await?;
//! session.set_accent("#2563eb")?;
//! assert!(session.serialize()?.contains("#2563eb"));
//! # Ok(())
//! # }
//! ```

pub mod ai;
mod config;
mod errors;
mod history;
pub mod image;
mod session;
mod storage;
mod surface;
mod templates;

pub use ai::{AiOutput, GeminiClient, TextGenerator, WriterGoal};
pub use config::{EditorConfig, DEFAULT_CONFIG_NAME};
pub use errors::{EditorError, StorageError};
pub use history::{AutoSnapshot, Capture, HistoryEntry, HistoryManager};
pub use image::{AspectLock, DeleteOutcome, ImageOptions, SizeMode};
pub use session::{
    accent_css, AltTextRequest, DocumentSession, ImageRef, LoadTicket, SessionState,
    ACCENT_STYLE_ID, DEFAULT_ZOOM, FALLBACK_DOCUMENT, MAX_ZOOM, MIN_ZOOM, SELECTION_OUTLINE,
};
pub use storage::{DirectoryStore, KeyValueStore, MemoryStore};
pub use surface::{HeadlessSurface, RenderSurface};
pub use templates::{
    blank_document, is_protected, list_admin_templates, AdminTemplate, AssetFetcher, FsFetcher,
    TemplateStore, ADMIN_PREFIX, DEFAULT_TEMPLATE_FILE, DEFAULT_TEMPLATE_VALUE, NEW_TEMPLATE,
    UNTITLED,
};

// Re-export the document model for hosts
pub use listing_dom::{Document, NodeId};
