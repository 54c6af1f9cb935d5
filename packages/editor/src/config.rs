use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::errors::EditorError;

pub const DEFAULT_CONFIG_NAME: &str = "listing-editor.config.json";

/// Editor configuration file format. Every field has a default, so a partial
/// file only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Storage key of the saved template mapping
    pub templates_key: String,

    /// Storage key of the snapshot history list
    pub history_key: String,

    /// Storage key of the last selected template marker
    pub last_template_key: String,

    /// Storage key of the auto-snapshot preference
    pub history_auto_key: String,

    pub default_accent: String,

    /// Maximum number of snapshots kept
    pub history_capacity: usize,

    pub auto_snapshot_secs: u64,

    /// Admin template manifest, relative to the asset root
    pub manifest_path: String,

    /// Files tried when the manifest is missing or malformed
    pub fallback_candidates: Vec<String>,

    pub ai_model: String,

    /// Base URL of the generative language API
    pub ai_endpoint: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            templates_key: "visual-editor-templates".to_string(),
            history_key: "visual-editor-history".to_string(),
            last_template_key: "visual-editor-last".to_string(),
            history_auto_key: "visual-editor-history-auto".to_string(),
            default_accent: "#16a34a".to_string(),
            history_capacity: 30,
            auto_snapshot_secs: 60,
            manifest_path: "admin_templates/manifest.json".to_string(),
            fallback_candidates: vec![
                "admin_templates/template.html".to_string(),
                "admin_templates/template2.html".to_string(),
            ],
            ai_model: "gemini-1.5-flash".to_string(),
            ai_endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }
}

impl EditorConfig {
    /// Load config from a directory
    pub fn load(dir: &Path) -> Result<Self, EditorError> {
        let config_path = dir.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: EditorConfig = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(EditorConfig::default())
        }
    }

    pub fn auto_snapshot_period(&self) -> Duration {
        Duration::from_secs(self.auto_snapshot_secs.max(1))
    }
}
