use anyhow::{Context as _, Result};
use listing_editor::{
    DirectoryStore, EditorConfig, FsFetcher, HistoryManager, TemplateStore, DEFAULT_CONFIG_NAME,
};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory used for saved templates and history when `--store` is not given
pub const DEFAULT_STORE_DIR: &str = ".listing-editor";

/// Resolved locations and configuration shared by every command
#[derive(Debug, Clone)]
pub struct Context {
    pub config: EditorConfig,
    /// Directory-backed key-value store
    pub store_dir: PathBuf,
    /// Asset root for admin templates
    pub root: PathBuf,
}

impl Context {
    /// Load `listing-editor.config.json` from `root` (defaults when absent)
    pub fn load(store_dir: &Path, root: &Path) -> Result<Self> {
        let config = EditorConfig::load(root)
            .with_context(|| format!("Failed to read {}", root.join(DEFAULT_CONFIG_NAME).display()))?;
        debug!(store = %store_dir.display(), root = %root.display(), "Loaded configuration");
        Ok(Self {
            config,
            store_dir: store_dir.to_path_buf(),
            root: root.to_path_buf(),
        })
    }

    fn store(&self) -> DirectoryStore {
        DirectoryStore::new(&self.store_dir)
    }

    pub fn templates(&self) -> TemplateStore<DirectoryStore> {
        TemplateStore::new(self.store(), &self.config)
    }

    pub fn history(&self) -> HistoryManager<DirectoryStore> {
        HistoryManager::new(self.store(), &self.config)
    }

    pub fn fetcher(&self) -> FsFetcher {
        FsFetcher::new(&self.root)
    }
}
