//! # Template Store
//!
//! User templates are a name → html mapping persisted as one JSON object.
//! Admin templates come from a read-only manifest and are addressed with a
//! `file:` selection value; they never enter the mapping.
//!
//! Persistence is best effort: a store that cannot be read lists as empty,
//! and failed writes are logged and dropped.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::EditorConfig;
use crate::errors::EditorError;
use crate::storage::KeyValueStore;

/// Selection values starting with this prefix refer to admin files
pub const ADMIN_PREFIX: &str = "file:";

/// Selection value of the built-in template bundled with the editor
pub const DEFAULT_TEMPLATE_VALUE: &str = "__default";

/// Asset behind [`DEFAULT_TEMPLATE_VALUE`]
pub const DEFAULT_TEMPLATE_FILE: &str = "template.html";

pub const UNTITLED: &str = "Untitled";
pub const NEW_TEMPLATE: &str = "New Template";

/// Read-only template listed by the admin manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminTemplate {
    pub name: String,
    pub file: String,
}

impl AdminTemplate {
    /// Selection value for this template
    pub fn value(&self) -> String {
        format!("{}{}", ADMIN_PREFIX, self.file)
    }
}

/// True for selection values the user may not delete or overwrite
pub fn is_protected(value: &str) -> bool {
    value == DEFAULT_TEMPLATE_VALUE || value.starts_with(ADMIN_PREFIX)
}

/// Source of static editor assets (manifest, admin templates)
#[allow(async_fn_in_trait)]
pub trait AssetFetcher {
    async fn fetch(&self, path: &str) -> Result<String, EditorError>;
}

/// Reads assets from a directory on disk
#[derive(Debug, Clone)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetFetcher for FsFetcher {
    async fn fetch(&self, path: &str) -> Result<String, EditorError> {
        let relative = path.trim_start_matches('/');
        if Path::new(relative)
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(EditorError::NotFound(path.to_string()));
        }
        match tokio::fs::read_to_string(self.root.join(relative)).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(EditorError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Starter document created by "new template"
pub fn blank_document(title: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"><title>{title}</title></head><body style=\"font-family: Arial, sans-serif; padding: 16px;\">Start editing...</body></html>"
    )
}

/// Placeholder document used when nothing else is available
pub fn minimal_stub(title: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"><title>{title}</title></head><body style=\"font-family: Arial, sans-serif; padding: 16px;\">{title} content</body></html>"
    )
}

/// Template name derived from an uploaded file name
pub fn template_name_from_file(file_name: &str) -> String {
    let lower = file_name.to_ascii_lowercase();
    for ext in [".html", ".htm"] {
        if lower.ends_with(ext) {
            return file_name[..file_name.len() - ext.len()].to_string();
        }
    }
    file_name.to_string()
}

/// Turn a manifest document into admin entries.
///
/// Entries without a non-empty string `name` and `file` are skipped. A
/// `templates` field that is not an array yields no entries.
pub fn parse_manifest(source: &str) -> Result<Vec<AdminTemplate>, EditorError> {
    let value: serde_json::Value = serde_json::from_str(source)
        .map_err(|e| EditorError::ManifestUnavailable(e.to_string()))?;

    let Some(items) = value.get("templates").and_then(|t| t.as_array()) else {
        return Ok(Vec::new());
    };

    Ok(items
        .iter()
        .filter_map(|item| {
            let name = item.get("name")?.as_str()?;
            let file = item.get("file")?.as_str()?;
            if name.is_empty() || file.is_empty() {
                return None;
            }
            Some(AdminTemplate {
                name: name.to_string(),
                file: file.to_string(),
            })
        })
        .collect())
}

fn admin_name_for(path: &str) -> String {
    let file = path.rsplit('/').next().unwrap_or(path);
    format!("Admin: {}", template_name_from_file(file))
}

/// List admin templates from the manifest, fetching fixed candidates when the
/// manifest is missing or unreadable.
///
/// Candidate fetches run concurrently; the result keeps candidate order and contains
/// only the files that could be fetched.
pub async fn list_admin_templates<F: AssetFetcher>(
    fetcher: &F,
    config: &EditorConfig,
) -> Vec<AdminTemplate> {
    let manifest = match fetcher.fetch(&config.manifest_path).await {
        Ok(source) => parse_manifest(&source),
        Err(e) => Err(EditorError::ManifestUnavailable(e.to_string())),
    };

    match manifest {
        Ok(templates) => {
            debug!(count = templates.len(), "Loaded admin manifest");
            templates
        }
        Err(e) => {
            debug!(error = %e, "Falling back to admin candidates");
            let fetches = config
                .fallback_candidates
                .iter()
                .map(|path| async move { (path, fetcher.fetch(path).await) });

            join_all(fetches)
                .await
                .into_iter()
                .filter_map(|(path, result)| {
                    result.ok().map(|_| AdminTemplate {
                        name: admin_name_for(path),
                        file: path.clone(),
                    })
                })
                .collect()
        }
    }
}

/// User template mapping plus the last-selected marker
#[derive(Debug)]
pub struct TemplateStore<S: KeyValueStore> {
    store: S,
    templates_key: String,
    last_key: String,
}

impl<S: KeyValueStore> TemplateStore<S> {
    pub fn new(store: S, config: &EditorConfig) -> Self {
        Self {
            store,
            templates_key: config.templates_key.clone(),
            last_key: config.last_template_key.clone(),
        }
    }

    /// All user templates. Unreadable or corrupt storage lists as empty.
    pub fn list(&self) -> BTreeMap<String, String> {
        let raw = match self.store.get(&self.templates_key) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Template storage unreadable");
                return BTreeMap::new();
            }
        };
        match raw {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Template storage corrupt");
                BTreeMap::new()
            }),
            None => BTreeMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.list().remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.list().contains_key(name)
    }

    /// Insert or overwrite a template. Admin and default selection values
    /// are read-only.
    pub fn save(&self, name: &str, html: &str) -> Result<(), EditorError> {
        if is_protected(name) {
            return Err(EditorError::ReadOnly(name.to_string()));
        }
        self.insert(name, html);
        Ok(())
    }

    fn insert(&self, name: &str, html: &str) {
        let mut templates = self.list();
        templates.insert(name.to_string(), html.to_string());
        self.persist(&templates);
        info!(name = %name, "Saved template");
    }

    /// Remove a user template. Protected values and unknown names are
    /// refused without touching storage.
    pub fn delete(&self, name: &str) -> Result<(), EditorError> {
        if is_protected(name) {
            return Err(EditorError::NotDeletable(name.to_string()));
        }
        let mut templates = self.list();
        if templates.remove(name).is_none() {
            return Err(EditorError::NotDeletable(name.to_string()));
        }
        self.persist(&templates);
        info!(name = %name, "Deleted template");
        Ok(())
    }

    pub fn last_selected(&self) -> Option<String> {
        match self.store.get(&self.last_key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!(error = %e, "Last template marker unreadable");
                None
            }
        }
    }

    pub fn set_last_selected(&self, value: &str) {
        if let Err(e) = self.store.set(&self.last_key, value) {
            warn!(error = %e, "Failed to store last template marker");
        }
    }

    /// Pick the selection to open at startup: the last selected value if it
    /// still exists, then the first admin template, then the first saved one.
    /// With nothing available an `Untitled` stub is created and saved.
    pub fn choose_initial(&self, admin: &[AdminTemplate]) -> String {
        let saved = self.list();

        if let Some(last) = self.last_selected() {
            let known = saved.contains_key(&last) || admin.iter().any(|a| a.value() == last);
            if known {
                return last;
            }
        }
        if let Some(first) = admin.first() {
            return first.value();
        }
        if let Some(first) = saved.keys().next() {
            return first.clone();
        }

        self.insert(UNTITLED, &minimal_stub(UNTITLED));
        UNTITLED.to_string()
    }

    /// Save a blank starter document. Blank names become `New Template`.
    pub fn create_blank(&self, name: &str) -> Result<(String, String), EditorError> {
        let name = match name.trim() {
            "" => NEW_TEMPLATE.to_string(),
            trimmed => trimmed.to_string(),
        };
        let html = blank_document(&name);
        self.save(&name, &html)?;
        self.set_last_selected(&name);
        Ok((name, html))
    }

    /// Store an uploaded file under its name without the html extension
    pub fn import_upload(&self, file_name: &str, html: &str) -> Result<String, EditorError> {
        let name = template_name_from_file(file_name);
        self.save(&name, html)?;
        self.set_last_selected(&name);
        Ok(name)
    }

    /// Store pasted markup under a timestamped name. Empty text is ignored.
    pub fn import_clipboard(&self, text: &str, now: DateTime<Local>) -> Option<String> {
        if text.is_empty() {
            return None;
        }
        let name = format!("Clipboard {}", now.format("%Y-%m-%d %H:%M:%S"));
        self.insert(&name, text);
        self.set_last_selected(&name);
        Some(name)
    }

    /// Resolve a selection value to markup
    pub async fn open<F: AssetFetcher>(&self, value: &str, fetcher: &F) -> Result<String, EditorError> {
        if value == DEFAULT_TEMPLATE_VALUE {
            return fetcher.fetch(DEFAULT_TEMPLATE_FILE).await;
        }
        if let Some(file) = value.strip_prefix(ADMIN_PREFIX) {
            return fetcher.fetch(file).await;
        }
        match self.get(value) {
            Some(html) => Ok(html),
            // The stub may not have persisted when storage is offline
            None if value == UNTITLED => Ok(minimal_stub(UNTITLED)),
            None => Err(EditorError::NotFound(format!("template '{}'", value))),
        }
    }

    fn persist(&self, templates: &BTreeMap<String, String>) {
        let encoded = match serde_json::to_string(templates) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!(error = %e, "Failed to encode templates");
                return;
            }
        };
        if let Err(e) = self.store.set(&self.templates_key, &encoded) {
            warn!(error = %e, "Failed to persist templates");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;
    use std::collections::HashMap;

    struct MapFetcher(HashMap<String, String>);

    impl MapFetcher {
        fn new(files: &[(&str, &str)]) -> Self {
            Self(
                files
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            )
        }
    }

    impl AssetFetcher for MapFetcher {
        async fn fetch(&self, path: &str) -> Result<String, EditorError> {
            self.0
                .get(path)
                .cloned()
                .ok_or_else(|| EditorError::NotFound(path.to_string()))
        }
    }

    fn store() -> TemplateStore<MemoryStore> {
        TemplateStore::new(MemoryStore::new(), &EditorConfig::default())
    }

    #[test]
    fn test_save_overwrites() {
        let templates = store();
        templates.save("Shoes", "<p>v1</p>").unwrap();
        templates.save("Shoes", "<p>v2</p>").unwrap();

        assert_eq!(templates.list().len(), 1);
        assert_eq!(templates.get("Shoes"), Some("<p>v2</p>".to_string()));
    }

    #[test]
    fn test_corrupt_storage_lists_empty() {
        let backend = MemoryStore::new();
        backend.set("visual-editor-templates", "{not json").unwrap();
        let templates = TemplateStore::new(&backend, &EditorConfig::default());

        assert!(templates.list().is_empty());
    }

    #[test]
    fn test_delete_refuses_protected_and_unknown() {
        let templates = store();
        templates.save("Shoes", "<p>x</p>").unwrap();

        for name in ["file:admin_templates/template.html", "__default", "Hats"] {
            assert!(matches!(templates.delete(name), Err(EditorError::NotDeletable(_))));
        }
        assert_eq!(templates.list().len(), 1);

        templates.delete("Shoes").unwrap();
        assert!(templates.list().is_empty());
    }

    #[test]
    fn test_offline_store_degrades() {
        let backend = MemoryStore::new();
        backend.set_available(false);
        let templates = TemplateStore::new(&backend, &EditorConfig::default());

        templates.save("Shoes", "<p>x</p>").unwrap();
        assert!(templates.list().is_empty());
        assert_eq!(templates.last_selected(), None);
    }

    #[test]
    fn test_choose_initial_order() {
        let templates = store();
        let admin = vec![AdminTemplate {
            name: "Admin: template".to_string(),
            file: "admin_templates/template.html".to_string(),
        }];

        assert_eq!(templates.choose_initial(&[]), UNTITLED);
        assert!(templates.contains(UNTITLED));

        assert_eq!(templates.choose_initial(&admin), "file:admin_templates/template.html");

        templates.set_last_selected("Gone");
        assert_eq!(templates.choose_initial(&[]), UNTITLED);

        templates.save("Bags", "<p>b</p>").unwrap();
        templates.set_last_selected("Bags");
        assert_eq!(templates.choose_initial(&admin), "Bags");
    }

    #[test]
    fn test_admin_values_are_read_only() {
        let templates = store();
        assert!(matches!(
            templates.save("file:admin_templates/template.html", "<p>x</p>"),
            Err(EditorError::ReadOnly(_))
        ));
        assert!(templates.list().is_empty());
    }

    #[test]
    fn test_create_blank_names() {
        let templates = store();
        let (name, html) = templates.create_blank("   ").unwrap();

        assert_eq!(name, NEW_TEMPLATE);
        assert!(html.contains("<title>New Template</title>"));
        assert_eq!(templates.last_selected(), Some(NEW_TEMPLATE.to_string()));
    }

    #[test]
    fn test_import_upload_strips_extension() {
        let templates = store();
        assert_eq!(templates.import_upload("summer-sale.HTML", "<p>x</p>").unwrap(), "summer-sale");
        assert_eq!(templates.import_upload("page.htm", "<p>y</p>").unwrap(), "page");
        assert_eq!(templates.import_upload("notes.txt", "<p>z</p>").unwrap(), "notes.txt");
        assert_eq!(templates.last_selected(), Some("notes.txt".to_string()));
    }

    #[test]
    fn test_import_clipboard() {
        let templates = store();
        let now = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();

        assert_eq!(templates.import_clipboard("", now), None);
        let name = templates.import_clipboard("<p>pasted</p>", now).unwrap();
        assert_eq!(name, "Clipboard 2024-03-09 14:05:00");
        assert_eq!(templates.get(&name), Some("<p>pasted</p>".to_string()));
    }

    #[test]
    fn test_parse_manifest_filters_entries() {
        let manifest = r#"{"templates":[{"name":"A","file":"a.html"},{"name":"","file":"b.html"},{"file":"c.html"},{"name":"D","file":"d.html"}]}"#;
        let parsed = parse_manifest(manifest).unwrap();
        assert_eq!(
            parsed.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
            vec!["A", "D"]
        );

        assert!(parse_manifest(r#"{"templates":"nope"}"#).unwrap().is_empty());
        assert!(matches!(
            parse_manifest("<html>"),
            Err(EditorError::ManifestUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_admin_list_prefers_manifest() {
        let fetcher = MapFetcher::new(&[
            (
                "admin_templates/manifest.json",
                r#"{"templates":[{"name":"Summer","file":"admin_templates/summer.html"}]}"#,
            ),
            ("admin_templates/template.html", "<p>t</p>"),
        ]);
        let admin = list_admin_templates(&fetcher, &EditorConfig::default()).await;

        assert_eq!(admin.len(), 1);
        assert_eq!(admin[0].name, "Summer");
    }

    #[tokio::test]
    async fn test_admin_list_falls_back_in_candidate_order() {
        let fetcher = MapFetcher::new(&[
            ("admin_templates/manifest.json", "not json"),
            ("admin_templates/template2.html", "<p>2</p>"),
            ("admin_templates/template.html", "<p>1</p>"),
        ]);
        let admin = list_admin_templates(&fetcher, &EditorConfig::default()).await;

        assert_eq!(
            admin,
            vec![
                AdminTemplate {
                    name: "Admin: template".to_string(),
                    file: "admin_templates/template.html".to_string(),
                },
                AdminTemplate {
                    name: "Admin: template2".to_string(),
                    file: "admin_templates/template2.html".to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_admin_list_keeps_only_fetched_candidates() {
        let fetcher = MapFetcher::new(&[("admin_templates/template2.html", "<p>2</p>")]);
        let admin = list_admin_templates(&fetcher, &EditorConfig::default()).await;

        assert_eq!(admin.len(), 1);
        assert_eq!(admin[0].file, "admin_templates/template2.html");
    }

    #[tokio::test]
    async fn test_open_resolves_both_kinds() {
        let templates = store();
        templates.save("Shoes", "<p>saved</p>").unwrap();
        let fetcher = MapFetcher::new(&[("admin_templates/template.html", "<p>admin</p>")]);

        assert_eq!(templates.open("Shoes", &fetcher).await.unwrap(), "<p>saved</p>");
        assert_eq!(
            templates
                .open("file:admin_templates/template.html", &fetcher)
                .await
                .unwrap(),
            "<p>admin</p>"
        );
        assert!(matches!(
            templates.open("Hats", &fetcher).await,
            Err(EditorError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_offline_initial_choice_opens() {
        let backend = MemoryStore::new();
        backend.set_available(false);
        let templates = TemplateStore::new(&backend, &EditorConfig::default());
        let fetcher = MapFetcher::new(&[]);

        let initial = templates.choose_initial(&[]);
        assert_eq!(initial, UNTITLED);
        assert!(!templates.contains(UNTITLED));

        let html = templates.open(&initial, &fetcher).await.unwrap();
        assert_eq!(html, minimal_stub(UNTITLED));
    }
}
