//! Font library: settings, stylesheets and installed styles kept in step
//!
//! Every mutating operation persists first, then updates the installed
//! style blocks, then emits one [`FontsourceEvent`].

use crate::services::asset_downloader::AssetDownloader;
use crate::services::catalog_client::{build_http_client, CatalogClient, FontListing};
use crate::services::download_pool::DownloadPool;
use crate::services::font_storage::FontStorage;
use crate::services::import_orchestrator::ImportOrchestrator;
use crate::services::precedence;
use crate::services::settings_store::SettingsStore;
use crate::services::style_registry::{font_element_id, StyleRegistry, CSS_VARIABLES_ELEMENT_ID};
use fontsource_common::config::{FontsourcePaths, TomlConfig};
use fontsource_common::events::{EventBus, FontsourceEvent};
use fontsource_common::{
    Error, FontSlot, PluginSettings, PrecedenceEntry, Result, SettingsRecord,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub struct FontLibrary {
    catalog: Arc<CatalogClient>,
    importer: ImportOrchestrator,
    storage: FontStorage,
    store: SettingsStore,
    styles: StyleRegistry,
}

impl FontLibrary {
    /// Build the pipeline from configuration and load persisted settings
    ///
    /// `pool` is the process-wide download pool; pass the same one to every
    /// library that should share the concurrency ceiling.
    pub async fn open(
        config: &TomlConfig,
        paths: FontsourcePaths,
        pool: Arc<DownloadPool>,
        event_bus: EventBus,
    ) -> Result<Self> {
        config.validate()?;
        let http_client = build_http_client(Duration::from_secs(config.request_timeout_secs))?;

        let catalog = Arc::new(CatalogClient::with_client(
            http_client.clone(),
            &config.api_base_url,
        ));
        let downloader = AssetDownloader::new(http_client, &config.cdn_base_url, pool);
        let storage = FontStorage::new(paths.clone());
        let importer = ImportOrchestrator::new(Arc::clone(&catalog), downloader, storage.clone());
        let store = SettingsStore::load(paths.settings_path(), event_bus).await?;

        let mut library = Self {
            catalog,
            importer,
            storage,
            store,
            styles: StyleRegistry::new(),
        };
        library.restore_styles().await;
        Ok(library)
    }

    pub fn settings(&self) -> &PluginSettings {
        self.store.settings()
    }

    pub fn styles(&self) -> &StyleRegistry {
        &self.styles
    }

    pub fn event_bus(&self) -> &EventBus {
        self.store.event_bus()
    }

    /// Imported fonts in case-insensitive family order
    pub fn imported_fonts(&self) -> Vec<&SettingsRecord> {
        let mut fonts: Vec<&SettingsRecord> = self.settings().fonts.iter().collect();
        fonts.sort_by(|a, b| a.family.to_lowercase().cmp(&b.family.to_lowercase()));
        fonts
    }

    /// Search the remote catalog by family name
    pub async fn search_catalog(&self, query: &str) -> Result<Vec<FontListing>> {
        self.catalog.search(query).await
    }

    /// Active fonts whose family contains `query`, for slot selection
    pub fn search_active(&self, query: &str) -> Vec<&SettingsRecord> {
        let needle = query.to_lowercase();
        self.imported_fonts()
            .into_iter()
            .filter(|font| font.is_active && font.family.to_lowercase().contains(&needle))
            .collect()
    }

    /// Slot entries in precedence order
    pub fn slot_entries(&self, slot: FontSlot) -> Vec<PrecedenceEntry> {
        precedence::sorted(self.settings().slot(slot))
    }

    /// Import (or re-import) a font
    ///
    /// A re-import replaces the stored record but keeps its active flag; an
    /// active font has its installed style refreshed.
    ///
    /// A stylesheet written for a first-time import is deleted again if the
    /// settings cannot be saved.
    pub async fn import(&mut self, id: &str) -> Result<SettingsRecord> {
        let mut record = self.importer.import(id).await?;
        let previous = self.settings().font(&record.id).map(|f| f.is_active);
        let was_active = previous.unwrap_or(false);
        record.is_active = was_active;

        let stored = record.clone();
        let update = self
            .store
            .update(move |s| {
                s.upsert_font(stored);
                Ok(())
            })
            .await;

        if let Err(e) = update {
            if previous.is_none() {
                if let Err(cleanup_err) = self.storage.remove(&record.id).await {
                    tracing::error!(id = %record.id, error = %cleanup_err, "Could not remove orphaned stylesheet");
                }
            }
            return Err(e);
        }

        if was_active {
            let css = self.storage.read(&record.id).await?;
            self.styles.upsert(&font_element_id(&record.id), css);
        }

        self.store.notify(FontsourceEvent::FontImported {
            id: record.id.clone(),
            family: record.family.clone(),
            timestamp: chrono::Utc::now(),
        });
        Ok(record)
    }

    /// Delete a font, its stylesheet and every slot entry referencing it
    ///
    /// On failure the font entry and its stylesheet are left as they were.
    pub async fn remove(&mut self, id: &str) -> Result<SettingsRecord> {
        let record = self
            .settings()
            .font(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("font '{}' is not imported", id)))?;

        let backup = self.storage.read(id).await.ok();
        self.storage.remove(id).await?;

        let removed_id = id.to_string();
        let update = self
            .store
            .update(move |s| {
                s.fonts.retain(|f| f.id != removed_id);
                s.purge_from_slots(&removed_id);
                Ok(())
            })
            .await;

        if let Err(e) = update {
            if let Some(css) = backup {
                if let Err(restore_err) = self.storage.write(id, &css).await {
                    tracing::error!(id = %id, error = %restore_err, "Could not restore stylesheet");
                }
            }
            return Err(e);
        }

        self.styles.remove(&font_element_id(id));
        self.refresh_css_variables();

        tracing::info!(id = %id, family = %record.family, "Font removed");
        self.store.notify(FontsourceEvent::FontRemoved {
            id: record.id.clone(),
            family: record.family.clone(),
            timestamp: chrono::Utc::now(),
        });
        Ok(record)
    }

    /// Turn a font on or off
    ///
    /// Turning off also purges the font from every slot.
    pub async fn set_active(&mut self, id: &str, active: bool) -> Result<()> {
        if self.settings().font(id).is_none() {
            return Err(Error::NotFound(format!("font '{}' is not imported", id)));
        }

        let toggled_id = id.to_string();
        if active {
            let css = self.storage.read(id).await?;
            self.store
                .update(move |s| {
                    if let Some(font) = s.font_mut(&toggled_id) {
                        font.is_active = true;
                    }
                    Ok(())
                })
                .await?;
            self.styles.upsert(&font_element_id(id), css);
        } else {
            self.store
                .update(move |s| {
                    if let Some(font) = s.font_mut(&toggled_id) {
                        font.is_active = false;
                    }
                    s.purge_from_slots(&toggled_id);
                    Ok(())
                })
                .await?;
            self.styles.remove(&font_element_id(id));
        }
        self.refresh_css_variables();

        tracing::info!(id = %id, active, "Font toggled");
        self.store.notify(FontsourceEvent::FontToggled {
            id: id.to_string(),
            active,
            timestamp: chrono::Utc::now(),
        });
        Ok(())
    }

    /// Add an active font to a slot with precedence 0
    ///
    /// Returns `false` if it was already selected for that slot.
    pub async fn add_to_slot(&mut self, slot: FontSlot, id: &str) -> Result<bool> {
        let font = self
            .settings()
            .font(id)
            .ok_or_else(|| Error::NotFound(format!("font '{}' is not imported", id)))?;
        if !font.is_active {
            return Err(Error::InvalidInput(format!(
                "{} must be enabled before it can be selected",
                font.family
            )));
        }
        if self.settings().slot(slot).iter().any(|entry| entry.id == id) {
            return Ok(false);
        }

        let entry = PrecedenceEntry {
            id: font.id.clone(),
            family: font.family.clone(),
            precedence: 0,
        };
        self.store
            .update(move |s| {
                let list = s.slot_mut(slot);
                list.push(entry);
                precedence::sort_entries(list);
                Ok(())
            })
            .await?;

        self.slot_changed(slot);
        Ok(true)
    }

    pub async fn remove_from_slot(&mut self, slot: FontSlot, id: &str) -> Result<()> {
        if !self.settings().slot(slot).iter().any(|entry| entry.id == id) {
            return Err(Error::NotFound(format!("font '{}' is not selected for {}", id, slot)));
        }

        let removed_id = id.to_string();
        self.store
            .update(move |s| {
                s.slot_mut(slot).retain(|entry| entry.id != removed_id);
                Ok(())
            })
            .await?;

        self.slot_changed(slot);
        Ok(())
    }

    /// Re-prioritize a slot entry from user input (digits only)
    pub async fn set_precedence(&mut self, slot: FontSlot, id: &str, input: &str) -> Result<()> {
        let value = precedence::parse_precedence(input)?;
        let target = id.to_string();
        self.store
            .update(move |s| {
                let list = s.slot_mut(slot);
                let entry = list
                    .iter_mut()
                    .find(|entry| entry.id == target)
                    .ok_or_else(|| {
                        Error::NotFound(format!("font '{}' is not selected for {}", target, slot))
                    })?;
                entry.precedence = value;
                precedence::sort_entries(list);
                Ok(())
            })
            .await?;

        self.slot_changed(slot);
        Ok(())
    }

    /// Write every installed style block to one stylesheet file
    pub async fn write_applied(&self, path: &Path) -> Result<usize> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::persistence(parent, e))?;
        }
        tokio::fs::write(path, self.styles.render())
            .await
            .map_err(|e| Error::persistence(path, e))?;

        let blocks = self.styles.len();
        tracing::debug!(path = %path.display(), blocks, "Applied stylesheet written");
        self.store.notify(FontsourceEvent::StylesApplied {
            path: path.display().to_string(),
            blocks,
            timestamp: chrono::Utc::now(),
        });
        Ok(blocks)
    }

    /// Install every active font's stylesheet and the CSS variables
    async fn restore_styles(&mut self) {
        let active: Vec<String> = self
            .settings()
            .fonts
            .iter()
            .filter(|f| f.is_active)
            .map(|f| f.id.clone())
            .collect();

        for id in active {
            match self.storage.read(&id).await {
                Ok(css) => self.styles.upsert(&font_element_id(&id), css),
                Err(e) => tracing::warn!(id = %id, error = %e, "Active font has no stylesheet"),
            }
        }
        self.refresh_css_variables();
    }

    fn refresh_css_variables(&mut self) {
        match precedence::css_variables_block(self.settings()) {
            Some(css) => self.styles.upsert(CSS_VARIABLES_ELEMENT_ID, css),
            None => {
                self.styles.remove(CSS_VARIABLES_ELEMENT_ID);
            }
        }
    }

    fn slot_changed(&mut self, slot: FontSlot) {
        self.refresh_css_variables();
        self.store.notify(FontsourceEvent::SlotChanged {
            slot,
            font_family: precedence::font_family_value(self.settings().slot(slot)),
            timestamp: chrono::Utc::now(),
        });
    }
}
