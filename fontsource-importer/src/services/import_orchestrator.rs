//! Font import pipeline
//!
//! resolve metadata → download assets → render stylesheet → persist.
//! Nothing is written unless every step succeeded, and a record is only
//! returned once the stylesheet is on disk.

use crate::services::asset_downloader::AssetDownloader;
use crate::services::catalog_client::CatalogClient;
use crate::services::font_storage::{validate_identifier, FontStorage};
use crate::services::stylesheet;
use fontsource_common::{Result, SettingsRecord};
use std::sync::Arc;
use std::time::Instant;

pub struct ImportOrchestrator {
    catalog: Arc<CatalogClient>,
    downloader: AssetDownloader,
    storage: FontStorage,
}

impl ImportOrchestrator {
    pub fn new(catalog: Arc<CatalogClient>, downloader: AssetDownloader, storage: FontStorage) -> Self {
        Self {
            catalog,
            downloader,
            storage,
        }
    }

    /// Import `id`, replacing any stylesheet already stored for it
    pub async fn import(&self, id: &str) -> Result<SettingsRecord> {
        validate_identifier(id)?;
        let start = Instant::now();

        let descriptor = self.catalog.resolve(id).await?;
        let assets = self.downloader.populate(&descriptor).await?;
        let css = stylesheet::render(&descriptor, &assets)?;
        // Assets are dropped here; only the rendered text is kept
        drop(assets);

        let path = self.storage.write(&descriptor.id, &css).await?;

        tracing::info!(
            id = %descriptor.id,
            family = %descriptor.family,
            path = %path.display(),
            bytes = css.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Font imported"
        );

        Ok(descriptor.to_settings_record())
    }
}
