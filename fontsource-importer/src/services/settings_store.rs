//! Settings persistence
//!
//! The whole [`PluginSettings`] document is kept in memory and written back
//! as JSON after every mutation. A mutation only becomes visible once the
//! write succeeded.

use fontsource_common::events::{EventBus, FontsourceEvent};
use fontsource_common::{Error, PluginSettings, Result};
use std::path::{Path, PathBuf};

pub struct SettingsStore {
    path: PathBuf,
    settings: PluginSettings,
    event_bus: EventBus,
}

impl SettingsStore {
    /// Read settings from `path`; a missing file means empty settings
    pub async fn load(path: impl Into<PathBuf>, event_bus: EventBus) -> Result<Self> {
        let path = path.into();
        let settings = match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                Error::Persistence(format!("{}: invalid settings JSON: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "No settings file yet, starting empty");
                PluginSettings::default()
            }
            Err(e) => return Err(Error::persistence(&path, e)),
        };

        Ok(Self {
            path,
            settings,
            event_bus,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> &PluginSettings {
        &self.settings
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Apply `change` to a copy, persist it, then commit it
    ///
    /// If persisting fails the in-memory settings are left untouched.
    pub async fn update<F, R>(&mut self, change: F) -> Result<R>
    where
        F: FnOnce(&mut PluginSettings) -> Result<R>,
    {
        let mut next = self.settings.clone();
        let output = change(&mut next)?;
        if next != self.settings {
            write_settings(&self.path, &next).await?;
            self.settings = next;
        }
        Ok(output)
    }

    /// Announce a committed change
    pub fn notify(&self, event: FontsourceEvent) {
        self.event_bus.emit_lossy(event);
    }
}

async fn write_settings(path: &Path, settings: &PluginSettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::persistence(parent, e))?;
    }

    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| Error::Internal(format!("serialize settings: {}", e)))?;

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, json)
        .await
        .map_err(|e| Error::persistence(&tmp, e))?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(Error::persistence(path, e));
    }

    tracing::debug!(path = %path.display(), fonts = settings.fonts.len(), "Settings saved");
    Ok(())
}
