//! Persisted stylesheets, one `{id}.css` per imported font

use fontsource_common::config::FontsourcePaths;
use fontsource_common::{Error, Result};
use std::path::PathBuf;

/// Reject identifiers that could escape the fonts directory
pub fn validate_identifier(id: &str) -> Result<()> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        && !id.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!("invalid font identifier '{}'", id)))
    }
}

#[derive(Debug, Clone)]
pub struct FontStorage {
    paths: FontsourcePaths,
}

impl FontStorage {
    pub fn new(paths: FontsourcePaths) -> Self {
        Self { paths }
    }

    pub fn stylesheet_path(&self, id: &str) -> PathBuf {
        self.paths.stylesheet_path(id)
    }

    /// Write (or replace) the stylesheet for `id`
    ///
    /// The text goes to a temporary sibling first and is renamed into place,
    /// so readers never observe a half-written file.
    pub async fn write(&self, id: &str, css: &str) -> Result<PathBuf> {
        validate_identifier(id)?;
        let dir = self.paths.fonts_dir();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| Error::persistence(&dir, e))?;

        let path = self.stylesheet_path(id);
        let tmp = dir.join(format!(".{}.css.tmp", id));
        tokio::fs::write(&tmp, css)
            .await
            .map_err(|e| Error::persistence(&tmp, e))?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(Error::persistence(&path, e));
        }

        tracing::debug!(id = %id, path = %path.display(), bytes = css.len(), "Stylesheet saved");
        Ok(path)
    }

    pub async fn read(&self, id: &str) -> Result<String> {
        validate_identifier(id)?;
        let path = self.stylesheet_path(id);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| Error::persistence(&path, e))
    }

    /// Delete the stylesheet for `id`; an already-missing file is not an error
    pub async fn remove(&self, id: &str) -> Result<()> {
        validate_identifier(id)?;
        let path = self.stylesheet_path(id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(id = %id, path = %path.display(), "Stylesheet already missing");
                Ok(())
            }
            Err(e) => Err(Error::persistence(&path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage(temp_dir: &TempDir) -> FontStorage {
        FontStorage::new(FontsourcePaths::new(temp_dir.path()))
    }

    #[test]
    fn test_identifier_validation() {
        assert!(validate_identifier("inter").is_ok());
        assert!(validate_identifier("noto-sans-jp").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("../etc/passwd").is_err());
        assert!(validate_identifier("a/b").is_err());
        assert!(validate_identifier(".hidden").is_err());
    }

    #[tokio::test]
    async fn test_write_creates_fonts_dir_and_replaces() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);

        let path = storage.write("inter", "a {}").await.unwrap();
        assert_eq!(path, temp_dir.path().join("fonts").join("inter.css"));
        storage.write("inter", "b {}").await.unwrap();

        assert_eq!(storage.read("inter").await.unwrap(), "b {}");
        let entries: Vec<_> = std::fs::read_dir(temp_dir.path().join("fonts"))
            .unwrap()
            .collect();
        assert_eq!(entries.len(), 1, "temporary file left behind");
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);

        let path = temp_dir.path().join("fonts/inter.css");
        storage.write("inter", "a {}").await.unwrap();
        assert!(path.exists());
        storage.remove("inter").await.unwrap();
        assert!(!path.exists());
        storage.remove("inter").await.unwrap();
    }

    #[tokio::test]
    async fn test_read_missing_is_persistence_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = storage(&temp_dir).read("inter").await;
        assert!(matches!(result, Err(Error::Persistence(_))));
    }
}
