//! Import pipeline and settings services

pub mod asset_downloader;
pub mod catalog_client;
pub mod download_pool;
pub mod font_storage;
pub mod import_orchestrator;
pub mod precedence;
pub mod settings_store;
pub mod style_registry;
pub mod stylesheet;

pub use asset_downloader::{axis_selector, AssetDownloader, EncodedAssetMap};
pub use catalog_client::{CatalogClient, FontListing};
pub use download_pool::DownloadPool;
pub use font_storage::FontStorage;
pub use import_orchestrator::ImportOrchestrator;
pub use settings_store::SettingsStore;
pub use style_registry::StyleRegistry;
