//! # Fontsource Common Library
//!
//! Shared code for the fontsource importer:
//! - Error taxonomy
//! - Configuration loading and config directory resolution
//! - Event types and EventBus
//! - Persisted settings types (font records, precedence slots)

pub mod config;
pub mod error;
pub mod events;
pub mod types;

pub use error::{Error, Result};
pub use types::{AxisRange, FontSlot, PluginSettings, PrecedenceEntry, SettingsRecord, VariableAxes};
