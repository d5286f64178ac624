//! fontsource-importer library interface
//!
//! Fetches fonts from the Fontsource catalog, embeds them into `@font-face`
//! stylesheets and manages which imported fonts are applied to the
//! interface, text and monospace roles.

pub mod library;
pub mod logging;
pub mod services;
pub mod types;

pub use crate::library::FontLibrary;
pub use crate::types::FontDescriptor;
