//! Persisted settings types
//!
//! These mirror the JSON layout of the settings file, so field names are
//! serialized in camelCase (`isActive`, `interfaceFonts`, ...).

use serde::{de, Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Inclusive numeric range of one variable-font design axis
///
/// Bounds are read as numbers or numeric strings; older settings files
/// store the API's string form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    #[serde(deserialize_with = "axis_bound")]
    pub min: f64,
    #[serde(deserialize_with = "axis_bound")]
    pub max: f64,
}

/// Axis bound as written by the catalog API
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberOrString {
    Number(f64),
    Text(String),
}

impl NumberOrString {
    pub fn to_f64(&self) -> std::result::Result<f64, String> {
        match self {
            NumberOrString::Number(n) => Ok(*n),
            NumberOrString::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|e| format!("invalid axis value '{}': {}", s, e)),
        }
    }
}

fn axis_bound<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    NumberOrString::deserialize(deserializer)?
        .to_f64()
        .map_err(de::Error::custom)
}

/// Axis tag ("wght", "wdth", "slnt", "opsz", "ital", ...) to range
pub type VariableAxes = BTreeMap<String, AxisRange>;

/// UI role a precedence list applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSlot {
    Interface,
    Text,
    Monospace,
}

impl FontSlot {
    pub const ALL: [FontSlot; 3] = [FontSlot::Interface, FontSlot::Text, FontSlot::Monospace];

    pub fn as_str(&self) -> &'static str {
        match self {
            FontSlot::Interface => "interface",
            FontSlot::Text => "text",
            FontSlot::Monospace => "monospace",
        }
    }

    /// CSS custom property the host reads for this role
    pub fn css_variable(&self) -> &'static str {
        match self {
            FontSlot::Interface => "--font-interface-override",
            FontSlot::Text => "--font-text-override",
            FontSlot::Monospace => "--font-monospace-override",
        }
    }
}

impl fmt::Display for FontSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FontSlot {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "interface" => Ok(FontSlot::Interface),
            "text" => Ok(FontSlot::Text),
            "monospace" => Ok(FontSlot::Monospace),
            other => Err(Error::InvalidInput(format!(
                "unknown font slot '{}' (expected interface, text or monospace)",
                other
            ))),
        }
    }
}

/// An imported font as remembered in settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRecord {
    pub id: String,
    pub family: String,
    #[serde(default)]
    pub subsets: Vec<String>,
    #[serde(default)]
    pub styles: Vec<String>,
    #[serde(default)]
    pub weights: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<VariableAxes>,
    #[serde(default)]
    pub is_active: bool,
}

/// One font selected for a slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecedenceEntry {
    pub id: String,
    pub family: String,
    /// Lower sorts first
    pub precedence: u32,
}

/// Whole settings document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PluginSettings {
    pub fonts: Vec<SettingsRecord>,
    pub interface_fonts: Vec<PrecedenceEntry>,
    pub text_fonts: Vec<PrecedenceEntry>,
    pub monospace_fonts: Vec<PrecedenceEntry>,
}

impl PluginSettings {
    pub fn font(&self, id: &str) -> Option<&SettingsRecord> {
        self.fonts.iter().find(|f| f.id == id)
    }

    pub fn font_mut(&mut self, id: &str) -> Option<&mut SettingsRecord> {
        self.fonts.iter_mut().find(|f| f.id == id)
    }

    pub fn slot(&self, slot: FontSlot) -> &[PrecedenceEntry] {
        match slot {
            FontSlot::Interface => &self.interface_fonts,
            FontSlot::Text => &self.text_fonts,
            FontSlot::Monospace => &self.monospace_fonts,
        }
    }

    pub fn slot_mut(&mut self, slot: FontSlot) -> &mut Vec<PrecedenceEntry> {
        match slot {
            FontSlot::Interface => &mut self.interface_fonts,
            FontSlot::Text => &mut self.text_fonts,
            FontSlot::Monospace => &mut self.monospace_fonts,
        }
    }

    /// Insert or replace a font record, keyed by id
    pub fn upsert_font(&mut self, record: SettingsRecord) {
        self.fonts.retain(|f| f.id != record.id);
        self.fonts.push(record);
    }

    /// Drop `id` from every slot, returning whether anything was removed
    pub fn purge_from_slots(&mut self, id: &str) -> bool {
        let mut removed = false;
        for slot in FontSlot::ALL {
            let list = self.slot_mut(slot);
            let before = list.len();
            list.retain(|entry| entry.id != id);
            removed |= list.len() != before;
        }
        removed
    }
}
