//! Precedence lists and their CSS-variable projection

use crate::services::stylesheet::escape_family;
use fontsource_common::{Error, FontSlot, PluginSettings, PrecedenceEntry, Result};
use std::fmt::Write as _;

/// Ascending precedence, ties by case-insensitive family name
pub fn sort_entries(entries: &mut [PrecedenceEntry]) {
    entries.sort_by(|a, b| {
        a.precedence
            .cmp(&b.precedence)
            .then_with(|| a.family.to_lowercase().cmp(&b.family.to_lowercase()))
    });
}

pub fn sorted(entries: &[PrecedenceEntry]) -> Vec<PrecedenceEntry> {
    let mut entries = entries.to_vec();
    sort_entries(&mut entries);
    entries
}

/// `font-family` fallback chain for one slot, e.g. `'Inter', 'Noto Sans'`
pub fn font_family_value(entries: &[PrecedenceEntry]) -> String {
    sorted(entries)
        .iter()
        .map(|entry| format!("'{}'", escape_family(&entry.family)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// CSS-variable block for all three slots
///
/// Empty slots are left out; `None` when every slot is empty.
pub fn css_variables_block(settings: &PluginSettings) -> Option<String> {
    let declarations: Vec<(FontSlot, String)> = FontSlot::ALL
        .iter()
        .map(|slot| (*slot, font_family_value(settings.slot(*slot))))
        .filter(|(_, value)| !value.is_empty())
        .collect();

    if declarations.is_empty() {
        return None;
    }

    let mut css = String::from("body {\n");
    for (slot, value) in declarations {
        let _ = writeln!(css, "  {}: {};", slot.css_variable(), value);
    }
    css.push_str("}\n");
    Some(css)
}

/// Parse user-entered precedence; only plain digits are accepted
pub fn parse_precedence(input: &str) -> Result<u32> {
    if input.is_empty() || !input.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::InvalidInput(format!(
            "precedence must be a non-negative whole number, got '{}'",
            input
        )));
    }
    input
        .parse::<u32>()
        .map_err(|e| Error::InvalidInput(format!("precedence '{}' out of range: {}", input, e)))
}
