//! Font metadata resolved from the catalog
//!
//! A [`FontDescriptor`] lives only for the duration of one import.

use fontsource_common::{SettingsRecord, VariableAxes};

/// Resolved catalog metadata for one font
#[derive(Debug, Clone, PartialEq)]
pub struct FontDescriptor {
    /// Stable catalog key, e.g. "inter"
    pub id: String,
    pub family: String,
    /// Style names in catalog order ("normal", "italic")
    pub styles: Vec<String>,
    /// Static weights in catalog order; unused for variable fonts
    pub weights: Vec<u32>,
    pub subsets: Vec<String>,
    /// Subset name to unicode-range expression, in catalog order
    pub unicode_range: Vec<(String, String)>,
    /// Present only for variable fonts
    pub variable: Option<VariableAxes>,
}

/// One subset the stylesheet covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubsetRange<'a> {
    pub subset: &'a str,
    /// `None` when the catalog did not supply ranges
    pub unicode_range: Option<&'a str>,
}

impl FontDescriptor {
    /// Subsets that get one asset and one `@font-face` block each
    ///
    /// The unicode-range keys win; when that mapping is empty the flat
    /// subset list is used with no range restriction.
    pub fn applicable_subsets(&self) -> Vec<SubsetRange<'_>> {
        if self.unicode_range.is_empty() {
            self.subsets
                .iter()
                .map(|subset| SubsetRange {
                    subset: subset.as_str(),
                    unicode_range: None,
                })
                .collect()
        } else {
            self.unicode_range
                .iter()
                .map(|(subset, range)| SubsetRange {
                    subset: subset.as_str(),
                    unicode_range: Some(range.as_str()),
                })
                .collect()
        }
    }

    /// Settings record for a freshly imported (inactive) font
    pub fn to_settings_record(&self) -> SettingsRecord {
        SettingsRecord {
            id: self.id.clone(),
            family: self.family.clone(),
            subsets: self.subsets.clone(),
            styles: self.styles.clone(),
            weights: self.weights.clone(),
            variable: self.variable.clone(),
            is_active: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> FontDescriptor {
        FontDescriptor {
            id: "noto-sans".to_string(),
            family: "Noto Sans".to_string(),
            styles: vec!["normal".to_string()],
            weights: vec![400],
            subsets: vec!["latin".to_string(), "cyrillic".to_string()],
            unicode_range: vec![("latin-ext".to_string(), "U+0100-02AF".to_string())],
            variable: None,
        }
    }

    #[test]
    fn test_unicode_range_keys_preferred() {
        let font = descriptor();
        let subsets = font.applicable_subsets();
        assert_eq!(subsets.len(), 1);
        assert_eq!(subsets[0].subset, "latin-ext");
        assert_eq!(subsets[0].unicode_range, Some("U+0100-02AF"));
    }

    #[test]
    fn test_flat_subsets_fallback() {
        let mut font = descriptor();
        font.unicode_range.clear();
        let subsets: Vec<_> = font.applicable_subsets().iter().map(|s| s.subset).collect();
        assert_eq!(subsets, vec!["latin", "cyrillic"]);
        assert!(font.applicable_subsets().iter().all(|s| s.unicode_range.is_none()));
    }

    #[test]
    fn test_settings_record_starts_inactive() {
        let record = descriptor().to_settings_record();
        assert_eq!(record.id, "noto-sans");
        assert!(!record.is_active);
        assert_eq!(record.subsets, vec!["latin", "cyrillic"]);
    }
}
