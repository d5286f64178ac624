//! Fontsource catalog API client
//!
//! Resolves font identifiers to [`FontDescriptor`]s (`/v1/fonts/{id}`, plus
//! `/v1/variable/{id}` for variable fonts) and lists the catalog
//! (`/fontlist?family`) for search.

use crate::types::FontDescriptor;
use fontsource_common::types::NumberOrString;
use fontsource_common::{AxisRange, Error, Result, VariableAxes};
use serde::de::{self, DeserializeOwned, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use tokio::sync::Mutex;

pub const USER_AGENT: &str = concat!("fontsource-importer/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by catalog and CDN requests
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| Error::Transport(e.to_string()))
}

/// Catalog entry shown in search results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontListing {
    pub id: String,
    pub family: String,
}

/// `/v1/fonts/{id}` response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FontMetadataResponse {
    id: String,
    family: String,
    #[serde(default)]
    subsets: Vec<String>,
    #[serde(default)]
    styles: Vec<String>,
    #[serde(default)]
    weights: Vec<u32>,
    #[serde(default, deserialize_with = "ordered_string_map")]
    unicode_range: Vec<(String, String)>,
    #[serde(default)]
    variable: bool,
}

/// `/v1/variable/{id}` response
#[derive(Debug, Deserialize)]
struct VariableResponse {
    #[serde(default)]
    axes: BTreeMap<String, WireAxis>,
}

#[derive(Debug, Deserialize)]
struct WireAxis {
    min: NumberOrString,
    max: NumberOrString,
}

/// JSON object into a Vec, keeping document order
fn ordered_string_map<'de, D>(deserializer: D) -> std::result::Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OrderedMapVisitor;

    impl<'de> Visitor<'de> for OrderedMapVisitor {
        type Value = Vec<(String, String)>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map of strings")
        }

        fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((key, value)) = map.next_entry::<String, String>()? {
                entries.push((key, value));
            }
            Ok(entries)
        }

        fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(OrderedMapVisitor)
}

fn convert_axes(axes: BTreeMap<String, WireAxis>) -> Result<VariableAxes> {
    axes.into_iter()
        .map(|(tag, axis)| {
            let min = axis.min.to_f64().map_err(Error::Transport)?;
            let max = axis.max.to_f64().map_err(Error::Transport)?;
            Ok((tag, AxisRange { min, max }))
        })
        .collect()
}

/// Fontsource catalog API client
pub struct CatalogClient {
    http_client: reqwest::Client,
    base_url: String,
    /// Font list is fetched once per client
    listing_cache: Mutex<Option<Vec<FontListing>>>,
}

impl CatalogClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self::with_client(build_http_client(timeout)?, base_url))
    }

    pub fn with_client(http_client: reqwest::Client, base_url: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            listing_cache: Mutex::new(None),
        }
    }

    /// Resolve a font identifier to its descriptor
    ///
    /// Unknown identifiers yield [`Error::NotFound`]. Variable fonts need a
    /// second lookup for their axes; any failure there is a transport error,
    /// never a degraded descriptor.
    pub async fn resolve(&self, id: &str) -> Result<FontDescriptor> {
        let url = format!("{}/v1/fonts/{}", self.base_url, id);
        let metadata: FontMetadataResponse = match self.get_json(&url).await? {
            Some(metadata) => metadata,
            None => return Err(Error::NotFound(format!("font '{}' is not in the catalog", id))),
        };

        let variable = if metadata.variable {
            let url = format!("{}/v1/variable/{}", self.base_url, id);
            let response: VariableResponse = self.get_json(&url).await?.ok_or_else(|| {
                Error::Transport(format!("variable axes for '{}' not available (404)", id))
            })?;
            Some(convert_axes(response.axes)?)
        } else {
            None
        };

        tracing::info!(
            id = %metadata.id,
            family = %metadata.family,
            styles = metadata.styles.len(),
            weights = metadata.weights.len(),
            variable = variable.is_some(),
            "Resolved font metadata"
        );

        Ok(FontDescriptor {
            id: metadata.id,
            family: metadata.family,
            styles: metadata.styles,
            weights: metadata.weights,
            subsets: metadata.subsets,
            unicode_range: metadata.unicode_range,
            variable,
        })
    }

    /// Full catalog listing sorted by family, cached after the first call
    pub async fn font_list(&self) -> Result<Vec<FontListing>> {
        let mut cache = self.listing_cache.lock().await;
        if let Some(list) = cache.as_ref() {
            return Ok(list.clone());
        }

        let url = format!("{}/fontlist?family", self.base_url);
        let response: BTreeMap<String, String> = self
            .get_json(&url)
            .await?
            .ok_or_else(|| Error::Transport(format!("font list unavailable at {}", url)))?;

        let mut list: Vec<FontListing> = response
            .into_iter()
            .map(|(id, family)| FontListing { id, family })
            .collect();
        list.sort_by(|a, b| {
            a.family
                .to_lowercase()
                .cmp(&b.family.to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });

        tracing::debug!(fonts = list.len(), "Fetched catalog font list");
        *cache = Some(list.clone());
        Ok(list)
    }

    /// Catalog fonts whose family contains `query`, ignoring case
    pub async fn search(&self, query: &str) -> Result<Vec<FontListing>> {
        let needle = query.to_lowercase();
        Ok(self
            .font_list()
            .await?
            .into_iter()
            .filter(|font| font.family.to_lowercase().contains(&needle))
            .collect())
    }

    /// GET and decode JSON; `Ok(None)` on 404
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>> {
        tracing::debug!(url = %url, "Querying catalog API");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("{}: {}", url, e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(Error::Transport(format!("{} returned HTTP {}", url, status.as_u16())));
        }

        let body = response
            .json::<T>()
            .await
            .map_err(|e| Error::Transport(format!("malformed response from {}: {}", url, e)))?;
        Ok(Some(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_keeps_unicode_range_order() {
        let json = r#"{
            "id": "inter",
            "family": "Inter",
            "subsets": ["latin", "cyrillic"],
            "styles": ["normal"],
            "weights": [400, 700],
            "unicodeRange": {"latin": "U+0000-00FF", "cyrillic": "U+0400-045F", "[0]": "U+1F00"},
            "variable": true
        }"#;

        let metadata: FontMetadataResponse = serde_json::from_str(json).unwrap();
        let keys: Vec<_> = metadata.unicode_range.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["latin", "cyrillic", "[0]"]);
        assert!(metadata.variable);
    }

    #[test]
    fn test_metadata_optional_fields() {
        let json = r#"{"id": "x", "family": "X", "unicodeRange": null}"#;
        let metadata: FontMetadataResponse = serde_json::from_str(json).unwrap();
        assert!(metadata.unicode_range.is_empty());
        assert!(!metadata.variable);
        assert!(metadata.weights.is_empty());
    }

    #[test]
    fn test_axis_values_accept_strings_and_numbers() {
        let json = r#"{"axes": {
            "wght": {"default": "400", "min": "100", "max": "900", "step": "1"},
            "slnt": {"min": -10, "max": 0}
        }}"#;
        let response: VariableResponse = serde_json::from_str(json).unwrap();
        let axes = convert_axes(response.axes).unwrap();

        assert_eq!(axes["wght"], AxisRange { min: 100.0, max: 900.0 });
        assert_eq!(axes["slnt"], AxisRange { min: -10.0, max: 0.0 });
    }

    #[test]
    fn test_bad_axis_value_is_transport_error() {
        let json = r#"{"axes": {"wght": {"min": "thin", "max": "900"}}}"#;
        let response: VariableResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(convert_axes(response.axes), Err(Error::Transport(_))));
    }

    #[test]
    fn test_client_creation_trims_base_url() {
        let client = CatalogClient::new("https://api.example.org/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url, "https://api.example.org");
    }
}
