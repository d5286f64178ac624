//! Font asset downloader
//!
//! Works out which `.woff2` files a font needs, fetches them from the CDN
//! through the shared [`DownloadPool`] and keeps them base64-encoded, ready
//! to be embedded as data URIs.

use crate::services::download_pool::DownloadPool;
use crate::types::FontDescriptor;
use base64::{engine::general_purpose, Engine as _};
use fontsource_common::{Error, Result, VariableAxes};
use std::collections::HashMap;
use std::sync::Arc;

/// Axes that make up the "standard" variable build
const STANDARD_AXES: [&str; 4] = ["wght", "wdth", "slnt", "opsz"];

/// Pick the variable build with the most available options
///
/// "ital" never counts towards the decision. A weight axis paired with one
/// registered axis selects that axis' build; a non-registered partner
/// (e.g. "GRAD") has no dedicated build and needs "full".
pub fn axis_selector(axes: &VariableAxes) -> String {
    let tags: Vec<&str> = axes
        .keys()
        .map(String::as_str)
        .filter(|tag| *tag != "ital")
        .collect();
    let has_weight = axes.contains_key("wght");

    if tags.len() == 1 && has_weight {
        return "wght".to_string();
    }

    if tags.len() == 2 && has_weight {
        if let Some(other) = tags.iter().find(|tag| **tag != "wght") {
            if STANDARD_AXES.contains(other) {
                return (*other).to_string();
            }
        }
    }

    if tags.iter().all(|tag| STANDARD_AXES.contains(tag)) {
        return "standard".to_string();
    }

    "full".to_string()
}

/// Subset names may be bracketed unicode-range tokens like "[12]"
pub fn strip_brackets(subset: &str) -> String {
    subset.chars().filter(|c| *c != '[' && *c != ']').collect()
}

/// Asset key for a variable font file
pub fn variable_key(subset: &str, style: &str) -> String {
    format!("{}-{}", strip_brackets(subset), style)
}

/// Asset key for a static font file
pub fn static_key(subset: &str, weight: u32, style: &str) -> String {
    format!("{}-{}-{}", strip_brackets(subset), weight, style)
}

/// One file to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    /// CDN path below `fonts/`, without extension
    pub remote_path: String,
    /// Key the encoded bytes are stored under
    pub key: String,
}

/// Every request needed for `descriptor`, in style/subset(/weight) order
pub fn plan_requests(descriptor: &FontDescriptor) -> Vec<AssetRequest> {
    let subsets = descriptor.applicable_subsets();
    let mut requests = Vec::new();

    match &descriptor.variable {
        Some(axes) => {
            let selector = axis_selector(axes);
            for style in &descriptor.styles {
                for subset in &subsets {
                    let subset = strip_brackets(subset.subset);
                    requests.push(AssetRequest {
                        remote_path: format!(
                            "{}:vf@latest/{}-{}-{}",
                            descriptor.id, subset, selector, style
                        ),
                        key: variable_key(&subset, style),
                    });
                }
            }
        }
        None => {
            for style in &descriptor.styles {
                for weight in &descriptor.weights {
                    for subset in &subsets {
                        let key = static_key(subset.subset, *weight, style);
                        requests.push(AssetRequest {
                            remote_path: format!("{}@latest/{}", descriptor.id, key),
                            key,
                        });
                    }
                }
            }
        }
    }

    requests
}

/// Base64-encoded font files keyed by asset key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedAssetMap {
    assets: HashMap<String, String>,
}

impl EncodedAssetMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_encoded(&mut self, key: impl Into<String>, encoded: String) {
        self.assets.insert(key.into(), encoded);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.assets.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

/// CDN downloader bound to a shared pool
pub struct AssetDownloader {
    http_client: reqwest::Client,
    cdn_base_url: String,
    pool: Arc<DownloadPool>,
}

impl AssetDownloader {
    pub fn new(http_client: reqwest::Client, cdn_base_url: &str, pool: Arc<DownloadPool>) -> Self {
        Self {
            http_client,
            cdn_base_url: cdn_base_url.trim_end_matches('/').to_string(),
            pool,
        }
    }

    pub fn asset_url(&self, remote_path: &str) -> String {
        format!("{}/fonts/{}.woff2", self.cdn_base_url, remote_path)
    }

    /// Download and encode every asset the stylesheet will reference
    ///
    /// Any single failure aborts the whole batch; nothing partial is returned.
    pub async fn populate(&self, descriptor: &FontDescriptor) -> Result<EncodedAssetMap> {
        let requests = plan_requests(descriptor);
        tracing::info!(
            id = %descriptor.id,
            files = requests.len(),
            pool_capacity = self.pool.capacity(),
            "Downloading font files"
        );

        let jobs = requests.into_iter().map(|request| {
            let http_client = self.http_client.clone();
            let url = self.asset_url(&request.remote_path);
            async move {
                let encoded = download_base64(&http_client, &url).await?;
                Ok((request.key, encoded))
            }
        });

        let downloaded = self.pool.run_all(jobs).await?;

        let mut assets = EncodedAssetMap::new();
        for (key, encoded) in downloaded {
            assets.insert_encoded(key, encoded);
        }
        Ok(assets)
    }
}

async fn download_base64(http_client: &reqwest::Client, url: &str) -> Result<String> {
    tracing::debug!(url = %url, "Downloading");

    let response = http_client
        .get(url)
        .send()
        .await
        .map_err(|e| Error::Transport(format!("{}: {}", url, e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Transport(format!("{} returned HTTP {}", url, status.as_u16())));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| Error::Transport(format!("{}: {}", url, e)))?;

    tracing::debug!(url = %url, bytes = bytes.len(), "Downloaded");
    Ok(general_purpose::STANDARD.encode(&bytes))
}
