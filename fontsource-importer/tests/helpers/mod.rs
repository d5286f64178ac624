//! Shared test helpers: an in-process stand-in for the catalog API and CDN

#![allow(dead_code)]

use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use base64::{engine::general_purpose, Engine as _};
use fontsource_common::config::{FontsourcePaths, TomlConfig};
use fontsource_common::events::EventBus;
use fontsource_importer::services::DownloadPool;
use fontsource_importer::FontLibrary;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct MockState {
    routes: HashMap<String, (u16, Vec<u8>)>,
    hits: Vec<String>,
}

/// Serves canned responses keyed by path and query
#[derive(Clone, Default)]
pub struct MockCatalog {
    state: Arc<Mutex<MockState>>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, path: &str, status: u16, body: Vec<u8>) {
        self.state
            .lock()
            .unwrap()
            .routes
            .insert(path.to_string(), (status, body));
    }

    pub fn json(&self, path: &str, value: Value) {
        self.respond(path, 200, value.to_string().into_bytes());
    }

    pub fn remove(&self, path: &str) {
        self.state.lock().unwrap().routes.remove(path);
    }

    pub fn hits(&self) -> Vec<String> {
        self.state.lock().unwrap().hits.clone()
    }

    pub fn hits_with_prefix(&self, prefix: &str) -> usize {
        self.hits().iter().filter(|hit| hit.starts_with(prefix)).count()
    }

    /// Bind to an ephemeral port and return the base URL
    pub async fn serve(&self) -> String {
        let app = Router::new().fallback(handle).with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    /// Register metadata and every asset of a static font
    pub fn add_static_font(
        &self,
        id: &str,
        family: &str,
        styles: &[&str],
        weights: &[u32],
        subsets: &[(&str, &str)],
    ) {
        let unicode_range: serde_json::Map<String, Value> = subsets
            .iter()
            .map(|(subset, range)| (subset.to_string(), json!(range)))
            .collect();
        self.json(
            &format!("/v1/fonts/{}", id),
            json!({
                "id": id,
                "family": family,
                "subsets": subsets.iter().map(|(s, _)| *s).collect::<Vec<_>>(),
                "styles": styles,
                "weights": weights,
                "unicodeRange": unicode_range,
                "variable": false,
            }),
        );

        for style in styles {
            for weight in weights {
                for (subset, _) in subsets {
                    let key = format!("{}-{}-{}", subset, weight, style);
                    self.respond(
                        &format!("/fonts/{}@latest/{}.woff2", id, key),
                        200,
                        asset_bytes(id, &key),
                    );
                }
            }
        }
    }

    /// Register metadata, axes and every asset of a variable font
    pub fn add_variable_font(
        &self,
        id: &str,
        family: &str,
        styles: &[&str],
        subsets: &[(&str, &str)],
        axes: Value,
        selector: &str,
    ) {
        let unicode_range: serde_json::Map<String, Value> = subsets
            .iter()
            .map(|(subset, range)| (subset.to_string(), json!(range)))
            .collect();
        self.json(
            &format!("/v1/fonts/{}", id),
            json!({
                "id": id,
                "family": family,
                "subsets": subsets.iter().map(|(s, _)| *s).collect::<Vec<_>>(),
                "styles": styles,
                "weights": [400, 700],
                "unicodeRange": unicode_range,
                "variable": true,
            }),
        );
        self.json(
            &format!("/v1/variable/{}", id),
            json!({ "id": id, "family": family, "axes": axes }),
        );

        for style in styles {
            for (subset, _) in subsets {
                let key = format!("{}-{}-{}", subset, selector, style);
                self.respond(
                    &format!("/fonts/{}:vf@latest/{}.woff2", id, key),
                    200,
                    asset_bytes(id, &key),
                );
            }
        }
    }
}

async fn handle(State(mock): State<MockCatalog>, uri: Uri) -> Response {
    let key = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_default();

    let mut state = mock.state.lock().unwrap();
    state.hits.push(key.clone());
    match state.routes.get(&key) {
        Some((status, body)) => (
            StatusCode::from_u16(*status).unwrap(),
            body.clone(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Fake font payload, unique per file
pub fn asset_bytes(id: &str, key: &str) -> Vec<u8> {
    format!("wOF2:{}:{}", id, key).into_bytes()
}

pub fn asset_base64(id: &str, key: &str) -> String {
    general_purpose::STANDARD.encode(asset_bytes(id, key))
}

pub fn test_config(base_url: &str, max_concurrent_downloads: usize) -> TomlConfig {
    TomlConfig {
        api_base_url: base_url.to_string(),
        cdn_base_url: base_url.to_string(),
        max_concurrent_downloads,
        request_timeout_secs: 5,
        ..TomlConfig::default()
    }
}

pub async fn open_library(config_dir: &Path, base_url: &str) -> FontLibrary {
    let config = test_config(base_url, 4);
    let pool = Arc::new(DownloadPool::new(config.max_concurrent_downloads).unwrap());
    open_library_with_pool(config_dir, base_url, pool).await
}

pub async fn open_library_with_pool(
    config_dir: &Path,
    base_url: &str,
    pool: Arc<DownloadPool>,
) -> FontLibrary {
    let config = test_config(base_url, pool.capacity());
    FontLibrary::open(&config, FontsourcePaths::new(config_dir), pool, EventBus::new(100))
        .await
        .unwrap()
}
