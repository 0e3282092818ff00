//! External resource resolution for validators

use crate::fetch::Fetcher;
use crate::handle::ObjectUrls;
use crate::map::AssetMap;
use crate::uri::{base_url, normalize_uri};
use glance_core::{GlanceError, Result};

/// Callback a validator uses to obtain the bytes of an external reference
#[allow(async_fn_in_trait)]
pub trait ResourceLoader {
    async fn load(&self, uri: &str) -> Result<Vec<u8>>;
}

/// Resolver bound to one root file, root path and asset map
///
/// Requests found in the asset map are served through a transient object
/// URL that is revoked before `resolve` returns. Anything else is fetched
/// once from the root file's base directory.
pub struct AssetResolver<'a, F> {
    root_file: &'a str,
    root_path: &'a str,
    assets: &'a AssetMap,
    fetcher: &'a F,
    object_urls: ObjectUrls,
}

impl<'a, F: Fetcher> AssetResolver<'a, F> {
    /// Create a resolver with its own object URL table
    pub fn new(root_file: &'a str, root_path: &'a str, assets: &'a AssetMap, fetcher: &'a F) -> Self {
        Self {
            root_file,
            root_path,
            assets,
            fetcher,
            object_urls: ObjectUrls::new(),
        }
    }

    /// Issue transient handles from a shared table instead
    pub fn with_object_urls(mut self, object_urls: ObjectUrls) -> Self {
        self.object_urls = object_urls;
        self
    }

    /// Resolve a requested URI to bytes
    pub async fn resolve(&self, uri: &str) -> Result<Vec<u8>> {
        let key = normalize_uri(uri, self.root_file, self.root_path);

        if let Some(blob) = self.assets.get(&key) {
            log::debug!("Resolved '{}' from asset map as '{}'", uri, key);
            let handle = self.object_urls.create(blob.clone());
            return self
                .object_urls
                .read(handle.url())
                .map(|bytes| bytes.to_vec())
                .ok_or_else(|| GlanceError::ResourceResolution {
                    uri: uri.to_string(),
                    reason: format!("object URL for '{}' was revoked early", key),
                });
        }

        let url = format!("{}{}", base_url(self.root_file), uri);
        log::debug!("'{}' not in asset map, fetching {}", key, url);
        self.fetcher
            .fetch(&url)
            .await
            .map_err(|e| GlanceError::ResourceResolution {
                uri: uri.to_string(),
                reason: e.to_string(),
            })
    }
}

impl<F: Fetcher> ResourceLoader for AssetResolver<'_, F> {
    async fn load(&self, uri: &str) -> Result<Vec<u8>> {
        self.resolve(uri).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Fetcher that records URLs and serves from a fixed table
    #[derive(Default)]
    struct RecordingFetcher {
        calls: Mutex<Vec<String>>,
        served: Vec<(String, Vec<u8>)>,
    }

    impl RecordingFetcher {
        fn serving(url: &str, bytes: &[u8]) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                served: vec![(url.to_string(), bytes.to_vec())],
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Fetcher for RecordingFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            self.calls.lock().unwrap().push(url.to_string());
            self.served
                .iter()
                .find(|(u, _)| u == url)
                .map(|(_, b)| b.clone())
                .ok_or_else(|| GlanceError::Fetch {
                    url: url.to_string(),
                    reason: "404".to_string(),
                })
        }
    }

    #[tokio::test]
    async fn test_local_hit_skips_fetch() {
        let mut assets = AssetMap::new();
        assets.insert("pack/duck.bin", vec![7u8, 8, 9]);
        let fetcher = RecordingFetcher::default();
        let urls = ObjectUrls::new();

        let resolver = AssetResolver::new("blob:glance/root", "pack/", &assets, &fetcher)
            .with_object_urls(urls.clone());
        let bytes = resolver.resolve("./duck.bin").await.unwrap();

        assert_eq!(bytes, vec![7u8, 8, 9]);
        assert!(fetcher.calls().is_empty());
        assert!(urls.is_empty());
    }

    #[tokio::test]
    async fn test_encoded_uri_hits_decoded_key() {
        let mut assets = AssetMap::new();
        assets.insert("wood grain.png", vec![1u8]);
        let fetcher = RecordingFetcher::default();

        let resolver = AssetResolver::new("scene.gltf", "", &assets, &fetcher);
        assert_eq!(resolver.resolve("wood%20grain.png").await.unwrap(), vec![1u8]);
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_miss_fetches_once_from_base() {
        let assets = AssetMap::new();
        let fetcher = RecordingFetcher::serving("https://cdn.test/models/tex/a.png", b"png");

        let resolver =
            AssetResolver::new("https://cdn.test/models/duck.gltf", "", &assets, &fetcher);
        let bytes = resolver.resolve("tex/a.png").await.unwrap();

        assert_eq!(bytes, b"png".to_vec());
        assert_eq!(fetcher.calls(), vec!["https://cdn.test/models/tex/a.png".to_string()]);
    }

    #[tokio::test]
    async fn test_miss_fetches_undecoded_uri() {
        let assets = AssetMap::new();
        let fetcher = RecordingFetcher::default();

        let resolver = AssetResolver::new("models/duck.gltf", "", &assets, &fetcher);
        let _ = resolver.resolve("my%20tex.png").await;

        assert_eq!(fetcher.calls(), vec!["models/my%20tex.png".to_string()]);
    }

    #[tokio::test]
    async fn test_failure_is_resource_resolution_error() {
        let assets = AssetMap::new();
        let fetcher = RecordingFetcher::default();
        let urls = ObjectUrls::new();

        let resolver = AssetResolver::new("duck.gltf", "", &assets, &fetcher)
            .with_object_urls(urls.clone());
        let err = resolver.load("missing.bin").await.unwrap_err();

        assert!(matches!(err, GlanceError::ResourceResolution { ref uri, .. } if uri == "missing.bin"));
        assert_eq!(fetcher.calls().len(), 1);
        assert!(urls.is_empty());
    }
}
