//! Asset validation command

use super::{emit, presenter, OutputArgs};
use crate::config::GlanceConfig;
use anyhow::{anyhow, bail, Context, Result};
use glance_asset::{root_path_of, AssetMap, ObjectUrl, ObjectUrls, UrlFetcher};
use glance_validate::{GltfValidator, ValidationRequest, ValidationRunner, ValidationSession};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub struct ValidateArgs {
    pub root: String,
    pub bundle: Option<PathBuf>,
    pub output: OutputArgs,
}

pub async fn run(args: ValidateArgs, config: &GlanceConfig) -> Result<()> {
    let registry = config.registry(args.output.registry.as_deref())?;
    let object_urls = ObjectUrls::new();
    let fetcher = UrlFetcher::new(Duration::from_secs(config.fetch_timeout_secs))
        .with_object_urls(object_urls.clone());
    let runner = ValidationRunner::new(GltfValidator::new(), fetcher)
        .with_registry(registry)
        .with_policy(config.policy())
        .with_object_urls(object_urls.clone());

    // The root handle must outlive the run
    let (request, location, _root_handle) = match &args.bundle {
        Some(bundle) => bundle_request(&args.root, bundle, &object_urls)?,
        None => (
            ValidationRequest::standalone(args.root.as_str()),
            args.root.clone(),
            None,
        ),
    };

    let mut session = ValidationSession::new(presenter(&location, &args.output, config));
    session.run(&runner, request).await;

    if emit(session.presenter_mut(), &args.output)? {
        std::process::exit(1);
    }

    Ok(())
}

/// Build a request for a root file inside a directory or zip bundle
///
/// The root blob is exposed through an object URL; the returned guard keeps
/// it live.
fn bundle_request(
    root: &str,
    bundle: &Path,
    object_urls: &ObjectUrls,
) -> Result<(ValidationRequest, String, Option<ObjectUrl>)> {
    let assets = if bundle.is_dir() {
        AssetMap::from_directory(bundle)?
    } else {
        let bytes = std::fs::read(bundle)
            .with_context(|| format!("Failed to read bundle {}", bundle.display()))?;
        AssetMap::from_zip(&bytes)?
    };

    let (key, root_path) = if root == "-" {
        assets
            .find_root()
            .ok_or_else(|| anyhow!("No .gltf or .glb file found in {}", bundle.display()))?
    } else {
        (root.to_string(), root_path_of(root))
    };

    let Some(blob) = assets.get(&key).cloned() else {
        bail!("'{}' not found in bundle {}", key, bundle.display());
    };

    let handle = object_urls.create(blob);
    log::info!("Serving '{}' from {} as {}", key, bundle.display(), handle.url());

    let location = format!("{}:{}", bundle.display(), key);
    let request = ValidationRequest::new(handle.url(), root_path, Arc::new(assets));
    Ok((request, location, Some(handle)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn bundle_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("glance_test_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(dir.join("model")).unwrap();
        fs::write(
            dir.join("model").join("duck.gltf"),
            r#"{"asset": {"version": "2.0"}, "buffers": [{"byteLength": 4, "uri": "duck%20data.bin"}]}"#,
        )
        .unwrap();
        fs::write(dir.join("model").join("duck data.bin"), [0u8; 4]).unwrap();
        dir
    }

    #[test]
    fn test_bundle_request_picks_root() {
        let dir = bundle_dir();
        let urls = ObjectUrls::new();

        let (request, location, handle) = bundle_request("-", &dir, &urls).unwrap();
        assert_eq!(request.root_path, "model/");
        assert!(ObjectUrls::is_object_url(&request.root_file));
        assert!(location.ends_with(":model/duck.gltf"));
        assert_eq!(urls.len(), 1);

        drop(handle);
        assert!(urls.is_empty());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_bundle_request_unknown_root() {
        let dir = bundle_dir();
        let urls = ObjectUrls::new();
        assert!(bundle_request("model/other.gltf", &dir, &urls).is_err());
        assert!(urls.is_empty());
        fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_bundle_validates_through_object_urls() {
        let dir = bundle_dir();
        let urls = ObjectUrls::new();
        let fetcher = UrlFetcher::default().with_object_urls(urls.clone());
        let runner = ValidationRunner::new(GltfValidator::new(), fetcher).with_object_urls(urls.clone());

        let (request, _, handle) = bundle_request("model/duck.gltf", &dir, &urls).unwrap();
        let outcome = runner.validate(request).await;

        let report = outcome.as_report().unwrap();
        assert_eq!(report.max_severity_level(), -1);
        assert_eq!(report.raw.info.resources[0].storage, "external");

        drop(handle);
        assert!(urls.is_empty());
        fs::remove_dir_all(&dir).ok();
    }
}
