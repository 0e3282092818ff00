//! Validation runner: root fetch, validator invocation and normalization

use crate::validator::Validator;
use glance_asset::{AssetMap, AssetResolver, Fetcher, ObjectUrls};
use glance_core::{GlanceError, Result};
use glance_report::{
    AggregationPolicy, GeneratorRegistry, NormalizedReport, Normalizer, ValidationOutcome,
};
use std::sync::Arc;

/// One load action: what to validate and where its resources live
#[derive(Debug, Clone)]
pub struct ValidationRequest {
    /// URL or filesystem path of the root file
    pub root_file: String,
    /// Prefix of the root file inside the asset map
    pub root_path: String,
    pub assets: Arc<AssetMap>,
}

impl ValidationRequest {
    pub fn new(root_file: impl Into<String>, root_path: impl Into<String>, assets: Arc<AssetMap>) -> Self {
        Self {
            root_file: root_file.into(),
            root_path: root_path.into(),
            assets,
        }
    }

    /// A request without a bundle; every resource is fetched
    pub fn standalone(root_file: impl Into<String>) -> Self {
        Self::new(root_file, "", Arc::new(AssetMap::new()))
    }
}

/// Runs a validator against requests and normalizes the results
pub struct ValidationRunner<V, F> {
    validator: V,
    fetcher: F,
    registry: GeneratorRegistry,
    policy: AggregationPolicy,
    object_urls: ObjectUrls,
}

impl<V: Validator, F: Fetcher> ValidationRunner<V, F> {
    /// Create a runner with the built-in registry and default aggregation
    pub fn new(validator: V, fetcher: F) -> Self {
        Self {
            validator,
            fetcher,
            registry: GeneratorRegistry::builtin(),
            policy: AggregationPolicy::default(),
            object_urls: ObjectUrls::new(),
        }
    }

    pub fn with_registry(mut self, registry: GeneratorRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_policy(mut self, policy: AggregationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Issue the resolver's transient handles from a shared table
    pub fn with_object_urls(mut self, object_urls: ObjectUrls) -> Self {
        self.object_urls = object_urls;
        self
    }

    pub fn registry(&self) -> &GeneratorRegistry {
        &self.registry
    }

    /// Validate one request. Failures are captured, never returned.
    pub async fn validate(&self, request: ValidationRequest) -> ValidationOutcome {
        match self.run(&request).await {
            Ok(report) => ValidationOutcome::report(report),
            Err(e) => {
                log::warn!("Validation of {} failed: {}", request.root_file, e);
                ValidationOutcome::exception(&e)
            }
        }
    }

    async fn run(&self, request: &ValidationRequest) -> Result<NormalizedReport> {
        log::info!("Validating {}", request.root_file);

        let bytes = self
            .fetcher
            .fetch(&request.root_file)
            .await
            .map_err(|e| GlanceError::RootFetch {
                url: request.root_file.clone(),
                reason: e.to_string(),
            })?;

        let resolver = AssetResolver::new(
            &request.root_file,
            &request.root_path,
            &request.assets,
            &self.fetcher,
        )
        .with_object_urls(self.object_urls.clone());

        let mut raw = self
            .validator
            .validate_bytes(&bytes, &resolver)
            .await
            .map_err(|e| match e {
                GlanceError::ResourceResolution { .. } | GlanceError::ValidatorInvocation(_) => e,
                other => GlanceError::ValidatorInvocation(other.to_string()),
            })?;

        if raw.uri.is_none() {
            raw.uri = Some(request.root_file.clone());
        }

        Ok(Normalizer::new(&self.registry, &self.policy).normalize(raw))
    }
}
