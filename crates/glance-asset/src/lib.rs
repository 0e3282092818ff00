//! Glance Asset - Resource resolution for validation
//!
//! This crate maps the relative URIs a validator asks for onto bytes,
//! preferring an in-memory asset map (multi-file bundles) and falling back
//! to a fetch relative to the root file.

mod fetch;
mod handle;
mod map;
mod resolver;
mod uri;

pub use fetch::{Fetcher, UrlFetcher, DEFAULT_FETCH_TIMEOUT_SECS};
pub use handle::{ObjectUrl, ObjectUrls};
pub use map::{root_path_of, AssetMap, Blob};
pub use resolver::{AssetResolver, ResourceLoader};
pub use uri::{base_url, normalize_uri};
