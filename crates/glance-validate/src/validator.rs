//! The validator boundary

use glance_asset::ResourceLoader;
use glance_core::{RawReport, Result};

/// A validator that turns root file bytes into a raw report
///
/// External references are requested through `loader`. Loader failures must
/// be returned as-is so the runner can report them as resolution failures.
#[allow(async_fn_in_trait)]
pub trait Validator {
    async fn validate_bytes<L: ResourceLoader>(&self, bytes: &[u8], loader: &L) -> Result<RawReport>;
}
