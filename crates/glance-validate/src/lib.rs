//! Glance Validate - Running validators against resolved assets
//!
//! This crate fetches a root file, hands it to a `Validator` together with
//! an `AssetResolver`, and turns the result into a `ValidationOutcome`.
//! `ValidationSession` sequences runs so only the latest one is presented.

mod gltf_validator;
mod runner;
mod session;
mod validator;

pub use gltf_validator::{GltfValidator, UNIT_LENGTH_TOLERANCE};
pub use runner::{ValidationRequest, ValidationRunner};
pub use session::{Ticket, ValidationSession};
pub use validator::Validator;
