#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

//! Metadata policy engine for OpenID Connect Federation trust chains.
//!
//! In a federation, every authority between the trust anchor and a leaf
//! entity may attach a [`MetadataPolicy`] constraining the leaf's metadata
//! parameters. Before the leaf's metadata can be trusted, the chain's
//! policies are folded into one effective policy with
//! [`MetadataPolicy::combine`], and that policy is applied to the leaf's
//! self-asserted metadata with [`MetadataPolicy::apply`].
//!
//! The engine is purely computational: it performs no I/O, no signature
//! verification and no chain resolution, and it never modifies its inputs,
//! so parsed policies can be shared freely across threads.
//!
//! ```
//! use fedpolicy::MetadataPolicy;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Policies in chain order: trust anchor first.
//! let anchor: MetadataPolicy = r#"{
//!     "scopes": {"subset_of": ["openid", "email", "profile"]},
//!     "require_auth_time": {"value": true}
//! }"#
//! .parse()?;
//! let intermediate: MetadataPolicy = r#"{
//!     "scopes": {"subset_of": ["openid", "email"]}
//! }"#
//! .parse()?;
//!
//! let effective = MetadataPolicy::combine(&[anchor, intermediate])?;
//!
//! let leaf = json!({
//!     "scopes": ["openid", "email", "phone"],
//!     "require_auth_time": false,
//!     "client_name": "My App"
//! });
//! let metadata = effective.apply(leaf.as_object().unwrap())?;
//!
//! assert_eq!(metadata["scopes"], json!(["openid", "email"]));
//! assert_eq!(metadata["require_auth_time"], json!(true));
//! assert_eq!(metadata["client_name"], json!("My App"));
//! # Ok(())
//! # }
//! ```
//!
//! Non-standard operations can be added by registering a
//! [`CustomOperationHandler`] on an [`OperationRegistry`] and parsing with
//! [`MetadataPolicy::parse_json_with`].

pub mod error;
pub mod operation;
pub mod policy;

mod observability;

// -----------------------
// Re-exports
// -----------------------

pub use crate::{
    error::PolicyError,
    operation::registry::{CustomOperation, CustomOperationHandler, OperationRegistry},
    operation::{OperationConfig, OperationError, OperationName, PolicyOperation},
    policy::{MetadataPolicy, MetadataPolicyEntry},
};
