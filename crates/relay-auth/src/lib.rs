//! API key authentication and tenant isolation
//!
//! Keys are only ever held as SHA-256 digests. The digest of the caller's
//! key doubles as the tenant identifier for owner-or-public filtering.

#![allow(clippy::must_use_candidate)]

mod error;
mod hash;
mod keyring;
mod scope;

pub use error::AuthError;
pub use hash::{ApiKeyHash, constant_time_eq, hash_api_key};
pub use keyring::KeyRing;
pub use scope::{Owned, filter_visible, is_visible_to};
