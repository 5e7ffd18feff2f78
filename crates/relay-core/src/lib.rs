//! Shared building blocks for Relay
//!
//! Holds the error taxonomy every crate raises, the per-request context
//! handed to handlers, and the session tracker that coordinates graceful
//! shutdown.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod context;
mod error;
mod permission;
mod shutdown;

pub use context::{ClientIdentity, RequestContext};
pub use error::{ApiError, ErrorKind, HttpError};
pub use permission::{PermissionMode, UnknownPermissionMode};
pub use shutdown::{SessionGuard, ShutdownManager};
