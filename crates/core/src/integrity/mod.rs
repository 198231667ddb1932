//! Integrity Guard: gates every delete on dependent-record existence.
//!
//! No delete is allowed to leave a dangling reference. Depending on the
//! entity kind a delete is a hard delete, a soft delete (deactivate), or a
//! rejection carrying the dependent counts.

pub mod error;
pub mod service;
pub mod types;

pub use error::IntegrityError;
pub use service::IntegrityGuard;
pub use types::{CascadeReport, DeleteOutcome, DependencySummary, PermissionCheck};
