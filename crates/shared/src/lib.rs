//! Shared types and errors for the Primanota engine.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Application-wide error taxonomy with HTTP mappings

pub mod error;
pub mod types;

pub use error::{AppError, AppResult};
