//! Common types and utilities shared by the certdedup crates.

pub mod ids;
pub mod observability;

pub use ids::{BundleId, InvalidBundleId};
pub use observability::{init_tracing, LogFormat};
