//! Shared Schemas for newsdeck
//!
//! All structs use `serde(rename_all = "camelCase")` so the JSON output
//! matches the shape the upstream providers and renderers use.

pub mod article;
pub mod filters;

pub use article::*;
pub use filters::*;
