//! Core type definitions for backdate.
//!
//! This crate defines the small, dependency-light vocabulary shared by the
//! migration engine and the entity facade:
//! - [`Version`] — an opaque, equality-only schema version token
//! - [`Edge`] — one registered `(from, to)` version transition
//! - [`Route`] — an ordered chain of versions found in the transform graph
//! - [`Attrs`] / [`Supplemental`] — the generic serialized representation and
//!   the caller-supplied extra data transforms may read

mod route;
mod version;

pub use route::{EmptyRoute, Route, Steps};
pub use version::{Edge, Version};

/// The generic serialized representation of an entity at some version.
///
/// Transforms mutate this map in place while a route is replayed.
pub type Attrs = serde_json::Map<String, serde_json::Value>;

/// Read-only data supplied by the caller of a dump request.
///
/// Used by transforms that need fields no longer present on the live entity.
pub type Supplemental = serde_json::Map<String, serde_json::Value>;
