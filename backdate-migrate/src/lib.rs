//! Version-downgrade engine for backdate.
//!
//! An entity type owns a directed graph of versions whose edges carry
//! author-supplied [`Transform`]s. Dumping an entity at an older version is:
//!
//! 1. find the shortest route from the native version to the target with
//!    [`find_route`] (breadth-first, ties broken by registration order)
//! 2. resolve the transform behind every step into a [`MigrationPlan`]
//! 3. replay the plan over the generic representation, in place
//!
//! The [`TransformRegistry`] holds one [`TransformGraph`] per entity type. It
//! is an ordinary owned value built during setup and handed to whoever needs
//! it; there is no global state.

mod error;
mod executor;
pub mod fields;
mod registry;
mod route;
mod transform;

pub use error::{MigrateError, MigrateResult};
pub use executor::{MigrationPlan, apply_route};
pub use registry::{RegistryConfig, TransformGraph, TransformRegistry, short_type_name};
pub use route::find_route;
pub use transform::Transform;

pub use backdate_types::{Attrs, Edge, Route, Supplemental, Version};
