//! Versioned entity facade for backdate.
//!
//! Entities implement [`Migratable`] to declare their native schema version.
//! Callers then ask for the entity at any older version with
//! [`Migratable::dump_version`], which serializes the entity, finds a route
//! through the transforms registered in a [`TransformRegistry`], and replays it.
//!
//! [`DumpOptions`] shape the baseline serialization (field inclusion,
//! exclusion, null handling) and are forwarded untouched by the facade.

mod dump;
mod migratable;

pub use dump::{DumpOptions, dump_value};
pub use migratable::Migratable;

pub use backdate_migrate::{
    Attrs, MigrateError, MigrateResult, RegistryConfig, Supplemental, Transform, TransformRegistry,
    Version, fields,
};
