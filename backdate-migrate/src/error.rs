//! Error types for the migration engine.

use backdate_types::Version;
use thiserror::Error;

/// Result type for migration operations.
pub type MigrateResult<T> = Result<T, MigrateError>;

/// Errors that can occur while routing or replaying transforms.
///
/// Transform authors return these from their own code; the executor and the
/// entity facade pass them through untouched.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// The requested version is unreachable from the native version.
    #[error("no path found for {entity_type} from {from} to {to}")]
    NoMigrationPath {
        entity_type: String,
        from: Version,
        to: Version,
    },

    /// A route exists but is longer than `RegistryConfig::max_route_hops`.
    #[error("route for {entity_type} from {from} to {to} takes {hops} hops, over the limit of {max_hops}")]
    RouteTooLong {
        entity_type: String,
        from: Version,
        to: Version,
        hops: usize,
        max_hops: usize,
    },

    /// A route step has no registered transform. Indicates the registry
    /// changed between routing and replay, or a broken route was supplied.
    #[error("no transform registered for {entity_type} from {from} to {to}")]
    MissingTransform {
        entity_type: String,
        from: Version,
        to: Version,
    },

    /// A transform needed supplemental data the caller did not provide.
    #[error("missing supplemental field '{field}'")]
    MissingSupplemental { field: String },

    /// A transform needed a field absent from the representation.
    #[error("missing field '{field}'")]
    MissingField { field: String },

    /// A value could not be coerced to the type a transform enforces.
    #[error("invalid value for '{field}': expected {expected}, found {found}")]
    InvalidValue {
        field: String,
        expected: &'static str,
        found: String,
    },

    /// The dump collaborator produced something other than a field map.
    #[error("{entity_type} did not serialize to a map (found {found})")]
    NotAnObject {
        entity_type: String,
        found: &'static str,
    },

    /// Executor was handed a route with fewer than two versions.
    #[error("route must contain at least two versions, got {len}")]
    TooShortRoute { len: usize },

    /// Free-form failure raised by a transform.
    #[error("transform '{name}' failed: {message}")]
    Transform { name: String, message: String },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MigrateError {
    /// Shorthand for a free-form transform failure.
    pub fn transform(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transform {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Replaces the entity type named by routing errors.
    ///
    /// Other variants are returned unchanged, so transform failures still
    /// pass through verbatim.
    #[must_use]
    pub fn for_entity(self, name: &str) -> Self {
        match self {
            Self::NoMigrationPath { from, to, .. } => Self::NoMigrationPath {
                entity_type: name.to_string(),
                from,
                to,
            },
            Self::RouteTooLong {
                from,
                to,
                hops,
                max_hops,
                ..
            } => Self::RouteTooLong {
                entity_type: name.to_string(),
                from,
                to,
                hops,
                max_hops,
            },
            Self::MissingTransform { from, to, .. } => Self::MissingTransform {
                entity_type: name.to_string(),
                from,
                to,
            },
            other => other,
        }
    }

    /// True for [`MigrateError::NoMigrationPath`].
    #[must_use]
    pub fn is_no_path(&self) -> bool {
        matches!(self, Self::NoMigrationPath { .. })
    }
}
