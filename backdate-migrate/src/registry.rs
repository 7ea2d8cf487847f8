//! Transform graphs and the per-entity-type registry that owns them.
//!
//! The registry is built once during setup and then shared read-only with
//! every dump request. Registration needs `&mut`, so registering while dumps
//! are in flight is ruled out unless the caller adds its own locking.

use crate::error::{MigrateError, MigrateResult};
use crate::executor::MigrationPlan;
use crate::route::find_route;
use crate::transform::Transform;
use backdate_types::{Attrs, Edge, Route, Supplemental, Version};
use serde::{Deserialize, Serialize};
use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Registry behavior knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Log a warning when a `(from, to)` key is registered a second time.
    /// The newer transform always replaces the older one.
    pub warn_on_replace: bool,
    /// Reject routes with more transitions than this. `None` means unbounded.
    pub max_route_hops: Option<usize>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            warn_on_replace: true,
            max_route_hops: None,
        }
    }
}

impl RegistryConfig {
    /// Parses a config from JSON. Missing keys take their defaults.
    pub fn from_json(json: &str) -> MigrateResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// The directed version graph of one entity type.
///
/// Edge order is registration order. Re-registering an existing edge swaps
/// the transform but keeps the edge's original position, so route
/// tie-breaking does not shift under an override.
#[derive(Debug, Clone)]
pub struct TransformGraph {
    entity_type: String,
    config: RegistryConfig,
    order: Vec<Edge>,
    transforms: HashMap<Edge, Transform>,
}

impl TransformGraph {
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self::with_config(entity_type, RegistryConfig::default())
    }

    pub fn with_config(entity_type: impl Into<String>, config: RegistryConfig) -> Self {
        Self {
            entity_type: entity_type.into(),
            config,
            order: Vec::new(),
            transforms: HashMap::new(),
        }
    }

    /// Name used in diagnostics and errors.
    #[must_use]
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    #[must_use]
    pub fn config(&self) -> RegistryConfig {
        self.config
    }

    /// Stores `transform` under `(from, to)`, returning the transform it
    /// replaced, if any. Version tokens are not validated.
    pub fn register(
        &mut self,
        from: impl Into<Version>,
        to: impl Into<Version>,
        transform: Transform,
    ) -> Option<Transform> {
        let edge = Edge::new(from, to);
        debug!(
            entity_type = %self.entity_type,
            edge = %edge,
            transform = transform.name(),
            "Registering transform"
        );

        let replaced = self.transforms.insert(edge.clone(), transform);
        match &replaced {
            Some(old) => {
                if self.config.warn_on_replace {
                    warn!(
                        entity_type = %self.entity_type,
                        edge = %edge,
                        replaced = old.name(),
                        "Transform replaced by a later registration"
                    );
                }
            }
            None => self.order.push(edge),
        }
        replaced
    }

    /// Registers one transform under several edges.
    pub fn register_all<I, E>(&mut self, edges: I, transform: Transform)
    where
        I: IntoIterator<Item = E>,
        E: Into<Edge>,
    {
        for edge in edges {
            let Edge { from, to } = edge.into();
            self.register(from, to, transform.clone());
        }
    }

    /// Registered edges in registration order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.order
    }

    #[must_use]
    pub fn transform(&self, from: &Version, to: &Version) -> Option<&Transform> {
        self.transforms.get(&Edge::new(from, to))
    }

    #[must_use]
    pub fn contains(&self, from: &Version, to: &Version) -> bool {
        self.transform(from, to).is_some()
    }

    /// Every version mentioned by an edge, in first-seen order.
    #[must_use]
    pub fn versions(&self) -> Vec<&Version> {
        let mut seen = HashSet::new();
        self.order
            .iter()
            .flat_map(|e| [&e.from, &e.to])
            .filter(|v| seen.insert(*v))
            .collect()
    }

    /// Number of registered edges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Shortest route from `start` to `end`, honoring `max_route_hops`.
    ///
    /// # Errors
    ///
    /// - [`MigrateError::NoMigrationPath`] when `end` is unreachable
    /// - [`MigrateError::RouteTooLong`] when the shortest route exceeds the
    ///   configured hop limit
    pub fn route(&self, start: &Version, end: &Version) -> MigrateResult<Route> {
        let route = find_route(&self.order, start, end).ok_or_else(|| {
            MigrateError::NoMigrationPath {
                entity_type: self.entity_type.clone(),
                from: start.clone(),
                to: end.clone(),
            }
        })?;
        match self.config.max_route_hops {
            Some(max_hops) if route.hops() > max_hops => {
                debug!(
                    entity_type = %self.entity_type,
                    route = %route,
                    max_hops,
                    "Route exceeds hop limit"
                );
                Err(MigrateError::RouteTooLong {
                    entity_type: self.entity_type.clone(),
                    from: start.clone(),
                    to: end.clone(),
                    hops: route.hops(),
                    max_hops,
                })
            }
            _ => Ok(route),
        }
    }

    /// Finds a route and resolves every transform on it.
    pub fn plan(&self, start: &Version, end: &Version) -> MigrateResult<MigrationPlan<'_>> {
        MigrationPlan::resolve(self, self.route(start, end)?)
    }

    /// Migrates `attrs` from `start` to `end` in place.
    ///
    /// `start == end` is a no-op.
    pub fn migrate(
        &self,
        start: &Version,
        end: &Version,
        attrs: &mut Attrs,
        data: &Supplemental,
    ) -> MigrateResult<()> {
        if start == end {
            return Ok(());
        }
        self.plan(start, end)?.run(attrs, data)
    }
}

/// Transform graphs for every registered entity type.
#[derive(Debug, Clone, Default)]
pub struct TransformRegistry {
    graphs: HashMap<TypeId, TransformGraph>,
    config: RegistryConfig,
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            graphs: HashMap::new(),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> RegistryConfig {
        self.config
    }

    /// Registers `transform` for entity type `T` under `(from, to)`.
    pub fn register<T: 'static>(
        &mut self,
        from: impl Into<Version>,
        to: impl Into<Version>,
        transform: Transform,
    ) -> Option<Transform> {
        self.graph_mut::<T>().register(from, to, transform)
    }

    /// Registers one transform for `T` under several edges.
    pub fn register_all<T: 'static, I, E>(&mut self, edges: I, transform: Transform)
    where
        I: IntoIterator<Item = E>,
        E: Into<Edge>,
    {
        self.graph_mut::<T>().register_all(edges, transform);
    }

    /// Edges registered for `T`, in registration order.
    #[must_use]
    pub fn edges_of<T: 'static>(&self) -> &[Edge] {
        self.graph::<T>().map(TransformGraph::edges).unwrap_or(&[])
    }

    #[must_use]
    pub fn graph<T: 'static>(&self) -> Option<&TransformGraph> {
        self.graphs.get(&TypeId::of::<T>())
    }

    /// Graph for `T`, created empty on first use.
    pub fn graph_mut<T: 'static>(&mut self) -> &mut TransformGraph {
        let config = self.config;
        self.graphs
            .entry(TypeId::of::<T>())
            .or_insert_with(|| TransformGraph::with_config(short_type_name::<T>(), config))
    }

    /// Number of entity types with at least one graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }
}

/// `type_name` without the module path, e.g. `Car` for `my_app::models::Car`.
#[must_use]
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    match base.rfind("::") {
        Some(idx) => &full[idx + 2..],
        None => full,
    }
}
