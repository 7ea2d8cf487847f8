//! Replays a route's transforms over a representation.

use crate::error::{MigrateError, MigrateResult};
use crate::registry::TransformGraph;
use crate::transform::Transform;
use backdate_types::{Attrs, Edge, Route, Supplemental};
use std::collections::BTreeSet;
use tracing::{debug, error};

/// A route with every step's transform already looked up.
///
/// Resolution happens before anything runs, so a missing transform is
/// reported without touching the representation.
#[derive(Debug, Clone)]
pub struct MigrationPlan<'g> {
    entity_type: &'g str,
    route: Route,
    steps: Vec<(Edge, &'g Transform)>,
}

impl<'g> MigrationPlan<'g> {
    /// Looks up the transform for every consecutive pair on `route`.
    pub fn resolve(graph: &'g TransformGraph, route: Route) -> MigrateResult<Self> {
        if route.len() < 2 {
            return Err(MigrateError::TooShortRoute { len: route.len() });
        }

        let steps = route
            .steps()
            .map(|edge| match graph.transform(&edge.from, &edge.to) {
                Some(transform) => Ok((edge, transform)),
                None => {
                    error!(
                        entity_type = graph.entity_type(),
                        edge = %edge,
                        route = %route,
                        "Route step has no registered transform"
                    );
                    Err(MigrateError::MissingTransform {
                        entity_type: graph.entity_type().to_string(),
                        from: edge.from,
                        to: edge.to,
                    })
                }
            })
            .collect::<MigrateResult<Vec<_>>>()?;

        Ok(Self {
            entity_type: graph.entity_type(),
            route,
            steps,
        })
    }

    #[must_use]
    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Steps in replay order.
    pub fn steps(&self) -> impl Iterator<Item = (&Edge, &Transform)> + '_ {
        self.steps.iter().map(|(edge, transform)| (edge, *transform))
    }

    /// Union of the supplemental fields declared by every step.
    #[must_use]
    pub fn required_supplemental(&self) -> BTreeSet<String> {
        self.steps
            .iter()
            .flat_map(|(_, transform)| transform.requires().iter().cloned())
            .collect()
    }

    /// Runs every step in order, mutating `attrs` in place.
    ///
    /// The first failing transform aborts the replay and its error is
    /// returned as-is. `attrs` is then left mid-migration and should be
    /// discarded.
    pub fn run(&self, attrs: &mut Attrs, data: &Supplemental) -> MigrateResult<()> {
        for (edge, transform) in &self.steps {
            debug!(
                entity_type = self.entity_type,
                edge = %edge,
                transform = transform.name(),
                "Applying transform"
            );
            transform.apply(attrs, data)?;
        }
        Ok(())
    }
}

/// Replays the transforms along `route` over `attrs`.
///
/// `route` must hold at least two versions, each consecutive pair backed by a
/// transform in `graph`.
pub fn apply_route(
    graph: &TransformGraph,
    route: &Route,
    attrs: &mut Attrs,
    data: &Supplemental,
) -> MigrateResult<()> {
    MigrationPlan::resolve(graph, route.clone())?.run(attrs, data)
}
