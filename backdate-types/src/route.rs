//! Ordered version chains produced by the route finder.

use crate::{Edge, Version};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Returned when building a [`Route`] from an empty list of versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("route must contain at least one version")]
pub struct EmptyRoute;

/// An ordered sequence of versions from a start version to an end version,
/// both inclusive.
///
/// Every consecutive pair is expected to be backed by a registered transform.
/// A route always holds at least one version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Version>", into = "Vec<Version>")]
pub struct Route(Vec<Version>);

impl Route {
    /// The one-node route used when start and end are the same version.
    #[must_use]
    pub fn trivial(version: Version) -> Self {
        Self(vec![version])
    }

    /// Builds a route from an ordered list of versions.
    ///
    /// Returns `None` for an empty list.
    #[must_use]
    pub fn from_versions(versions: Vec<Version>) -> Option<Self> {
        if versions.is_empty() {
            None
        } else {
            Some(Self(versions))
        }
    }

    /// First version of the route.
    #[must_use]
    pub fn start(&self) -> &Version {
        &self.0[0]
    }

    /// Last version of the route.
    #[must_use]
    pub fn end(&self) -> &Version {
        &self.0[self.0.len() - 1]
    }

    /// Number of versions on the route, endpoints included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false: construction and deserialization both reject empty
    /// lists. Kept for symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of transitions (edges) on the route.
    #[must_use]
    pub fn hops(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// True when the route has no transitions.
    #[must_use]
    pub fn is_trivial(&self) -> bool {
        self.hops() == 0
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Version] {
        &self.0
    }

    #[must_use]
    pub fn into_versions(self) -> Vec<Version> {
        self.0
    }

    /// Iterates over the consecutive `(prev, next)` transitions in order.
    pub fn steps(&self) -> Steps<'_> {
        Steps {
            versions: &self.0,
            index: 0,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, version) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{version}")?;
        }
        Ok(())
    }
}

impl TryFrom<Vec<Version>> for Route {
    type Error = EmptyRoute;

    fn try_from(versions: Vec<Version>) -> Result<Self, Self::Error> {
        Self::from_versions(versions).ok_or(EmptyRoute)
    }
}

impl From<Route> for Vec<Version> {
    fn from(route: Route) -> Self {
        route.0
    }
}

impl AsRef<[Version]> for Route {
    fn as_ref(&self) -> &[Version] {
        &self.0
    }
}

/// Iterator over the transitions of a [`Route`].
#[derive(Debug, Clone)]
pub struct Steps<'a> {
    versions: &'a [Version],
    index: usize,
}

impl Iterator for Steps<'_> {
    type Item = Edge;

    fn next(&mut self) -> Option<Self::Item> {
        let pair = self.versions.get(self.index..self.index + 2)?;
        self.index += 1;
        Some(Edge::new(&pair[0], &pair[1]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.versions.len().saturating_sub(self.index + 1);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Steps<'_> {}
