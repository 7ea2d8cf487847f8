//! Transform handles: the unit of behavior behind one graph edge.

use crate::error::MigrateResult;
use backdate_types::{Attrs, Supplemental};
use std::fmt;
use std::sync::Arc;

type TransformFn = dyn Fn(&mut Attrs, &Supplemental) -> MigrateResult<()> + Send + Sync;

/// A named function that moves a representation one edge along the version
/// graph.
///
/// Cloning is cheap and shares the underlying function, so the same transform
/// can be registered under several `(from, to)` keys.
#[derive(Clone)]
pub struct Transform {
    name: Arc<str>,
    requires: Arc<[String]>,
    func: Arc<TransformFn>,
}

impl Transform {
    /// Wraps a fallible transform function.
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&mut Attrs, &Supplemental) -> MigrateResult<()> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name.into()),
            requires: Arc::from(Vec::<String>::new()),
            func: Arc::new(func),
        }
    }

    /// Wraps a transform that cannot fail (field drops, constant inserts).
    pub fn infallible<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&mut Attrs, &Supplemental) + Send + Sync + 'static,
    {
        Self::new(name, move |attrs, data| {
            func(attrs, data);
            Ok(())
        })
    }

    /// Declares the supplemental fields this transform reads.
    ///
    /// Purely descriptive: used by tooling to tell callers which
    /// `additional_data` keys a target version needs. The transform itself
    /// still reports a missing key when it runs.
    #[must_use]
    pub fn requiring<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        self.requires = Arc::from(fields);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Supplemental fields declared via [`Transform::requiring`].
    #[must_use]
    pub fn requires(&self) -> &[String] {
        &self.requires
    }

    /// Runs the transform over `attrs`.
    pub fn apply(&self, attrs: &mut Attrs, data: &Supplemental) -> MigrateResult<()> {
        (self.func)(attrs, data)
    }

    /// True when both handles share the same underlying function.
    #[must_use]
    pub fn same_as(&self, other: &Transform) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform")
            .field("name", &self.name)
            .field("requires", &self.requires)
            .finish_non_exhaustive()
    }
}
