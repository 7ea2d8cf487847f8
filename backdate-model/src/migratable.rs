use crate::dump::{DumpOptions, dump_value};
use backdate_migrate::{
    Attrs, MigrateError, MigrateResult, MigrationPlan, Route, Supplemental, TransformRegistry,
    Version, short_type_name,
};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

/// An entity that can be dumped at older schema versions.
///
/// Implementors declare their native version and register transforms for
/// their own type in a [`TransformRegistry`]:
///
/// ```
/// use backdate_model::{DumpOptions, Migratable, Transform, TransformRegistry};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Car {
///     name: String,
///     colour: String,
/// }
///
/// impl Migratable for Car {
///     const VERSION: &'static str = "2.0.0";
/// }
///
/// let mut registry = TransformRegistry::new();
/// registry.register::<Car>(
///     "2.0.0",
///     "1.0.0",
///     Transform::infallible("remove_colour", |attrs, _| {
///         attrs.remove("colour");
///     }),
/// );
///
/// let car = Car { name: "Model 3".into(), colour: "blue".into() };
/// let old = car
///     .dump_version(&registry, "1.0.0", None, &DumpOptions::default())
///     .unwrap();
/// assert_eq!(old.len(), 1);
/// assert_eq!(old["name"], "Model 3");
/// ```
pub trait Migratable: Serialize + 'static {
    /// The schema version this type represents.
    const VERSION: &'static str;

    /// Version of this instance. Defaults to [`Migratable::VERSION`]; override
    /// for types whose instances carry their own version.
    fn native_version(&self) -> Version {
        Version::from(Self::VERSION)
    }

    /// Name used in routing errors, whether or not any transform has been
    /// registered for this type.
    fn entity_type() -> &'static str
    where
        Self: Sized,
    {
        short_type_name::<Self>()
    }

    /// Produces the baseline representation at the native version.
    fn dump(&self, options: &DumpOptions) -> MigrateResult<Attrs> {
        dump_value(self, options)
    }

    /// Dumps this entity as it looked at `version`.
    ///
    /// `additional_data` is handed to every transform on the route, for
    /// versions that need fields the live entity no longer has (see
    /// [`Migratable::supplemental_for`]). `options` go to [`Migratable::dump`]
    /// unchanged.
    ///
    /// Asking for the native version returns the baseline dump without
    /// searching or running anything.
    ///
    /// # Errors
    ///
    /// - [`MigrateError::NoMigrationPath`] when no registered route reaches
    ///   `version`
    /// - [`MigrateError::RouteTooLong`] when the route exceeds the registry's
    ///   hop limit
    /// - whatever error a transform on the route returns, unchanged
    fn dump_version(
        &self,
        registry: &TransformRegistry,
        version: impl Into<Version>,
        additional_data: Option<&Supplemental>,
        options: &DumpOptions,
    ) -> MigrateResult<Attrs>
    where
        Self: Sized,
    {
        let version = version.into();
        let mut attrs = self.dump(options)?;

        let native = self.native_version();
        if version == native {
            return Ok(attrs);
        }

        let plan = plan_for::<Self>(registry, &native, &version)?;
        debug!(
            entity_type = Self::entity_type(),
            route = %plan.route(),
            "Dumping at older version"
        );

        let empty = Supplemental::new();
        plan.run(&mut attrs, additional_data.unwrap_or(&empty))?;
        Ok(attrs)
    }

    /// [`Migratable::dump_version`] with no supplemental data and default
    /// options.
    fn dump_at(&self, registry: &TransformRegistry, version: impl Into<Version>) -> MigrateResult<Attrs>
    where
        Self: Sized,
    {
        self.dump_version(registry, version, None, &DumpOptions::default())
    }

    /// The route a dump at `version` would replay.
    fn route_to(&self, registry: &TransformRegistry, version: impl Into<Version>) -> MigrateResult<Route>
    where
        Self: Sized,
    {
        let version = version.into();
        let native = self.native_version();
        if version == native {
            return Ok(Route::trivial(native));
        }
        Ok(plan_for::<Self>(registry, &native, &version)?.route().clone())
    }

    /// Supplemental fields declared by the transforms on the route to
    /// `version`. Empty when the route needs nothing beyond the entity itself.
    fn supplemental_for(
        &self,
        registry: &TransformRegistry,
        version: impl Into<Version>,
    ) -> MigrateResult<BTreeSet<String>>
    where
        Self: Sized,
    {
        let version = version.into();
        let native = self.native_version();
        if version == native {
            return Ok(BTreeSet::new());
        }
        Ok(plan_for::<Self>(registry, &native, &version)?.required_supplemental())
    }
}

fn plan_for<'r, T: Migratable>(
    registry: &'r TransformRegistry,
    native: &Version,
    version: &Version,
) -> MigrateResult<MigrationPlan<'r>> {
    match registry.graph::<T>() {
        Some(graph) => graph
            .plan(native, version)
            .map_err(|err| err.for_entity(T::entity_type())),
        None => Err(MigrateError::NoMigrationPath {
            entity_type: T::entity_type().to_string(),
            from: native.clone(),
            to: version.clone(),
        }),
    }
}
