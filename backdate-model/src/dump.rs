use backdate_migrate::fields::value_kind;
use backdate_migrate::{Attrs, MigrateError, MigrateResult, short_type_name};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Controls how an entity is turned into its baseline representation.
///
/// Options only touch top-level fields. The migration engine never looks
/// inside this bundle; it is handed straight to [`crate::Migratable::dump`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DumpOptions {
    /// Keep only these fields. `None` keeps everything.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<BTreeSet<String>>,
    /// Drop these fields. Applied after `include`.
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub exclude: BTreeSet<String>,
    /// Drop fields whose value is `null`.
    pub exclude_none: bool,
}

impl DumpOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the dump to `fields`.
    #[must_use]
    pub fn with_include<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Adds `fields` to the exclusion set.
    #[must_use]
    pub fn with_exclude<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(fields.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_exclude_none(mut self, exclude_none: bool) -> Self {
        self.exclude_none = exclude_none;
        self
    }

    /// Parses options from JSON. Missing keys take their defaults.
    pub fn from_json(json: &str) -> MigrateResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Applies the filters to an already serialized representation.
    pub fn apply(&self, attrs: &mut Attrs) {
        attrs.retain(|key, value| {
            let included = self.include.as_ref().is_none_or(|only| only.contains(key));
            included && !self.exclude.contains(key) && !(self.exclude_none && value.is_null())
        });
    }
}

/// Serializes `entity` into its baseline representation.
///
/// The entity must serialize to a JSON object; anything else is reported as
/// [`MigrateError::NotAnObject`].
pub fn dump_value<T: Serialize + ?Sized>(entity: &T, options: &DumpOptions) -> MigrateResult<Attrs> {
    match serde_json::to_value(entity)? {
        Value::Object(mut attrs) => {
            options.apply(&mut attrs);
            Ok(attrs)
        }
        other => Err(MigrateError::NotAnObject {
            entity_type: short_type_name::<T>().to_string(),
            found: value_kind(&other),
        }),
    }
}
