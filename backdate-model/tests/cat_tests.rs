use backdate_model::{
    Attrs, DumpOptions, MigrateError, Migratable, Supplemental, Transform, TransformRegistry,
    Version, fields,
};
use pretty_assertions::assert_eq;
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::sync::Arc;

/// ChangeLog:
/// - 7.0.0: add eyes
/// - 6.0.0: add legs
/// - 5.0.1: fix typo, `nane` -> `name`
/// - 5.0.0: allow names for cats
/// - 4.0.0: remove weight
/// - 3.1.0: ints for heights and weights
/// - 3.0.0: add height and weight
/// - 2.0.0: `sound` -> `sounds`, now a list
#[derive(Debug, Clone, Serialize)]
struct Cat {
    name: String,
    eyes: i64,
    legs: i64,
    sounds: Vec<String>,
    height: i64,
}

impl Cat {
    fn new(name: &str, height: i64) -> Self {
        Self {
            name: name.into(),
            eyes: 2,
            legs: 4,
            sounds: vec!["meow".into(), "miau".into()],
            height,
        }
    }
}

impl Migratable for Cat {
    const VERSION: &'static str = "7.0.0";
}

fn drop_field(name: &'static str, field: &'static str) -> Transform {
    Transform::infallible(name, move |attrs, _| {
        attrs.remove(field);
    })
}

fn cat_registry() -> TransformRegistry {
    let mut registry = TransformRegistry::new();
    registry.register::<Cat>("7.0.0", "6.0.0", drop_field("remove_eyes", "eyes"));
    registry.register::<Cat>("6.0.0", "5.0.1", drop_field("remove_legs", "legs"));
    registry.register::<Cat>(
        "5.0.1",
        "5.0.0",
        Transform::new("unfix_name_spelling", |attrs, _| {
            fields::rename_field(attrs, "name", "nane")
        }),
    );
    registry.register::<Cat>("5.0.0", "4.0.0", drop_field("remove_name", "nane"));
    registry.register::<Cat>(
        "4.0.0",
        "3.1.0",
        Transform::new("add_weight", |attrs, data| {
            let weight = fields::to_int(fields::supplemental(data, "weight")?, "weight")?;
            attrs.insert("weight".into(), weight);
            Ok(())
        })
        .requiring(["weight"]),
    );
    registry.register::<Cat>(
        "3.1.0",
        "3.0.0",
        Transform::new("change_height_weight_type", |attrs, _| {
            for key in ["height", "weight"] {
                let value = fields::to_float(fields::field(attrs, key)?, key)?;
                attrs.insert(key.into(), value);
            }
            Ok(())
        }),
    );
    // Shortcuts let older versions be produced without supplemental data.
    registry.register_all::<Cat, _, _>(
        [("4.0.0", "2.0.0"), ("3.1.0", "2.0.0"), ("3.0.0", "2.0.0")],
        Transform::infallible("remove_height_and_weight", |attrs, _| {
            attrs.remove("height");
            attrs.remove("weight");
        }),
    );
    registry.register::<Cat>(
        "2.0.0",
        "1.0.0",
        Transform::infallible("remove_multilingual_sounds", |attrs, _| {
            attrs.remove("sounds");
            attrs.insert("sound".into(), json!("meow"));
        }),
    );
    registry.register::<Cat>(
        "4.0.0",
        "6.0.0",
        Transform::new("bad_migration_never_called", |_, _| {
            Err(MigrateError::transform("bad_migration_never_called", "was called"))
        }),
    );
    registry
}

fn weight(value: Value) -> Supplemental {
    let mut data = Supplemental::new();
    data.insert("weight".into(), value);
    data
}

fn dump(registry: &TransformRegistry, version: &str, data: Option<&Supplemental>) -> Value {
    let cat = Cat::new("furballs", 3);
    Value::Object(
        cat.dump_version(registry, version, data, &DumpOptions::default())
            .unwrap(),
    )
}

// ── Every version ────────────────────────────────────────────────

#[test]
fn previous_cat_outputs() {
    let registry = cat_registry();
    let w = weight(json!(5));

    assert_eq!(dump(&registry, "1.0.0", None), json!({"sound": "meow"}));
    assert_eq!(dump(&registry, "2.0.0", None), json!({"sounds": ["meow", "miau"]}));
    assert_eq!(
        dump(&registry, "3.0.0", Some(&w)),
        json!({"height": 3.0, "sounds": ["meow", "miau"], "weight": 5.0})
    );
    assert_eq!(
        dump(&registry, "3.1.0", Some(&w)),
        json!({"height": 3, "sounds": ["meow", "miau"], "weight": 5})
    );
    assert_eq!(
        dump(&registry, "4.0.0", None),
        json!({"height": 3, "sounds": ["meow", "miau"]})
    );
    assert_eq!(
        dump(&registry, "5.0.0", None),
        json!({"height": 3, "sounds": ["meow", "miau"], "nane": "furballs"})
    );
    assert_eq!(
        dump(&registry, "5.0.1", None),
        json!({"height": 3, "sounds": ["meow", "miau"], "name": "furballs"})
    );
    assert_eq!(
        dump(&registry, "6.0.0", None),
        json!({"height": 3, "sounds": ["meow", "miau"], "name": "furballs", "legs": 4})
    );
    assert_eq!(
        dump(&registry, "7.0.0", None),
        json!({"height": 3, "sounds": ["meow", "miau"], "name": "furballs", "legs": 4, "eyes": 2})
    );
}

// ── Supplemental data ────────────────────────────────────────────

#[test]
fn weight_is_required_for_3_1_0() {
    let registry = cat_registry();
    let cat = Cat::new("furballs", 3);
    let err = cat.dump_at(&registry, "3.1.0").unwrap_err();
    assert!(matches!(err, MigrateError::MissingSupplemental { ref field } if field == "weight"));
}

#[test]
fn weight_is_required_for_3_0_0() {
    let registry = cat_registry();
    let err = Cat::new("furballs", 3).dump_at(&registry, "3.0.0").unwrap_err();
    assert!(err.to_string().contains("weight"));
}

#[test]
fn weight_types_follow_each_transition() {
    let registry = cat_registry();
    let w = weight(json!(5));

    let v31 = dump(&registry, "3.1.0", Some(&w));
    assert!(v31["weight"].is_i64());
    assert!(v31["height"].is_i64());

    let v30 = dump(&registry, "3.0.0", Some(&w));
    assert!(v30["weight"].is_f64());
    assert!(v30["height"].is_f64());
}

#[test]
fn weight_is_coerced_from_string_and_float() {
    let registry = cat_registry();
    assert_eq!(dump(&registry, "3.1.0", Some(&weight(json!("5"))))["weight"], json!(5));
    assert_eq!(dump(&registry, "3.1.0", Some(&weight(json!(5.7))))["weight"], json!(5));
}

#[test]
fn uncoercible_weight_fails() {
    let registry = cat_registry();
    let cat = Cat::new("furballs", 3);
    let err = cat
        .dump_version(&registry, "3.1.0", Some(&weight(json!("heavy"))), &DumpOptions::default())
        .unwrap_err();
    assert!(matches!(err, MigrateError::InvalidValue { expected: "integer", .. }));
}

#[test]
fn supplemental_for_reports_declared_fields() {
    let registry = cat_registry();
    let cat = Cat::new("furballs", 3);
    let weight_only: BTreeSet<String> = ["weight".to_string()].into();

    assert_eq!(cat.supplemental_for(&registry, "3.1.0").unwrap(), weight_only);
    assert_eq!(cat.supplemental_for(&registry, "3.0.0").unwrap(), weight_only);
    assert!(cat.supplemental_for(&registry, "2.0.0").unwrap().is_empty());
    assert!(cat.supplemental_for(&registry, "1.0.0").unwrap().is_empty());
    assert!(cat.supplemental_for(&registry, "7.0.0").unwrap().is_empty());
    assert!(cat.supplemental_for(&registry, "0.1.0").is_err());
}

// ── Routing ──────────────────────────────────────────────────────

#[test]
fn shortcut_skips_supplemental_versions() {
    let registry = cat_registry();
    let route = Cat::new("furballs", 3).route_to(&registry, "1.0.0").unwrap();
    assert_eq!(
        route.to_string(),
        "7.0.0 -> 6.0.0 -> 5.0.1 -> 5.0.0 -> 4.0.0 -> 2.0.0 -> 1.0.0"
    );
}

#[test]
fn shortcut_edges_converge_on_same_representation() {
    let registry = cat_registry();
    let graph = registry.graph::<Cat>().unwrap();
    let cat = Cat::new("furballs", 3);
    let w = weight(json!(5));
    let empty = Supplemental::new();
    let v2 = Version::new("2.0.0");

    let mut from_31: Attrs = cat
        .dump_version(&registry, "3.1.0", Some(&w), &DumpOptions::default())
        .unwrap();
    graph.migrate(&"3.1.0".into(), &v2, &mut from_31, &empty).unwrap();

    let mut from_30: Attrs = cat
        .dump_version(&registry, "3.0.0", Some(&w), &DumpOptions::default())
        .unwrap();
    graph.migrate(&"3.0.0".into(), &v2, &mut from_30, &empty).unwrap();

    let direct = cat.dump_at(&registry, "2.0.0").unwrap();
    assert_eq!(from_31, from_30);
    assert_eq!(from_31, direct);
}

#[test]
fn edges_of_keeps_registration_order() {
    let registry = cat_registry();
    let edges = registry.edges_of::<Cat>();
    assert_eq!(edges.len(), 11);
    assert_eq!(edges[0].to_string(), "7.0.0 -> 6.0.0");
    assert_eq!(edges[6].to_string(), "4.0.0 -> 2.0.0");
    assert_eq!(edges[10].to_string(), "4.0.0 -> 6.0.0");
}

// ── Concurrency ──────────────────────────────────────────────────

#[test]
fn concurrent_dumps_share_one_registry() {
    let registry = Arc::new(cat_registry());
    let cat = Cat::new("furballs", 3);
    let expected = dump(&registry, "1.0.0", None);

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let cat = cat.clone();
                scope.spawn(move || cat.dump_at(&registry, "1.0.0").unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(Value::Object(handle.join().unwrap()), expected);
        }
    });
}
