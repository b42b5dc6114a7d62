//! Record synthesis from JSON value trees.

use dynrec_core::{
    from_json, BuilderConfig, DynrecError, FieldType, GenerationError, IdentifierPolicy, Number,
    NumberKind, RecordBuilder, ShapeRegistry, Value,
};
use serde_json::json;

// ============================================================================
// Shape and field layout
// ============================================================================

#[test]
fn field_set_equals_source_keys_in_order() {
    let value = from_json(r#"{"zeta": 1, "alpha": "a", "mid": true}"#).unwrap();
    let record = value.as_record().unwrap();
    let names: Vec<&str> = record.field_names().collect();
    assert_eq!(names, ["zeta", "alpha", "mid"]);
}

#[test]
fn field_types_are_resolved_from_values() {
    let value = from_json(
        r#"{"n": 1, "f": 1.5, "s": "x", "b": false, "z": null, "o": {}, "a": []}"#,
    )
    .unwrap();
    let record = value.as_record().unwrap();
    let shape = record.shape();

    assert_eq!(shape.field("n").unwrap().ty, FieldType::Number(NumberKind::I64));
    assert_eq!(shape.field("f").unwrap().ty, FieldType::Number(NumberKind::F64));
    assert_eq!(shape.field("s").unwrap().ty, FieldType::String);
    assert_eq!(shape.field("b").unwrap().ty, FieldType::Bool);
    assert_eq!(shape.field("z").unwrap().ty, FieldType::Any);
    assert_eq!(shape.field("a").unwrap().ty, FieldType::Array);

    let nested_id = record.get("o").unwrap().as_record().unwrap().shape_id();
    assert_eq!(shape.field("o").unwrap().ty, FieldType::Record(nested_id));
}

#[test]
fn identical_maps_get_distinct_shapes() {
    let value = from_json(r#"[{"x": 1}, {"x": 1}]"#).unwrap();
    let items = value.as_array().unwrap();
    let a = items[0].as_record().unwrap().shape_id();
    let b = items[1].as_record().unwrap().shape_id();
    assert_ne!(a, b, "shapes are never deduplicated");
}

#[test]
fn shape_ids_increase_in_construction_order() {
    let registry = ShapeRegistry::new();
    let builder = RecordBuilder::with_registry(&registry);

    let first = builder.build_any(&json!({"a": 1})).unwrap();
    let second = builder.build_any(&json!({"a": 1})).unwrap();

    let first = first.as_record().unwrap().shape_id();
    let second = second.as_record().unwrap().shape_id();
    assert_eq!(first.get(), 0);
    assert_eq!(second.get(), 1);
    assert_eq!(registry.allocated(), 2);
}

#[test]
fn children_are_built_before_their_parent() {
    let registry = ShapeRegistry::new();
    let builder = RecordBuilder::with_registry(&registry);
    let value = builder.build_any(&json!({"child": {"leaf": 1}})).unwrap();

    let parent = value.as_record().unwrap();
    let child = parent.get("child").unwrap().as_record().unwrap();
    assert!(child.shape_id() < parent.shape_id());
}

// ============================================================================
// Values
// ============================================================================

#[test]
fn nested_values_mirror_the_source() {
    let value = from_json(r#"{"user": {"name": "Ada", "tags": ["a", {"k": 2}, [3]]}}"#).unwrap();

    assert_eq!(value.pointer("user.name"), Some(&Value::from("Ada")));

    let tags = value.pointer("user.tags").unwrap().as_array().unwrap();
    assert_eq!(tags.len(), 3);
    assert_eq!(tags[0], Value::from("a"));
    assert_eq!(
        tags[1].as_record().unwrap().get("k"),
        Some(&Value::Number(Number::I64(2)))
    );
    assert_eq!(tags[2].as_array().unwrap(), &[Value::from(3i64)]);
}

#[test]
fn serializes_back_to_the_same_json() {
    let source = json!({"name": "Ada", "age": 36, "ratio": 0.5, "tags": ["x", null], "meta": {"ok": true}});
    let value = RecordBuilder::new().build_any(&source).unwrap();
    let back = serde_json::to_value(&value).unwrap();
    assert_eq!(back, source);
    // Key order is preserved, not just the key set.
    assert_eq!(
        serde_json::to_string(&value).unwrap(),
        serde_json::to_string(&source).unwrap()
    );
}

// ============================================================================
// Edge cases
// ============================================================================

#[test]
fn empty_map_builds_a_zero_field_record() {
    let value = from_json("{}").unwrap();
    let record = value.as_record().unwrap();
    assert!(record.is_empty());
    assert!(record.shape().is_empty());
}

#[test]
fn empty_list_builds_an_empty_array() {
    let value = from_json("[]").unwrap();
    assert_eq!(value.as_array().unwrap().len(), 0);
}

#[test]
fn top_level_null_passes_through() {
    let registry = ShapeRegistry::new();
    let value = RecordBuilder::with_registry(&registry)
        .build_any(&json!(null))
        .unwrap();
    assert!(value.is_null());
    assert_eq!(registry.allocated(), 0, "nothing should be constructed");
}

#[test]
fn top_level_scalars_pass_through() {
    assert_eq!(from_json("42").unwrap(), Value::from(42i64));
    assert_eq!(from_json("\"hi\"").unwrap(), Value::from("hi"));
    assert_eq!(from_json("true").unwrap(), Value::Bool(true));
}

#[test]
fn heterogeneous_arrays_keep_length_and_order() {
    let value = from_json(r#"[1, "two", null, {"four": 4}, [5]]"#).unwrap();
    let items = value.as_array().unwrap();
    assert_eq!(items.len(), 5);
    assert_eq!(items[0].type_name(), "i64");
    assert_eq!(items[1].type_name(), "string");
    assert_eq!(items[2].type_name(), "null");
    assert_eq!(items[3].type_name(), "record");
    assert_eq!(items[4].type_name(), "array");
}

// ============================================================================
// Generation errors
// ============================================================================

#[test]
fn invalid_identifier_fails_the_whole_build() {
    let err = from_json(r#"{"ok": 1, "items": [{"first-name": "Ada"}]}"#).unwrap_err();
    match err {
        DynrecError::Generation(GenerationError::InvalidIdentifier { name }) => {
            assert_eq!(name, "first-name");
        }
        other => panic!("expected InvalidIdentifier, got {other:?}"),
    }
}

#[test]
fn empty_key_is_rejected() {
    let err = RecordBuilder::new().build_any(&json!({"": 1})).unwrap_err();
    assert!(matches!(err, GenerationError::InvalidIdentifier { .. }));
}

#[test]
fn lenient_policy_accepts_arbitrary_keys() {
    let builder = RecordBuilder::new()
        .with_config(BuilderConfig::default().identifier_policy(IdentifierPolicy::Lenient));
    let value = builder
        .build_any(&json!({"first-name": "Ada", "@id": 7}))
        .unwrap();
    assert_eq!(value.as_record().unwrap().get("@id"), Some(&Value::from(7i64)));
}

#[test]
fn reserved_names_are_rejected() {
    let builder =
        RecordBuilder::new().with_config(BuilderConfig::default().reserve("shape_id"));
    let err = builder.build_any(&json!({"shape_id": 1})).unwrap_err();
    assert_eq!(
        err,
        GenerationError::Reserved {
            name: "shape_id".into(),
            member: "shape_id".into(),
        }
    );
}

#[test]
fn generated_accessor_collision_is_rejected() {
    let err = RecordBuilder::new()
        .build_any(&json!({"set_x": 1, "x": 2}))
        .unwrap_err();
    assert_eq!(
        err,
        GenerationError::AccessorCollision {
            member: "set_x".into(),
            first: "set_x".into(),
            second: "x".into(),
        }
    );
}

#[test]
fn malformed_json_is_a_parse_error() {
    let err = from_json("{not json").unwrap_err();
    assert!(matches!(err, DynrecError::JsonParse(_)));
}

// ============================================================================
// Ownership
// ============================================================================

#[test]
fn built_records_are_independent_of_each_other() {
    let value = from_json(r#"[{"n": 1}, {"n": 1}]"#).unwrap();
    let mut items = match value {
        Value::Array(items) => items,
        other => panic!("expected array, got {other:?}"),
    };
    items[0].as_record_mut().unwrap().set("n", 99i64).unwrap();
    assert_eq!(items[0].pointer("n"), Some(&Value::from(99i64)));
    assert_eq!(items[1].pointer("n"), Some(&Value::from(1i64)));
}

#[test]
fn shapes_are_released_with_their_records() {
    let registry = ShapeRegistry::new();
    let builder = RecordBuilder::with_registry(&registry);
    let value = builder.build_any(&json!({"a": {"b": {}}})).unwrap();
    assert_eq!(registry.live_shapes(), 3);
    drop(value);
    assert_eq!(registry.live_shapes(), 0);
}

#[test]
fn concurrent_builds_never_share_an_id() {
    let registry = ShapeRegistry::new();
    let ids: Vec<u64> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    let builder = RecordBuilder::with_registry(&registry);
                    (0..50)
                        .map(|_| {
                            let v = builder.build_any(&json!({"x": 1})).unwrap();
                            v.as_record().unwrap().shape_id().get()
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });

    let mut sorted = ids.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(sorted.len(), 400);
    assert_eq!(registry.allocated(), 400);
}
