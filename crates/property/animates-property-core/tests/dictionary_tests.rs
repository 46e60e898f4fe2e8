use animates_property_core::{
    CompositePropertyBuilder, DictionaryProperty, DictionaryPropertyBuilder, PropertyBuilder,
    PropertyError, TypeRegistry,
};
use animates_test_fixtures::dictionaries;
use serde_json::{json, Value};

fn complex_values() -> Value {
    dictionaries::load("complex").expect("complex dictionary fixture")
}

fn point_schema(default_tick: i64) -> CompositePropertyBuilder {
    CompositePropertyBuilder::new("point")
        .property(
            PropertyBuilder::new("tick")
                .type_name("float")
                .value(default_tick),
        )
        .composite(
            CompositePropertyBuilder::new("position")
                .property(PropertyBuilder::new("x").type_name("float").value(0))
                .property(PropertyBuilder::new("y").type_name("float").value(0)),
        )
}

fn mk_points(reg: &TypeRegistry) -> DictionaryProperty {
    DictionaryPropertyBuilder::new("points")
        .schema(point_schema(200))
        .values(complex_values())
        .create(reg)
        .unwrap()
}

fn num(v: &Value) -> f64 {
    v.as_f64().unwrap_or(f64::NAN)
}

#[test]
fn test_simple_dictionary() {
    let mut reg = TypeRegistry::with_builtins();
    reg.register("custom", vec![], None).unwrap();

    let dict = DictionaryPropertyBuilder::new("test")
        .schema(
            CompositePropertyBuilder::new("entry")
                .property(PropertyBuilder::new("name").type_name("custom")),
        )
        .values(dictionaries::load("simple").unwrap())
        .create(&reg)
        .unwrap();

    assert_eq!(dict.names(), vec!["id1.name", "id2.name"]);
    assert_eq!(dict.value("id2.name").unwrap(), &json!("SecondName"));
}

#[test]
fn test_complex_dictionary_names_and_values() {
    let reg = TypeRegistry::with_builtins();
    let dict = mk_points(&reg);

    assert_eq!(
        dict.names(),
        vec![
            "id1.tick",
            "id1.position.x",
            "id1.position.y",
            "id2.tick",
            "id2.position.x",
            "id2.position.y",
        ]
    );
    assert_eq!(num(dict.value("id1.position.x").unwrap()), 10.0);
    assert_eq!(num(dict.value("id1.position.y").unwrap()), 20.0);
    assert_eq!(num(dict.value("id1.tick").unwrap()), 100.0);
    assert_eq!(num(dict.value("id2.tick").unwrap()), 500.0);

    // Same leaf, reached relative to the entry
    let id2 = dict.entry("id2").unwrap();
    assert_eq!(num(id2.value("position.x").unwrap()), 44.0);
}

#[test]
fn test_values_maps_keys_to_subtrees() {
    let reg = TypeRegistry::with_builtins();
    let dict = mk_points(&reg);
    let values = dict.values();

    assert_eq!(values.len(), 2);
    assert_eq!(num(values["id1"].value("tick").unwrap()), 100.0);
    assert_eq!(num(values["id1"].value("position.y").unwrap()), 20.0);
    assert_eq!(num(values["id2"].value("position.y").unwrap()), 66.0);
}

#[test]
fn test_values_to_json_mirrors_schema() {
    let reg = TypeRegistry::with_builtins();
    let dict = mk_points(&reg);
    let json = dict.values_to_json();

    assert_eq!(json.as_object().unwrap().len(), 2);
    assert_eq!(num(&json["id1"]["tick"]), 100.0);
    assert_eq!(num(&json["id1"]["position"]["x"]), 10.0);
    assert_eq!(num(&json["id2"]["position"]["y"]), 66.0);
}

#[test]
fn test_values_from_json_restores_leaf_values() {
    let reg = TypeRegistry::with_builtins();
    let original = mk_points(&reg);
    let exported = original.values_to_json();

    let mut restored = DictionaryPropertyBuilder::new("points")
        .schema(point_schema(0))
        .create(&reg)
        .unwrap();
    restored.values_from_json(&exported).unwrap();

    assert_eq!(restored.names(), original.names());
    for name in original.names() {
        assert_eq!(
            restored.value(&name).unwrap(),
            original.value(&name).unwrap(),
            "mismatch at {name}"
        );
    }
}

#[test]
fn test_values_from_json_replaces_same_key() {
    let reg = TypeRegistry::with_builtins();
    let mut dict = mk_points(&reg);
    dict.values_from_json(&json!({"id1": {"position": {"x": 1}}}))
        .unwrap();

    // Fresh clone: fields not supplied fall back to schema defaults
    assert_eq!(num(dict.value("id1.position.x").unwrap()), 1.0);
    assert_eq!(num(dict.value("id1.tick").unwrap()), 200.0);
    assert_eq!(num(dict.value("id2.tick").unwrap()), 500.0);
}

#[test]
fn test_unknown_single_key_creates_entry() {
    let reg = TypeRegistry::with_builtins();
    let mut dict = mk_points(&reg);
    dict.set_value("id3", json!({"tick": 7})).unwrap();
    assert_eq!(dict.keys(), vec!["id1", "id2", "id3"]);
    assert_eq!(num(dict.value("id3.tick").unwrap()), 7.0);
    assert_eq!(num(dict.value("id3.position.x").unwrap()), 0.0);
}

#[test]
fn test_invalid_entry_value_is_rejected() {
    let reg = TypeRegistry::with_builtins();
    let mut dict = mk_points(&reg);
    let res = dict.set_value("id1.tick", json!("soon"));
    assert!(matches!(res, Err(PropertyError::InvalidValue { .. })));
    assert_eq!(num(dict.value("id1.tick").unwrap()), 100.0);
}
