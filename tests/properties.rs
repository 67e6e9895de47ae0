//! Tests for the property capability model and the STIX property extractors.
mod common;
use flowpub::prelude::*;
use flowpub::stix::extract::{extract_action, extract_author, extract_basic, extract_flow};
use serde_json::json;

fn dict(entries: Vec<(&str, PropertyValue)>) -> PropertyValue {
    PropertyValue::Dictionary(
        entries
            .into_iter()
            .fold(PropertyMap::new(), |map, (k, v)| map.with(k, v)),
    )
}

/// An enum whose options are dictionaries carrying a numeric `value`.
fn confidence(selected: Option<&str>) -> PropertyValue {
    PropertyValue::Enum {
        selected: selected.map(str::to_string),
        options: PropertyMap::new()
            .with("high", dict(vec![("value", PropertyValue::scalar(90))]))
            .with("low", dict(vec![("value", PropertyValue::scalar(10))]))
            .with("broken", dict(vec![("label", PropertyValue::scalar("?"))])),
    }
}

#[test]
fn test_defined_semantics() {
    assert!(PropertyValue::scalar("x").is_defined());
    assert!(PropertyValue::scalar(0).is_defined());
    assert!(!PropertyValue::unset().is_defined());
    assert!(!PropertyValue::choice(None, &["A"]).is_defined());
    assert!(PropertyValue::choice(Some("A"), &["A"]).is_defined());
    assert!(!PropertyValue::list(PropertyKind::Scalar, vec![]).is_defined());
    assert!(!dict(vec![("a", PropertyValue::unset())]).is_defined());
    assert!(dict(vec![("a", PropertyValue::unset()), ("b", PropertyValue::scalar(1))]).is_defined());
}

#[test]
fn test_raw_values() {
    let collection = PropertyValue::Collection(
        PropertyMap::new()
            .with("b", PropertyValue::scalar(2))
            .with("skip", PropertyValue::unset())
            .with("a", PropertyValue::scalar("one")),
    );
    assert_eq!(collection.to_raw_value(), json!({ "b": 2, "a": "one" }));
    assert_eq!(
        collection.to_raw_value().as_object().unwrap().keys().collect::<Vec<_>>(),
        vec!["b", "a"]
    );

    let choice = PropertyValue::choice(Some("Yes"), &["Yes", "No"]);
    assert_eq!(choice.to_raw_value(), json!("Yes"));
    assert_eq!(
        choice.to_reference_value().map(|p| p.to_raw_value()),
        Some(json!("Yes"))
    );
    assert!(PropertyValue::choice(None, &["Yes"]).to_reference_value().is_none());
}

#[test]
fn test_property_map_insert_keeps_position() {
    let mut map = PropertyMap::new()
        .with("first", PropertyValue::scalar(1))
        .with("second", PropertyValue::scalar(2));
    map.insert("first", PropertyValue::scalar(3));

    let keys: Vec<&str> = map.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["first", "second"]);
    assert_eq!(map.get("first"), Some(&PropertyValue::scalar(3)));
    assert_eq!(map.len(), 2);
}

#[test]
fn test_property_lookup_through_trait() {
    let root = dict(vec![(
        "author",
        PropertyValue::Collection(PropertyMap::new().with("name", PropertyValue::scalar("Ann"))),
    )]);

    let name = root.get("author").and_then(|a| a.get("name")).unwrap();
    assert_eq!(name.kind(), PropertyKind::Scalar);
    assert_eq!(name.to_raw_value(), json!("Ann"));
    assert!(root.get("missing").is_none());
}

#[test]
fn test_property_value_deserialization() {
    let json = r#"{
        "name": { "scalar": "Phish" },
        "tactic": { "enum": { "selected": "Initial Access", "options": { "Initial Access": { "scalar": "Initial Access" } } } },
        "tags": { "list": { "form": "scalar", "items": [ { "scalar": "a" }, { "scalar": null } ] } },
        "meta": { "collection": { "k": { "scalar": 1 } } }
    }"#;
    let map: PropertyMap = serde_json::from_str(json).unwrap();

    assert_eq!(map.len(), 4);
    assert_eq!(map.get("name"), Some(&PropertyValue::scalar("Phish")));
    assert_eq!(map.get("tactic").unwrap().kind(), PropertyKind::Enum);
    assert_eq!(
        map.get("tags").unwrap().element_kind(),
        Some(PropertyKind::Scalar)
    );
    assert_eq!(map.get("meta").unwrap().kind(), PropertyKind::Collection);
}

#[test]
fn test_basic_extraction() {
    let properties = dict(vec![
        ("name", PropertyValue::scalar("Phish")),
        ("empty", PropertyValue::unset()),
        ("active", PropertyValue::choice(Some("True"), &["True", "False"])),
        ("muted", PropertyValue::choice(Some("False"), &["True", "False"])),
        ("level", PropertyValue::choice(Some("High"), &["High", "Low"])),
        ("unset_level", PropertyValue::choice(None, &["High", "Low"])),
        (
            "tags",
            PropertyValue::list(
                PropertyKind::Scalar,
                vec![
                    PropertyValue::scalar("a"),
                    PropertyValue::unset(),
                    PropertyValue::scalar("b"),
                ],
            ),
        ),
        ("no_tags", PropertyValue::list(PropertyKind::Scalar, vec![])),
        (
            "meta",
            PropertyValue::Collection(PropertyMap::new().with("k", PropertyValue::scalar(1))),
        ),
    ]);

    let fields = extract_basic(&properties).unwrap();
    assert_eq!(
        serde_json::Value::Object(fields),
        json!({
            "name": "Phish",
            "active": true,
            "muted": false,
            "level": "high",
            "tags": ["a", "b"],
            "meta": { "k": 1 },
        })
    );
}

#[test]
fn test_basic_extraction_rejects_nested_dictionaries() {
    let properties = dict(vec![("inner", dict(vec![("x", PropertyValue::scalar(1))]))]);

    let err = extract_basic(&properties).unwrap_err();
    assert_eq!(
        err,
        PublishError::Property(PropertyError::NestedDictionaryNotAllowed {
            key: "inner".to_string()
        })
    );
}

#[test]
fn test_basic_extraction_rejects_complex_list_elements() {
    for (element, kind) in [
        (PropertyValue::choice(Some("A"), &["A"]), "enum"),
        (dict(vec![("x", PropertyValue::scalar(1))]), "dictionary"),
        (PropertyValue::list(PropertyKind::Scalar, vec![]), "list"),
    ] {
        let properties = dict(vec![(
            "items",
            PropertyValue::list(PropertyKind::Scalar, vec![element]),
        )]);

        let err = extract_basic(&properties).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Basic lists cannot contain {} elements (found one in 'items')", kind)
        );
    }
}

#[test]
fn test_action_confidence() {
    let properties = dict(vec![
        ("name", PropertyValue::scalar("Phish")),
        ("confidence", confidence(Some("high"))),
    ]);
    let fields = extract_action(&properties).unwrap();
    assert_eq!(fields.get("confidence"), Some(&json!(90)));
    assert_eq!(fields.get("name"), Some(&json!("Phish")));

    let unset = dict(vec![("confidence", confidence(None))]);
    assert!(extract_action(&unset).unwrap().get("confidence").is_none());
}

#[test]
fn test_action_confidence_errors() {
    let not_enum = dict(vec![("confidence", PropertyValue::scalar(50))]);
    assert!(matches!(
        extract_action(&not_enum).unwrap_err(),
        PublishError::MalformedProperty { ref key, .. } if key == "confidence"
    ));

    let text_option = dict(vec![(
        "confidence",
        PropertyValue::choice(Some("High"), &["High"]),
    )]);
    assert!(matches!(
        extract_action(&text_option).unwrap_err(),
        PublishError::MalformedProperty { .. }
    ));

    let no_value = dict(vec![("confidence", confidence(Some("broken")))]);
    assert_eq!(
        extract_action(&no_value).unwrap_err(),
        PublishError::MissingSubproperty {
            key: "confidence".to_string(),
            subproperty: "value".to_string(),
        }
    );
}

#[test]
fn test_action_keeps_other_properties_raw() {
    let properties = dict(vec![(
        "details",
        dict(vec![("x", PropertyValue::scalar(1)), ("y", PropertyValue::unset())]),
    )]);

    let fields = extract_action(&properties).unwrap();
    assert_eq!(fields.get("details"), Some(&json!({ "x": 1 })));
}

#[test]
fn test_flow_extraction() {
    let page = PropertyValue::Dictionary(common::page_properties());

    let fields = extract_flow(&page).unwrap();
    assert!(fields.get("author").is_none());
    assert_eq!(fields.get("scope"), Some(&json!("incident")));
    assert_eq!(fields.get("description"), Some(&json!("A flow used in tests")));
}

#[test]
fn test_flow_extraction_errors() {
    let scalar_scope = dict(vec![("scope", PropertyValue::scalar("incident"))]);
    assert!(matches!(
        extract_flow(&scalar_scope).unwrap_err(),
        PublishError::MalformedProperty { ref key, .. } if key == "scope"
    ));

    let scalar_refs = dict(vec![(
        "external_references",
        PropertyValue::list(PropertyKind::Scalar, vec![PropertyValue::scalar("x")]),
    )]);
    assert!(matches!(
        extract_flow(&scalar_refs).unwrap_err(),
        PublishError::MalformedProperty { ref key, .. } if key == "external_references"
    ));
}

#[test]
fn test_author_extraction() {
    let page = PropertyValue::Dictionary(common::page_properties());
    let fields = extract_author(&page).unwrap();
    assert_eq!(
        serde_json::Value::Object(fields),
        json!({ "name": "Jane Analyst", "identity_class": "individual" })
    );

    let missing = dict(vec![("name", PropertyValue::scalar("Flow"))]);
    assert!(matches!(
        extract_author(&missing).unwrap_err(),
        PublishError::InvalidAuthor(_)
    ));

    let scalar = dict(vec![("author", PropertyValue::scalar("Jane"))]);
    assert_eq!(
        extract_author(&scalar).unwrap_err(),
        PublishError::InvalidAuthor("expected a collection, found a scalar".to_string())
    );

    let bad_class = dict(vec![(
        "author",
        dict(vec![("identity_class", PropertyValue::scalar("individual"))]),
    )]);
    assert!(matches!(
        extract_author(&bad_class).unwrap_err(),
        PublishError::MalformedProperty { .. }
    ));
}
