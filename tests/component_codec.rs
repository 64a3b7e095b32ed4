//! Component documents end to end: decode, edit, encode

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use rigging::component::{self, decode_str, ComponentDocument};
use rigging::identity::{FileId, InstanceId, ObjectPointer, ReferenceKind};
use rigging::observable::{CollectionAction, ListEvent};
use rigging::{decode_components, encode_components, DecodeError, PropertyValue};

// ---------------------------------------------------------------------------
// Round trip
// ---------------------------------------------------------------------------

#[test]
fn test_decode_encode_decode_is_identity() {
    let registry = common::registry();
    let light = decode_str(common::LIGHT, &registry).unwrap();

    let again = component::decode(&component::encode(&light), &registry).unwrap();
    assert_eq!(again, light);

    let text = component::encode_to_string(&light).unwrap();
    assert!(text.contains("intensity: 0.1\n"));
    assert_eq!(decode_str(&text, &registry).unwrap(), light);
}

#[test]
fn test_scene_round_trips_in_order() {
    let registry = common::registry();
    let decoded = decode_components(common::SCENE, &registry).unwrap();
    assert!(decoded.is_complete());

    let text = serde_yaml::to_string(&encode_components(&decoded.components)).unwrap();
    let again = decode_components(&text, &registry).unwrap();
    assert_eq!(again.components, decoded.components);

    let typenames: Vec<String> = again
        .components
        .to_vec()
        .iter()
        .map(|c| c.typename().to_string())
        .collect();
    assert_eq!(typenames, vec!["Light", "Spawner"]);
}

#[test]
fn test_override_order_is_preserved() {
    let registry = common::registry();
    let light = decode_str(common::LIGHT, &registry).unwrap();
    assert_eq!(
        light.keys(),
        vec!["intensity", "color", "orientation", "mode", "instanceId"]
    );

    let document = component::to_document(&light);
    let keys: Vec<&str> = document
        .override_properties
        .keys()
        .filter_map(|k| k.as_str())
        .collect();
    assert_eq!(keys, vec!["intensity", "color", "orientation", "mode", "instanceId"]);
}

// ---------------------------------------------------------------------------
// Rejections
// ---------------------------------------------------------------------------

#[test]
fn test_unknown_property_is_rejected() {
    let registry = common::registry();
    let err = decode_str(
        "typename: Light\noverrideProperties:\n  intensity: 1\n  brightness: 2\n",
        &registry,
    )
    .unwrap_err();
    assert_eq!(err, DecodeError::UnknownProperty("brightness".to_string()));
}

#[test]
fn test_missing_fields_are_reported() {
    let registry = common::registry();
    assert_eq!(
        decode_str("typename: Light\n", &registry).unwrap_err(),
        DecodeError::MissingField("overrideProperties".to_string())
    );
    assert_eq!(
        decode_str("overrideProperties: {}\n", &registry).unwrap_err(),
        DecodeError::MissingField("typename".to_string())
    );
}

#[test]
fn test_unknown_component_is_rejected() {
    let registry = common::registry();
    assert_eq!(
        decode_str("typename: Camera\noverrideProperties: {}\n", &registry).unwrap_err(),
        DecodeError::UnknownComponent("Camera".to_string())
    );
}

#[test]
fn test_wrong_shape_is_never_coerced() {
    let registry = common::registry();
    let err = decode_str(
        "typename: Light\noverrideProperties:\n  color: [1, 1, 1]\n",
        &registry,
    )
    .unwrap_err();
    assert_eq!(
        err,
        DecodeError::ShapeMismatch {
            key: "color".to_string(),
            expected: "a sequence of 4 floats".to_string(),
        }
    );

    let err = decode_str(
        "typename: Light\noverrideProperties:\n  mode: Area\n",
        &registry,
    )
    .unwrap_err();
    assert!(matches!(err, DecodeError::ShapeMismatch { ref key, .. } if key == "mode"));
}

#[test]
fn test_document_parses_without_a_registry() {
    let document = ComponentDocument::parse(common::LIGHT).unwrap();
    assert_eq!(document.typename, "Light");
    assert_eq!(document.override_properties.len(), 5);
}

// ---------------------------------------------------------------------------
// Identity and references
// ---------------------------------------------------------------------------

#[test]
fn test_sentinel_ids_are_empty() {
    assert!(FileId::new("NullFileId").is_empty());
    assert!(FileId::new("").is_empty());
    assert!(!FileId::new("abc").is_empty());
    assert!(InstanceId::new("NullInstanceId").is_empty());
}

#[test]
fn test_null_pointer_decodes_to_sentinels() {
    let registry = common::registry();
    let spawner = decode_str(
        "typename: Spawner\noverrideProperties:\n  prefab: ~\n",
        &registry,
    )
    .unwrap();

    let prefab = spawner.property("prefab").unwrap();
    assert_eq!(prefab.as_object_pointer().unwrap().get(), ObjectPointer::empty());

    let encoded = component::encode(&spawner);
    let pointer = &encoded["overrideProperties"]["prefab"];
    assert_eq!(pointer["fileId"].as_str(), Some("NullFileId"));
    assert_eq!(pointer["instanceId"].as_str(), Some("NullInstanceId"));
}

#[test]
fn test_pointer_precedence() {
    let registry = common::registry();
    let decoded = decode_components(common::SCENE, &registry).unwrap();
    let spawner = decoded.components.get(1).unwrap();

    // fileId set: asset, even though the slot is not instantiable
    assert_eq!(
        spawner.pointer_reference_kind("prefab"),
        Some(ReferenceKind::Asset)
    );
    // both sentinel, instantiable slot: instance
    assert_eq!(
        spawner.pointer_reference_kind("target"),
        Some(ReferenceKind::Instance)
    );

    let prefab = spawner.property("prefab").unwrap();
    let pointer = prefab.as_object_pointer().unwrap();
    pointer.set(ObjectPointer::new(FileId::null(), InstanceId::new("obj42")));
    assert_eq!(
        spawner.pointer_reference_kind("prefab"),
        Some(ReferenceKind::Instance)
    );

    assert_eq!(spawner.pointer_reference_kind("instanceId"), None);
    assert_eq!(spawner.instance_id(), InstanceId::new("spawner1"));
}

// ---------------------------------------------------------------------------
// Editing
// ---------------------------------------------------------------------------

#[test]
fn test_setting_the_current_value_is_a_no_op() {
    let registry = common::registry();
    let light = decode_str(common::LIGHT, &registry).unwrap();
    let intensity = light.property("intensity").unwrap();
    let cell = intensity.as_float().unwrap();

    let notified = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&notified);
    light.subscribe(move |_| *counter.borrow_mut() += 1);

    assert!(!cell.set(0.1));
    assert_eq!(*notified.borrow(), 0);
    assert!(!light.is_dirty());

    assert!(cell.set(0.2));
    assert_eq!(*notified.borrow(), 1);
    assert!(light.is_dirty());
}

#[test]
fn test_structural_and_item_changes_are_distinct() {
    let registry = common::registry();
    let decoded = decode_components(common::SCENE, &registry).unwrap();
    let components = decoded.components;

    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    components.subscribe(move |event| {
        let label = match event {
            ListEvent::Changed(change) => format!("changed:{:?}", change.action()),
            ListEvent::ItemChanged(item) => format!("item:{}", item.property),
        };
        sink.borrow_mut().push(label);
    });

    let extra = decode_str(common::LIGHT, &registry).unwrap();
    components.push(extra.clone());
    extra
        .property("intensity")
        .unwrap()
        .as_float()
        .unwrap()
        .set(3.0);

    assert_eq!(
        *events.borrow(),
        vec![
            format!("changed:{:?}", CollectionAction::Insert),
            "item:values".to_string(),
        ]
    );
}

#[test]
fn test_override_and_revert_are_structural_edits() {
    let registry = common::registry();
    let light = decode_str(common::LIGHT, &registry).unwrap();

    let uv = light.override_property("uv").unwrap();
    assert_eq!(uv, PropertyValue::vec2(0.0, 0.0));
    assert!(light.is_dirty());
    let revision = light.revision();

    assert!(light.revert_property("uv").is_some());
    assert!(!light.is_overridden("uv"));
    assert_eq!(light.revision(), revision + 1);

    assert!(matches!(
        light.set_property("intensity", PropertyValue::enum_member("Spot")),
        Err(DecodeError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_set_property_refuses_enum_non_members() {
    let registry = common::registry();
    let light = decode_str(common::LIGHT, &registry).unwrap();
    let revision = light.revision();

    assert_eq!(
        light.set_property("mode", PropertyValue::enum_member("Area")),
        Err(DecodeError::ShapeMismatch {
            key: "mode".to_string(),
            expected: "a member of enum ELightMode".to_string(),
        })
    );
    assert_eq!(light.revision(), revision);
    assert!(!light.is_dirty());

    light
        .set_property("mode", PropertyValue::enum_member("Point"))
        .unwrap();
    assert_eq!(light.property("mode"), Some(PropertyValue::enum_member("Point")));
}

#[test]
fn test_bad_item_is_reported_with_its_index() {
    let registry = common::registry();
    let decoded = decode_components(
        "- typename: Light\n  overrideProperties: {intensity: 1}\n- typename: Light\n  overrideProperties: {glow: 1}\n",
        &registry,
    )
    .unwrap();

    assert_eq!(decoded.components.len(), 1);
    assert_eq!(decoded.source_index(0), Some(0));
    assert_eq!(decoded.failures.len(), 1);
    assert_eq!(decoded.failures[0].index, 1);
    assert_eq!(decoded.failures[0].typename.as_deref(), Some("Light"));
    assert_eq!(
        decoded.failures[0].error,
        DecodeError::UnknownProperty("glow".to_string())
    );
}

#[test]
fn test_loaded_items_keep_their_input_position() {
    let registry = common::registry();
    let decoded = decode_components(
        "- typename: Camera\n  overrideProperties: {}\n- typename: Light\n  overrideProperties: {intensity: 2}\n",
        &registry,
    )
    .unwrap();

    assert_eq!(decoded.components.len(), 1);
    assert_eq!(decoded.failures[0].index, 0);
    assert_eq!(decoded.source_index(0), Some(1));
}
