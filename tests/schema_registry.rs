//! Schema loading: classification, defaults and load failures

mod common;

use std::sync::Arc;
use std::thread;

use rigging::property::PropertyKind;
use rigging::schema::{FileSchemaProvider, StaticSchemaProvider, FILE_ID_KEY, INSTANCE_ID_KEY};
use rigging::{ComponentInstance, PropertyValue, SchemaError, SchemaRegistry};
use tempfile::TempDir;

#[test]
fn test_every_signature_classifies_into_one_kind() {
    common::init_logging();
    let registry = common::registry();
    let light = registry.lookup_component("Light").unwrap();

    let kinds: Vec<(&str, &str)> = light
        .properties()
        .iter()
        .map(|(key, kind)| (key.as_str(), kind.name()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("intensity", "Float"),
            ("color", "Vec4"),
            ("offset", "Vec3"),
            ("uv", "Vec2"),
            ("orientation", "Rotation"),
            ("cookie", "FileReference"),
            ("owner", "InstanceReference"),
            ("mode", "EnumReference"),
            (FILE_ID_KEY, "FileReference"),
            (INSTANCE_ID_KEY, "InstanceReference"),
        ]
    );

    let spawner = registry.lookup_component("Spawner").unwrap();
    assert_eq!(
        spawner.property("prefab"),
        Some(&PropertyKind::object_pointer("Sailor::Model"))
    );
    assert!(!spawner.is_instantiable("prefab"));
    assert!(spawner.is_instantiable("target"));
}

#[test]
fn test_unclassifiable_signature_fails_the_whole_load() {
    let err = SchemaRegistry::load(
        "engineTypes:\n  - typename: A\n    properties:\n      speed: float\n  - typename: B\n    properties:\n      name: class std::string\n",
    )
    .unwrap_err();
    assert_eq!(
        err,
        SchemaError::UnclassifiableFieldType {
            component: "B".to_string(),
            property: "name".to_string(),
            signature: "class std::string".to_string(),
        }
    );
}

#[test]
fn test_enum_must_be_declared() {
    let err = SchemaRegistry::load(
        "engineTypes:\n  - typename: A\n    properties:\n      mode: enum EMissing\n",
    )
    .unwrap_err();
    assert_eq!(err, SchemaError::UnknownEnum("EMissing".to_string()));
}

#[test]
fn test_defaults_feed_fresh_overrides() {
    let registry = common::registry();
    let light = ComponentInstance::new(Arc::clone(registry.lookup_component("Light").unwrap()));

    assert_eq!(
        light.effective_property("intensity"),
        Some(PropertyValue::float(1.0))
    );
    assert_eq!(
        light.effective_property("color"),
        Some(PropertyValue::vec4(1.0, 1.0, 1.0, 1.0))
    );
    assert_eq!(
        light.effective_property("mode"),
        Some(PropertyValue::enum_member("Directional"))
    );
    assert!(light.is_empty());
}

#[test]
fn test_bad_default_is_malformed() {
    let err = SchemaRegistry::load(
        "engineTypes:\n  - typename: A\n    properties:\n      offset: struct glm::vec<3,float,0>\ndefaults:\n  - typename: A\n    defaultValues:\n      offset: [1, 2]\n",
    )
    .unwrap_err();
    assert!(matches!(err, SchemaError::MalformedSchema(_)));
}

#[test]
fn test_instantiable_must_name_a_pointer() {
    let err = SchemaRegistry::load(
        "engineTypes:\n  - typename: A\n    properties:\n      speed: float\n    instantiable: [speed]\n",
    )
    .unwrap_err();
    assert!(matches!(err, SchemaError::MalformedSchema(_)));
}

#[test]
fn test_missing_engine_types_is_malformed() {
    let err = SchemaRegistry::load("enums: []\n").unwrap_err();
    assert!(matches!(err, SchemaError::MalformedSchema(_)));
}

#[test]
fn test_file_provider_reads_standalone_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let schema_path = temp_dir.path().join("schema.yaml");
    let defaults_path = temp_dir.path().join("defaults.yaml");
    std::fs::write(&schema_path, common::SCHEMA).unwrap();
    std::fs::write(
        &defaults_path,
        "defaults:\n  - typename: Light\n    defaultValues:\n      intensity: 4.0\n",
    )
    .unwrap();

    let provider = FileSchemaProvider::new(&schema_path).with_defaults(&defaults_path);
    let registry = SchemaRegistry::from_provider(&provider).unwrap();
    let light = registry.lookup_component("Light").unwrap();
    assert_eq!(light.property("intensity"), Some(&PropertyKind::Float { default: 4.0 }));
}

#[test]
fn test_file_provider_reports_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let provider = FileSchemaProvider::new(temp_dir.path().join("absent.yaml"));
    assert!(matches!(
        SchemaRegistry::from_provider(&provider),
        Err(SchemaError::IoError(_))
    ));
}

#[test]
fn test_registry_is_readable_from_many_threads() {
    let registry = Arc::new(
        SchemaRegistry::from_provider(&StaticSchemaProvider::new(common::SCHEMA)).unwrap(),
    );

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || registry.lookup_component("Spawner").map(|s| s.len()))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), Ok(4));
    }
}
