//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::sync::Arc;

use rigging::SchemaRegistry;

pub const SCHEMA: &str = r#"
engineTypes:
  - typename: Light
    properties:
      intensity: float
      color: struct glm::vec<4,float,0>
      offset: "struct glm::vec< 3, float, 0 >"
      uv: struct glm::vec<2,float,0>
      orientation: struct glm::qua<float,0>
      cookie: class Sailor::FileId
      owner: class Sailor::InstanceId
      mode: enum ELightMode
  - typename: Spawner
    properties:
      prefab: class Sailor::TObjectPtr<class Sailor::Model>
      target: TObjectPtr<GameObject>
    instantiable: [target]
defaults:
  - typename: Light
    defaultValues:
      intensity: 1.0
      color: [1, 1, 1, 1]
enums:
  - ELightMode: [Directional, Point, Spot]
"#;

pub const LIGHT: &str = r#"
typename: Light
overrideProperties:
  intensity: 0.1
  color: [1, 0.5, 0.25, 1]
  orientation: [0, 0, 0, 1]
  mode: Spot
  instanceId: light1
"#;

pub const SCENE: &str = r#"
- typename: Light
  overrideProperties:
    intensity: 2.5
    instanceId: light1
- typename: Spawner
  overrideProperties:
    prefab: {fileId: tex1, instanceId: NullInstanceId}
    target: ~
    instanceId: spawner1
"#;

pub fn registry() -> Arc<SchemaRegistry> {
    Arc::new(SchemaRegistry::load(SCHEMA).unwrap())
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
