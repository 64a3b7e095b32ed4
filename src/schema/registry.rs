use std::sync::Arc;

use indexmap::IndexMap;

use super::classify::{classify, Classification};
use super::document::{DefaultValues, DefaultsDocument, EngineType, SchemaDocument};
use super::{SchemaError, SchemaProvider};
use crate::property::{decode_value, EnumTable, PropertyKind};

/// Key of the implicit file identity every component carries.
pub const FILE_ID_KEY: &str = "fileId";
/// Key of the implicit instance identity every component carries.
pub const INSTANCE_ID_KEY: &str = "instanceId";

/// The classified shape of one component type.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSchema {
    name: String,
    properties: IndexMap<String, PropertyKind>,
    /// Member lists of the enums this component's properties reference.
    enums: EnumTable,
}

impl ComponentSchema {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Properties in declaration order, the two implicit identities last.
    pub fn properties(&self) -> &IndexMap<String, PropertyKind> {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&PropertyKind> {
        self.properties.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    pub fn is_instantiable(&self, key: &str) -> bool {
        self.property(key)
            .map(PropertyKind::is_instantiable)
            .unwrap_or(false)
    }

    /// Members of an enum referenced by one of this component's properties.
    pub fn enum_members(&self, enum_name: &str) -> Option<&[String]> {
        self.enums.get(enum_name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// Immutable catalogue of component schemas and enums.
///
/// Built once at startup and shared behind an `Arc`; safe to read from any
/// thread.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    components: IndexMap<String, Arc<ComponentSchema>>,
    enums: EnumTable,
}

impl SchemaRegistry {
    pub fn load(schema_text: &str) -> Result<Self, SchemaError> {
        Self::load_with_defaults(schema_text, None)
    }

    /// Load a schema document plus an optional standalone defaults document.
    pub fn load_with_defaults(
        schema_text: &str,
        defaults_text: Option<&str>,
    ) -> Result<Self, SchemaError> {
        let document = SchemaDocument::parse(schema_text)?;
        let extra_defaults = match defaults_text {
            Some(text) => DefaultsDocument::parse(text)?.defaults,
            None => Vec::new(),
        };
        Self::from_document(document, extra_defaults)
    }

    pub fn from_provider(provider: &dyn SchemaProvider) -> Result<Self, SchemaError> {
        let source = provider.load_schema_document()?;
        Self::load_with_defaults(&source.schema, source.defaults.as_deref())
    }

    pub fn from_document(
        document: SchemaDocument,
        extra_defaults: Vec<DefaultValues>,
    ) -> Result<Self, SchemaError> {
        let enums = collect_enums(&document.enums)?;

        let mut components: IndexMap<String, ComponentSchema> = IndexMap::new();
        for engine_type in &document.engine_types {
            if components.contains_key(&engine_type.typename) {
                return Err(SchemaError::MalformedSchema(format!(
                    "component {} is declared twice",
                    engine_type.typename
                )));
            }
            let schema = build_component(engine_type, &enums)?;
            components.insert(engine_type.typename.clone(), schema);
        }

        for entry in document.defaults.iter().chain(extra_defaults.iter()) {
            let schema = components.get_mut(&entry.typename).ok_or_else(|| {
                SchemaError::MalformedSchema(format!(
                    "defaults given for undeclared component {}",
                    entry.typename
                ))
            })?;
            apply_defaults(schema, entry, &enums)?;
        }

        log::info!(
            "Loaded schema registry: {} components, {} enums",
            components.len(),
            enums.len()
        );

        Ok(Self {
            components: components
                .into_iter()
                .map(|(name, schema)| (name, Arc::new(schema)))
                .collect(),
            enums,
        })
    }

    pub fn lookup_component(&self, name: &str) -> Result<&Arc<ComponentSchema>, SchemaError> {
        self.components
            .get(name)
            .ok_or_else(|| SchemaError::UnknownComponent(name.to_string()))
    }

    pub fn lookup_enum(&self, name: &str) -> Result<&[String], SchemaError> {
        self.enums
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| SchemaError::UnknownEnum(name.to_string()))
    }

    pub fn components(&self) -> impl Iterator<Item = &Arc<ComponentSchema>> {
        self.components.values()
    }

    pub fn enums(&self) -> &EnumTable {
        &self.enums
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

fn collect_enums(declarations: &[IndexMap<String, Vec<String>>]) -> Result<EnumTable, SchemaError> {
    let mut enums = EnumTable::new();
    for (name, members) in declarations.iter().flatten() {
        if members.is_empty() {
            return Err(SchemaError::MalformedSchema(format!(
                "enum {} has no members",
                name
            )));
        }
        if enums.insert(name.clone(), members.clone()).is_some() {
            return Err(SchemaError::MalformedSchema(format!(
                "enum {} is declared twice",
                name
            )));
        }
    }
    Ok(enums)
}

fn build_component(
    engine_type: &EngineType,
    enums: &EnumTable,
) -> Result<ComponentSchema, SchemaError> {
    let mut properties = IndexMap::new();
    let mut referenced = EnumTable::new();
    for (key, signature) in &engine_type.properties {
        let kind = match classify(signature) {
            Classification::Float => PropertyKind::float(),
            Classification::Vec2 => PropertyKind::vec2(),
            Classification::Vec3 => PropertyKind::vec3(),
            Classification::Vec4 => PropertyKind::vec4(),
            Classification::Rotation => PropertyKind::rotation(),
            Classification::FileReference => PropertyKind::file_reference(),
            Classification::InstanceReference => PropertyKind::instance_reference(),
            Classification::ObjectPointer { target } => PropertyKind::object_pointer(target),
            Classification::Enum { name } => {
                let members = enums
                    .get(&name)
                    .ok_or_else(|| SchemaError::UnknownEnum(name.clone()))?;
                let first = members
                    .first()
                    .ok_or_else(|| SchemaError::UnknownEnum(name.clone()))?;
                let kind = PropertyKind::enum_reference(name.clone(), first.clone());
                referenced.insert(name, members.clone());
                kind
            }
            Classification::Unrecognized => {
                return Err(SchemaError::UnclassifiableFieldType {
                    component: engine_type.typename.clone(),
                    property: key.clone(),
                    signature: signature.clone(),
                })
            }
        };
        properties.insert(key.clone(), kind);
    }

    for key in &engine_type.instantiable {
        match properties.get_mut(key) {
            Some(PropertyKind::ObjectPointer { instantiable, .. }) => *instantiable = true,
            _ => {
                return Err(SchemaError::MalformedSchema(format!(
                    "{}.{} is marked instantiable but is not an object pointer",
                    engine_type.typename, key
                )))
            }
        }
    }

    // Implicit identities always sit last, replacing any engine declaration
    properties.shift_remove(FILE_ID_KEY);
    properties.shift_remove(INSTANCE_ID_KEY);
    properties.insert(FILE_ID_KEY.to_string(), PropertyKind::file_reference());
    properties.insert(INSTANCE_ID_KEY.to_string(), PropertyKind::instance_reference());

    Ok(ComponentSchema {
        name: engine_type.typename.clone(),
        properties,
        enums: referenced,
    })
}

fn apply_defaults(
    schema: &mut ComponentSchema,
    entry: &DefaultValues,
    enums: &EnumTable,
) -> Result<(), SchemaError> {
    for (key, node) in &entry.default_values {
        let kind = schema.properties.get_mut(key).ok_or_else(|| {
            SchemaError::MalformedSchema(format!(
                "default given for undeclared property {}.{}",
                schema.name, key
            ))
        })?;
        if matches!(kind, PropertyKind::ObjectPointer { .. }) {
            log::debug!("Ignoring default for object pointer {}.{}", schema.name, key);
            continue;
        }
        let value = decode_value(kind, node, enums).map_err(|err| {
            SchemaError::MalformedSchema(format!(
                "default for {}.{}: {}",
                schema.name, key, err
            ))
        })?;
        if let Some(updated) = kind.with_default(&value) {
            *kind = updated;
        }
    }
    Ok(())
}
