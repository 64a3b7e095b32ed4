use std::path::{Path, PathBuf};

use super::SchemaError;

/// Raw schema text plus the optional standalone defaults text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaSource {
    pub schema: String,
    pub defaults: Option<String>,
}

/// Where the engine's exported schema comes from.
pub trait SchemaProvider: Send + Sync {
    fn load_schema_document(&self) -> Result<SchemaSource, SchemaError>;
}

/// Reads the schema (and optionally defaults) from files on disk.
#[derive(Debug, Clone)]
pub struct FileSchemaProvider {
    schema_path: PathBuf,
    defaults_path: Option<PathBuf>,
}

impl FileSchemaProvider {
    pub fn new<P: AsRef<Path>>(schema_path: P) -> Self {
        Self {
            schema_path: schema_path.as_ref().to_path_buf(),
            defaults_path: None,
        }
    }

    pub fn with_defaults<P: AsRef<Path>>(mut self, defaults_path: P) -> Self {
        self.defaults_path = Some(defaults_path.as_ref().to_path_buf());
        self
    }
}

impl SchemaProvider for FileSchemaProvider {
    fn load_schema_document(&self) -> Result<SchemaSource, SchemaError> {
        let schema = std::fs::read_to_string(&self.schema_path).map_err(|e| {
            SchemaError::IoError(format!("{}: {}", self.schema_path.display(), e))
        })?;
        let defaults = match &self.defaults_path {
            Some(path) => Some(
                std::fs::read_to_string(path)
                    .map_err(|e| SchemaError::IoError(format!("{}: {}", path.display(), e)))?,
            ),
            None => None,
        };
        log::debug!("Read schema from {}", self.schema_path.display());
        Ok(SchemaSource { schema, defaults })
    }
}

/// Serves schema text held in memory.
#[derive(Debug, Clone)]
pub struct StaticSchemaProvider {
    source: SchemaSource,
}

impl StaticSchemaProvider {
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            source: SchemaSource {
                schema: schema.into(),
                defaults: None,
            },
        }
    }

    pub fn with_defaults(mut self, defaults: impl Into<String>) -> Self {
        self.source.defaults = Some(defaults.into());
        self
    }
}

impl SchemaProvider for StaticSchemaProvider {
    fn load_schema_document(&self) -> Result<SchemaSource, SchemaError> {
        Ok(self.source.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaRegistry;
    use std::fs;
    use tempfile::TempDir;

    const SCHEMA: &str = "engineTypes:\n  - typename: A\n    properties:\n      speed: float\n";
    const DEFAULTS: &str = "defaults:\n  - typename: A\n    defaultValues:\n      speed: 4.5\n";

    #[test]
    fn test_file_provider_reads_schema_and_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let schema_path = temp_dir.path().join("schema.yaml");
        let defaults_path = temp_dir.path().join("defaults.yaml");
        fs::write(&schema_path, SCHEMA).unwrap();
        fs::write(&defaults_path, DEFAULTS).unwrap();

        let provider = FileSchemaProvider::new(&schema_path).with_defaults(&defaults_path);
        let registry = SchemaRegistry::from_provider(&provider).unwrap();
        let schema = registry.lookup_component("A").unwrap();
        assert_eq!(
            schema.property("speed"),
            Some(&crate::property::PropertyKind::Float { default: 4.5 })
        );
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let provider = FileSchemaProvider::new(temp_dir.path().join("absent.yaml"));
        assert!(matches!(
            provider.load_schema_document(),
            Err(SchemaError::IoError(_))
        ));
    }

    #[test]
    fn test_static_provider() {
        let provider = StaticSchemaProvider::new(SCHEMA).with_defaults(DEFAULTS);
        let registry = SchemaRegistry::from_provider(&provider).unwrap();
        assert_eq!(registry.len(), 1);
    }
}
