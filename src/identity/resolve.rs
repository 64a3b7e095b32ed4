//! Deciding what an object pointer refers to

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{FileId, InstanceId, ObjectPointer};

/// What an object pointer slot currently refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceKind {
    Asset,
    Instance,
}

/// Resolve a pointer into asset-or-instance.
///
/// A non-empty file id always wins. Otherwise a non-empty instance id, or a
/// slot the schema marks instantiable, makes it an instance reference.
pub fn resolve_reference_kind(pointer: &ObjectPointer, instantiable: bool) -> ReferenceKind {
    if !pointer.file_id.is_empty() {
        ReferenceKind::Asset
    } else if !pointer.instance_id.is_empty() || instantiable {
        ReferenceKind::Instance
    } else {
        ReferenceKind::Asset
    }
}

/// A resolved asset entry as known to the editor's asset database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetHandle {
    pub file_id: FileId,
    pub path: PathBuf,
    pub type_name: String,
}

impl AssetHandle {
    pub fn display_name(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file_id.to_string())
    }
}

/// Lookup of assets by file id.
pub trait AssetStore: Send + Sync {
    fn resolve(&self, file_id: &FileId) -> Option<AssetHandle>;
}

/// In-memory asset store, used by tools and tests.
#[derive(Debug, Default)]
pub struct MemoryAssetStore {
    assets: HashMap<FileId, AssetHandle>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, handle: AssetHandle) {
        self.assets.insert(handle.file_id.clone(), handle);
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl AssetStore for MemoryAssetStore {
    fn resolve(&self, file_id: &FileId) -> Option<AssetHandle> {
        self.assets.get(file_id).cloned()
    }
}

/// A pointer slot described for presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceTarget {
    /// `handle` is `None` when the id is empty or unknown to the store.
    Asset {
        file_id: FileId,
        handle: Option<AssetHandle>,
    },
    Instance {
        instance_id: InstanceId,
    },
}

impl ReferenceTarget {
    pub fn kind(&self) -> ReferenceKind {
        match self {
            ReferenceTarget::Asset { .. } => ReferenceKind::Asset,
            ReferenceTarget::Instance { .. } => ReferenceKind::Instance,
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            ReferenceTarget::Asset {
                handle: Some(handle),
                ..
            } => handle.display_name(),
            ReferenceTarget::Asset { file_id, .. } if file_id.is_empty() => "None".to_string(),
            ReferenceTarget::Asset { file_id, .. } => format!("Missing ({})", file_id),
            ReferenceTarget::Instance { instance_id } if instance_id.is_empty() => {
                "None".to_string()
            }
            ReferenceTarget::Instance { instance_id } => instance_id.to_string(),
        }
    }
}

/// Resolve a pointer and look its asset up in `store` when it is an asset reference.
pub fn describe_reference(
    pointer: &ObjectPointer,
    instantiable: bool,
    store: &dyn AssetStore,
) -> ReferenceTarget {
    match resolve_reference_kind(pointer, instantiable) {
        ReferenceKind::Asset => {
            let handle = if pointer.file_id.is_empty() {
                None
            } else {
                store.resolve(&pointer.file_id)
            };
            if handle.is_none() && !pointer.file_id.is_empty() {
                log::debug!("Asset {} not found in asset store", pointer.file_id);
            }
            ReferenceTarget::Asset {
                file_id: pointer.file_id.clone(),
                handle,
            }
        }
        ReferenceKind::Instance => ReferenceTarget::Instance {
            instance_id: pointer.instance_id.clone(),
        },
    }
}
