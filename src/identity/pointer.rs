use std::fmt;

use serde::{Deserialize, Serialize};

use super::{FileId, InstanceId};

/// A reference slot that may point at a stored asset or a live instance.
///
/// Ordering compares `file_id` first, then `instance_id`.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectPointer {
    pub file_id: FileId,
    pub instance_id: InstanceId,
}

impl ObjectPointer {
    pub fn new(file_id: FileId, instance_id: InstanceId) -> Self {
        Self {
            file_id,
            instance_id,
        }
    }

    /// Both halves set to their sentinels.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn to_asset(file_id: FileId) -> Self {
        Self::new(file_id, InstanceId::null())
    }

    pub fn to_instance(instance_id: InstanceId) -> Self {
        Self::new(FileId::null(), instance_id)
    }

    pub fn is_empty(&self) -> bool {
        self.file_id.is_empty() && self.instance_id.is_empty()
    }
}

impl fmt::Debug for ObjectPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectPointer({}, {})", self.file_id, self.instance_id)
    }
}
