//! Identity values for stored assets and live instances
//!
//! `FileId` names an asset on disk, `InstanceId` names an object living in a
//! running world. Both are plain strings compared ordinally, and each has a
//! single reserved sentinel literal meaning "no reference".

mod pointer;
mod resolve;

pub use pointer::ObjectPointer;
pub use resolve::{
    describe_reference, resolve_reference_kind, AssetHandle, AssetStore, MemoryAssetStore,
    ReferenceKind, ReferenceTarget,
};

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Defines a sentinel-bearing string identity (FileId, InstanceId).
macro_rules! define_string_id {
    ($type_name:ident, $sentinel:literal, $doc:literal) => {
        #[doc = $doc]
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $type_name(String);

        impl $type_name {
            /// Reserved literal meaning "no reference".
            pub const SENTINEL: &'static str = $sentinel;

            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// The sentinel identity.
            pub fn null() -> Self {
                Self(Self::SENTINEL.to_string())
            }

            /// A fresh identity: 32 upper-case hex digits.
            pub fn generate() -> Self {
                Self(Uuid::new_v4().simple().to_string().to_uppercase())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// True for the sentinel and for the empty string.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty() || self.0 == Self::SENTINEL
            }
        }

        impl Default for $type_name {
            fn default() -> Self {
                Self::null()
            }
        }

        impl fmt::Display for $type_name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl fmt::Debug for $type_name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($type_name), self.0)
            }
        }

        impl From<&str> for $type_name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $type_name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $type_name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(FileId, "NullFileId", "Identity of a stored asset file.");
define_string_id!(
    InstanceId,
    "NullInstanceId",
    "Identity of a live object instance inside a world."
);
