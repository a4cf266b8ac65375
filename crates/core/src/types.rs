//! Fixed enums and small identifier aliases that appear on the wire
//! (manifest records, statistics records) and must therefore keep stable
//! integer representations across versions.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Rank of a process within the job communicator.
pub type Rank = u32;

/// Dense, 1-based index of a range server among the servers of one index.
pub type RangeSrvNum = u32;

/// Slice number: `floor(key / slice_size)` on the key's raw (unbiased)
/// numeric value. Signed so that keys below the slicing origin land in
/// slices below `0`, matching the wire format's `int32 slice` field (§6).
pub type SliceNum = i64;

/// The set of key types an index can be created over.
///
/// Key-type identity is fixed at index creation and is an invariant checked
/// on reopen (see [`crate::error::Error::ManifestMismatch`]). The discriminants
/// are part of the on-disk manifest format and must not be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum KeyType {
    /// Signed 32-bit integer keys.
    SignedInt32 = 0,
    /// Signed 64-bit integer keys.
    SignedInt64 = 1,
    /// 32-bit floating point keys.
    Float32 = 2,
    /// 64-bit floating point keys.
    Float64 = 3,
    /// Opaque byte string keys, compared lexicographically.
    ByteString = 4,
    /// Unicode string keys, compared by raw UTF-8 byte order.
    UnicodeString = 5,
}

impl KeyType {
    /// Decode a manifest `key_type` field.
    pub fn from_i32(v: i32) -> Result<Self> {
        Ok(match v {
            0 => KeyType::SignedInt32,
            1 => KeyType::SignedInt64,
            2 => KeyType::Float32,
            3 => KeyType::Float64,
            4 => KeyType::ByteString,
            5 => KeyType::UnicodeString,
            other => {
                return Err(Error::InvalidArgument(format!(
                    "unrecognized key type discriminant: {other}"
                )))
            }
        })
    }

    /// Encode for the manifest `key_type` field.
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

/// The pluggable back-end ordered KV engines rangekv can open an index on.
///
/// Like [`KeyType`], this discriminant is persisted in the manifest and
/// compared bitwise on reopen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum EngineType {
    /// In-process ordered B-tree engine (the only engine this crate ships;
    /// see `rangekv-backend` for the adapter contract that lets additional
    /// engines be plugged in without touching this subsystem).
    Memory = 0,
}

impl EngineType {
    /// Decode a manifest `engine_type` field.
    pub fn from_i32(v: i32) -> Result<Self> {
        match v {
            0 => Ok(EngineType::Memory),
            other => Err(Error::InvalidArgument(format!(
                "unrecognized engine type discriminant: {other}"
            ))),
        }
    }

    /// Encode for the manifest `engine_type` field.
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_type_roundtrip() {
        for kt in [
            KeyType::SignedInt32,
            KeyType::SignedInt64,
            KeyType::Float32,
            KeyType::Float64,
            KeyType::ByteString,
            KeyType::UnicodeString,
        ] {
            assert_eq!(KeyType::from_i32(kt.as_i32()).unwrap(), kt);
        }
    }

    #[test]
    fn key_type_rejects_unknown() {
        assert!(KeyType::from_i32(99).is_err());
    }

    #[test]
    fn engine_type_roundtrip() {
        assert_eq!(
            EngineType::from_i32(EngineType::Memory.as_i32()).unwrap(),
            EngineType::Memory
        );
        assert!(EngineType::from_i32(7).is_err());
    }
}
