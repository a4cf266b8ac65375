//! The manifest record itself, its wire encoding, and an atomic-write
//! persistence manager.
//!
//! # Format
//!
//! ```text
//! +--------------------+
//! | Magic: "RKVM"       | 4 bytes
//! | Format version      | 4 bytes (u32 LE)
//! | num_rangesrvs        | 4 bytes (i32 LE)
//! | key_type             | 4 bytes (i32 LE)
//! | engine_type          | 4 bytes (i32 LE)
//! | server_factor        | 4 bytes (u32 LE)
//! | slice_size           | 8 bytes (u64 LE)
//! | num_ranks            | 4 bytes (i32 LE)
//! | CRC32 of the above   | 4 bytes (u32 LE)
//! +--------------------+
//! ```
//!
//! The five fields after `num_rangesrvs` are exactly the ones compared on
//! reopen (invariant 4); `num_rangesrvs` itself is derived from
//! `server_factor`/`num_ranks` and is not independently compared.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use byteorder::{ByteOrder, LittleEndian};

use rangekv_core::{EngineType, Error, KeyType, Result};

/// Magic bytes identifying a rangekv manifest file.
pub const MANIFEST_MAGIC: [u8; 4] = *b"RKVM";

/// Current manifest format version.
pub const MANIFEST_FORMAT_VERSION: u32 = 1;

const PAYLOAD_LEN: usize = 4 + 4 + 4 + 4 + 8 + 4; // num_rangesrvs..num_ranks
const RECORD_LEN: usize = 4 + 4 + PAYLOAD_LEN + 4; // magic + version + payload + crc

/// `{num_rangesrvs, key_type, engine_type, server_factor, slice_size,
/// num_ranks}` (§3, §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Manifest {
    /// Number of range servers for this index.
    pub num_rangesrvs: i32,
    /// The index's key type.
    pub key_type: KeyType,
    /// The index's back-end engine type.
    pub engine_type: EngineType,
    /// Range-server membership stride.
    pub server_factor: u32,
    /// Records per slice.
    pub slice_size: u64,
    /// Size of the job communicator at index creation.
    pub num_ranks: i32,
}

impl Manifest {
    /// A local index manifest: `{0, key_type, engine_type, 0, 0, 1}` (§4.5).
    pub fn local(key_type: KeyType, engine_type: EngineType) -> Self {
        Manifest {
            num_rangesrvs: 0,
            key_type,
            engine_type,
            server_factor: 0,
            slice_size: 0,
            num_ranks: 1,
        }
    }

    /// Serialize to the on-disk record.
    pub fn to_bytes(self) -> Vec<u8> {
        let mut payload = [0u8; PAYLOAD_LEN];
        LittleEndian::write_i32(&mut payload[0..4], self.num_rangesrvs);
        LittleEndian::write_i32(&mut payload[4..8], self.key_type.as_i32());
        LittleEndian::write_i32(&mut payload[8..12], self.engine_type.as_i32());
        LittleEndian::write_u32(&mut payload[12..16], self.server_factor);
        LittleEndian::write_u64(&mut payload[16..24], self.slice_size);
        LittleEndian::write_i32(&mut payload[24..28], self.num_ranks);

        let mut bytes = Vec::with_capacity(RECORD_LEN);
        bytes.extend_from_slice(&MANIFEST_MAGIC);
        bytes.extend_from_slice(&MANIFEST_FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&payload);
        let crc = crc32fast::hash(&bytes);
        bytes.extend_from_slice(&crc.to_le_bytes());
        bytes
    }

    /// Parse the on-disk record, verifying magic, version, and checksum.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != RECORD_LEN {
            return Err(Error::Backend(format!(
                "manifest must be {RECORD_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        if bytes[0..4] != MANIFEST_MAGIC {
            return Err(Error::Backend("manifest: bad magic bytes".into()));
        }
        let version = LittleEndian::read_u32(&bytes[4..8]);
        if version != MANIFEST_FORMAT_VERSION {
            return Err(Error::Backend(format!(
                "manifest: unsupported format version {version}"
            )));
        }

        let data = &bytes[..bytes.len() - 4];
        let stored_crc = LittleEndian::read_u32(&bytes[bytes.len() - 4..]);
        let computed_crc = crc32fast::hash(data);
        if stored_crc != computed_crc {
            return Err(Error::Backend(format!(
                "manifest: checksum mismatch (stored {stored_crc:08x}, computed {computed_crc:08x})"
            )));
        }

        let payload = &bytes[8..8 + PAYLOAD_LEN];
        let num_rangesrvs = LittleEndian::read_i32(&payload[0..4]);
        let key_type = KeyType::from_i32(LittleEndian::read_i32(&payload[4..8]))?;
        let engine_type = EngineType::from_i32(LittleEndian::read_i32(&payload[8..12]))?;
        let server_factor = LittleEndian::read_u32(&payload[12..16]);
        let slice_size = LittleEndian::read_u64(&payload[16..24]);
        let num_ranks = LittleEndian::read_i32(&payload[24..28]);

        Ok(Manifest {
            num_rangesrvs,
            key_type,
            engine_type,
            server_factor,
            slice_size,
            num_ranks,
        })
    }

    /// Compare the five reopen-sensitive fields (invariant 4) against a
    /// freshly requested configuration, returning the first mismatch found
    /// as [`Error::ManifestMismatch`].
    pub fn validate_against(&self, requested: &Manifest) -> Result<()> {
        macro_rules! check {
            ($field:ident, $fmt:expr) => {
                if self.$field != requested.$field {
                    return Err(Error::ManifestMismatch {
                        field: stringify!($field),
                        on_disk: $fmt(self.$field),
                        requested: $fmt(requested.$field),
                    });
                }
            };
        }
        check!(key_type, |v: KeyType| format!("{v:?}"));
        check!(engine_type, |v: EngineType| format!("{v:?}"));
        check!(server_factor, |v: u32| v.to_string());
        check!(slice_size, |v: u64| v.to_string());
        check!(num_ranks, |v: i32| v.to_string());
        Ok(())
    }
}

/// Atomic-write persistence for one manifest file: write-to-temp, fsync,
/// rename, fsync parent directory.
pub struct ManifestManager {
    path: PathBuf,
    manifest: Manifest,
}

impl ManifestManager {
    /// Create a manifest manager for a brand new index and persist it
    /// immediately. A missing manifest on first creation is not an error
    /// (§4.5); this is the call that establishes it.
    pub fn create(path: PathBuf, manifest: Manifest) -> Result<Self> {
        let mgr = ManifestManager { path, manifest };
        mgr.persist()?;
        Ok(mgr)
    }

    /// Load an existing manifest file.
    pub fn load(path: PathBuf) -> Result<Self> {
        let bytes =
            std::fs::read(&path).map_err(|e| Error::Backend(format!("reading manifest: {e}")))?;
        let manifest = Manifest::from_bytes(&bytes)?;
        Ok(ManifestManager { path, manifest })
    }

    /// `true` if a manifest file exists at `path`.
    pub fn exists(path: &Path) -> bool {
        path.exists()
    }

    /// Write-to-temp, fsync, atomic rename, fsync parent directory.
    pub fn persist(&self) -> Result<()> {
        let temp_path = self.path.with_extension("tmp");

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| Error::Backend(format!("opening manifest temp file: {e}")))?;
        file.write_all(&self.manifest.to_bytes())
            .map_err(|e| Error::Backend(format!("writing manifest: {e}")))?;
        file.sync_all()
            .map_err(|e| Error::Backend(format!("fsyncing manifest: {e}")))?;
        drop(file);

        std::fs::rename(&temp_path, &self.path)
            .map_err(|e| Error::Backend(format!("renaming manifest into place: {e}")))?;

        if let Some(parent) = self.path.parent() {
            if parent.exists() {
                let dir = File::open(parent)
                    .map_err(|e| Error::Backend(format!("opening manifest directory: {e}")))?;
                dir.sync_all()
                    .map_err(|e| Error::Backend(format!("fsyncing manifest directory: {e}")))?;
            }
        }

        Ok(())
    }

    /// Path of the manifest file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The manifest currently held in memory.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Manifest {
        Manifest {
            num_rangesrvs: 2,
            key_type: KeyType::SignedInt32,
            engine_type: EngineType::Memory,
            server_factor: 2,
            slice_size: 1_000_000,
            num_ranks: 4,
        }
    }

    #[test]
    fn round_trip_identity_on_all_fields() {
        // P6
        let m = sample();
        let bytes = m.to_bytes();
        assert_eq!(Manifest::from_bytes(&bytes).unwrap(), m);
    }

    #[test]
    fn local_index_manifest_matches_spec_shape() {
        let m = Manifest::local(KeyType::ByteString, EngineType::Memory);
        assert_eq!(m.num_rangesrvs, 0);
        assert_eq!(m.server_factor, 0);
        assert_eq!(m.slice_size, 0);
        assert_eq!(m.num_ranks, 1);
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut bytes = sample().to_bytes();
        bytes[0..4].copy_from_slice(b"XXXX");
        assert!(Manifest::from_bytes(&bytes).is_err());
    }

    #[test]
    fn corrupted_payload_fails_checksum() {
        let mut bytes = sample().to_bytes();
        let mid = bytes.len() / 2;
        bytes[mid] ^= 0xFF;
        assert!(Manifest::from_bytes(&bytes).is_err());
    }

    #[test]
    fn validate_against_accepts_identical_config() {
        let m = sample();
        assert!(m.validate_against(&sample()).is_ok());
    }

    #[test]
    fn validate_against_reports_slice_size_mismatch() {
        // S5
        let on_disk = sample();
        let mut requested = sample();
        requested.slice_size = 500_000;
        let err = on_disk.validate_against(&requested).unwrap_err();
        match err {
            Error::ManifestMismatch { field, .. } => assert_eq!(field, "slice_size"),
            other => panic!("expected ManifestMismatch, got {other:?}"),
        }
    }

    #[test]
    fn validate_against_reports_first_of_five_mismatched_fields() {
        // P5: any of key_type/engine_type/server_factor/slice_size/num_ranks
        let on_disk = sample();
        let mut requested = sample();
        requested.key_type = KeyType::Float64;
        requested.num_ranks = 8;
        let err = on_disk.validate_against(&requested).unwrap_err();
        match err {
            Error::ManifestMismatch { field, .. } => assert_eq!(field, "key_type"),
            other => panic!("expected ManifestMismatch, got {other:?}"),
        }
    }

    #[test]
    fn manifest_manager_create_load_persist_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("r0_0");

        assert!(!ManifestManager::exists(&path));
        let created = ManifestManager::create(path.clone(), sample()).unwrap();
        assert!(ManifestManager::exists(&path));

        let loaded = ManifestManager::load(path).unwrap();
        assert_eq!(loaded.manifest(), created.manifest());
    }

    #[test]
    fn persist_leaves_no_temp_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("r0_0");
        ManifestManager::create(path.clone(), sample()).unwrap();
        assert!(!path.with_extension("tmp").exists());
    }
}
