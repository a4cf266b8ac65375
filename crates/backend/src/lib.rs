//! Uniform contract over pluggable ordered KV engines (C1), plus the
//! in-memory engine this crate ships.
//!
//! Engines are dispatched as tagged variants rather than dynamic typing:
//! dispatch is known at index creation time from the index's
//! [`rangekv_core::EngineType`], so callers construct the concrete engine
//! directly and hold it behind a `Box<dyn Backend>`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod memory;
pub mod path;

use rangekv_core::Result;

/// How a back-end handle is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenFlags {
    /// Create the database if it does not exist; error if it does.
    Create,
    /// Open an existing database for reads only.
    ReadOnly,
    /// Open an existing database for reads and writes, creating it if
    /// absent.
    ReadWrite,
}

/// Engine-agnostic options supplied at open time.
#[derive(Debug, Clone, Copy)]
pub struct OpenOptions {
    /// Selects the comparator: numeric key types sort on the sign-biased
    /// fixed-width encoding, `ByteString`/`UnicodeString` sort on raw bytes.
    pub key_type: rangekv_core::KeyType,
}

/// One open back-end database, addressed by opaque byte keys in the order
/// its comparator defines.
///
/// All operations surface errors as [`rangekv_core::Error::Backend`] except
/// where the contract calls out a distinct kind (e.g. `get` absence is a
/// plain `Ok(None)`, not a [`rangekv_core::Error::NotFound`] — iteration via
/// `get_next`/`get_prev` running off the end is what signals `NotFound`).
pub trait Backend: Send + Sync {
    /// Insert or overwrite `key` with `value`. Total order on iteration
    /// follows the comparator chosen at open time.
    fn put(&self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Point lookup. `Ok(None)` if the key is absent.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Cursor step forward. `key = None` yields the first entry; otherwise
    /// the strictly-greater entry under the configured comparator.
    /// Returns [`rangekv_core::Error::NotFound`] when no such entry exists.
    fn get_next(&self, key: Option<&[u8]>) -> Result<(Vec<u8>, Vec<u8>)>;

    /// Cursor step backward. `key = None` yields the last entry; otherwise
    /// the strictly-lesser entry under the configured comparator.
    /// Returns [`rangekv_core::Error::NotFound`] when no such entry exists.
    fn get_prev(&self, key: Option<&[u8]>) -> Result<(Vec<u8>, Vec<u8>)>;

    /// Remove `key`, if present. Removing an absent key is not an error.
    fn del(&self, key: &[u8]) -> Result<()>;

    /// Durability barrier: everything put before this call is durable
    /// after it returns, to the extent the engine provides durability at
    /// all (the in-memory engine treats this as a no-op).
    fn commit(&self) -> Result<()>;

    /// Release resources held by this handle. Idempotent.
    fn close(&self) -> Result<()>;
}
