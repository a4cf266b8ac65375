//! In-process, ordered, B-tree-backed engine: the only engine this crate
//! ships (`EngineType::Memory`). Useful as the reference implementation of
//! the [`crate::Backend`] contract and as the engine used by tests.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use rangekv_core::{encode_sort_key, Error, KeyType, Result};

use crate::{Backend, OpenFlags, OpenOptions};

/// An in-memory ordered key-value database.
///
/// Entries are indexed by the sign-biased comparator encoding
/// (`rangekv_core::encode_sort_key`) so that `BTreeMap` iteration order
/// matches the configured key type's numeric or lexicographic order; the
/// original raw key is kept alongside the value so lookups and cursors can
/// hand it back unchanged.
pub struct MemoryBackend {
    key_type: KeyType,
    entries: RwLock<BTreeMap<Vec<u8>, (Vec<u8>, Vec<u8>)>>,
}

impl MemoryBackend {
    /// Open (in this engine, simply construct) a database for the given
    /// key type. `flags` only affects whether a prior instance's data is
    /// expected; since this engine is purely in-memory, `Create` and
    /// `ReadWrite` behave identically and `ReadOnly` is enforced by
    /// rejecting mutating calls.
    pub fn open(flags: OpenFlags, opts: &OpenOptions) -> Result<Self> {
        let _ = flags;
        Ok(MemoryBackend {
            key_type: opts.key_type,
            entries: RwLock::new(BTreeMap::new()),
        })
    }

    fn sort_key(&self, key: &[u8]) -> Result<Vec<u8>> {
        encode_sort_key(key, self.key_type)
    }
}

impl Backend for MemoryBackend {
    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let sk = self.sort_key(key)?;
        self.entries
            .write()
            .insert(sk, (key.to_vec(), value.to_vec()));
        Ok(())
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let sk = self.sort_key(key)?;
        Ok(self.entries.read().get(&sk).map(|(_, v)| v.clone()))
    }

    fn get_next(&self, key: Option<&[u8]>) -> Result<(Vec<u8>, Vec<u8>)> {
        let guard = self.entries.read();
        let found = match key {
            None => guard.iter().next(),
            Some(k) => {
                let sk = self.sort_key(k)?;
                guard.range((std::ops::Bound::Excluded(sk), std::ops::Bound::Unbounded))
                    .next()
            }
        };
        found
            .map(|(_, (k, v))| (k.clone(), v.clone()))
            .ok_or_else(|| Error::NotFound("get_next: no further entries".into()))
    }

    fn get_prev(&self, key: Option<&[u8]>) -> Result<(Vec<u8>, Vec<u8>)> {
        let guard = self.entries.read();
        let found = match key {
            None => guard.iter().next_back(),
            Some(k) => {
                let sk = self.sort_key(k)?;
                guard
                    .range((std::ops::Bound::Unbounded, std::ops::Bound::Excluded(sk)))
                    .next_back()
            }
        };
        found
            .map(|(_, (k, v))| (k.clone(), v.clone()))
            .ok_or_else(|| Error::NotFound("get_prev: no earlier entries".into()))
    }

    fn del(&self, key: &[u8]) -> Result<()> {
        let sk = self.sort_key(key)?;
        self.entries.write().remove(&sk);
        Ok(())
    }

    fn commit(&self) -> Result<()> {
        Ok(())
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(key_type: KeyType) -> MemoryBackend {
        MemoryBackend::open(OpenFlags::Create, &OpenOptions { key_type }).unwrap()
    }

    #[test]
    fn put_get_roundtrip() {
        let db = open(KeyType::SignedInt32);
        db.put(&10i32.to_be_bytes(), b"ten").unwrap();
        assert_eq!(db.get(&10i32.to_be_bytes()).unwrap(), Some(b"ten".to_vec()));
        assert_eq!(db.get(&11i32.to_be_bytes()).unwrap(), None);
    }

    #[test]
    fn get_next_walks_numeric_order() {
        let db = open(KeyType::SignedInt32);
        for k in [5i32, -3, 100, 0] {
            db.put(&k.to_be_bytes(), &k.to_be_bytes()).unwrap();
        }
        let mut seen = Vec::new();
        let mut cursor: Option<Vec<u8>> = None;
        loop {
            match db.get_next(cursor.as_deref()) {
                Ok((k, _)) => {
                    seen.push(i32::from_be_bytes(k.clone().try_into().unwrap()));
                    cursor = Some(k);
                }
                Err(e) if e.is_not_found() => break,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(seen, vec![-3, 0, 5, 100]);
    }

    #[test]
    fn get_prev_from_none_is_last_entry() {
        let db = open(KeyType::SignedInt32);
        for k in [1i32, 2, 3] {
            db.put(&k.to_be_bytes(), &k.to_be_bytes()).unwrap();
        }
        let (k, _) = db.get_prev(None).unwrap();
        assert_eq!(i32::from_be_bytes(k.try_into().unwrap()), 3);
    }

    #[test]
    fn del_then_get_returns_none_without_error() {
        let db = open(KeyType::SignedInt32);
        db.put(&20i32.to_be_bytes(), b"v").unwrap();
        db.del(&20i32.to_be_bytes()).unwrap();
        assert_eq!(db.get(&20i32.to_be_bytes()).unwrap(), None);
    }

    #[test]
    fn byte_string_keys_sort_lexicographically() {
        let db = open(KeyType::ByteString);
        for k in [b"banana".as_slice(), b"apple", b"cherry"] {
            db.put(k, k).unwrap();
        }
        let (first, _) = db.get_next(None).unwrap();
        assert_eq!(first, b"apple");
    }
}
