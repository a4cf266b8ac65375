//! [`StatsMap`]: the per-index mapping from slice number to [`StatsEntry`],
//! its update contract, and its back-end persistence.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use rangekv_backend::Backend;
use rangekv_core::{is_float_key, normalize, KeyType, Norm, Result, SliceNum};
use rangekv_partitioning::slice_of;

use crate::entry::{Extrema, StatsEntry};
use crate::record;

/// Mapping from `slice_num` to [`StatsEntry`], guarded by its own writers
/// lock so concurrent puts to the same index serialize through it (§5).
///
/// **Deletion policy.** Deletions do not update `count` or extrema: there
/// is no ordered scan cheap enough to recompute tight extrema after a
/// delete, so statistics are kept as routing hints rather than a
/// consistency source. This is a deliberate property, not an oversight —
/// see the end-to-end scenario in this crate's tests that puts then
/// deletes a key and checks the entry is untouched.
#[derive(Default)]
pub struct StatsMap {
    entries: RwLock<FxHashMap<SliceNum, StatsEntry>>,
}

impl StatsMap {
    /// An empty map.
    pub fn new() -> Self {
        StatsMap::default()
    }

    /// Update contract (§4.4): on a local put of `key`, atomically widen or
    /// insert the entry for `slice_of(key)`.
    pub fn update_on_put(&self, key_bytes: &[u8], key_type: KeyType, slice_size: u64) -> Result<()> {
        let slice_num = slice_of(key_bytes, key_type, slice_size)?;
        let norm = normalize(key_bytes, key_type)?;
        let mut guard = self.entries.write();
        match guard.get_mut(&slice_num) {
            Some(entry) => {
                match norm {
                    Norm::Int(v) => entry.extrema.widen_int(v),
                    Norm::Float(v) => entry.extrema.widen_float(v),
                }
                entry.count += 1;
            }
            None => {
                let extrema = match norm {
                    Norm::Int(v) => Extrema::singleton_int(v),
                    Norm::Float(v) => Extrema::singleton_float(v),
                };
                guard.insert(
                    slice_num,
                    StatsEntry {
                        slice_num,
                        extrema,
                        count: 1,
                    },
                );
            }
        }
        Ok(())
    }

    /// Current entry for a slice, if one has been recorded since last load
    /// (invariant 5).
    pub fn get(&self, slice_num: SliceNum) -> Option<StatsEntry> {
        self.entries.read().get(&slice_num).copied()
    }

    /// Insert or replace an entry outright, used when unpacking a flush
    /// reconciliation buffer (§4.7 step 8) or loading from disk.
    pub fn upsert(&self, entry: StatsEntry) {
        self.entries.write().insert(entry.slice_num, entry);
    }

    /// Number of slices with a recorded entry.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// `true` if no slice has a recorded entry.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// A point-in-time copy of all entries, for gather/persist.
    pub fn snapshot(&self) -> Vec<StatsEntry> {
        self.entries.read().values().copied().collect()
    }

    /// Discard all entries, e.g. after reading a fresh `StatsMap` from a
    /// flush broadcast that must fully replace the prior view.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Load entries from the stats subdatabase by iterating it with
    /// `get_next` from `None` until `NotFound` (§4.4 persistence).
    pub fn load(backend: &dyn Backend, key_type: KeyType) -> Result<Self> {
        let map = StatsMap::new();
        let floating = is_float_key(key_type);
        let mut cursor: Option<Vec<u8>> = None;
        loop {
            match backend.get_next(cursor.as_deref()) {
                Ok((key, value)) => {
                    let entry = if floating {
                        record::decode_floating(&value)?
                    } else {
                        record::decode_integer(&value)?
                    };
                    map.upsert(entry);
                    cursor = Some(key);
                }
                Err(e) if e.is_not_found() => break,
                Err(e) => return Err(e),
            }
        }
        Ok(map)
    }

    /// Write every entry to the stats subdatabase (§4.4 persistence).
    pub fn persist(&self, backend: &dyn Backend, key_type: KeyType) -> Result<()> {
        let floating = is_float_key(key_type);
        for entry in self.snapshot() {
            let buf = if floating {
                record::encode_floating(&entry).to_vec()
            } else {
                record::encode_integer(&entry).to_vec()
            };
            backend.put(&record::record_key(entry.slice_num), &buf)?;
        }
        Ok(())
    }
}
