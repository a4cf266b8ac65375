//! [`IndexRegistry`]: per-process state holding the `local_indices` and
//! `remote_indices` collections (§4.6).

use std::sync::Arc;

use parking_lot::RwLock;

use rangekv_core::{Error, Result};

use crate::index::{Index, IndexKind};

/// Per-process registry of local and remote indices, keyed by dense `id`.
///
/// `id` assignment is dense: the next `id` for a variant equals the
/// current length of that variant's collection. The remote registry is
/// guarded by a writers lock for create/destroy; lookups take a reader
/// lock (§5).
#[derive(Default)]
pub struct IndexRegistry {
    local_indices: RwLock<Vec<Arc<Index>>>,
    remote_indices: RwLock<Vec<Arc<Index>>>,
}

impl IndexRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        IndexRegistry::default()
    }

    /// Register a newly created local index, returning its assigned `id`.
    ///
    /// `build` runs under the local registry's writers lock, since for a
    /// local index opening the back end and manifest (§4.6) is part of
    /// this same critical section; a failure there (e.g. a backend open
    /// error) is propagated rather than partially registering the index.
    pub fn register_local(&self, build: impl FnOnce(u32) -> Result<Index>) -> Result<Arc<Index>> {
        let mut guard = self.local_indices.write();
        let id = guard.len() as u32;
        let index = Arc::new(build(id)?);
        guard.push(index.clone());
        Ok(index)
    }

    /// Register a newly created remote index, returning its assigned `id`
    /// and whether it became the primary (the first remote index created)
    /// or a secondary. `build` receives the assigned id and whether this
    /// is the primary slot, so the caller can set `IndexKind` accordingly
    /// before construction.
    ///
    /// Held under the remote registry's writers lock for the whole
    /// creation protocol (§4.6): all ranks barrier, servers open the back
    /// end and validate the manifest, then every rank adds the index here
    /// before releasing the lock. `build` returning `Err` aborts
    /// registration without adding a partial entry; per §7 a
    /// `ManifestMismatch` inside `build` is expected to panic rather than
    /// return, since that case must abort the whole job, not just this
    /// call.
    pub fn register_remote(
        &self,
        build: impl FnOnce(u32, bool) -> Result<Index>,
    ) -> Result<Arc<Index>> {
        let mut guard = self.remote_indices.write();
        let id = guard.len() as u32;
        let is_primary = guard.is_empty();
        let index = Arc::new(build(id, is_primary)?);
        guard.push(index.clone());
        Ok(index)
    }

    /// Look up a local index by id.
    pub fn get_local(&self, id: u32) -> Result<Arc<Index>> {
        self.local_indices
            .read()
            .get(id as usize)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("local index {id}")))
    }

    /// Look up a remote index by id.
    pub fn get_remote(&self, id: u32) -> Result<Arc<Index>> {
        self.remote_indices
            .read()
            .get(id as usize)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("remote index {id}")))
    }

    /// The primary index (remote index `0`), if any has been created.
    pub fn primary(&self) -> Result<Arc<Index>> {
        self.get_remote(0)
    }

    /// Number of registered local indices.
    pub fn local_len(&self) -> usize {
        self.local_indices.read().len()
    }

    /// Number of registered remote indices.
    pub fn remote_len(&self) -> usize {
        self.remote_indices.read().len()
    }

    /// Snapshot of every remote index, for the release-all-on-teardown
    /// path (§4.6): iterate registered indices; on servers write stats,
    /// then the owning server writes the manifest; close the back end;
    /// free the range-server communicator; free the structure.
    pub fn all_remote(&self) -> Vec<Arc<Index>> {
        self.remote_indices.read().clone()
    }

    /// Snapshot of every local index.
    pub fn all_local(&self) -> Vec<Arc<Index>> {
        self.local_indices.read().clone()
    }
}

/// Helper for callers building an [`IndexKind`] from [`IndexRegistry::register_remote`]'s
/// `is_primary` flag.
pub fn remote_kind(is_primary: bool, primary_id: u32) -> IndexKind {
    if is_primary {
        IndexKind::Primary
    } else {
        IndexKind::Secondary { primary_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rangekv_backend::memory::MemoryBackend;
    use rangekv_backend::{OpenFlags, OpenOptions};
    use rangekv_core::{EngineType, KeyType};
    use rangekv_partitioning::RangeServerMap;
    use rangekv_stats::StatsMap;

    fn local_backend(key_type: KeyType) -> Box<dyn rangekv_backend::Backend> {
        Box::new(MemoryBackend::open(OpenFlags::Create, &OpenOptions { key_type }).unwrap())
    }

    #[test]
    fn dense_id_assignment_for_local_indices() {
        let registry = IndexRegistry::new();
        for expected_id in 0..3u32 {
            let idx = registry
                .register_local(|id| {
                    Ok(Index::new(
                        id,
                        IndexKind::Local,
                        KeyType::SignedInt32,
                        EngineType::Memory,
                        0,
                        0,
                        1,
                        RangeServerMap::local(0),
                        StatsMap::new(),
                        Some(local_backend(KeyType::SignedInt32)),
                        Some(local_backend(KeyType::SignedInt32)),
                        None,
                    ))
                })
                .unwrap();
            assert_eq!(idx.id, expected_id);
        }
        assert_eq!(registry.local_len(), 3);
    }

    #[test]
    fn first_remote_index_is_primary() {
        let registry = IndexRegistry::new();
        let first = registry
            .register_remote(|id, is_primary| {
                Ok(Index::new(
                    id,
                    remote_kind(is_primary, 0),
                    KeyType::SignedInt32,
                    EngineType::Memory,
                    1,
                    100,
                    1,
                    RangeServerMap::local(0),
                    StatsMap::new(),
                    Some(local_backend(KeyType::SignedInt32)),
                    Some(local_backend(KeyType::SignedInt32)),
                    None,
                ))
            })
            .unwrap();
        assert_eq!(first.kind, IndexKind::Primary);

        let second = registry
            .register_remote(|id, is_primary| {
                Ok(Index::new(
                    id,
                    remote_kind(is_primary, 0),
                    KeyType::SignedInt32,
                    EngineType::Memory,
                    1,
                    100,
                    1,
                    RangeServerMap::local(0),
                    StatsMap::new(),
                    Some(local_backend(KeyType::SignedInt32)),
                    Some(local_backend(KeyType::SignedInt32)),
                    None,
                ))
            })
            .unwrap();
        assert_eq!(second.kind, IndexKind::Secondary { primary_id: 0 });
    }

    #[test]
    fn lookup_of_unknown_id_is_not_found() {
        let registry = IndexRegistry::new();
        assert!(registry.get_local(0).unwrap_err().is_not_found());
        assert!(registry.get_remote(0).unwrap_err().is_not_found());
    }
}
