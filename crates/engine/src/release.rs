//! Index and job release (§4.6): on teardown, for every registered
//! index — if this rank is a server, persist `StatsMap` to the stats
//! back end; the manifest is already durable (written at create time
//! and immutable thereafter, see `DESIGN.md`); close both back-end
//! handles; mark the index released.

use rangekv_core::{Rank, Result};
use rangekv_registry::Index;

use crate::context::Context;

/// Release one index: persist stats if this rank is a server, close its
/// back-end handles, and mark it released. Idempotent — releasing an
/// already-released index is a no-op.
pub fn release_index(index: &Index, this_rank: Rank) -> Result<()> {
    if index.is_released() {
        return Ok(());
    }

    if index.is_server(this_rank) {
        if let Some(stats_backend) = index.stats_backend.as_deref() {
            index.stats.persist(stats_backend, index.key_type)?;
            stats_backend.commit()?;
        }
    }

    if let Some(backend) = index.backend.as_deref() {
        backend.commit()?;
        backend.close()?;
    }
    if let Some(stats_backend) = index.stats_backend.as_deref() {
        stats_backend.close()?;
    }

    index.mark_released();
    tracing::info!(index_id = index.id, rank = this_rank, "index released");
    Ok(())
}

/// Release every local and remote index registered against this
/// context, in no particular order. The first error encountered is
/// returned; indices after it are left unreleased for the caller to
/// retry or inspect.
pub fn shutdown(ctx: &Context) -> Result<()> {
    let this_rank = ctx.rank();
    for index in ctx.registry().all_remote() {
        release_index(&index, this_rank)?;
    }
    for index in ctx.registry().all_local() {
        release_index(&index, this_rank)?;
    }
    tracing::info!(rank = this_rank, "rangekv context shut down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend_factory::MemoryBackendFactory;
    use crate::config::{DebugLevel, JobConfig};
    use crate::create::{create_local_index, create_remote_index};
    use rangekv_collective::local::LocalCollective;
    use rangekv_core::{EngineType, KeyType};

    fn config(dir: &std::path::Path) -> JobConfig {
        JobConfig {
            db_paths: vec![dir.to_path_buf()],
            db_name: "testdb".into(),
            engine_type: EngineType::Memory,
            key_type: KeyType::SignedInt32,
            server_factor: 1,
            slice_size: 100,
            debug_level: DebugLevel::Off,
        }
    }

    #[test]
    fn release_local_index_persists_stats_and_closes_backend() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Context::new(0);
        let factory = MemoryBackendFactory;
        let idx = create_local_index(&ctx, &factory, &config(dir.path())).unwrap();
        idx.stats
            .update_on_put(&1i32.to_be_bytes(), KeyType::SignedInt32, 100)
            .unwrap();

        release_index(&idx, 0).unwrap();
        assert!(idx.is_released());
        // Releasing twice is a no-op, not an error.
        release_index(&idx, 0).unwrap();
    }

    #[test]
    fn shutdown_releases_every_registered_index() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Context::new(0);
        let factory = MemoryBackendFactory;
        create_local_index(&ctx, &factory, &config(dir.path())).unwrap();
        let job_comm = LocalCollective::new();
        create_remote_index(&ctx, &factory, &job_comm, Some(&job_comm), &config(dir.path()))
            .unwrap();

        shutdown(&ctx).unwrap();
        for idx in ctx.registry().all_local() {
            assert!(idx.is_released());
        }
        for idx in ctx.registry().all_remote() {
            assert!(idx.is_released());
        }
    }
}
