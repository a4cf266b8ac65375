//! Index creation protocols (§4.6): local (single-rank, no barrier) and
//! remote (collective, across all ranks).

use std::path::PathBuf;
use std::sync::Arc;

use rangekv_backend::path::{backend_file_name, path_index_for_server};
use rangekv_backend::{Backend, OpenFlags, OpenOptions as BackendOpenOptions};
use rangekv_collective::Collective;
use rangekv_core::{Error, Result};
use rangekv_manifest::filename::IndexKindTag;
use rangekv_manifest::{manifest_file_name, Manifest, ManifestManager};
use rangekv_partitioning::{compute_membership, RangeServerMap};
use rangekv_registry::{Index, IndexKind};
use rangekv_stats::StatsMap;

use crate::backend_factory::BackendFactory;
use crate::config::JobConfig;
use crate::context::Context;

fn stats_file_name(main_file_name: &str) -> String {
    format!("{main_file_name}-stats")
}

fn backend_dir(config: &JobConfig, rangesrv_num: u32, num_rangesrvs: u32) -> &PathBuf {
    let idx = path_index_for_server(rangesrv_num, num_rangesrvs, config.db_paths.len());
    &config.db_paths[idx]
}

fn open_server_backends(
    factory: &dyn BackendFactory,
    config: &JobConfig,
    id: u32,
    rank: rangekv_core::Rank,
    rangesrv_num: u32,
    num_rangesrvs: u32,
) -> Result<(Box<dyn Backend>, Box<dyn Backend>)> {
    let dir = backend_dir(config, rangesrv_num, num_rangesrvs);
    let main_name = backend_file_name(&config.db_name, id, rank);
    let opts = BackendOpenOptions {
        key_type: config.key_type,
    };
    let backend = factory.open(&dir.join(&main_name), OpenFlags::ReadWrite, &opts)?;
    let stats_backend = factory.open(
        &dir.join(stats_file_name(&main_name)),
        OpenFlags::ReadWrite,
        &opts,
    )?;
    Ok((backend, stats_backend))
}

fn manifest_for(config: &JobConfig, num_rangesrvs: u32, num_ranks: u32) -> Manifest {
    Manifest {
        num_rangesrvs: num_rangesrvs as i32,
        key_type: config.key_type,
        engine_type: config.engine_type,
        server_factor: config.server_factor,
        slice_size: config.slice_size,
        num_ranks: num_ranks as i32,
    }
}

/// Load or create the manifest owned by the `rangesrv_num == 1` server.
///
/// A missing manifest on first creation is not an error (§4.5); a
/// mismatch on any of the five reopen-sensitive fields is fatal for the
/// whole job (§7) — this panics rather than returning an error, since a
/// `Result::Err` here would let a caller catch and continue, which
/// contradicts "the job aborts".
fn open_or_validate_manifest(path: PathBuf, requested: Manifest) -> Result<ManifestManager> {
    if ManifestManager::exists(&path) {
        let mgr = ManifestManager::load(path)?;
        if let Err(e) = mgr.manifest().validate_against(&requested) {
            tracing::error!(error = %e, "manifest mismatch on reopen, aborting job");
            panic!("rangekv: fatal manifest mismatch on reopen: {e}");
        }
        Ok(mgr)
    } else {
        ManifestManager::create(path, requested)
    }
}

/// Create a remote (primary or secondary) index: a collective call
/// across all ranks of `job_comm` (§4.6).
///
/// `server_comm` must be `Some` on exactly the ranks [`compute_membership`]
/// designates as servers for this configuration, and must itself be
/// restricted to those ranks (the per-index communicator `S` of §4.7);
/// building that sub-communicator (MPI `comm_create`/`group_incl`, or an
/// equivalent) is the caller's responsibility, since it depends on the
/// collective substrate in use.
pub fn create_remote_index(
    ctx: &Context,
    backend_factory: &dyn BackendFactory,
    job_comm: &dyn Collective,
    server_comm: Option<&dyn Collective>,
    config: &JobConfig,
) -> Result<Arc<Index>> {
    ctx.limits().validate_slice_size(config.slice_size)?;
    ctx.limits().validate_server_factor(config.server_factor)?;

    // All ranks enter a barrier before any rank mutates shared state.
    job_comm.barrier()?;

    let rank = job_comm.rank();
    let num_ranks = job_comm.size();
    let range_servers = compute_membership(config.server_factor, num_ranks);
    let is_server = range_servers.is_server(rank);
    let rangesrv_num = range_servers.rangesrv_num(rank);

    if is_server && server_comm.is_none() {
        return Err(Error::InvalidArgument(
            "rank is a range server for this configuration but no server_comm was supplied".into(),
        ));
    }

    let config = config.clone();
    ctx.registry().register_remote(move |id, is_primary| {
        let kind = if is_primary {
            IndexKind::Primary
        } else {
            IndexKind::Secondary { primary_id: 0 }
        };

        let (backend, stats_backend, manifest_manager, stats) = if is_server {
            let num_rangesrvs = range_servers.num_rangesrvs();
            let rangesrv_num = rangesrv_num.expect("is_server implies a rangesrv_num");
            let (backend, stats_backend) = open_server_backends(
                backend_factory,
                &config,
                id,
                rank,
                rangesrv_num,
                num_rangesrvs,
            )?;
            let stats = StatsMap::load(stats_backend.as_ref(), config.key_type)?;

            let manifest_manager = if rangesrv_num == 1 {
                let dir = backend_dir(&config, rangesrv_num, num_rangesrvs);
                let path = dir.join(manifest_file_name(IndexKindTag::Remote, id, rank));
                let requested = manifest_for(&config, num_rangesrvs, num_ranks);
                Some(open_or_validate_manifest(path, requested)?)
            } else {
                None
            };

            (Some(backend), Some(stats_backend), manifest_manager, stats)
        } else {
            (None, None, None, StatsMap::new())
        };

        tracing::info!(index_id = id, rank, is_server, "remote index created");

        Ok(Index::new(
            id,
            kind,
            config.key_type,
            config.engine_type,
            config.server_factor,
            config.slice_size,
            num_ranks as i32,
            range_servers.clone(),
            stats,
            backend,
            stats_backend,
            manifest_manager,
        ))
    })
}

/// Create a local index: single-rank, no barrier, no membership
/// computation beyond [`RangeServerMap::local`] (§4.6).
pub fn create_local_index(
    ctx: &Context,
    backend_factory: &dyn BackendFactory,
    config: &JobConfig,
) -> Result<Arc<Index>> {
    ctx.limits().validate_slice_size(config.slice_size.max(1))?;

    let rank = ctx.rank();
    let config = config.clone();
    ctx.registry().register_local(move |id| {
        let dir = &config.db_paths[0];
        let main_name = backend_file_name(&config.db_name, id, rank);
        let opts = BackendOpenOptions {
            key_type: config.key_type,
        };
        let backend = backend_factory.open(&dir.join(&main_name), OpenFlags::ReadWrite, &opts)?;
        let stats_backend = backend_factory.open(
            &dir.join(stats_file_name(&main_name)),
            OpenFlags::ReadWrite,
            &opts,
        )?;
        let stats = StatsMap::load(stats_backend.as_ref(), config.key_type)?;

        let path = dir.join(manifest_file_name(IndexKindTag::Local, id, rank));
        let requested = Manifest::local(config.key_type, config.engine_type);
        let manifest_manager = open_or_validate_manifest(path, requested)?;

        tracing::info!(index_id = id, rank, "local index created");

        Ok(Index::new(
            id,
            IndexKind::Local,
            config.key_type,
            config.engine_type,
            0,
            0,
            1,
            RangeServerMap::local(rank),
            stats,
            Some(backend),
            Some(stats_backend),
            Some(manifest_manager),
        ))
    })
}
