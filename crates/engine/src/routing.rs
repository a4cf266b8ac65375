//! Client-side routing (§4.7's last paragraph): deciding which rank to
//! send a request to, computed locally without a network round trip.

use rangekv_collective::reconcile::flush as reconcile_flush;
use rangekv_collective::Collective;
use rangekv_core::{normalize, Error, Norm, Rank, Result, SliceNum};
use rangekv_partitioning::slice_of;
use rangekv_registry::Index;

/// Route a put of `key` to the owning range server's rank.
///
/// Computes `slice_of(key)` under this index's `server_factor`-derived
/// membership: `rangesrv_num = slice_num.rem_euclid(num_rangesrvs) + 1`
/// (§4.7; Euclidean remainder so negative slice numbers still map to a
/// valid non-negative `rangesrv_num`),
/// then looks up the rank that owns that `rangesrv_num` in the index's
/// [`rangekv_partitioning::RangeServerMap`].
pub fn route_put(index: &Index, key: &[u8]) -> Result<Rank> {
    route_point_op(index, key)
}

/// Route a get of `key` to the owning range server's rank. Identical
/// routing to [`route_put`]: gets and puts for the same key always land
/// on the same server.
pub fn route_get(index: &Index, key: &[u8]) -> Result<Rank> {
    route_point_op(index, key)
}

fn route_point_op(index: &Index, key: &[u8]) -> Result<Rank> {
    let slice_num = slice_of(key, index.key_type, index.slice_size)?;
    let rangesrv_num = rangesrv_num_for_slice(slice_num, index.range_servers.num_rangesrvs());
    rank_for_rangesrv_num(index, rangesrv_num)
}

fn rangesrv_num_for_slice(slice_num: SliceNum, num_rangesrvs: u32) -> u32 {
    slice_num.rem_euclid(num_rangesrvs as SliceNum) as u32 + 1
}

fn rank_for_rangesrv_num(index: &Index, rangesrv_num: u32) -> Result<Rank> {
    index
        .range_servers
        .iter()
        .find(|&(_, n)| n == rangesrv_num)
        .map(|(rank, _)| rank)
        .ok_or_else(|| {
            Error::Communication(format!(
                "no rank owns rangesrv_num {rangesrv_num} for this index"
            ))
        })
}

/// Route the start of an ascending range scan for key `k`: the smallest
/// slice whose recorded `max >= normalize(k)`, breaking ties by the
/// lowest `rangesrv_num` (§4.7).
///
/// Returns `None` when the index's local `StatsMap` has no entry
/// covering `k` — the documented fallback is for the caller to
/// broadcast the range query to every server rather than trust a
/// possibly-incomplete map (§7), since this only happens when a prior
/// flush ended in a `Communication` error.
pub fn route_range_start(index: &Index, k: &[u8]) -> Result<Option<Rank>> {
    let target = normalize(k, index.key_type)?;
    let num_rangesrvs = index.range_servers.num_rangesrvs();

    let mut best: Option<(SliceNum, u32)> = None;
    for entry in index.stats.snapshot() {
        let covers = match (entry.extrema, target) {
            (rangekv_stats::Extrema::Integer { max, .. }, Norm::Int(t)) => max >= t,
            (rangekv_stats::Extrema::Floating { max, .. }, Norm::Float(t)) => max >= t,
            _ => false,
        };
        if !covers {
            continue;
        }
        let rangesrv_num = rangesrv_num_for_slice(entry.slice_num, num_rangesrvs);
        match best {
            Some((best_slice, best_num))
                if (entry.slice_num, rangesrv_num) >= (best_slice, best_num) => {}
            _ => best = Some((entry.slice_num, rangesrv_num)),
        }
    }

    match best {
        Some((_, rangesrv_num)) => Ok(Some(rank_for_rangesrv_num(index, rangesrv_num)?)),
        None => Ok(None),
    }
}

/// Chain a get-next on a secondary index's back end to a get on its
/// primary index's back end (S4, **[EXPANSION]**): `secondary_get_next`
/// returns the next `(secondary_key, primary_key)` pair in secondary-key
/// order, then that `primary_key` is looked up against the primary
/// index's back end to return the caller's value.
///
/// `cursor = None` starts from the first secondary key. Both indices
/// must be servers on this rank (their `backend` handles must be
/// `Some`); this is client-side chaining over C1, not a new collective.
pub fn route_secondary_get_next(
    secondary: &Index,
    primary: &Index,
    cursor: Option<&[u8]>,
) -> Result<(Vec<u8>, Vec<u8>, Vec<u8>)> {
    let secondary_backend = secondary.backend.as_deref().ok_or_else(|| {
        Error::InvalidArgument("secondary index has no local backend on this rank".into())
    })?;
    let primary_backend = primary.backend.as_deref().ok_or_else(|| {
        Error::InvalidArgument("primary index has no local backend on this rank".into())
    })?;

    let (secondary_key, primary_key) = secondary_backend.get_next(cursor)?;
    let value = primary_backend
        .get(&primary_key)?
        .ok_or_else(|| Error::NotFound("primary key for secondary entry not found".into()))?;
    Ok((secondary_key, primary_key, value))
}

/// Run the flush reconciliation for one index (§4.7), resolving its
/// `key_type`, `StatsMap`, and server/master roles from the [`Index`]
/// struct itself so callers don't unpack those by hand.
pub fn flush_index(
    index: &Index,
    this_rank: Rank,
    server_comm: Option<&dyn Collective>,
    job_comm: &dyn Collective,
) -> Result<()> {
    let is_server = index.is_server(this_rank);
    let master_job_rank = index.range_servers.master_rank();
    // The master range server is assumed to sit at rank 0 of the
    // per-index server communicator `S`, the convention the caller's
    // `S` construction (building it from range_servers in rangesrv_num
    // order) is expected to follow.
    let root_in_s = 0;
    reconcile_flush(
        &index.stats,
        index.key_type,
        is_server,
        server_comm,
        root_in_s,
        job_comm,
        master_job_rank,
    )
}
