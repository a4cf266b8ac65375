//! [`Index`]: an identified collection of keys sharing a key type, back-end
//! engine, and partitioning policy.

use std::sync::atomic::{AtomicBool, Ordering};

use rangekv_backend::Backend;
use rangekv_core::{EngineType, KeyType, Rank};
use rangekv_manifest::ManifestManager;
use rangekv_partitioning::RangeServerMap;
use rangekv_stats::StatsMap;

/// Which of the three index variants an [`Index`] is.
///
/// Modeled as a tagged variant of a single type rather than a subtype
/// relation between distinct `index_t`/`remote_index` structs: primary and
/// secondary indices share every field, differing only in whether they
/// carry a `primary_id` back-reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    /// Globally visible, partitioned across range servers. The first
    /// remote index created in a process.
    Primary,
    /// Globally visible, logically maps secondary keys to primary keys of
    /// an associated primary index, referenced by `id` rather than
    /// pointer to avoid a cyclic ownership graph (§9).
    Secondary {
        /// `id` of the associated primary index.
        primary_id: u32,
    },
    /// Visible only to its creating rank; exactly one range server (the
    /// creator) and one slice.
    Local,
}

/// One index: a collection of keys sharing a key type, back-end engine,
/// and partitioning policy, plus the range-server membership and
/// statistics that make it routable.
pub struct Index {
    /// Dense id, monotonically assigned per owner process within its
    /// variant's collection (local vs. remote).
    pub id: u32,
    /// Which variant this index is.
    pub kind: IndexKind,
    /// Fixed at creation; checked bitwise on reopen (§4.5).
    pub key_type: KeyType,
    /// Fixed at creation; checked bitwise on reopen.
    pub engine_type: EngineType,
    /// Membership stride used to compute [`RangeServerMap`]; `0` for local
    /// indices.
    pub server_factor: u32,
    /// Records per slice; `0` for local indices.
    pub slice_size: u64,
    /// Size of the job communicator at creation; `1` for local indices.
    pub num_ranks: i32,
    /// Rank → `rangesrv_num` mapping for this index.
    pub range_servers: RangeServerMap,
    /// Per-slice min/max/count, guarded by its own writers lock. Clients
    /// populate this from the flush broadcast (§4.7); servers populate it
    /// from local puts.
    pub stats: StatsMap,
    /// The main back-end handle for this index's keys, if this rank is
    /// one of its range servers. A rank that is not a server for this
    /// index never opens a back end for it (the original source's
    /// `open_db_store` is only reached past the `is_range_server` check).
    pub backend: Option<Box<dyn Backend>>,
    /// The back-end handle for this index's statistics subdatabase, if
    /// this rank is a server for it.
    pub stats_backend: Option<Box<dyn Backend>>,
    /// Present only on the `rangesrv_num == 1` server, which alone owns
    /// the manifest (invariant 3).
    pub manifest_manager: Option<ManifestManager>,
    released: AtomicBool,
}

impl Index {
    /// Construct a freshly created (not yet released) index.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u32,
        kind: IndexKind,
        key_type: KeyType,
        engine_type: EngineType,
        server_factor: u32,
        slice_size: u64,
        num_ranks: i32,
        range_servers: RangeServerMap,
        stats: StatsMap,
        backend: Option<Box<dyn Backend>>,
        stats_backend: Option<Box<dyn Backend>>,
        manifest_manager: Option<ManifestManager>,
    ) -> Self {
        Index {
            id,
            kind,
            key_type,
            engine_type,
            server_factor,
            slice_size,
            num_ranks,
            range_servers,
            stats,
            backend,
            stats_backend,
            manifest_manager,
            released: AtomicBool::new(false),
        }
    }

    /// `true` if this rank is a range server for this index.
    pub fn is_server(&self, rank: Rank) -> bool {
        self.range_servers.is_server(rank)
    }

    /// `true` if [`Index::release`] has already torn this index down.
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    /// Mark this index released. Idempotent; the caller (registry release
    /// protocol, §4.6) is responsible for flushing stats, writing the
    /// manifest, and closing the back end before calling this.
    pub fn mark_released(&self) {
        self.released.store(true, Ordering::Release);
    }
}
