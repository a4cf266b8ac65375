//! Collective reconciliation (C7): the barrier/gather/broadcast contract
//! over two communicators — the full job communicator `J` and a per-index
//! communicator `S` containing only that index's range servers — and the
//! flush algorithm built on top of it.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod local;
pub mod reconcile;

#[cfg(feature = "mpi")]
pub mod mpi_backend;

use rangekv_core::{Rank, Result};

/// The minimal set of collective operations the flush algorithm needs.
///
/// One instance represents membership in a single communicator (either
/// `J` or a `S`); a process that is both a client and a server in the same
/// job holds one instance of each.
pub trait Collective: Send + Sync {
    /// This process's rank within the communicator.
    fn rank(&self) -> Rank;

    /// Number of ranks in the communicator.
    fn size(&self) -> u32;

    /// Block until every member has called `barrier`.
    fn barrier(&self) -> Result<()>;

    /// Rooted gather of one `u64` per rank to `root`. Only `root`'s
    /// returned vector is meaningful, ordered by rank; other ranks may
    /// receive an empty vector.
    fn gather_u64(&self, value: u64, root: Rank) -> Result<Vec<u64>>;

    /// Rooted variable-length gather of byte buffers to `root`, using the
    /// already-gathered `recvcounts` (one length per rank, in rank order)
    /// to lay out the concatenated result. Only `root`'s returned buffer
    /// is meaningful.
    fn gatherv_bytes(&self, data: &[u8], recvcounts: &[u64], root: Rank) -> Result<Vec<u8>>;

    /// Broadcast a `u64` from `root` to every rank, `root` included.
    fn broadcast_u64(&self, value: u64, root: Rank) -> Result<u64>;

    /// Broadcast a byte buffer of `len` bytes from `root` to every rank.
    /// `root` passes `Some(data)` with `data.len() == len`; every other
    /// rank passes `None` and receives the broadcast content back.
    fn broadcast_bytes(&self, data: Option<&[u8]>, len: usize, root: Rank) -> Result<Vec<u8>>;
}
