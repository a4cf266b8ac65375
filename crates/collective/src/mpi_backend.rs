//! Real MPI-backed [`Collective`] implementation, gated behind the `mpi`
//! feature. Dispatch is known at index creation (the process either links
//! against an MPI runtime or it doesn't; there is no runtime switch), so
//! this module sits alongside [`crate::local::LocalCollective`] as a
//! second tagged implementation rather than something selected through
//! dynamic typing.

use mpi::collective::{CommunicatorCollectives, Root};
use mpi::datatype::PartitionMut;
use mpi::topology::{Communicator, SystemCommunicator};
use mpi::traits::*;

use rangekv_core::{Error, Rank, Result};

use crate::Collective;

/// A communicator backed by a real MPI runtime.
pub struct MpiCollective {
    comm: SystemCommunicator,
}

impl MpiCollective {
    /// Wrap an already-initialized MPI communicator (the full world
    /// communicator for `J`, or a sub-communicator built with
    /// `group_incl`/`comm_create` for a per-index `S`).
    pub fn new(comm: SystemCommunicator) -> Self {
        MpiCollective { comm }
    }
}

impl Collective for MpiCollective {
    fn rank(&self) -> Rank {
        self.comm.rank() as Rank
    }

    fn size(&self) -> u32 {
        self.comm.size() as u32
    }

    fn barrier(&self) -> Result<()> {
        self.comm.barrier();
        Ok(())
    }

    fn gather_u64(&self, value: u64, root: Rank) -> Result<Vec<u64>> {
        let root_process = self.comm.process_at_rank(root as i32);
        if self.rank() == root {
            let mut buf = vec![0u64; self.size() as usize];
            root_process.gather_into_root(&value, &mut buf[..]);
            Ok(buf)
        } else {
            root_process.gather_into(&value);
            Ok(Vec::new())
        }
    }

    fn gatherv_bytes(&self, data: &[u8], recvcounts: &[u64], root: Rank) -> Result<Vec<u8>> {
        let root_process = self.comm.process_at_rank(root as i32);
        if self.rank() == root {
            let counts: Vec<i32> = recvcounts.iter().map(|&c| c as i32).collect();
            let displs: Vec<i32> = counts
                .iter()
                .scan(0i32, |acc, &c| {
                    let d = *acc;
                    *acc += c;
                    Some(d)
                })
                .collect();
            let total: i32 = counts.iter().sum();
            let mut buf = vec![0u8; total as usize];
            {
                let mut partition = PartitionMut::new(&mut buf[..], counts, displs);
                root_process.gather_varcount_into_root(data, &mut partition);
            }
            Ok(buf)
        } else {
            root_process.gather_varcount_into(data);
            Ok(Vec::new())
        }
    }

    fn broadcast_u64(&self, value: u64, root: Rank) -> Result<u64> {
        let root_process = self.comm.process_at_rank(root as i32);
        let mut v = value;
        root_process.broadcast_into(&mut v);
        Ok(v)
    }

    fn broadcast_bytes(&self, data: Option<&[u8]>, len: usize, root: Rank) -> Result<Vec<u8>> {
        let root_process = self.comm.process_at_rank(root as i32);
        let mut buf = vec![0u8; len];
        if self.rank() == root {
            let data = data.ok_or_else(|| {
                Error::Communication("broadcast_bytes: root must supply data".into())
            })?;
            buf.copy_from_slice(data);
        }
        root_process.broadcast_into(&mut buf[..]);
        Ok(buf)
    }
}
