//! The flush algorithm (§4.7): gather each server's `StatsMap` to the
//! index's master range server, then broadcast the union to every rank in
//! the job so clients can route unseen ranges.

use rangekv_core::{is_float_key, Error, KeyType, Rank, Result};
use rangekv_stats::{record, StatsMap};

use crate::Collective;

fn pack_entries(entries: &[rangekv_stats::StatsEntry], floating: bool) -> Vec<u8> {
    let mut buf = Vec::with_capacity(entries.len() * record::RECORD_LEN);
    for entry in entries {
        if floating {
            buf.extend_from_slice(&record::encode_floating(entry));
        } else {
            buf.extend_from_slice(&record::encode_integer(entry));
        }
    }
    buf
}

fn unpack_entries(buf: &[u8], floating: bool) -> Result<Vec<rangekv_stats::StatsEntry>> {
    if buf.len() % record::RECORD_LEN != 0 {
        return Err(Error::Communication(format!(
            "flush buffer length {} is not a multiple of the record size {}",
            buf.len(),
            record::RECORD_LEN
        )));
    }
    buf.chunks(record::RECORD_LEN)
        .map(|chunk| {
            if floating {
                record::decode_floating(chunk)
            } else {
                record::decode_integer(chunk)
            }
        })
        .collect()
}

/// Run one flush for a single index.
///
/// - `stats` is this rank's `StatsMap` for the index; on return every
///   rank's copy (servers and clients alike) has been replaced with the
///   union of all servers' entries at the moment of the collective
///   (invariant 6, P4).
/// - `is_server` / `server_comm` / `root_in_s` describe this rank's role
///   and root position in the per-index server communicator `S`; pass
///   `None` for `server_comm` on a rank that is not a server for this
///   index (it participates only in the `J`-communicator steps).
/// - `job_comm` / `master_job_rank` describe the job communicator `J` and
///   the master range server's rank within it.
///
/// A [`rangekv_core::Error::Communication`] here is not escalated to an
/// abort: the caller is expected to leave `stats` in whatever partial
/// state it reached, which forces routing to broadcast-to-all fallbacks
/// (§7) rather than trusting a possibly-incomplete map.
pub fn flush(
    stats: &StatsMap,
    key_type: KeyType,
    is_server: bool,
    server_comm: Option<&dyn Collective>,
    root_in_s: Rank,
    job_comm: &dyn Collective,
    master_job_rank: Rank,
) -> Result<()> {
    let floating = is_float_key(key_type);
    let is_master = is_server && server_comm.map(|c| c.rank()) == Some(root_in_s);

    let gathered_at_master: Vec<u8> = if is_server {
        let server_comm = server_comm.expect("is_server implies server_comm is Some");

        // 1. Servers barrier on S.
        server_comm.barrier()?;

        let my_entries = stats.snapshot();
        let my_buf = pack_entries(&my_entries, floating);

        // 2. Each server gathers its entry count to the master on S.
        let counts = server_comm.gather_u64(my_entries.len() as u64, root_in_s)?;

        // 3. The master builds recvcounts (in bytes) from the gathered counts.
        let recvcounts: Vec<u64> = if is_master {
            counts.iter().map(|c| c * record::RECORD_LEN as u64).collect()
        } else {
            Vec::new()
        };

        // 4-5. Each server packs its entries; a rooted gatherv on S
        // delivers all records to the master.
        server_comm.gatherv_bytes(&my_buf, &recvcounts, root_in_s)?
    } else {
        Vec::new()
    };

    // 6. A barrier on J synchronizes clients with servers.
    job_comm.barrier()?;

    // 7. The master broadcasts the total record count on J, then the
    // concatenated buffer on J.
    let total_len = if is_master { gathered_at_master.len() } else { 0 };
    let total_len = job_comm.broadcast_u64(total_len as u64, master_job_rank)? as usize;

    let buf = if is_master {
        job_comm.broadcast_bytes(Some(&gathered_at_master), total_len, master_job_rank)?
    } else {
        job_comm.broadcast_bytes(None, total_len, master_job_rank)?
    };

    // 8. Every rank unpacks the buffer and replaces its StatsMap for this
    // index with the union of per-server entries.
    let entries = unpack_entries(&buf, floating)?;
    stats.clear();
    for entry in entries {
        stats.upsert(entry);
    }

    Ok(())
}
