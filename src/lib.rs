//! # rangekv
//!
//! A parallel, distributed, ordered key-value store layered over a
//! message-passing substrate. Keys are partitioned deterministically
//! across range servers by contiguous numeric ranges ("slices"); each
//! range server owns one or more slices and persists them in a
//! pluggable ordered key-value back end.
//!
//! This crate is the index, partitioning, and statistics subsystem: it
//! decides which rank owns which key, maintains per-slice min/max/count
//! statistics that drive range-query routing, reconciles those
//! statistics across range servers, and persists and validates the
//! manifest that guarantees a safe reopen.
//!
//! # Quick start
//!
//! ```no_run
//! use rangekv::{
//!     Context, DebugLevel, EngineType, JobConfig, KeyType, MemoryBackendFactory,
//! };
//!
//! fn main() -> rangekv::Result<()> {
//!     let ctx = Context::new(0);
//!     let factory = MemoryBackendFactory;
//!     let config = JobConfig {
//!         db_paths: vec!["./data".into()],
//!         db_name: "example".into(),
//!         engine_type: EngineType::Memory,
//!         key_type: KeyType::SignedInt32,
//!         server_factor: 1,
//!         slice_size: 1000,
//!         debug_level: DebugLevel::Off,
//!     };
//!
//!     let index = rangekv::create_local_index(&ctx, &factory, &config)?;
//!     let backend = index.backend.as_deref().expect("local index always has a backend");
//!     backend.put(&20i32.to_be_bytes(), b"hello")?;
//!     assert_eq!(backend.get(&20i32.to_be_bytes())?, Some(b"hello".to_vec()));
//!
//!     rangekv::release_index(&index, ctx.rank())?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! [`Context`] is the process-wide handle: one per rank, holding the
//! index registry and the validation limits applied at index creation.
//! Indices are created collectively ([`create_remote_index`]) or locally
//! ([`create_local_index`]), routed with [`route_put`]/[`route_get`]/
//! [`route_range_start`], reconciled with [`flush_index`], and torn down
//! with [`release_index`]/[`shutdown`].
//!
//! The lower-level crates (`rangekv-core`, `rangekv-backend`,
//! `rangekv-partitioning`, `rangekv-stats`, `rangekv-manifest`,
//! `rangekv-registry`, `rangekv-collective`) are reexported here for
//! direct use, but most callers only need the surface re-exported at
//! this crate's root.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use rangekv_backend::{memory::MemoryBackend, Backend, OpenFlags, OpenOptions};
pub use rangekv_collective::{local::LocalCollective, Collective};
pub use rangekv_core::{
    encode_sort_key, is_float_key, normalize, EngineType, Error, KeyType, Norm, Rank,
    RangeSrvNum, Result, SliceNum,
};
pub use rangekv_engine::{
    create_local_index, create_remote_index, flush_index, release_index, route_get, route_put,
    route_range_start, route_secondary_get_next, shutdown, BackendFactory, Context, DebugLevel,
    JobConfig, MemoryBackendFactory,
};
pub use rangekv_manifest::{Manifest, ManifestManager};
pub use rangekv_partitioning::{compute_membership, slice_of, RangeServerMap};
pub use rangekv_registry::{Index, IndexKind, IndexRegistry};
pub use rangekv_stats::{Extrema, StatsEntry, StatsMap};

#[cfg(feature = "mpi")]
pub use rangekv_collective::mpi_backend::MpiCollective;
