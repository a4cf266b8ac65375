//! [`Context`]: process-wide state for one rank — its identity in the
//! job, the index registry, and the validation limits applied at index
//! creation.
//!
//! The original C source keeps this as a single global `mdhim_t *md`
//! struct threaded through every call. Per §9's design note ("expose a
//! context handle to callers rather than ambient globals when
//! possible"), `Context` is an explicit handle the caller constructs
//! once per process and passes to every `rangekv-engine` call, rather
//! than a `static`.

use rangekv_core::{Limits, Rank};
use rangekv_registry::IndexRegistry;

/// Process-wide state for one rank of a `rangekv` job.
pub struct Context {
    rank: Rank,
    registry: IndexRegistry,
    limits: Limits,
}

impl Context {
    /// Bring up a fresh context for this rank. There is no collective
    /// handshake at this point — membership and manifest validation
    /// happen per-index, not at context bring-up (§4.6).
    pub fn new(rank: Rank) -> Self {
        Context::with_limits(rank, Limits::default())
    }

    /// Bring up a context with non-default validation limits (e.g.
    /// [`Limits::with_small_limits`] in tests).
    pub fn with_limits(rank: Rank, limits: Limits) -> Self {
        tracing::info!(rank, "rangekv context initialized");
        Context {
            rank,
            registry: IndexRegistry::new(),
            limits,
        }
    }

    /// This rank's identity within the job communicator.
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// The process-wide index registry (C6).
    pub fn registry(&self) -> &IndexRegistry {
        &self.registry
    }

    /// Validation limits applied at index creation.
    pub fn limits(&self) -> &Limits {
        &self.limits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_context_has_empty_registry() {
        let ctx = Context::new(0);
        assert_eq!(ctx.rank(), 0);
        assert_eq!(ctx.registry().local_len(), 0);
        assert_eq!(ctx.registry().remote_len(), 0);
    }
}
