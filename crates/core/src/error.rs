//! Error types for the rangekv index/partitioning/statistics subsystem.
//!
//! We use `thiserror` for automatic `Display` and `Error` trait
//! implementations, the same way the rest of the ecosystem does.
//!
//! ## Error kinds
//!
//! - [`Error::InvalidArgument`] — unrecognized key type or out-of-range
//!   factor/size. Returned from creation calls; the caller decides.
//! - [`Error::Backend`] — failures from the KV engine (open, I/O,
//!   corruption). Returned from creation calls; the caller decides.
//! - [`Error::ManifestMismatch`] — any of the five manifest fields
//!   disagrees with the in-memory configuration. Fatal for remote index
//!   creation: the job aborts.
//! - [`Error::Communication`] — non-success from a collective call. The
//!   calling rank's statistics map for that index is left empty, which
//!   forces routing to broadcast-to-all fallbacks.
//! - [`Error::Lock`] — failure to acquire a lock; treated as fatal on the
//!   calling rank.
//! - [`Error::NotFound`] — benign absence during statistics iteration or a
//!   point `get`.

use thiserror::Error;

/// Result type alias for rangekv operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error kinds for the rangekv index/partitioning/statistics subsystem
/// (see the module documentation for the propagation rules of each kind).
#[derive(Debug, Error)]
pub enum Error {
    /// Unrecognized key type, or a factor/size argument outside its valid
    /// range (e.g. `slice_size == 0`, `server_factor == 0`).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A failure surfaced by the pluggable back-end KV engine: open, I/O,
    /// or corruption.
    #[error("backend error: {0}")]
    Backend(String),

    /// The manifest found on disk disagrees with the in-memory
    /// configuration on one of the five compared fields. Fatal for remote
    /// index creation.
    #[error("manifest mismatch: {field}: on-disk {on_disk}, requested {requested}")]
    ManifestMismatch {
        /// Name of the mismatching field.
        field: &'static str,
        /// Human-readable value found on disk.
        on_disk: String,
        /// Human-readable value requested by the caller.
        requested: String,
    },

    /// A collective call (barrier, gather, broadcast) did not complete
    /// successfully.
    #[error("communication error: {0}")]
    Communication(String),

    /// Failed to acquire a lock guarding a registry or statistics map.
    /// Treated as fatal on the calling rank.
    #[error("lock error: {0}")]
    Lock(String),

    /// The requested entity (key, slice, manifest) was not present. This
    /// is the normal termination condition of statistics iteration.
    #[error("not found: {0}")]
    NotFound(String),
}

impl From<crate::limits::LimitError> for Error {
    fn from(e: crate::limits::LimitError) -> Self {
        Error::InvalidArgument(e.to_string())
    }
}

impl Error {
    /// `true` for errors that should abort the owning job communicator
    /// rather than merely returning an error to the caller, per §7.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::ManifestMismatch { .. } | Error::Lock(_))
    }

    /// `true` for the benign "nothing more to iterate" / "key absent"
    /// condition, as distinct from a genuine failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_mismatch_is_fatal() {
        let e = Error::ManifestMismatch {
            field: "slice_size",
            on_disk: "1000000".into(),
            requested: "500000".into(),
        };
        assert!(e.is_fatal());
        assert!(!e.is_not_found());
    }

    #[test]
    fn lock_error_is_fatal() {
        assert!(Error::Lock("poisoned".into()).is_fatal());
    }

    #[test]
    fn not_found_is_benign() {
        let e = Error::NotFound("slice 3".into());
        assert!(e.is_not_found());
        assert!(!e.is_fatal());
    }

    #[test]
    fn communication_error_is_not_fatal_at_this_layer() {
        // Per §7: surfaced to the caller, who leaves the stats map empty
        // rather than aborting the job.
        assert!(!Error::Communication("gather failed".into()).is_fatal());
    }

    #[test]
    fn display_messages_carry_context() {
        let e = Error::InvalidArgument("slice_size must be positive".into());
        assert!(e.to_string().contains("slice_size must be positive"));
    }
}
