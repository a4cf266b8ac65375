//! [`BackendFactory`]: how `rangekv-engine` turns a path and key type into
//! an open back-end handle, without hard-wiring a concrete engine. Plays
//! the same role for C8 that `rangekv_backend::Backend` plays for C1:
//! dispatch is known at index-creation time, so this is a trait object
//! chosen by the caller rather than a runtime-switched enum.

use std::path::Path;

use rangekv_backend::memory::MemoryBackend;
use rangekv_backend::{Backend, OpenFlags, OpenOptions};
use rangekv_core::Result;

/// Opens a back-end handle at a given path. Implementations correspond
/// to `EngineType` variants (§4.1); `rangekv-engine` ships
/// [`MemoryBackendFactory`] for the one engine `rangekv-backend` itself
/// provides.
pub trait BackendFactory: Send + Sync {
    /// Open (or create) a back-end database at `path`.
    fn open(&self, path: &Path, flags: OpenFlags, opts: &OpenOptions) -> Result<Box<dyn Backend>>;
}

/// Opens [`MemoryBackend`] instances, ignoring `path` (this engine keeps
/// no on-disk state). The default factory for tests and for jobs that
/// only need `EngineType::Memory`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryBackendFactory;

impl BackendFactory for MemoryBackendFactory {
    fn open(&self, _path: &Path, flags: OpenFlags, opts: &OpenOptions) -> Result<Box<dyn Backend>> {
        Ok(Box::new(MemoryBackend::open(flags, opts)?))
    }
}
