//! Configuration inputs consumed at the boundary (§6): the typed surface
//! a caller uses to request an index, and the log-verbosity knob carried
//! alongside it.
//!
//! This module is the *interface* the spec calls out as in-scope (§6's
//! "Configuration inputs consumed at the boundary"); the actual CLI or a
//! live-reloadable options file is explicitly out of scope (§1) and is
//! not implemented here.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use rangekv_core::{EngineType, KeyType};

/// Verbosity knob carried alongside a [`JobConfig`]. `rangekv` emits
/// `tracing` events at these levels but does not install a subscriber
/// itself — wiring that to an actual sink is the embedding
/// application's responsibility, the same way "logging" is listed among
/// this spec's out-of-scope external collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebugLevel {
    /// No `rangekv` tracing events.
    Off,
    /// Lifecycle events: index create/release, flush.
    Info,
    /// Per-operation detail: individual routing decisions.
    Debug,
    /// Everything, including collective call boundaries.
    Trace,
}

impl DebugLevel {
    /// The `tracing` level filter this knob corresponds to.
    pub fn as_level_filter(self) -> tracing::level_filters::LevelFilter {
        use tracing::level_filters::LevelFilter;
        match self {
            DebugLevel::Off => LevelFilter::OFF,
            DebugLevel::Info => LevelFilter::INFO,
            DebugLevel::Debug => LevelFilter::DEBUG,
            DebugLevel::Trace => LevelFilter::TRACE,
        }
    }
}

impl Default for DebugLevel {
    fn default() -> Self {
        DebugLevel::Info
    }
}

/// Configuration for one index, as consumed at the C5/C6 boundary (§6).
///
/// `db_paths` may list more than one directory; a range server's data
/// file is placed in `db_paths[path_index_for_server(..)]`
/// (`rangekv_backend::path`). A single-path configuration is the common
/// case and is exactly `db_paths = vec![db_path]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// One or more database directories this index's back-end files and
    /// manifest are written under.
    pub db_paths: Vec<PathBuf>,
    /// Base name used to build back-end file names
    /// (`rangekv_backend::path::backend_file_name`).
    pub db_name: String,
    /// Pluggable back-end engine this index is opened on.
    pub engine_type: EngineType,
    /// Fixed key type for this index; checked bitwise on reopen.
    pub key_type: KeyType,
    /// Range-server membership stride (§4.3). Ignored for local indices.
    pub server_factor: u32,
    /// Records per slice (§4.2). Ignored for local indices.
    pub slice_size: u64,
    /// Log verbosity knob (not itself a manifest field).
    pub debug_level: DebugLevel,
}

impl JobConfig {
    /// First configured database directory, the common case for
    /// single-path deployments.
    pub fn primary_db_path(&self) -> &PathBuf {
        &self.db_paths[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_level_defaults_to_info() {
        assert_eq!(DebugLevel::default(), DebugLevel::Info);
    }

    #[test]
    fn debug_level_maps_to_level_filter() {
        use tracing::level_filters::LevelFilter;
        assert_eq!(DebugLevel::Off.as_level_filter(), LevelFilter::OFF);
        assert_eq!(DebugLevel::Trace.as_level_filter(), LevelFilter::TRACE);
    }

    #[test]
    fn job_config_round_trips_through_toml() {
        let cfg = JobConfig {
            db_paths: vec![PathBuf::from("/tmp/rangekv")],
            db_name: "mydb".into(),
            engine_type: EngineType::Memory,
            key_type: KeyType::SignedInt64,
            server_factor: 2,
            slice_size: 1_000_000,
            debug_level: DebugLevel::Debug,
        };
        let toml_str = toml::to_string(&cfg).unwrap();
        let parsed: JobConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.db_name, cfg.db_name);
        assert_eq!(parsed.server_factor, cfg.server_factor);
        assert_eq!(parsed.slice_size, cfg.slice_size);
        assert_eq!(parsed.debug_level, cfg.debug_level);
    }

    #[test]
    fn primary_db_path_is_first_entry() {
        let cfg = JobConfig {
            db_paths: vec![PathBuf::from("/a"), PathBuf::from("/b")],
            db_name: "d".into(),
            engine_type: EngineType::Memory,
            key_type: KeyType::SignedInt32,
            server_factor: 1,
            slice_size: 100,
            debug_level: DebugLevel::Off,
        };
        assert_eq!(cfg.primary_db_path(), &PathBuf::from("/a"));
    }
}
