//! Manifest (C5): the fixed-layout record that guarantees safe reopen of
//! an index, and its atomic persistence.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod filename;
pub mod manifest;

pub use filename::manifest_file_name;
pub use manifest::{Manifest, ManifestManager};
