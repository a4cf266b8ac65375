//! Core types shared across the rangekv index, partitioning, and statistics
//! subsystem.
//!
//! This crate defines the foundational vocabulary used throughout the
//! system:
//! - [`KeyType`] / [`EngineType`]: the fixed enums an index is created with.
//! - [`Norm`]: the normalized numeric representation of a key, used by
//!   slice arithmetic and statistics extrema.
//! - [`Error`]: the unified error type for all rangekv APIs.
//! - [`Limits`]: configuration bounds enforced at index creation.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod key;
pub mod limits;
pub mod types;

pub use error::{Error, Result};
pub use key::{encode_sort_key, is_float_key, normalize, raw_signed_int, Norm};
pub use limits::Limits;
pub use types::{EngineType, KeyType, Rank, RangeSrvNum, SliceNum};
