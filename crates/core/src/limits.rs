//! Configuration bounds enforced at index creation.
//!
//! These are small, stable defaults rather than hard platform limits: the
//! important invariant they protect is `slice_size > 0` and
//! `server_factor > 0`, both of which appear as a divisor in slice and
//! membership arithmetic elsewhere in the system.

use thiserror::Error;

/// Bounds checked when an index is created or reopened.
#[derive(Debug, Clone)]
pub struct Limits {
    /// Smallest allowed `slice_size` (default: 1). A slice size of zero
    /// would make slice arithmetic a division by zero.
    pub min_slice_size: u64,

    /// Smallest allowed `server_factor` (default: 1). A factor of zero
    /// would leave an index with no range servers at all.
    pub min_server_factor: u32,

    /// Maximum byte length of a `ByteString`/`UnicodeString` key (default:
    /// 4096). Numeric key types are exempt: their encoded length is fixed
    /// by their type.
    pub max_string_key_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            min_slice_size: 1,
            min_server_factor: 1,
            max_string_key_bytes: 4096,
        }
    }
}

impl Limits {
    /// Limits with small values, for tests that want to exercise rejection
    /// paths without huge inputs.
    pub fn with_small_limits() -> Self {
        Limits {
            min_slice_size: 1,
            min_server_factor: 1,
            max_string_key_bytes: 64,
        }
    }

    /// Validate a requested `slice_size`.
    pub fn validate_slice_size(&self, slice_size: u64) -> Result<(), LimitError> {
        if slice_size < self.min_slice_size {
            return Err(LimitError::SliceSizeTooSmall {
                actual: slice_size,
                min: self.min_slice_size,
            });
        }
        Ok(())
    }

    /// Validate a requested `server_factor`.
    pub fn validate_server_factor(&self, server_factor: u32) -> Result<(), LimitError> {
        if server_factor < self.min_server_factor {
            return Err(LimitError::ServerFactorTooSmall {
                actual: server_factor,
                min: self.min_server_factor,
            });
        }
        Ok(())
    }

    /// Validate the byte length of a `ByteString`/`UnicodeString` key.
    pub fn validate_string_key_len(&self, len: usize) -> Result<(), LimitError> {
        if len > self.max_string_key_bytes {
            return Err(LimitError::KeyTooLong {
                actual: len,
                max: self.max_string_key_bytes,
            });
        }
        Ok(())
    }
}

/// Limit validation errors. Callers generally fold these into
/// [`crate::Error::InvalidArgument`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LimitError {
    /// `slice_size` requested was below the configured minimum.
    #[error("slice_size {actual} is below the minimum of {min}")]
    SliceSizeTooSmall {
        /// The rejected value.
        actual: u64,
        /// The configured minimum.
        min: u64,
    },

    /// `server_factor` requested was below the configured minimum.
    #[error("server_factor {actual} is below the minimum of {min}")]
    ServerFactorTooSmall {
        /// The rejected value.
        actual: u32,
        /// The configured minimum.
        min: u32,
    },

    /// A string-family key exceeded the configured maximum length.
    #[error("key too long: {actual} bytes exceeds maximum {max}")]
    KeyTooLong {
        /// Actual key length in bytes.
        actual: usize,
        /// Maximum allowed length.
        max: usize,
    },
}
