//! `slice_of`: map a raw key to its slice number.

use rangekv_core::{normalize, raw_signed_int, KeyType, Norm, Result, SliceNum};

/// `floor(key / slice_size)`.
///
/// Signed integer keys (`SignedInt32`/`SignedInt64`) divide their true,
/// unbiased value (via [`raw_signed_int`]) using floor division, so
/// non-negative keys land in slice `0` and up, matching the original
/// `mdhim-tng` slicing behavior — this is deliberately *not*
/// [`normalize`]'s sign-biased comparator representation, which exists
/// for ordered back-end storage, not for slice arithmetic.
///
/// `ByteString`/`UnicodeString` keys slice on [`normalize`]'s folded
/// prefix value (there is no "raw signed value" for a string key).
/// Float-family keys divide in `f64` and floor before narrowing.
pub fn slice_of(key_bytes: &[u8], key_type: KeyType, slice_size: u64) -> Result<SliceNum> {
    debug_assert!(slice_size > 0, "caller must validate slice_size via Limits");
    match key_type {
        KeyType::SignedInt32 | KeyType::SignedInt64 => {
            let raw = raw_signed_int(key_bytes, key_type)?;
            Ok(floor_div(raw, slice_size as i64))
        }
        KeyType::ByteString | KeyType::UnicodeString => match normalize(key_bytes, key_type)? {
            Norm::Int(n) => Ok((n / slice_size) as SliceNum),
            Norm::Float(_) => unreachable!("string keys normalize to the integer family"),
        },
        KeyType::Float32 | KeyType::Float64 => match normalize(key_bytes, key_type)? {
            Norm::Float(f) => Ok((f / slice_size as f64).floor() as SliceNum),
            Norm::Int(_) => unreachable!("float keys normalize to the floating family"),
        },
    }
}

/// Floor division: rounds toward negative infinity, unlike Rust's `/`
/// which truncates toward zero. Needed so e.g. `-1 / 100` is `-1`
/// (slice below zero), not `0`.
fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        q - 1
    } else {
        q
    }
}
