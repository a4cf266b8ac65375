//! On-disk/on-wire statistics record formats (§6): one 28-byte layout per
//! numeric family, selected once per index by `is_float_key`.
//!
//! The original format's floating slot is the platform's widest floating
//! type (80-bit `long double` on the author's platform); this port fixes
//! it to a portable `f64`, documented as a deliberate precision-loss
//! departure (see the crate's `DESIGN.md`).

use byteorder::{ByteOrder, LittleEndian};

use rangekv_core::{Error, Result, SliceNum};

use crate::entry::{Extrema, StatsEntry};

/// Byte length of both record families.
pub const RECORD_LEN: usize = 28;

/// Encode one entry using the integer-family layout:
/// `{int32 slice; uint64 count; uint64 imin; uint64 imax;}`.
///
/// Panics if `entry.extrema` is the floating family; callers dispatch on
/// the owning index's `is_float_key` before choosing an encode function.
pub fn encode_integer(entry: &StatsEntry) -> [u8; RECORD_LEN] {
    let (min, max) = match entry.extrema {
        Extrema::Integer { min, max } => (min, max),
        Extrema::Floating { .. } => panic!("encode_integer called on floating extrema"),
    };
    let mut buf = [0u8; RECORD_LEN];
    LittleEndian::write_i32(&mut buf[0..4], entry.slice_num as i32);
    LittleEndian::write_u64(&mut buf[4..12], entry.count);
    LittleEndian::write_u64(&mut buf[12..20], min);
    LittleEndian::write_u64(&mut buf[20..28], max);
    buf
}

/// Encode one entry using the floating-family layout:
/// `{int32 slice; uint64 count; float64 dmin; float64 dmax;}`.
///
/// Panics if `entry.extrema` is the integer family.
pub fn encode_floating(entry: &StatsEntry) -> [u8; RECORD_LEN] {
    let (min, max) = match entry.extrema {
        Extrema::Floating { min, max } => (min, max),
        Extrema::Integer { .. } => panic!("encode_floating called on integer extrema"),
    };
    let mut buf = [0u8; RECORD_LEN];
    LittleEndian::write_i32(&mut buf[0..4], entry.slice_num as i32);
    LittleEndian::write_u64(&mut buf[4..12], entry.count);
    LittleEndian::write_f64(&mut buf[12..20], min);
    LittleEndian::write_f64(&mut buf[20..28], max);
    buf
}

/// Decode a record written by [`encode_integer`].
pub fn decode_integer(buf: &[u8]) -> Result<StatsEntry> {
    let slice_num = read_slice_num(buf)?;
    let count = LittleEndian::read_u64(&buf[4..12]);
    let min = LittleEndian::read_u64(&buf[12..20]);
    let max = LittleEndian::read_u64(&buf[20..28]);
    Ok(StatsEntry {
        slice_num,
        extrema: Extrema::Integer { min, max },
        count,
    })
}

/// Decode a record written by [`encode_floating`].
pub fn decode_floating(buf: &[u8]) -> Result<StatsEntry> {
    let slice_num = read_slice_num(buf)?;
    let count = LittleEndian::read_u64(&buf[4..12]);
    let min = LittleEndian::read_f64(&buf[12..20]);
    let max = LittleEndian::read_f64(&buf[20..28]);
    Ok(StatsEntry {
        slice_num,
        extrema: Extrema::Floating { min, max },
        count,
    })
}

fn read_slice_num(buf: &[u8]) -> Result<SliceNum> {
    if buf.len() != RECORD_LEN {
        return Err(Error::Backend(format!(
            "stats record must be {RECORD_LEN} bytes, got {}",
            buf.len()
        )));
    }
    let raw = LittleEndian::read_i32(&buf[0..4]);
    Ok(raw as SliceNum)
}

/// Big-endian, sign-biased encoding of a slice number, used as the stats
/// subdatabase key so ordered iteration visits slices in ascending order
/// (including negative slice numbers, which must sort below zero).
pub fn record_key(slice_num: SliceNum) -> Vec<u8> {
    let biased = (slice_num as u64) ^ (1u64 << 63);
    biased.to_be_bytes().to_vec()
}
