// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Scalar field codecs.
//!
//! # Format
//!
//! ```text
//! +-----------------------------------------------+
//! | Bool   | 1 byte, 0 = false, anything else true |
//! | Int    | 4 bytes, big-endian two's complement  |
//! | Long   | 8 bytes, big-endian two's complement  |
//! | UTF    | len (2, BE) | modified UTF-8 bytes    |
//! +-----------------------------------------------+
//! ```
//!
//! Modified UTF-8 encodes each UTF-16 code unit separately: U+0000 takes two
//! bytes (`C0 80`) and supplementary characters take six (one 3-byte group per
//! surrogate). A `None` string is written as the empty string and an empty
//! string is read back as `None`.

use crate::error::{DmiError, DmiResult};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// Largest encoded string length representable by the 2-byte prefix.
pub const MAX_UTF_LEN: usize = 65535;

/// Encoded size of one UTF-16 code unit.
fn unit_len(unit: u16) -> usize {
    match unit {
        0x0001..=0x007F => 1,
        0x0000 | 0x0080..=0x07FF => 2,
        _ => 3,
    }
}

/// Number of bytes `s` occupies in modified UTF-8 (excluding the prefix).
pub fn encoded_utf_len(s: &str) -> usize {
    s.encode_utf16().map(unit_len).sum()
}

/// Write a length-prefixed modified UTF-8 string.
pub fn write_utf<W: Write>(out: &mut W, s: &str) -> DmiResult<()> {
    let len = encoded_utf_len(s);
    if len > MAX_UTF_LEN {
        return Err(DmiError::StringTooLong { len });
    }

    let mut buf = Vec::with_capacity(2 + len);
    buf.write_u16::<BigEndian>(len as u16)?;
    for unit in s.encode_utf16() {
        match unit {
            0x0001..=0x007F => buf.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                buf.push(0xC0 | ((unit >> 6) & 0x1F) as u8);
                buf.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                buf.push(0xE0 | ((unit >> 12) & 0x0F) as u8);
                buf.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                buf.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }
    out.write_all(&buf)?;
    Ok(())
}

/// Read a length-prefixed modified UTF-8 string as-is.
pub fn read_utf<R: Read>(input: &mut R) -> DmiResult<String> {
    let len = input.read_u16::<BigEndian>()? as usize;
    let mut bytes = vec![0u8; len];
    input.read_exact(&mut bytes)?;
    decode_modified_utf8(&bytes)
}

fn decode_modified_utf8(bytes: &[u8]) -> DmiResult<String> {
    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b & 0x80 == 0 {
            units.push(u16::from(b));
            i += 1;
        } else if b & 0xE0 == 0xC0 {
            let b2 = continuation(bytes, i + 1)?;
            units.push((u16::from(b & 0x1F) << 6) | b2);
            i += 2;
        } else if b & 0xF0 == 0xE0 {
            let b2 = continuation(bytes, i + 1)?;
            let b3 = continuation(bytes, i + 2)?;
            units.push((u16::from(b & 0x0F) << 12) | (b2 << 6) | b3);
            i += 3;
        } else {
            return Err(DmiError::MalformedString(format!(
                "invalid lead byte 0x{:02x} at offset {}",
                b, i
            )));
        }
    }

    String::from_utf16(&units)
        .map_err(|_| DmiError::MalformedString("unpaired surrogate".into()))
}

fn continuation(bytes: &[u8], idx: usize) -> DmiResult<u16> {
    match bytes.get(idx) {
        Some(&b) if b & 0xC0 == 0x80 => Ok(u16::from(b & 0x3F)),
        Some(&b) => Err(DmiError::MalformedString(format!(
            "invalid continuation byte 0x{:02x} at offset {}",
            b, idx
        ))),
        None => Err(DmiError::MalformedString(format!(
            "truncated sequence at offset {}",
            idx
        ))),
    }
}

/// Write an optional string, `None` as the empty string.
pub fn write_opt_str<W: Write>(out: &mut W, value: Option<&str>) -> DmiResult<()> {
    write_utf(out, value.unwrap_or(""))
}

/// Read an optional string, the empty string as `None`.
pub fn read_opt_str<R: Read>(input: &mut R) -> DmiResult<Option<String>> {
    let s = read_utf(input)?;
    Ok(if s.is_empty() { None } else { Some(s) })
}

pub fn write_bool<W: Write>(out: &mut W, value: bool) -> DmiResult<()> {
    out.write_u8(u8::from(value))?;
    Ok(())
}

pub fn read_bool<R: Read>(input: &mut R) -> DmiResult<bool> {
    Ok(input.read_u8()? != 0)
}

pub fn write_int<W: Write>(out: &mut W, value: i32) -> DmiResult<()> {
    out.write_i32::<BigEndian>(value)?;
    Ok(())
}

pub fn read_int<R: Read>(input: &mut R) -> DmiResult<i32> {
    Ok(input.read_i32::<BigEndian>()?)
}

pub fn write_long<W: Write>(out: &mut W, value: i64) -> DmiResult<()> {
    out.write_i64::<BigEndian>(value)?;
    Ok(())
}

pub fn read_long<R: Read>(input: &mut R) -> DmiResult<i64> {
    Ok(input.read_i64::<BigEndian>()?)
}
