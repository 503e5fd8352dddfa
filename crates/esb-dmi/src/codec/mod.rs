// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binary stream codec for DMI records.
//!
//! # Record Layout
//!
//! ```text
//! Record           := TypeId:int4 Field*
//! Field            := Scalar | OptionalChild | RepeatedChildren
//! OptionalChild    := Flag:int4 (0|1) [Record]
//! RepeatedChildren := Count:int4 Record{Count}
//! ```
//!
//! There is no field tagging: a record's body is decoded purely from static
//! knowledge of its schema, so `write_body` and `read_body` must visit fields
//! in exactly the same order.

pub mod primitive;

pub use primitive::{
    read_bool, read_int, read_long, read_opt_str, read_utf, write_bool, write_int, write_long,
    write_opt_str, write_utf,
};

use crate::config::CodecConfig;
use crate::error::{DmiError, DmiResult};
use crate::model::ApplicationPropertySheet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Write};
use std::path::Path;

/// Upper bound on capacity reserved from an untrusted element count.
const MAX_PREALLOC: usize = 1024;

/// A record with a binary stream encoding.
///
/// Implementors provide the body codec; the envelope (type identifier) is
/// handled by the provided `to_stream` / `from_stream`.
pub trait DmiObject: Sized {
    /// Type identifier written in the envelope.
    const TYPE_ID: i32;

    /// Record name used in validation errors and logs.
    const NAME: &'static str;

    /// Encode the record body (everything after the envelope).
    fn write_body<W: Write>(&self, out: &mut W, version: i32) -> DmiResult<()>;

    /// Decode the record body (everything after the envelope).
    fn read_body<R: Read>(input: &mut R, version: i32) -> DmiResult<Self>;

    /// Reject records with missing mandatory fields. Fail-fast.
    fn validate(&self) -> DmiResult<()>;

    /// Encode envelope + body.
    fn to_stream<W: Write>(&self, out: &mut W, version: i32) -> DmiResult<()> {
        write_header(out, Self::TYPE_ID)?;
        self.write_body(out, version)
    }

    /// Decode envelope + body into a fresh record.
    fn from_stream<R: Read>(input: &mut R, version: i32) -> DmiResult<Self> {
        read_header(input, Self::TYPE_ID)?;
        tracing::trace!(record = Self::NAME, version, "decoding record");
        Self::read_body(input, version)
    }

    /// Encode into a new buffer.
    fn to_bytes(&self, version: i32) -> DmiResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.to_stream(&mut buf, version)?;
        Ok(buf)
    }

    /// Decode from a buffer that must hold exactly one record.
    fn from_bytes(bytes: &[u8], version: i32) -> DmiResult<Self> {
        let mut cursor = Cursor::new(bytes);
        let record = Self::from_stream(&mut cursor, version)?;
        let remaining = bytes.len() - cursor.position() as usize;
        if remaining != 0 {
            return Err(DmiError::TrailingBytes(remaining));
        }
        Ok(record)
    }
}

/// Write the record envelope.
pub fn write_header<W: Write>(out: &mut W, type_id: i32) -> DmiResult<()> {
    write_int(out, type_id)
}

/// Read the record envelope and check it names the expected type.
pub fn read_header<R: Read>(input: &mut R, expected: i32) -> DmiResult<()> {
    let got = read_int(input)?;
    if got != expected {
        return Err(DmiError::TypeMismatch { expected, got });
    }
    Ok(())
}

/// Write an optional child behind an int presence flag (0 = absent, 1 = present).
pub fn write_optional<W: Write, T: DmiObject>(
    out: &mut W,
    child: Option<&T>,
    version: i32,
) -> DmiResult<()> {
    match child {
        Some(child) => {
            write_int(out, 1)?;
            child.to_stream(out, version)
        }
        None => write_int(out, 0),
    }
}

/// Read an optional child written by [`write_optional`].
pub fn read_optional<R: Read, T: DmiObject>(
    input: &mut R,
    field: &'static str,
    version: i32,
) -> DmiResult<Option<T>> {
    match read_int(input)? {
        0 => Ok(None),
        1 => T::from_stream(input, version).map(Some),
        value => Err(DmiError::InvalidFlag { field, value }),
    }
}

/// Write an optional child behind a one-byte boolean presence flag.
pub fn write_optional_bool<W: Write, T: DmiObject>(
    out: &mut W,
    child: Option<&T>,
    version: i32,
) -> DmiResult<()> {
    write_bool(out, child.is_some())?;
    match child {
        Some(child) => child.to_stream(out, version),
        None => Ok(()),
    }
}

/// Read an optional child written by [`write_optional_bool`].
pub fn read_optional_bool<R: Read, T: DmiObject>(
    input: &mut R,
    version: i32,
) -> DmiResult<Option<T>> {
    if read_bool(input)? {
        T::from_stream(input, version).map(Some)
    } else {
        Ok(None)
    }
}

/// Write an element count.
pub fn write_count<W: Write>(out: &mut W, len: usize) -> DmiResult<()> {
    let count = i32::try_from(len)
        .map_err(|_| DmiError::InvalidValue(format!("collection of {} elements", len)))?;
    write_int(out, count)
}

/// Read a non-negative element count.
pub fn read_count<R: Read>(input: &mut R, field: &'static str) -> DmiResult<usize> {
    let count = read_int(input)?;
    if count < 0 {
        return Err(DmiError::InvalidCount { field, count });
    }
    Ok(count as usize)
}

/// Write `count` followed by each child record in order.
pub fn write_seq<W: Write, T: DmiObject>(out: &mut W, items: &[T], version: i32) -> DmiResult<()> {
    write_count(out, items.len())?;
    for item in items {
        item.to_stream(out, version)?;
    }
    Ok(())
}

/// Read a sequence written by [`write_seq`], preserving order.
pub fn read_seq<R: Read, T: DmiObject>(
    input: &mut R,
    field: &'static str,
    version: i32,
) -> DmiResult<Vec<T>> {
    let count = read_count(input, field)?;
    let mut items = Vec::with_capacity(count.min(MAX_PREALLOC));
    for _ in 0..count {
        items.push(T::from_stream(input, version)?);
    }
    Ok(items)
}

/// Validate every element of a sequence, stopping at the first failure.
pub fn validate_all<T: DmiObject>(items: &[T]) -> DmiResult<()> {
    items.iter().try_for_each(DmiObject::validate)
}

// ---------------------------------------------------------------------------
// Property sheet facade
// ---------------------------------------------------------------------------

/// Reject a configuration the codec cannot run with.
fn check_config(config: &CodecConfig) -> DmiResult<()> {
    config
        .validate()
        .map_err(|e| DmiError::InvalidValue(e.to_string()))
}

/// Encode a property sheet using the client version and checks from `config`.
pub fn encode_property_sheet(
    sheet: &ApplicationPropertySheet,
    config: &CodecConfig,
) -> DmiResult<Vec<u8>> {
    check_config(config)?;
    if config.validate_on_encode {
        sheet.validate()?;
    }
    let bytes = sheet.to_bytes(config.client_version)?;
    tracing::debug!(
        version = config.client_version,
        bytes = bytes.len(),
        "encoded property sheet"
    );
    Ok(bytes)
}

/// Decode a property sheet using the client version and checks from `config`.
pub fn decode_property_sheet(
    bytes: &[u8],
    config: &CodecConfig,
) -> DmiResult<ApplicationPropertySheet> {
    check_config(config)?;
    let sheet = ApplicationPropertySheet::from_bytes(bytes, config.client_version)?;
    if config.validate_on_decode {
        sheet.validate()?;
    }
    tracing::debug!(
        version = config.client_version,
        bytes = bytes.len(),
        "decoded property sheet"
    );
    Ok(sheet)
}

/// Encode a property sheet to a file.
pub fn write_property_sheet_file<P: AsRef<Path>>(
    path: P,
    sheet: &ApplicationPropertySheet,
    config: &CodecConfig,
) -> DmiResult<()> {
    let bytes = encode_property_sheet(sheet, config)?;
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Decode a property sheet from a file.
pub fn read_property_sheet_file<P: AsRef<Path>>(
    path: P,
    config: &CodecConfig,
) -> DmiResult<ApplicationPropertySheet> {
    let mut bytes = Vec::new();
    BufReader::new(File::open(path)?).read_to_end(&mut bytes)?;
    decode_property_sheet(&bytes, config)
}

/// Render a property sheet as pretty JSON.
pub fn property_sheet_to_json(sheet: &ApplicationPropertySheet) -> DmiResult<String> {
    Ok(serde_json::to_string_pretty(sheet)?)
}

/// Parse a property sheet from JSON.
pub fn property_sheet_from_json(json: &str) -> DmiResult<ApplicationPropertySheet> {
    Ok(serde_json::from_str(json)?)
}
