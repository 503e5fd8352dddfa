// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec and validation errors.

use std::io;
use thiserror::Error;

/// Errors raised while encoding, decoding or validating DMI records.
#[derive(Debug, Error)]
pub enum DmiError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("String too long for modified UTF-8: {len} bytes (max 65535)")]
    StringTooLong { len: usize },

    #[error("Malformed modified UTF-8 string: {0}")]
    MalformedString(String),

    #[error("Type mismatch: expected record type {expected}, got {got}")]
    TypeMismatch { expected: i32, got: i32 },

    #[error("Invalid presence flag {value} for {field}")]
    InvalidFlag { field: &'static str, value: i32 },

    #[error("Invalid element count {count} for {field}")]
    InvalidCount { field: &'static str, count: i32 },

    #[error("Invalid selector count {0}")]
    InvalidSelectorCount(i32),

    #[error("{0} trailing bytes after record")]
    TrailingBytes(usize),

    #[error("Invalid argument: {record}.{field} is mandatory")]
    InvalidArgument {
        record: &'static str,
        field: &'static str,
    },

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DmiError {
    /// Whether this error comes from `validate()` rather than the stream.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DmiError::InvalidArgument { .. } | DmiError::InvalidValue(_)
        )
    }
}

pub type DmiResult<T> = Result<T, DmiError>;
