// TDC Toolkit
// Copyright (c) 2026 The TDC Toolkit Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tagged-header entry types. Mirrors the role of a chunked container
//! format's `ParseChunkTag`: given the 4-byte type code read from the
//! stream, decide how many more bytes the entry's payload occupies and
//! how to interpret them.

use tdc_core::error::{invalid_format_error, Result};
use tdc_core::io::ReadBytes;

/// One of the eleven tagged-header value types the reader recognizes.
/// The discriminants are the literal type codes read from the file
/// as little-endian 32-bit words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagType {
    Empty8,
    Bool8,
    Int8,
    BitSet64,
    Color8,
    Float8,
    TDateTime,
    Float8Array,
    AnsiString,
    WideString,
    BinaryBlob,
}

impl TagType {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0xFFFF_0008 => Some(TagType::Empty8),
            0x0000_0008 => Some(TagType::Bool8),
            0x1000_0008 => Some(TagType::Int8),
            0x1100_0008 => Some(TagType::BitSet64),
            0x1200_0008 => Some(TagType::Color8),
            0x2000_0008 => Some(TagType::Float8),
            0x2100_0008 => Some(TagType::TDateTime),
            0x2001_FFFF => Some(TagType::Float8Array),
            0x4001_FFFF => Some(TagType::AnsiString),
            0x4002_FFFF => Some(TagType::WideString),
            0xFFFF_FFFF => Some(TagType::BinaryBlob),
            _ => None,
        }
    }

    /// `true` for the fixed 8-byte value types; `false` for the
    /// length-prefixed array/string/blob types.
    fn is_fixed_width(self) -> bool {
        !matches!(
            self,
            TagType::Float8Array | TagType::AnsiString | TagType::WideString | TagType::BinaryBlob
        )
    }
}

/// The decoded value of a single header entry, narrowed to what the
/// reader actually needs: a 64-bit signed integer (for
/// `TTResult_NumberOfRecords`) or an opaque "skipped" marker for
/// everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagValue {
    Int(i64),
    Other,
}

/// Reads one header entry's payload, given its already-parsed type code,
/// advancing `reader` past the entry. Returns `UnknownTagType` (surfaced
/// as [`tdc_core::TdcError::InvalidFormat`]) if `code` is not one of the
/// eleven recognized types.
pub fn read_tag_value<R: ReadBytes>(reader: &mut R, code: u32) -> Result<TagValue> {
    let tag_type = match TagType::from_code(code) {
        Some(t) => t,
        None => return invalid_format_error(format!("unknown tag type code 0x{code:08X}")),
    };

    if tag_type.is_fixed_width() {
        let mut buf = [0u8; 8];
        reader.read_buf_exact(&mut buf)?;

        let value = match tag_type {
            TagType::Int8 => TagValue::Int(i64::from_le_bytes(buf)),
            _ => TagValue::Other,
        };

        Ok(value)
    } else {
        let len = reader.read_u64()?;
        reader.ignore_bytes(len)?;
        Ok(TagValue::Other)
    }
}
