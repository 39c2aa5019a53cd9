// TDC Toolkit
// Copyright (c) 2026 The TDC Toolkit Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{debug, warn};

use tdc_core::error::invalid_format_error;
use tdc_core::io::{ByteReader, ReadBytes};
use tdc_core::Result;

use crate::tag::{read_tag_value, TagValue};

const MAGIC: &[u8] = b"PQTTTR";
const MAGIC_LEN: usize = 8;
const VERSION_LEN: usize = 8;
const IDENT_LEN: usize = 32;
const HEADER_END: &str = "Header_End";
const RECORD_COUNT_IDENT: &str = "TTResult_NumberOfRecords";

/// Reads a captured TTTR file: the tagged header (far enough to find the
/// declared record count), then the raw 32-bit record stream.
pub struct CaptureFileReader<R: Read> {
    reader: ByteReader<R>,
    record_count: u64,
    records_read: u64,
}

impl CaptureFileReader<File> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Self::try_new(file)
    }
}

impl<R: Read> CaptureFileReader<R> {
    /// Parses the magic, version, and tagged header of `inner`, stopping
    /// at the `Header_End` entry.
    pub fn try_new(inner: R) -> Result<Self> {
        let mut reader = ByteReader::new(inner);

        let mut magic = [0u8; MAGIC_LEN];
        reader.read_buf_exact(&mut magic)?;
        if &magic[..MAGIC.len()] != MAGIC {
            return invalid_format_error("missing PQTTTR magic");
        }

        let mut version = [0u8; VERSION_LEN];
        reader.read_buf_exact(&mut version)?;
        debug!("capture file version: {}", String::from_utf8_lossy(&version).trim_end_matches('\0'));

        let mut record_count = None;

        loop {
            let mut ident_buf = [0u8; IDENT_LEN];
            reader.read_buf_exact(&mut ident_buf)?;
            let ident = String::from_utf8_lossy(&ident_buf).trim_end_matches('\0').to_string();

            // The index field is part of every entry's on-disk layout but
            // is not needed to locate the record count or skip unknown
            // entries; read and discard it.
            let _index = reader.read_i32()?;

            let code = reader.read_u32()?;

            if ident == HEADER_END {
                // Header_End still carries a (typically Empty8) payload
                // that must be consumed like any other entry.
                read_tag_value(&mut reader, code)?;
                break;
            }

            let value = read_tag_value(&mut reader, code)?;

            if ident == RECORD_COUNT_IDENT {
                match value {
                    TagValue::Int(n) if n >= 0 => record_count = Some(n as u64),
                    _ => {
                        return invalid_format_error(
                            "TTResult_NumberOfRecords did not decode to a non-negative integer",
                        )
                    }
                }
            } else {
                warn!("ignoring unrecognized header entry: {ident}");
            }
        }

        let record_count = match record_count {
            Some(n) => n,
            None => {
                return invalid_format_error(
                    "capture file header never declared TTResult_NumberOfRecords",
                )
            }
        };

        debug!("capture file declares {record_count} records");

        Ok(CaptureFileReader { reader, record_count, records_read: 0 })
    }

    /// The record count declared by the file's header.
    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// Reads the next raw 32-bit record, or `Ok(None)` once
    /// `record_count` records have been returned. Fails with
    /// `UnexpectedEOF` (an `InvalidFormat` error) if the file ends before
    /// the declared count is reached.
    pub fn next_word(&mut self) -> Result<Option<u32>> {
        if self.records_read >= self.record_count {
            return Ok(None);
        }

        match self.reader.read_u32() {
            Ok(word) => {
                self.records_read += 1;
                Ok(Some(word))
            }
            Err(err) => invalid_format_error(format!(
                "unexpected end of file: declared {} records, got {} ({err})",
                self.record_count, self.records_read
            )),
        }
    }
}

impl<R: Read> Iterator for CaptureFileReader<R> {
    type Item = Result<u32>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_word() {
            Ok(Some(word)) => Some(Ok(word)),
            Ok(None) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn header_entry(ident: &str, code: u32, payload: &[u8]) -> Vec<u8> {
        let mut bytes = vec![0u8; IDENT_LEN];
        bytes[..ident.len()].copy_from_slice(ident.as_bytes());
        bytes.extend_from_slice(&0i32.to_le_bytes());
        bytes.extend_from_slice(&code.to_le_bytes());
        bytes.extend_from_slice(payload);
        bytes
    }

    fn minimal_capture_file(record_count: i64, records: &[u32]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"PQTTTR\0\0");
        bytes.extend_from_slice(b"00.000\0\0");
        bytes.extend_from_slice(&header_entry(
            RECORD_COUNT_IDENT,
            0x1000_0008,
            &record_count.to_le_bytes(),
        ));
        bytes.extend_from_slice(&header_entry(HEADER_END, 0xFFFF_0008, &0u64.to_le_bytes()));
        for word in records {
            bytes.extend_from_slice(&word.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn reads_record_count_and_streams_words() {
        let file = minimal_capture_file(2, &[0x01020304, 0x0A0B0C0D]);
        let mut reader = CaptureFileReader::try_new(Cursor::new(file)).unwrap();
        assert_eq!(reader.record_count(), 2);
        assert_eq!(reader.next_word().unwrap(), Some(0x01020304));
        assert_eq!(reader.next_word().unwrap(), Some(0x0A0B0C0D));
        assert_eq!(reader.next_word().unwrap(), None);
    }

    #[test]
    fn missing_magic_is_rejected() {
        let mut file = minimal_capture_file(0, &[]);
        file[0] = b'X';
        assert!(CaptureFileReader::try_new(Cursor::new(file)).is_err());
    }

    #[test]
    fn fewer_records_than_declared_is_an_error() {
        let file = minimal_capture_file(2, &[0x01020304]);
        let mut reader = CaptureFileReader::try_new(Cursor::new(file)).unwrap();
        assert_eq!(reader.next_word().unwrap(), Some(0x01020304));
        assert!(reader.next_word().is_err());
    }

    #[test]
    fn unrecognized_header_entries_are_skipped() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"PQTTTR\0\0");
        bytes.extend_from_slice(b"00.000\0\0");
        bytes.extend_from_slice(&header_entry("MeasDesc_GlobalResolution", 0x2000_0008, &5.0f64.to_le_bytes()));
        bytes.extend_from_slice(&header_entry(RECORD_COUNT_IDENT, 0x1000_0008, &1i64.to_le_bytes()));
        bytes.extend_from_slice(&header_entry(HEADER_END, 0xFFFF_0008, &0u64.to_le_bytes()));
        bytes.extend_from_slice(&0xAABBCCDDu32.to_le_bytes());

        let mut reader = CaptureFileReader::try_new(Cursor::new(bytes)).unwrap();
        assert_eq!(reader.record_count(), 1);
        assert_eq!(reader.next_word().unwrap(), Some(0xAABBCCDD));
    }

    #[test]
    fn iterator_yields_exactly_the_declared_records() {
        let file = minimal_capture_file(3, &[1, 2, 3]);
        let reader = CaptureFileReader::try_new(Cursor::new(file)).unwrap();
        let words: Result<Vec<u32>> = reader.collect();
        assert_eq!(words.unwrap(), vec![1, 2, 3]);
    }
}
