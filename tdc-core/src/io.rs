// TDC Toolkit
// Copyright (c) 2026 The TDC Toolkit Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Composable byte-level I/O for the capture-file reader.
//!
//! The wire format is little-endian throughout, so unlike a general
//! media container reader this only needs little-endian accessors. The
//! [`ReadBytes`] trait is otherwise the same shape as a chunked-format
//! demuxer's byte reader: small fixed-width reads, a way to skip bytes,
//! and a running position used to validate declared lengths.

use std::io::Read;

use crate::error::Result;

/// `ReadBytes` provides methods to read bytes from a stream and interpret
/// them as little-endian unsigned integers, floating-point values, or raw
/// byte runs.
pub trait ReadBytes {
    /// Reads a single byte from the stream.
    fn read_u8(&mut self) -> Result<u8>;

    /// Reads exactly `buf.len()` bytes into `buf`.
    fn read_buf_exact(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Reads a 2-byte little-endian unsigned integer.
    fn read_u16(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read_buf_exact(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    /// Reads a 4-byte little-endian unsigned integer.
    fn read_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_buf_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Reads a 4-byte little-endian signed integer.
    fn read_i32(&mut self) -> Result<i32> {
        let mut buf = [0u8; 4];
        self.read_buf_exact(&mut buf)?;
        Ok(i32::from_le_bytes(buf))
    }

    /// Reads an 8-byte little-endian unsigned integer.
    fn read_u64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.read_buf_exact(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    /// Reads an 8-byte little-endian signed integer.
    fn read_i64(&mut self) -> Result<i64> {
        let mut buf = [0u8; 8];
        self.read_buf_exact(&mut buf)?;
        Ok(i64::from_le_bytes(buf))
    }

    /// Reads an 8-byte little-endian IEEE-754 double.
    fn read_f64(&mut self) -> Result<f64> {
        let mut buf = [0u8; 8];
        self.read_buf_exact(&mut buf)?;
        Ok(f64::from_le_bytes(buf))
    }

    /// Reads exactly `len` bytes and returns them as a boxed slice.
    fn read_boxed_slice_exact(&mut self, len: usize) -> Result<Box<[u8]>> {
        let mut buf = vec![0u8; len];
        self.read_buf_exact(&mut buf)?;
        Ok(buf.into_boxed_slice())
    }

    /// Discards the given number of bytes from the stream.
    fn ignore_bytes(&mut self, count: u64) -> Result<()>;

    /// The current byte position within the stream.
    fn pos(&self) -> u64;
}

/// Wraps any [`std::io::Read`] source and tracks the number of bytes read,
/// providing the `ReadBytes` accessors used by the capture-file reader.
pub struct ByteReader<R: Read> {
    inner: R,
    pos: u64,
}

impl<R: Read> ByteReader<R> {
    pub fn new(inner: R) -> Self {
        ByteReader { inner, pos: 0 }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }
}

impl<R: Read> ReadBytes for ByteReader<R> {
    fn read_u8(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.inner.read_exact(&mut buf)?;
        self.pos += 1;
        Ok(buf[0])
    }

    fn read_buf_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.inner.read_exact(buf)?;
        self.pos += buf.len() as u64;
        Ok(())
    }

    fn ignore_bytes(&mut self, count: u64) -> Result<()> {
        let mut remaining = count;
        let mut scratch = [0u8; 1024];

        while remaining > 0 {
            let n = remaining.min(scratch.len() as u64) as usize;
            self.inner.read_exact(&mut scratch[..n])?;
            remaining -= n as u64;
        }

        self.pos += count;
        Ok(())
    }

    fn pos(&self) -> u64 {
        self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_little_endian_integers() {
        let data = vec![0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        let mut reader = ByteReader::new(Cursor::new(data));
        assert_eq!(reader.read_u32().unwrap(), 1);
        assert_eq!(reader.read_u32().unwrap(), 2);
        assert_eq!(reader.pos(), 8);
        assert_eq!(reader.read_u32().unwrap(), 0);
    }

    #[test]
    fn ignore_bytes_advances_position() {
        let data = vec![0u8; 2048];
        let mut reader = ByteReader::new(Cursor::new(data));
        reader.ignore_bytes(2000).unwrap();
        assert_eq!(reader.pos(), 2000);
        assert_eq!(reader.read_u8().unwrap(), 0);
    }

    #[test]
    fn unexpected_eof_surfaces_as_io_error() {
        let mut reader = ByteReader::new(Cursor::new(vec![0u8; 2]));
        assert!(reader.read_u32().is_err());
    }
}
