// TDC Toolkit
// Copyright (c) 2026 The TDC Toolkit Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The decoded-event sink. On-disk columnar file formats are explicitly
//! out of scope for the core: what the core owns is the abstract
//! [`EventSink`] trait and the chunk/rotation bookkeeping around it.
//! [`ChunkedFileSink`] is a concrete, dependency-free implementation
//! that writes `(channel: u8, timestamp_ps: u64)` rows as flat
//! little-endian binary records, rotating output files by row count
//! the way a chunked writer over any row-oriented format would, without
//! pulling in a columnar-file crate.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};

use tdc_core::{Event, Result};

/// Default rows per chunk (~2.9e6).
pub const DEFAULT_CHUNK_ROWS: usize = 2_900_000;

/// Default rows per file before rotation (~29e6).
pub const DEFAULT_FILE_ROWS: usize = 29_000_000;

/// Consumes decoded events as they arrive. Implementations decide how
/// (and whether) to buffer; [`ChunkedFileSink::write_event`] is the only
/// method the decoder's consumer calls per event, with `flush` called at
/// acquisition boundaries and on shutdown.
pub trait EventSink {
    fn write_event(&mut self, event: Event) -> Result<()>;

    /// Flushes any buffered rows. Called at `MeasEnd` and on pipeline
    /// shutdown, so a partial chunk is never lost.
    fn flush(&mut self) -> Result<()>;
}

/// A chunked, rotating file sink: buffers events into chunks of
/// `chunk_rows`, writing each chunk to the current file as it fills, and
/// rotates to a new file once `file_rows` rows have been written to keep
/// individual files bounded.
pub struct ChunkedFileSink {
    output_dir: PathBuf,
    name: String,
    chunk_rows: usize,
    file_rows: usize,

    writer: Option<BufWriter<File>>,
    rows_in_file: usize,
    buffer: Vec<Event>,
    file_index: u64,
}

impl ChunkedFileSink {
    pub fn new(output_dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        ChunkedFileSink {
            output_dir: output_dir.into(),
            name: name.into(),
            chunk_rows: DEFAULT_CHUNK_ROWS,
            file_rows: DEFAULT_FILE_ROWS,
            writer: None,
            rows_in_file: 0,
            buffer: Vec::new(),
            file_index: 0,
        }
    }

    pub fn with_chunk_rows(mut self, chunk_rows: usize) -> Self {
        self.chunk_rows = chunk_rows;
        self
    }

    pub fn with_file_rows(mut self, file_rows: usize) -> Self {
        self.file_rows = file_rows;
        self
    }

    fn current_file_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}_{:04}.tdcbin", self.name, self.file_index))
    }

    fn writer_for_current_file(&mut self) -> Result<&mut BufWriter<File>> {
        if self.writer.is_none() {
            let path = self.current_file_path();
            debug!("sink: opening {}", path.display());
            let file = File::create(&path)?;
            self.writer = Some(BufWriter::new(file));
        }
        Ok(self.writer.as_mut().unwrap())
    }

    fn write_chunk(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let rows = self.buffer.len();
        {
            let writer = self.writer_for_current_file()?;
            for event in self.buffer.drain(..) {
                writer.write_all(&[event.channel])?;
                writer.write_all(&event.timestamp_ps.to_le_bytes())?;
            }
            writer.flush()?;
        }

        self.rows_in_file += rows;

        if self.rows_in_file >= self.file_rows {
            info!("sink: rotating file after {} rows", self.rows_in_file);
            self.writer = None;
            self.rows_in_file = 0;
            self.file_index += 1;
        }

        Ok(())
    }
}

impl EventSink for ChunkedFileSink {
    fn write_event(&mut self, event: Event) -> Result<()> {
        self.buffer.push(event);
        if self.buffer.len() >= self.chunk_rows {
            self.write_chunk()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.write_chunk()?;
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }
}

/// Reads back rows written by [`ChunkedFileSink`] from a single file, in
/// order, for tests and offline verification.
pub fn read_chunked_file(path: impl AsRef<Path>) -> Result<Vec<Event>> {
    let bytes = fs::read(path)?;
    let mut events = Vec::with_capacity(bytes.len() / 9);
    let mut cursor = 0;
    while cursor + 9 <= bytes.len() {
        let channel = bytes[cursor];
        let mut ts = [0u8; 8];
        ts.copy_from_slice(&bytes[cursor + 1..cursor + 9]);
        events.push(Event::new(channel, u64::from_le_bytes(ts)));
        cursor += 9;
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_and_reads_back_in_order() {
        let dir = tempdir().unwrap();
        let mut sink = ChunkedFileSink::new(dir.path(), "measurement").with_chunk_rows(2);

        let events = vec![Event::new(0, 10), Event::new(1, 20), Event::new(2, 30)];
        for event in &events {
            sink.write_event(*event).unwrap();
        }
        sink.flush().unwrap();

        let path = dir.path().join("measurement_0000.tdcbin");
        let read_back = read_chunked_file(&path).unwrap();
        assert_eq!(read_back, events);
    }

    #[test]
    fn rotates_to_a_new_file_after_file_rows() {
        let dir = tempdir().unwrap();
        let mut sink = ChunkedFileSink::new(dir.path(), "m").with_chunk_rows(2).with_file_rows(2);

        sink.write_event(Event::new(0, 1)).unwrap();
        sink.write_event(Event::new(0, 2)).unwrap();
        sink.write_event(Event::new(0, 3)).unwrap();
        sink.flush().unwrap();

        assert!(dir.path().join("m_0000.tdcbin").exists());
        assert!(dir.path().join("m_0001.tdcbin").exists());
    }

    #[test]
    fn partial_chunk_is_flushed_on_shutdown() {
        let dir = tempdir().unwrap();
        let mut sink = ChunkedFileSink::new(dir.path(), "m").with_chunk_rows(1000);
        sink.write_event(Event::new(1, 5)).unwrap();
        sink.flush().unwrap();

        let read_back = read_chunked_file(dir.path().join("m_0000.tdcbin")).unwrap();
        assert_eq!(read_back, vec![Event::new(1, 5)]);
    }
}
