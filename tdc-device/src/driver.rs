// TDC Toolkit
// Copyright (c) 2026 The TDC Toolkit Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The narrow vendor-driver interface: the exact set of operations
//! the core consumes from the vendor library, and nothing else.

use tdc_core::{Edge, Mode, RefSource, Result};

/// Bit 1 (value 2) of [`VendorDriver::flags`] indicates the on-board FIFO
/// overran before software drained it.
pub const FIFO_OVERRUN_BIT: u32 = 0b10;

/// A vendor TDC driver, narrowed to exactly the operations a device
/// source needs. Implementations wrap the real FFI binding;
/// [`crate::stub::StubDriver`] implements the same trait as a
/// hardware-free test double.
pub trait VendorDriver {
    /// Opens the physical device at `index`. Fails with `InvalidState` if
    /// a handle for this index is already open.
    fn open(&mut self, index: usize) -> Result<()>;

    /// Initializes the device for `mode` using `reference` as the timing
    /// reference. Only `Mode::T2` / `RefSource::InternalClock` are
    /// supported at the API boundary.
    fn initialize(&mut self, mode: Mode, reference: RefSource) -> Result<()>;

    /// The number of physical input channels this device reports.
    fn number_of_input_channels(&self) -> Result<usize>;

    fn set_sync_divider(&mut self, divider: u32) -> Result<()>;
    fn set_sync_edge_trigger(&mut self, level_mv: i32, edge: Edge) -> Result<()>;
    fn set_sync_channel_offset(&mut self, offset_ps: i64) -> Result<()>;
    fn set_sync_channel_enable(&mut self, enable: bool) -> Result<()>;

    fn set_input_edge_trigger(&mut self, channel: usize, level_mv: i32, edge: Edge) -> Result<()>;
    fn set_input_channel_offset(&mut self, channel: usize, offset_ps: i64) -> Result<()>;
    fn set_input_channel_enable(&mut self, channel: usize, enable: bool) -> Result<()>;

    /// Arms the device for a measurement of up to `duration_ms`
    /// milliseconds.
    fn start_measurement(&mut self, duration_ms: u64) -> Result<()>;

    /// Stops an in-progress or completed measurement. Idempotent.
    fn stop_measurement(&mut self) -> Result<()>;

    /// Drains up to `buf.len()` raw 32-bit records from the on-board
    /// FIFO into `buf`, returning the number written.
    fn read_fifo(&mut self, buf: &mut [u32]) -> Result<usize>;

    /// Device status bits; see [`FIFO_OVERRUN_BIT`].
    fn flags(&self) -> Result<u32>;

    /// `0` while the measurement is still counting down; non-zero once
    /// the configured duration has elapsed.
    fn ctc_status(&self) -> Result<i32>;

    /// Releases the physical handle. Idempotent.
    fn close(&mut self) -> Result<()>;
}
